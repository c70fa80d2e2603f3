use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use scrollseq::{
    DirFrameSource, FixedLayout, FrameStore, HostBindings, PlaybackFrame, PreloadOpts,
    Presentation, ScrollImageProps, ScrollSequence, ScrollSequenceOpts, SharedVisual,
    TransitionTimings, Viewport, ViewportEvents, apply_black_overlay, flatten_onto_black, preload,
    write_png,
};

/// Per-event wait while a preload is running.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "scrollseq", version)]
struct Cli {
    /// Log to stderr (`-v` debug, `-vv` trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preload a sequence and report per-frame status.
    Probe(ProbeArgs),
    /// Render the surface at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Render evenly spaced progress steps as numbered PNGs.
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
struct SequenceArgs {
    /// Props JSON (`imageFolder`, `totalFrames`, ...). Overrides `--folder`/`--frames`.
    #[arg(long)]
    props: Option<PathBuf>,

    /// Site-relative frame folder, e.g. `/frames`.
    #[arg(long)]
    folder: Option<String>,

    /// Number of frames.
    #[arg(long)]
    frames: Option<u32>,

    /// Directory that site paths resolve against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Frame file extension.
    #[arg(long, default_value = "webp")]
    ext: String,

    /// Cap on concurrent frame loads.
    #[arg(long)]
    max_in_flight: Option<usize>,
}

#[derive(Args, Debug)]
struct SurfaceArgs {
    /// Viewport size as `WxH`.
    #[arg(long, default_value = "1280x720")]
    viewport: String,

    /// Document offset of the pinned container's top edge.
    #[arg(long, default_value_t = 0.0)]
    container_top: f64,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    seq: SequenceArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    seq: SequenceArgs,

    #[command(flatten)]
    surface: SurfaceArgs,

    /// Window scroll offset in pixels.
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    #[command(flatten)]
    seq: SequenceArgs,

    #[command(flatten)]
    surface: SurfaceArgs,

    /// Number of progress steps from 0 to 1 inclusive.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    /// Output directory for `step_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Probe(args) => cmd_probe(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
    }
}

fn init_tracing(verbose: u8) {
    if verbose == 0 && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let level = match verbose {
        0 | 1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("scrollseq={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

impl SequenceArgs {
    fn props(&self) -> anyhow::Result<ScrollImageProps> {
        if let Some(path) = &self.props {
            return Ok(ScrollImageProps::from_path(path)?);
        }
        let folder = self
            .folder
            .clone()
            .context("either --props or --folder is required")?;
        let frames = self.frames.context("--frames is required with --folder")?;
        let props = ScrollImageProps::new(folder, frames);
        props.validate()?;
        Ok(props)
    }

    fn preload_opts(&self) -> PreloadOpts {
        PreloadOpts {
            max_in_flight: self.max_in_flight,
        }
    }
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let props = args.seq.props()?;
    let descriptor = props.descriptor(&args.seq.ext);
    let source = Arc::new(DirFrameSource::new(&args.seq.root));

    let task = preload(&descriptor, source, &args.seq.preload_opts())?;
    let mut last_percent = None;
    let store = task.wait_with(|p| {
        if last_percent != Some(p.percent) {
            last_percent = Some(p.percent);
            eprintln!("Loading... {}%", p.percent);
        }
    })?;

    report_store(&descriptor, &store);
    if store.all_missing() {
        anyhow::bail!("no frame of '{}' could be loaded", descriptor.folder());
    }
    Ok(())
}

fn report_store(descriptor: &scrollseq::SequenceDescriptor, store: &FrameStore) {
    for index in descriptor.indices() {
        let path = descriptor.path_for(index);
        match store.slot(index) {
            Some(Ok(frame)) => println!("{path}\tok\t{}x{}", frame.width, frame.height),
            Some(Err(err)) => println!("{path}\tmissing\t{err}"),
            None => println!("{path}\tmissing\tnot attempted"),
        }
    }
    println!(
        "frames: {} decoded: {} missing: {}",
        store.len(),
        store.decoded_count(),
        store.missing_count()
    );
}

/// A loaded, headless sequence plus the host-side handles needed to drive it.
struct Headless {
    seq: ScrollSequence,
    events: ViewportEvents,
    overlay: SharedVisual,
}

fn mount_headless(seq_args: &SequenceArgs, surface: &SurfaceArgs) -> anyhow::Result<Headless> {
    let props = seq_args.props()?;
    let viewport = Viewport::parse(&surface.viewport)?;
    let events = ViewportEvents::new(viewport);
    let overlay = SharedVisual::default();
    let host = HostBindings {
        events: events.clone(),
        layout: Box::new(FixedLayout(Some(surface.container_top))),
        overlay: Box::new(overlay.clone()),
        button: Box::new(SharedVisual::default()),
    };
    let opts = ScrollSequenceOpts {
        preload: seq_args.preload_opts(),
        extension: seq_args.ext.clone(),
        timings: TransitionTimings::immediate(),
        ..ScrollSequenceOpts::default()
    };
    let source = Arc::new(DirFrameSource::new(&seq_args.root));
    let mut seq = ScrollSequence::mount(props, source, host, opts)?;
    seq.wait_loaded(LOAD_TIMEOUT)?;
    if let Some(store) = seq.store()
        && store.missing_count() > 0
    {
        eprintln!(
            "warning: {} of {} frames missing",
            store.missing_count(),
            store.len()
        );
    }
    Ok(Headless {
        seq,
        events,
        overlay,
    })
}

impl Headless {
    fn render_at(&mut self, scroll_y: f64, now_s: f64, out: &Path) -> anyhow::Result<PlaybackFrame> {
        self.events.scroll_to(scroll_y);
        let frame = match self.seq.tick(now_s)? {
            Presentation::Playing(frame) => frame,
            other => anyhow::bail!("sequence is not playing: {other:?}"),
        };
        let comp = self
            .seq
            .compositor()
            .context("playback has no compositor")?;
        let mut rgba = comp.data().to_vec();
        flatten_onto_black(&mut rgba);
        apply_black_overlay(&mut rgba, self.overlay.get().opacity);
        write_png(out, &rgba, comp.width(), comp.height())?;
        Ok(frame)
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut headless = mount_headless(&args.seq, &args.surface)?;
    let frame = headless.render_at(args.scroll, 0.0, &args.out)?;
    println!("{}", serde_json::to_string(&frame.state)?);
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    if args.steps < 2 {
        anyhow::bail!("--steps must be >= 2");
    }
    let mut headless = mount_headless(&args.seq, &args.surface)?;
    let geometry = headless
        .seq
        .scroll()
        .and_then(|s| s.geometry())
        .context("pinned container has no geometry")?;

    for step in 0..args.steps {
        let p = f64::from(step) / f64::from(args.steps - 1);
        let out = args.out_dir.join(format!("step_{step:04}.png"));
        let frame = headless.render_at(geometry.start + p * geometry.span, f64::from(step), &out)?;
        println!(
            "{}\t{:.3}\t{:?}\t{:?}",
            out.display(),
            frame.progress.progress,
            frame.state.phase,
            frame.state.frame_index.map(|i| i.0)
        );
    }
    eprintln!("wrote {} frames to {}", args.steps, args.out_dir.display());
    Ok(())
}
