use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::{
    assets::source::MemoryFrameSource,
    foundation::core::{FrameIndex, Viewport},
    gate::loading::GateState,
    scroll::progress::FixedLayout,
    transition::{driver::SharedVisual, state::Phase},
};

fn png(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn source(props: &ScrollImageProps, skip: &[u32]) -> Arc<dyn FrameSource> {
    let desc = props.descriptor("png");
    let mut src = MemoryFrameSource::new();
    for index in desc.indices() {
        if !skip.contains(&index.0) {
            src.insert(desc.path_for(index), png((index.0 * 20 % 256) as u8));
        }
    }
    Arc::new(src)
}

struct Harness {
    events: ViewportEvents,
    overlay: SharedVisual,
    button: SharedVisual,
}

fn mount(frames: u32, skip: &[u32]) -> (ScrollSequence, Harness) {
    let props = ScrollImageProps::new("/seq", frames);
    let events = ViewportEvents::new(Viewport::new(100, 100).unwrap());
    let overlay = SharedVisual::default();
    let button = SharedVisual::default();
    let host = HostBindings {
        events: events.clone(),
        layout: Box::new(FixedLayout(Some(0.0))),
        overlay: Box::new(overlay.clone()),
        button: Box::new(button.clone()),
    };
    let opts = ScrollSequenceOpts {
        extension: "png".to_string(),
        timings: TransitionTimings::immediate(),
        ..ScrollSequenceOpts::default()
    };
    let seq = ScrollSequence::mount(props.clone(), source(&props, skip), host, opts).unwrap();
    (
        seq,
        Harness {
            events,
            overlay,
            button,
        },
    )
}

fn playing(p: Presentation) -> PlaybackFrame {
    match p {
        Presentation::Playing(frame) => frame,
        other => panic!("expected playback, got {other:?}"),
    }
}

#[test]
fn mount_rejects_invalid_props() {
    let events = ViewportEvents::new(Viewport::new(10, 10).unwrap());
    let host = HostBindings {
        events,
        layout: Box::new(FixedLayout(Some(0.0))),
        overlay: Box::new(SharedVisual::default()),
        button: Box::new(SharedVisual::default()),
    };
    let err = ScrollSequence::mount(
        ScrollImageProps::new("/seq", 0),
        Arc::new(MemoryFrameSource::new()),
        host,
        ScrollSequenceOpts::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("totalFrames"));
}

#[test]
fn shows_indicator_until_loaded() {
    let (mut seq, _h) = mount(10, &[]);
    // The very first tick may already see the resolved store; either way no frame is drawn
    // before playback attaches.
    match seq.tick(0.0).unwrap() {
        Presentation::Loading(view) => assert!(view.label.starts_with("Loading... ")),
        Presentation::Playing(frame) => assert_eq!(frame.progress.progress, 0.0),
        Presentation::Unmounted => panic!("not unmounted"),
    }
}

#[test]
fn scroll_maps_to_frames_and_overlay() {
    let (mut seq, h) = mount(10, &[]);
    seq.wait_loaded(Duration::from_secs(10)).unwrap();
    assert!(seq.is_playing());
    assert_eq!(h.events.listener_count(), 1);

    let first = playing(seq.tick(0.0).unwrap());
    assert_eq!(first.state.frame_index, Some(FrameIndex(0)));
    assert_eq!(first.draw, DrawOutcome::Drawn(FrameIndex(0)));
    assert_eq!(first.state.phase, Phase::Playing);

    // 10 frames * 20px = 200px of pinned scroll.
    h.events.scroll_to(100.0);
    let mid = playing(seq.tick(0.1).unwrap());
    assert_eq!(mid.progress.progress, 0.5);
    assert_eq!(mid.draw, DrawOutcome::Drawn(FrameIndex(4)));
    assert_eq!(h.overlay.get().opacity, 0.0);

    h.events.scroll_to(190.0);
    let end = playing(seq.tick(0.2).unwrap());
    assert_eq!(end.draw, DrawOutcome::Drawn(FrameIndex(9)));
    assert_eq!(end.state.phase, Phase::CallToAction);
    assert_eq!(h.overlay.get().opacity, 1.0);
    assert_eq!(h.button.get().opacity, 1.0);
    assert_eq!(h.button.get().offset_y, 0.0);

    let again = playing(seq.tick(0.3).unwrap());
    assert_eq!(again.draw, DrawOutcome::Unchanged(FrameIndex(9)));
}

#[test]
fn missing_frame_holds_previous() {
    let (mut seq, h) = mount(10, &[4]);
    seq.wait_loaded(Duration::from_secs(10)).unwrap();
    assert_eq!(seq.store().unwrap().missing_count(), 1);

    h.events.scroll_to(50.0);
    let before = playing(seq.tick(0.0).unwrap());
    assert_eq!(before.draw, DrawOutcome::Drawn(FrameIndex(2)));

    h.events.scroll_to(100.0);
    let held = playing(seq.tick(0.1).unwrap());
    assert_eq!(
        held.draw,
        DrawOutcome::Held {
            requested: FrameIndex(4),
            showing: Some(FrameIndex(2)),
        }
    );
    assert_eq!(seq.compositor().unwrap().last_drawn(), Some(FrameIndex(2)));
}

#[test]
fn resize_resizes_surface_and_redraws() {
    let (mut seq, h) = mount(4, &[]);
    seq.wait_loaded(Duration::from_secs(10)).unwrap();
    playing(seq.tick(0.0).unwrap());

    h.events.resize(Viewport::new(64, 32).unwrap());
    let after = playing(seq.tick(0.1).unwrap());
    let comp = seq.compositor().unwrap();
    assert_eq!((comp.width(), comp.height()), (64, 32));
    assert_eq!(after.draw, DrawOutcome::Drawn(FrameIndex(0)));
}

#[test]
fn container_height_resolves_against_viewport() {
    let (seq, h) = mount(4, &[]);
    assert_eq!(seq.container_height_px(), 200.0);
    h.events.resize(Viewport::new(100, 300).unwrap());
    assert_eq!(seq.container_height_px(), 600.0);
}

#[test]
fn unmount_mid_load_stops_all_updates() {
    let (mut seq, h) = mount(50, &[]);
    seq.unmount();
    assert_eq!(seq.gate().state(), GateState::Closed);
    assert_eq!(seq.tick(1.0).unwrap(), Presentation::Unmounted);
    assert!(!seq.is_playing());
    assert_eq!(h.events.listener_count(), 0);
    assert_eq!(h.overlay.get().opacity, 0.0);
}

#[test]
fn unmount_after_load_releases_listener_and_freezes_targets() {
    let (mut seq, h) = mount(10, &[]);
    seq.wait_loaded(Duration::from_secs(10)).unwrap();
    playing(seq.tick(0.0).unwrap());
    assert_eq!(h.events.listener_count(), 1);

    drop(seq);
    assert_eq!(h.events.listener_count(), 0);

    h.events.scroll_to(190.0);
    assert_eq!(h.overlay.get().opacity, 0.0);
    assert_eq!(h.button.get().opacity, 0.0);
}

#[test]
fn failed_surface_setup_is_retried_after_resize() {
    let props = ScrollImageProps::new("/seq", 3);
    let events = ViewportEvents::new(Viewport::new(70_000, 100).unwrap());
    let host = HostBindings {
        events: events.clone(),
        layout: Box::new(FixedLayout(Some(0.0))),
        overlay: Box::new(SharedVisual::default()),
        button: Box::new(SharedVisual::default()),
    };
    let opts = ScrollSequenceOpts {
        extension: "png".to_string(),
        ..ScrollSequenceOpts::default()
    };
    let mut seq = ScrollSequence::mount(props.clone(), source(&props, &[]), host, opts).unwrap();

    assert!(seq.wait_loaded(Duration::from_secs(10)).is_err());
    assert!(!seq.is_playing());
    assert_eq!(seq.gate().state(), GateState::Open);
    assert_eq!(seq.store().unwrap().decoded_count(), 3);
    assert!(seq.tick(0.0).is_err());

    events.resize(Viewport::new(100, 100).unwrap());
    let frame = playing(seq.tick(0.1).unwrap());
    assert_eq!(frame.draw, DrawOutcome::Drawn(FrameIndex(0)));
    assert!(seq.is_playing());
    assert_eq!(events.listener_count(), 1);
}

#[test]
fn oversized_frame_is_skipped_during_playback() {
    let props = ScrollImageProps::new("/seq", 2);
    let desc = props.descriptor("png");
    let wide = image::RgbaImage::from_pixel(70_000, 1, image::Rgba([1, 2, 3, 255]));
    let mut wide_png = Vec::new();
    image::DynamicImage::ImageRgba8(wide)
        .write_to(&mut Cursor::new(&mut wide_png), image::ImageFormat::Png)
        .unwrap();
    let src = MemoryFrameSource::new()
        .with(desc.path_for(FrameIndex(0)), png(40))
        .with(desc.path_for(FrameIndex(1)), wide_png);

    let events = ViewportEvents::new(Viewport::new(100, 100).unwrap());
    let host = HostBindings {
        events: events.clone(),
        layout: Box::new(FixedLayout(Some(0.0))),
        overlay: Box::new(SharedVisual::default()),
        button: Box::new(SharedVisual::default()),
    };
    let opts = ScrollSequenceOpts {
        extension: "png".to_string(),
        ..ScrollSequenceOpts::default()
    };
    let mut seq = ScrollSequence::mount(props, Arc::new(src), host, opts).unwrap();
    seq.wait_loaded(Duration::from_secs(10)).unwrap();
    assert_eq!(seq.store().unwrap().missing_count(), 1);

    playing(seq.tick(0.0).unwrap());
    events.scroll_to(40.0);
    let end = playing(seq.tick(0.1).unwrap());
    assert_eq!(
        end.draw,
        DrawOutcome::Held {
            requested: FrameIndex(1),
            showing: Some(FrameIndex(0)),
        }
    );
}
