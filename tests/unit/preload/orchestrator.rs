use std::io::Cursor;
use std::sync::{Condvar, Mutex};

use super::*;
use crate::assets::source::MemoryFrameSource;

fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn source_with_gaps(desc: &SequenceDescriptor, gaps: &[u32]) -> MemoryFrameSource {
    let mut src = MemoryFrameSource::new();
    for i in desc.indices() {
        if gaps.contains(&i.0) {
            continue;
        }
        src.insert(desc.path_for(i), png_bytes([i.0 as u8, 0, 0, 255]));
    }
    src
}

#[test]
fn progress_percent_is_floored() {
    assert_eq!(LoadProgress::new(1, 3).percent, 33);
    assert_eq!(LoadProgress::new(2, 3).percent, 66);
    assert_eq!(LoadProgress::new(3, 3).percent, 100);
    assert!(LoadProgress::new(3, 3).is_complete);
    assert!(!LoadProgress::started(3).is_complete);
    assert_eq!(LoadProgress::new(0, 0).percent, 100);
    assert!(LoadProgress::new(0, 0).is_complete);
}

#[test]
fn partial_failures_still_complete_with_sentinels() {
    let desc = SequenceDescriptor::new("seq", 10, "png");
    let src = source_with_gaps(&desc, &[3, 7]);
    let task = preload(&desc, Arc::new(src), &PreloadOpts::default()).unwrap();

    let mut progress = Vec::new();
    let mut resolved = None;
    for ev in task {
        match ev {
            LoadEvent::Progress(p) => {
                assert!(resolved.is_none(), "progress after resolve");
                progress.push(p);
            }
            LoadEvent::Resolved(store) => resolved = Some(store),
        }
    }

    let store = resolved.expect("stream must resolve");
    assert_eq!(progress.len(), 10);
    for pair in progress.windows(2) {
        assert!(pair[0].loaded_count < pair[1].loaded_count);
    }
    assert_eq!(progress.iter().filter(|p| p.is_complete).count(), 1);
    let last = progress.last().unwrap();
    assert!(last.is_complete);
    assert_eq!(last.loaded_count, 10);
    assert_eq!(last.percent, 100);

    assert_eq!(store.len(), 10);
    assert!(store.is_missing(FrameIndex(3)));
    assert!(store.is_missing(FrameIndex(7)));
    assert_eq!(store.missing_count(), 2);
    assert_eq!(store.frame(FrameIndex(5)).unwrap().rgba8_premul[0], 5);
}

#[test]
fn undecodable_bytes_become_sentinels() {
    let desc = SequenceDescriptor::new("seq", 2, "png");
    let src = MemoryFrameSource::new()
        .with(desc.path_for(FrameIndex(0)), png_bytes([1, 2, 3, 255]))
        .with(desc.path_for(FrameIndex(1)), b"garbage".to_vec());
    let store = preload(&desc, Arc::new(src), &PreloadOpts::default())
        .unwrap()
        .wait()
        .unwrap();
    assert!(matches!(
        store.slot(FrameIndex(1)),
        Some(Err(DecodeError::Image { .. }))
    ));
}

#[test]
fn all_frames_failing_still_resolves() {
    let desc = SequenceDescriptor::new("seq", 4, "png");
    let store = preload(
        &desc,
        Arc::new(MemoryFrameSource::new()),
        &PreloadOpts {
            max_in_flight: Some(2),
        },
    )
    .unwrap()
    .wait()
    .unwrap();
    assert_eq!(store.len(), 4);
    assert!(store.all_missing());
}

#[test]
fn zero_frames_resolve_immediately() {
    let desc = SequenceDescriptor::new("seq", 0, "png");
    let task = preload(&desc, Arc::new(MemoryFrameSource::new()), &PreloadOpts::default()).unwrap();
    match task.try_next() {
        Some(LoadEvent::Progress(p)) => assert!(p.is_complete),
        other => panic!("expected complete progress, got {other:?}"),
    }
    match task.try_next() {
        Some(LoadEvent::Resolved(store)) => assert!(store.is_empty()),
        other => panic!("expected resolved, got {other:?}"),
    }
}

#[test]
fn zero_worker_cap_is_rejected() {
    let desc = SequenceDescriptor::new("seq", 2, "png");
    let err = preload(
        &desc,
        Arc::new(MemoryFrameSource::new()),
        &PreloadOpts {
            max_in_flight: Some(0),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("max_in_flight"));
}

/// Holds every fetch until released.
struct GatedSource {
    inner: MemoryFrameSource,
    open: Mutex<bool>,
    cv: Condvar,
}

impl GatedSource {
    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }
}

impl FrameSource for GatedSource {
    fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
        drop(open);
        self.inner.fetch(path)
    }
}

#[test]
fn cancelled_load_emits_nothing_after_late_results() {
    let desc = SequenceDescriptor::new("seq", 6, "png");
    let gated = Arc::new(GatedSource {
        inner: source_with_gaps(&desc, &[]),
        open: Mutex::new(false),
        cv: Condvar::new(),
    });
    let task = preload(
        &desc,
        gated.clone(),
        &PreloadOpts {
            max_in_flight: Some(2),
        },
    )
    .unwrap();

    assert!(task.try_next().is_none());
    task.cancel();
    gated.release();

    std::thread::sleep(Duration::from_millis(50));
    assert!(task.try_next().is_none());
    assert!(task.recv_timeout(Duration::from_millis(50)).is_none());
    assert!(task.is_cancelled());
    assert!(task.wait().is_err());
}

#[test]
fn dropping_the_task_cancels_workers() {
    let desc = SequenceDescriptor::new("seq", 3, "png");
    let gated = Arc::new(GatedSource {
        inner: source_with_gaps(&desc, &[]),
        open: Mutex::new(false),
        cv: Condvar::new(),
    });
    let task = preload(&desc, gated.clone(), &PreloadOpts::default()).unwrap();
    let token = task.cancel_token();
    drop(task);
    assert!(token.is_cancelled());
    gated.release();
}

#[test]
fn oversized_frame_becomes_a_sentinel() {
    let desc = SequenceDescriptor::new("seq", 2, "png");
    let wide = image::RgbaImage::from_pixel(70_000, 1, image::Rgba([1, 2, 3, 255]));
    let mut wide_png = Vec::new();
    image::DynamicImage::ImageRgba8(wide)
        .write_to(&mut Cursor::new(&mut wide_png), image::ImageFormat::Png)
        .unwrap();
    let src = MemoryFrameSource::new()
        .with(desc.path_for(FrameIndex(0)), png_bytes([9, 9, 9, 255]))
        .with(desc.path_for(FrameIndex(1)), wide_png);

    let store = preload(&desc, Arc::new(src), &PreloadOpts::default())
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(store.decoded_count(), 1);
    assert!(store.is_missing(FrameIndex(1)));
    assert!(matches!(
        store.slot(FrameIndex(1)),
        Some(Err(DecodeError::Image { .. }))
    ));
}
