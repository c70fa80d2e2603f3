use std::sync::Arc;

use crate::foundation::core::FrameIndex;

#[derive(Clone, Debug)]
/// Decoded raster frame in premultiplied RGBA8 form.
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Frame {
    /// Build a frame filled with a single premultiplied color.
    pub fn solid(width: u32, height: u32, rgba8_premul: [u8; 4]) -> Self {
        let px = width as usize * height as usize;
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&rgba8_premul);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Why a frame slot holds no image.
///
/// These are recovered locally: the slot is skip-drawn and still counts toward load progress.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The source could not produce bytes for `path`.
    #[error("fetch '{path}': {reason}")]
    Fetch { path: String, reason: String },

    /// Bytes were fetched but are not a decodable image.
    #[error("decode '{path}': {reason}")]
    Image { path: String, reason: String },

    /// The load was cancelled before this frame finished.
    #[error("load cancelled before '{path}' completed")]
    Cancelled { path: String },
}

/// One entry of a [`FrameStore`]: a decoded frame or the reason it is missing.
pub type FrameSlot = Result<Frame, DecodeError>;

/// Per-instance ordered frames for one sequence, indexed `0..frame_count`.
///
/// Filled once by the preloader, then read-only.
#[derive(Clone, Debug, Default)]
pub struct FrameStore {
    slots: Vec<FrameSlot>,
}

impl FrameStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: Vec<FrameSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: FrameIndex) -> Option<&FrameSlot> {
        self.slots.get(index.0 as usize)
    }

    /// Decoded frame at `index`; `None` for the missing-frame sentinel or out of range.
    pub fn frame(&self, index: FrameIndex) -> Option<&Frame> {
        self.slot(index).and_then(|s| s.as_ref().ok())
    }

    pub fn is_missing(&self, index: FrameIndex) -> bool {
        self.frame(index).is_none()
    }

    pub fn decoded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_ok()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.slots.len() - self.decoded_count()
    }

    /// True when at least one frame was requested and none decoded.
    pub fn all_missing(&self) -> bool {
        !self.slots.is_empty() && self.decoded_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (FrameIndex, &DecodeError)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().err().map(|e| (FrameIndex(i as u32), e)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
