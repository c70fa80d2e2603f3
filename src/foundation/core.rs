use crate::foundation::error::{ScrollSeqError, ScrollSeqResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Zero-based index into a frame sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// One-based file number used by the asset layout (`{folder}/{n}.{ext}`).
    pub fn file_number(self) -> u32 {
        self.0 + 1
    }
}

/// Size of the visible viewport in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> ScrollSeqResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScrollSeqError::validation(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `1280x720`).
    pub fn parse(s: &str) -> ScrollSeqResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| ScrollSeqError::validation(format!("viewport '{s}' is not WxH")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|e| ScrollSeqError::validation(format!("viewport width '{w}': {e}")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|e| ScrollSeqError::validation(format!("viewport height '{h}': {e}")))?;
        Self::new(w, h)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        use crate::foundation::math::mul_div255_u8;
        Self {
            r: mul_div255_u8(u16::from(r), u16::from(a)),
            g: mul_div255_u8(u16::from(g), u16::from(a)),
            b: mul_div255_u8(u16::from(b), u16::from(a)),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
