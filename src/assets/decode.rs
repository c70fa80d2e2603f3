use std::sync::Arc;

use crate::assets::store::{DecodeError, Frame};

/// Largest frame edge the CPU compositor can draw.
pub const MAX_FRAME_DIM: u32 = u16::MAX as u32;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
///
/// `path` is only used to label the error.
pub fn decode_frame(path: &str, bytes: &[u8]) -> Result<Frame, DecodeError> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| DecodeError::Image {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Image {
            path: path.to_string(),
            reason: "decoded image is empty".to_string(),
        });
    }
    if width > MAX_FRAME_DIM || height > MAX_FRAME_DIM {
        return Err(DecodeError::Image {
            path: path.to_string(),
            reason: format!("{width}x{height} exceeds the {MAX_FRAME_DIM}px drawable limit"),
        });
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Frame {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
