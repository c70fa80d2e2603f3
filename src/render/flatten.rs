use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    error::{ScrollSeqError, ScrollSeqResult},
    math::{mul_div255_u16, opacity_to_u8},
};

/// Composite premultiplied RGBA8 over opaque black, in place.
pub fn flatten_onto_black(rgba8_premul: &mut [u8]) {
    for px in rgba8_premul.chunks_exact_mut(4) {
        // Color channels are already premultiplied, so black contributes nothing.
        px[3] = 255;
    }
}

/// Darken towards black by `opacity`, as a black overlay layer drawn on top would.
pub fn apply_black_overlay(rgba8_premul: &mut [u8], opacity: f64) {
    let op = u16::from(opacity_to_u8(opacity));
    if op == 0 {
        return;
    }
    let inv = 255 - op;
    for px in rgba8_premul.chunks_exact_mut(4) {
        px[0] = mul_div255_u16(u16::from(px[0]), inv) as u8;
        px[1] = mul_div255_u16(u16::from(px[1]), inv) as u8;
        px[2] = mul_div255_u16(u16::from(px[2]), inv) as u8;
        px[3] = (op + mul_div255_u16(u16::from(px[3]), inv)).min(255) as u8;
    }
}

/// Write opaque RGBA8 as PNG, creating parent directories.
pub fn write_png(path: &Path, rgba8: &[u8], width: u32, height: u32) -> ScrollSeqResult<()> {
    if rgba8.len() != width as usize * height as usize * 4 {
        return Err(ScrollSeqError::render("png buffer length mismatch"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        rgba8,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/flatten.rs"]
mod tests;
