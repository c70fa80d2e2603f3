use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let frame = decode_frame("1.png", &png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(frame.width, 3);
    assert_eq!(frame.height, 2);
    assert_eq!(frame.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(
        &frame.rgba8_premul[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn fully_transparent_pixels_zero_color() {
    let frame = decode_frame("1.png", &png_bytes(1, 1, [255, 255, 255, 0])).unwrap();
    assert_eq!(frame.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn garbage_bytes_are_a_decode_error_with_path() {
    let err = decode_frame("frames/7.webp", b"not an image").unwrap_err();
    assert!(matches!(err, DecodeError::Image { .. }));
    assert!(err.to_string().contains("frames/7.webp"));
}

#[test]
fn frames_wider_than_the_surface_limit_are_rejected() {
    let wide = png_bytes(MAX_FRAME_DIM + 1, 1, [0, 0, 0, 255]);
    let err = decode_frame("1.png", &wide).unwrap_err();
    assert!(matches!(err, DecodeError::Image { .. }));
    assert!(err.to_string().contains("drawable limit"));

    let edge = decode_frame("2.png", &png_bytes(MAX_FRAME_DIM, 1, [0, 0, 0, 255])).unwrap();
    assert_eq!(edge.width, MAX_FRAME_DIM);
}
