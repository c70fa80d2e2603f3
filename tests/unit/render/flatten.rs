use std::path::PathBuf;

use super::*;

#[test]
fn flatten_makes_pixels_opaque_without_changing_color() {
    let mut px = vec![100, 50, 0, 128, 0, 0, 0, 0];
    flatten_onto_black(&mut px);
    assert_eq!(px, vec![100, 50, 0, 255, 0, 0, 0, 255]);
}

#[test]
fn black_overlay_endpoints() {
    let mut untouched = vec![200, 100, 50, 255];
    apply_black_overlay(&mut untouched, 0.0);
    assert_eq!(untouched, vec![200, 100, 50, 255]);

    let mut full = vec![200, 100, 50, 255, 0, 0, 0, 0];
    apply_black_overlay(&mut full, 1.0);
    assert_eq!(full, vec![0, 0, 0, 255, 0, 0, 0, 255]);
}

#[test]
fn black_overlay_half_darkens() {
    let mut px = vec![200, 100, 0, 255];
    apply_black_overlay(&mut px, 0.5);
    // 0.5 -> 128/255 overlay alpha.
    assert_eq!(px, vec![100, 50, 0, 255]);
}

#[test]
fn write_png_roundtrips_dimensions() {
    let path = PathBuf::from("target")
        .join("unit_flatten")
        .join("out.png");
    let _ = std::fs::remove_file(&path);
    write_png(&path, &[255, 0, 0, 255, 0, 255, 0, 255], 2, 1).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0, 255]);
    assert!(write_png(&path, &[0; 3], 1, 1).is_err());
}
