//! Tests for PNG encoding functionality.
//!
//! Encoded output is decoded again with the `image` crate to check that the
//! hand-written chunks form a valid PNG.

use renderer::png::{create_png, create_png_auto, create_transparent_png};

// ============================================================================
// Helper functions
// ============================================================================

/// Pixels quantized to a handful of palette colors, like an un-resampled tile
fn banded_pixels(width: usize, height: usize) -> Vec<u8> {
    let bands: [[u8; 4]; 4] = [
        [0, 0, 130, 255],
        [0, 255, 255, 255],
        [255, 255, 0, 255],
        [0, 0, 0, 0],
    ];
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for _ in 0..width {
            pixels.extend_from_slice(&bands[y * bands.len() / height]);
        }
    }
    pixels
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

// ============================================================================
// Encoding tests
// ============================================================================

#[test]
fn test_signature() {
    let png = create_png(&banded_pixels(4, 4), 4, 4).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
}

#[test]
fn test_rgba_roundtrip_preserves_pixels() {
    let pixels = banded_pixels(8, 8);
    let decoded = decode(&create_png(&pixels, 8, 8).unwrap());
    assert_eq!(decoded.dimensions(), (8, 8));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_indexed_roundtrip_preserves_transparency() {
    let pixels = banded_pixels(16, 16);
    let png = create_png_auto(&pixels, 16, 16).unwrap();
    // Color type byte of IHDR: signature(8) + length(4) + type(4) + w(4) + h(4) + depth(1)
    assert_eq!(png[25], 3);

    let decoded = decode(&png);
    assert_eq!(decoded.get_pixel(0, 15).0, [0, 0, 0, 0]);
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 130, 255]);
}

#[test]
fn test_auto_falls_back_to_rgba() {
    let pixels: Vec<u8> = (0..400u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
        .collect();
    let png = create_png_auto(&pixels, 20, 20).unwrap();
    assert_eq!(png[25], 6);
    assert_eq!(decode(&png).into_raw(), pixels);
}

#[test]
fn test_transparent_png() {
    let decoded = decode(&create_transparent_png(100, 50).unwrap());
    assert_eq!(decoded.dimensions(), (100, 50));
    assert!(decoded.pixels().all(|p| p.0[3] == 0));
}
