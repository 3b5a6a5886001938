//! Bilinear resizing of rendered RGBA buffers.

use image::{imageops, imageops::FilterType, RgbaImage};

use crate::RenderError;

/// Resize an RGBA buffer with bilinear filtering. Returns the input
/// unchanged when the size already matches.
///
/// Interpolation runs on premultiplied alpha, so transparent cells fade
/// neighbouring data out without darkening its color.
pub fn resize_rgba(
    mut pixels: Vec<u8>,
    width: usize,
    height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Result<Vec<u8>, RenderError> {
    if width == dst_width && height == dst_height {
        return Ok(pixels);
    }

    premultiply(&mut pixels);
    let src = RgbaImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        RenderError::InvalidBuffer(format!("{}x{} RGBA buffer has the wrong length", width, height))
    })?;

    let resized = imageops::resize(&src, dst_width as u32, dst_height as u32, FilterType::Triangle);
    let mut out = resized.into_raw();
    unpremultiply(&mut out);
    Ok(out)
}

fn premultiply(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        for c in &mut px[..3] {
            *c = ((*c as u32 * alpha + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let alpha = px[3] as u32;
        if alpha == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
        }
    }
}
