//! Gradient palettes and color mapping of gridded values.

use rayon::prelude::*;

use crate::scale::ValueDomain;

/// Minimum cells before color mapping is split across threads.
const PARALLEL_THRESHOLD: usize = 64 * 64;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// Fractional position (0..=1) and color of a gradient stop.
type Stop = (f64, [u8; 3]);

const RAINBOW_STOPS: &[Stop] = &[
    (0.00, [0, 0, 130]),
    (0.20, [0, 0, 255]),
    (0.40, [0, 255, 255]),
    (0.60, [0, 255, 0]),
    (0.80, [255, 255, 0]),
    (1.00, [255, 0, 0]),
];

const WIND_STOPS: &[Stop] = &[
    (0.00, [68, 0, 85]),
    (0.15, [0, 0, 130]),
    (0.30, [0, 0, 255]),
    (0.45, [0, 255, 255]),
    (0.60, [0, 255, 0]),
    (0.75, [255, 255, 0]),
    (0.90, [255, 128, 0]),
    (1.00, [255, 255, 255]),
];

/// Named color ramps available to renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Rainbow,
    Wind,
    Grayscale,
}

impl Palette {
    /// Case-insensitive lookup; unknown names fall back to rainbow.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wind" | "windy" => Palette::Wind,
            "grayscale" | "greyscale" => Palette::Grayscale,
            _ => Palette::Rainbow,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Rainbow => "rainbow",
            Palette::Wind => "wind",
            Palette::Grayscale => "grayscale",
        }
    }

    /// 256-entry lookup table.
    pub fn lut(&self) -> [[u8; 3]; 256] {
        match self {
            Palette::Rainbow => build_lut(RAINBOW_STOPS),
            Palette::Wind => build_lut(WIND_STOPS),
            Palette::Grayscale => {
                let mut lut = [[0u8; 3]; 256];
                for (i, entry) in lut.iter_mut().enumerate() {
                    *entry = [i as u8; 3];
                }
                lut
            }
        }
    }
}

/// Sample stops at `i / 255` for each entry, interpolating linearly inside
/// the first segment whose upper stop is at or above the sample. Channels
/// are truncated toward zero.
fn build_lut(stops: &[Stop]) -> [[u8; 3]; 256] {
    let mut lut = [[0u8; 3]; 256];
    if stops.is_empty() {
        return lut;
    }
    if stops.len() == 1 {
        return [stops[0].1; 256];
    }

    let last_segment = stops.len() - 2;
    for (i, entry) in lut.iter_mut().enumerate() {
        let t = i as f64 / 255.0;
        for (s, pair) in stops.windows(2).enumerate() {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 || s == last_segment {
                let lt = if t1 == t0 { 0.0 } else { (t - t0) / (t1 - t0) };
                *entry = interpolate(c0, c1, lt);
                break;
            }
        }
    }
    lut
}

fn interpolate(c0: [u8; 3], c1: [u8; 3], t: f64) -> [u8; 3] {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
    [
        channel(c0[0], c1[0]),
        channel(c0[1], c1[1]),
        channel(c0[2], c1[2]),
    ]
}

/// Map values to RGBA pixels through `palette`.
///
/// Finite values are opaque; NaN and infinite cells are fully transparent.
/// Output rows follow input rows.
pub fn colorize(values: &[f64], domain: &ValueDomain, palette: Palette) -> Vec<u8> {
    let lut = palette.lut();
    let mut pixels = vec![0u8; values.len() * 4];

    let paint = |(px, v): (&mut [u8], &f64)| {
        if v.is_finite() {
            let [r, g, b] = lut[domain.index(*v) as usize];
            px.copy_from_slice(&[r, g, b, 255]);
        }
    };

    if values.len() >= PARALLEL_THRESHOLD {
        pixels
            .par_chunks_exact_mut(4)
            .zip(values.par_iter())
            .for_each(paint);
    } else {
        pixels.chunks_exact_mut(4).zip(values.iter()).for_each(paint);
    }

    pixels
}

/// Reverse the row order of an RGBA buffer in place.
pub fn flip_rows(pixels: &mut [u8], width: usize) {
    let row_bytes = width * 4;
    if row_bytes == 0 {
        return;
    }
    let height = pixels.len() / row_bytes;
    for y in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - 1 - y) * row_bytes);
        top[y * row_bytes..(y + 1) * row_bytes].swap_with_slice(&mut bottom[..row_bytes]);
    }
}
