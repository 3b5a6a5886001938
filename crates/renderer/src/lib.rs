//! Image rendering for weather data visualization.
//!
//! Turns a 2-D lat/lon field into a transparent PNG:
//! - value domain from an explicit range or the 2nd/98th percentiles
//! - gamma-adjusted index into a 256-entry gradient palette
//! - transparent cells where data is missing
//! - bilinear resize to the requested size

pub mod gradient;
pub mod png;
pub mod resample;
pub mod scale;

use thiserror::Error;
use tracing::debug;

pub use gradient::{colorize, Color, Palette};
pub use png::{create_png, create_png_auto, create_transparent_png, PngError, PNG_CONTENT_TYPE};
pub use scale::{effective_gamma, percentile_sorted, ValueDomain};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("field has {actual} values, expected {width}x{height}")]
    FieldShape {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error(transparent)]
    Png(#[from] PngError),
}

/// A 2-D field with rows ordered south to north (ascending latitude).
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub values: &'a [f64],
    pub width: usize,
    pub height: usize,
}

/// Output size and color mapping settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: usize,
    pub height: usize,
    /// Explicit "min,max" color range
    pub color_range: Option<String>,
    pub palette: Palette,
    pub gamma: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            color_range: None,
            palette: Palette::Rainbow,
            gamma: 1.0,
        }
    }
}

/// Encoded image plus the domain it was mapped with (`None` when blank).
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub domain: Option<ValueDomain>,
}

impl RenderedImage {
    pub fn content_type(&self) -> &'static str {
        PNG_CONTENT_TYPE
    }
}

/// Render a field to a north-up PNG of the requested size.
pub fn render_field(field: Field<'_>, options: &RenderOptions) -> Result<RenderedImage, RenderError> {
    if field.values.len() != field.width * field.height {
        return Err(RenderError::FieldShape {
            width: field.width,
            height: field.height,
            actual: field.values.len(),
        });
    }

    let domain = match ValueDomain::resolve(
        field.values,
        options.color_range.as_deref(),
        options.gamma,
    ) {
        Some(domain) if field.values.iter().any(|v| v.is_finite()) => domain,
        _ => {
            debug!(width = options.width, height = options.height, "No valid data, rendering blank tile");
            return Ok(RenderedImage {
                png: create_transparent_png(options.width, options.height)?,
                width: options.width,
                height: options.height,
                domain: None,
            });
        }
    };

    let mut pixels = colorize(field.values, &domain, options.palette);
    gradient::flip_rows(&mut pixels, field.width);

    let pixels = resample::resize_rgba(
        pixels,
        field.width,
        field.height,
        options.width,
        options.height,
    )?;

    Ok(RenderedImage {
        png: create_png_auto(&pixels, options.width, options.height)?,
        width: options.width,
        height: options.height,
        domain: Some(domain),
    })
}
