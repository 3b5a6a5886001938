//! Color mapping of fields: palettes, domains, missing data and orientation.

use renderer::{render_field, Field, Palette, RenderOptions, ValueDomain};
use test_utils::{assert_alpha_all, create_grid_with_nans, create_test_grid};

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).expect("valid PNG").to_rgba8()
}

#[test]
fn test_lo_maps_to_first_and_hi_to_last_entry() {
    let domain = ValueDomain::new(250.0, 310.0, 1.0);
    let pixels = renderer::colorize(&[250.0, 310.0], &domain, Palette::Rainbow);
    let lut = Palette::Rainbow.lut();
    assert_eq!(&pixels[0..3], &lut[0]);
    assert_eq!(&pixels[4..7], &lut[255]);
    assert_alpha_all!(pixels, 255);
}

#[test]
fn test_missing_cells_transparent() {
    let values = create_grid_with_nans(4, 4, &[(1, 1)]);
    let domain = ValueDomain::new(0.0, 15.0, 1.0);
    let pixels = renderer::colorize(&values, &domain, Palette::Grayscale);
    // Row 1, column 1 of a 4-wide grid
    let nan_px = 5 * 4;
    assert_eq!(pixels[nan_px + 3], 0);
    assert_eq!(pixels[3], 255);
}

#[test]
fn test_all_nan_field_renders_blank_tile() {
    let values = vec![f64::NAN; 9];
    let field = Field {
        values: &values,
        width: 3,
        height: 3,
    };
    let options = RenderOptions {
        width: 64,
        height: 32,
        ..Default::default()
    };

    let image = render_field(field, &options).unwrap();
    assert!(image.domain.is_none());
    let decoded = decode(&image.png);
    assert_eq!(decoded.dimensions(), (64, 32));
    assert_alpha_all!(decoded.into_raw(), 0);
}

#[test]
fn test_output_is_north_up() {
    // Row 0 is the southern row: low values. Grayscale puts them dark.
    let values = vec![0.0, 0.0, 10.0, 10.0];
    let field = Field {
        values: &values,
        width: 2,
        height: 2,
    };
    let options = RenderOptions {
        width: 2,
        height: 2,
        color_range: Some("0,10".to_string()),
        palette: Palette::Grayscale,
        gamma: 1.0,
    };

    let decoded = decode(&render_field(field, &options).unwrap().png);
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(0, 1).0, [0, 0, 0, 255]);
}

#[test]
fn test_resized_to_requested_size() {
    let values = create_test_grid(10, 5);
    let field = Field {
        values: &values,
        width: 10,
        height: 5,
    };
    let options = RenderOptions {
        width: 100,
        height: 100,
        ..Default::default()
    };

    let image = render_field(field, &options).unwrap();
    let decoded = decode(&image.png);
    assert_eq!(decoded.dimensions(), (100, 100));
    assert_alpha_all!(decoded.into_raw(), 255);
    assert_eq!(image.content_type(), "image/png");
}

#[test]
fn test_field_shape_checked() {
    let values = vec![1.0; 5];
    let field = Field {
        values: &values,
        width: 2,
        height: 2,
    };
    assert!(render_field(field, &RenderOptions::default()).is_err());
}
