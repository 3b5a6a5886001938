//! BoundingBox parsing and clamping at the request edge.

use wms_common::bbox::{mercator_to_wgs84, BboxParseError, BoundingBox};

// ============================================================================
// from_wms_string tests
// ============================================================================

#[test]
fn test_parse_request_bbox() {
    let bbox = BoundingBox::from_wms_string("-10,30,10,50").unwrap();
    assert_eq!(bbox, BoundingBox::new(-10.0, 30.0, 10.0, 50.0));
}

#[test]
fn test_parse_tolerates_whitespace() {
    let bbox = BoundingBox::from_wms_string(" 0, 0, 100, 100 ").unwrap();
    assert_eq!(bbox.max_x, 100.0);
}

#[test]
fn test_parse_scientific_notation() {
    let bbox = BoundingBox::from_wms_string("1e-6,2e-6,1e6,2e6").unwrap();
    assert!((bbox.min_x - 1e-6).abs() < 1e-12);
    assert!((bbox.max_y - 2e6).abs() < 1e-6);
}

#[test]
fn test_parse_wrong_arity() {
    assert!(matches!(
        BoundingBox::from_wms_string("0,0,100"),
        Err(BboxParseError::InvalidFormat(_))
    ));
    assert!(matches!(
        BoundingBox::from_wms_string("0,0,100,100,200"),
        Err(BboxParseError::InvalidFormat(_))
    ));
    assert!(BoundingBox::from_wms_string("").is_err());
}

#[test]
fn test_parse_bad_number() {
    assert!(matches!(
        BoundingBox::from_wms_string("abc,0,100,100"),
        Err(BboxParseError::InvalidNumber(_))
    ));
    assert!(matches!(
        BoundingBox::from_wms_string("0,0,inf,100"),
        Err(BboxParseError::InvalidNumber(_))
    ));
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn test_clamp_outside_extent_inverts() {
    let extent = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let request = BoundingBox::new(190.0, 0.0, 200.0, 10.0);
    let clamped = request.clamp_to(&extent);
    assert!(clamped.min_x > clamped.max_x);
    assert_eq!(clamped.min_y, 0.0);
}

#[test]
fn test_clamp_inside_extent_is_identity() {
    let extent = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let request = BoundingBox::new(-10.0, 30.0, 10.0, 50.0);
    assert_eq!(request.clamp_to(&extent), request);
}

#[test]
fn test_wms_string_roundtrip() {
    let bbox = BoundingBox::new(-10.5, 30.0, 10.25, 50.0);
    assert_eq!(bbox.to_wms_string(), "-10.5,30,10.25,50");
}

// ============================================================================
// Web Mercator conversion
// ============================================================================

#[test]
fn test_mercator_world_extent() {
    let (lon, lat) = mercator_to_wgs84(20037508.342789244, 20037508.342789244);
    assert!((lon - 180.0).abs() < 1e-6);
    assert!((lat - 85.0511287798).abs() < 1e-6);
}

#[test]
fn test_from_web_mercator() {
    let bbox = BoundingBox::from_web_mercator(-1113194.9, 0.0, 1113194.9, 1118889.97);
    assert!((bbox.min_x + 10.0).abs() < 1e-3);
    assert!((bbox.max_x - 10.0).abs() < 1e-3);
    assert!(bbox.min_y.abs() < 1e-9);
    assert!((bbox.max_y - 10.0).abs() < 1e-3);
}
