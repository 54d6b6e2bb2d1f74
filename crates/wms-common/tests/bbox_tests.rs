//! Tests for BoundingBox construction and the KVP BBOX form.

use wms_common::bbox::{BboxParseError, BoundingBox, Position};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.lower_corner, Position::new(-180.0, -90.0));
    assert_eq!(bbox.upper_corner, Position::new(180.0, 90.0));
    assert!(bbox.crs.is_none());
    assert!(bbox.dimensions.is_none());
}

#[test]
fn test_bbox_with_crs() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).with_crs("EPSG:3857");
    assert_eq!(bbox.crs.as_deref(), Some("EPSG:3857"));
}

#[test]
fn test_bbox_default_is_zero() {
    let bbox = BoundingBox::default();
    assert_eq!(bbox.lower_corner, Position::default());
    assert_eq!(bbox.upper_corner, Position::default());
}

// ============================================================================
// from_kvp tests
// ============================================================================

#[test]
fn test_parse_kvp_bbox_integer() {
    let bbox = BoundingBox::from_kvp("0,0,100,100").unwrap();
    assert_eq!(bbox.min_x(), 0.0);
    assert_eq!(bbox.min_y(), 0.0);
    assert_eq!(bbox.max_x(), 100.0);
    assert_eq!(bbox.max_y(), 100.0);
}

#[test]
fn test_parse_kvp_bbox_floating() {
    let bbox = BoundingBox::from_kvp("-125.5,24.75,-66.25,50.125").unwrap();
    assert!((bbox.min_x() - (-125.5)).abs() < 0.001);
    assert!((bbox.min_y() - 24.75).abs() < 0.001);
    assert!((bbox.max_x() - (-66.25)).abs() < 0.001);
    assert!((bbox.max_y() - 50.125).abs() < 0.001);
}

#[test]
fn test_parse_kvp_bbox_scientific_notation() {
    let bbox = BoundingBox::from_kvp("1e-6,2e-6,1e6,2e6").unwrap();
    assert!((bbox.min_x() - 1e-6).abs() < 1e-10);
    assert!((bbox.max_x() - 1e6).abs() < 0.001);
}

#[test]
fn test_parse_kvp_bbox_web_mercator() {
    // EPSG:3857 coordinates (meters)
    let bbox = BoundingBox::from_kvp("-20037508.34,-20037508.34,20037508.34,20037508.34").unwrap();
    assert!((bbox.min_x() - (-20037508.34)).abs() < 0.01);
    assert!((bbox.max_x() - 20037508.34).abs() < 0.01);
}

#[test]
fn test_parse_kvp_bbox_invalid_format_too_few() {
    let result = BoundingBox::from_kvp("0,0,100");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_kvp_bbox_invalid_format_too_many() {
    let result = BoundingBox::from_kvp("0,0,100,100,200");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_kvp_bbox_invalid_number() {
    let result = BoundingBox::from_kvp("abc,0,100,100");
    assert_eq!(result, Err(BboxParseError::InvalidNumber("abc".to_string())));
}

#[test]
fn test_parse_kvp_bbox_empty_string() {
    let result = BoundingBox::from_kvp("");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_kvp_bbox_whitespace() {
    // Tokens are not trimmed
    assert!(BoundingBox::from_kvp(" 0, 0, 100, 100 ").is_err());
}

#[test]
fn test_parse_kvp_does_not_check_ordering() {
    let bbox = BoundingBox::from_kvp("10,10,-10,-10").unwrap();
    assert!(!bbox.is_ordered());
}

// ============================================================================
// to_kvp tests
// ============================================================================

#[test]
fn test_to_kvp_six_decimals() {
    let bbox = BoundingBox::from_kvp("-180.0,-90.0,180.0,90.0").unwrap();
    assert_eq!(bbox.to_kvp(), "-180.000000,-90.000000,180.000000,90.000000");
}

#[test]
fn test_to_kvp_rounds() {
    let bbox = BoundingBox::new(0.1234567, 0.0, 1.0000004, 2.5);
    assert_eq!(bbox.to_kvp(), "0.123457,0.000000,1.000000,2.500000");
}

#[test]
fn test_kvp_round_trip() {
    for raw in ["-125.5,24.75,-66.25,50.125", "0,0,1,1", "-0.000001,3,1e3,4"] {
        let bbox = BoundingBox::from_kvp(raw).unwrap();
        let again = BoundingBox::from_kvp(&bbox.to_kvp()).unwrap();
        assert!((bbox.min_x() - again.min_x()).abs() < 1e-6);
        assert!((bbox.min_y() - again.min_y()).abs() < 1e-6);
        assert!((bbox.max_x() - again.max_x()).abs() < 1e-6);
        assert!((bbox.max_y() - again.max_y()).abs() < 1e-6);
    }
}

// ============================================================================
// Ordering tests
// ============================================================================

#[test]
fn test_ordered_bbox() {
    assert!(BoundingBox::new(-180.0, -90.0, 180.0, 90.0).is_ordered());
}

#[test]
fn test_degenerate_bbox_is_not_ordered() {
    assert!(!BoundingBox::new(5.0, 5.0, 5.0, 5.0).is_ordered());
}

#[test]
fn test_single_inverted_axis_is_not_ordered() {
    assert!(!BoundingBox::new(10.0, 0.0, -10.0, 10.0).is_ordered());
    assert!(!BoundingBox::new(0.0, 10.0, 10.0, -10.0).is_ordered());
}

// ============================================================================
// Position tests
// ============================================================================

#[test]
fn test_position_display() {
    assert_eq!(Position::new(-180.0, 90.5).to_string(), "-180.000000 90.500000");
}

#[test]
fn test_position_from_text_takes_first_two() {
    assert_eq!(
        Position::from_text("1 2 3"),
        Some(Position::new(1.0, 2.0))
    );
    assert_eq!(Position::from_text(""), None);
}

// ============================================================================
// Serde tests
// ============================================================================

#[test]
fn test_bbox_json_skips_absent_crs() {
    let json = serde_json::to_string(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(!json.contains("crs"));

    let bbox: BoundingBox = serde_json::from_str(
        r#"{"crs":"EPSG:4326","lower_corner":{"x":0.0,"y":0.0},"upper_corner":{"x":1.0,"y":1.0}}"#,
    )
    .unwrap();
    assert_eq!(bbox.crs.as_deref(), Some("EPSG:4326"));
}
