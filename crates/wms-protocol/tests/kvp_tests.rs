//! Tests for decoding and encoding requests in the KVP form.

use test_utils::{assert_bbox_approx_eq, fixtures};
use wms_protocol::{
    ExceptionCode, GetCapabilities, GetFeatureInfo, GetMap, NamedLayer, OgcRequest, QueryValues,
    Request, Wms130,
};

fn query(pairs: &[(&str, &str)]) -> QueryValues {
    test_utils::init_tracing();
    pairs.iter().copied().collect()
}

// ============================================================================
// GetCapabilities
// ============================================================================

#[test]
fn test_get_capabilities_empty_query() {
    let errs = GetCapabilities::<Wms130>::parse_kvp(&QueryValues::new()).unwrap_err();
    assert_eq!(errs.len(), 2);
    assert_eq!(errs[0].code(), ExceptionCode::MissingParameterValue);
    assert_eq!(errs[0].locator(), Some("SERVICE"));
    assert_eq!(errs[1].code(), ExceptionCode::MissingParameterValue);
    assert_eq!(errs[1].locator(), Some("REQUEST"));
}

#[test]
fn test_get_capabilities_round_trip() {
    let request = GetCapabilities::<Wms130>::parse_kvp(&QueryValues::from_query_str(
        "?service=WMS&request=GetCapabilities&version=1.3.0",
    ))
    .unwrap();
    let built = request.build_kvp();
    assert_eq!(
        built.to_query_string(),
        "SERVICE=WMS&REQUEST=GetCapabilities&VERSION=1.3.0"
    );
    assert_eq!(GetCapabilities::<Wms130>::parse_kvp(&built).unwrap(), request);
}

// ============================================================================
// GetMap
// ============================================================================

#[test]
fn test_get_map_fixture() {
    let request = GetMap::parse_kvp(&QueryValues::from_query_str(fixtures::GETMAP_KVP)).unwrap();
    assert_eq!(request.service, "WMS");
    assert_eq!(request.version, "1.3.0");
    assert_eq!(request.map.crs, "EPSG:4326");
    assert_eq!(request.map.output.format, "image/png");
    assert_bbox_approx_eq!(request.map.bounding_box, fixtures::bbox::GLOBAL, 1e-9);
}

#[test]
fn test_get_map_bbox_six_decimals() {
    let request = GetMap::parse_kvp(&QueryValues::from_query_str(fixtures::GETMAP_KVP)).unwrap();
    assert_eq!(
        request.build_kvp().first("BBOX"),
        Some("-180.000000,-90.000000,180.000000,90.000000")
    );
}

#[test]
fn test_get_map_keys_are_case_insensitive() {
    let request = GetMap::parse_kvp(&query(&[
        ("version", "1.3.0"),
        ("Layers", "Rivers"),
        ("styles", ""),
        ("crs", "EPSG:4326"),
        ("BBox", "0,0,1,1"),
        ("width", "10"),
        ("HEIGHT", "10"),
        ("format", "image/png"),
    ]))
    .unwrap();
    assert_eq!(request.service, "WMS");
    assert_eq!(
        request.map.styled_layer_descriptor.named_layers,
        vec![NamedLayer::new("Rivers", None)]
    );
}

#[test]
fn test_get_map_empty_query_reports_version_only() {
    let errs = GetMap::parse_kvp(&QueryValues::new()).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::MissingParameterValue);
    assert_eq!(errs[0].locator(), Some("VERSION"));
}

#[test]
fn test_get_map_multi_valued_key() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.append("layers", "Lakes");
    let errs = GetMap::parse_kvp(&values).unwrap_err();
    let invalid: Vec<_> = errs
        .iter()
        .filter(|e| e.code() == ExceptionCode::InvalidParameterValue)
        .collect();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].locator(), Some("LAYERS"));
    assert!(invalid[0].message().contains("Rivers,Roads,Lakes"));

    // a repeated mandatory key is not also reported as missing
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.append("width", "20");
    let errs = GetMap::parse_kvp(&values).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::InvalidParameterValue);
    assert_eq!(errs[0].locator(), Some("WIDTH"));
    assert!(errs[0].message().contains("1024,20"));
}

#[test]
fn test_get_map_styles_mismatch() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.set("STYLES", "CenterLine");
    let errs = GetMap::parse_kvp(&values).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::StyleNotDefined);
    assert_eq!(errs[0].locator(), None);
}

#[test]
fn test_get_map_wrong_bbox_arity() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.set("BBOX", "1,2,3,4,5");
    let errs = GetMap::parse_kvp(&values).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::InvalidParameterValue);
    assert_eq!(errs[0].locator(), Some("BBOX"));
}

#[test]
fn test_get_map_wrong_operation() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.set("REQUEST", "GetLegendGraphic");
    let errs = GetMap::parse_kvp(&values).unwrap_err();
    assert_eq!(errs[0].code(), ExceptionCode::OperationNotSupported);
    assert_eq!(errs[0].locator(), Some("GetLegendGraphic"));
}

#[test]
fn test_get_map_round_trip_keeps_style_positions() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.set("LAYERS", "Rivers,Roads,Lakes");
    values.set("STYLES", "CenterLine,,Outline");
    let request = GetMap::parse_kvp(&values).unwrap();

    let built = request.build_kvp();
    assert_eq!(built.first("LAYERS"), Some("Rivers,Roads,Lakes"));
    assert_eq!(built.first("STYLES"), Some("CenterLine,,Outline"));
    assert_eq!(GetMap::parse_kvp(&built).unwrap(), request);
}

#[test]
fn test_get_map_build_emits_every_field() {
    let built = GetMap::default().build_kvp();
    let keys: Vec<_> = built.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            "SERVICE",
            "REQUEST",
            "VERSION",
            "LAYERS",
            "STYLES",
            "CRS",
            "BBOX",
            "WIDTH",
            "HEIGHT",
            "FORMAT",
            "TRANSPARENT",
            "BGCOLOR",
            "EXCEPTIONS"
        ]
    );
    assert_eq!(built.first("TRANSPARENT"), Some(""));
    assert_eq!(built.first("WIDTH"), Some("0"));
}

// ============================================================================
// GetFeatureInfo
// ============================================================================

#[test]
fn test_get_feature_info_fixture() {
    let request =
        GetFeatureInfo::parse_kvp(&QueryValues::from_query_str(fixtures::GETFEATUREINFO_KVP))
            .unwrap();
    assert_eq!(request.query_layers, vec!["Rivers"]);
    assert_eq!((request.i, request.j), (128, 64));
    assert_eq!(request.feature_count, Some(3));
    assert_eq!(request.info_format, "text/xml");
    assert_bbox_approx_eq!(request.map.bounding_box, fixtures::bbox::CONUS, 1e-9);
}

#[test]
fn test_get_feature_info_round_trip() {
    let request =
        GetFeatureInfo::parse_kvp(&QueryValues::from_query_str(fixtures::GETFEATUREINFO_KVP))
            .unwrap();
    let reparsed = GetFeatureInfo::parse_kvp(&request.build_kvp()).unwrap();
    assert_eq!(reparsed, request);
}

#[test]
fn test_get_feature_info_both_points_invalid() {
    let mut values = QueryValues::from_query_str(fixtures::GETFEATUREINFO_KVP);
    values.set("i", "left");
    values.set("j", "up");
    let errs = GetFeatureInfo::parse_kvp(&values).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::InvalidPoint);
    assert!(errs[0].message().contains("left, up"));
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_dispatch_get_map() {
    let request = Request::from_kvp(&QueryValues::from_query_str(fixtures::GETMAP_KVP)).unwrap();
    assert_eq!(request.request_type(), "GetMap");
    assert!(request.validate(&fixtures::capabilities()).is_empty());
}

#[test]
fn test_dispatch_repeated_request() {
    let errs = Request::from_kvp(&QueryValues::from_query_str(
        "SERVICE=WMS&REQUEST=GetMap&request=GetMap&VERSION=1.3.0",
    ))
    .unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].code(), ExceptionCode::InvalidParameterValue);
    assert_eq!(errs[0].locator(), Some("REQUEST"));
    assert!(errs[0].message().contains("GetMap,GetMap"));
}

#[test]
fn test_dispatch_request_is_case_insensitive() {
    let request =
        Request::from_kvp(&query(&[("SERVICE", "WMS"), ("REQUEST", "getcapabilities")])).unwrap();
    assert!(matches!(request, Request::WmsCapabilities(_)));
}
