//! Exception reports built from decode and validation failures.

use test_utils::fixtures;
use wms_protocol::xml::parse_document;
use wms_protocol::{
    ExceptionReport, GetCapabilities, OgcException, OgcRequest, QueryValues, ReportDialect,
    Request, Wcs201, Wms130, Wmts100,
};

// ============================================================================
// OWS dialect
// ============================================================================

#[test]
fn test_one_report_for_many_exceptions() {
    let report = ExceptionReport::from_exceptions(
        ReportDialect::Ows,
        vec![
            OgcException::operation_not_supported("WKS"),
            OgcException::version_negotiation_failed("0.0.1"),
        ],
    );
    let root = parse_document(report.to_xml().as_bytes()).unwrap();

    assert_eq!(root.name, "ows:ExceptionReport");
    assert_eq!(root.attribute("version"), Some("1.0.0"));

    let entries: Vec<_> = root.children_named("Exception").collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0].attribute("exceptionCode"),
        Some("OperationNotSupported")
    );
    assert_eq!(entries[0].attribute("locator"), Some("WKS"));
    assert_eq!(
        entries[1].attribute("exceptionCode"),
        Some("VersionNegotiationFailed")
    );
    assert_eq!(entries[1].attribute("locator"), Some("VERSION"));
    assert_eq!(
        entries[1].child_text("ExceptionText"),
        Some("0.0.1 is an invalid version number")
    );
}

#[test]
fn test_message_text_is_escaped() {
    let report = ExceptionReport::from_exceptions(
        ReportDialect::Ows,
        vec![OgcException::no_applicable_code("width < 0 & height > 0")],
    );
    let xml = report.to_xml();
    assert!(xml.contains("width &lt; 0 &amp; height &gt; 0"));

    let root = parse_document(xml.as_bytes()).unwrap();
    let entry = root.child("Exception").unwrap();
    assert_eq!(entry.child_text("ExceptionText"), Some("width < 0 & height > 0"));
    assert_eq!(entry.attribute("locator"), None);
}

// ============================================================================
// WMS dialect
// ============================================================================

#[test]
fn test_wms_report_from_validation() {
    let mut values = QueryValues::from_query_str(fixtures::GETMAP_KVP);
    values.set("FORMAT", "image/gif");
    values.set("CRS", "EPSG:3857");
    let request = Request::from_kvp(&values).unwrap();
    let exceptions = request.validate(&fixtures::capabilities());

    let report = ExceptionReport::from_exceptions(request.report_dialect(), exceptions);
    assert_eq!(report.dialect(), ReportDialect::Wms);
    assert_eq!(report.len(), 2);

    let root = parse_document(report.to_xml().as_bytes()).unwrap();
    assert_eq!(root.name, "ServiceExceptionReport");
    assert_eq!(root.attribute("version"), Some("1.3.0"));
    let codes: Vec<_> = root
        .children_named("ServiceException")
        .filter_map(|e| e.attribute("code"))
        .collect();
    assert_eq!(codes, vec!["InvalidCRS", "InvalidFormat"]);
}

#[test]
fn test_wms_report_from_decode_failure() {
    let errs = Request::from_kvp(&QueryValues::from_query_str("REQUEST=GetMap")).unwrap_err();
    let report = ExceptionReport::from_exceptions(ReportDialect::Wms, errs);
    assert!(!report.is_empty());

    let root = parse_document(report.to_xml().as_bytes()).unwrap();
    assert!(root
        .children_named("ServiceException")
        .any(|e| e.attribute("locator") == Some("VERSION")));
}

// ============================================================================
// Dialect per service
// ============================================================================

#[test]
fn test_dialect_follows_service() {
    assert_eq!(
        GetCapabilities::<Wms130>::new().report_dialect(),
        ReportDialect::Wms
    );
    assert_eq!(
        GetCapabilities::<Wmts100>::new().report_dialect(),
        ReportDialect::Ows
    );
    assert_eq!(
        GetCapabilities::<Wcs201>::new().report_dialect(),
        ReportDialect::Ows
    );

    let request = Request::from_kvp(&QueryValues::from_query_str(
        "SERVICE=WCS&REQUEST=GetCapabilities",
    ))
    .unwrap();
    assert_eq!(request.report_dialect(), ReportDialect::Ows);
    assert_eq!(request.request_type(), GetCapabilities::<Wcs201>::REQUEST);
}
