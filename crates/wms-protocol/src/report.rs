//! Exception report documents.
//!
//! A batch of exceptions is always written as one document, in the order
//! the exceptions were raised.

use crate::exceptions::OgcException;
use crate::xml::XmlWriter;

const OWS_NAMESPACE: &str = "http://www.opengis.net/ows/1.1";
const OGC_NAMESPACE: &str = "http://www.opengis.net/ogc";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const OWS_SCHEMA_LOCATION: &str =
    "http://www.opengis.net/ows/1.1 http://schemas.opengis.net/ows/1.1.0/owsExceptionReport.xsd";
const WMS_SCHEMA_LOCATION: &str =
    "http://www.opengis.net/ogc http://schemas.opengis.net/wms/1.3.0/exceptions_1_3_0.xsd";

/// The XML shape a report is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportDialect {
    /// `ows:ExceptionReport`, shared by WMTS and WCS
    #[default]
    Ows,
    /// `ServiceExceptionReport` from WMS 1.3.0
    Wms,
}

/// An ordered batch of exceptions ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionReport {
    dialect: ReportDialect,
    exceptions: Vec<OgcException>,
}

impl ExceptionReport {
    pub fn new(dialect: ReportDialect) -> Self {
        Self {
            dialect,
            exceptions: Vec::new(),
        }
    }

    pub fn from_exceptions(
        dialect: ReportDialect,
        exceptions: impl IntoIterator<Item = OgcException>,
    ) -> Self {
        Self {
            dialect,
            exceptions: exceptions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, exception: OgcException) {
        self.exceptions.push(exception);
    }

    pub fn dialect(&self) -> ReportDialect {
        self.dialect
    }

    pub fn exceptions(&self) -> &[OgcException] {
        &self.exceptions
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    /// Write the whole batch as one document.
    pub fn to_xml(&self) -> String {
        let mut writer = XmlWriter::new();
        match self.dialect {
            ReportDialect::Ows => self.write_ows(&mut writer),
            ReportDialect::Wms => self.write_wms(&mut writer),
        }
        writer.finish()
    }

    fn write_ows(&self, writer: &mut XmlWriter) {
        writer.open(
            "ows:ExceptionReport",
            &[
                ("xmlns:ows", OWS_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("version", "1.0.0"),
                ("xsi:schemaLocation", OWS_SCHEMA_LOCATION),
            ],
        );
        for exception in &self.exceptions {
            writer.open("ows:Exception", &code_attributes("exceptionCode", exception));
            writer.leaf("ows:ExceptionText", &[], exception.message());
            writer.close("ows:Exception");
        }
        writer.close("ows:ExceptionReport");
    }

    fn write_wms(&self, writer: &mut XmlWriter) {
        writer.open(
            "ServiceExceptionReport",
            &[
                ("xmlns", OGC_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("version", "1.3.0"),
                ("xsi:schemaLocation", WMS_SCHEMA_LOCATION),
            ],
        );
        for exception in &self.exceptions {
            writer.leaf(
                "ServiceException",
                &code_attributes("code", exception),
                exception.message(),
            );
        }
        writer.close("ServiceExceptionReport");
    }
}

fn code_attributes<'a>(code_name: &'a str, exception: &'a OgcException) -> Vec<(&'a str, &'a str)> {
    let mut attributes = vec![(code_name, exception.code().as_str())];
    if let Some(locator) = exception.locator() {
        attributes.push(("locator", locator));
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ows_report_keeps_order() {
        let report = ExceptionReport::from_exceptions(
            ReportDialect::Ows,
            vec![
                OgcException::operation_not_supported("WKS"),
                OgcException::version_negotiation_failed("0.0.1"),
            ],
        );
        let xml = report.to_xml();
        let first = xml.find("exceptionCode=\"OperationNotSupported\"").unwrap();
        let second = xml.find("exceptionCode=\"VersionNegotiationFailed\"").unwrap();
        assert!(first < second);
        assert_eq!(xml.matches("<ows:Exception ").count(), 2);
        assert!(xml.contains("locator=\"VERSION\""));
    }

    #[test]
    fn test_wms_report_shape() {
        let mut report = ExceptionReport::new(ReportDialect::Wms);
        report.push(OgcException::unreadable_request());
        let xml = report.to_xml();
        assert!(xml.contains("<ServiceExceptionReport xmlns=\"http://www.opengis.net/ogc\""));
        assert!(xml.contains("exceptions_1_3_0.xsd"));
        assert!(xml.contains("<ServiceException code=\"MissingParameterValue\">"));
        assert!(!xml.contains("locator="));
    }

    #[test]
    fn test_empty_report() {
        let report = ExceptionReport::new(ReportDialect::Wms);
        assert!(report.is_empty());
        assert!(report.to_xml().ends_with("exceptions_1_3_0.xsd\"/>"));
    }
}
