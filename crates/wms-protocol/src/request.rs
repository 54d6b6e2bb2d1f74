//! The operation request contract and dispatch across operations.

use wms_common::Capabilities;

use crate::exceptions::OgcException;
use crate::getcapabilities::{GetCapabilities, Wcs201, Wms130, Wmts100};
use crate::getfeatureinfo::GetFeatureInfo;
use crate::getmap::GetMap;
use crate::kvp::{keys, KvpParams, QueryValues};
use crate::report::ReportDialect;
use crate::xml::{parse_document, structural_exception, XmlElement};

/// One operation of the protocol, decodable from and encodable to both wire
/// forms.
pub trait OgcRequest: Sized {
    /// Operation name as carried by REQUEST and by the XML root element.
    const REQUEST: &'static str;

    fn request_type(&self) -> &'static str {
        Self::REQUEST
    }

    /// Decode an XML request document.
    fn parse_xml(doc: &[u8]) -> Result<Self, Vec<OgcException>>;

    /// Decode URL query values.
    fn parse_kvp(query: &QueryValues) -> Result<Self, Vec<OgcException>>;

    /// Encode as an XML request document.
    fn build_xml(&self) -> String;

    /// Encode as URL query values.
    fn build_kvp(&self) -> QueryValues;

    /// Check the request against what the service offers.
    fn validate(&self, capabilities: &Capabilities) -> Vec<OgcException>;
}

/// A request of any supported operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    WmsCapabilities(GetCapabilities<Wms130>),
    WmtsCapabilities(GetCapabilities<Wmts100>),
    WcsCapabilities(GetCapabilities<Wcs201>),
    GetMap(GetMap),
    GetFeatureInfo(GetFeatureInfo),
}

impl Request {
    /// Decode query values, selecting the operation from REQUEST.
    ///
    /// GetCapabilities is routed by SERVICE, WMS when absent.
    pub fn from_kvp(query: &QueryValues) -> Result<Self, Vec<OgcException>> {
        let (params, exceptions) = KvpParams::from_query(query);
        let request = match params.get_non_empty(keys::REQUEST) {
            Some(request) => request,
            None if params.is_rejected(keys::REQUEST) => return Err(exceptions),
            None => return Err(vec![OgcException::missing_parameter(keys::REQUEST)]),
        };

        if request.eq_ignore_ascii_case(GetMap::REQUEST) {
            GetMap::parse_kvp(query).map(Request::GetMap)
        } else if request.eq_ignore_ascii_case(GetFeatureInfo::REQUEST) {
            GetFeatureInfo::parse_kvp(query).map(Request::GetFeatureInfo)
        } else if request.eq_ignore_ascii_case(GetCapabilities::<Wms130>::REQUEST) {
            match params.get_non_empty(keys::SERVICE) {
                Some(s) if s.eq_ignore_ascii_case("WMTS") => {
                    GetCapabilities::<Wmts100>::parse_kvp(query).map(Request::WmtsCapabilities)
                }
                Some(s) if s.eq_ignore_ascii_case("WCS") => {
                    GetCapabilities::<Wcs201>::parse_kvp(query).map(Request::WcsCapabilities)
                }
                _ => GetCapabilities::<Wms130>::parse_kvp(query).map(Request::WmsCapabilities),
            }
        } else {
            tracing::debug!(request = %request, "unknown operation");
            Err(vec![OgcException::operation_not_supported(request)])
        }
    }

    /// Decode an XML document, selecting the operation from its root element.
    pub fn from_xml(doc: &[u8]) -> Result<Self, Vec<OgcException>> {
        let root = parse_document(doc).map_err(|e| vec![structural_exception(&e)])?;

        match root.local_name() {
            "GetMap" => GetMap::parse_xml(doc).map(Request::GetMap),
            "GetFeatureInfo" => GetFeatureInfo::parse_xml(doc).map(Request::GetFeatureInfo),
            "GetCapabilities" => match root_attribute(&root, "service") {
                Some(s) if s.eq_ignore_ascii_case("WMTS") => {
                    GetCapabilities::<Wmts100>::parse_xml(doc).map(Request::WmtsCapabilities)
                }
                Some(s) if s.eq_ignore_ascii_case("WCS") => {
                    GetCapabilities::<Wcs201>::parse_xml(doc).map(Request::WcsCapabilities)
                }
                _ => GetCapabilities::<Wms130>::parse_xml(doc).map(Request::WmsCapabilities),
            },
            other => {
                tracing::debug!(root = %other, "unknown request root element");
                Err(vec![OgcException::missing_parameter(keys::REQUEST)])
            }
        }
    }

    pub fn request_type(&self) -> &'static str {
        match self {
            Request::WmsCapabilities(r) => r.request_type(),
            Request::WmtsCapabilities(r) => r.request_type(),
            Request::WcsCapabilities(r) => r.request_type(),
            Request::GetMap(r) => r.request_type(),
            Request::GetFeatureInfo(r) => r.request_type(),
        }
    }

    pub fn build_xml(&self) -> String {
        match self {
            Request::WmsCapabilities(r) => r.build_xml(),
            Request::WmtsCapabilities(r) => r.build_xml(),
            Request::WcsCapabilities(r) => r.build_xml(),
            Request::GetMap(r) => r.build_xml(),
            Request::GetFeatureInfo(r) => r.build_xml(),
        }
    }

    pub fn build_kvp(&self) -> QueryValues {
        match self {
            Request::WmsCapabilities(r) => r.build_kvp(),
            Request::WmtsCapabilities(r) => r.build_kvp(),
            Request::WcsCapabilities(r) => r.build_kvp(),
            Request::GetMap(r) => r.build_kvp(),
            Request::GetFeatureInfo(r) => r.build_kvp(),
        }
    }

    pub fn validate(&self, capabilities: &Capabilities) -> Vec<OgcException> {
        match self {
            Request::WmsCapabilities(r) => r.validate(capabilities),
            Request::WmtsCapabilities(r) => r.validate(capabilities),
            Request::WcsCapabilities(r) => r.validate(capabilities),
            Request::GetMap(r) => r.validate(capabilities),
            Request::GetFeatureInfo(r) => r.validate(capabilities),
        }
    }

    /// The report dialect errors for this request should be written in.
    pub fn report_dialect(&self) -> ReportDialect {
        match self {
            Request::WmsCapabilities(r) => r.report_dialect(),
            Request::WmtsCapabilities(r) => r.report_dialect(),
            Request::WcsCapabilities(r) => r.report_dialect(),
            Request::GetMap(_) | Request::GetFeatureInfo(_) => ReportDialect::Wms,
        }
    }
}

/// Value of an unprefixed root attribute, matching its name case-insensitively.
pub(crate) fn root_attribute<'a>(root: &'a XmlElement, name: &str) -> Option<&'a str> {
    root.attributes
        .iter()
        .find(|a| a.prefix.is_none() && a.local.eq_ignore_ascii_case(name))
        .map(|a| a.value.as_str())
}

/// Root attributes of a built request: the preserved bag, then service and
/// version.
pub(crate) fn root_attributes<'a>(
    bag: &'a [(String, String)],
    service: &'a str,
    version: &'a str,
) -> Vec<(&'a str, &'a str)> {
    bag.iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .chain([("service", service), ("version", version)])
        .collect()
}

/// Reject a REQUEST value naming another operation.
pub(crate) fn check_request_name(
    params: &KvpParams,
    expected: &str,
    exceptions: &mut Vec<OgcException>,
) {
    if let Some(request) = params.get_non_empty(keys::REQUEST) {
        if !request.eq_ignore_ascii_case(expected) {
            exceptions.push(OgcException::operation_not_supported(request));
        }
    }
}
