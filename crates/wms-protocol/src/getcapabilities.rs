//! GetCapabilities for every supported service.
//!
//! WMS, WMTS and WCS share the operation and differ only in their service
//! token, protocol version, root element and namespaces. One codec covers all
//! three through a [`ServiceProfile`].

use std::marker::PhantomData;

use wms_common::Capabilities;

use crate::attributes::AttributeBag;
use crate::exceptions::OgcException;
use crate::kvp::{encode_into, keys, KvpField, KvpParams, QueryValues};
use crate::report::ReportDialect;
use crate::request::{check_request_name, root_attribute, root_attributes, OgcRequest};
use crate::xml::{parse_request_root, XmlWriter};

/// Static description of one service's GetCapabilities binding.
pub trait ServiceProfile {
    /// SERVICE token
    const SERVICE: &'static str;
    /// Protocol version written when building
    const VERSION: &'static str;
    /// Qualified root element name
    const ROOT: &'static str;
    /// Namespace declarations added to built documents that lack them
    const NAMESPACES: &'static [(&'static str, &'static str)];
    /// Dialect exception reports for this service are written in
    const DIALECT: ReportDialect;
}

const XSI: (&str, &str) = ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance");
const OWS: (&str, &str) = ("xmlns:ows", "http://www.opengis.net/ows/1.1");

/// WMS 1.3.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wms130;

impl ServiceProfile for Wms130 {
    const SERVICE: &'static str = "WMS";
    const VERSION: &'static str = "1.3.0";
    const ROOT: &'static str = "GetCapabilities";
    const NAMESPACES: &'static [(&'static str, &'static str)] =
        &[("xmlns", "http://www.opengis.net/wms"), XSI];
    const DIALECT: ReportDialect = ReportDialect::Wms;
}

/// WMTS 1.0.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wmts100;

impl ServiceProfile for Wmts100 {
    const SERVICE: &'static str = "WMTS";
    const VERSION: &'static str = "1.0.0";
    const ROOT: &'static str = "GetCapabilities";
    const NAMESPACES: &'static [(&'static str, &'static str)] =
        &[("xmlns", "http://www.opengis.net/wmts/1.0"), OWS, XSI];
    const DIALECT: ReportDialect = ReportDialect::Ows;
}

/// WCS 2.0.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wcs201;

impl ServiceProfile for Wcs201 {
    const SERVICE: &'static str = "WCS";
    const VERSION: &'static str = "2.0.1";
    const ROOT: &'static str = "wcs:GetCapabilities";
    const NAMESPACES: &'static [(&'static str, &'static str)] =
        &[("xmlns:wcs", "http://www.opengis.net/wcs/2.0"), OWS, XSI];
    const DIALECT: ReportDialect = ReportDialect::Ows;
}

/// A GetCapabilities request for the service described by `P`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCapabilities<P: ServiceProfile> {
    pub service: String,
    /// Requested version, empty when the client did not ask for one
    pub version: String,
    pub attributes: AttributeBag,
    profile: PhantomData<P>,
}

impl<P: ServiceProfile> GetCapabilities<P> {
    /// A request for the profile's own service and version.
    pub fn new() -> Self {
        Self::with(P::SERVICE, P::VERSION)
    }

    pub fn with(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            attributes: AttributeBag::new(),
            profile: PhantomData,
        }
    }

    pub fn report_dialect(&self) -> ReportDialect {
        P::DIALECT
    }

    fn kvp_fields() -> [KvpField<Self>; 3] {
        [
            KvpField {
                key: keys::SERVICE,
                value: |r| r.service.clone(),
            },
            KvpField {
                key: keys::REQUEST,
                value: |_| Self::REQUEST.to_string(),
            },
            KvpField {
                key: keys::VERSION,
                value: |r| r.version.clone(),
            },
        ]
    }
}

impl<P: ServiceProfile> Default for GetCapabilities<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ServiceProfile> OgcRequest for GetCapabilities<P> {
    const REQUEST: &'static str = "GetCapabilities";

    fn parse_xml(doc: &[u8]) -> Result<Self, Vec<OgcException>> {
        let root = parse_request_root(doc, Self::REQUEST).map_err(|e| vec![e])?;

        // OWS services negotiate through AcceptVersions instead of an attribute.
        let version = root_attribute(&root, "version")
            .map(str::to_string)
            .or_else(|| {
                root.child("AcceptVersions")
                    .and_then(|versions| versions.child_text("Version"))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Ok(Self {
            service: root_attribute(&root, "service").unwrap_or_default().to_string(),
            version,
            attributes: AttributeBag::capture(&root.attributes).dedupe(),
            profile: PhantomData,
        })
    }

    fn parse_kvp(query: &QueryValues) -> Result<Self, Vec<OgcException>> {
        let (params, mut exceptions) = KvpParams::from_query(query);

        let service = params.require(keys::SERVICE, &mut exceptions);
        params.require(keys::REQUEST, &mut exceptions);
        check_request_name(&params, Self::REQUEST, &mut exceptions);

        if !exceptions.is_empty() {
            tracing::debug!(
                service = P::SERVICE,
                count = exceptions.len(),
                "rejecting GetCapabilities query"
            );
            return Err(exceptions);
        }

        Ok(Self::with(
            service.unwrap_or_default(),
            params.get(keys::VERSION).unwrap_or_default(),
        ))
    }

    fn build_xml(&self) -> String {
        let bag = self.attributes.with_defaults(P::NAMESPACES).emit();
        let mut writer = XmlWriter::new();
        writer.open(P::ROOT, &root_attributes(&bag, &self.service, &self.version));
        writer.close(P::ROOT);
        writer.finish()
    }

    fn build_kvp(&self) -> QueryValues {
        let mut query = QueryValues::new();
        encode_into(&mut query, self, &Self::kvp_fields());
        query
    }

    fn validate(&self, _capabilities: &Capabilities) -> Vec<OgcException> {
        let mut exceptions = Vec::new();
        if self.service.is_empty() {
            exceptions.push(OgcException::missing_parameter(keys::SERVICE));
        } else if !self.service.eq_ignore_ascii_case(P::SERVICE) {
            exceptions.push(OgcException::invalid_parameter_value(
                &self.service,
                keys::SERVICE,
            ));
        }
        exceptions
    }
}
