//! OGC request codecs and validation.
//!
//! Decodes GetCapabilities, GetMap and GetFeatureInfo requests from XML
//! documents or URL query values into one model per operation, validates
//! them against a service's capabilities and encodes them back into either
//! wire form. Failures are reported as [`OgcException`]s that can be written
//! as an [`ExceptionReport`].
//!
//! ```ignore
//! let query = QueryValues::from_query_str(uri.query().unwrap_or_default());
//! let exceptions = match Request::from_kvp(&query) {
//!     Ok(request) => request.validate(&capabilities),
//!     Err(exceptions) => exceptions,
//! };
//! ```

pub mod attributes;
pub mod bbox;
pub mod exceptions;
pub mod getcapabilities;
pub mod getfeatureinfo;
pub mod getmap;
pub mod kvp;
pub mod report;
pub mod request;
pub mod styles;
pub mod validation;
pub mod xml;

pub use attributes::{AttributeBag, XmlAttribute};
pub use bbox::bbox_from_xml;
pub use exceptions::{ExceptionCode, ExceptionFamily, OgcException};
pub use getcapabilities::{GetCapabilities, ServiceProfile, Wcs201, Wms130, Wmts100};
pub use getfeatureinfo::GetFeatureInfo;
pub use getmap::{GetMap, MapParameters, Output, OutputSize};
pub use kvp::QueryValues;
pub use report::{ExceptionReport, ReportDialect};
pub use request::{OgcRequest, Request};
pub use styles::{NamedLayer, StyledLayerDescriptor};
