//! OGC exception values.
//!
//! Every failure the request engine reports to a client is an
//! [`OgcException`]: an exception code, a human readable message and an
//! optional locator. The message template depends on how many arguments the
//! exception was raised with, the code never does.

use std::fmt;

use thiserror::Error;

/// The family an exception code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionFamily {
    /// Generic OGC Web Services codes
    Ows,
    /// Codes specific to WMS 1.3.0
    Wms,
}

/// Every exception code the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionCode {
    // === OWS ===
    OperationNotSupported,
    MissingParameterValue,
    InvalidParameterValue,
    VersionNegotiationFailed,
    InvalidUpdateSequence,
    OptionNotSupported,
    NoApplicableCode,

    // === WMS ===
    InvalidFormat,
    InvalidCrs,
    LayerNotDefined,
    StyleNotDefined,
    LayerNotQueryable,
    InvalidPoint,
    CurrentUpdateSequence,
    MissingDimensionValue,
    InvalidDimensionValue,
}

impl ExceptionCode {
    /// The code as written on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionCode::OperationNotSupported => "OperationNotSupported",
            ExceptionCode::MissingParameterValue => "MissingParameterValue",
            ExceptionCode::InvalidParameterValue => "InvalidParameterValue",
            ExceptionCode::VersionNegotiationFailed => "VersionNegotiationFailed",
            ExceptionCode::InvalidUpdateSequence => "InvalidUpdateSequence",
            ExceptionCode::OptionNotSupported => "OptionNotSupported",
            ExceptionCode::NoApplicableCode => "NoApplicableCode",
            ExceptionCode::InvalidFormat => "InvalidFormat",
            ExceptionCode::InvalidCrs => "InvalidCRS",
            ExceptionCode::LayerNotDefined => "LayerNotDefined",
            ExceptionCode::StyleNotDefined => "StyleNotDefined",
            ExceptionCode::LayerNotQueryable => "LayerNotQueryable",
            ExceptionCode::InvalidPoint => "InvalidPoint",
            ExceptionCode::CurrentUpdateSequence => "CurrentUpdateSequence",
            ExceptionCode::MissingDimensionValue => "MissingDimensionValue",
            ExceptionCode::InvalidDimensionValue => "InvalidDimensionValue",
        }
    }

    /// The family this code is defined by.
    ///
    /// InvalidUpdateSequence is defined by both; it is reported as OWS.
    pub fn family(&self) -> ExceptionFamily {
        match self {
            ExceptionCode::OperationNotSupported
            | ExceptionCode::MissingParameterValue
            | ExceptionCode::InvalidParameterValue
            | ExceptionCode::VersionNegotiationFailed
            | ExceptionCode::InvalidUpdateSequence
            | ExceptionCode::OptionNotSupported
            | ExceptionCode::NoApplicableCode => ExceptionFamily::Ows,
            _ => ExceptionFamily::Wms,
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single protocol exception.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct OgcException {
    code: ExceptionCode,
    message: String,
    locator: Option<String>,
}

impl OgcException {
    /// Raise an exception with zero, one or two arguments.
    ///
    /// With no arguments the message is generic and there is no locator.
    /// A single argument usually names the locator. Two arguments carry an
    /// offending value plus a locator or context. Arguments past the second
    /// are ignored.
    pub fn new(code: ExceptionCode, args: &[&str]) -> Self {
        use ExceptionCode as C;

        let (message, locator): (String, Option<&str>) = match (code, args) {
            (C::OperationNotSupported, []) => (
                "The requested operation is not supported by this service".into(),
                None,
            ),
            (C::OperationNotSupported, [op]) => (
                format!("This service does not know the operation: {}", op),
                Some(*op),
            ),
            (C::OperationNotSupported, [op, service, ..]) => (
                format!("The operation: {} is not supported by service: {}", op, service),
                Some(*op),
            ),

            (C::MissingParameterValue, []) => (
                "Could not determine the request from the supplied input".into(),
                None,
            ),
            (C::MissingParameterValue, [key]) => (format!("Missing key: {}", key), Some(*key)),
            (C::MissingParameterValue, [key, value, ..]) => (
                format!("{} key got incorrect value: {}", key, value),
                Some(*key),
            ),

            (C::InvalidParameterValue, []) => (
                "An operation parameter contains an invalid value".into(),
                None,
            ),
            (C::InvalidParameterValue, [locator]) => (
                format!("{} contains an invalid value", locator),
                Some(*locator),
            ),
            (C::InvalidParameterValue, [value, locator, ..]) => (
                format!("{} contains an invalid value: {}", locator, value),
                Some(*locator),
            ),

            (C::VersionNegotiationFailed, []) => (
                "None of the requested versions are supported".into(),
                None,
            ),
            (C::VersionNegotiationFailed, [version]) => (
                format!("{} is an invalid version number", version),
                Some("VERSION"),
            ),
            (C::VersionNegotiationFailed, [version, supported, ..]) => (
                format!(
                    "{} is an invalid version number, supported versions: {}",
                    version, supported
                ),
                Some("VERSION"),
            ),

            (C::InvalidUpdateSequence, []) => (
                "Value of the UPDATESEQUENCE parameter is greater than the current value"
                    .into(),
                None,
            ),
            (C::InvalidUpdateSequence, [sequence]) => (
                format!(
                    "UPDATESEQUENCE value: {} is greater than the current value",
                    sequence
                ),
                Some("UPDATESEQUENCE"),
            ),
            (C::InvalidUpdateSequence, [sequence, current, ..]) => (
                format!(
                    "UPDATESEQUENCE value: {} is greater than the current value: {}",
                    sequence, current
                ),
                Some("UPDATESEQUENCE"),
            ),

            (C::OptionNotSupported, []) => (
                "Request is for an option that is not supported by this server".into(),
                None,
            ),
            (C::OptionNotSupported, [option]) => (
                format!("The option: {} is not supported by this server", option),
                Some(*option),
            ),
            (C::OptionNotSupported, [value, option, ..]) => (
                format!(
                    "The value: {} for option: {} is not supported by this server",
                    value, option
                ),
                Some(*option),
            ),

            (C::NoApplicableCode, []) => (
                "No other exception code specified by this service applies".into(),
                None,
            ),
            (C::NoApplicableCode, [message]) => (message.to_string(), None),
            (C::NoApplicableCode, [message, locator, ..]) => {
                (message.to_string(), Some(*locator))
            }

            (C::InvalidFormat, []) => (
                "Request contains a format not offered by the server".into(),
                None,
            ),
            (C::InvalidFormat, [format]) => (
                format!("The format: {} is not offered by the server", format),
                Some("FORMAT"),
            ),
            (C::InvalidFormat, [format, locator, ..]) => (
                format!(
                    "The format: {} given in {} is not offered by the server",
                    format, locator
                ),
                Some(*locator),
            ),

            (C::InvalidCrs, []) => (
                "Request contains a CRS not offered by the server".into(),
                None,
            ),
            (C::InvalidCrs, [crs]) => (
                format!("CRS is not known by this service: {}", crs),
                Some("CRS"),
            ),
            (C::InvalidCrs, [crs, layer, ..]) => (
                format!("Layer: {} does not support CRS: {}", layer, crs),
                Some("CRS"),
            ),

            (C::LayerNotDefined, []) => (
                "Request is for a layer not offered by the server".into(),
                None,
            ),
            (C::LayerNotDefined, [layer]) => (
                format!("The layer: {} is not known by the server", layer),
                Some(*layer),
            ),
            (C::LayerNotDefined, [layer, parameter, ..]) => (
                format!(
                    "The layer: {} given in {} is not known by the server",
                    layer, parameter
                ),
                Some(*parameter),
            ),

            (C::StyleNotDefined, []) => (
                "There is a one-to-one correspondence between the values in the LAYERS \
                 parameter and the values in the STYLES parameter. Expecting an empty \
                 string for the STYLES like STYLES= or comma-separated list STYLES=,,, \
                 or using keyword default STYLES=default,default,..."
                    .into(),
                None,
            ),
            (C::StyleNotDefined, [style]) => (
                format!("The style: {} is not known by the server", style),
                Some(*style),
            ),
            (C::StyleNotDefined, [style, layer, ..]) => (
                format!(
                    "The style: {} is not known by the server for layer: {}",
                    style, layer
                ),
                Some(*style),
            ),

            (C::LayerNotQueryable, []) => (
                "Request is for a layer that is not queryable".into(),
                None,
            ),
            (C::LayerNotQueryable, [layer]) => {
                (format!("Layer: {} can not be queried", layer), Some(*layer))
            }
            (C::LayerNotQueryable, [layer, parameter, ..]) => (
                format!("Layer: {} given in {} can not be queried", layer, parameter),
                Some(*parameter),
            ),

            (C::InvalidPoint, []) => ("The parameters I and J are invalid".into(), None),
            (C::InvalidPoint, [point]) => (
                format!("The parameters I and J are invalid, given: {}", point),
                None,
            ),
            (C::InvalidPoint, [i, j, ..]) => (
                format!("The parameters I and J are invalid, given: {}, {}", i, j),
                None,
            ),

            (C::CurrentUpdateSequence, []) => (
                "Value of the UPDATESEQUENCE parameter is equal to the current value".into(),
                None,
            ),
            (C::CurrentUpdateSequence, [sequence]) => (
                format!(
                    "UPDATESEQUENCE value: {} is equal to the current value",
                    sequence
                ),
                Some("UPDATESEQUENCE"),
            ),
            (C::CurrentUpdateSequence, [sequence, current, ..]) => (
                format!(
                    "UPDATESEQUENCE value: {} is equal to the current value: {}",
                    sequence, current
                ),
                Some("UPDATESEQUENCE"),
            ),

            (C::MissingDimensionValue, []) => (
                "Request does not include a sample dimension value, and the server did \
                 not declare a default value for that dimension"
                    .into(),
                None,
            ),
            (C::MissingDimensionValue, [dimension]) => (
                format!("Missing dimension value for: {}", dimension),
                Some(*dimension),
            ),
            (C::MissingDimensionValue, [dimension, layer, ..]) => (
                format!(
                    "Missing dimension value for: {} on layer: {}",
                    dimension, layer
                ),
                Some(*dimension),
            ),

            (C::InvalidDimensionValue, []) => (
                "Request contains an invalid sample dimension value".into(),
                None,
            ),
            (C::InvalidDimensionValue, [dimension]) => (
                format!("The value for dimension: {} is invalid", dimension),
                Some(*dimension),
            ),
            (C::InvalidDimensionValue, [value, dimension, ..]) => (
                format!("The value: {} for dimension: {} is invalid", value, dimension),
                Some(*dimension),
            ),
        };

        Self {
            code,
            message,
            locator: locator.map(str::to_string),
        }
    }

    pub fn code(&self) -> ExceptionCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    // === Named constructors for the common call sites ===

    pub fn operation_not_supported(operation: &str) -> Self {
        Self::new(ExceptionCode::OperationNotSupported, &[operation])
    }

    /// Input that could not be read as a request at all.
    pub fn unreadable_request() -> Self {
        Self::new(ExceptionCode::MissingParameterValue, &[])
    }

    pub fn missing_parameter(key: &str) -> Self {
        Self::new(ExceptionCode::MissingParameterValue, &[key])
    }

    /// A key whose value could not be used, reported as missing.
    pub fn missing_parameter_value(key: &str, value: &str) -> Self {
        Self::new(ExceptionCode::MissingParameterValue, &[key, value])
    }

    pub fn invalid_parameter_value(value: &str, locator: &str) -> Self {
        Self::new(ExceptionCode::InvalidParameterValue, &[value, locator])
    }

    pub fn version_negotiation_failed(version: &str) -> Self {
        Self::new(ExceptionCode::VersionNegotiationFailed, &[version])
    }

    pub fn no_applicable_code(message: &str) -> Self {
        Self::new(ExceptionCode::NoApplicableCode, &[message])
    }

    /// A requested dimension beyond what the server allows.
    pub fn server_limit(dimension: &str, requested: u32, maximum: u32) -> Self {
        let message = format!(
            "{} of {} exceeds the maximum of {} supported by this server",
            dimension, requested, maximum
        );
        Self::new(ExceptionCode::NoApplicableCode, &[&message, dimension])
    }

    pub fn invalid_format(format: &str) -> Self {
        Self::new(ExceptionCode::InvalidFormat, &[format])
    }

    pub fn invalid_crs(crs: &str, layer: &str) -> Self {
        Self::new(ExceptionCode::InvalidCrs, &[crs, layer])
    }

    pub fn layer_not_defined(layer: &str) -> Self {
        Self::new(ExceptionCode::LayerNotDefined, &[layer])
    }

    /// LAYERS and STYLES could not be paired one-to-one.
    pub fn style_correlation() -> Self {
        Self::new(ExceptionCode::StyleNotDefined, &[])
    }

    pub fn style_not_defined(style: &str, layer: &str) -> Self {
        Self::new(ExceptionCode::StyleNotDefined, &[style, layer])
    }

    pub fn layer_not_queryable(layer: &str) -> Self {
        Self::new(ExceptionCode::LayerNotQueryable, &[layer])
    }

    pub fn invalid_point(i: &str, j: &str) -> Self {
        Self::new(ExceptionCode::InvalidPoint, &[i, j])
    }
}
