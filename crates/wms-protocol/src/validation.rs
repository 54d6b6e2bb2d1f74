//! Capability-driven validation of decoded requests.
//!
//! Every check is independent and returns the exceptions it found. The
//! `validate_*` entry points run all checks that apply and concatenate the
//! results, so a client sees every problem at once.

use tracing::trace;
use wms_common::{BoundingBox, Capabilities};

use crate::exceptions::{ExceptionCode, OgcException};
use crate::getmap::{MapParameters, OutputSize};
use crate::kvp::keys;
use crate::styles::StyledLayerDescriptor;

/// Run every map check: layers, styles, CRS, size, format and extent.
pub fn validate_map(map: &MapParameters, capabilities: &Capabilities) -> Vec<OgcException> {
    let sld = &map.styled_layer_descriptor;

    let mut exceptions = check_layers(sld, capabilities);
    exceptions.extend(check_styles(sld, capabilities));
    exceptions.extend(check_crs(&map.crs, sld, capabilities));
    exceptions.extend(check_output_size(&map.output.size, capabilities));
    exceptions.extend(check_map_format(&map.output.format, capabilities));
    exceptions.extend(check_bbox(&map.bounding_box));

    trace!(count = exceptions.len(), "validated map parameters");
    exceptions
}

/// Every requested layer must exist somewhere in the layer tree.
pub fn check_layers(sld: &StyledLayerDescriptor, capabilities: &Capabilities) -> Vec<OgcException> {
    if sld.is_empty() {
        return vec![OgcException::missing_parameter(keys::LAYERS)];
    }

    sld.layer_names()
        .filter(|name| capabilities.find_layer(name).is_none())
        .map(|name| {
            trace!(layer = %name, "layer not defined");
            OgcException::layer_not_defined(name)
        })
        .collect()
}

/// A named style must be declared on the layer it is applied to.
///
/// Empty style names select the default style and always pass. Unknown
/// layers are left to [`check_layers`].
pub fn check_styles(sld: &StyledLayerDescriptor, capabilities: &Capabilities) -> Vec<OgcException> {
    sld.named_layers
        .iter()
        .filter_map(|layer| {
            let style = layer.style.as_deref().filter(|s| !s.is_empty())?;
            let found = capabilities.find_layer(&layer.name)?;
            (!found.layer.has_style(style))
                .then(|| OgcException::style_not_defined(style, &layer.name))
        })
        .collect()
}

/// The CRS must be present and offered by every requested layer.
pub fn check_crs(
    crs: &str,
    sld: &StyledLayerDescriptor,
    capabilities: &Capabilities,
) -> Vec<OgcException> {
    if crs.is_empty() {
        return vec![OgcException::missing_parameter(keys::CRS)];
    }

    sld.layer_names()
        .filter_map(|name| {
            let found = capabilities.find_layer(name)?;
            (!found.supports_crs(crs)).then(|| OgcException::invalid_crs(crs, name))
        })
        .collect()
}

/// Width and height must stay within the server limits.
pub fn check_output_size(size: &OutputSize, capabilities: &Capabilities) -> Vec<OgcException> {
    let mut exceptions = Vec::new();
    if let Some(max) = capabilities.max_width {
        if size.width > max {
            exceptions.push(OgcException::server_limit(keys::WIDTH, size.width, max));
        }
    }
    if let Some(max) = capabilities.max_height {
        if size.height > max {
            exceptions.push(OgcException::server_limit(keys::HEIGHT, size.height, max));
        }
    }
    exceptions
}

pub fn check_map_format(format: &str, capabilities: &Capabilities) -> Vec<OgcException> {
    if format.is_empty() {
        vec![OgcException::missing_parameter(keys::FORMAT)]
    } else if !capabilities.supports_map_format(format) {
        vec![OgcException::invalid_format(format)]
    } else {
        Vec::new()
    }
}

/// The lower corner must be strictly below the upper corner on both axes.
/// One exception covers both axes.
pub fn check_bbox(bbox: &BoundingBox) -> Vec<OgcException> {
    if bbox.is_ordered() {
        Vec::new()
    } else {
        vec![OgcException::invalid_parameter_value(&bbox.to_kvp(), keys::BBOX)]
    }
}

// === GetFeatureInfo ===

/// Query layers must be present, known and queryable.
pub fn check_query_layers(query_layers: &[String], capabilities: &Capabilities) -> Vec<OgcException> {
    if query_layers.is_empty() {
        return vec![OgcException::missing_parameter(keys::QUERY_LAYERS)];
    }

    query_layers
        .iter()
        .filter_map(|name| match capabilities.find_layer(name) {
            None => Some(OgcException::layer_not_defined(name)),
            Some(found) if !found.layer.queryable => Some(OgcException::layer_not_queryable(name)),
            Some(_) => None,
        })
        .collect()
}

/// The queried pixel must lie inside the map.
pub fn check_point(i: u32, j: u32, size: &OutputSize) -> Vec<OgcException> {
    if i >= size.width || j >= size.height {
        vec![OgcException::invalid_point(&i.to_string(), &j.to_string())]
    } else {
        Vec::new()
    }
}

pub fn check_info_format(format: &str, capabilities: &Capabilities) -> Vec<OgcException> {
    if format.is_empty() {
        vec![OgcException::missing_parameter(keys::INFO_FORMAT)]
    } else if !capabilities.supports_feature_info_format(format) {
        vec![OgcException::new(
            ExceptionCode::InvalidFormat,
            &[format, keys::INFO_FORMAT],
        )]
    } else {
        Vec::new()
    }
}
