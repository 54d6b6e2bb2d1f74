//! WMS GetMap requests.
//!
//! The map description (layers, styles, CRS, extent and output) is shared
//! with GetFeatureInfo, which embeds it.

use wms_common::{BoundingBox, Capabilities, WmsError, WmsResult};

use crate::attributes::AttributeBag;
use crate::bbox::{bbox_from_xml, write_bbox};
use crate::exceptions::OgcException;
use crate::kvp::{encode_into, keys, split_list, KvpField, KvpParams, QueryValues};
use crate::request::{check_request_name, root_attribute, root_attributes, OgcRequest};
use crate::styles::StyledLayerDescriptor;
use crate::validation;
use crate::xml::{
    optional_text, parse_number, parse_request_root, structural_exception, XmlElement, XmlWriter,
};

/// Namespace declarations a built map request carries unless the parsed
/// document declared them itself.
///
/// The builder writes `se:`, `ows:` and `wms:` prefixed elements, so a
/// rebuilt document must bind those prefixes even when the captured
/// attributes did not.
pub(crate) const MAP_NAMESPACES: &[(&str, &str)] = &[
    ("xmlns", "http://www.opengis.net/sld"),
    ("xmlns:ows", "http://www.opengis.net/ows"),
    ("xmlns:se", "http://www.opengis.net/se"),
    ("xmlns:wms", "http://www.opengis.net/wms"),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
];

/// Service assumed when a map request does not name one.
pub(crate) const DEFAULT_SERVICE: &str = "WMS";

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

/// How the map should be rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub size: OutputSize,
    /// MIME type, e.g. `image/png`
    pub format: String,
    pub transparent: Option<bool>,
    /// Background color as given, e.g. `0xFFFFFF`
    pub bgcolor: Option<String>,
}

/// The map description shared by GetMap and GetFeatureInfo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapParameters {
    pub styled_layer_descriptor: StyledLayerDescriptor,
    pub crs: String,
    pub bounding_box: BoundingBox,
    pub output: Output,
    /// Format exceptions should be reported in
    pub exceptions: Option<String>,
}

/// A GetMap request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetMap {
    pub service: String,
    pub version: String,
    pub attributes: AttributeBag,
    pub map: MapParameters,
}

impl Default for GetMap {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            version: "1.3.0".to_string(),
            attributes: AttributeBag::new(),
            map: MapParameters::default(),
        }
    }
}

const GETMAP_FIELDS: &[KvpField<GetMap>] = &[
    KvpField {
        key: keys::SERVICE,
        value: |r| r.service.clone(),
    },
    KvpField {
        key: keys::REQUEST,
        value: |_| GetMap::REQUEST.to_string(),
    },
    KvpField {
        key: keys::VERSION,
        value: |r| r.version.clone(),
    },
];

pub(crate) const MAP_FIELDS: &[KvpField<MapParameters>] = &[
    KvpField {
        key: keys::LAYERS,
        value: |m| m.styled_layer_descriptor.layers_kvp(),
    },
    KvpField {
        key: keys::STYLES,
        value: |m| m.styled_layer_descriptor.styles_kvp(),
    },
    KvpField {
        key: keys::CRS,
        value: |m| m.crs.clone(),
    },
    KvpField {
        key: keys::BBOX,
        value: |m| m.bounding_box.to_kvp(),
    },
    KvpField {
        key: keys::WIDTH,
        value: |m| m.output.size.width.to_string(),
    },
    KvpField {
        key: keys::HEIGHT,
        value: |m| m.output.size.height.to_string(),
    },
    KvpField {
        key: keys::FORMAT,
        value: |m| m.output.format.clone(),
    },
    KvpField {
        key: keys::TRANSPARENT,
        value: |m| match m.output.transparent {
            Some(true) => "TRUE".to_string(),
            Some(false) => "FALSE".to_string(),
            None => String::new(),
        },
    },
    KvpField {
        key: keys::BGCOLOR,
        value: |m| m.output.bgcolor.clone().unwrap_or_default(),
    },
    KvpField {
        key: keys::EXCEPTIONS,
        value: |m| m.exceptions.clone().unwrap_or_default(),
    },
];

impl OgcRequest for GetMap {
    const REQUEST: &'static str = "GetMap";

    fn parse_xml(doc: &[u8]) -> Result<Self, Vec<OgcException>> {
        let root = parse_request_root(doc, Self::REQUEST).map_err(|e| vec![e])?;
        let map = map_from_xml(&root).map_err(|e| vec![e])?;

        Ok(Self {
            service: root_attribute(&root, "service")
                .unwrap_or(DEFAULT_SERVICE)
                .to_string(),
            version: root_attribute(&root, "version")
                .unwrap_or_default()
                .to_string(),
            attributes: AttributeBag::capture(&root.attributes).dedupe(),
            map,
        })
    }

    fn parse_kvp(query: &QueryValues) -> Result<Self, Vec<OgcException>> {
        if query.is_empty() {
            return Err(vec![OgcException::missing_parameter(keys::VERSION)]);
        }

        let (params, mut exceptions) = KvpParams::from_query(query);
        check_request_name(&params, Self::REQUEST, &mut exceptions);
        let (service, version) = parse_service_version(&params, &mut exceptions);
        let map = map_from_kvp(&params, true, &mut exceptions);

        if !exceptions.is_empty() {
            tracing::debug!(count = exceptions.len(), "rejecting GetMap query");
            return Err(exceptions);
        }

        Ok(Self {
            service,
            version,
            attributes: AttributeBag::new(),
            map,
        })
    }

    fn build_xml(&self) -> String {
        let bag = self.attributes.with_defaults(MAP_NAMESPACES).emit();
        let mut writer = XmlWriter::new();
        writer.open(
            Self::REQUEST,
            &root_attributes(&bag, &self.service, &self.version),
        );
        write_map(&mut writer, &self.map);
        writer.close(Self::REQUEST);
        writer.finish()
    }

    fn build_kvp(&self) -> QueryValues {
        let mut query = QueryValues::new();
        encode_into(&mut query, self, GETMAP_FIELDS);
        encode_into(&mut query, &self.map, MAP_FIELDS);
        query
    }

    fn validate(&self, capabilities: &Capabilities) -> Vec<OgcException> {
        validation::validate_map(&self.map, capabilities)
    }
}

// === KVP ===

/// SERVICE defaults to WMS, VERSION is mandatory.
pub(crate) fn parse_service_version(
    params: &KvpParams,
    exceptions: &mut Vec<OgcException>,
) -> (String, String) {
    let service = params
        .get_non_empty(keys::SERVICE)
        .unwrap_or(DEFAULT_SERVICE)
        .to_string();
    let version = params
        .require(keys::VERSION, exceptions)
        .unwrap_or_default()
        .to_string();
    (service, version)
}

/// Decode the map description from normalized query parameters.
///
/// Problems are appended to `exceptions` and the affected field is left at
/// its default, so every problem in the query is reported at once.
pub(crate) fn map_from_kvp(
    params: &KvpParams,
    styles_required: bool,
    exceptions: &mut Vec<OgcException>,
) -> MapParameters {
    let layers = split_list(params.get(keys::LAYERS).unwrap_or_default());
    let styles = match params.get(keys::STYLES) {
        Some(styles) => split_list(styles),
        None => {
            if styles_required && !params.is_rejected(keys::STYLES) {
                exceptions.push(OgcException::missing_parameter(keys::STYLES));
            }
            Vec::new()
        }
    };
    let styled_layer_descriptor = StyledLayerDescriptor::correlate(&layers, &styles)
        .unwrap_or_else(|e| {
            exceptions.push(e);
            StyledLayerDescriptor::default()
        });

    let bounding_box = match params.require(keys::BBOX, exceptions) {
        Some(raw) => BoundingBox::from_kvp(raw).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "rejecting BBOX");
            exceptions.push(OgcException::invalid_parameter_value(raw, keys::BBOX));
            BoundingBox::default()
        }),
        None => BoundingBox::default(),
    };

    let transparent = match params.get_non_empty(keys::TRANSPARENT) {
        Some(raw) => parse_bool(raw).or_else(|| {
            exceptions.push(OgcException::invalid_parameter_value(raw, keys::TRANSPARENT));
            None
        }),
        None => None,
    };

    MapParameters {
        styled_layer_descriptor,
        crs: params.get(keys::CRS).unwrap_or_default().to_string(),
        bounding_box,
        output: Output {
            size: OutputSize {
                width: parse_dimension(params, keys::WIDTH, exceptions),
                height: parse_dimension(params, keys::HEIGHT, exceptions),
            },
            format: params.get(keys::FORMAT).unwrap_or_default().to_string(),
            transparent,
            bgcolor: params.get_non_empty(keys::BGCOLOR).map(str::to_string),
        },
        exceptions: params.get_non_empty(keys::EXCEPTIONS).map(str::to_string),
    }
}

/// WIDTH or HEIGHT. A value that is not a pixel count is reported as
/// missing, carrying the raw value.
fn parse_dimension(params: &KvpParams, key: &str, exceptions: &mut Vec<OgcException>) -> u32 {
    match params.require(key, exceptions) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            exceptions.push(OgcException::missing_parameter_value(key, raw));
            0
        }),
        None => 0,
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// === XML ===

/// Decode the map description from the children of a request root.
pub(crate) fn map_from_xml(root: &XmlElement) -> Result<MapParameters, OgcException> {
    let (layers, styles) = root
        .child("StyledLayerDescriptor")
        .map(project_named_layers)
        .unwrap_or_default();
    let styled_layer_descriptor = StyledLayerDescriptor::correlate(&layers, &styles)?;

    let output = match root.child("Output") {
        Some(output) => output_from_xml(output).map_err(|e| structural_exception(&e))?,
        None => Output::default(),
    };

    Ok(MapParameters {
        styled_layer_descriptor,
        crs: root.child_text("CRS").unwrap_or_default().to_string(),
        bounding_box: root.child("BoundingBox").map(bbox_from_xml).unwrap_or_default(),
        output,
        exceptions: optional_text(root, "Exceptions"),
    })
}

/// Split NamedLayer elements into parallel name and style lists.
///
/// The style list is empty when no layer names a style, otherwise it holds
/// one entry per layer with an empty token where the style is missing.
fn project_named_layers(sld: &XmlElement) -> (Vec<String>, Vec<String>) {
    let named: Vec<&XmlElement> = sld.children_named("NamedLayer").collect();
    let layers = named
        .iter()
        .map(|layer| layer.child_text("Name").unwrap_or_default().to_string())
        .collect();

    let styles = if named.iter().any(|layer| layer.child("NamedStyle").is_some()) {
        named
            .iter()
            .map(|layer| {
                layer
                    .child("NamedStyle")
                    .and_then(|style| style.child_text("Name"))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    } else {
        Vec::new()
    };

    (layers, styles)
}

fn output_from_xml(element: &XmlElement) -> WmsResult<Output> {
    let size = match element.child("Size") {
        Some(size) => OutputSize {
            width: parse_number(size, "Width")?.unwrap_or_default(),
            height: parse_number(size, "Height")?.unwrap_or_default(),
        },
        None => OutputSize::default(),
    };

    let transparent = match optional_text(element, "Transparent") {
        Some(raw) => Some(parse_bool(&raw).ok_or_else(|| WmsError::InvalidContent {
            element: "Transparent".to_string(),
            message: format!("not a boolean: {}", raw),
        })?),
        None => None,
    };

    Ok(Output {
        size,
        format: optional_text(element, "Format").unwrap_or_default(),
        transparent,
        bgcolor: optional_text(element, "BGcolor"),
    })
}

/// Write the map description as children of the current element.
pub(crate) fn write_map(writer: &mut XmlWriter, map: &MapParameters) {
    writer.open("StyledLayerDescriptor", &[("version", "1.1.0")]);
    for layer in &map.styled_layer_descriptor.named_layers {
        writer.open("NamedLayer", &[]);
        writer.leaf("se:Name", &[], &layer.name);
        if let Some(style) = &layer.style {
            writer.open("NamedStyle", &[]);
            writer.leaf("se:Name", &[], style);
            writer.close("NamedStyle");
        }
        writer.close("NamedLayer");
    }
    writer.close("StyledLayerDescriptor");

    writer.leaf("CRS", &[], &map.crs);
    write_bbox(writer, "BoundingBox", &map.bounding_box);

    let output = &map.output;
    writer.open("Output", &[]);
    writer.open("Size", &[]);
    writer.leaf("Width", &[], &output.size.width.to_string());
    writer.leaf("Height", &[], &output.size.height.to_string());
    writer.close("Size");
    writer.leaf("wms:Format", &[], &output.format);
    let transparent = output
        .transparent
        .map(|t| t.to_string())
        .unwrap_or_default();
    writer.leaf("Transparent", &[], &transparent);
    writer.leaf("BGcolor", &[], output.bgcolor.as_deref().unwrap_or_default());
    writer.close("Output");

    writer.leaf("Exceptions", &[], map.exceptions.as_deref().unwrap_or_default());
}
