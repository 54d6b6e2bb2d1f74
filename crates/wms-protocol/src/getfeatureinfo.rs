//! WMS GetFeatureInfo requests.
//!
//! A GetFeatureInfo carries the full map description of the GetMap it was
//! issued against, plus the layers to query and the pixel to query at.

use wms_common::Capabilities;

use crate::attributes::AttributeBag;
use crate::exceptions::OgcException;
use crate::getmap::{
    map_from_kvp, map_from_xml, parse_service_version, write_map, MapParameters, DEFAULT_SERVICE,
    MAP_FIELDS, MAP_NAMESPACES,
};
use crate::kvp::{encode_into, keys, split_list, KvpField, KvpParams, QueryValues};
use crate::request::{check_request_name, root_attribute, root_attributes, OgcRequest};
use crate::validation;
use crate::xml::{parse_number, parse_request_root, structural_exception, XmlWriter};

/// A GetFeatureInfo request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetFeatureInfo {
    pub service: String,
    pub version: String,
    pub attributes: AttributeBag,
    pub map: MapParameters,
    pub query_layers: Vec<String>,
    /// Pixel column, 0 at the left edge
    pub i: u32,
    /// Pixel row, 0 at the top edge
    pub j: u32,
    pub info_format: String,
    pub feature_count: Option<u32>,
}

impl Default for GetFeatureInfo {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            version: "1.3.0".to_string(),
            attributes: AttributeBag::new(),
            map: MapParameters::default(),
            query_layers: Vec::new(),
            i: 0,
            j: 0,
            info_format: String::new(),
            feature_count: None,
        }
    }
}

const HEADER_FIELDS: &[KvpField<GetFeatureInfo>] = &[
    KvpField {
        key: keys::SERVICE,
        value: |r| r.service.clone(),
    },
    KvpField {
        key: keys::REQUEST,
        value: |_| GetFeatureInfo::REQUEST.to_string(),
    },
    KvpField {
        key: keys::VERSION,
        value: |r| r.version.clone(),
    },
];

const QUERY_FIELDS: &[KvpField<GetFeatureInfo>] = &[
    KvpField {
        key: keys::QUERY_LAYERS,
        value: |r| r.query_layers.join(","),
    },
    KvpField {
        key: keys::INFO_FORMAT,
        value: |r| r.info_format.clone(),
    },
    KvpField {
        key: keys::I,
        value: |r| r.i.to_string(),
    },
    KvpField {
        key: keys::J,
        value: |r| r.j.to_string(),
    },
    KvpField {
        key: keys::FEATURE_COUNT,
        value: |r| r.feature_count.map(|c| c.to_string()).unwrap_or_default(),
    },
];

impl OgcRequest for GetFeatureInfo {
    const REQUEST: &'static str = "GetFeatureInfo";

    fn parse_xml(doc: &[u8]) -> Result<Self, Vec<OgcException>> {
        let root = parse_request_root(doc, Self::REQUEST).map_err(|e| vec![e])?;
        let map = map_from_xml(&root).map_err(|e| vec![e])?;

        let query_layers = root
            .child("QueryLayers")
            .map(|layers| {
                layers
                    .children_named("Name")
                    .map(|name| name.text.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let (i, j) = match (root.child_text("I"), root.child_text("J")) {
            (Some(i), Some(j)) => parse_point(i, j).map_err(|e| vec![e])?,
            (None, None) => (0, 0),
            (i, _) => {
                let missing = if i.is_none() { keys::I } else { keys::J };
                return Err(vec![OgcException::missing_parameter(missing)]);
            }
        };

        let feature_count =
            parse_number(&root, "FeatureCount").map_err(|e| vec![structural_exception(&e)])?;

        Ok(Self {
            service: root_attribute(&root, "service")
                .unwrap_or(DEFAULT_SERVICE)
                .to_string(),
            version: root_attribute(&root, "version")
                .unwrap_or_default()
                .to_string(),
            attributes: AttributeBag::capture(&root.attributes).dedupe(),
            map,
            query_layers,
            i,
            j,
            info_format: root.child_text("InfoFormat").unwrap_or_default().to_string(),
            feature_count,
        })
    }

    fn parse_kvp(query: &QueryValues) -> Result<Self, Vec<OgcException>> {
        if query.is_empty() {
            return Err(vec![OgcException::missing_parameter(keys::VERSION)]);
        }

        let (params, mut exceptions) = KvpParams::from_query(query);
        check_request_name(&params, Self::REQUEST, &mut exceptions);
        let (service, version) = parse_service_version(&params, &mut exceptions);
        let map = map_from_kvp(&params, false, &mut exceptions);

        let query_layers = split_list(
            params
                .get(keys::QUERY_LAYERS)
                .or_else(|| params.get(keys::QUERYLAYERS))
                .unwrap_or_default(),
        );

        let (i, j) = match (params.get_non_empty(keys::I), params.get_non_empty(keys::J)) {
            (Some(i), Some(j)) => parse_point(i, j).unwrap_or_else(|e| {
                exceptions.push(e);
                (0, 0)
            }),
            (i, j) => {
                if i.is_none() && !params.is_rejected(keys::I) {
                    exceptions.push(OgcException::missing_parameter(keys::I));
                }
                if j.is_none() && !params.is_rejected(keys::J) {
                    exceptions.push(OgcException::missing_parameter(keys::J));
                }
                (0, 0)
            }
        };

        let feature_count = match params.get_non_empty(keys::FEATURE_COUNT) {
            Some(raw) => raw.parse::<u32>().map(Some).unwrap_or_else(|_| {
                exceptions.push(OgcException::invalid_parameter_value(
                    raw,
                    keys::FEATURE_COUNT,
                ));
                None
            }),
            None => None,
        };

        if !exceptions.is_empty() {
            tracing::debug!(count = exceptions.len(), "rejecting GetFeatureInfo query");
            return Err(exceptions);
        }

        Ok(Self {
            service,
            version,
            attributes: AttributeBag::new(),
            map,
            query_layers,
            i,
            j,
            info_format: params.get(keys::INFO_FORMAT).unwrap_or_default().to_string(),
            feature_count,
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

        writer.open("QueryLayers", &[]);
        for layer in &self.query_layers {
            writer.leaf("se:Name", &[], layer);
        }
        writer.close("QueryLayers");
        writer.leaf("InfoFormat", &[], &self.info_format);
        writer.leaf("I", &[], &self.i.to_string());
        writer.leaf("J", &[], &self.j.to_string());
        let feature_count = self
            .feature_count
            .map(|c| c.to_string())
            .unwrap_or_default();
        writer.leaf("FeatureCount", &[], &feature_count);

        writer.close(Self::REQUEST);
        writer.finish()
    }

    fn build_kvp(&self) -> QueryValues {
        let mut query = QueryValues::new();
        encode_into(&mut query, self, HEADER_FIELDS);
        encode_into(&mut query, &self.map, MAP_FIELDS);
        encode_into(&mut query, self, QUERY_FIELDS);
        query
    }

    fn validate(&self, capabilities: &Capabilities) -> Vec<OgcException> {
        let mut exceptions = validation::validate_map(&self.map, capabilities);
        exceptions.extend(validation::check_query_layers(
            &self.query_layers,
            capabilities,
        ));
        exceptions.extend(validation::check_point(self.i, self.j, &self.map.output.size));
        exceptions.extend(validation::check_info_format(
            &self.info_format,
            capabilities,
        ));
        exceptions
    }
}

/// I and J are reported together: if either is not a pixel index, the
/// exception carries both raw values.
fn parse_point(i: &str, j: &str) -> Result<(u32, u32), OgcException> {
    match (i.parse(), j.parse()) {
        (Ok(i), Ok(j)) => Ok((i, j)),
        _ => {
            tracing::debug!(i = %i, j = %j, "rejecting point");
            Err(OgcException::invalid_point(i, j))
        }
    }
}
