//! Capabilities metadata consulted when validating requests.
//!
//! The document is owned by the embedding service and loaded from
//! configuration. Validation only ever reads it.

use serde::{Deserialize, Serialize};

use crate::{WmsError, WmsResult};

/// The parts of a capabilities document that request validation depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Top-level layers, each possibly nesting further layers
    #[serde(default)]
    pub layers: Vec<CapabilitiesLayer>,

    /// Output formats offered by GetMap (e.g., "image/png")
    #[serde(default)]
    pub map_formats: Vec<String>,

    /// Output formats offered by GetFeatureInfo (e.g., "text/xml")
    #[serde(default)]
    pub feature_info_formats: Vec<String>,

    /// Maximum output width in pixels, unbounded when absent
    #[serde(default)]
    pub max_width: Option<u32>,

    /// Maximum output height in pixels, unbounded when absent
    #[serde(default)]
    pub max_height: Option<u32>,
}

/// A node of the layer tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilitiesLayer {
    /// Layer name used in requests. Category layers may have none.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Whether GetFeatureInfo may target this layer
    #[serde(default)]
    pub queryable: bool,

    /// CRS identifiers declared on this layer. Children inherit them.
    #[serde(default)]
    pub crs: Vec<String>,

    /// Style names declared on this layer
    #[serde(default)]
    pub styles: Vec<String>,

    /// Nested layers
    #[serde(default)]
    pub layers: Vec<CapabilitiesLayer>,
}

/// A layer located in the tree together with the CRS list it inherits.
#[derive(Debug, Clone)]
pub struct LayerMatch<'a> {
    pub layer: &'a CapabilitiesLayer,
    inherited_crs: Vec<&'a str>,
}

impl<'a> LayerMatch<'a> {
    /// Check if this layer, or any of its ancestors, declares the CRS.
    ///
    /// Identifiers compare case-insensitively. A layer without any declared
    /// CRS anywhere on its path accepts every CRS.
    pub fn supports_crs(&self, crs: &str) -> bool {
        if self.inherited_crs.is_empty() && self.layer.crs.is_empty() {
            return true;
        }
        self.inherited_crs
            .iter()
            .copied()
            .chain(self.layer.crs.iter().map(String::as_str))
            .any(|c| c.eq_ignore_ascii_case(crs))
    }
}

impl CapabilitiesLayer {
    /// Check if a style is declared on this specific layer.
    pub fn has_style(&self, style: &str) -> bool {
        self.styles.iter().any(|s| s == style)
    }
}

impl Capabilities {
    /// Load capabilities from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> WmsResult<Self> {
        serde_yaml::from_str(yaml).map_err(WmsError::from)
    }

    /// Load capabilities from a JSON document.
    pub fn from_json_str(json: &str) -> WmsResult<Self> {
        serde_json::from_str(json).map_err(WmsError::from)
    }

    /// Find a named layer anywhere in the tree. Names match case-sensitively.
    pub fn find_layer(&self, name: &str) -> Option<LayerMatch<'_>> {
        let mut ancestors = Vec::new();
        let layer = find_in(&self.layers, name, &mut ancestors)?;
        let inherited_crs = ancestors
            .iter()
            .flat_map(|a| a.crs.iter().map(String::as_str))
            .collect();
        Some(LayerMatch {
            layer,
            inherited_crs,
        })
    }

    /// Check whether a format is offered by GetMap.
    pub fn supports_map_format(&self, format: &str) -> bool {
        self.map_formats.iter().any(|f| f == format)
    }

    /// Check whether a format is offered by GetFeatureInfo.
    pub fn supports_feature_info_format(&self, format: &str) -> bool {
        self.feature_info_formats.iter().any(|f| f == format)
    }
}

fn find_in<'a>(
    layers: &'a [CapabilitiesLayer],
    name: &str,
    ancestors: &mut Vec<&'a CapabilitiesLayer>,
) -> Option<&'a CapabilitiesLayer> {
    for layer in layers {
        if layer.name.as_deref() == Some(name) {
            return Some(layer);
        }
        ancestors.push(layer);
        if let Some(found) = find_in(&layer.layers, name, ancestors) {
            return Some(found);
        }
        ancestors.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Capabilities {
        Capabilities {
            layers: vec![CapabilitiesLayer {
                name: None,
                title: Some("Root".to_string()),
                crs: vec!["EPSG:4326".to_string()],
                layers: vec![
                    CapabilitiesLayer {
                        name: Some("Rivers".to_string()),
                        crs: vec!["EPSG:3857".to_string()],
                        styles: vec!["CenterLine".to_string()],
                        ..Default::default()
                    },
                    CapabilitiesLayer {
                        name: Some("Roads".to_string()),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_find_nested_layer() {
        let caps = tree();
        let found = caps.find_layer("Rivers").unwrap();
        assert!(found.layer.has_style("CenterLine"));
        assert!(caps.find_layer("rivers").is_none());
        assert!(caps.find_layer("Houses").is_none());
    }

    #[test]
    fn test_crs_inherited_from_parent() {
        let caps = tree();
        let rivers = caps.find_layer("Rivers").unwrap();
        assert!(rivers.supports_crs("EPSG:3857"));
        assert!(rivers.supports_crs("epsg:4326"));
        assert!(!rivers.supports_crs("EPSG:28992"));

        let roads = caps.find_layer("Roads").unwrap();
        assert!(roads.supports_crs("EPSG:4326"));
        assert!(!roads.supports_crs("EPSG:3857"));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
layers:
  - name: Rivers
    queryable: true
    styles: [CenterLine]
map_formats: [image/png]
max_width: 2048
"#;
        let caps = Capabilities::from_yaml_str(yaml).unwrap();
        assert!(caps.find_layer("Rivers").unwrap().layer.queryable);
        assert!(caps.supports_map_format("image/png"));
        assert_eq!(caps.max_width, Some(2048));
        assert_eq!(caps.max_height, None);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(Capabilities::from_json_str("{\"layers\": 3}").is_err());
    }
}
