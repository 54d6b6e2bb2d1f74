//! Correlation of LAYERS and STYLES into a styled layer descriptor.

use crate::exceptions::OgcException;

/// A layer selected by name, with the style to render it in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamedLayer {
    pub name: String,
    /// `None` when no style was given, `Some("")` for the server default
    pub style: Option<String>,
}

impl NamedLayer {
    pub fn new(name: impl Into<String>, style: Option<&str>) -> Self {
        Self {
            name: name.into(),
            style: style.map(str::to_string),
        }
    }
}

/// The ordered layer and style selection of a map request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLayerDescriptor {
    pub named_layers: Vec<NamedLayer>,
}

impl StyledLayerDescriptor {
    /// Pair layer names with style names.
    ///
    /// - no styles: every layer gets no style
    /// - no layers: an empty descriptor (a missing LAYERS is a validation concern)
    /// - equal lengths: zipped in order, empty style tokens are kept as `Some("")`
    /// - anything else raises StyleNotDefined and builds nothing
    pub fn correlate<L, S>(layers: &[L], styles: &[S]) -> Result<Self, OgcException>
    where
        L: AsRef<str>,
        S: AsRef<str>,
    {
        if styles.is_empty() {
            return Ok(Self {
                named_layers: layers
                    .iter()
                    .map(|layer| NamedLayer::new(layer.as_ref(), None))
                    .collect(),
            });
        }

        if layers.is_empty() {
            return Ok(Self::default());
        }

        if layers.len() != styles.len() {
            return Err(OgcException::style_correlation());
        }

        Ok(Self {
            named_layers: layers
                .iter()
                .zip(styles)
                .map(|(layer, style)| NamedLayer::new(layer.as_ref(), Some(style.as_ref())))
                .collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.named_layers.is_empty()
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.named_layers.iter().map(|l| l.name.as_str())
    }

    /// Comma-joined LAYERS value.
    pub fn layers_kvp(&self) -> String {
        self.layer_names().collect::<Vec<_>>().join(",")
    }

    /// Comma-joined STYLES value, an empty token for every absent style.
    pub fn styles_kvp(&self) -> String {
        self.named_layers
            .iter()
            .map(|l| l.style.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",")
    }
}
