//! Common types shared by the OGC request codecs.

pub mod bbox;
pub mod capabilities;
pub mod error;

pub use bbox::{BboxParseError, BoundingBox, Position};
pub use capabilities::{Capabilities, CapabilitiesLayer, LayerMatch};
pub use error::{WmsError, WmsResult};
