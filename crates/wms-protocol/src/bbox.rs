//! XML half of the bounding box codec.
//!
//! ```xml
//! <BoundingBox crs="EPSG:4326">
//!  <ows:LowerCorner>-180.000000 -90.000000</ows:LowerCorner>
//!  <ows:UpperCorner>180.000000 90.000000</ows:UpperCorner>
//! </BoundingBox>
//! ```

use wms_common::{BoundingBox, Position};

use crate::xml::{XmlElement, XmlWriter};

/// Decode a bounding box element.
///
/// Corners whose text does not hold at least two numbers are left at zero.
pub fn bbox_from_xml(element: &XmlElement) -> BoundingBox {
    let corner = |local: &str| {
        element
            .child_text(local)
            .and_then(Position::from_text)
            .unwrap_or_default()
    };

    BoundingBox {
        crs: element.attribute("crs").map(str::to_string),
        dimensions: element.attribute("dimensions").map(str::to_string),
        lower_corner: corner("LowerCorner"),
        upper_corner: corner("UpperCorner"),
    }
}

/// Write a bounding box element, leaving out empty attributes.
pub(crate) fn write_bbox(writer: &mut XmlWriter, name: &str, bbox: &BoundingBox) {
    let mut attributes: Vec<(&str, &str)> = Vec::new();
    if let Some(crs) = bbox.crs.as_deref().filter(|c| !c.is_empty()) {
        attributes.push(("crs", crs));
    }
    if let Some(dimensions) = bbox.dimensions.as_deref().filter(|d| !d.is_empty()) {
        attributes.push(("dimensions", dimensions));
    }

    writer.open(name, &attributes);
    writer.leaf("ows:LowerCorner", &[], &bbox.lower_corner.to_string());
    writer.leaf("ows:UpperCorner", &[], &bbox.upper_corner.to_string());
    writer.close(name);
}
