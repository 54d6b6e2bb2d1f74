//! Common test fixtures for request codec tests.
//!
//! This module provides a capabilities document and reference requests in
//! both wire forms.

use wms_common::Capabilities;

/// Common bounding box definitions for testing, as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);

    /// Degenerate bbox (min == max)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}

/// Capabilities in the YAML shape the services load them from.
///
/// Hydrography and Transport are unnamed category layers; their CRS lists
/// are inherited by the layers below them.
pub const CAPABILITIES_YAML: &str = r#"
map_formats:
  - image/png
  - image/jpeg
feature_info_formats:
  - text/xml
  - application/json
max_width: 2048
max_height: 2048
layers:
  - title: Hydrography
    crs: ["EPSG:4326", "EPSG:3857"]
    layers:
      - name: Rivers
        title: Rivers
        queryable: true
        styles: [CenterLine, Outline]
      - name: Lakes
        queryable: true
        crs: ["CRS:84"]
  - title: Transport
    crs: ["EPSG:4326"]
    layers:
      - name: Roads
        styles: [CenterLine]
"#;

/// The fixture capabilities document.
pub fn capabilities() -> Capabilities {
    Capabilities::from_yaml_str(CAPABILITIES_YAML).expect("fixture capabilities are valid YAML")
}

/// A GetMap query that passes validation against [`capabilities`].
pub const GETMAP_KVP: &str = "SERVICE=WMS&REQUEST=GetMap&VERSION=1.3.0\
&LAYERS=Rivers,Roads&STYLES=CenterLine,&CRS=EPSG:4326\
&BBOX=-180.0,-90.0,180.0,90.0&WIDTH=1024&HEIGHT=512&FORMAT=image/png";

/// A GetFeatureInfo query that passes validation against [`capabilities`].
pub const GETFEATUREINFO_KVP: &str = "service=WMS&request=GetFeatureInfo&version=1.3.0\
&layers=Rivers&styles=&crs=EPSG:4326&bbox=-130,20,-60,55&width=256&height=256\
&format=image/png&query_layers=Rivers&info_format=text/xml&i=128&j=64&feature_count=3";

/// A GetMap document carrying a foreign schema location attribute.
pub const GETMAP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetMap xmlns="http://www.opengis.net/sld"
        xmlns:ows="http://www.opengis.net/ows"
        xmlns:se="http://www.opengis.net/se"
        xmlns:wms="http://www.opengis.net/wms"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="http://www.opengis.net/sld GetMap.xsd"
        service="WMS" version="1.3.0">
  <StyledLayerDescriptor version="1.1.0">
    <NamedLayer>
      <se:Name>Rivers</se:Name>
      <NamedStyle><se:Name>CenterLine</se:Name></NamedStyle>
    </NamedLayer>
    <NamedLayer>
      <se:Name>Roads</se:Name>
    </NamedLayer>
  </StyledLayerDescriptor>
  <CRS>EPSG:4326</CRS>
  <BoundingBox crs="EPSG:4326">
    <ows:LowerCorner>-180.0 -90.0</ows:LowerCorner>
    <ows:UpperCorner>180.0 90.0</ows:UpperCorner>
  </BoundingBox>
  <Output>
    <Size>
      <Width>1024</Width>
      <Height>512</Height>
    </Size>
    <wms:Format>image/png</wms:Format>
    <Transparent>true</Transparent>
  </Output>
  <Exceptions>XML</Exceptions>
</GetMap>"#;

/// A GetFeatureInfo document querying Rivers.
pub const GETFEATUREINFO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetFeatureInfo xmlns="http://www.opengis.net/sld"
                xmlns:ows="http://www.opengis.net/ows"
                xmlns:se="http://www.opengis.net/se"
                service="WMS" version="1.3.0">
  <StyledLayerDescriptor version="1.1.0">
    <NamedLayer><se:Name>Rivers</se:Name></NamedLayer>
  </StyledLayerDescriptor>
  <CRS>EPSG:4326</CRS>
  <BoundingBox>
    <ows:LowerCorner>-130 20</ows:LowerCorner>
    <ows:UpperCorner>-60 55</ows:UpperCorner>
  </BoundingBox>
  <Output>
    <Size><Width>256</Width><Height>256</Height></Size>
    <wms:Format>image/png</wms:Format>
  </Output>
  <QueryLayers><se:Name>Rivers</se:Name></QueryLayers>
  <InfoFormat>text/xml</InfoFormat>
  <I>128</I>
  <J>64</J>
  <FeatureCount>3</FeatureCount>
</GetFeatureInfo>"#;

/// A WMS GetCapabilities document.
pub const GETCAPABILITIES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetCapabilities xmlns="http://www.opengis.net/wms"
                 xmlns:xlink="http://www.w3.org/1999/xlink"
                 service="WMS" version="1.3.0"/>"#;
