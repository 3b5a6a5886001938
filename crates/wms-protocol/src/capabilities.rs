//! WMS 1.3.0 GetCapabilities document.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::collections::BTreeSet;
use thiserror::Error;

use wms_common::{time_extent, LayerHistory, RUN_CADENCE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapabilitiesError {
    #[error("No data available")]
    NoData,
}

/// Service-level fields of the capabilities document.
#[derive(Debug, Clone)]
pub struct WmsCapabilitiesBuilder {
    pub service_title: String,
    pub service_abstract: String,
    /// Base URL clients use to reach `/wms`, without a trailing slash
    pub service_url: String,
}

impl Default for WmsCapabilitiesBuilder {
    fn default() -> Self {
        Self {
            service_title: "Weather Visualization WMS Server".to_string(),
            service_abstract: "WMS server for gridded numerical weather prediction data".to_string(),
            service_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Capabilities with the default service description.
pub fn build_capabilities(histories: &[LayerHistory]) -> Result<String, CapabilitiesError> {
    WmsCapabilitiesBuilder::default().build(histories)
}

impl WmsCapabilitiesBuilder {
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// One queryable layer per non-empty history, sorted by parameter.
    ///
    /// Every layer advertises the same time extent: the union of all
    /// timestamps across histories at the acquisition cadence.
    pub fn build(&self, histories: &[LayerHistory]) -> Result<String, CapabilitiesError> {
        let all_times: Vec<DateTime<Utc>> = histories
            .iter()
            .flat_map(|h| h.all_times())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let extent = time_extent(&all_times, RUN_CADENCE);

        let mut sorted: Vec<&LayerHistory> = histories.iter().filter(|h| !h.is_empty()).collect();
        sorted.sort_by(|a, b| a.parameter.cmp(&b.parameter));
        if sorted.is_empty() {
            return Err(CapabilitiesError::NoData);
        }

        let layers: String = sorted
            .iter()
            .filter_map(|history| history.latest().map(|latest| (history, latest)))
            .map(|(history, latest)| {
                let b = &latest.bounds;
                format!(
                    r#"
      <Layer queryable="1">
        <Name>{name}</Name>
        <Title>{title}</Title>
        <Abstract>Weather parameter: {title} ({units})</Abstract>
        <CRS>EPSG:4326</CRS>
        <CRS>EPSG:3857</CRS>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>{west}</westBoundLongitude>
          <eastBoundLongitude>{east}</eastBoundLongitude>
          <southBoundLatitude>{south}</southBoundLatitude>
          <northBoundLatitude>{north}</northBoundLatitude>
        </EX_GeographicBoundingBox>
        <BoundingBox CRS="EPSG:4326" minx="{west}" miny="{south}" maxx="{east}" maxy="{north}"/>
        <Dimension name="time" units="ISO8601">{extent}</Dimension>
        <Style>
          <Name>default</Name>
          <Title>Default Style</Title>
        </Style>
      </Layer>"#,
                    name = escape(&history.parameter),
                    title = escape(&latest.name),
                    units = escape(&latest.units),
                    west = b.west,
                    east = b.east,
                    south = b.south,
                    north = b.north,
                    extent = escape(&extent),
                )
            })
            .collect();

        let url = escape(&self.service_url);
        let online = format!(
            r#"<DCPType><HTTP><Get><OnlineResource xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="{}/wms?"/></Get></HTTP></DCPType>"#,
            url
        );

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms"
                  xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                  xsi:schemaLocation="http://www.opengis.net/wms http://schemas.opengis.net/wms/1.3.0/capabilities_1_3_0.xsd">
  <Service>
    <Name>WMS</Name>
    <Title>{title}</Title>
    <Abstract>{abstract_}</Abstract>
    <OnlineResource xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="{url}/wms"/>
  </Service>
  <Capability>
    <Request>
      <GetCapabilities>
        <Format>text/xml</Format>
        {online}
      </GetCapabilities>
      <GetMap>
        <Format>image/png</Format>
        {online}
      </GetMap>
      <GetFeatureInfo>
        <Format>application/json</Format>
        {online}
      </GetFeatureInfo>
    </Request>
    <Exception>
      <Format>XML</Format>
      <Format>JSON</Format>
    </Exception>
    <Layer>
      <Title>Weather Data Layers</Title>
      <CRS>EPSG:4326</CRS>
      <CRS>EPSG:3857</CRS>{layers}
    </Layer>
  </Capability>
</WMS_Capabilities>
"#,
            title = escape(&self.service_title),
            abstract_ = escape(&self.service_abstract),
            url = url,
            online = online,
            layers = layers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use wms_common::{Bounds, ColorScale, GridDimensions, MetadataRecord, Statistics};

    fn record(parameter: &str, name: &str, hours: &[u32]) -> MetadataRecord {
        MetadataRecord {
            parameter: parameter.to_string(),
            name: name.to_string(),
            units: "°C".to_string(),
            file: format!("{}_2024010100.nc", parameter),
            variable: "v".to_string(),
            times: hours
                .iter()
                .map(|h| Utc.with_ymd_and_hms(2024, 1, 1, *h, 0, 0).unwrap())
                .collect(),
            bounds: Bounds {
                north: 90.0,
                south: -90.0,
                east: 359.75,
                west: 0.0,
            },
            statistics: Statistics::zeroed(),
            color_scale: ColorScale::fallback(parameter, 0.0, 1.0),
            dimensions: GridDimensions {
                time: hours.len(),
                lat: 721,
                lon: 1440,
            },
            created: Utc::now(),
        }
    }

    /// Text of every element named `tag`, in document order.
    fn texts(xml: &str, tag: &[u8]) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut out = Vec::new();
        let mut inside = false;
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => inside = e.name().as_ref() == tag,
                Ok(Event::Text(t)) if inside => out.push(t.unescape().unwrap().into_owned()),
                Ok(Event::End(_)) => inside = false,
                Ok(Event::Eof) => break,
                Err(e) => panic!("invalid XML: {:?}", e),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_no_layers_is_no_data() {
        assert_eq!(build_capabilities(&[]), Err(CapabilitiesError::NoData));
        let empty = LayerHistory::new("temp_2m", vec![]);
        assert_eq!(build_capabilities(&[empty]), Err(CapabilitiesError::NoData));
    }

    #[test]
    fn test_layers_sorted_and_described() {
        let histories = vec![
            LayerHistory::new("wind_speed_10m", vec![record("wind_speed_10m", "Wind Speed 10m", &[6])]),
            LayerHistory::new("temp_2m", vec![record("temp_2m", "Temperature 2m", &[0, 3])]),
            LayerHistory::new("mslp", vec![]),
        ];
        let xml = build_capabilities(&histories).unwrap();

        assert_eq!(texts(&xml, b"Name"), vec!["WMS", "temp_2m", "default", "wind_speed_10m", "default"]);
        assert!(texts(&xml, b"Abstract").contains(&"Weather parameter: Temperature 2m (°C)".to_string()));
        assert_eq!(
            texts(&xml, b"Dimension"),
            vec!["2024-01-01T00:00:00Z/2024-01-01T06:00:00Z/PT3H"; 2]
        );
        assert_eq!(texts(&xml, b"westBoundLongitude"), vec!["0", "0"]);
        assert_eq!(texts(&xml, b"eastBoundLongitude"), vec!["359.75", "359.75"]);
        assert!(xml.contains(r#"<Layer queryable="1">"#));
    }

    #[test]
    fn test_layer_without_times_has_empty_dimension() {
        let histories = vec![LayerHistory::new("temp_2m", vec![record("temp_2m", "T", &[])])];
        let xml = build_capabilities(&histories).unwrap();
        assert!(xml.contains(r#"<Dimension name="time" units="ISO8601"></Dimension>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let histories = vec![LayerHistory::new("odd", vec![record("odd", "Rain & <snow>", &[0])])];
        let xml = build_capabilities(&histories).unwrap();
        assert!(xml.contains("Rain &amp; &lt;snow&gt;"));
        assert!(texts(&xml, b"Title").contains(&"Rain & <snow>".to_string()));
    }

    #[test]
    fn test_service_url() {
        let builder = WmsCapabilitiesBuilder::default().with_service_url("https://maps.example.org/");
        let xml = builder
            .build(&[LayerHistory::new("t", vec![record("t", "T", &[0])])])
            .unwrap();
        assert!(xml.contains(r#"xlink:href="https://maps.example.org/wms?""#));
    }
}
