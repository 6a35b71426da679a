//! Marker emission
//!
//! Maps a [`RecordSet`] one-to-one, in order, onto the shapes downstream
//! renderers consume: the interactive marker list, the static overlay list,
//! and the tab-separated source text the parser reads back.

use crate::{
    core::{constants::DEFAULT_MARKER_SIZE, geo::LatLng},
    data::{
        label::{measure_label, LabelSize, LabelStyle},
        record::{GeoRecord, RecordSet},
    },
    layers::marker::{Color, Marker},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One entry of the interactive map's marker file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub name: String,
    /// `[latitude, longitude]`
    pub lat_lng: [f64; 2],
}

impl From<&GeoRecord> for MapMarker {
    fn from(record: &GeoRecord) -> Self {
        Self {
            name: record.name().to_string(),
            lat_lng: [record.latitude(), record.longitude()],
        }
    }
}

/// A point marker drawn onto a static image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayMarker {
    pub position: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_size: Option<LabelSize>,
    pub color: Color,
    pub size: u32,
}

impl From<&Marker> for OverlayMarker {
    fn from(marker: &Marker) -> Self {
        Self {
            position: marker.position(),
            label: marker.popup_text().map(str::to_string),
            label_size: None,
            color: marker.color(),
            size: marker.size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEmitter {
    pub color: Color,
    pub marker_size: u32,
    /// Attach the record name as a label on static overlays
    pub labels: bool,
    pub label_style: LabelStyle,
}

impl Default for MarkerEmitter {
    fn default() -> Self {
        Self {
            color: Color::default(),
            marker_size: DEFAULT_MARKER_SIZE,
            labels: true,
            label_style: LabelStyle::default(),
        }
    }
}

impl MarkerEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    /// Interactive marker list
    pub fn map_markers(&self, records: &RecordSet) -> Vec<MapMarker> {
        records.iter().map(MapMarker::from).collect()
    }

    /// Static overlay list, labels measured with the emitter's style
    pub fn overlay(&self, records: &RecordSet) -> Vec<OverlayMarker> {
        self.markers(records)
            .iter()
            .map(|marker| self.overlay_marker(marker))
            .collect()
    }

    /// Overlay descriptor for a single marker, using the marker's own color
    /// and size and the emitter's label settings
    pub fn overlay_marker(&self, marker: &Marker) -> OverlayMarker {
        let mut overlay = OverlayMarker::from(marker);
        if self.labels {
            overlay.label_size = overlay
                .label
                .as_deref()
                .map(|label| measure_label(label, &self.label_style));
        } else {
            overlay.label = None;
        }
        overlay
    }

    /// Map markers for a [`crate::MapView`], ids numbered in record order
    pub fn markers(&self, records: &RecordSet) -> Vec<Marker> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                Marker::from_record(format!("marker-{}", i), record)
                    .with_color(self.color)
                    .with_size(self.marker_size)
            })
            .collect()
    }

    /// Interactive marker list as a pretty-printed JSON array
    pub fn to_json(&self, records: &RecordSet) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.map_markers(records))?)
    }

    /// Tab-separated `name, latitude, longitude` lines.
    ///
    /// Uses the shortest decimal that reads back to the same `f64`, so
    /// parser-produced records survive a round trip unchanged.
    pub fn to_source_text(&self, records: &RecordSet) -> String {
        let mut text = String::new();
        for record in records {
            // Writing to a String cannot fail
            let _ = writeln!(
                text,
                "{}\t{}\t{}",
                record.name(),
                record.latitude(),
                record.longitude()
            );
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::RecordParser;

    fn records() -> RecordSet {
        [
            ("Cataract Falls", 37.93132, -122.6352),
            ("Carson Falls", 37.9767, -122.6347),
            ("Cataract Falls", 37.9314, -122.6353),
        ]
        .iter()
        .map(|(n, lat, lng)| GeoRecord::new(n, *lat, *lng).unwrap())
        .collect()
    }

    #[test]
    fn test_map_markers_keep_order() {
        let markers = MarkerEmitter::new().map_markers(&records());
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].name, "Cataract Falls");
        assert_eq!(markers[0].lat_lng, [37.93132, -122.6352]);
        assert_eq!(markers[1].name, "Carson Falls");
        assert_eq!(markers[2].lat_lng, [37.9314, -122.6353]);
    }

    #[test]
    fn test_json_shape() {
        let json = MarkerEmitter::new().to_json(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Cataract Falls");
        assert_eq!(value[0]["lat_lng"][0], 37.93132);
        assert_eq!(value[0]["lat_lng"][1], -122.6352);
        assert_eq!(value.as_array().unwrap().len(), 3);

        let back: Vec<MapMarker> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MarkerEmitter::new().map_markers(&records()));
    }

    #[test]
    fn test_overlay_with_labels() {
        let emitter = MarkerEmitter::new().with_color(Color::BLUE);
        let overlay = emitter.overlay(&records());
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay[1].position, LatLng::new(37.9767, -122.6347));
        assert!(overlay.iter().all(|m| m.color == Color::BLUE));
        assert_eq!(overlay[1].label.as_deref(), Some("Carson Falls"));
        assert_eq!(
            overlay[1].label_size,
            Some(measure_label("Carson Falls", &LabelStyle::default()))
        );
    }

    #[test]
    fn test_overlay_without_labels() {
        let overlay = MarkerEmitter::new().without_labels().overlay(&records());
        assert!(overlay.iter().all(|m| m.label.is_none() && m.label_size.is_none()));

        let json = serde_json::to_value(&overlay[0]).unwrap();
        assert!(json.get("label").is_none());
        assert_eq!(json["size"], DEFAULT_MARKER_SIZE);
    }

    #[test]
    fn test_markers_carry_style() {
        let markers = MarkerEmitter::new()
            .with_color(Color::GREEN)
            .markers(&records());
        assert_eq!(markers[2].id(), "marker-2");
        assert_eq!(markers[2].popup_text(), Some("Cataract Falls"));
        assert!(markers.iter().all(|m| m.color() == Color::GREEN));
    }

    #[test]
    fn test_source_text_round_trip() {
        let parser = RecordParser::new();
        let original = parser
            .parse(
                "Cataract Falls\t37.93132\t-122.63520\n\
                 Devil's Punchbowl, 44.6683, -123.9719\n\
                 Tiny Falls  -0.000001  +179.5\n\
                 Cataract Falls\t37.9314\t-122.6353\n",
            )
            .unwrap()
            .into_records();

        let emitter = MarkerEmitter::new();
        let text = emitter.to_source_text(&original);
        let reparsed = parser.parse(&text).unwrap();

        assert_eq!(reparsed.skipped_count(), 0);
        assert_eq!(reparsed.records, original);
        assert_eq!(emitter.to_source_text(&reparsed.records), text);
    }
}
