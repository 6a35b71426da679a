use crate::{
    core::{
        config::FitOptions,
        geo::{LatLng, LatLngBounds},
        viewport::Viewport,
    },
    data::{
        formats::{MapMarker, MarkerEmitter},
        record::RecordSet,
        static_map::StaticMapRequest,
    },
    layers::marker::Marker,
    MapError, Result,
};

/// A map session: a marker collection plus the options used to frame it.
///
/// Construct one per page or render session; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct MapView {
    markers: Vec<Marker>,
    options: FitOptions,
    emitter: MarkerEmitter,
}

impl MapView {
    pub fn new(options: FitOptions) -> Self {
        Self {
            markers: Vec::new(),
            options,
            emitter: MarkerEmitter::default(),
        }
    }

    /// Builds a view holding one marker per record, styled by `emitter`
    pub fn from_records(records: &RecordSet, options: FitOptions, emitter: MarkerEmitter) -> Self {
        Self {
            markers: emitter.markers(records),
            options,
            emitter,
        }
    }

    /// Adds a marker. Ids must be unique and positions valid.
    pub fn add_marker(&mut self, marker: Marker) -> Result<()> {
        if !marker.position().is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "marker {} at ({}, {})",
                marker.id(),
                marker.position().lat,
                marker.position().lng
            )));
        }
        if self.get_marker(marker.id()).is_some() {
            return Err(MapError::Marker(format!(
                "marker {} already exists",
                marker.id()
            )));
        }

        self.markers.push(marker);
        Ok(())
    }

    /// Removes a marker by id, keeping the order of the rest
    pub fn remove_marker(&mut self, marker_id: &str) -> Option<Marker> {
        let index = self.markers.iter().position(|m| m.id() == marker_id)?;
        Some(self.markers.remove(index))
    }

    pub fn get_marker(&self, marker_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id() == marker_id)
    }

    /// Removes every marker
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn positions(&self) -> Vec<LatLng> {
        self.markers.iter().map(Marker::position).collect()
    }

    /// Bounding box of all markers, `None` while empty
    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.positions())
    }

    /// Viewport framing every marker; recomputed on every call
    pub fn fit(&self) -> Result<Viewport> {
        Viewport::fit(&self.positions(), &self.options)
    }

    /// Interactive marker list; markers without a popup use their id as name
    pub fn map_markers(&self) -> Vec<MapMarker> {
        self.markers
            .iter()
            .map(|m| MapMarker {
                name: m.popup_text().unwrap_or(m.id()).to_string(),
                lat_lng: [m.position().lat, m.position().lng],
            })
            .collect()
    }

    /// Static map request framing every marker
    pub fn static_request(&self) -> Result<StaticMapRequest> {
        let viewport = self.fit()?;
        let overlay = self
            .markers
            .iter()
            .map(|m| self.emitter.overlay_marker(m))
            .collect();
        Ok(StaticMapRequest::new(viewport, &self.options, overlay))
    }
}
