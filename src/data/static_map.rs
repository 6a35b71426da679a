//! Static map requests
//!
//! Everything a remote static-map renderer needs to produce one raster image:
//! the fitted viewport, the image size and the marker overlay. Fetching the
//! image is the caller's business.

use crate::{
    core::{config::FitOptions, geo::LatLng, viewport::Viewport},
    data::{
        formats::{MarkerEmitter, OverlayMarker},
        record::RecordSet,
    },
    MapError, Result,
};
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticMapRequest {
    pub viewport: Viewport,
    pub width: u32,
    pub height: u32,
    pub markers: Vec<OverlayMarker>,
}

impl StaticMapRequest {
    pub fn new(viewport: Viewport, options: &FitOptions, markers: Vec<OverlayMarker>) -> Self {
        Self {
            viewport,
            width: options.width,
            height: options.height,
            markers,
        }
    }

    /// Fits a viewport around every record and attaches their overlay
    pub fn from_records(
        records: &RecordSet,
        options: &FitOptions,
        emitter: &MarkerEmitter,
    ) -> Result<Self> {
        let viewport = Viewport::fit(&records.positions(), options)?;
        Ok(Self::new(viewport, options, emitter.overlay(records)))
    }

    /// Request URL in the `size` / `center` / `zoom` / `m` query dialect of
    /// hosted static-map endpoints. Each marker becomes one
    /// `m=lat,lon,,RRGGBB` parameter.
    pub fn to_url(&self, endpoint: &str, api_key: &str) -> Result<String> {
        let mut url = Url::parse(endpoint)
            .map_err(|e| MapError::Config(format!("invalid endpoint `{}`: {}", endpoint, e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api_key", api_key)
                .append_pair("size", &format!("{}x{}", self.width, self.height))
                .append_pair("center", &lat_lng_param(&self.viewport.center))
                .append_pair("zoom", &self.viewport.zoom.to_string());

            for marker in &self.markers {
                query.append_pair(
                    "m",
                    &format!("{},,{}", lat_lng_param(&marker.position), marker.color.hex()),
                );
            }
        }

        Ok(url.into())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn lat_lng_param(position: &LatLng) -> String {
    format!("{},{}", position.lat, position.lng)
}
