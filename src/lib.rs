//! # geolocator
//!
//! Turns loosely formatted waterfall location exports into validated
//! geo-records and frames them on a web-Mercator map.
//!
//! The two pieces of real work are the record parser ([`data::parser`]) and
//! the viewport fitter ([`core::viewport`]). Everything else shapes records
//! into what the interactive and static map front ends consume.

pub mod core;
pub mod data;
pub mod layers;
pub mod prelude;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{FitOptions, StaticMapProfile},
    geo::{LatLng, LatLngBounds, Point},
    map::MapView,
    viewport::Viewport,
};

pub use crate::data::{
    catalog::write_catalog,
    formats::{MapMarker, MarkerEmitter, OverlayMarker},
    kml::{KmlOutcome, KmlReader, Placemark, SkippedPlacemark},
    label::{measure_label, LabelSize, LabelStyle},
    parser::{ParseOutcome, RecordParser, SkipReason, SkippedLine},
    record::{GeoRecord, RecordSet},
    static_map::StaticMapRequest,
};

pub use crate::layers::marker::{Color, Marker};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Marker error: {0}")]
    Marker(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("KML error: {0}")]
    Kml(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
