//! Prelude module for common geolocator types
//!
//! This module re-exports the most commonly used types and functions
//! for easy importing with `use geolocator::prelude::*;`

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

pub use crate::{Error as MapError, Result};
