//! Core constants shared by the projection, the fitter and the emitters.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude limit of the spherical web-Mercator projection.
/// Beyond it projected y runs off to infinity.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Zoom range used when nothing else is configured.
pub const DEFAULT_MIN_ZOOM: u8 = 0;
pub const DEFAULT_MAX_ZOOM: u8 = 20;

/// Fraction of the image reserved as padding around the fitted markers.
pub const DEFAULT_MARGIN: f64 = 0.1;

/// Static image size used when nothing else is configured.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (800, 500);

/// Marker diameter in pixels for static overlays.
pub const DEFAULT_MARKER_SIZE: u32 = 12;

/// Label font size in pixels.
pub const DEFAULT_LABEL_FONT_SIZE: f64 = 12.0;
