use crate::core::constants::MAX_LATITUDE;
use geo::BoundingRect;
use geo_types::{Coord, MultiPoint};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Clamps latitude to the range the Mercator projection can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857), in meters.
    /// Latitude is clamped first so the poles stay finite.
    pub fn to_mercator(&self) -> Point {
        let lat = Self::clamp_lat(self.lat);
        let x = self.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }

    /// Projects to world pixel coordinates of a tile pyramid at `zoom`.
    ///
    /// The world is `tile_size * 2^zoom` pixels wide, with the origin at the
    /// north-west corner and y growing southwards.
    pub fn to_world_pixel(&self, zoom: f64, tile_size: u32) -> Point {
        let world = f64::from(tile_size) * 2_f64.powf(zoom);
        let mercator = self.to_mercator();
        let half = PI * EARTH_RADIUS;

        Point::new(
            (mercator.x + half) / (2.0 * half) * world,
            (half - mercator.y) / (2.0 * half) * world,
        )
    }

    /// Inverse of [`LatLng::to_world_pixel`]
    pub fn from_world_pixel(pixel: &Point, zoom: f64, tile_size: u32) -> Self {
        let world = f64::from(tile_size) * 2_f64.powf(zoom);
        let half = PI * EARTH_RADIUS;
        let x = pixel.x / world * (2.0 * half) - half;
        let y = half - pixel.y / world * (2.0 * half);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(value: LatLng) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(value: Coord<f64>) -> Self {
        LatLng::new(value.y, value.x)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn abs(&self) -> Point {
        Point::new(self.x.abs(), self.y.abs())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis-aligned latitude/longitude envelope of a point set.
///
/// Always derived from points on demand; nothing stores one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Smallest bounds containing every point, `None` for an empty set
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let multi: MultiPoint<f64> = points
            .into_iter()
            .map(|p| geo_types::Point::from(*p))
            .collect::<Vec<_>>()
            .into();

        multi
            .bounding_rect()
            .map(|rect| Self::new(rect.min().into(), rect.max().into()))
    }

    pub fn min_lat(&self) -> f64 {
        self.south_west.lat
    }

    pub fn max_lat(&self) -> f64 {
        self.north_east.lat
    }

    pub fn min_lng(&self) -> f64 {
        self.south_west.lng
    }

    pub fn max_lng(&self) -> f64 {
        self.north_east.lng
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Midpoint of min/max per axis, in degrees
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }

    /// True when the box has no extent on either axis (a single location)
    pub fn is_degenerate(&self) -> bool {
        let span = self.span();
        span.lat == 0.0 && span.lng == 0.0
    }

    /// North-west corner, the projected origin of the box
    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    /// South-east corner
    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }
}
