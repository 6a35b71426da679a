use crate::{
    core::{
        config::FitOptions,
        geo::{LatLng, LatLngBounds, Point},
    },
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Zoom level at which corners are projected before scaling to trial zooms
const REFERENCE_ZOOM: f64 = 0.0;

/// A center coordinate and a discrete zoom level of the tile pyramid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// Integer zoom level of the tile pyramid
    pub zoom: u8,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// Fits a viewport around `points`.
    ///
    /// Picks the largest zoom in `[min_zoom, max_zoom]` at which the points'
    /// bounding box, padded by the margin, fits the output image. The center
    /// is the latitude/longitude midpoint of the box.
    ///
    /// Fails with [`MapError::EmptyDataset`] when `points` is empty and with
    /// [`MapError::Config`] when the options are invalid.
    pub fn fit<'a, I>(points: I, options: &FitOptions) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        options.validate()?;

        let bounds = LatLngBounds::from_points(points)
            .ok_or_else(|| MapError::EmptyDataset("no points to fit a viewport to".to_string()))?;

        Ok(Self::fit_bounds(&bounds, options))
    }

    /// Fits a viewport to contain the given bounds.
    ///
    /// `options` are expected to be valid; see [`FitOptions::validate`].
    pub fn fit_bounds(bounds: &LatLngBounds, options: &FitOptions) -> Self {
        let center = bounds.center();

        if bounds.span().lng > 180.0 {
            // Antimeridian crossings are unsupported; treat the box as-is.
            log::debug!(
                "longitude span {:.3} exceeds 180 degrees, assuming no antimeridian crossing",
                bounds.span().lng
            );
        }

        if bounds.is_degenerate() {
            log::debug!(
                "single location at ({:.5}, {:.5}), using max zoom {}",
                center.lat,
                center.lng,
                options.max_zoom
            );
            return Self::new(center, options.max_zoom);
        }

        let zoom = (options.min_zoom..=options.max_zoom)
            .rev()
            .find(|&zoom| Self::fits(bounds, zoom, options))
            .unwrap_or_else(|| {
                log::debug!(
                    "bounds do not fit {}x{} even at zoom {}, clamping",
                    options.width,
                    options.height,
                    options.min_zoom
                );
                options.min_zoom
            });

        log::debug!(
            "fitted ({:.5}, {:.5}) zoom {} for {}x{} image",
            center.lat,
            center.lng,
            zoom,
            options.width,
            options.height
        );

        Self::new(center, zoom)
    }

    /// Pixel width and height spanned by `bounds` at `zoom`
    pub fn projected_span(bounds: &LatLngBounds, zoom: u8, tile_size: u32) -> Point {
        let nw = bounds.north_west().to_world_pixel(REFERENCE_ZOOM, tile_size);
        let se = bounds.south_east().to_world_pixel(REFERENCE_ZOOM, tile_size);

        se.subtract(&nw)
            .abs()
            .multiply(2_f64.powf(f64::from(zoom) - REFERENCE_ZOOM))
    }

    /// Whether `bounds`, padded by the margin, fits the image at `zoom`
    pub fn fits(bounds: &LatLngBounds, zoom: u8, options: &FitOptions) -> bool {
        let span = Self::projected_span(bounds, zoom, options.tile_size);
        let (width, height) = options.padded_size();
        span.x <= width && span.y <= height
    }

    /// Geographic area covered by an image of `width` x `height` pixels
    /// centered on this viewport
    pub fn visible_bounds(&self, width: u32, height: u32, tile_size: u32) -> LatLngBounds {
        let zoom = f64::from(self.zoom);
        let center = self.center.to_world_pixel(zoom, tile_size);
        let half = Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0);

        let nw = LatLng::from_world_pixel(&center.subtract(&half), zoom, tile_size);
        let se = LatLng::from_world_pixel(&center.subtract(&half.multiply(-1.0)), zoom, tile_size);

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0)
    }
}
