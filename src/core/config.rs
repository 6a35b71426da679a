//! Configuration for viewport fitting
//!
//! Static map requests are parameterised by image size, padding margin, zoom
//! range and tile size. Common combinations are available as presets, and
//! every field can be loaded from JSON with per-field defaults.

use crate::{
    core::constants::{
        DEFAULT_IMAGE_SIZE, DEFAULT_MARGIN, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, TILE_SIZE,
    },
    MapError, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StaticMapProfile {
    Thumbnail,
    #[default]
    Standard,
    Poster,
    Custom(FitOptions),
}

impl StaticMapProfile {
    pub fn resolve(&self) -> FitOptions {
        match self {
            Self::Thumbnail => FitOptions {
                width: 300,
                height: 200,
                margin: 0.15,
                max_zoom: 16,
                ..FitOptions::default()
            },
            Self::Standard => FitOptions::default(),
            Self::Poster => FitOptions {
                width: 2400,
                height: 1600,
                margin: 0.05,
                ..FitOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }

    /// Looks up a preset by its command-line name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "thumbnail" => Some(Self::Thumbnail),
            "standard" => Some(Self::Standard),
            "poster" => Some(Self::Poster),
            _ => None,
        }
    }
}

/// Parameters of a single viewport fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Fraction of the projected span added as padding (0.1 = 10%)
    pub margin: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Edge length of one pyramid tile in pixels
    pub tile_size: u32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_SIZE.0,
            height: DEFAULT_IMAGE_SIZE.1,
            margin: DEFAULT_MARGIN,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            tile_size: TILE_SIZE,
        }
    }
}

impl FitOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Parses options from JSON, filling absent fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: FitOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::Config(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.tile_size == 0 {
            return Err(MapError::Config("tile size must be positive".to_string()));
        }
        if self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "min zoom {} is above max zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        // 2^zoom must stay exact in an f64 mantissa
        if self.max_zoom > 30 {
            return Err(MapError::Config(format!(
                "max zoom {} is beyond the supported pyramid depth of 30",
                self.max_zoom
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(MapError::Config(format!(
                "margin must be a non-negative fraction, got {}",
                self.margin
            )));
        }
        Ok(())
    }

    /// Image size available to the markers' span once the margin is reserved
    pub fn padded_size(&self) -> (f64, f64) {
        let scale = 1.0 + self.margin;
        (
            f64::from(self.width) / scale,
            f64::from(self.height) / scale,
        )
    }
}
