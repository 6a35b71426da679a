use crate::{
    core::{constants::DEFAULT_MARKER_SIZE, geo::LatLng},
    data::record::GeoRecord,
};
use serde::{Deserialize, Serialize};

/// RGB marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `RRGGBB`, without the leading `#`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parses `RRGGBB` or `#RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id: String,
    position: LatLng,
    popup_text: Option<String>,
    color: Color,
    size: u32,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        Self {
            id,
            position,
            popup_text: None,
            color: Color::default(),
            size: DEFAULT_MARKER_SIZE,
        }
    }

    /// A marker at the record's position, labelled with its name
    pub fn from_record(id: String, record: &GeoRecord) -> Self {
        Self::new(id, record.position()).with_popup(record.name().to_string())
    }

    pub fn with_popup(mut self, text: String) -> Self {
        self.popup_text = Some(text);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn popup_text(&self) -> Option<&str> {
        self.popup_text.as_deref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}
