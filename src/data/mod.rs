pub mod catalog;
pub mod formats;
pub mod kml;
pub mod label;
pub mod parser;
pub mod record;
pub mod static_map;
