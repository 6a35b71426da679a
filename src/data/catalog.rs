//! CSV catalog of placemarks, one row per waterfall

use crate::{data::kml::Placemark, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    id: Option<String>,
    name: &'a str,
    latitude: f64,
    longitude: f64,
    wwd_url: Option<&'a str>,
}

/// Writes `id,name,latitude,longitude,wwd_url` rows with a header.
///
/// Ids are `id_prefix` plus the detail page number and stay empty when the
/// placemark has no usable link.
pub fn write_catalog<W: Write>(writer: W, placemarks: &[Placemark], id_prefix: &str) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for placemark in placemarks {
        writer.serialize(CatalogRow {
            id: placemark.wwdb_id(id_prefix),
            name: placemark.record.name(),
            latitude: placemark.record.latitude(),
            longitude: placemark.record.longitude(),
            wwd_url: placemark.href.as_deref(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
