//! Placemark reader for WWDB KML exports
//!
//! A state export is a KML document with one `Placemark` per waterfall: a
//! `name`, a `description` holding a link to the detail page, and a
//! `Point/coordinates` element in `lng,lat[,alt]` order. Placemarks that do
//! not yield a valid record are skipped and reported, never fatal.

use crate::{
    data::{
        parser::{parse_decimal, SkipReason},
        record::{GeoRecord, RecordSet},
    },
    MapError, Result,
};
use once_cell::sync::Lazy;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use regex::Regex;
use serde::Serialize;
use std::{fmt::Display, io::BufRead};
use url::Url;

/// Trailing numeric id of a WWDB detail page URL
static DETAIL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/-](\d+)$").expect("detail id pattern is valid"));

/// Leading `lng,lat` pair of a coordinates element
static TUPLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<lng>[^,\s]+)\s*,\s*(?P<lat>[^,\s]+)").expect("tuple pattern is valid")
});

/// First `href` in description markup carried as text or CDATA
static HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("href pattern is valid"));

/// A waterfall read from a placemark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placemark {
    pub record: GeoRecord,
    /// Detail page URL, absolute when the reader has a base URL
    pub href: Option<String>,
}

impl Placemark {
    /// Catalog id such as `CA-4940`: `prefix` plus the numeric suffix of the
    /// detail URL
    pub fn wwdb_id(&self, prefix: &str) -> Option<String> {
        let href = self.href.as_deref()?;
        let caps = DETAIL_ID_PATTERN.captures(href)?;
        Some(format!("{}-{}", prefix, &caps[1]))
    }
}

/// A placemark that did not become a record
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPlacemark {
    /// 1-based position among the document's placemarks
    pub index: usize,
    pub name: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlOutcome {
    pub placemarks: Vec<Placemark>,
    pub skipped: Vec<SkippedPlacemark>,
}

impl KmlOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Records in document order
    pub fn records(&self) -> RecordSet {
        self.placemarks.iter().map(|p| p.record.clone()).collect()
    }
}

#[derive(Debug, Default)]
struct PendingPlacemark {
    name: String,
    coordinates: String,
    description: String,
    href: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct KmlReader {
    base_url: Option<Url>,
}

impl KmlReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative detail links against `base`, usually the URL the
    /// document was downloaded from
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    pub fn read(&self, xml: &str) -> Result<KmlOutcome> {
        self.read_from(xml.as_bytes())
    }

    /// Reads a whole document.
    ///
    /// Fails with [`MapError::Kml`] on broken XML and with
    /// [`MapError::EmptyDataset`] when no placemark yields a record.
    pub fn read_from<R: BufRead>(&self, source: R) -> Result<KmlOutcome> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);

        let mut outcome = KmlOutcome::default();
        let mut buf = Vec::new();
        // Local names of the open elements
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut pending: Option<PendingPlacemark> = None;
        let mut index = 0;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| kml_error(reader.buffer_position(), e))?;

            match event {
                Event::Start(start) => {
                    let local = start.local_name().as_ref().to_vec();
                    if local == b"Placemark" {
                        pending = Some(PendingPlacemark::default());
                    } else if let Some(placemark) = pending.as_mut() {
                        self.capture_link(placemark, &path, &local, &start)?;
                    }
                    path.push(local);
                }
                Event::Empty(start) => {
                    if let Some(placemark) = pending.as_mut() {
                        let local = start.local_name().as_ref().to_vec();
                        self.capture_link(placemark, &path, &local, &start)?;
                    }
                }
                Event::Text(text) => {
                    if let Some(placemark) = pending.as_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| kml_error(reader.buffer_position(), e))?;
                        capture_text(placemark, &path, &text);
                    }
                }
                Event::CData(data) => {
                    if let Some(placemark) = pending.as_mut() {
                        capture_text(placemark, &path, &String::from_utf8_lossy(&data));
                    }
                }
                Event::End(end) => {
                    path.pop();
                    if end.local_name().as_ref() == b"Placemark" {
                        if let Some(placemark) = pending.take() {
                            index += 1;
                            self.finish(placemark, index, &mut outcome);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if outcome.placemarks.is_empty() {
            return Err(MapError::EmptyDataset(format!(
                "no valid placemarks ({} skipped)",
                outcome.skipped_count()
            )));
        }

        log::info!(
            "read {} placemarks, skipped {}",
            outcome.placemarks.len(),
            outcome.skipped_count()
        );
        Ok(outcome)
    }

    /// Takes the first `<a href>` inside the description
    fn capture_link(
        &self,
        placemark: &mut PendingPlacemark,
        path: &[Vec<u8>],
        local: &[u8],
        start: &BytesStart<'_>,
    ) -> Result<()> {
        if local != b"a" || placemark.href.is_some() || !within(path, b"description") {
            return Ok(());
        }

        let href = start
            .try_get_attribute("href")
            .map_err(|e| MapError::Kml(format!("bad attribute on <a>: {}", e)))?;
        if let Some(href) = href {
            let value = href
                .unescape_value()
                .map_err(|e| MapError::Kml(format!("bad href: {}", e)))?;
            placemark.href = Some(self.resolve(value.trim()));
        }
        Ok(())
    }

    fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) if Url::parse(href).is_err() => base
                .join(href)
                .map(String::from)
                .unwrap_or_else(|_| href.to_string()),
            _ => href.to_string(),
        }
    }

    fn finish(&self, placemark: PendingPlacemark, index: usize, outcome: &mut KmlOutcome) {
        let href = placemark.href.clone().or_else(|| {
            HREF_PATTERN
                .captures(&placemark.description)
                .map(|caps| self.resolve(caps[1].trim()))
        });
        let name = placemark.name.trim().to_string();

        match build_record(&name, &placemark.coordinates) {
            Ok(record) => outcome.placemarks.push(Placemark { record, href }),
            Err(reason) => {
                log::warn!("skipping placemark {}: {}", index, reason);
                outcome.skipped.push(SkippedPlacemark {
                    index,
                    name: (!name.is_empty()).then_some(name),
                    reason,
                });
            }
        }
    }
}

fn kml_error(position: usize, error: impl Display) -> MapError {
    MapError::Kml(format!("at byte {}: {}", position, error))
}

fn within(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.iter().any(|element| element == name)
}

fn capture_text(placemark: &mut PendingPlacemark, path: &[Vec<u8>], text: &str) {
    let parent = path.len().checked_sub(2).map(|i| path[i].as_slice());
    match (parent, path.last().map(Vec::as_slice)) {
        (Some(b"Placemark"), Some(b"name")) => placemark.name.push_str(text),
        (Some(b"Point"), Some(b"coordinates")) => placemark.coordinates.push_str(text),
        _ if within(path, b"description") => placemark.description.push_str(text),
        _ => {}
    }
}

/// KML writes `lng,lat[,alt]`; only the first tuple is used
fn build_record(name: &str, coordinates: &str) -> std::result::Result<GeoRecord, SkipReason> {
    if name.is_empty() {
        return Err(SkipReason::MissingField("name"));
    }
    if coordinates.trim().is_empty() {
        return Err(SkipReason::MissingField("coordinates"));
    }
    let caps = TUPLE_PATTERN
        .captures(coordinates)
        .ok_or(SkipReason::MissingField("latitude"))?;

    let longitude = parse_decimal(&caps["lng"], "longitude")?;
    let latitude = parse_decimal(&caps["lat"], "latitude")?;

    GeoRecord::new(name, latitude, longitude).map_err(|_| SkipReason::CoordinateOutOfRange {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    const STATE_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>California</name>
    <Placemark>
      <name>Cataract Falls</name>
      <description><div><a href="/waterfall/Cataract-Falls-4940">Details</a></div></description>
      <Point><coordinates>-122.63520,37.93132,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Carson Falls &amp; Pools</name>
      <description><![CDATA[<p><a href="https://www.worldwaterfalldatabase.com/waterfall/Carson-Falls-4941">Details</a></p>]]></description>
      <Point><coordinates> -122.6347 , 37.9767 </coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Nowhere Falls</name>
      <Point><coordinates>-122.6,97.0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name>Unmapped Falls</name>
    </Placemark>
  </Document>
</kml>"#;

    fn read(xml: &str) -> KmlOutcome {
        let base = Url::parse("https://www.worldwaterfalldatabase.com/api/United-States/California/getKML")
            .unwrap();
        KmlReader::new().with_base_url(base).read(xml).unwrap()
    }

    #[test]
    fn test_placemarks_swap_lng_lat() {
        let outcome = read(STATE_EXPORT);
        let records = outcome.records();
        let names: Vec<&str> = records.iter().map(GeoRecord::name).collect();
        assert_eq!(names, ["Cataract Falls", "Carson Falls & Pools"]);
        assert_eq!(
            records.as_slice()[0].position(),
            LatLng::new(37.93132, -122.6352)
        );
        assert_eq!(
            records.as_slice()[1].position(),
            LatLng::new(37.9767, -122.6347)
        );
    }

    #[test]
    fn test_links_are_resolved() {
        let outcome = read(STATE_EXPORT);
        assert_eq!(
            outcome.placemarks[0].href.as_deref(),
            Some("https://www.worldwaterfalldatabase.com/waterfall/Cataract-Falls-4940")
        );
        // CDATA description
        assert_eq!(
            outcome.placemarks[1].href.as_deref(),
            Some("https://www.worldwaterfalldatabase.com/waterfall/Carson-Falls-4941")
        );
        assert_eq!(outcome.placemarks[0].wwdb_id("CA").as_deref(), Some("CA-4940"));
    }

    #[test]
    fn test_bad_placemarks_are_counted() {
        let outcome = read(STATE_EXPORT);
        assert_eq!(outcome.skipped_count(), 2);
        assert_eq!(
            outcome.skipped[0],
            SkippedPlacemark {
                index: 3,
                name: Some("Nowhere Falls".to_string()),
                reason: SkipReason::CoordinateOutOfRange {
                    latitude: 97.0,
                    longitude: -122.6
                },
            }
        );
        assert_eq!(outcome.skipped[1].index, 4);
        assert_eq!(
            outcome.skipped[1].reason,
            SkipReason::MissingField("coordinates")
        );
    }

    #[test]
    fn test_unnamed_and_unparseable_placemarks() {
        let outcome = KmlReader::new()
            .read(
                "<kml><Placemark><Point><coordinates>1,2</coordinates></Point></Placemark>\
                 <Placemark><name>Bad Falls</name><Point><coordinates>west,2</coordinates></Point></Placemark>\
                 <Placemark><name>Good Falls</name><Point><coordinates>1,2</coordinates></Point></Placemark></kml>",
            )
            .unwrap();
        assert_eq!(outcome.placemarks.len(), 1);
        assert!(outcome.placemarks[0].href.is_none());
        assert_eq!(outcome.skipped[0].reason, SkipReason::MissingField("name"));
        assert_eq!(outcome.skipped[0].name, None);
        assert_eq!(
            outcome.skipped[1].reason,
            SkipReason::InvalidNumber {
                field: "longitude",
                value: "west".to_string()
            }
        );
    }

    #[test]
    fn test_namespace_prefixes_are_ignored() {
        let outcome = KmlReader::new()
            .read(
                r#"<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2"><kml:Placemark>
                   <kml:name>Prefixed Falls</kml:name>
                   <kml:Point><kml:coordinates>-121.5,45.5</kml:coordinates></kml:Point>
                   </kml:Placemark></kml:kml>"#,
            )
            .unwrap();
        assert_eq!(outcome.placemarks[0].record.name(), "Prefixed Falls");
    }

    #[test]
    fn test_relative_link_without_base_is_kept() {
        let outcome = KmlReader::new()
            .read(
                r#"<kml><Placemark><name>Falls</name>
                   <description><a href="/waterfall/Falls-12"/></description>
                   <Point><coordinates>1,2</coordinates></Point></Placemark></kml>"#,
            )
            .unwrap();
        assert_eq!(outcome.placemarks[0].href.as_deref(), Some("/waterfall/Falls-12"));
        assert_eq!(outcome.placemarks[0].wwdb_id("OR").as_deref(), Some("OR-12"));
    }

    #[test]
    fn test_no_placemarks_is_empty_dataset() {
        let result = KmlReader::new().read("<kml><Document/></kml>");
        assert!(matches!(result, Err(MapError::EmptyDataset(_))));
    }

    #[test]
    fn test_broken_xml_fails() {
        let result = KmlReader::new().read("<kml><Placemark><name>Falls</Placemark></kml>");
        assert!(matches!(result, Err(MapError::Kml(_))));
    }
}
