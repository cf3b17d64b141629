//! SODIR wellbore fetcher
//!
//! Pulls all wellbore features from the SODIR (Norwegian Offshore
//! Directorate) FactMaps FeatureServer using paginated OBJECTID queries,
//! then filters to the wells the map cares about: recently entered or not
//! yet entered, with usable geometry, and not written off as never to be
//! drilled.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{http_client, FetchError};
use crate::config::SodirConfig;
use crate::types::WellRecord;

/// Attribute fields requested from the FeatureServer.
const OUT_FIELDS: &str = "wlbWellboreName,wlbWell,wlbPurpose,wlbStatus,wlbEntryDate,\
                          wlbDrillingFacilityFixedOrMove,wlbDrillingFacility,\
                          wlbDrillingOperator,wlbWellType,wlbField,wlbFactPageUrl";

/// Statuses excluded from the map outright.
const EXCLUDED_STATUSES: &[&str] = &["WILL NEVER BE DRILLED"];

/// Placeholder for attributes the directorate left blank.
const UNKNOWN: &str = "UNKNOWN";

/// Client for the FactMaps wellbore layer.
pub struct SodirClient {
    http: reqwest::Client,
    query_url: String,
    page_size: usize,
    lookback_days: i64,
}

impl SodirClient {
    /// Build a client from endpoint configuration.
    pub fn new(config: &SodirConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: http_client()?,
            query_url: format!(
                "{}/{}/query",
                config.base_url.trim_end_matches('/'),
                config.layer_id
            ),
            page_size: config.page_size.max(1),
            lookback_days: config.lookback_days,
        })
    }

    /// Fetch, filter, and normalize the full wells dataset.
    pub async fn fetch_wells(&self, now: DateTime<Utc>) -> Result<Vec<WellRecord>, FetchError> {
        let object_ids = self.fetch_object_ids().await?;
        info!(wellbores = object_ids.len(), "fetched SODIR OBJECTIDs");

        let features = self.fetch_features(&object_ids).await?;
        info!(features = features.len(), "fetched SODIR features");

        let cutoff = now.date_naive() - Duration::days(self.lookback_days);
        let wells = filter_features(features, cutoff);
        info!(wells = wells.len(), "wells kept after filtering");

        Ok(wells)
    }

    /// All OBJECTIDs in the layer, sorted ascending.
    async fn fetch_object_ids(&self) -> Result<Vec<i64>, FetchError> {
        let resp = self
            .http
            .get(&self.query_url)
            .query(&[("where", "1=1"), ("returnIdsOnly", "true"), ("f", "json")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let body: ObjectIdsResponse = resp.json().await?;
        let mut ids = body.object_ids;
        ids.sort_unstable();
        Ok(ids)
    }

    /// All features for the given OBJECTIDs, fetched in contiguous-range
    /// pages.
    async fn fetch_features(&self, object_ids: &[i64]) -> Result<Vec<Feature>, FetchError> {
        let mut features = Vec::with_capacity(object_ids.len());

        for batch in object_ids.chunks(self.page_size) {
            let (Some(first), Some(last)) = (batch.first(), batch.last()) else {
                continue;
            };
            let where_clause = format!("OBJECTID >= {first} AND OBJECTID <= {last}");

            let resp = self
                .http
                .get(&self.query_url)
                .query(&[
                    ("where", where_clause.as_str()),
                    ("outFields", OUT_FIELDS),
                    ("outSR", "4326"),
                    ("f", "json"),
                ])
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status()));
            }

            let page: FeatureQueryResponse = resp.json().await?;
            debug!(
                fetched = page.features.len(),
                progress = features.len() + page.features.len(),
                total = object_ids.len(),
                "fetched feature page"
            );
            features.extend(page.features);
        }

        Ok(features)
    }
}

// ============================================================================
// Wire Shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct ObjectIdsResponse {
    #[serde(rename = "objectIds", default)]
    object_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeatureQueryResponse {
    #[serde(default)]
    pub(crate) features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub(crate) attributes: WellboreAttributes,
    #[serde(default)]
    pub(crate) geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Geometry {
    #[serde(default)]
    pub(crate) x: Option<f64>,
    #[serde(default)]
    pub(crate) y: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WellboreAttributes {
    #[serde(rename = "wlbWellboreName")]
    pub(crate) wellbore_name: Option<String>,
    #[serde(rename = "wlbWell")]
    pub(crate) well: Option<String>,
    #[serde(rename = "wlbStatus")]
    pub(crate) status: Option<String>,
    /// Raw entry date: ESRI epoch milliseconds, `YYYYMMDD` integer, or an
    /// ISO-like string, depending on the layer version.
    #[serde(rename = "wlbEntryDate")]
    pub(crate) entry_date: serde_json::Value,
    #[serde(rename = "wlbDrillingFacility")]
    pub(crate) drilling_facility: Option<String>,
    #[serde(rename = "wlbDrillingFacilityFixedOrMove")]
    pub(crate) facility_kind: Option<String>,
    #[serde(rename = "wlbDrillingOperator")]
    pub(crate) operator: Option<String>,
    #[serde(rename = "wlbWellType")]
    pub(crate) well_type: Option<String>,
    #[serde(rename = "wlbField")]
    pub(crate) field: Option<String>,
    #[serde(rename = "wlbFactPageUrl")]
    pub(crate) fact_page_url: Option<String>,
}

// ============================================================================
// Entry Date Parsing
// ============================================================================

/// Integers above this are ESRI timestamps (milliseconds since epoch);
/// below, `YYYYMMDD` date literals.
const ESRI_TIMESTAMP_FLOOR: i64 = 10_000_000_000;

/// Parse the raw entry date into a calendar date. Missing, zero, and
/// unparseable values all mean "not entered".
pub(crate) fn parse_entry_date(raw: &serde_json::Value) -> Option<NaiveDate> {
    match raw {
        serde_json::Value::Number(n) => {
            let value = n.as_i64()?;
            if value == 0 {
                return None;
            }
            if value > ESRI_TIMESTAMP_FLOOR {
                return DateTime::from_timestamp_millis(value).map(|dt| dt.date_naive());
            }
            NaiveDate::parse_from_str(&value.to_string(), "%Y%m%d").ok()
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            let head = trimmed.get(..10).unwrap_or(trimmed);
            NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

/// Keep wells that are not yet entered or were entered after the cutoff.
fn is_recent_or_unentered(entry_date: Option<NaiveDate>, cutoff: NaiveDate) -> bool {
    entry_date.is_none_or(|date| date >= cutoff)
}

/// Apply the business rules and normalize features into well records.
pub(crate) fn filter_features(features: Vec<Feature>, cutoff: NaiveDate) -> Vec<WellRecord> {
    let mut wells = Vec::new();

    for feature in features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let (Some(x), Some(y)) = (geometry.x, geometry.y) else {
            continue;
        };

        let attrs = feature.attributes;
        let status = attrs.status.as_deref().unwrap_or_default().to_uppercase();
        if EXCLUDED_STATUSES.contains(&status.as_str()) {
            continue;
        }

        let entry_date = parse_entry_date(&attrs.entry_date);
        if !is_recent_or_unentered(entry_date, cutoff) {
            continue;
        }

        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

        wells.push(WellRecord {
            wellbore_name: attrs.wellbore_name.unwrap_or_default(),
            well: attrs.well,
            status: Some(status),
            entry_date: Some(
                entry_date.map_or_else(String::new, |date| date.format("%Y-%m-%d").to_string()),
            ),
            rig_name: Some(or_unknown(attrs.drilling_facility)),
            rig_type: Some(or_unknown(attrs.facility_kind)),
            operator: Some(or_unknown(attrs.operator)),
            well_type: Some(or_unknown(attrs.well_type)),
            field: Some(or_unknown(attrs.field)),
            fact_page_url: attrs.fact_page_url,
            lat: Some(y),
            lon: Some(x),
        });
    }

    wells
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 21).expect("valid date")
    }

    fn make_feature(name: &str, entry: serde_json::Value, geometry: bool) -> Feature {
        Feature {
            attributes: WellboreAttributes {
                wellbore_name: Some(name.to_string()),
                entry_date: entry,
                status: Some("DRILLING".to_string()),
                ..WellboreAttributes::default()
            },
            geometry: geometry.then_some(Geometry {
                x: Some(3.0),
                y: Some(60.0),
            }),
        }
    }

    #[test]
    fn test_parse_entry_date_esri_milliseconds() {
        // 2025-05-01T00:00:00Z in epoch milliseconds
        let date = parse_entry_date(&json!(1_746_057_600_000_i64)).expect("parsed");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"));
    }

    #[test]
    fn test_parse_entry_date_yyyymmdd_integer() {
        let date = parse_entry_date(&json!(20_250_501)).expect("parsed");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"));
    }

    #[test]
    fn test_parse_entry_date_iso_string_with_time_suffix() {
        let date = parse_entry_date(&json!("2025-05-01T12:30:00")).expect("parsed");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"));
    }

    #[test]
    fn test_parse_entry_date_garbage_is_none() {
        assert_eq!(parse_entry_date(&json!(null)), None);
        assert_eq!(parse_entry_date(&json!(0)), None);
        assert_eq!(parse_entry_date(&json!("")), None);
        assert_eq!(parse_entry_date(&json!("next spring")), None);
        assert_eq!(parse_entry_date(&json!(true)), None);
    }

    #[test]
    fn test_filter_drops_features_without_geometry() {
        let wells = filter_features(
            vec![
                make_feature("W1", json!("2025-05-01"), true),
                make_feature("W2", json!("2025-05-01"), false),
            ],
            cutoff(),
        );
        assert_eq!(wells.len(), 1);
        assert_eq!(wells[0].wellbore_name, "W1");
        assert_eq!(wells[0].lat, Some(60.0));
        assert_eq!(wells[0].lon, Some(3.0));
    }

    #[test]
    fn test_filter_drops_never_to_be_drilled() {
        let mut feature = make_feature("W1", json!(null), true);
        feature.attributes.status = Some("Will Never Be Drilled".to_string());
        assert!(filter_features(vec![feature], cutoff()).is_empty());
    }

    #[test]
    fn test_filter_keeps_unentered_and_recent_only() {
        let wells = filter_features(
            vec![
                make_feature("UNENTERED", json!(null), true),
                make_feature("RECENT", json!("2025-05-01"), true),
                make_feature("STALE", json!("2024-01-01"), true),
            ],
            cutoff(),
        );
        let names: Vec<&str> = wells.iter().map(|w| w.wellbore_name.as_str()).collect();
        assert_eq!(names, vec!["UNENTERED", "RECENT"]);
        // Unentered wells carry an empty entry date downstream.
        assert_eq!(wells[0].entry_date.as_deref(), Some(""));
        assert_eq!(wells[1].entry_date.as_deref(), Some("2025-05-01"));
    }

    #[tokio::test]
    async fn test_fetch_features_empty_input_makes_no_requests() {
        let client = SodirClient::new(&crate::config::SodirConfig::default()).expect("client");
        let features = client.fetch_features(&[]).await.expect("nothing to fetch");
        assert!(features.is_empty());
    }

    #[test]
    fn test_filter_normalizes_blank_attributes_to_unknown() {
        let wells = filter_features(vec![make_feature("W1", json!(null), true)], cutoff());
        assert_eq!(wells[0].operator.as_deref(), Some("UNKNOWN"));
        assert_eq!(wells[0].rig_name.as_deref(), Some("UNKNOWN"));
        assert_eq!(wells[0].field.as_deref(), Some("UNKNOWN"));
    }
}
