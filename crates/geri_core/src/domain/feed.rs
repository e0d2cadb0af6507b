use serde::{Deserialize, Serialize};

use super::{defaults, Event};

/// One (date, country, category) observation from the daily metrics table.
///
/// `date` is a zero-padded `YYYY-MM-DD` string, so lexical order is calendar order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    pub date: String,
    pub country: String,
    pub category: String,
    #[serde(default)]
    pub event_count: Option<i64>,
    #[serde(default)]
    pub avg_tone: Option<f64>,
    #[serde(default)]
    pub rolling_center: Option<f64>,
    #[serde(default)]
    pub rolling_dispersion: Option<f64>,
    #[serde(default)]
    pub baseline_quality: Option<String>,
    #[serde(default)]
    pub baseline_method: Option<String>,
    #[serde(default)]
    pub z_score: Option<f64>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub reasons_json: Option<String>,
    #[serde(default)]
    pub computed_at: Option<String>,
    #[serde(default)]
    pub pipeline_version: Option<String>,
}

impl MetricRow {
    /// Minimal row carrying only the fields the transforms read.
    pub fn new(
        date: impl Into<String>,
        country: impl Into<String>,
        category: impl Into<String>,
        event_count: Option<i64>,
        risk_score: Option<f64>,
    ) -> Self {
        Self {
            date: date.into(),
            country: country.into(),
            category: category.into(),
            event_count,
            avg_tone: None,
            rolling_center: None,
            rolling_dispersion: None,
            baseline_quality: None,
            baseline_method: None,
            z_score: None,
            risk_score,
            reasons_json: None,
            computed_at: None,
            pipeline_version: None,
        }
    }

    pub fn with_z_score(mut self, z: f64) -> Self {
        self.z_score = Some(z);
        self
    }

    pub fn risk_or_default(&self) -> f64 {
        self.risk_score.unwrap_or(defaults::RISK_SCORE)
    }

    pub fn events_or_default(&self) -> i64 {
        self.event_count.unwrap_or(defaults::EVENT_COUNT)
    }

    pub fn z_or_default(&self) -> f64 {
        self.z_score.unwrap_or(defaults::Z_SCORE)
    }
}

/// Externally flagged anomalous deviation for a (date, country, category).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spike {
    pub id: i64,
    pub date: String,
    pub country: String,
    pub category: String,
    pub z_score: f64,
    #[serde(default)]
    pub z_used: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub rolling_center: Option<f64>,
    #[serde(default)]
    pub rolling_dispersion: Option<f64>,
    #[serde(default)]
    pub baseline_quality: Option<String>,
    #[serde(default)]
    pub baseline_method: Option<String>,
    #[serde(default)]
    pub evidence_event_ids: Option<String>,
    #[serde(default)]
    pub computed_at: Option<String>,
    #[serde(default)]
    pub pipeline_version: Option<String>,
}

impl Spike {
    /// The z-value shown to analysts: the robust `z_used` when present, else the raw `z_score`.
    pub fn display_z(&self) -> f64 {
        self.z_used.unwrap_or(self.z_score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BriefMover {
    pub date: String,
    pub country: String,
    pub category: String,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub event_count: Option<i64>,
    #[serde(default)]
    pub z_score: Option<f64>,
}

impl BriefMover {
    pub fn risk_or_default(&self) -> f64 {
        self.risk_score.unwrap_or(defaults::RISK_SCORE)
    }

    pub fn events_or_default(&self) -> i64 {
        self.event_count.unwrap_or(defaults::EVENT_COUNT)
    }

    pub fn z_or_default(&self) -> f64 {
        self.z_score.unwrap_or(defaults::Z_SCORE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BriefSpike {
    pub date: String,
    pub country: String,
    pub category: String,
    #[serde(default)]
    pub z_score: Option<f64>,
    #[serde(default)]
    pub z_used: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
}

/// Daily intel brief: top movers and spikes with a short prose summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BriefResponse {
    pub top_movers: Vec<BriefMover>,
    pub top_spikes: Vec<BriefSpike>,
    pub summary: String,
}

/// Raw evidence row backing the metrics (one ingested GDELT event).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceEvent {
    pub id: String,
    pub ts: String,
    pub date: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub event_code: Option<String>,
    #[serde(default)]
    pub quad_class: Option<i64>,
    #[serde(default)]
    pub avg_tone: Option<f64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Per-country marker data for the map layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapCountry {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub severity_index: Option<f64>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub event_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedEventsResponse {
    pub events: Vec<Event>,
    pub count: i64,
    #[serde(default)]
    pub sources: std::collections::BTreeMap<String, i64>,
}
