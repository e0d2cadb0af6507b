use serde::{Deserialize, Serialize};

mod feed;

pub use feed::{
    BriefMover, BriefResponse, BriefSpike, CombinedEventsResponse, EvidenceEvent, MapCountry,
    MetricRow, Spike,
};

/// Declared defaults for nullable feed fields.
///
/// Every transform reads optional values through the accessors on the domain types, which
/// resolve against this table. Call sites never coalesce on their own.
pub mod defaults {
    /// `risk_score` when the source did not compute one.
    pub const RISK_SCORE: f64 = 0.0;
    /// `event_count` when the source omitted it.
    pub const EVENT_COUNT: i64 = 0;
    /// `z_score` when no baseline was available to compute one.
    pub const Z_SCORE: f64 = 0.0;
    /// Sort priority of threat levels outside the known five.
    pub const UNKNOWN_THREAT_PRIORITY: u8 = 5;
}

/// Ordered severity of an event. Declaration order is severity order (most severe first).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
    /// Any label the feed sends that is not one of the five known levels.
    #[serde(other)]
    Unknown,
}

impl ThreatLevel {
    pub const KNOWN: [ThreatLevel; 5] = [
        ThreatLevel::Critical,
        ThreatLevel::High,
        ThreatLevel::Medium,
        ThreatLevel::Low,
        ThreatLevel::Info,
    ];

    /// Sort priority: critical first, unrecognized last.
    pub fn priority(self) -> u8 {
        match self {
            ThreatLevel::Critical => 0,
            ThreatLevel::High => 1,
            ThreatLevel::Medium => 2,
            ThreatLevel::Low => 3,
            ThreatLevel::Info => 4,
            ThreatLevel::Unknown => defaults::UNKNOWN_THREAT_PRIORITY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Critical => "critical",
            ThreatLevel::High => "high",
            ThreatLevel::Medium => "medium",
            ThreatLevel::Low => "low",
            ThreatLevel::Info => "info",
            ThreatLevel::Unknown => "unknown",
        }
    }
}

/// Origin feed of an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Gdelt,
    Valyu,
}

impl EventSource {
    pub const ALL: [EventSource; 2] = [EventSource::Gdelt, EventSource::Valyu];

    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Gdelt => "gdelt",
            EventSource::Valyu => "valyu",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// A single reported incident as shown on the map and in the event feed.
///
/// Events are immutable once received; a refresh replaces the whole collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub source: EventSource,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "threatLevel")]
    pub threat_level: ThreatLevel,
    pub location: Location,
    pub timestamp: String,
    #[serde(rename = "sourceUrl", default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub severity_index: Option<f64>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub event_count: Option<i64>,
}

impl Event {
    /// Text fields searched by the free-text filter. Absent fields are skipped.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.title.as_str()),
            Some(self.summary.as_str()),
            self.location.place_name.as_deref(),
            self.location.country.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
