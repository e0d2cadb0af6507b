use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::domain::{
    BriefResponse, CombinedEventsResponse, EventSource, EvidenceEvent, MapCountry, MetricRow, Spike,
};
use crate::error::AppError;

/// Query-string pairs with empty values already dropped.
pub type QueryParams = Vec<(&'static str, String)>;

fn push_param(out: &mut QueryParams, name: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim) {
        if !v.is_empty() {
            out.push((name, v.to_string()));
        }
    }
}

fn push_limit(out: &mut QueryParams, limit: Option<u32>) {
    if let Some(limit) = limit {
        out.push(("limit", limit.to_string()));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl MetricsQuery {
    pub fn params(&self) -> QueryParams {
        let mut out = Vec::new();
        push_param(&mut out, "country", &self.country);
        push_param(&mut out, "start", &self.start);
        push_param(&mut out, "end", &self.end);
        push_param(&mut out, "category", &self.category);
        out
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpikesQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<u32>,
}

impl SpikesQuery {
    pub fn params(&self) -> QueryParams {
        let mut out = Vec::new();
        push_param(&mut out, "country", &self.country);
        push_param(&mut out, "category", &self.category);
        push_param(&mut out, "start", &self.start);
        push_param(&mut out, "end", &self.end);
        push_limit(&mut out, self.limit);
        out
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<u32>,
}

impl EvidenceQuery {
    pub fn params(&self) -> QueryParams {
        let mut out = Vec::new();
        push_param(&mut out, "country", &self.country);
        push_param(&mut out, "start", &self.start);
        push_param(&mut out, "end", &self.end);
        push_param(&mut out, "category", &self.category);
        push_limit(&mut out, self.limit);
        out
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombinedEventsQuery {
    pub date: Option<String>,
    pub sources: Vec<EventSource>,
    pub limit: Option<u32>,
}

impl CombinedEventsQuery {
    pub fn params(&self) -> QueryParams {
        let mut out = Vec::new();
        push_param(&mut out, "date", &self.date);
        if !self.sources.is_empty() {
            let joined = self
                .sources
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            out.push(("sources", joined));
        }
        push_limit(&mut out, self.limit);
        out
    }
}

/// External collaborator that supplies typed, already-validated collections.
///
/// Failures are transport errors (unreachable, non-success status, undecodable body); the
/// core never retries them.
pub trait DataSource {
    fn metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRow>, AppError>;
    fn spikes(&self, query: &SpikesQuery) -> Result<Vec<Spike>, AppError>;
    fn brief(&self, date: Option<&str>) -> Result<BriefResponse, AppError>;
    fn evidence_events(&self, query: &EvidenceQuery) -> Result<Vec<EvidenceEvent>, AppError>;
    fn countries(&self) -> Result<Vec<String>, AppError>;
    fn map_countries(&self, date: Option<&str>) -> Result<Vec<MapCountry>, AppError>;
    fn combined_events(
        &self,
        query: &CombinedEventsQuery,
    ) -> Result<CombinedEventsResponse, AppError>;
}

/// Today's UTC date as `YYYY-MM-DD`, the default date of the daily brief.
pub fn default_brief_date() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| {
            AppError::new("BRIEF_DATE_FORMAT_FAILED", "Failed to format brief date")
                .with_details(e.to_string())
        })
}
