use std::collections::BTreeMap;

use crate::domain::{
    BriefMover, BriefResponse, BriefSpike, CombinedEventsResponse, Event, EventSource,
    EvidenceEvent, Location, MapCountry, MetricRow, Spike, ThreatLevel,
};
use crate::error::AppError;
use crate::ranking::{rank, MoverKey, SortDirection};
use crate::series::aggregate_risk_series;
use crate::source::{CombinedEventsQuery, DataSource, EvidenceQuery, MetricsQuery, SpikesQuery};

pub const DEMO_COUNTRIES: [(&str, f64, f64); 4] = [
    ("ISR", 31.0, 35.0),
    ("MMR", 21.9, 95.9),
    ("SDN", 15.5, 32.5),
    ("UKR", 49.0, 32.0),
];

pub const DEMO_CATEGORIES: [&str; 6] = [
    "Armed Conflict",
    "Civil Unrest",
    "Diplomacy / Sanctions",
    "Economic Disruption",
    "Infrastructure / Energy",
    "Crime / Terror",
];

const DEMO_DATES: [&str; 3] = ["2026-01-01", "2026-01-02", "2026-01-03"];

/// Deterministic offline data source. Large enough to make every view non-trivial.
#[derive(Debug, Clone)]
pub struct DemoSource {
    metrics: Vec<MetricRow>,
    spikes: Vec<Spike>,
    events: Vec<Event>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

fn in_range(date: &str, start: &Option<String>, end: &Option<String>) -> bool {
    start.as_deref().map_or(true, |s| date >= s) && end.as_deref().map_or(true, |e| date <= e)
}

fn matches_opt(value: &str, wanted: &Option<String>) -> bool {
    wanted.as_deref().map_or(true, |w| w.is_empty() || w == value)
}

fn demo_metrics() -> Vec<MetricRow> {
    let mut out = Vec::new();
    for (d, date) in DEMO_DATES.iter().enumerate() {
        for (c, (country, _, _)) in DEMO_COUNTRIES.iter().enumerate() {
            // Each country reports a rotating subset of three categories per day.
            for k in 0..3 {
                let cat = DEMO_CATEGORIES[(c + d + k) % DEMO_CATEGORIES.len()];
                let events = (5 + 3 * c + 2 * d + k) as i64;
                // Every fifth row has no computed score yet.
                let idx = d * 12 + c * 3 + k;
                let risk = if idx % 5 == 4 {
                    None
                } else {
                    Some(10.0 + (c as f64) * 15.0 + (d as f64) * 4.0 + (k as f64) * 2.5)
                };
                let z = (c as f64) * 0.75 + (d as f64) * 0.5 - (k as f64) * 0.4;
                out.push(MetricRow::new(*date, *country, cat, Some(events), risk).with_z_score(z));
            }
        }
    }
    out
}

fn demo_spikes(metrics: &[MetricRow]) -> Vec<Spike> {
    metrics
        .iter()
        .filter(|m| m.z_or_default() >= 2.0)
        .enumerate()
        .map(|(i, m)| Spike {
            id: i as i64 + 1,
            date: m.date.clone(),
            country: m.country.clone(),
            category: m.category.clone(),
            z_score: m.z_or_default(),
            z_used: if i % 2 == 0 { m.z_score.map(|z| z * 0.9) } else { None },
            delta: m.event_count.map(|c| c as f64 / 2.0),
            rolling_center: None,
            rolling_dispersion: None,
            baseline_quality: Some("ok".to_string()),
            baseline_method: Some("median_mad".to_string()),
            evidence_event_ids: None,
            computed_at: None,
            pipeline_version: None,
        })
        .collect()
}

fn demo_events() -> Vec<Event> {
    let levels = ThreatLevel::KNOWN;
    let mut out = Vec::new();
    for i in 0..12usize {
        let (country, lat, lon) = DEMO_COUNTRIES[i % DEMO_COUNTRIES.len()];
        let source = EventSource::ALL[i % EventSource::ALL.len()];
        let level = levels[(i * 3) % levels.len()];
        let category = if i % 7 == 6 {
            None
        } else {
            Some(DEMO_CATEGORIES[i % DEMO_CATEGORIES.len()].to_string())
        };
        out.push(Event {
            id: format!("demo-{i:02}"),
            source,
            title: format!("Demo report {i} in {country}"),
            summary: format!("Sanitized {} event for offline use", level.as_str()),
            category,
            threat_level: level,
            location: Location {
                latitude: lat,
                longitude: lon,
                place_name: Some(format!("{country} district {}", i % 3)),
                country: Some(country.to_string()),
                region: None,
            },
            timestamp: format!("2026-01-03T{:02}:00:00Z", i),
            source_url: Some(format!("https://example.org/demo/{i}")),
            severity_index: Some(levels.len() as f64 - level.priority() as f64),
            risk_score: None,
            event_count: None,
        });
    }
    out
}

impl DemoSource {
    pub fn new() -> Self {
        let metrics = demo_metrics();
        let spikes = demo_spikes(&metrics);
        Self {
            metrics,
            spikes,
            events: demo_events(),
        }
    }

    pub fn all_metrics(&self) -> &[MetricRow] {
        &self.metrics
    }

    pub fn all_events(&self) -> &[Event] {
        &self.events
    }

    fn latest_on_or_before(&self, date: Option<&str>) -> Option<String> {
        self.metrics
            .iter()
            .map(|m| m.date.as_str())
            .filter(|d| date.map_or(true, |limit| *d <= limit))
            .max()
            .map(str::to_string)
    }
}

impl DataSource for DemoSource {
    fn metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRow>, AppError> {
        Ok(self
            .metrics
            .iter()
            .filter(|m| matches_opt(&m.country, &query.country))
            .filter(|m| matches_opt(&m.category, &query.category))
            .filter(|m| in_range(&m.date, &query.start, &query.end))
            .cloned()
            .collect())
    }

    fn spikes(&self, query: &SpikesQuery) -> Result<Vec<Spike>, AppError> {
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .spikes
            .iter()
            .filter(|s| matches_opt(&s.country, &query.country))
            .filter(|s| matches_opt(&s.category, &query.category))
            .filter(|s| in_range(&s.date, &query.start, &query.end))
            .take(limit)
            .cloned()
            .collect())
    }

    fn brief(&self, date: Option<&str>) -> Result<BriefResponse, AppError> {
        let Some(latest) = self.latest_on_or_before(date) else {
            return Ok(BriefResponse {
                top_movers: Vec::new(),
                top_spikes: Vec::new(),
                summary: "No data for the selected date.".to_string(),
            });
        };
        let day = self
            .metrics
            .iter()
            .filter(|m| m.date == latest)
            .map(|m| BriefMover {
                date: m.date.clone(),
                country: m.country.clone(),
                category: m.category.clone(),
                risk_score: m.risk_score,
                event_count: m.event_count,
                z_score: m.z_score,
            })
            .collect::<Vec<_>>();
        let mut top_movers = rank(&day, MoverKey::RiskScore, SortDirection::Desc);
        top_movers.truncate(15);

        let top_spikes = self
            .spikes
            .iter()
            .filter(|s| s.date == latest)
            .map(|s| BriefSpike {
                date: s.date.clone(),
                country: s.country.clone(),
                category: s.category.clone(),
                z_score: Some(s.z_score),
                z_used: s.z_used,
                delta: s.delta,
            })
            .collect::<Vec<_>>();

        let summary = format!(
            "{latest}: {} movers, {} spikes across {} countries.",
            top_movers.len(),
            top_spikes.len(),
            DEMO_COUNTRIES.len()
        );
        Ok(BriefResponse {
            top_movers,
            top_spikes,
            summary,
        })
    }

    fn evidence_events(&self, query: &EvidenceQuery) -> Result<Vec<EvidenceEvent>, AppError> {
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .events
            .iter()
            .filter(|e| e.source == EventSource::Gdelt)
            .map(|e| EvidenceEvent {
                id: e.id.clone(),
                ts: e.timestamp.clone(),
                date: e.timestamp.chars().take(10).collect(),
                country: e.location.country.clone(),
                admin1: e.location.place_name.clone(),
                lat: Some(e.location.latitude),
                lon: Some(e.location.longitude),
                event_code: None,
                quad_class: Some(e.threat_level.priority() as i64),
                avg_tone: None,
                source_url: e.source_url.clone(),
                category: e.category.clone(),
            })
            .filter(|e| matches_opt(e.country.as_deref().unwrap_or(""), &query.country))
            .filter(|e| matches_opt(e.category.as_deref().unwrap_or(""), &query.category))
            .filter(|e| in_range(&e.date, &query.start, &query.end))
            .take(limit)
            .collect())
    }

    fn countries(&self) -> Result<Vec<String>, AppError> {
        Ok(DEMO_COUNTRIES.iter().map(|(c, _, _)| c.to_string()).collect())
    }

    fn map_countries(&self, date: Option<&str>) -> Result<Vec<MapCountry>, AppError> {
        let Some(latest) = self.latest_on_or_before(date) else {
            return Ok(Vec::new());
        };
        Ok(DEMO_COUNTRIES
            .iter()
            .map(|(country, lat, lon)| {
                // Same per-day reduction the drilldown series uses.
                let day = aggregate_risk_series(&self.metrics, country)
                    .into_iter()
                    .find(|p| p.date == latest);
                MapCountry {
                    country: country.to_string(),
                    lat: *lat,
                    lon: *lon,
                    severity_index: day.as_ref().map(|p| p.risk / 10.0),
                    risk_score: day.as_ref().map(|p| p.risk),
                    event_count: Some(day.map_or(0, |p| p.events)),
                }
            })
            .collect())
    }

    fn combined_events(
        &self,
        query: &CombinedEventsQuery,
    ) -> Result<CombinedEventsResponse, AppError> {
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let events = self
            .events
            .iter()
            .filter(|e| query.sources.is_empty() || query.sources.contains(&e.source))
            .take(limit)
            .cloned()
            .collect::<Vec<_>>();
        let mut sources = BTreeMap::new();
        for e in &events {
            *sources.entry(e.source.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(CombinedEventsResponse {
            count: events.len() as i64,
            events,
            sources,
        })
    }
}
