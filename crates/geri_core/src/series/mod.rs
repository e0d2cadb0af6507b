use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MetricRow, Spike};

/// Number of spikes listed in a country drilldown.
pub const DRILLDOWN_SPIKE_LIMIT: usize = 10;

/// One point of a country's daily risk series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPoint {
    pub date: String,
    /// Highest category risk of the day.
    pub risk: f64,
    /// Events across all categories of the day.
    pub events: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdownRow {
    pub name: String,
    pub risk: f64,
    pub events: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrilldownSpike {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub z: f64,
}

/// Everything the country drilldown view renders for one country.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryDrilldown {
    pub country: String,
    pub risk_over_time: Vec<RiskPoint>,
    pub category_breakdown: Vec<CategoryBreakdownRow>,
    pub recent_spikes: Vec<DrilldownSpike>,
}

fn rows_for_country<'a>(
    metrics: &'a [MetricRow],
    country: &'a str,
) -> impl Iterator<Item = &'a MetricRow> + 'a {
    metrics.iter().filter(move |m| m.country == country)
}

/// Collapse a country's (date, category) rows into one point per date, ascending by date.
///
/// Country matching is exact. A country with no rows yields an empty series.
pub fn aggregate_risk_series(metrics: &[MetricRow], country: &str) -> Vec<RiskPoint> {
    // BTreeMap keys are ISO dates, so iteration order is calendar order.
    let mut by_date: BTreeMap<&str, RiskPoint> = BTreeMap::new();

    for m in rows_for_country(metrics, country) {
        let risk = m.risk_or_default();
        let events = m.events_or_default();
        by_date
            .entry(m.date.as_str())
            .and_modify(|p| {
                p.risk = p.risk.max(risk);
                p.events = p.events.saturating_add(events);
            })
            .or_insert_with(|| RiskPoint {
                date: m.date.clone(),
                risk,
                events,
            });
    }

    by_date.into_values().collect()
}

/// Per-category rows for the latest date in the country's risk series.
///
/// Duplicate (country, date, category) rows are passed through as-is, in input order.
pub fn category_breakdown(metrics: &[MetricRow], country: &str) -> Vec<CategoryBreakdownRow> {
    let series = aggregate_risk_series(metrics, country);
    let Some(latest) = series.last() else {
        return Vec::new();
    };

    rows_for_country(metrics, country)
        .filter(|m| m.date == latest.date)
        .map(|m| CategoryBreakdownRow {
            name: m.category.clone(),
            risk: m.risk_or_default(),
            events: m.events_or_default(),
        })
        .collect()
}

/// First spikes for `country`, in the order the source returned them.
pub fn country_spikes(spikes: &[Spike], country: &str, limit: usize) -> Vec<DrilldownSpike> {
    spikes
        .iter()
        .filter(|s| s.country == country)
        .take(limit)
        .map(|s| DrilldownSpike {
            id: s.id,
            date: s.date.clone(),
            category: s.category.clone(),
            z: s.display_z(),
        })
        .collect()
}

pub fn build_country_drilldown(
    country: &str,
    metrics: &[MetricRow],
    spikes: &[Spike],
) -> CountryDrilldown {
    let drilldown = CountryDrilldown {
        country: country.to_string(),
        risk_over_time: aggregate_risk_series(metrics, country),
        category_breakdown: category_breakdown(metrics, country),
        recent_spikes: country_spikes(spikes, country, DRILLDOWN_SPIKE_LIMIT),
    };
    log::debug!(
        "drilldown {country}: {} dates, {} categories, {} spikes",
        drilldown.risk_over_time.len(),
        drilldown.category_breakdown.len(),
        drilldown.recent_spikes.len()
    );
    drilldown
}
