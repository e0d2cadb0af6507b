use geri_core::domain::{
    BriefResponse, CombinedEventsResponse, EvidenceEvent, MapCountry, MetricRow, Spike,
};
use geri_core::error::AppError;
use geri_core::source::{
    CombinedEventsQuery, DataSource, EvidenceQuery, MetricsQuery, QueryParams, SpikesQuery,
};
use serde::Deserialize;

use crate::client::ApiClient;

#[derive(Debug, Clone, Deserialize)]
struct CountryListResponse {
    countries: Vec<String>,
}

fn date_param(date: Option<&str>) -> QueryParams {
    match date.map(str::trim) {
        Some(d) if !d.is_empty() => vec![("date", d.to_string())],
        _ => Vec::new(),
    }
}

impl DataSource for ApiClient {
    fn metrics(&self, query: &MetricsQuery) -> Result<Vec<MetricRow>, AppError> {
        self.get_json("/metrics", &query.params())
    }

    fn spikes(&self, query: &SpikesQuery) -> Result<Vec<Spike>, AppError> {
        self.get_json("/spikes", &query.params())
    }

    fn brief(&self, date: Option<&str>) -> Result<BriefResponse, AppError> {
        self.get_json("/brief", &date_param(date))
    }

    fn evidence_events(&self, query: &EvidenceQuery) -> Result<Vec<EvidenceEvent>, AppError> {
        self.get_json("/events", &query.params())
    }

    fn countries(&self) -> Result<Vec<String>, AppError> {
        let list: CountryListResponse = self.get_json("/countries", &Vec::new())?;
        Ok(list.countries)
    }

    fn map_countries(&self, date: Option<&str>) -> Result<Vec<MapCountry>, AppError> {
        self.get_json("/map", &date_param(date))
    }

    fn combined_events(
        &self,
        query: &CombinedEventsQuery,
    ) -> Result<CombinedEventsResponse, AppError> {
        self.get_json("/events/combined", &query.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_dates_are_not_sent() {
        assert!(date_param(None).is_empty());
        assert!(date_param(Some(" ")).is_empty());
        assert_eq!(
            date_param(Some("2026-01-03")),
            vec![("date", "2026-01-03".to_string())]
        );
    }

    #[test]
    fn country_list_decodes() {
        let v: CountryListResponse =
            serde_json::from_str(r#"{"countries":["ISR","UKR"]}"#).expect("decode");
        assert_eq!(v.countries, vec!["ISR", "UKR"]);
    }
}
