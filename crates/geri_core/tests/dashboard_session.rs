use pretty_assertions::assert_eq;

use geri_core::config::DashboardConfig;
use geri_core::demo::DemoSource;
use geri_core::domain::{
    BriefResponse, CombinedEventsResponse, EvidenceEvent, MapCountry, MetricRow, Spike,
};
use geri_core::error::AppError;
use geri_core::fetch::Resolution;
use geri_core::ranking::{MoverKey, SortDirection, RANK_LIMIT};
use geri_core::session::{fetch_overview, DashboardSession, DashboardView, OverviewData};
use geri_core::source::{
    CombinedEventsQuery, DataSource, EvidenceQuery, MetricsQuery, SpikesQuery,
};

/// Source whose every call fails like an unreachable API.
struct DownSource;

fn down() -> AppError {
    AppError::new("SOURCE_UNREACHABLE", "Failed to fetch").with_retryable(true)
}

impl DataSource for DownSource {
    fn metrics(&self, _: &MetricsQuery) -> Result<Vec<MetricRow>, AppError> {
        Err(down())
    }
    fn spikes(&self, _: &SpikesQuery) -> Result<Vec<Spike>, AppError> {
        Err(down())
    }
    fn brief(&self, _: Option<&str>) -> Result<BriefResponse, AppError> {
        Err(down())
    }
    fn evidence_events(&self, _: &EvidenceQuery) -> Result<Vec<EvidenceEvent>, AppError> {
        Err(down())
    }
    fn countries(&self) -> Result<Vec<String>, AppError> {
        Err(down())
    }
    fn map_countries(&self, _: Option<&str>) -> Result<Vec<MapCountry>, AppError> {
        Err(down())
    }
    fn combined_events(&self, _: &CombinedEventsQuery) -> Result<CombinedEventsResponse, AppError> {
        Err(down())
    }
}

fn session() -> DashboardSession {
    DashboardSession::with_brief_date(DashboardConfig::default(), "2026-01-03")
}

#[test]
fn overview_load_feeds_movers_and_drilldown() {
    let demo = DemoSource::new();
    let mut s = session();
    assert_eq!(s.load_overview(&demo), Resolution::Applied);
    assert_eq!(s.overview().data().countries.len(), 4);

    let movers = s.movers();
    assert!(movers.len() <= RANK_LIMIT);
    assert_eq!(movers.len(), demo.all_metrics().len());
    assert!(movers
        .windows(2)
        .all(|w| w[0].risk_or_default() >= w[1].risk_or_default()));

    s.toggle_movers_sort(MoverKey::Date);
    assert_eq!(s.movers_sort().direction, SortDirection::Asc);
    assert_eq!(s.movers()[0].date, "2026-01-01");

    assert!(s.drilldown().is_none());
    s.select_country("UKR");
    assert_eq!(s.view(), DashboardView::Drilldown);
    let d = s.drilldown().expect("drilldown");
    assert_eq!(d.risk_over_time.len(), 3);
    assert_eq!(
        d.risk_over_time.last().map(|p| p.date.as_str()),
        Some("2026-01-03")
    );
    assert_eq!(d.category_breakdown.len(), 3);
}

#[test]
fn overview_failure_empties_every_collection() {
    let demo = DemoSource::new();
    let mut s = session();
    s.load_overview(&demo);
    assert!(!s.overview().data().metrics.is_empty());

    let outcome = s.load_overview(&DownSource);
    assert!(matches!(outcome, Resolution::FellBack { .. }));
    assert_eq!(s.overview().data(), &OverviewData::default());
    assert!(s
        .overview()
        .banner()
        .unwrap_or_default()
        .contains("http://localhost:8000"));
    assert!(s.movers().is_empty());
}

#[test]
fn fetch_overview_honors_spike_limit() {
    let demo = DemoSource::new();
    let cfg = DashboardConfig {
        spikes_limit: 1,
        ..DashboardConfig::default()
    };
    let data = fetch_overview(&demo, &cfg).expect("overview");
    assert_eq!(data.spikes.len(), 1);
}

#[test]
fn map_load_populates_store_and_markers() {
    let demo = DemoSource::new();
    let mut s = session();
    s.switch_view(DashboardView::Map);
    assert_eq!(s.load_map(&demo), Resolution::Applied);
    assert_eq!(s.map().data().len(), 4);
    assert_eq!(s.store().events().len(), demo.all_events().len());

    assert!(matches!(s.load_map(&DownSource), Resolution::FellBack { .. }));
    assert!(s.map().data().is_empty());
    assert!(s.store().events().is_empty());
}

#[test]
fn leaving_the_map_discards_its_in_flight_load() {
    let demo = DemoSource::new();
    let mut s = session();
    s.switch_view(DashboardView::Map);

    let pending = s.begin_map_load();
    let query = s.combined_events_query();
    let result = demo
        .map_countries(None)
        .and_then(|c| Ok((c, demo.combined_events(&query)?.events)));

    s.switch_view(DashboardView::Movers);
    assert_eq!(s.finish_map_load(&pending, result), Resolution::Discarded);
    assert!(s.store().events().is_empty());
    assert!(s.map().data().is_empty());
    assert!(!s.map().is_loading());
}

#[test]
fn brief_and_evidence_views_load_for_their_filters() {
    let demo = DemoSource::new();
    let mut s = session();
    assert_eq!(s.brief_date(), "2026-01-03");
    assert_eq!(s.load_brief(&demo), Resolution::Applied);
    let brief = s.brief().data().clone().expect("brief");
    assert!(brief.top_movers.iter().all(|m| m.date == "2026-01-03"));

    s.set_brief_date("2025-12-01");
    s.load_brief(&demo);
    assert!(s.brief().data().as_ref().expect("brief").top_movers.is_empty());

    s.switch_view(DashboardView::Evidence);
    s.set_evidence_filter(Some("SDN"), Some(""));
    assert_eq!(s.load_evidence(&demo), Resolution::Applied);
    assert!(!s.evidence().data().is_empty());
    assert!(s
        .evidence()
        .data()
        .iter()
        .all(|e| e.country.as_deref() == Some("SDN")));

    assert!(matches!(s.load_evidence(&DownSource), Resolution::FellBack { .. }));
    assert!(s.evidence().data().is_empty());
}
