use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::domain::{BriefResponse, Event, EvidenceEvent, MapCountry, MetricRow, Spike};
use crate::error::AppError;
use crate::fetch::{commit_events, RequestScope, RequestToken, Resolution, ViewSlot};
use crate::ranking::{MoverKey, SortState};
use crate::series::{build_country_drilldown, CountryDrilldown};
use crate::source::{
    default_brief_date, CombinedEventsQuery, DataSource, EvidenceQuery, MetricsQuery, SpikesQuery,
};
use crate::store::FilterStateStore;
use crate::validate::{log_warnings, validate_metric_rows};

/// Metrics, spikes, and country list shared by the movers and drilldown views.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverviewData {
    pub metrics: Vec<MetricRow>,
    pub spikes: Vec<Spike>,
    pub countries: Vec<String>,
}

/// Fetch the overview collections. All three succeed or the whole load fails.
pub fn fetch_overview(
    source: &dyn DataSource,
    config: &DashboardConfig,
) -> Result<OverviewData, AppError> {
    let metrics = source.metrics(&MetricsQuery::default())?;
    let spikes = source.spikes(&SpikesQuery {
        limit: Some(config.spikes_limit),
        ..SpikesQuery::default()
    })?;
    let countries = source.countries()?;

    log_warnings("metrics", &validate_metric_rows(&metrics));

    Ok(OverviewData {
        metrics,
        spikes,
        countries,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    Map,
    Movers,
    Drilldown,
    Brief,
    Evidence,
}

/// Tokens for a map load in flight: map markers and the event collection land together.
#[derive(Debug, Clone)]
pub struct PendingMapLoad {
    map: RequestToken,
    events: RequestToken,
}

/// Composition root of the dashboard: filter store, per-view slots, and table state.
pub struct DashboardSession {
    config: DashboardConfig,
    view: DashboardView,
    store: FilterStateStore,
    event_scope: RequestScope,
    overview: ViewSlot<OverviewData>,
    map: ViewSlot<Vec<MapCountry>>,
    brief: ViewSlot<Option<BriefResponse>>,
    brief_date: String,
    evidence: ViewSlot<Vec<EvidenceEvent>>,
    evidence_country: Option<String>,
    evidence_category: Option<String>,
    movers_sort: SortState<MoverKey>,
    selected_country: Option<String>,
}

impl DashboardSession {
    /// New session opened on the brief view for today's date.
    pub fn new(config: DashboardConfig) -> Result<Self, AppError> {
        Ok(Self::with_brief_date(config, default_brief_date()?))
    }

    pub fn with_brief_date(config: DashboardConfig, brief_date: impl Into<String>) -> Self {
        Self {
            config,
            view: DashboardView::Brief,
            store: FilterStateStore::new(),
            event_scope: RequestScope::new(),
            overview: ViewSlot::new(),
            map: ViewSlot::new(),
            brief: ViewSlot::new(),
            brief_date: brief_date.into(),
            evidence: ViewSlot::new(),
            evidence_country: None,
            evidence_category: None,
            movers_sort: SortState::default(),
            selected_country: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn view(&self) -> DashboardView {
        self.view
    }

    pub fn store(&self) -> &FilterStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FilterStateStore {
        &mut self.store
    }

    pub fn overview(&self) -> &ViewSlot<OverviewData> {
        &self.overview
    }

    pub fn map(&self) -> &ViewSlot<Vec<MapCountry>> {
        &self.map
    }

    pub fn brief(&self) -> &ViewSlot<Option<BriefResponse>> {
        &self.brief
    }

    pub fn brief_date(&self) -> &str {
        &self.brief_date
    }

    pub fn evidence(&self) -> &ViewSlot<Vec<EvidenceEvent>> {
        &self.evidence
    }

    /// Switch views. Fetches owned by the view being left are cancelled.
    pub fn switch_view(&mut self, view: DashboardView) {
        if self.view == view {
            return;
        }
        match self.view {
            DashboardView::Map => {
                self.map.teardown();
                self.event_scope.teardown();
            }
            DashboardView::Brief => self.brief.teardown(),
            DashboardView::Evidence => self.evidence.teardown(),
            DashboardView::Movers | DashboardView::Drilldown => {}
        }
        log::debug!("view {:?} -> {:?}", self.view, view);
        self.view = view;
    }

    pub fn load_overview(&mut self, source: &dyn DataSource) -> Resolution {
        let token = self.overview.begin();
        let result = fetch_overview(source, &self.config);
        self.overview
            .resolve(&token, result, &self.config.api_base_url)
    }

    pub fn set_brief_date(&mut self, date: impl Into<String>) {
        self.brief_date = date.into();
    }

    pub fn load_brief(&mut self, source: &dyn DataSource) -> Resolution {
        let token = self.brief.begin();
        let result = source.brief(Some(&self.brief_date)).map(Some);
        self.brief.resolve(&token, result, &self.config.api_base_url)
    }

    /// Evidence filters; empty strings mean "all".
    pub fn set_evidence_filter(&mut self, country: Option<&str>, category: Option<&str>) {
        let keep = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        self.evidence_country = keep(country);
        self.evidence_category = keep(category);
    }

    pub fn load_evidence(&mut self, source: &dyn DataSource) -> Resolution {
        let token = self.evidence.begin();
        let query = EvidenceQuery {
            country: self.evidence_country.clone(),
            category: self.evidence_category.clone(),
            limit: Some(self.config.evidence_limit),
            ..EvidenceQuery::default()
        };
        let result = source.evidence_events(&query);
        self.evidence
            .resolve(&token, result, &self.config.api_base_url)
    }

    pub fn combined_events_query(&self) -> CombinedEventsQuery {
        CombinedEventsQuery {
            date: None,
            sources: self.config.combined_sources.clone(),
            limit: Some(self.config.combined_events_limit),
        }
    }

    /// Start a map load. The caller fetches and hands the result to [`Self::finish_map_load`].
    pub fn begin_map_load(&mut self) -> PendingMapLoad {
        PendingMapLoad {
            map: self.map.begin(),
            events: self.event_scope.begin(),
        }
    }

    /// Land a map load. A failure of either part empties both the markers and the event feed.
    pub fn finish_map_load(
        &mut self,
        pending: &PendingMapLoad,
        result: Result<(Vec<MapCountry>, Vec<Event>), AppError>,
    ) -> Resolution {
        let base = self.config.api_base_url.clone();
        match result {
            Ok((countries, events)) => {
                self.map.resolve(&pending.map, Ok(countries), &base);
                commit_events(&mut self.store, &pending.events, Ok(events), &base)
            }
            Err(e) => {
                self.map.resolve(&pending.map, Err(e.clone()), &base);
                commit_events(&mut self.store, &pending.events, Err(e), &base)
            }
        }
    }

    pub fn load_map(&mut self, source: &dyn DataSource) -> Resolution {
        let pending = self.begin_map_load();
        let query = self.combined_events_query();
        let result = source
            .map_countries(None)
            .and_then(|countries| Ok((countries, source.combined_events(&query)?.events)));
        self.finish_map_load(&pending, result)
    }

    pub fn movers_sort(&self) -> SortState<MoverKey> {
        self.movers_sort
    }

    pub fn toggle_movers_sort(&mut self, key: MoverKey) {
        self.movers_sort.toggle(key);
    }

    /// Ranked, capped movers view over the loaded metrics.
    pub fn movers(&self) -> Vec<MetricRow> {
        self.movers_sort.view(&self.overview.data().metrics)
    }

    /// Select a country from the map or movers table and jump to its drilldown.
    pub fn select_country(&mut self, country: impl Into<String>) {
        self.selected_country = Some(country.into());
        self.switch_view(DashboardView::Drilldown);
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    pub fn drilldown(&self) -> Option<CountryDrilldown> {
        let country = self.selected_country.as_deref()?;
        let data = self.overview.data();
        Some(build_country_drilldown(country, &data.metrics, &data.spikes))
    }
}
