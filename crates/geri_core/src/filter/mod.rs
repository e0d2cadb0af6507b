use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Event, EventSource, ThreatLevel};

/// Current event-feed filter.
///
/// An empty set on any dimension means "no restriction" on that dimension, never "match none".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSpec {
    pub search_query: String,
    pub threat_levels: BTreeSet<ThreatLevel>,
    pub categories: BTreeSet<String>,
    pub sources: BTreeSet<EventSource>,
}

impl FilterSpec {
    /// True when every dimension is unrestricted.
    pub fn is_empty(&self) -> bool {
        self.normalized_query().is_none()
            && self.threat_levels.is_empty()
            && self.categories.is_empty()
            && self.sources.is_empty()
    }

    /// Lower-cased, trimmed search text, or `None` when the search box is blank.
    pub fn normalized_query(&self) -> Option<String> {
        let q = self.search_query.trim();
        if q.is_empty() {
            None
        } else {
            Some(q.to_lowercase())
        }
    }

    /// Whether a single event passes every active filter stage.
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_with_query(event, self.normalized_query().as_deref())
    }

    fn matches_with_query(&self, event: &Event, query: Option<&str>) -> bool {
        if let Some(q) = query {
            if !event
                .searchable_fields()
                .any(|field| field.to_lowercase().contains(q))
            {
                return false;
            }
        }
        if !self.threat_levels.is_empty() && !self.threat_levels.contains(&event.threat_level) {
            return false;
        }
        if !self.categories.is_empty() {
            match event.category.as_deref() {
                Some(cat) if self.categories.contains(cat) => {}
                _ => return false,
            }
        }
        if !self.sources.is_empty() && !self.sources.contains(&event.source) {
            return false;
        }
        true
    }
}

/// Produce the visible, ordered subset of `events` for `filter`.
///
/// Output is ordered by threat level (critical first, unrecognized last). Events of equal
/// severity keep their input order.
pub fn apply_filters(events: &[Event], filter: &FilterSpec) -> Vec<Event> {
    let query = filter.normalized_query();

    let mut kept = events
        .iter()
        .enumerate()
        .filter(|(_, e)| filter.matches_with_query(e, query.as_deref()))
        .collect::<Vec<_>>();

    // Original index breaks ties, so the result is stable regardless of the sort primitive.
    kept.sort_unstable_by_key(|(idx, e)| (e.threat_level.priority(), *idx));

    log::debug!(
        "event filter kept {} of {} events",
        kept.len(),
        events.len()
    );

    kept.into_iter().map(|(_, e)| e.clone()).collect()
}
