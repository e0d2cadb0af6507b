use crate::domain::{Event, EventSource, ThreatLevel};
use crate::filter::{apply_filters, FilterSpec};

/// What changed in the store. Delivered to subscribers after the change is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    EventsReplaced { count: usize },
    FiltersChanged,
    SelectionChanged { event_id: Option<String> },
}

/// Notification payload: the change plus the store version it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNotice {
    pub version: u64,
    pub change: StoreChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreNotice)>;

/// Holds the current event collection, the active filter, and the highlighted event.
///
/// Every mutation bumps `version` and notifies subscribers synchronously before returning,
/// so a consumer that re-reads the store after a notice always sees the committed state.
/// Derived views are never cached; call [`FilterStateStore::filtered_events`] to pull one.
#[derive(Default)]
pub struct FilterStateStore {
    events: Vec<Event>,
    filters: FilterSpec,
    selected_event_id: Option<String>,
    version: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl FilterStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn filtered_events(&self) -> Vec<Event> {
        apply_filters(&self.events, &self.filters)
    }

    pub fn selected_event_id(&self) -> Option<&str> {
        self.selected_event_id.as_deref()
    }

    /// The highlighted event, if it is still part of the current collection.
    pub fn selected_event(&self) -> Option<&Event> {
        let id = self.selected_event_id.as_deref()?;
        self.events.iter().find(|e| e.id == id)
    }

    pub fn subscribe(&mut self, f: impl FnMut(&StoreNotice) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Replace the whole collection. There is no incremental merge.
    pub fn replace_events(&mut self, events: Vec<Event>) {
        let count = events.len();
        self.events = events;
        self.commit(StoreChange::EventsReplaced { count });
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
        self.commit(StoreChange::FiltersChanged);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filters.search_query = query.into();
        self.commit(StoreChange::FiltersChanged);
    }

    pub fn toggle_threat_level(&mut self, level: ThreatLevel) {
        toggle(&mut self.filters.threat_levels, level);
        self.commit(StoreChange::FiltersChanged);
    }

    pub fn toggle_category(&mut self, category: impl Into<String>) {
        toggle(&mut self.filters.categories, category.into());
        self.commit(StoreChange::FiltersChanged);
    }

    pub fn toggle_source(&mut self, source: EventSource) {
        toggle(&mut self.filters.sources, source);
        self.commit(StoreChange::FiltersChanged);
    }

    /// Back to the all-inclusive default.
    pub fn clear_filters(&mut self) {
        self.filters = FilterSpec::default();
        self.commit(StoreChange::FiltersChanged);
    }

    /// Highlight an event by identity. Independent of filtering.
    pub fn select_event(&mut self, event_id: impl Into<String>) {
        self.selected_event_id = Some(event_id.into());
        self.commit(StoreChange::SelectionChanged {
            event_id: self.selected_event_id.clone(),
        });
    }

    pub fn deselect_event(&mut self) {
        self.selected_event_id = None;
        self.commit(StoreChange::SelectionChanged { event_id: None });
    }

    fn commit(&mut self, change: StoreChange) {
        self.version += 1;
        let notice = StoreNotice {
            version: self.version,
            change,
        };
        for (_, f) in self.subscribers.iter_mut() {
            f(&notice);
        }
    }
}

fn toggle<T: Ord>(set: &mut std::collections::BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}
