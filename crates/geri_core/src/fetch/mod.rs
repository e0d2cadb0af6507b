use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::Event;
use crate::error::AppError;
use crate::store::FilterStateStore;
use crate::validate::{log_warnings, validate_events};

/// Handle for one in-flight fetch.
///
/// Clones share the cancellation flag: the requesting view keeps one, the fetch carries the
/// other. Once cancelled, a token never becomes valid again.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl RequestToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True when both handles belong to the same fetch (clones of one issued token).
    pub fn same_request(&self, other: &RequestToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Issues request tokens for one view. Starting a fetch cancels the previous one.
#[derive(Debug, Default)]
pub struct RequestScope {
    issued: u64,
    current: Option<RequestToken>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestToken {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
        self.issued += 1;
        let token = RequestToken::new(self.issued);
        self.current = Some(token.clone());
        token
    }

    /// The view went away: whatever is in flight must not land.
    pub fn teardown(&mut self) {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
    }

    pub fn in_flight(&self) -> Option<&RequestToken> {
        self.current.as_ref()
    }

    /// Claim the in-flight slot for `token`'s response.
    ///
    /// Returns false for cancelled tokens, tokens issued by another scope, and tokens whose
    /// response was already settled.
    pub fn settle(&mut self, token: &RequestToken) -> bool {
        match &self.current {
            Some(current) if current.same_request(token) && !token.is_cancelled() => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

/// How a fetch result was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Result committed; previous data replaced wholesale.
    Applied,
    /// Fetch failed; the view was reset to empty and should show `banner`.
    FellBack { banner: String },
    /// Token no longer owned the view when the result arrived; nothing changed.
    Discarded,
}

/// Commit a combined-events fetch into the store, honoring the token.
pub fn commit_events(
    store: &mut FilterStateStore,
    token: &RequestToken,
    result: Result<Vec<Event>, AppError>,
    api_base_url: &str,
) -> Resolution {
    if token.is_cancelled() {
        log::debug!("discarding stale event response (request {})", token.id());
        return Resolution::Discarded;
    }
    match result {
        Ok(events) => {
            log_warnings("events", &validate_events(&events));
            log::info!("event collection refreshed: {} events", events.len());
            store.replace_events(events);
            Resolution::Applied
        }
        Err(e) => {
            log::warn!("event fetch failed: {e}");
            store.replace_events(Vec::new());
            Resolution::FellBack {
                banner: e.banner_message(api_base_url),
            }
        }
    }
}

/// Data, loading flag, and banner for one non-event view.
#[derive(Debug, Default)]
pub struct ViewSlot<T> {
    data: T,
    loading: bool,
    banner: Option<String>,
    scope: RequestScope,
}

impl<T: Default> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            data: T::default(),
            loading: false,
            banner: None,
            scope: RequestScope::new(),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn begin(&mut self) -> RequestToken {
        self.loading = true;
        self.scope.begin()
    }

    pub fn teardown(&mut self) {
        self.scope.teardown();
        self.loading = false;
    }

    /// Apply a fetch result. Errors reset the data to empty rather than keeping stale data.
    pub fn resolve(
        &mut self,
        token: &RequestToken,
        result: Result<T, AppError>,
        api_base_url: &str,
    ) -> Resolution {
        if !self.scope.settle(token) {
            log::debug!("discarding stale view response (request {})", token.id());
            return Resolution::Discarded;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = data;
                self.banner = None;
                Resolution::Applied
            }
            Err(e) => {
                log::warn!("view fetch failed: {e}");
                let banner = e.banner_message(api_base_url);
                self.data = T::default();
                self.banner = Some(banner.clone());
                Resolution::FellBack { banner }
            }
        }
    }
}
