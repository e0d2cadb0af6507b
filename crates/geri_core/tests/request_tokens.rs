use pretty_assertions::assert_eq;

use geri_core::demo::DemoSource;
use geri_core::domain::Event;
use geri_core::error::AppError;
use geri_core::fetch::{commit_events, RequestScope, Resolution, ViewSlot};
use geri_core::store::FilterStateStore;

const BASE: &str = "http://localhost:8000";

/// Holds a fetch result until the test decides to deliver it.
struct DelayedResolver<T> {
    result: Option<Result<T, AppError>>,
}

impl<T> DelayedResolver<T> {
    fn new(result: Result<T, AppError>) -> Self {
        Self {
            result: Some(result),
        }
    }

    fn fire(&mut self) -> Result<T, AppError> {
        self.result.take().expect("resolver fired twice")
    }
}

fn demo_events() -> Vec<Event> {
    DemoSource::new().all_events().to_vec()
}

#[test]
fn response_after_teardown_does_not_touch_store() {
    let mut store = FilterStateStore::new();
    let mut scope = RequestScope::new();

    let token = scope.begin();
    let mut pending = DelayedResolver::new(Ok(demo_events()));

    scope.teardown();
    assert!(token.is_cancelled());

    let version = store.version();
    let outcome = commit_events(&mut store, &token, pending.fire(), BASE);
    assert_eq!(outcome, Resolution::Discarded);
    assert!(store.events().is_empty());
    assert_eq!(store.version(), version);
}

#[test]
fn newer_request_supersedes_older_one() {
    let mut store = FilterStateStore::new();
    let mut scope = RequestScope::new();

    let first = scope.begin();
    let mut first_pending = DelayedResolver::new(Ok(demo_events()));
    let second = scope.begin();
    let mut second_pending = DelayedResolver::new(Ok(demo_events()[..2].to_vec()));

    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    assert_eq!(scope.in_flight().map(|t| t.id()), Some(second.id()));

    assert_eq!(
        commit_events(&mut store, &second, second_pending.fire(), BASE),
        Resolution::Applied
    );
    // The older response arrives late and is dropped.
    assert_eq!(
        commit_events(&mut store, &first, first_pending.fire(), BASE),
        Resolution::Discarded
    );
    assert_eq!(store.events().len(), 2);
}

#[test]
fn transport_failure_resets_store_to_empty_with_banner() {
    let mut store = FilterStateStore::new();
    store.replace_events(demo_events());
    let mut scope = RequestScope::new();

    let token = scope.begin();
    let err = AppError::new("SOURCE_UNREACHABLE", "Failed to reach the events API")
        .with_retryable(true);
    let outcome = commit_events(&mut store, &token, Err(err), BASE);

    assert_eq!(
        outcome,
        Resolution::FellBack {
            banner: "Failed to reach the events API — Is the API running at http://localhost:8000?"
                .to_string()
        }
    );
    assert!(store.events().is_empty());
}

#[test]
fn view_slot_applies_falls_back_and_discards() {
    let mut slot: ViewSlot<Vec<String>> = ViewSlot::new();

    let t1 = slot.begin();
    assert!(slot.is_loading());
    assert_eq!(
        slot.resolve(&t1, Ok(vec!["UKR".to_string()]), BASE),
        Resolution::Applied
    );
    assert!(!slot.is_loading());
    assert_eq!(slot.data(), &vec!["UKR".to_string()]);

    let t2 = slot.begin();
    let outcome = slot.resolve(&t2, Err(AppError::http_status(500, "Internal Server Error")), BASE);
    assert!(matches!(outcome, Resolution::FellBack { .. }));
    assert!(slot.data().is_empty());
    assert!(slot.banner().unwrap_or_default().starts_with("API 500"));

    let t3 = slot.begin();
    let mut late = DelayedResolver::new(Ok(vec!["SDN".to_string()]));
    slot.teardown();
    assert_eq!(slot.resolve(&t3, late.fire(), BASE), Resolution::Discarded);
    assert!(slot.data().is_empty());
    assert!(!slot.is_loading());
}

#[test]
fn view_slot_ignores_tokens_it_did_not_issue() {
    let mut brief: ViewSlot<Vec<String>> = ViewSlot::new();
    let mut evidence: ViewSlot<Vec<String>> = ViewSlot::new();

    // Both slots issue request id 1, but the tokens are not interchangeable.
    let brief_token = brief.begin();
    let evidence_token = evidence.begin();
    assert_eq!(brief_token.id(), evidence_token.id());
    assert!(!brief_token.same_request(&evidence_token));

    assert_eq!(
        evidence.resolve(&brief_token, Ok(vec!["ISR".to_string()]), BASE),
        Resolution::Discarded
    );
    assert!(evidence.data().is_empty());
    assert!(evidence.is_loading());

    assert_eq!(
        evidence.resolve(&evidence_token, Ok(vec!["MMR".to_string()]), BASE),
        Resolution::Applied
    );
    // A second delivery on the same token is dropped.
    assert_eq!(
        evidence.resolve(&evidence_token, Err(AppError::http_status(502, "Bad Gateway")), BASE),
        Resolution::Discarded
    );
    assert_eq!(evidence.data(), &vec!["MMR".to_string()]);
    assert_eq!(evidence.banner(), None);
}

#[test]
fn scope_settles_only_its_current_token() {
    let mut scope = RequestScope::new();
    let first = scope.begin();
    let second = scope.begin();

    assert!(!scope.settle(&first));
    assert!(scope.settle(&second.clone()));
    assert!(scope.in_flight().is_none());
    assert!(!scope.settle(&second));
}

#[test]
fn token_can_cross_threads() {
    let mut scope = RequestScope::new();
    let token = scope.begin();
    let worker_token = token.clone();

    let handle = std::thread::spawn(move || {
        // A worker would fetch here; it only observes the flag.
        worker_token.is_cancelled()
    });
    assert!(!handle.join().expect("join"));

    scope.teardown();
    assert!(token.is_cancelled());
}
