use geri_core::demo::DemoSource;
use geri_core::domain::MetricRow;
use geri_core::validate::{validate_events, validate_metric_rows};

#[test]
fn demo_feed_is_clean() {
    let demo = DemoSource::new();
    let warnings = validate_metric_rows(demo.all_metrics());
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    let warnings = validate_events(demo.all_events());
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn non_padded_dates_and_negative_counts_are_flagged() {
    let rows = vec![
        MetricRow::new("2024-1-5", "X", "A", Some(1), None),
        MetricRow::new("2024-01-05", "X", "B", Some(-2), None),
        MetricRow::new("yesterday", "X", "C", None, None),
    ];
    let warnings = validate_metric_rows(&rows);
    let codes = warnings.iter().map(|w| w.code.as_str()).collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![
            "VALIDATION_METRIC_DATE_NOT_ISO",
            "VALIDATION_METRIC_NEGATIVE_COUNT",
            "VALIDATION_METRIC_DATE_NOT_ISO",
        ]
    );
    assert!(warnings[0]
        .details
        .as_deref()
        .unwrap_or_default()
        .contains("date=2024-1-5"));
}

#[test]
fn non_rfc3339_event_timestamps_are_flagged() {
    let mut events = DemoSource::new().all_events().to_vec();
    events[0].timestamp = "03/01/2026 10:00".to_string();
    let warnings = validate_events(&events);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "VALIDATION_EVENT_TS_PARSE_FAILED");
}
