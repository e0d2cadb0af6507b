use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::domain::{Event, MetricRow, ValidationWarning};

fn is_iso_day(s: &str) -> bool {
    // Zero padding matters: lexical order must equal calendar order.
    s.len() == 10 && Date::parse(s, format_description!("[year]-[month]-[day]")).is_ok()
}

/// Data-quality checks on metric rows. Warnings never block a refresh.
pub fn validate_metric_rows(rows: &[MetricRow]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (idx, m) in rows.iter().enumerate() {
        if !is_iso_day(&m.date) {
            warnings.push(
                ValidationWarning::new(
                    "VALIDATION_METRIC_DATE_NOT_ISO",
                    "Metric date is not a zero-padded YYYY-MM-DD day; date ordering may be wrong",
                )
                .with_details(format!("row={idx}; country={}; date={}", m.country, m.date)),
            );
        }
        if let Some(count) = m.event_count {
            if count < 0 {
                warnings.push(
                    ValidationWarning::new(
                        "VALIDATION_METRIC_NEGATIVE_COUNT",
                        "Metric event_count is negative",
                    )
                    .with_details(format!(
                        "row={idx}; country={}; date={}; category={}; value={count}",
                        m.country, m.date, m.category
                    )),
                );
            }
        }
    }

    warnings
}

/// Flag events whose timestamp is not RFC3339.
pub fn validate_events(events: &[Event]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for e in events {
        if let Err(err) = OffsetDateTime::parse(&e.timestamp, &Rfc3339) {
            warnings.push(
                ValidationWarning::new(
                    "VALIDATION_EVENT_TS_PARSE_FAILED",
                    "Event timestamp is not RFC3339",
                )
                .with_details(format!("id={}; value={}; err={err}", e.id, e.timestamp)),
            );
        }
    }

    warnings
}

pub(crate) fn log_warnings(what: &str, warnings: &[ValidationWarning]) {
    for w in warnings {
        log::warn!(
            "{what}: [{}] {} ({})",
            w.code,
            w.message,
            w.details.as_deref().unwrap_or("")
        );
    }
}
