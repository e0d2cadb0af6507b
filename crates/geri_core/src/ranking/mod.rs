use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{BriefMover, MetricRow};

/// Maximum rows a ranked view ever returns. Applied after the full sort.
pub const RANK_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// A row's value under one sort key, already resolved against the default table.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn as_text(&self) -> String {
        match self {
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
        }
    }
}

/// A column a table can be sorted by.
pub trait SortKey: Copy + Eq {
    /// Direction used when the user switches to this key.
    fn default_direction(self) -> SortDirection;
}

/// A row type that exposes sortable values for the keys `K`.
pub trait Rankable<K: SortKey> {
    fn sort_value(&self, key: K) -> SortValue;
}

/// Base letters of `s`, case-folded, with combining marks dropped ("Côte" -> "cote").
fn primary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Case-folded decomposition with accents kept, so "e" sorts before "é".
fn accent_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Locale-style collation: base letters first, then accents, then case.
///
/// Accented letters sort with their base letter rather than after `z`. On case-only ties
/// lowercase sorts before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| accent_key(a).cmp(accent_key(b)))
        .then_with(|| b.cmp(a))
}

/// Numeric comparison when both sides are numbers, textual collation otherwise.
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        _ => locale_compare(&a.as_text(), &b.as_text()),
    }
}

/// Sort `rows` by `key` and return at most [`RANK_LIMIT`] of them.
///
/// The input is never reordered. Rows comparing equal keep their input order in both
/// directions.
pub fn rank<T, K>(rows: &[T], key: K, direction: SortDirection) -> Vec<T>
where
    T: Rankable<K> + Clone,
    K: SortKey,
{
    let mut keyed = rows
        .iter()
        .map(|row| (row.sort_value(key), row))
        .collect::<Vec<_>>();

    // `sort_by` is stable; reversing the comparator keeps ties in input order.
    keyed.sort_by(|a, b| direction.apply(compare_values(&a.0, &b.0)));
    keyed.truncate(RANK_LIMIT);

    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}

/// Current sort column and direction of a table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: SortKey> SortState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    /// Header click: the same key flips direction, a new key starts at its default direction.
    pub fn toggle(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = key.default_direction();
        }
    }

    pub fn view<T: Rankable<K> + Clone>(&self, rows: &[T]) -> Vec<T> {
        rank(rows, self.key, self.direction)
    }
}

/// Columns of the risk movers table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MoverKey {
    Date,
    Country,
    Category,
    RiskScore,
    EventCount,
    ZScore,
}

impl MoverKey {
    pub const ALL: [MoverKey; 6] = [
        MoverKey::Date,
        MoverKey::Country,
        MoverKey::Category,
        MoverKey::RiskScore,
        MoverKey::EventCount,
        MoverKey::ZScore,
    ];

    pub fn is_textual(self) -> bool {
        matches!(self, MoverKey::Date | MoverKey::Country | MoverKey::Category)
    }
}

impl SortKey for MoverKey {
    fn default_direction(self) -> SortDirection {
        if self.is_textual() {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Movers open sorted by risk, highest first.
impl Default for SortState<MoverKey> {
    fn default() -> Self {
        SortState::new(MoverKey::RiskScore)
    }
}

impl Rankable<MoverKey> for MetricRow {
    fn sort_value(&self, key: MoverKey) -> SortValue {
        match key {
            MoverKey::Date => SortValue::Text(self.date.clone()),
            MoverKey::Country => SortValue::Text(self.country.clone()),
            MoverKey::Category => SortValue::Text(self.category.clone()),
            MoverKey::RiskScore => SortValue::Number(self.risk_or_default()),
            MoverKey::EventCount => SortValue::Number(self.events_or_default() as f64),
            MoverKey::ZScore => SortValue::Number(self.z_or_default()),
        }
    }
}

impl Rankable<MoverKey> for BriefMover {
    fn sort_value(&self, key: MoverKey) -> SortValue {
        match key {
            MoverKey::Date => SortValue::Text(self.date.clone()),
            MoverKey::Country => SortValue::Text(self.country.clone()),
            MoverKey::Category => SortValue::Text(self.category.clone()),
            MoverKey::RiskScore => SortValue::Number(self.risk_or_default()),
            MoverKey::EventCount => SortValue::Number(self.events_or_default() as f64),
            MoverKey::ZScore => SortValue::Number(self.z_or_default()),
        }
    }
}
