//! Gap-filled daily usage series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minutes used per calendar date, ascending, with no missing dates between
/// the first and last entry.
///
/// Serializes as a JSON object keyed by ISO date (`{"2025-12-29": 42}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries(BTreeMap<NaiveDate, u32>);

impl DailySeries {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a contiguous series from sparse (date, minutes) points.
    ///
    /// Dates between the earliest and latest point that have no value are
    /// filled with zero. Duplicate dates are summed.
    pub fn from_sparse(points: impl IntoIterator<Item = (NaiveDate, u32)>) -> Self {
        let mut recorded: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for (date, minutes) in points {
            *recorded.entry(date).or_insert(0) += minutes;
        }

        let (Some(&first), Some(&last)) = (recorded.keys().next(), recorded.keys().next_back())
        else {
            return Self::new();
        };

        let filled = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|d| (d, recorded.get(&d).copied().unwrap_or(0)))
            .collect();

        Self(filled)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<u32> {
        self.0.get(&date).copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.0.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.0.keys().next_back().copied()
    }

    pub fn total_minutes(&self) -> u64 {
        self.0.values().map(|m| *m as u64).sum()
    }

    /// Largest single-day value, used to scale charts
    pub fn peak_minutes(&self) -> u32 {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Iterate (date, minutes) in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.0.iter().map(|(d, m)| (*d, *m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_points_give_empty_series() {
        let series = DailySeries::from_sparse(Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
        assert_eq!(series.peak_minutes(), 0);
    }

    #[test]
    fn gaps_are_zero_filled() {
        let series = DailySeries::from_sparse(vec![
            (date(2025, 12, 27), 30),
            (date(2025, 12, 31), 90),
            (date(2025, 12, 29), 15),
        ]);

        assert_eq!(series.len(), 5);
        assert_eq!(series.get(date(2025, 12, 28)), Some(0));
        assert_eq!(series.get(date(2025, 12, 30)), Some(0));
        assert_eq!(series.get(date(2025, 12, 29)), Some(15));
        assert_eq!(series.total_minutes(), 135);
        assert_eq!(series.peak_minutes(), 90);

        let dates: Vec<_> = series.iter().map(|(d, _)| d).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn range_crosses_month_boundary() {
        let series = DailySeries::from_sparse(vec![(date(2026, 1, 30), 1), (date(2026, 2, 2), 2)]);
        assert_eq!(series.len(), 4);
        assert_eq!(series.get(date(2026, 1, 31)), Some(0));
        assert_eq!(series.get(date(2026, 2, 1)), Some(0));
    }

    #[test]
    fn serializes_keyed_by_iso_date() {
        let series = DailySeries::from_sparse(vec![(date(2025, 12, 29), 42), (date(2025, 12, 30), 7)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2025-12-29":42,"2025-12-30":7}"#);
    }
}
