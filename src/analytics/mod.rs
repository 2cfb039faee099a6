//! Descriptive analytics over match and connection history.
//!
//! Every view is a pure reduction over records already fetched from the
//! store, evaluated against an explicit `now`.

pub mod community;
pub mod user;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::models::{DateBucket, LabelCount, MatchHistoryEntry};

pub use community::community_analytics;
pub use user::user_analytics;

const TREND_WINDOW_DAYS: i64 = 30;
const WEEK_DAYS: i64 = 7;

/// The trailing windows analytics are measured over.
#[derive(Debug, Clone, Copy)]
pub struct Windows {
    this_week_start: DateTime<Utc>,
    last_week_start: DateTime<Utc>,
    trend_start: DateTime<Utc>,
}

impl Windows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            this_week_start: now - Duration::days(WEEK_DAYS),
            last_week_start: now - Duration::days(2 * WEEK_DAYS),
            trend_start: now - Duration::days(TREND_WINDOW_DAYS),
        }
    }

    pub fn in_this_week(&self, at: DateTime<Utc>) -> bool {
        at >= self.this_week_start
    }

    pub fn in_last_week(&self, at: DateTime<Utc>) -> bool {
        at >= self.last_week_start && at < self.this_week_start
    }

    pub fn in_trend(&self, at: DateTime<Utc>) -> bool {
        at >= self.trend_start
    }
}

/// Round to two decimals, halves rounding up.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Percentage change from `previous` to `current`.
///
/// With no previous activity any current activity counts as 100% growth.
pub fn growth_rate(current: usize, previous: usize) -> f64 {
    if previous > 0 {
        round2((current as f64 - previous as f64) / previous as f64 * 100.0)
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

/// `part / whole * 100`, or 0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

/// Mean compatibility over matches that were actually scored.
pub fn average_compatibility(history: &[MatchHistoryEntry]) -> f64 {
    let scores: Vec<i32> = history
        .iter()
        .map(|entry| entry.record.compatibility)
        .filter(|score| *score > 0)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    round2(total as f64 / scores.len() as f64)
}

/// Count matches per UTC calendar date, ascending by date.
pub fn daily_buckets<'a>(history: impl IntoIterator<Item = &'a MatchHistoryEntry>) -> Vec<DateBucket> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in history {
        let date = entry.record.created_at.date_naive().format("%Y-%m-%d").to_string();
        *counts.entry(date).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DateBucket { date, count })
        .collect()
}

/// The `limit` most frequent labels, ties in first-seen order.
pub fn top_labels<'a>(labels: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<LabelCount> {
    let mut order: Vec<LabelCount> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for label in labels {
        match index.get(label) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(label, order.len());
                order.push(LabelCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable, so equal counts keep first-seen order.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(limit);
    order
}

/// Trend-window matches, newest first.
pub fn most_recent<'a>(
    history: &'a [MatchHistoryEntry],
    windows: &Windows,
    limit: usize,
) -> Vec<&'a MatchHistoryEntry> {
    let mut recent: Vec<&MatchHistoryEntry> = history
        .iter()
        .filter(|entry| windows.in_trend(entry.record.created_at))
        .collect();
    recent.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    recent.truncate(limit);
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use crate::testing::{history, now};
    use chrono::TimeZone;

    #[test]
    fn test_growth_rate_boundaries() {
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(3, 0), 100.0);
        assert_eq!(growth_rate(10, 5), 100.0);
        assert_eq!(growth_rate(2, 4), -50.0);
        assert_eq!(growth_rate(1, 3), -66.67);
    }

    #[test]
    fn test_round2_rounds_half_up() {
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(66.666), 66.67);
        assert_eq!(round2(12.5), 12.5);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn test_percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
    }

    #[test]
    fn test_average_compatibility_skips_unscored() {
        let entries = vec![
            history("m1", "a", "b", MatchStatus::Pending, 0, now(), false),
            history("m2", "a", "c", MatchStatus::Pending, 40, now(), false),
            history("m3", "a", "d", MatchStatus::Pending, 45, now(), false),
        ];
        assert_eq!(average_compatibility(&entries), 42.5);
        assert_eq!(average_compatibility(&entries[..1]), 0.0);
    }

    #[test]
    fn test_same_date_collapses_into_one_bucket() {
        let morning = Utc.with_ymd_and_hms(2024, 6, 10, 0, 5, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 6, 10, 23, 55, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        let entries = vec![
            history("m1", "a", "b", MatchStatus::Pending, 0, night, false),
            history("m2", "a", "c", MatchStatus::Pending, 0, earlier, false),
            history("m3", "a", "d", MatchStatus::Pending, 0, morning, false),
        ];
        let buckets = daily_buckets(&entries);
        assert_eq!(
            buckets,
            vec![
                DateBucket {
                    date: "2024-06-02".into(),
                    count: 1
                },
                DateBucket {
                    date: "2024-06-10".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_top_labels_ties_keep_first_seen_order() {
        let labels = ["b", "a", "c", "a", "b", "d"];
        let top = top_labels(labels, 3);
        let flat: Vec<(&str, usize)> = top.iter().map(|l| (l.label.as_str(), l.count)).collect();
        assert_eq!(flat, vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_windows_split_weeks() {
        let windows = Windows::ending_at(now());
        assert!(windows.in_this_week(now() - Duration::days(7)));
        assert!(!windows.in_last_week(now() - Duration::days(7)));
        assert!(windows.in_last_week(now() - Duration::days(8)));
        assert!(!windows.in_last_week(now() - Duration::days(15)));
        assert!(windows.in_trend(now() - Duration::days(30)));
        assert!(!windows.in_trend(now() - Duration::days(31)));
    }

    #[test]
    fn test_most_recent_is_newest_first_within_window() {
        let entries = vec![
            history("old", "a", "b", MatchStatus::Pending, 0, now() - Duration::days(40), false),
            history("m1", "a", "c", MatchStatus::Pending, 0, now() - Duration::days(3), false),
            history("m2", "a", "d", MatchStatus::Pending, 0, now() - Duration::days(1), false),
        ];
        let windows = Windows::ending_at(now());
        let recent: Vec<&str> = most_recent(&entries, &windows, 5)
            .iter()
            .map(|e| e.record.id.as_str())
            .collect();
        assert_eq!(recent, vec!["m2", "m1"]);
    }
}
