//! Analytics for a single member.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    MatchHistoryEntry, MatchStatus, Trends, User, UserActivity, UserAnalytics, UserGrowth,
    UserOverview,
};

use super::{
    average_compatibility, daily_buckets, growth_rate, most_recent, percentage, top_labels,
    Windows,
};

pub const TOP_LABELS: usize = 5;
pub const RECENT_ACTIVITY: usize = 5;

/// Summarize `subject`'s matches.
///
/// `counterparts` maps user ids to the other participants of those matches;
/// a counterpart missing from it is left out of label counts and shown as
/// unknown in the activity feed.
pub fn user_analytics(
    subject: &User,
    history: &[MatchHistoryEntry],
    counterparts: &HashMap<String, User>,
    now: DateTime<Utc>,
) -> UserAnalytics {
    let windows = Windows::ending_at(now);
    let count_status = |status: MatchStatus| {
        history
            .iter()
            .filter(|entry| entry.record.status == status)
            .count()
    };

    let total_matches = history.len();
    let connections = history.iter().filter(|entry| entry.connected).count();
    let overview = UserOverview {
        total_matches,
        accepted_matches: count_status(MatchStatus::Accepted),
        pending_matches: count_status(MatchStatus::Pending),
        rejected_matches: count_status(MatchStatus::Rejected),
        connections,
        connection_rate: percentage(connections, total_matches),
        average_compatibility: average_compatibility(history),
    };

    let matches_this_week = history
        .iter()
        .filter(|entry| windows.in_this_week(entry.record.created_at))
        .count();
    let matches_last_week = history
        .iter()
        .filter(|entry| windows.in_last_week(entry.record.created_at))
        .count();
    let growth = UserGrowth {
        matches_this_week,
        matches_last_week,
        weekly_growth: growth_rate(matches_this_week, matches_last_week),
    };

    let met: Vec<&User> = history
        .iter()
        .filter_map(|entry| counterparts.get(entry.record.counterpart_of(&subject.id)))
        .collect();
    let trends = Trends {
        chart_data: daily_buckets(
            history
                .iter()
                .filter(|entry| windows.in_trend(entry.record.created_at)),
        ),
        top_goals: top_labels(
            met.iter().copied().flat_map(|u| u.goals.iter().map(String::as_str)),
            TOP_LABELS,
        ),
        top_skills: top_labels(
            met.iter().copied().flat_map(|u| u.skills.iter().map(String::as_str)),
            TOP_LABELS,
        ),
    };

    let recent_activity = most_recent(history, &windows, RECENT_ACTIVITY)
        .into_iter()
        .map(|entry| UserActivity {
            id: entry.record.id.clone(),
            status: entry.record.status,
            compatibility: entry.record.compatibility,
            created_at: entry.record.created_at,
            other_user: counterparts
                .get(entry.record.counterpart_of(&subject.id))
                .map(User::summary),
        })
        .collect();

    UserAnalytics {
        overview,
        growth,
        trends,
        recent_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{history, now, user};
    use chrono::Duration;

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn fixture() -> (User, Vec<MatchHistoryEntry>, HashMap<String, User>) {
        let subject = user("s", &["grow"], &["rust"]);
        let others = vec![
            user("a", &["launch", "grow"], &["design"]),
            user("b", &["launch"], &["design", "sales"]),
            user("c", &["hire"], &["sales"]),
        ];
        let entries = vec![
            history("m1", "s", "a", MatchStatus::Accepted, 60, days_ago(10), true),
            history("m2", "b", "s", MatchStatus::Pending, 40, days_ago(2), false),
            history("m3", "s", "c", MatchStatus::Rejected, 0, days_ago(1), false),
            history("m4", "s", "x", MatchStatus::Pending, 20, days_ago(45), false),
        ];
        let counterparts = others.into_iter().map(|u| (u.id.clone(), u)).collect();
        (subject, entries, counterparts)
    }

    #[test]
    fn test_overview_counts() {
        let (subject, entries, counterparts) = fixture();
        let analytics = user_analytics(&subject, &entries, &counterparts, now());
        let o = analytics.overview;
        assert_eq!(o.total_matches, 4);
        assert_eq!(o.accepted_matches, 1);
        assert_eq!(o.pending_matches, 2);
        assert_eq!(o.rejected_matches, 1);
        assert_eq!(o.connections, 1);
        assert_eq!(o.connection_rate, 25.0);
        assert_eq!(o.average_compatibility, 40.0);
    }

    #[test]
    fn test_growth_compares_trailing_weeks() {
        let (subject, entries, counterparts) = fixture();
        let growth = user_analytics(&subject, &entries, &counterparts, now()).growth;
        assert_eq!(growth.matches_this_week, 2);
        assert_eq!(growth.matches_last_week, 1);
        assert_eq!(growth.weekly_growth, 100.0);
    }

    #[test]
    fn test_trends_use_counterparts() {
        let (subject, entries, counterparts) = fixture();
        let trends = user_analytics(&subject, &entries, &counterparts, now()).trends;
        assert_eq!(trends.chart_data.len(), 3);
        assert_eq!(trends.top_goals[0].label, "launch");
        assert_eq!(trends.top_goals[0].count, 2);
        let skills: Vec<&str> = trends.top_skills.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(skills, vec!["design", "sales"]);
    }

    #[test]
    fn test_recent_activity_names_counterpart() {
        let (subject, entries, counterparts) = fixture();
        let activity = user_analytics(&subject, &entries, &counterparts, now()).recent_activity;
        let ids: Vec<&str> = activity.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m2", "m1"]);
        assert_eq!(activity[1].other_user.as_ref().unwrap().username, "b-name");
    }

    #[test]
    fn test_no_history_is_all_zero() {
        let subject = user("s", &[], &[]);
        let analytics = user_analytics(&subject, &[], &HashMap::new(), now());
        assert_eq!(analytics.overview.total_matches, 0);
        assert_eq!(analytics.overview.connection_rate, 0.0);
        assert_eq!(analytics.growth.weekly_growth, 0.0);
        assert!(analytics.trends.chart_data.is_empty());
        assert!(analytics.recent_activity.is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let (subject, entries, counterparts) = fixture();
        assert_eq!(
            user_analytics(&subject, &entries, &counterparts, now()),
            user_analytics(&subject, &entries, &counterparts, now())
        );
    }
}
