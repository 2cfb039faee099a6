//! Analytics for a whole community.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{
    CommunityActivity, CommunityAnalytics, CommunityGrowth, CommunityOverview, MatchHistoryEntry,
    MatchStatus, TopUser, Trends, User,
};

use super::{
    average_compatibility, daily_buckets, growth_rate, most_recent, percentage, round2,
    top_labels, Windows,
};

pub const TOP_LABELS: usize = 10;
pub const TOP_USERS: usize = 5;
pub const RECENT_ACTIVITY: usize = 10;

/// Summarize a community from its members and every match touching them.
///
/// `users` should be in a stable order (the store lists them oldest first);
/// ties in the rankings keep that order.
pub fn community_analytics(
    users: &[User],
    history: &[MatchHistoryEntry],
    now: DateTime<Utc>,
) -> CommunityAnalytics {
    let windows = Windows::ending_at(now);
    let by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    let total_users = users.len();
    let total_matches = history.len();
    let connections = history.iter().filter(|entry| entry.connected).count();
    let average_matches_per_user = if total_users > 0 {
        round2(total_matches as f64 / total_users as f64)
    } else {
        0.0
    };
    let overview = CommunityOverview {
        total_users,
        total_matches,
        accepted_matches: history
            .iter()
            .filter(|entry| entry.record.status == MatchStatus::Accepted)
            .count(),
        pending_matches: history
            .iter()
            .filter(|entry| entry.record.status == MatchStatus::Pending)
            .count(),
        connections,
        average_matches_per_user,
        connection_rate: percentage(connections, total_matches),
        average_compatibility: average_compatibility(history),
    };

    let new_users_this_week = users
        .iter()
        .filter(|u| windows.in_this_week(u.created_at))
        .count();
    let new_users_last_week = users
        .iter()
        .filter(|u| windows.in_last_week(u.created_at))
        .count();
    let growth = CommunityGrowth {
        new_users_this_week,
        new_users_last_week,
        user_growth: growth_rate(new_users_this_week, new_users_last_week),
    };

    let trends = Trends {
        chart_data: daily_buckets(
            history
                .iter()
                .filter(|entry| windows.in_trend(entry.record.created_at)),
        ),
        top_goals: top_labels(
            users.iter().flat_map(|u| u.goals.iter().map(String::as_str)),
            TOP_LABELS,
        ),
        top_skills: top_labels(
            users.iter().flat_map(|u| u.skills.iter().map(String::as_str)),
            TOP_LABELS,
        ),
    };

    let recent_activity = most_recent(history, &windows, RECENT_ACTIVITY)
        .into_iter()
        .map(|entry| CommunityActivity {
            id: entry.record.id.clone(),
            status: entry.record.status,
            compatibility: entry.record.compatibility,
            created_at: entry.record.created_at,
            user1: by_id.get(entry.record.user1_id.as_str()).map(|u| u.summary()),
            user2: by_id.get(entry.record.user2_id.as_str()).map(|u| u.summary()),
        })
        .collect();

    CommunityAnalytics {
        overview,
        growth,
        trends,
        top_users: top_users(users, history),
        recent_activity,
    }
}

/// Members with the most match rows, ties in `users` order.
fn top_users(users: &[User], history: &[MatchHistoryEntry]) -> Vec<TopUser> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in history {
        *counts.entry(entry.record.user1_id.as_str()).or_default() += 1;
        *counts.entry(entry.record.user2_id.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<TopUser> = users
        .iter()
        .map(|u| TopUser {
            username: u.username.clone(),
            matches: counts.get(u.id.as_str()).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| b.matches.cmp(&a.matches));
    ranked.truncate(TOP_USERS);
    ranked
}
