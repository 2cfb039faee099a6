//! Analytics snapshot shapes. Derived on every request, never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MatchStatus, UserSummary};

/// Match counters for a single member.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserOverview {
    pub total_matches: usize,
    pub accepted_matches: usize,
    pub pending_matches: usize,
    pub rejected_matches: usize,
    pub connections: usize,
    pub connection_rate: f64,
    pub average_compatibility: f64,
}

/// Match counters for a whole community.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityOverview {
    pub total_users: usize,
    pub total_matches: usize,
    pub accepted_matches: usize,
    pub pending_matches: usize,
    pub connections: usize,
    pub average_matches_per_user: f64,
    pub connection_rate: f64,
    pub average_compatibility: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowth {
    pub matches_this_week: usize,
    pub matches_last_week: usize,
    pub weekly_growth: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGrowth {
    pub new_users_this_week: usize,
    pub new_users_last_week: usize,
    pub user_growth: f64,
}

/// Matches created on one UTC calendar date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateBucket {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub chart_data: Vec<DateBucket>,
    pub top_goals: Vec<LabelCount>,
    pub top_skills: Vec<LabelCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub username: String,
    pub matches: usize,
}

/// Recent match as seen by one of its participants.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: String,
    pub status: MatchStatus,
    pub compatibility: i32,
    pub created_at: DateTime<Utc>,
    pub other_user: Option<UserSummary>,
}

/// Recent match in a community feed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityActivity {
    pub id: String,
    pub status: MatchStatus,
    pub compatibility: i32,
    pub created_at: DateTime<Utc>,
    pub user1: Option<UserSummary>,
    pub user2: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub overview: UserOverview,
    pub growth: UserGrowth,
    pub trends: Trends,
    pub recent_activity: Vec<UserActivity>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityAnalytics {
    pub overview: CommunityOverview,
    pub growth: CommunityGrowth,
    pub trends: Trends,
    pub top_users: Vec<TopUser>,
    pub recent_activity: Vec<CommunityActivity>,
}
