//! Builders shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::matching::PairKey;
use crate::models::{Match, MatchHistoryEntry, MatchStatus, User};

pub const COMMUNITY: &str = "community-1";

/// Midday on 2024-06-15 UTC; every fixture timestamp is relative to it.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn user(id: &str, goals: &[&str], skills: &[&str]) -> User {
    User {
        id: id.to_string(),
        external_id: format!("ext-{}", id),
        username: format!("{}-name", id),
        community_id: COMMUNITY.to_string(),
        goals: goals.iter().map(|s| s.to_string()).collect(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        location: None,
        experience: None,
        bio: None,
        created_at: now(),
        updated_at: now(),
        preferences: None,
    }
}

pub fn history(
    id: &str,
    user1: &str,
    user2: &str,
    status: MatchStatus,
    compatibility: i32,
    created_at: DateTime<Utc>,
    connected: bool,
) -> MatchHistoryEntry {
    MatchHistoryEntry {
        record: Match {
            id: id.to_string(),
            user1_id: user1.to_string(),
            user2_id: user2.to_string(),
            pair_key: PairKey::new(user1, user2).to_string(),
            status,
            compatibility,
            user1_action: None,
            user2_action: None,
            created_at,
            updated_at: created_at,
        },
        connected,
    }
}
