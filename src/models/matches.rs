//! Match, connection and decision models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Visible state of a relationship attempt between two users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MatchStatus::Pending),
            "accepted" => Some(MatchStatus::Accepted),
            "rejected" => Some(MatchStatus::Rejected),
            _ => None,
        }
    }
}

/// A member's decision about a prospect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Like,
    Reject,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Like => "like",
            DecisionAction::Reject => "reject",
        }
    }

    /// Parse a decision; "pass" is the swipe deck's name for a rejection.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(DecisionAction::Like),
            "reject" | "pass" => Some(DecisionAction::Reject),
            _ => None,
        }
    }
}

/// One logical relationship per unordered user pair.
///
/// `user1_id` is the member who decided first. Each side's latest action is
/// kept so that `status` can be derived without guessing who changed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub pair_key: String,
    pub status: MatchStatus,
    pub compatibility: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user1_action: Option<DecisionAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user2_action: Option<DecisionAction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// The other participant, as seen from `user_id`.
    pub fn counterpart_of(&self, user_id: &str) -> &str {
        if self.user1_id == user_id {
            &self.user2_id
        } else {
            &self.user1_id
        }
    }
}

/// Durable record of a mutual match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub match_id: String,
    pub pair_key: String,
    pub interaction_level: String,
    pub collaboration_status: String,
    pub created_at: DateTime<Utc>,
}

/// A stored match together with whether it produced a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchHistoryEntry {
    pub record: Match,
    pub connected: bool,
}

/// Request body for a decision about a prospect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[serde(default)]
    pub target_user_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Result of a decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    #[serde(rename = "match")]
    pub record: Match,
    pub action: DecisionAction,
    pub is_mutual: bool,
}

/// A ranked prospect offered to a member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(flatten)]
    pub profile: User,
    pub compatibility_score: u8,
}
