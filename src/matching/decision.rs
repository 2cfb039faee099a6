//! The match/connection state machine.
//!
//! A pair moves `NoMatch -> Pending -> {Accepted, Rejected}`. Each side's
//! latest action is stored on the pair's single match row and the visible
//! status is derived from both: any rejection rejects the pair, two likes
//! accept it. The first decision that leaves both sides liking creates the
//! pair's one connection.

use chrono::{DateTime, Utc};

use crate::db::{self, Repository};
use crate::errors::AppError;
use crate::models::{Connection, DecisionAction, DecisionOutcome, Match, MatchStatus, User};

use super::{scorer, PairKey, PairLocks};

pub const INITIAL_INTERACTION_LEVEL: &str = "initial";
pub const INITIAL_COLLABORATION_STATUS: &str = "pending";

/// Outcome of applying one decision to a pair's current row.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub record: Match,
    /// No row existed for the pair before this decision.
    pub created: bool,
    pub is_mutual: bool,
}

/// Status of a pair given both sides' latest actions.
pub fn derive_status(
    first: Option<DecisionAction>,
    second: Option<DecisionAction>,
) -> MatchStatus {
    match (first, second) {
        (Some(DecisionAction::Reject), _) | (_, Some(DecisionAction::Reject)) => {
            MatchStatus::Rejected
        }
        (Some(DecisionAction::Like), Some(DecisionAction::Like)) => MatchStatus::Accepted,
        _ => MatchStatus::Pending,
    }
}

/// Apply `subject`'s decision about `target` to the pair's current row.
///
/// `new_id` is only called when the pair has no row yet.
pub fn apply_decision(
    existing: Option<Match>,
    subject_id: &str,
    target_id: &str,
    action: DecisionAction,
    compatibility: u8,
    now: DateTime<Utc>,
    new_id: impl FnOnce() -> String,
) -> Transition {
    let previous = existing.as_ref().map(|record| record.status);
    let (record, created) = match existing {
        Some(mut record) => {
            if record.user1_id == subject_id {
                record.user1_action = Some(action);
            } else {
                record.user2_action = Some(action);
            }
            record.status = derive_status(record.user1_action, record.user2_action);
            record.updated_at = now;
            (record, false)
        }
        None => {
            let record = Match {
                id: new_id(),
                user1_id: subject_id.to_string(),
                user2_id: target_id.to_string(),
                pair_key: PairKey::new(subject_id, target_id).to_string(),
                status: derive_status(Some(action), None),
                compatibility: compatibility as i32,
                user1_action: Some(action),
                user2_action: None,
                created_at: now,
                updated_at: now,
            };
            (record, true)
        }
    };

    // Mutual only on the decision that promotes the pair into `accepted`.
    let is_mutual = action == DecisionAction::Like
        && record.status == MatchStatus::Accepted
        && previous != Some(MatchStatus::Accepted);
    Transition {
        record,
        created,
        is_mutual,
    }
}

/// Record `subject`'s decision about `target_id`.
///
/// The read of the pair's row, the write of the new state and the optional
/// connection insert run in one transaction while the pair's lock is held.
pub async fn decide(
    repo: &Repository,
    locks: &PairLocks,
    subject: &User,
    target_id: &str,
    action: DecisionAction,
    now: DateTime<Utc>,
) -> Result<DecisionOutcome, AppError> {
    if target_id == subject.id {
        return Err(AppError::Validation(
            "Cannot make a decision about yourself".to_string(),
        ));
    }

    let target = repo
        .get_user(target_id)
        .await?
        .filter(|target| target.community_id == subject.community_id)
        .ok_or_else(|| AppError::NotFound(format!("Target user {} not found", target_id)))?;

    let pair = PairKey::new(&subject.id, &target.id);
    let compatibility = scorer::compatibility(subject, &target);

    let _guard = locks.lock(&pair).await;
    let mut tx = repo.begin().await?;

    let existing = db::find_match_by_pair(&mut tx, &pair).await?;
    let transition = apply_decision(
        existing,
        &subject.id,
        &target.id,
        action,
        compatibility,
        now,
        || uuid::Uuid::new_v4().to_string(),
    );

    if transition.created {
        db::insert_match(&mut tx, &transition.record).await?;
    } else {
        db::update_match_decision(&mut tx, &transition.record).await?;
    }

    if transition.is_mutual && db::find_connection_by_pair(&mut tx, &pair).await?.is_none() {
        let connection = Connection {
            id: uuid::Uuid::new_v4().to_string(),
            match_id: transition.record.id.clone(),
            pair_key: pair.to_string(),
            interaction_level: INITIAL_INTERACTION_LEVEL.to_string(),
            collaboration_status: INITIAL_COLLABORATION_STATUS.to_string(),
            created_at: now,
        };
        db::insert_connection(&mut tx, &connection).await?;
        tracing::info!(pair = %pair, match_id = %connection.match_id, "Mutual match connected");
    }

    tx.commit().await?;

    tracing::debug!(
        subject = %subject.id,
        target = %target.id,
        action = action.as_str(),
        status = transition.record.status.as_str(),
        "Decision recorded"
    );

    Ok(DecisionOutcome {
        record: transition.record,
        action,
        is_mutual: transition.is_mutual,
    })
}
