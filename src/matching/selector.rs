//! Ranked candidate lists for a member.

use std::collections::HashSet;

use crate::db::{Repository, UserFilter};
use crate::errors::AppError;
use crate::models::{Candidate, User};

use super::{scorer, PairKey};

/// Rank the community members `subject` has not decided on yet.
///
/// Members with incomplete profiles are never offered, and neither is anyone
/// who already shares a match row with the subject, whatever its status or
/// direction.
pub async fn select_candidates(
    repo: &Repository,
    subject: &User,
    community_id: &str,
) -> Result<Vec<Candidate>, AppError> {
    let filter = UserFilter {
        exclude_user_id: Some(subject.id.clone()),
        complete_profiles_only: true,
    };
    let pool = repo.list_users_in_community(community_id, &filter).await?;
    let decided = repo.decided_pair_keys(&subject.id).await?;

    let ranked = rank_candidates(subject, pool, &decided);
    tracing::debug!(
        subject = %subject.id,
        community = %community_id,
        candidates = ranked.len(),
        "Ranked candidates"
    );
    Ok(ranked)
}

/// Filter, score and sort a candidate pool. Ties keep the pool's order.
pub fn rank_candidates(
    subject: &User,
    pool: Vec<User>,
    decided: &HashSet<PairKey>,
) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = pool
        .into_iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter(User::has_complete_profile)
        .filter(|candidate| !decided.contains(&PairKey::new(&subject.id, &candidate.id)))
        .map(|candidate| Candidate {
            compatibility_score: scorer::compatibility(subject, &candidate),
            profile: candidate,
        })
        .collect();

    ranked.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::user;

    fn ids(ranked: &[Candidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.profile.id.as_str()).collect()
    }

    #[test]
    fn test_ranks_by_score_descending() {
        let subject = user("s", &["grow"], &["rust"]);
        let pool = vec![
            user("low", &["other"], &["go"]),
            user("high", &["grow"], &["rust"]),
            user("mid", &["grow"], &["go"]),
        ];
        let ranked = rank_candidates(&subject, pool, &HashSet::new());
        assert_eq!(ids(&ranked), vec!["high", "mid", "low"]);
        assert_eq!(ranked[0].compatibility_score, 30);
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let subject = user("s", &["grow"], &["rust"]);
        let pool = vec![
            user("b", &["grow"], &["go"]),
            user("a", &["grow"], &["go"]),
        ];
        let ranked = rank_candidates(&subject, pool, &HashSet::new());
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn test_excludes_decided_pairs_in_either_direction() {
        let subject = user("s", &["grow"], &["rust"]);
        let pool = vec![
            user("a", &["grow"], &["rust"]),
            user("b", &["grow"], &["rust"]),
            user("c", &["grow"], &["rust"]),
        ];
        let decided: HashSet<PairKey> =
            [PairKey::new("s", "a"), PairKey::new("b", "s")].into_iter().collect();
        let ranked = rank_candidates(&subject, pool, &decided);
        assert_eq!(ids(&ranked), vec!["c"]);
    }

    #[test]
    fn test_incomplete_profiles_are_never_offered() {
        let subject = user("s", &["grow"], &["rust"]);
        let pool = vec![
            user("no-goals", &[], &["rust", "go", "c"]),
            user("no-skills", &["grow", "learn"], &[]),
            user("complete", &["x"], &["y"]),
        ];
        let ranked = rank_candidates(&subject, pool, &HashSet::new());
        assert_eq!(ids(&ranked), vec!["complete"]);
    }

    #[test]
    fn test_subject_is_never_its_own_candidate() {
        let subject = user("s", &["grow"], &["rust"]);
        let ranked = rank_candidates(&subject, vec![subject.clone()], &HashSet::new());
        assert!(ranked.is_empty());
    }
}
