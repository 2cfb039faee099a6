//! Compatibility scoring between a viewer and a prospect.
//!
//! The score is additive and capped at [`MAX_SCORE`]. It is deliberately not
//! symmetric: skills the viewer has and the prospect lacks earn points, so
//! callers must always pass the viewer first.

use std::collections::HashSet;

use crate::models::User;

pub const MAX_SCORE: u32 = 100;

const SHARED_GOAL: u32 = 20;
const SHARED_SKILL: u32 = 10;
const OFFERED_SKILL: u32 = 5;
const SAME_LOCATION: u32 = 15;
const NEARBY_LOCATION: u32 = 10;
const CLOSE_EXPERIENCE: u32 = 10;
const MODERATE_EXPERIENCE: u32 = 5;
const SHARED_INTEREST: u32 = 8;

/// Score how well `candidate` suits `subject`, in `0..=100`.
pub fn compatibility(subject: &User, candidate: &User) -> u8 {
    let mut score = 0;

    let (shared_goals, _) = overlap(&subject.goals, &candidate.goals);
    score += shared_goals * SHARED_GOAL;

    let (shared_skills, offered_skills) = overlap(&subject.skills, &candidate.skills);
    score += shared_skills * SHARED_SKILL;
    score += offered_skills * OFFERED_SKILL;

    score += location_points(subject.location.as_deref(), candidate.location.as_deref());
    score += experience_points(subject.experience, candidate.experience);

    if let (Some(mine), Some(theirs)) = (&subject.preferences, &candidate.preferences) {
        if !mine.interests.is_empty() && !theirs.interests.is_empty() {
            let (shared_interests, _) = overlap(&mine.interests, &theirs.interests);
            score += shared_interests * SHARED_INTEREST;
        }
    }

    score.min(MAX_SCORE) as u8
}

/// Count distinct values of `mine` found in `theirs`, and those missing from it.
fn overlap(mine: &[String], theirs: &[String]) -> (u32, u32) {
    let theirs: HashSet<&str> = theirs.iter().map(String::as_str).collect();
    let mine: HashSet<&str> = mine.iter().map(String::as_str).collect();
    let shared = mine.iter().filter(|v| theirs.contains(*v)).count() as u32;
    (shared, mine.len() as u32 - shared)
}

fn location_points(mine: Option<&str>, theirs: Option<&str>) -> u32 {
    let (Some(mine), Some(theirs)) = (mine, theirs) else {
        return 0;
    };
    if mine.is_empty() || theirs.is_empty() {
        return 0;
    }
    if mine == theirs {
        return SAME_LOCATION;
    }
    let (mine, theirs) = (mine.to_lowercase(), theirs.to_lowercase());
    if mine.contains(&theirs) || theirs.contains(&mine) {
        NEARBY_LOCATION
    } else {
        0
    }
}

fn experience_points(mine: Option<i32>, theirs: Option<i32>) -> u32 {
    match (mine, theirs) {
        (Some(a), Some(b)) => match (a - b).abs() {
            0..=2 => CLOSE_EXPERIENCE,
            3..=5 => MODERATE_EXPERIENCE,
            _ => 0,
        },
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preferences;
    use crate::testing::user;

    #[test]
    fn test_documented_example_scores_sixty() {
        let mut subject = user("s", &["A", "B"], &["X", "Y"]);
        subject.location = Some("Austin".into());
        subject.experience = Some(2);
        let mut candidate = user("c", &["A"], &["X", "Z"]);
        candidate.location = Some("Austin".into());
        candidate.experience = Some(3);

        assert_eq!(compatibility(&subject, &candidate), 60);
    }

    #[test]
    fn test_score_is_asymmetric() {
        let subject = user("s", &[], &["X", "Y", "W"]);
        let candidate = user("c", &[], &["X"]);
        assert_eq!(compatibility(&subject, &candidate), 10 + 2 * 5);
        assert_eq!(compatibility(&candidate, &subject), 10);
    }

    #[test]
    fn test_location_substring_is_case_insensitive() {
        let mut subject = user("s", &[], &[]);
        subject.location = Some("Austin, TX".into());
        let mut candidate = user("c", &[], &[]);
        candidate.location = Some("austin".into());
        assert_eq!(compatibility(&subject, &candidate), 10);

        candidate.location = Some("AUSTIN, TX".into());
        assert_eq!(compatibility(&subject, &candidate), 10);

        candidate.location = Some("Berlin".into());
        assert_eq!(compatibility(&subject, &candidate), 0);
    }

    #[test]
    fn test_experience_tiers() {
        let mut subject = user("s", &[], &[]);
        let mut candidate = user("c", &[], &[]);
        subject.experience = Some(1);
        candidate.experience = Some(4);
        assert_eq!(compatibility(&subject, &candidate), 5);
        candidate.experience = None;
        assert_eq!(compatibility(&subject, &candidate), 0);
    }

    #[test]
    fn test_interests_need_both_sides() {
        let mut subject = user("s", &[], &[]);
        let mut candidate = user("c", &[], &[]);
        subject.preferences = Some(Preferences {
            interests: vec!["music".into(), "chess".into()],
            ..Preferences::default()
        });
        assert_eq!(compatibility(&subject, &candidate), 0);

        candidate.preferences = Some(Preferences {
            interests: vec!["chess".into(), "music".into(), "golf".into()],
            ..Preferences::default()
        });
        assert_eq!(compatibility(&subject, &candidate), 16);
    }

    #[test]
    fn test_score_is_capped() {
        let goals = ["a", "b", "c", "d", "e", "f"];
        let subject = user("s", &goals, &["x"]);
        let candidate = user("c", &goals, &["x"]);
        assert_eq!(compatibility(&subject, &candidate), 100);
    }

    #[test]
    fn test_empty_profiles_score_zero() {
        let subject = user("s", &[], &[]);
        let candidate = user("c", &[], &[]);
        assert_eq!(compatibility(&subject, &candidate), 0);
    }

    #[test]
    fn test_score_stays_in_bounds_over_many_profiles() {
        let labels = ["a", "b", "c", "d", "e", "f", "g"];
        for i in 0..labels.len() {
            for j in 0..labels.len() {
                let mut subject = user("s", &labels[..i], &labels[j..]);
                subject.experience = Some((i % 4) as i32 + 1);
                let mut candidate = user("c", &labels[j..], &labels[..i]);
                candidate.experience = Some((j % 4) as i32 + 1);
                let score = compatibility(&subject, &candidate);
                assert!(score <= 100, "score {} out of bounds", score);
            }
        }
    }
}
