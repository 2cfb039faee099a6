//! Community member profile and matching preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Lowest and highest experience ordinal a profile may declare.
pub const EXPERIENCE_MIN: i32 = 1;
pub const EXPERIENCE_MAX: i32 = 4;

/// A community member as held by the profile store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Verified id issued by the identity provider
    pub external_id: String,
    pub username: String,
    pub community_id: String,
    pub goals: Vec<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl User {
    /// Only members with at least one goal and one skill are offered as candidates.
    pub fn has_complete_profile(&self) -> bool {
        !self.goals.is_empty() && !self.skills.is_empty()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

/// Matching preferences, one-to-one with a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_radius: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
}

/// Minimal user reference attached to analytics rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// Identity values supplied by the identity provider on sync.
#[derive(Debug, Clone)]
pub struct SyncUser {
    pub external_id: String,
    pub username: String,
    pub community_id: String,
}

/// Request body for updating the caller's profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub goals: Option<Vec<String>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub experience: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: Option<PreferencesRequest>,
}

/// Preferences as sent by the profile form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub experience_range: Option<String>,
    #[serde(default)]
    pub location_radius: Option<i32>,
    #[serde(default)]
    pub age_range: Option<String>,
}

/// A validated, normalized profile edit ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub goals: Vec<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub preferences: Option<Preferences>,
}

impl UpdateProfileRequest {
    /// Validate required fields and normalize set-valued fields.
    pub fn validate(self) -> Result<ProfileUpdate, AppError> {
        let (Some(goals), Some(skills)) = (self.goals, self.skills) else {
            return Err(AppError::Validation(
                "Goals and skills are required".to_string(),
            ));
        };

        if let Some(level) = self.experience {
            if !(EXPERIENCE_MIN..=EXPERIENCE_MAX).contains(&level) {
                return Err(AppError::Validation(format!(
                    "Experience must be between {} and {}",
                    EXPERIENCE_MIN, EXPERIENCE_MAX
                )));
            }
        }

        if let Some(radius) = self.preferences.as_ref().and_then(|p| p.location_radius) {
            if radius < 0 {
                return Err(AppError::Validation(
                    "Location radius cannot be negative".to_string(),
                ));
            }
        }

        Ok(ProfileUpdate {
            goals: normalize_set(goals),
            skills: normalize_set(skills),
            location: non_blank(self.location),
            experience: self.experience,
            bio: non_blank(self.bio),
            preferences: self.preferences.map(|p| Preferences {
                interests: normalize_set(p.interests.unwrap_or_default()),
                experience_range: non_blank(p.experience_range),
                location_radius: p.location_radius,
                age_range: non_blank(p.age_range),
            }),
        })
    }
}

/// Trim entries, drop blanks and keep the first occurrence of each value.
pub fn normalize_set(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !out.iter().any(|v| v == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(goals: Option<Vec<&str>>, skills: Option<Vec<&str>>) -> UpdateProfileRequest {
        UpdateProfileRequest {
            goals: goals.map(|g| g.into_iter().map(String::from).collect()),
            skills: skills.map(|s| s.into_iter().map(String::from).collect()),
            location: None,
            experience: None,
            bio: None,
            preferences: None,
        }
    }

    #[test]
    fn test_normalize_set_dedupes_and_trims() {
        let values = vec![" rust ".into(), "".into(), "rust".into(), "go".into()];
        assert_eq!(normalize_set(values), vec!["rust", "go"]);
    }

    #[test]
    fn test_validate_requires_goals_and_skills() {
        let err = request(None, Some(vec!["x"])).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = request(Some(vec!["a"]), None).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_experience_range() {
        let mut req = request(Some(vec!["a"]), Some(vec!["x"]));
        req.experience = Some(5);
        assert!(req.clone().validate().is_err());
        req.experience = Some(4);
        assert_eq!(req.validate().unwrap().experience, Some(4));
    }

    #[test]
    fn test_validate_blank_location_becomes_none() {
        let mut req = request(Some(vec!["a"]), Some(vec!["x"]));
        req.location = Some("   ".into());
        req.preferences = Some(PreferencesRequest {
            interests: None,
            experience_range: None,
            location_radius: Some(25),
            age_range: None,
        });
        let update = req.validate().unwrap();
        assert_eq!(update.location, None);
        let prefs = update.preferences.unwrap();
        assert!(prefs.interests.is_empty());
        assert_eq!(prefs.location_radius, Some(25));
    }
}
