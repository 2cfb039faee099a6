//! Database repository for profile, match and connection records.
//!
//! Reads go through [`Repository`]. The writes a decision makes take a
//! connection so they can share the caller's transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::matching::PairKey;
use crate::models::{
    Connection, DecisionAction, Match, MatchHistoryEntry, MatchStatus, Preferences,
    ProfileUpdate, SyncUser, User,
};

const USER_SELECT: &str = r#"
    SELECT u.id, u.external_id, u.username, u.community_id, u.goals, u.skills,
           u.location, u.experience, u.bio, u.created_at, u.updated_at,
           p.user_id AS pref_user_id, p.interests AS pref_interests,
           p.experience_range AS pref_experience_range,
           p.location_radius AS pref_location_radius, p.age_range AS pref_age_range
    FROM users u
    LEFT JOIN preferences p ON p.user_id = u.id
"#;

const MATCH_SELECT: &str = r#"
    SELECT m.id, m.user1_id, m.user2_id, m.pair_key, m.status, m.compatibility,
           m.user1_action, m.user2_action, m.created_at, m.updated_at,
           c.id AS connection_id
    FROM matches m
    LEFT JOIN connections c ON c.match_id = m.id
"#;

/// Restrictions applied when listing a community's members.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub exclude_user_id: Option<String>,
    /// Only members with at least one goal and one skill
    pub complete_profiles_only: bool,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction for a read-then-write sequence.
    ///
    /// The write lock is taken at `BEGIN`, so contention waits on the busy
    /// timeout rather than failing a later lock upgrade with `SQLITE_BUSY_SNAPSHOT`.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    // ==================== USER OPERATIONS ====================

    /// Get a user by internal ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{} WHERE u.id = ?", USER_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Get a user by the identity provider's ID.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!("{} WHERE u.external_id = ?", USER_SELECT);
        let row = sqlx::query(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Get every user whose ID is in `ids`. Unknown IDs are skipped.
    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{} WHERE u.id IN (SELECT value FROM json_each(?)) ORDER BY u.created_at, u.id",
            USER_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(serde_json::to_string(ids)?)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// List a community's members, oldest first.
    pub async fn list_users_in_community(
        &self,
        community_id: &str,
        filter: &UserFilter,
    ) -> Result<Vec<User>, AppError> {
        let mut sql = format!("{} WHERE u.community_id = ?", USER_SELECT);
        if filter.exclude_user_id.is_some() {
            sql.push_str(" AND u.id <> ?");
        }
        if filter.complete_profiles_only {
            sql.push_str(" AND json_array_length(u.goals) > 0 AND json_array_length(u.skills) > 0");
        }
        sql.push_str(" ORDER BY u.created_at, u.id");

        let mut query = sqlx::query(&sql).bind(community_id);
        if let Some(excluded) = &filter.exclude_user_id {
            query = query.bind(excluded);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Create the user on first sight, otherwise refresh its identity fields.
    pub async fn sync_user(&self, identity: &SyncUser, now: DateTime<Utc>) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"INSERT INTO users (id, external_id, username, community_id, goals, skills, created_at, updated_at)
               VALUES (?, ?, ?, ?, '[]', '[]', ?, ?)
               ON CONFLICT(external_id) DO UPDATE SET
                   username = excluded.username,
                   community_id = excluded.community_id,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&id)
        .bind(&identity.external_id)
        .bind(&identity.username)
        .bind(&identity.community_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_user_by_external_id(&identity.external_id)
            .await?
            .ok_or_else(|| AppError::Internal("Synced user could not be read back".to_string()))
    }

    /// Replace a user's profile fields and upsert its preferences.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET goals = ?, skills = ?, location = ?, experience = ?, bio = ?, updated_at = ? WHERE id = ?",
        )
        .bind(serde_json::to_string(&update.goals)?)
        .bind(serde_json::to_string(&update.skills)?)
        .bind(&update.location)
        .bind(update.experience)
        .bind(&update.bio)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        if let Some(prefs) = &update.preferences {
            sqlx::query(
                r#"INSERT INTO preferences (user_id, interests, experience_range, location_radius, age_range, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?)
                   ON CONFLICT(user_id) DO UPDATE SET
                       interests = excluded.interests,
                       experience_range = excluded.experience_range,
                       location_radius = excluded.location_radius,
                       age_range = excluded.age_range,
                       updated_at = excluded.updated_at"#,
            )
            .bind(user_id)
            .bind(serde_json::to_string(&prefs.interests)?)
            .bind(&prefs.experience_range)
            .bind(prefs.location_radius)
            .bind(&prefs.age_range)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    // ==================== MATCH OPERATIONS ====================

    /// Pairs the user already has a match row with, in either direction.
    pub async fn decided_pair_keys(&self, user_id: &str) -> Result<HashSet<PairKey>, AppError> {
        let rows = sqlx::query("SELECT pair_key FROM matches WHERE user1_id = ? OR user2_id = ?")
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| PairKey::from_stored(row.get("pair_key")))
            .collect())
    }

    /// Every match the user takes part in, oldest first.
    pub async fn list_matches_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<MatchHistoryEntry>, AppError> {
        let sql = format!(
            "{} WHERE m.user1_id = ? OR m.user2_id = ? ORDER BY m.created_at, m.id",
            MATCH_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(history_from_row).collect()
    }

    /// Every match with at least one participant in the community, oldest first.
    pub async fn list_matches_in_community(
        &self,
        community_id: &str,
    ) -> Result<Vec<MatchHistoryEntry>, AppError> {
        let sql = format!(
            r#"{} WHERE m.user1_id IN (SELECT id FROM users WHERE community_id = ?)
                  OR m.user2_id IN (SELECT id FROM users WHERE community_id = ?)
               ORDER BY m.created_at, m.id"#,
            MATCH_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(community_id)
            .bind(community_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(history_from_row).collect()
    }
}

// ==================== PAIR TRANSACTION OPERATIONS ====================

/// Find the match row for a pair.
pub async fn find_match_by_pair(
    conn: &mut SqliteConnection,
    pair: &PairKey,
) -> Result<Option<Match>, AppError> {
    let sql = format!("{} WHERE m.pair_key = ?", MATCH_SELECT);
    let row = sqlx::query(&sql)
        .bind(pair.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(match_from_row).transpose()
}

pub async fn insert_match(conn: &mut SqliteConnection, record: &Match) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO matches (id, user1_id, user2_id, pair_key, status, compatibility,
                                user1_action, user2_action, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&record.id)
    .bind(&record.user1_id)
    .bind(&record.user2_id)
    .bind(&record.pair_key)
    .bind(record.status.as_str())
    .bind(record.compatibility)
    .bind(record.user1_action.map(|a| a.as_str()))
    .bind(record.user2_action.map(|a| a.as_str()))
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Persist both sides' actions and the derived status.
pub async fn update_match_decision(
    conn: &mut SqliteConnection,
    record: &Match,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE matches SET status = ?, user1_action = ?, user2_action = ?, updated_at = ? WHERE id = ?",
    )
    .bind(record.status.as_str())
    .bind(record.user1_action.map(|a| a.as_str()))
    .bind(record.user2_action.map(|a| a.as_str()))
    .bind(record.updated_at)
    .bind(&record.id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Match {} not found", record.id)));
    }
    Ok(())
}

pub async fn find_connection_by_pair(
    conn: &mut SqliteConnection,
    pair: &PairKey,
) -> Result<Option<Connection>, AppError> {
    let row = sqlx::query(
        "SELECT id, match_id, pair_key, interaction_level, collaboration_status, created_at FROM connections WHERE pair_key = ?",
    )
    .bind(pair.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(connection_from_row))
}

pub async fn insert_connection(
    conn: &mut SqliteConnection,
    connection: &Connection,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO connections (id, match_id, pair_key, interaction_level, collaboration_status, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&connection.id)
    .bind(&connection.match_id)
    .bind(&connection.pair_key)
    .bind(&connection.interaction_level)
    .bind(&connection.collaboration_status)
    .bind(connection.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, AppError> {
    let goals: String = row.get("goals");
    let skills: String = row.get("skills");
    let pref_user_id: Option<String> = row.get("pref_user_id");
    let preferences = match pref_user_id {
        Some(_) => {
            let interests: Option<String> = row.get("pref_interests");
            Some(Preferences {
                interests: match interests {
                    Some(raw) => parse_json_array("interests", &raw)?,
                    None => Vec::new(),
                },
                experience_range: row.get("pref_experience_range"),
                location_radius: row.get("pref_location_radius"),
                age_range: row.get("pref_age_range"),
            })
        }
        None => None,
    };

    Ok(User {
        id: row.get("id"),
        external_id: row.get("external_id"),
        username: row.get("username"),
        community_id: row.get("community_id"),
        goals: parse_json_array("goals", &goals)?,
        skills: parse_json_array("skills", &skills)?,
        location: row.get("location"),
        experience: row.get("experience"),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        preferences,
    })
}

fn match_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Match, AppError> {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let user1_action: Option<String> = row.get("user1_action");
    let user2_action: Option<String> = row.get("user2_action");

    let status =
        MatchStatus::parse(&status).ok_or_else(|| corrupt_match(&id, "status", &status))?;
    let user1_action = parse_action(&id, "user1_action", user1_action)?;
    let user2_action = parse_action(&id, "user2_action", user2_action)?;

    Ok(Match {
        user1_id: row.get("user1_id"),
        user2_id: row.get("user2_id"),
        pair_key: row.get("pair_key"),
        status,
        compatibility: row.get("compatibility"),
        user1_action,
        user2_action,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        id,
    })
}

fn parse_action(
    match_id: &str,
    column: &str,
    raw: Option<String>,
) -> Result<Option<DecisionAction>, AppError> {
    match raw {
        Some(raw) => DecisionAction::parse(&raw)
            .map(Some)
            .ok_or_else(|| corrupt_match(match_id, column, &raw)),
        None => Ok(None),
    }
}

fn corrupt_match(match_id: &str, column: &str, value: &str) -> AppError {
    tracing::error!(match_id, column, value, "Stored match holds an unknown value");
    AppError::Internal("Stored match record could not be read".to_string())
}

fn history_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<MatchHistoryEntry, AppError> {
    let connection_id: Option<String> = row.get("connection_id");
    Ok(MatchHistoryEntry {
        record: match_from_row(row)?,
        connected: connection_id.is_some(),
    })
}

fn connection_from_row(row: &sqlx::sqlite::SqliteRow) -> Connection {
    Connection {
        id: row.get("id"),
        match_id: row.get("match_id"),
        pair_key: row.get("pair_key"),
        interaction_level: row.get("interaction_level"),
        collaboration_status: row.get("collaboration_status"),
        created_at: row.get("created_at"),
    }
}

fn parse_json_array(column: &str, s: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(s).map_err(|e| {
        tracing::error!(column, "Stored set is not a JSON string array: {}", e);
        AppError::Internal(format!("Stored {} could not be read", column))
    })
}
