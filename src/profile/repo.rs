use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::warn;

use crate::error::ApiError;
use crate::profile::dto::ProfileLists;

/// Profile row as stored: the lists are JSON-encoded text columns.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub skills: String,
    pub experience: String,
    pub languages: String,
}

fn parse_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "stored profile list is not valid JSON, treating as empty");
        Vec::new()
    })
}

impl Profile {
    /// Decode the stored columns into typed lists. Malformed text decodes to
    /// empty, same as a missing row.
    pub fn lists(&self) -> ProfileLists {
        ProfileLists {
            skills: parse_list(&self.skills),
            experience: parse_list(&self.experience),
            languages: parse_list(&self.languages),
        }
    }

    pub async fn get_by_user(db: &SqlitePool, user_id: i64) -> Result<Option<Profile>, ApiError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, skills, experience, languages
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// The lists a user shows up with: their stored profile, or all-empty if
    /// no row exists yet.
    pub async fn lists_for_user(db: &SqlitePool, user_id: i64) -> Result<ProfileLists, ApiError> {
        Ok(Self::get_by_user(db, user_id)
            .await?
            .map(|p| p.lists())
            .unwrap_or_default())
    }

    /// Insert-or-replace the whole profile. `UNIQUE (user_id)` keeps this a
    /// single row per user no matter how often it runs.
    pub async fn upsert(
        db: &SqlitePool,
        user_id: i64,
        lists: &ProfileLists,
    ) -> Result<(), ApiError> {
        let skills = serde_json::to_string(&lists.skills).map_err(anyhow::Error::from)?;
        let experience = serde_json::to_string(&lists.experience).map_err(anyhow::Error::from)?;
        let languages = serde_json::to_string(&lists.languages).map_err(anyhow::Error::from)?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, skills, experience, languages)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                skills = excluded.skills,
                experience = excluded.experience,
                languages = excluded.languages
            "#,
        )
        .bind(user_id)
        .bind(skills)
        .bind(experience)
        .bind(languages)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Empty profile created alongside a new user, inside the registration
    /// transaction.
    pub(crate) async fn create_empty(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
