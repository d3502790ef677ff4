use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::profile::repo::Profile;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Find a user by email. Emails match exactly as stored.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a user together with their empty profile. Both rows land in
    /// one transaction; a duplicate email fails the whole thing.
    pub async fn create(
        db: &SqlitePool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let now = OffsetDateTime::now_utc();
        let mut tx = db.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(ApiError::email_taken());
            }
            Err(e) => return Err(e.into()),
        };

        Profile::create_empty(&mut tx, user.id).await?;
        tx.commit().await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn create_inserts_user_and_empty_profile_atomically() {
        let pool = db::memory_pool().await;
        db::init_schema(&pool).await.expect("schema");

        let user = User::create(&pool, "A", "a@x.com", "hash")
            .await
            .expect("create user");
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");

        let profile = Profile::get_by_user(&pool, user.id)
            .await
            .expect("get profile")
            .expect("profile row exists");
        let lists = profile.lists();
        assert!(lists.skills.is_empty());
        assert!(lists.experience.is_empty());
        assert!(lists.languages.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_and_leaves_first_user_intact() {
        let pool = db::memory_pool().await;
        db::init_schema(&pool).await.expect("schema");

        User::create(&pool, "A", "a@x.com", "hash-a")
            .await
            .expect("first create");
        let err = User::create(&pool, "B", "a@x.com", "hash-b")
            .await
            .expect_err("second create must fail");
        assert!(matches!(err, ApiError::Conflict { .. }));

        let first = User::find_by_email(&pool, "a@x.com")
            .await
            .expect("lookup")
            .expect("still present");
        assert_eq!(first.name, "A");
        assert_eq!(first.password_hash, "hash-a");

        // The failed transaction must not have left a second profile row.
        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(&pool)
            .await
            .expect("count profiles");
        assert_eq!(profiles, 1);
    }

    #[tokio::test]
    async fn emails_are_case_sensitive_as_stored() {
        let pool = db::memory_pool().await;
        db::init_schema(&pool).await.expect("schema");

        User::create(&pool, "A", "a@x.com", "hash")
            .await
            .expect("create");
        let miss = User::find_by_email(&pool, "A@X.COM")
            .await
            .expect("lookup");
        assert!(miss.is_none());
    }
}
