use sqlx::SqlitePool;
use tracing::{info, warn};

/// Create both tables if they are not there yet. Safe to run on every
/// startup.
pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users (id),
            skills TEXT NOT NULL DEFAULT '[]',
            experience TEXT NOT NULL DEFAULT '[]',
            languages TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(db)
    .await?;

    ensure_updated_at_column(db).await?;

    info!("database schema ready");
    Ok(())
}

/// One-time additive repair for databases created before `users.updated_at`
/// existed. Not a migration framework; the schema does not evolve further.
async fn ensure_updated_at_column(db: &SqlitePool) -> anyhow::Result<()> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('users')")
            .fetch_all(db)
            .await?;

    if !columns.iter().any(|c| c == "updated_at") {
        warn!("users.updated_at column missing, adding it");
        // SQLite rejects ADD COLUMN with a non-constant default, so the
        // column is added bare and backfilled in a second step.
        sqlx::query("ALTER TABLE users ADD COLUMN updated_at TEXT")
            .execute(db)
            .await?;
        sqlx::query("UPDATE users SET updated_at = CURRENT_TIMESTAMP WHERE updated_at IS NULL")
            .execute(db)
            .await?;
        info!("users.updated_at column added");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection so every query sees the same in-memory database.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let db = memory_pool().await;
        init_schema(&db).await.expect("first init");
        init_schema(&db).await.expect("second init");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'user_profiles')",
        )
        .fetch_all(&db)
        .await
        .expect("list tables");
        assert_eq!(tables.len(), 2);
    }

    #[tokio::test]
    async fn repair_adds_missing_updated_at_column() {
        let db = memory_pool().await;
        // An old database created before the column existed.
        sqlx::query(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&db)
        .await
        .expect("create legacy table");
        sqlx::query("INSERT INTO users (name, email, password_hash) VALUES ('A', 'a@x.com', 'h')")
            .execute(&db)
            .await
            .expect("seed legacy row");

        init_schema(&db).await.expect("init over legacy schema");

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('users')")
                .fetch_all(&db)
                .await
                .expect("list columns");
        assert!(columns.iter().any(|c| c == "updated_at"));

        // Existing rows get a backfilled timestamp.
        let updated_at: Option<String> =
            sqlx::query_scalar("SELECT updated_at FROM users WHERE email = 'a@x.com'")
                .fetch_one(&db)
                .await
                .expect("read backfilled row");
        assert!(updated_at.is_some());
    }
}
