//! Schema migrations.
//!
//! The relational store holds wordlist metadata only; jobs and their results
//! live in process memory for their whole lifetime.

use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Creates the schema if it doesn't exist yet.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS wordlists (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            filename TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            entry_count INTEGER NOT NULL,
            file_size INTEGER NOT NULL,
            source TEXT NOT NULL,
            metadata TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_wordlists_created_at
         ON wordlists (created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
