//! Wordlist repository.
//!
//! Wordlist files live on disk under the configured directory; their
//! metadata lives in SQLite. The stored filename is always `<uuid>.txt`, so
//! user-supplied names never touch the filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use sqlx::{Pool, Row, Sqlite};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error_handling::DatabaseError;

/// How a wordlist came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WordlistSource {
    /// Uploaded by a user.
    Upload,
    /// Generated by the AI wordlist generator.
    Ai,
    /// Seeded starter wordlist.
    Default,
}

/// Metadata row for one wordlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wordlist {
    /// Wordlist id (also the on-disk filename stem).
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// On-disk filename within the wordlist directory.
    pub filename: String,
    /// Free-form description.
    pub description: String,
    /// Number of usable entries (blank and comment lines excluded).
    pub entry_count: i64,
    /// File size in bytes.
    pub file_size: i64,
    /// Origin of the wordlist.
    pub source: WordlistSource,
    /// Optional JSON metadata (e.g. AI generation context).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// SQLite-backed wordlist store with file-backed content.
pub struct WordlistRepository {
    pool: Arc<Pool<Sqlite>>,
    wordlist_dir: PathBuf,
}

impl WordlistRepository {
    /// Creates a repository writing files under `wordlist_dir`.
    pub fn new(pool: Arc<Pool<Sqlite>>, wordlist_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            wordlist_dir: wordlist_dir.into(),
        }
    }

    /// Stores `content` as a new wordlist, returning its metadata.
    ///
    /// The file is written first and the row inserted after; if the insert
    /// fails the file is removed again so disk and database stay in sync.
    pub async fn create_from_content(
        &self,
        name: &str,
        description: &str,
        content: &str,
        source: WordlistSource,
        metadata: Option<serde_json::Value>,
    ) -> Result<Wordlist, DatabaseError> {
        tokio::fs::create_dir_all(&self.wordlist_dir).await?;

        let id = Uuid::new_v4();
        let filename = format!("{id}.txt");
        let path = self.wordlist_dir.join(&filename);
        tokio::fs::write(&path, content).await?;

        let entry_count = count_entries(content) as i64;
        let file_size = content.len() as i64;
        let now = Utc::now();

        let wordlist = Wordlist {
            id,
            name: name.to_string(),
            filename,
            description: description.to_string(),
            entry_count,
            file_size,
            source,
            metadata,
            created_at: now,
            updated_at: now,
        };

        let insert = sqlx::query(
            "INSERT INTO wordlists
                 (id, name, filename, description, entry_count, file_size,
                  source, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(wordlist.id.to_string())
        .bind(&wordlist.name)
        .bind(&wordlist.filename)
        .bind(&wordlist.description)
        .bind(wordlist.entry_count)
        .bind(wordlist.file_size)
        .bind(wordlist.source.to_string())
        .bind(wordlist.metadata.as_ref().map(|m| m.to_string()))
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(self.pool.as_ref())
        .await;

        if let Err(e) = insert {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(DatabaseError::SqlError(e));
        }

        info!(
            "stored wordlist '{}' ({} entries, source {})",
            wordlist.name, wordlist.entry_count, wordlist.source
        );
        Ok(wordlist)
    }

    /// Lists all wordlists, newest first.
    pub async fn list(&self) -> Result<Vec<Wordlist>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, name, filename, description, entry_count, file_size,
                    source, metadata, created_at, updated_at
             FROM wordlists
             ORDER BY created_at DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(row_to_wordlist).collect()
    }

    /// Looks up a wordlist by id.
    pub async fn get(&self, id: &Uuid) -> Result<Option<Wordlist>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, name, filename, description, entry_count, file_size,
                    source, metadata, created_at, updated_at
             FROM wordlists
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.as_ref().map(row_to_wordlist).transpose()
    }

    /// Deletes a wordlist row and its file. Returns whether it existed.
    pub async fn delete(&self, id: &Uuid) -> Result<bool, DatabaseError> {
        let Some(wordlist) = self.get(id).await? else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM wordlists WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.as_ref())
            .await?;

        let path = self.file_path(&wordlist);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove wordlist file {}: {e}", path.display());
            }
        }
        Ok(true)
    }

    /// Absolute path of a wordlist's file.
    pub fn file_path(&self, wordlist: &Wordlist) -> PathBuf {
        self.wordlist_dir.join(&wordlist.filename)
    }

    /// Reads a wordlist's usable entries (blank and comment lines excluded).
    pub async fn read_labels(&self, id: &Uuid) -> Result<Option<Vec<String>>, DatabaseError> {
        let Some(wordlist) = self.get(id).await? else {
            return Ok(None);
        };
        let content = tokio::fs::read_to_string(self.file_path(&wordlist)).await?;
        Ok(Some(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect(),
        ))
    }

    /// Seeds the starter wordlist when the store is empty.
    pub async fn seed_default(&self) -> Result<(), DatabaseError> {
        if !self.list().await?.is_empty() {
            return Ok(());
        }
        info!("seeding starter wordlist");
        self.create_from_content(
            "common",
            "Starter list of common subdomain labels",
            DEFAULT_WORDLIST,
            WordlistSource::Default,
            None,
        )
        .await?;
        Ok(())
    }
}

/// Counts usable entries in wordlist content.
pub fn count_entries(content: &str) -> usize {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count()
}

fn row_to_wordlist(row: &sqlx::sqlite::SqliteRow) -> Result<Wordlist, DatabaseError> {
    let id: String = row.get("id");
    let source: String = row.get("source");
    let metadata: Option<String> = row.get("metadata");
    let created_at: i64 = row.get("created_at");
    let updated_at: i64 = row.get("updated_at");

    Ok(Wordlist {
        id: id
            .parse()
            .map_err(|e| DatabaseError::CorruptRow(format!("wordlist id: {e}")))?,
        name: row.get("name"),
        filename: row.get("filename"),
        description: row.get("description"),
        entry_count: row.get("entry_count"),
        file_size: row.get("file_size"),
        source: source
            .parse()
            .unwrap_or(WordlistSource::Upload),
        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
        updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
    })
}

/// Starter wordlist seeded on first run.
const DEFAULT_WORDLIST: &str = "\
# Common subdomains
www
mail
ftp
admin
blog
test
dev
api
secure
shop
store
webmail
portal
support
vpn
m
mobile
app
staging
media
images
files
docs
beta
demo
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_entries_skips_comments_and_blanks() {
        let content = "www\n\n# comment\nmail\n   \napi";
        assert_eq!(count_entries(content), 3);
    }

    #[test]
    fn test_default_wordlist_has_entries() {
        assert!(count_entries(DEFAULT_WORDLIST) >= 20);
    }

    #[test]
    fn test_source_round_trip() {
        for source in [
            WordlistSource::Upload,
            WordlistSource::Ai,
            WordlistSource::Default,
        ] {
            let parsed: WordlistSource = source.to_string().parse().expect("parse");
            assert_eq!(parsed, source);
        }
    }
}
