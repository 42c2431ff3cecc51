//! Wordlist repository tests against a temporary SQLite database.

use std::sync::Arc;

use subscout::storage::{init_db_pool, run_migrations};
use subscout::wordlists::{WordlistRepository, WordlistSource};

async fn repo_in(dir: &tempfile::TempDir) -> WordlistRepository {
    let db_path = dir.path().join("subscout-test.db");
    let pool = init_db_pool(&db_path).await.expect("db pool");
    run_migrations(&pool).await.expect("migrations");
    WordlistRepository::new(Arc::clone(&pool), dir.path().join("wordlists"))
}

#[tokio::test]
async fn create_list_get_delete_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir).await;

    let created = repo
        .create_from_content(
            "internal hosts",
            "uploaded via test",
            "www\nmail\n# comment\n\napi\n",
            WordlistSource::Upload,
            None,
        )
        .await
        .expect("create");
    assert_eq!(created.entry_count, 3);
    assert_eq!(created.source, WordlistSource::Upload);

    let listed = repo.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "internal hosts");

    let fetched = repo.get(&created.id).await.expect("get").expect("row");
    assert_eq!(fetched.filename, created.filename);
    assert!(repo.file_path(&fetched).exists());

    assert!(repo.delete(&created.id).await.expect("delete"));
    assert!(repo.get(&created.id).await.expect("get").is_none());
    assert!(!repo.file_path(&fetched).exists());
    assert!(!repo.delete(&created.id).await.expect("second delete"));
}

#[tokio::test]
async fn read_labels_filters_comments_and_blanks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir).await;

    let created = repo
        .create_from_content(
            "filtered",
            "",
            "# header\nwww\n\n  api  \n",
            WordlistSource::Upload,
            None,
        )
        .await
        .expect("create");

    let labels = repo
        .read_labels(&created.id)
        .await
        .expect("read")
        .expect("labels");
    assert_eq!(labels, vec!["www", "api"]);
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir).await;

    repo.seed_default().await.expect("first seed");
    repo.seed_default().await.expect("second seed");

    let listed = repo.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].source, WordlistSource::Default);
    assert!(listed[0].entry_count >= 20);
}

#[tokio::test]
async fn metadata_survives_storage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = repo_in(&dir).await;

    let metadata = serde_json::json!({ "targetDomain": "example.com", "model": "test" });
    let created = repo
        .create_from_content(
            "generated",
            "AI output",
            "api\nstaging\n",
            WordlistSource::Ai,
            Some(metadata.clone()),
        )
        .await
        .expect("create");

    let fetched = repo.get(&created.id).await.expect("get").expect("row");
    assert_eq!(fetched.source, WordlistSource::Ai);
    assert_eq!(fetched.metadata, Some(metadata));
}
