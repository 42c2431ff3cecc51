//! Wordlist-driven brute force stage.
//!
//! Streams a wordlist file line by line into the candidate set. Runs after
//! the harvesters have finished; unlike harvester failures, an unreadable
//! wordlist fails the whole job.

use std::path::Path;

use log::debug;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error_handling::ScanError;
use crate::scanner::candidates::CandidateSet;

/// Streams `path` into `candidates`, returning the number of labels added.
///
/// Lines are trimmed and lowercased; blank lines and `#` comments are
/// skipped. The file is never read into memory whole, so very large
/// wordlists stream in bounded memory.
///
/// # Errors
///
/// Returns [`ScanError::WordlistUnreadable`] if the file cannot be opened or
/// a line cannot be read. This is fatal to the job.
pub async fn stream_wordlist(
    path: &Path,
    candidates: &CandidateSet,
) -> Result<usize, ScanError> {
    let file = File::open(path)
        .await
        .map_err(|source| ScanError::WordlistUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let mut lines = BufReader::new(file).lines();
    let mut added = 0;
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|source| ScanError::WordlistUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let Some(line) = line else { break };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if candidates.insert(trimmed) {
            added += 1;
        }
    }

    debug!("wordlist {} contributed {added} labels", path.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_stream_wordlist_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("temp wordlist");
        writeln!(file, "www").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "# comment").expect("write");
        writeln!(file, "DEV").expect("write");
        writeln!(file, "  mail  ").expect("write");

        let set = CandidateSet::new();
        let added = stream_wordlist(file.path(), &set).await.expect("stream");
        assert_eq!(added, 3);

        let mut labels = set.snapshot();
        labels.sort();
        assert_eq!(labels, vec!["dev", "mail", "www"]);
    }

    #[tokio::test]
    async fn test_stream_wordlist_deduplicates_against_existing() {
        let mut file = tempfile::NamedTempFile::new().expect("temp wordlist");
        writeln!(file, "www").expect("write");
        writeln!(file, "WWW").expect("write");

        let set = CandidateSet::new();
        set.insert("www");
        let added = stream_wordlist(file.path(), &set).await.expect("stream");
        assert_eq!(added, 0);
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_wordlist_missing_file_is_fatal() {
        let set = CandidateSet::new();
        let err = stream_wordlist(Path::new("/nonexistent/words.txt"), &set)
            .await
            .expect_err("missing wordlist must fail");
        assert!(matches!(err, ScanError::WordlistUnreadable { .. }));
        assert!(err.to_string().contains("/nonexistent/words.txt"));
    }
}
