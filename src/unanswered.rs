//! Append-only log of queries the retrieval pipeline could not ground.
//!
//! Plain text, one block per event. There is no read path, no rotation, and
//! no size bound; the file grows until someone truncates it. Each block is
//! written with a single `write_all`, and the file is opened and closed per
//! call with no locking.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

#[derive(Clone)]
pub struct UnansweredLog {
    path: PathBuf,
}

impl UnansweredLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one block: separator, UTC timestamp, question, answer, the
    /// sources consulted ("None" when empty), and an optional reason.
    pub fn record(
        &self,
        question: &str,
        answer: &str,
        sources: &[String],
        reason: &str,
    ) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let sources_line = if sources.is_empty() {
            "None".to_string()
        } else {
            sources.join(", ")
        };

        let mut block = String::new();
        block.push_str("=====================================\n");
        block.push_str(&format!("Time: {}\n", timestamp));
        block.push_str(&format!("Question:\n{}\n\n", question));
        block.push_str(&format!("Answer:\n{}\n\n", answer));
        block.push_str(&format!("Sources used: {}\n", sources_line));
        if !reason.is_empty() {
            block.push_str(&format!("Reason: {}\n", reason));
        }
        block.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(block.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_full_block_with_sources_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let log = UnansweredLog::new(dir.path().join("unanswered.txt"));

        log.record(
            "Where were you born?",
            "I don't have that information.",
            &["bio".to_string(), "work".to_string()],
            "Best distance 0.812 above threshold 0.35",
        )
        .unwrap();

        let content = std::fs::read_to_string(dir.path().join("unanswered.txt")).unwrap();
        assert!(content.starts_with("====="));
        assert!(content.contains("Time: "));
        assert!(content.contains("UTC\n"));
        assert!(content.contains("Question:\nWhere were you born?\n"));
        assert!(content.contains("Answer:\nI don't have that information.\n"));
        assert!(content.contains("Sources used: bio, work\n"));
        assert!(content.contains("Reason: Best distance 0.812 above threshold 0.35\n"));
    }

    #[test]
    fn empty_sources_log_as_none_and_reason_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let log = UnansweredLog::new(dir.path().join("unanswered.txt"));

        log.record("question", "answer", &[], "").unwrap();

        let content = std::fs::read_to_string(dir.path().join("unanswered.txt")).unwrap();
        assert!(content.contains("Sources used: None\n"));
        assert!(!content.contains("Reason:"));
    }

    #[test]
    fn entries_append_and_parents_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("logs").join("unanswered.txt");
        let log = UnansweredLog::new(nested.clone());

        log.record("first", "a1", &[], "No relevant context found")
            .unwrap();
        log.record("second", "a2", &[], "No relevant context found")
            .unwrap();

        let content = std::fs::read_to_string(nested).unwrap();
        assert_eq!(content.matches("Question:").count(), 2);
        assert!(content.contains("first"));
        assert!(content.contains("second"));
    }
}
