//! Append-only output log
//!
//! One line per processed item, written to `<dir>/output.txt`. The file is
//! opened in append mode for every record, so several processes sharing a
//! directory never truncate each other.

use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

pub const OUTPUT_FILE_NAME: &str = "output.txt";

#[derive(Debug, Clone)]
pub struct OutputLog {
    path: PathBuf,
}

impl OutputLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(OUTPUT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format of a single record, newline included
    pub fn format_record(worker: &str, item: &str) -> String {
        format!("[{}] Processed: {}\n", worker, item)
    }

    /// Append one processed record, creating the file if needed
    pub async fn append(&self, worker: &str, item: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(Self::format_record(worker, item).as_bytes())
            .await?;
        file.flush().await?;
        Ok(())
    }
}
