//! Activity log - one timestamped line per healing checkpoint
//!
//! Append-only diagnostics file, e.g. `target/medic-activity.log`:
//!
//! ```text
//! 2026-10-19 09:12:03 UTC attempt 1/3 started for 'Wikipedia search box' (id=searchInput)
//! 2026-10-19 09:12:05 UTC healed 'Wikipedia search box' (id=searchInput) on attempt 1 with suggestion '#searchInput' as css=#searchInput
//! ```

use async_trait::async_trait;
use chrono::Utc;
use medic_core::fail_open::fail_open;
use medic_core::MedicError;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::observer::{HealingEvent, HealingObserver};

/// File-backed healing observer
///
/// Writes are serialized so concurrent scenarios never interleave lines.
/// This observer is fail-open - a write failure is logged and dropped.
pub struct ActivityLog {
    output_path: PathBuf,
    write_lock: Mutex<()>,
}

impl ActivityLog {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// Append a single line, prefixed with the current UTC time
    pub async fn append_line(&self, message: &str) {
        fail_open("activity_log::append_line", || async {
            let line = format!(
                "{} {}\n",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                message.replace('\n', " ")
            );

            let _guard = self.write_lock.lock().await;

            if let Some(parent) = self.output_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.output_path)
                .await?;

            file.write_all(line.as_bytes()).await?;
            file.flush().await?;

            Ok::<_, MedicError>(())
        })
        .await;
    }
}

#[async_trait]
impl HealingObserver for ActivityLog {
    async fn on_event(&self, event: &HealingEvent) {
        self.append_line(&event.to_string()).await;
    }
}
