use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::error::{Result, WardenError};
use warden_core::PolicyLine;

use super::Adapter;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Policy stored as CSV lines: `p, alice, data1, read`.
#[derive(Debug)]
pub struct FileAdapter {
    path: PathBuf,
    /// Held across write and rename so saves through this adapter land whole, one at a time.
    save_lock: Mutex<()>,
}

impl FileAdapter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            save_lock: Mutex::new(()),
        }
    }

    /// Sibling temp file, unique per process and save.
    fn tmp_path(&self) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("policy"));
        name.push(format!(".{}.{seq}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Adapter for FileAdapter {
    fn driver(&self) -> &'static str {
        "file"
    }

    async fn load_policy(&self) -> Result<Vec<PolicyLine>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            let what = if e.kind() == ErrorKind::NotFound {
                "missing"
            } else {
                "unreadable"
            };
            WardenError::Adapter(format!("policy file {} {what}: {e}", self.path.display()))
        })?;
        Ok(text.lines().filter_map(PolicyLine::parse).collect())
    }

    async fn save_policy(&self, lines: &[PolicyLine]) -> Result<()> {
        let mut out = String::new();
        for line in lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }

        // Readers see either the previous file or the complete new one.
        let _guard = self.save_lock.lock().await;
        let tmp = self.tmp_path();
        if let Err(e) = tokio::fs::write(&tmp, out).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(WardenError::Adapter(format!("write {}: {e}", tmp.display())));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(WardenError::Adapter(format!(
                "replace {}: {e}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn line(ptype: &str, fields: &[&str]) -> PolicyLine {
        PolicyLine::new(ptype, fields.iter().map(|f| f.to_string()).collect())
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new(dir.path().join("policy.csv"));

        let lines = vec![
            line("p", &["alice", "data1", "read"]),
            line("g", &["alice", "admin"]),
        ];
        adapter.save_policy(&lines).await.unwrap();
        assert_eq!(adapter.load_policy().await.unwrap(), lines);
    }

    #[tokio::test]
    async fn load_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.csv");
        std::fs::write(&path, "# seed\n\np, bob, data2, write\n  \ng, bob, ops\n").unwrap();

        let got = FileAdapter::new(&path).load_policy().await.unwrap();
        assert_eq!(
            got,
            vec![line("p", &["bob", "data2", "write"]), line("g", &["bob", "ops"])]
        );
    }

    #[tokio::test]
    async fn missing_file_is_adapter_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileAdapter::new(dir.path().join("nope.csv"))
            .load_policy()
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::Adapter(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_leave_one_complete_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.csv");
        let adapters = [
            Arc::new(FileAdapter::new(&path)),
            Arc::new(FileAdapter::new(&path)),
        ];

        let snapshots: Vec<Vec<PolicyLine>> = (0..16)
            .map(|i| {
                let user = format!("user{i}");
                (0..50)
                    .map(|j| line("p", &[user.as_str(), format!("obj{j}").as_str(), "read"]))
                    .collect()
            })
            .collect();

        let tasks: Vec<_> = snapshots
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, snapshot)| {
                let adapter = Arc::clone(&adapters[i % 2]);
                tokio::spawn(async move { adapter.save_policy(&snapshot).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reloaded = adapters[0].load_policy().await.unwrap();
        assert!(snapshots.contains(&reloaded), "reloaded a torn file");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "policy.csv")
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }
}
