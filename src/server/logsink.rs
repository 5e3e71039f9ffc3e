//! Per-Device Log Append
//!
//! One append-only log file per device id, created lazily on the first
//! fragment and never rotated. Appends for the same device are serialized
//! through a lazily created per-device lock; different devices never
//! contend with one another.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

use crate::server::artifacts::is_plain_file_name;

/// Append-only sink for device diagnostic fragments.
pub struct LogSink {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LogSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Append `content` to `<root>/<device_id>.log`.
    ///
    /// The file is created on first use; subsequent fragments are appended
    /// with no separator. The whole fragment is written and flushed under
    /// the device's lock, so concurrent appends for one device land whole
    /// and in arrival order. On error nothing is acknowledged.
    pub async fn append(&self, device_id: &str, content: &str) -> io::Result<()> {
        if !is_plain_file_name(device_id) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid device id {device_id:?}"),
            ));
        }

        let lock = self.lock_for(device_id);
        let _guard = lock.lock().await;

        let path = self.root.join(format!("{device_id}.log"));
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Fetch or lazily create the lock for a device. The map lock is held
    /// only for the lookup, never across an await point.
    fn lock_for(&self, device_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(device_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_append_creates_then_extends() {
        let dir = tempdir().unwrap();
        let sink = LogSink::new(dir.path());

        sink.append("esp-01", "boot ok\n").await.unwrap();
        let path = dir.path().join("esp-01.log");
        assert_eq!(fs::read_to_string(&path).unwrap(), "boot ok\n");

        // No separator between fragments.
        sink.append("esp-01", "wifi up").await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "boot ok\nwifi up");
    }

    #[tokio::test]
    async fn test_devices_write_independent_files() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(LogSink::new(dir.path().to_path_buf()));

        let a = {
            let sink = sink.clone();
            tokio::spawn(async move { sink.append("alpha", "aaaa").await })
        };
        let b = {
            let sink = sink.clone();
            tokio::spawn(async move { sink.append("beta", "bbbb").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("alpha.log")).unwrap(), "aaaa");
        assert_eq!(fs::read_to_string(dir.path().join("beta.log")).unwrap(), "bbbb");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_never_interleave() {
        let dir = tempdir().unwrap();
        let sink = Arc::new(LogSink::new(dir.path().to_path_buf()));

        // Each writer appends a distinct byte repeated FRAGMENT bytes; an
        // interleaved write would break a run.
        const WRITERS: usize = 8;
        const FRAGMENT: usize = 4096;

        let mut handles = Vec::new();
        for writer in 0..WRITERS {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                let marker = (b'a' + writer as u8) as char;
                let fragment: String = std::iter::repeat(marker).take(FRAGMENT).collect();
                sink.append("stress", &fragment).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let content = fs::read_to_string(dir.path().join("stress.log")).unwrap();
        assert_eq!(content.len(), WRITERS * FRAGMENT);

        let bytes = content.as_bytes();
        let mut seen = Vec::new();
        for chunk in bytes.chunks(FRAGMENT) {
            let first = chunk[0];
            assert!(chunk.iter().all(|&b| b == first), "interleaved fragment");
            seen.push(first);
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), WRITERS, "a fragment was lost or duplicated");
    }

    #[tokio::test]
    async fn test_traversal_id_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let sink = LogSink::new(dir.path());

        let err = sink.append("../escape", "x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_append_error_leaves_no_file() {
        let dir = tempdir().unwrap();
        let sink = LogSink::new(dir.path().join("missing-subdir"));

        assert!(sink.append("esp-01", "x").await.is_err());
        assert!(!dir.path().join("missing-subdir").exists());
    }
}
