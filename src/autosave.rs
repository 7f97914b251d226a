//! Post-race dump persistence
//!
//! Save requests arrive on the outbox's save queue and are written by a
//! dedicated task, so serialization and disk I/O never block ingestion.
//! Write failures are logged and swallowed; a manual save can retry.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::messages::SaveRequest;
use crate::{EngineError, Result};

/// Serialize `request.dump` as pretty JSON to `dir/request.file_name`.
///
/// The directory is created when missing. The document is written to a
/// temporary sibling first and renamed into place.
pub async fn write_dump(dir: &Path, request: &SaveRequest) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| EngineError::persistence(dir.to_path_buf(), e))?;

    let json = serde_json::to_vec_pretty(&request.dump)?;
    let path = dir.join(&request.file_name);
    let partial = path.with_extension("json.partial");

    tokio::fs::write(&partial, &json).await.map_err(|e| EngineError::persistence(partial.clone(), e))?;
    tokio::fs::rename(&partial, &path).await.map_err(|e| EngineError::persistence(path.clone(), e))?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(path)
}

/// Spawn the writer task. It drains `requests` until cancelled or until every
/// sender is dropped.
pub fn spawn_writer(
    dir: PathBuf,
    mut requests: mpsc::UnboundedReceiver<SaveRequest>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("Autosave writer started ({})", dir.display());
        loop {
            let request = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                request = requests.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };

            match write_dump(&dir, &request).await {
                Ok(path) => info!(reason = %request.reason, "Saved session to {}", path.display()),
                Err(e) => error!(
                    reason = %request.reason,
                    "Failed to save {}: {} (retryable: {})",
                    request.file_name,
                    e,
                    e.is_retryable()
                ),
            }
        }
        info!("Autosave writer stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::PostRaceDump;
    use crate::state::SessionState;
    use std::sync::Arc;

    fn request(file_name: &str) -> SaveRequest {
        let state = SessionState::new(Arc::default(), true);
        SaveRequest {
            file_name: file_name.to_string(),
            reason: "Manual save".to_string(),
            dump: PostRaceDump::build(&state),
        }
    }

    #[tokio::test]
    async fn writes_pretty_json_into_new_directory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = temp.path().join("nested").join("data");

        let path = write_dump(&dir, &request("Race_Monza_2025_09_07_15_00_00.json"))
            .await
            .expect("dump written");

        assert_eq!(path, dir.join("Race_Monza_2025_09_07_15_00_00.json"));
        let text = std::fs::read_to_string(&path).expect("readable");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert!(value.get("classification").is_some());
        assert!(value.get("debug").is_none());
        assert!(!path.with_extension("json.partial").exists());
    }

    #[tokio::test]
    async fn unwritable_directory_is_a_persistence_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"not a directory").expect("write blocker");

        let error = write_dump(&blocker, &request("x.json")).await.err().expect("must fail");
        assert!(matches!(error, EngineError::Persistence { .. }));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn writer_drains_queue_until_senders_drop() {
        let temp = tempfile::tempdir().expect("temp dir");
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_writer(temp.path().to_path_buf(), rx, CancellationToken::new());

        tx.send(request("one.json")).expect("writer alive");
        tx.send(request("two.json")).expect("writer alive");
        drop(tx);
        task.await.expect("writer finished");

        assert!(temp.path().join("one.json").exists());
        assert!(temp.path().join("two.json").exists());
    }
}
