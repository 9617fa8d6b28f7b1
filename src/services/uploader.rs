// src/services/uploader.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::TRACING_TARGET_UPLOAD;
use crate::error::UploadError;
use crate::services::backend::{AnalysisBackend, UploadFile};
use crate::services::dataset::{self, DatasetDescriptor, FileKind};
use crate::services::session::SessionEvent;

/// Timing of the cosmetic progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    pub interval: Duration,
    pub step: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            step: 10,
        }
    }
}

impl ProgressSettings {
    /// Time between ticks, never zero.
    pub fn tick_interval(&self) -> Duration {
        self.interval.max(Duration::from_millis(1))
    }

    /// Values the bar takes, ending at exactly 100.
    pub fn steps(&self) -> Vec<u8> {
        let step = self.step.clamp(1, 100);
        let mut values: Vec<u8> = (1..)
            .map(|i: u32| i * u32::from(step))
            .take_while(|v| *v < 100)
            .map(|v| v as u8)
            .collect();
        values.push(100);
        values
    }
}

/// Post the first selected file and turn the answer into a dataset.
pub async fn submit_upload(
    backend: &dyn AnalysisBackend,
    files: &[PathBuf],
) -> Result<DatasetDescriptor, UploadError> {
    let path = files.first().ok_or(UploadError::NoFile)?;
    if files.len() > 1 {
        debug!(
            target: TRACING_TARGET_UPLOAD,
            ignored = files.len() - 1,
            "only the first selected file is uploaded"
        );
    }

    let file = read_upload_file(path).await?;
    let filename = file.filename.clone();
    info!(
        target: TRACING_TARGET_UPLOAD,
        %filename,
        kind = file.kind.label(),
        bytes = file.bytes.len(),
        "uploading dataset"
    );

    let response = backend.upload(file).await.map_err(|err| {
        warn!(target: TRACING_TARGET_UPLOAD, %filename, error = %err, "upload failed");
        UploadError::from(err)
    })?;

    let dataset = DatasetDescriptor::from_response(response, &filename)?;
    info!(
        target: TRACING_TARGET_UPLOAD,
        dataset_id = %dataset.dataset_id,
        preview_rows = dataset.preview_rows.len(),
        "dataset ready"
    );
    Ok(dataset)
}

async fn read_upload_file(path: &Path) -> Result<UploadFile, UploadError> {
    if !dataset::is_accepted(path) {
        warn!(
            target: TRACING_TARGET_UPLOAD,
            path = %path.display(),
            accepted = ?dataset::ACCEPTED_EXTENSIONS,
            "file type is not in the accepted list, uploading anyway"
        );
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| UploadError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let kind = FileKind::from_path(path);
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(UploadFile {
        filename,
        kind,
        mime_type: kind.mime_type(path),
        bytes,
    })
}

/// Feed progress ticks into the event channel until the bar is full or the
/// receiver is gone.
pub fn spawn_progress(
    settings: ProgressSettings,
    events: UnboundedSender<SessionEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(settings.tick_interval());
        // The first tick completes immediately.
        ticker.tick().await;
        for value in settings.steps() {
            ticker.tick().await;
            if events.send(SessionEvent::UploadProgress(value)).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_steps_count_up_by_ten() {
        let steps = ProgressSettings::default().steps();
        assert_eq!(steps, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn uneven_step_still_ends_at_hundred() {
        let settings = ProgressSettings {
            interval: Duration::from_millis(1),
            step: 30,
        };
        assert_eq!(settings.steps(), vec![30, 60, 90, 100]);

        let zero = ProgressSettings {
            interval: Duration::from_millis(1),
            step: 0,
        };
        assert_eq!(zero.steps().len(), 100);
    }

    #[tokio::test]
    async fn zero_interval_still_ticks_to_hundred() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let settings = ProgressSettings {
            interval: Duration::ZERO,
            step: 50,
        };
        assert_eq!(settings.tick_interval(), Duration::from_millis(1));
        spawn_progress(settings, tx).await.unwrap();

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert_eq!(last, Some(SessionEvent::UploadProgress(100)));
    }

    #[tokio::test]
    async fn ticker_sends_every_step() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let settings = ProgressSettings {
            interval: Duration::from_millis(1),
            step: 50,
        };
        spawn_progress(settings, tx).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                SessionEvent::UploadProgress(50),
                SessionEvent::UploadProgress(100)
            ]
        );
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl AnalysisBackend for Unreachable {
            async fn upload(
                &self,
                _file: UploadFile,
            ) -> Result<crate::message::UploadResponse, crate::error::BackendError> {
                unreachable!("no request expected")
            }

            async fn chat(
                &self,
                _request: crate::message::ChatRequest,
            ) -> Result<crate::message::ChatResponse, crate::error::BackendError> {
                unreachable!("no request expected")
            }
        }

        assert_eq!(
            submit_upload(&Unreachable, &[]).await,
            Err(UploadError::NoFile)
        );
    }
}
