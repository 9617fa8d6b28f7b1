// src/services/session.rs
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, UploadError};
use crate::services::chat;
use crate::services::dataset::DatasetDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// State of the uploader while it is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSession {
    pub selected_files: Vec<PathBuf>,
    pub is_uploading: bool,
    pub progress: u8,
    /// The server has answered but the progress bar has not reached 100 yet.
    pub finished: bool,
}

/// Everything that can happen to a [`Session`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    InputChanged(String),
    UploaderOpened,
    UploaderClosed,
    FilesSelected(Vec<PathBuf>),
    UploadStarted,
    UploadProgress(u8),
    UploadSucceeded(DatasetDescriptor),
    UploadFailed(UploadError),
    UploadRejected(UploadError),
    MessageSent(String),
    ReplyReceived(String),
    ReplyFailed(ChatError),
    MessageRejected(ChatError),
}

/// Client-side session: transcript, current dataset, banner, input buffer and
/// the uploader. Only changes through [`Session::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    transcript: Vec<ChatTurn>,
    dataset: Option<DatasetDescriptor>,
    error: Option<String>,
    input: String,
    uploader: Option<UploadSession>,
}

impl Session {
    /// Start a session from a restored dataset and an optional seed query.
    pub fn restore(dataset: Option<DatasetDescriptor>, initial_query: Option<String>) -> Self {
        let transcript = initial_query
            .filter(|query| !query.is_empty())
            .map(|query| vec![ChatTurn::user(query)])
            .unwrap_or_default();

        Self {
            transcript,
            dataset,
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn dataset(&self) -> Option<&DatasetDescriptor> {
        self.dataset.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn uploader(&self) -> Option<&UploadSession> {
        self.uploader.as_ref()
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::InputChanged(text) => self.input = text,
            SessionEvent::UploaderOpened => {
                self.uploader.get_or_insert_with(UploadSession::default);
            }
            SessionEvent::UploaderClosed => self.uploader = None,
            SessionEvent::FilesSelected(files) => {
                self.uploader
                    .get_or_insert_with(UploadSession::default)
                    .selected_files = files;
            }
            SessionEvent::UploadStarted => {
                let upload = self.uploader.get_or_insert_with(UploadSession::default);
                upload.is_uploading = true;
                upload.progress = 0;
                upload.finished = false;
            }
            SessionEvent::UploadProgress(value) => {
                if let Some(upload) = self.uploader.as_mut().filter(|u| u.is_uploading) {
                    upload.progress = upload.progress.max(value.min(100));
                }
                self.close_finished_upload();
            }
            SessionEvent::UploadSucceeded(dataset) => {
                self.dataset = Some(dataset);
                self.error = None;
                if let Some(upload) = self.uploader.as_mut() {
                    upload.finished = true;
                }
                self.close_finished_upload();
            }
            SessionEvent::UploadFailed(err) => {
                self.dataset = None;
                self.error = Some(err.to_string());
                if let Some(upload) = self.uploader.as_mut() {
                    upload.is_uploading = false;
                    upload.progress = 0;
                    upload.finished = false;
                }
            }
            SessionEvent::UploadRejected(err) => self.error = Some(err.to_string()),
            SessionEvent::MessageSent(text) => {
                self.transcript.push(ChatTurn::user(text));
                self.input.clear();
                self.error = None;
            }
            SessionEvent::ReplyReceived(reply) => {
                self.transcript.push(ChatTurn::assistant(reply));
            }
            SessionEvent::ReplyFailed(err) => {
                self.transcript
                    .push(ChatTurn::assistant(chat::failure_text(&err)));
                self.error = Some(err.to_string());
            }
            SessionEvent::MessageRejected(err) => self.error = Some(err.to_string()),
        }
    }

    // The uploader closes once the server has answered and the bar is full.
    fn close_finished_upload(&mut self) {
        if self
            .uploader
            .as_ref()
            .is_some_and(|u| u.finished && u.progress >= 100)
        {
            self.uploader = None;
        }
    }
}
