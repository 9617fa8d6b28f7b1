#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use insight_chat::controller::Controller;
use insight_chat::error::BackendError;
use insight_chat::message::{ChatRequest, ChatResponse, UploadResponse};
use insight_chat::services::backend::{AnalysisBackend, UploadFile};
use insight_chat::services::persistence::LocalStore;
use insight_chat::services::session::SessionEvent;
use insight_chat::services::uploader::ProgressSettings;
use insight_chat::state::AppState;

/// In-process backend that counts calls and answers from canned results.
#[derive(Default)]
pub struct MockBackend {
    upload_results: Mutex<VecDeque<Result<UploadResponse, BackendError>>>,
    chat_results: Mutex<VecDeque<Result<ChatResponse, BackendError>>>,
    pub uploads: Mutex<Vec<UploadFile>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    upload_calls: AtomicUsize,
    chat_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_upload(&self, result: Result<UploadResponse, BackendError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn push_chat(&self, result: Result<ChatResponse, BackendError>) {
        self.chat_results.lock().unwrap().push_back(result);
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(file);
        self.upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Transport("no canned upload".into())))
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        let message = request.message.clone();
        self.chat_requests.lock().unwrap().push(request);
        self.chat_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ChatResponse {
                    reply: format!("echo: {message}"),
                })
            })
    }
}

pub fn fast_progress() -> ProgressSettings {
    ProgressSettings {
        interval: Duration::from_millis(1),
        step: 50,
    }
}

pub fn controller(
    backend: Arc<dyn AnalysisBackend>,
    state_dir: &Path,
    initial_query: Option<&str>,
) -> Controller {
    controller_with_progress(backend, state_dir, initial_query, fast_progress())
}

pub fn controller_with_progress(
    backend: Arc<dyn AnalysisBackend>,
    state_dir: &Path,
    initial_query: Option<&str>,
    progress: ProgressSettings,
) -> Controller {
    let state = Arc::new(AppState::new(backend, LocalStore::new(state_dir), progress));
    Controller::new(state, initial_query.map(str::to_string))
}

/// Drain events until the upload has either failed or the uploader closed.
pub async fn settle_upload(controller: &mut Controller) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = controller.process_next().await.expect("event channel open");
            let settled = match &event {
                SessionEvent::UploadFailed(_) => true,
                SessionEvent::UploadSucceeded(_) | SessionEvent::UploadProgress(_) => {
                    controller.session().uploader().is_none()
                }
                _ => false,
            };
            if settled {
                return event;
            }
        }
    })
    .await
    .expect("upload settled in time")
}

/// Drain events until a chat exchange settles, skipping leftover progress ticks.
pub async fn settle_reply(controller: &mut Controller) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = controller.process_next().await.expect("event channel open");
            if matches!(
                event,
                SessionEvent::ReplyReceived(_) | SessionEvent::ReplyFailed(_)
            ) {
                return event;
            }
        }
    })
    .await
    .expect("reply settled in time")
}

pub fn upload_response(value: serde_json::Value) -> UploadResponse {
    serde_json::from_value(value).unwrap()
}
