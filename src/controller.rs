// src/controller.rs
use std::path::PathBuf;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ChatError, UploadError};
use crate::services::session::{Session, SessionEvent};
use crate::services::{chat, persistence, uploader};
use crate::state::SharedState;
use crate::{TRACING_TARGET_CHAT, TRACING_TARGET_STORE, TRACING_TARGET_UPLOAD};

/// Owns the [`Session`] and is the only place it is mutated.
///
/// Requests run as spawned tasks and report back as [`SessionEvent`]s on an
/// internal channel; the owner drains it with [`Controller::process_next`] (or
/// [`Controller::next_event`] plus [`Controller::handle`]). Nothing is
/// cancelled and nothing is sequenced: a late answer is applied whenever it
/// arrives.
pub struct Controller {
    state: SharedState,
    session: Session,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
    /// Requests whose answer has not been handled yet.
    in_flight: usize,
    progress: Option<JoinHandle<()>>,
}

impl Controller {
    /// Restore the stored dataset once and seed the transcript.
    pub fn new(state: SharedState, initial_query: Option<String>) -> Self {
        let dataset = persistence::restore_dataset(&state.store);
        let session = Session::restore(dataset, initial_query);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            state,
            session,
            events_tx,
            events_rx,
            in_flight: 0,
            progress: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// No request is waiting for an answer and no upload bar is still
    /// running.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && !self.session.uploader().is_some_and(|u| u.is_uploading)
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.session.apply(SessionEvent::InputChanged(text.into()));
    }

    /// Send whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Result<(), ChatError> {
        let text = self.session.input().to_string();
        self.send_message(&text)
    }

    /// Validate, append the user turn, and post the message in the
    /// background. The reply (or the failure) arrives later as an event.
    pub fn send_message(&mut self, text: &str) -> Result<(), ChatError> {
        let request = match chat::validate_message(self.session.dataset(), text) {
            Ok(request) => request,
            Err(err) => {
                debug!(target: TRACING_TARGET_CHAT, reason = %err, "message rejected");
                self.session.apply(SessionEvent::MessageRejected(err.clone()));
                return Err(err);
            }
        };

        self.session
            .apply(SessionEvent::MessageSent(text.to_string()));

        self.in_flight += 1;
        let backend = self.state.backend.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match chat::request_reply(backend.as_ref(), request).await {
                Ok(reply) => SessionEvent::ReplyReceived(reply),
                Err(err) => SessionEvent::ReplyFailed(err),
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    pub fn open_uploader(&mut self) {
        self.session.apply(SessionEvent::UploaderOpened);
    }

    /// Close the uploader. An upload already in flight still lands.
    pub fn cancel_upload(&mut self) {
        self.session.apply(SessionEvent::UploaderClosed);
    }

    /// Start uploading the first of `files`. Progress, and then the dataset
    /// or the failure, arrive later as events.
    pub fn submit_upload(&mut self, files: Vec<PathBuf>) -> Result<(), UploadError> {
        if files.is_empty() {
            self.session
                .apply(SessionEvent::UploadRejected(UploadError::NoFile));
            return Err(UploadError::NoFile);
        }

        self.session.apply(SessionEvent::FilesSelected(files.clone()));
        self.session.apply(SessionEvent::UploadStarted);

        self.stop_progress();
        self.progress = Some(uploader::spawn_progress(
            self.state.progress,
            self.events_tx.clone(),
        ));

        self.in_flight += 1;
        let backend = self.state.backend.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match uploader::submit_upload(backend.as_ref(), &files).await {
                Ok(dataset) => SessionEvent::UploadSucceeded(dataset),
                Err(err) => SessionEvent::UploadFailed(err),
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    /// Wait for the next event from an outstanding request.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply an event. A new dataset is also written to the local store.
    pub fn handle(&mut self, event: SessionEvent) {
        match &event {
            SessionEvent::UploadSucceeded(dataset) => {
                if let Err(err) = persistence::persist_dataset(&self.state.store, dataset) {
                    warn!(
                        target: TRACING_TARGET_STORE,
                        error = %err,
                        "could not store dataset, it will not survive a restart"
                    );
                }
            }
            SessionEvent::UploadFailed(err) => {
                debug!(target: TRACING_TARGET_UPLOAD, error = %err, "clearing current dataset");
                self.stop_progress();
            }
            _ => {}
        }
        if matches!(
            event,
            SessionEvent::UploadSucceeded(_)
                | SessionEvent::UploadFailed(_)
                | SessionEvent::ReplyReceived(_)
                | SessionEvent::ReplyFailed(_)
        ) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        self.session.apply(event);
    }

    // Ticks from an earlier upload must not move the next upload's bar.
    fn stop_progress(&mut self) {
        if let Some(ticker) = self.progress.take() {
            ticker.abort();
        }
    }

    /// Receive and apply one event, returning it.
    pub async fn process_next(&mut self) -> Option<SessionEvent> {
        let event = self.next_event().await?;
        self.handle(event.clone());
        Some(event)
    }
}
