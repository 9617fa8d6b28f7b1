// src/services/backend.rs
use std::time::Duration;

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::TRACING_TARGET_BACKEND;
use crate::error::BackendError;
use crate::message::{ChatRequest, ChatResponse, UploadResponse};
use crate::services::dataset::FileKind;

/// A file ready to be posted as the `file` form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub kind: FileKind,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The external analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, BackendError>;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError>;
}

/// [`AnalysisBackend`] over HTTP: `POST /api/upload` and `POST /api/chat`
/// relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// No timeout is applied unless one is given.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, BackendError> {
        let url = self.endpoint("api/upload")?;
        debug!(
            target: TRACING_TARGET_BACKEND,
            %url,
            filename = %file.filename,
            bytes = file.bytes.len(),
            "posting upload"
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(file.mime_type)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        decode(response).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        let url = self.endpoint("api/chat")?;
        debug!(
            target: TRACING_TARGET_BACKEND,
            %url,
            dataset_id = %request.dataset_id,
            "posting chat message"
        );

        let response = self.client.post(url).json(&request).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let status_text = status_text(&response);
        debug!(target: TRACING_TARGET_BACKEND, %status, "request rejected");
        return Err(BackendError::status(status.as_u16(), status_text));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

// The server's own reason phrase when it sent a non-standard one.
fn status_text(response: &Response) -> String {
    let status = response.status();
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| status.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

// `Url::join` drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
