use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    error::TransportError,
    protocol::{
        IngestResponse, QueryRequest, QueryResponse, QUERY_PATH, SESSION_PATH, UPLOAD_FIELD,
        UPLOAD_PATH,
    },
};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub mod config;
pub mod controller;
pub mod display;
pub mod markup;
pub mod selection;
pub mod transcript;

pub use config::{load_settings, ClientSettings};
pub use controller::{
    DocChatController, DocumentUpload, QueryTicket, QuestionOutcome, Session, UploadOutcome,
    UploadTicket,
};
pub use selection::{FileContent, PickedFile, SelectionSource};

/// The two operations the controller needs from the document service.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn ingest(&self, upload: &DocumentUpload) -> Result<IngestResponse, TransportError>;
    async fn query(&self, question: &str) -> Result<QueryResponse, TransportError>;
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

/// Room left in the upload limit for the multipart boundaries and part
/// headers; the service measures the whole request body, not the file.
pub const MULTIPART_FRAMING_ALLOWANCE: u64 = 512;

/// Talks to the document service over HTTP.
///
/// The service keys an uploaded document to a cookie session, so the client
/// keeps a cookie store and visits the root once before its first call.
pub struct HttpDocumentBackend {
    http: Client,
    server_url: String,
    max_upload_bytes: u64,
    session: OnceCell<()>,
}

impl HttpDocumentBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        Self::with_timeout(
            settings.server_url.clone(),
            settings.request_timeout(),
            settings.max_upload_bytes,
        )
    }

    pub fn with_timeout(
        server_url: impl Into<String>,
        timeout: Duration,
        max_upload_bytes: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            max_upload_bytes,
            session: OnceCell::new(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Issues the bootstrap `GET /` until it succeeds once. A non-success
    /// status is logged and retried on the next call; the call itself proceeds.
    async fn ensure_session(&self) -> Result<(), TransportError> {
        if self.session.initialized() {
            return Ok(());
        }
        let response = self
            .http
            .get(format!("{}{SESSION_PATH}", self.server_url))
            .send()
            .await
            .map_err(transport_error)?;
        if response.status().is_success() {
            debug!(server_url = %self.server_url, "service session established");
            let _ = self.session.set(());
        } else {
            warn!(
                server_url = %self.server_url,
                status = response.status().as_u16(),
                "session bootstrap returned a non-success status; continuing"
            );
        }
        Ok(())
    }

    async fn read_document(&self, upload: &DocumentUpload) -> Result<Vec<u8>, TransportError> {
        match &upload.content {
            FileContent::Bytes(bytes) => {
                self.check_size(&upload.file_name, bytes.len() as u64)?;
                Ok(bytes.to_vec())
            }
            FileContent::Path(path) => {
                let io_error = |err: std::io::Error| {
                    TransportError::Io(format!("{}: {err}", path.display()))
                };
                let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
                self.check_size(&upload.file_name, metadata.len())?;
                tokio::fs::read(path).await.map_err(io_error)
            }
        }
    }

    /// Largest file that still fits the service limit once wrapped in the form.
    fn file_size_limit(&self, file_name: &str) -> u64 {
        self.max_upload_bytes
            .saturating_sub(MULTIPART_FRAMING_ALLOWANCE)
            .saturating_sub(file_name.len() as u64)
    }

    fn check_size(&self, file_name: &str, size: u64) -> Result<(), TransportError> {
        let limit = self.file_size_limit(file_name);
        if size > limit {
            return Err(TransportError::TooLarge { size, limit });
        }
        Ok(())
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl DocumentBackend for HttpDocumentBackend {
    async fn ingest(&self, upload: &DocumentUpload) -> Result<IngestResponse, TransportError> {
        let bytes = self.read_document(upload).await?;
        self.ensure_session().await?;

        let mime = mime_guess::from_path(&upload.file_name).first_or_octet_stream();
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(mime.essence_str())
            .map_err(transport_error)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(file_name = %upload.file_name, size, mime = %mime, "posting document");
        let response = self
            .http
            .post(format!("{}{UPLOAD_PATH}", self.server_url))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode(response).await
    }

    async fn query(&self, question: &str) -> Result<QueryResponse, TransportError> {
        self.ensure_session().await?;

        let response = self
            .http
            .post(format!("{}{QUERY_PATH}", self.server_url))
            .json(&QueryRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;
        debug!(status = response.status().as_u16(), "query response received");
        Self::decode(response).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
