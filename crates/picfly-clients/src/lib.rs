mod http;
mod response;

use std::path::PathBuf;

use picfly_types::AppError;

pub use http::{HttpOcrClient, HttpUploader};
pub use response::extract_text;

/// What gets handed to the image host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    /// Encoded PNG
    Bytes(Vec<u8>),
    /// Image file on disk
    Path(PathBuf),
    /// Remote image the host should fetch itself
    Url(String),
}

impl UploadPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            UploadPayload::Bytes(_) => "image",
            UploadPayload::Path(_) => "file",
            UploadPayload::Url(_) => "url",
        }
    }
}

/// Image hosting interface
#[async_trait::async_trait]
pub trait UploadClient: Send + Sync {
    /// Upload and return the public link
    async fn upload(&self, payload: UploadPayload) -> Result<String, ClientError>;
}

/// Text recognition interface
#[async_trait::async_trait]
pub trait OcrClient: Send + Sync {
    /// Recognize text in an encoded image or an image file
    async fn recognize(&self, image: UploadPayload) -> Result<String, ClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no {0} endpoint configured")]
    NotConfigured(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<ClientError> for AppError {
    fn from(e: ClientError) -> Self {
        AppError::NetworkCallFailed(e.to_string())
    }
}
