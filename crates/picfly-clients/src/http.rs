use std::path::Path;
use std::time::Duration;

use picfly_config::ocr::OcrConfig;
use picfly_config::upload::UploadConfig;
use reqwest::multipart::{Form, Part};

use crate::response::{extract_text, snippet};
use crate::{ClientError, OcrClient, UploadClient, UploadPayload};

fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()?)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Multipart form carrying `payload` under `field`.
///
/// Files keep their own name and MIME type, links go as a plain text value.
async fn form_for(field: String, payload: UploadPayload) -> Result<Form, ClientError> {
    let form = match payload {
        UploadPayload::Bytes(png) => Form::new().part(field, png_part(png)?),
        UploadPayload::Path(path) => {
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| ClientError::Read {
                    path: path.clone(),
                    source,
                })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let part = Part::bytes(data)
                .file_name(name)
                .mime_str(mime_for(&path))
                .map_err(ClientError::Network)?;
            Form::new().part(field, part)
        }
        UploadPayload::Url(url) => Form::new().text(field, url),
    };
    Ok(form)
}

fn png_part(png: Vec<u8>) -> Result<Part, ClientError> {
    Part::bytes(png)
        .file_name("picfly.png")
        .mime_str("image/png")
        .map_err(ClientError::Network)
}

/// POST `form` to `endpoint` and return the raw body of a successful response.
async fn post_form(
    http: &reqwest::Client,
    endpoint: &str,
    token: &str,
    form: Form,
) -> Result<String, ClientError> {
    let mut request = http.post(endpoint).multipart(form);
    if !token.is_empty() {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: snippet(&body),
        });
    }
    Ok(body)
}

/// Multipart uploader for image hosts that answer with JSON
pub struct HttpUploader {
    config: UploadConfig,
    http: reqwest::Client,
}

impl HttpUploader {
    pub fn new(config: UploadConfig) -> Result<Self, ClientError> {
        let http = build_client(config.timeout_seconds)?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: UploadConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait::async_trait]
impl UploadClient for HttpUploader {
    async fn upload(&self, payload: UploadPayload) -> Result<String, ClientError> {
        if self.config.endpoint.is_empty() {
            return Err(ClientError::NotConfigured("upload"));
        }

        tracing::debug!(kind = payload.kind(), endpoint = %self.config.endpoint, "uploading");
        let form = form_for(self.config.file_field.clone(), payload).await?;
        let body = post_form(&self.http, &self.config.endpoint, &self.config.token, form).await?;

        let link = extract_text(&body, &self.config.link_pointer)?;
        if link.is_empty() {
            return Err(ClientError::Response("empty link in response".into()));
        }
        tracing::info!(%link, "upload finished");
        Ok(link)
    }
}

/// Multipart client for an OCR service that answers with JSON
pub struct HttpOcrClient {
    config: OcrConfig,
    http: reqwest::Client,
}

impl HttpOcrClient {
    pub fn new(config: OcrConfig) -> Result<Self, ClientError> {
        let http = build_client(config.timeout_seconds)?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: OcrConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait::async_trait]
impl OcrClient for HttpOcrClient {
    async fn recognize(&self, image: UploadPayload) -> Result<String, ClientError> {
        if self.config.endpoint.is_empty() {
            return Err(ClientError::NotConfigured("OCR"));
        }

        tracing::debug!(kind = image.kind(), endpoint = %self.config.endpoint, "recognizing");
        let form = form_for(self.config.file_field.clone(), image).await?;
        let body = post_form(&self.http, &self.config.endpoint, &self.config.token, form).await?;

        let text = extract_text(&body, &self.config.text_pointer)?;
        tracing::info!(chars = text.chars().count(), "OCR finished");
        Ok(text)
    }
}
