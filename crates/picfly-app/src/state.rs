use std::sync::Arc;

use picfly_capture::RegionSelector;
use picfly_clients::{OcrClient, UploadClient};
use picfly_config::Config;
use picfly_io::{ClipboardAccess, NotificationSink};

/// Everything the dispatcher's actions need, shared across tasks.
pub struct AppState {
    pub config: Config,
    pub selector: Arc<RegionSelector>,
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub uploader: Arc<dyn UploadClient>,
    pub ocr: Arc<dyn OcrClient>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppState {
    /// Wire up the real OS and network collaborators.
    #[cfg(windows)]
    pub fn new(config: Config) -> anyhow::Result<Self> {
        use anyhow::Context;
        use picfly_capture::{WinOverlay, XcapCapturer};
        use picfly_clients::{HttpOcrClient, HttpUploader};
        use picfly_io::{SystemClipboard, system_notifier};

        let selector = RegionSelector::new(
            Arc::new(XcapCapturer),
            Arc::new(WinOverlay),
            config.selector,
        );
        let uploader = HttpUploader::new(config.upload.clone()).context("Failed to build upload client")?;
        let ocr = HttpOcrClient::new(config.ocr.clone()).context("Failed to build OCR client")?;
        let notifier: Arc<dyn NotificationSink> = Arc::from(system_notifier(&config.notify));

        if config.upload.endpoint.is_empty() {
            tracing::warn!("no upload endpoint configured (PICFLY_UPLOAD_ENDPOINT), uploads will fail");
        }
        if config.ocr.endpoint.is_empty() {
            tracing::warn!("no OCR endpoint configured (PICFLY_OCR_ENDPOINT), OCR will fail");
        }

        Ok(Self {
            config,
            selector: Arc::new(selector),
            clipboard: Arc::new(SystemClipboard),
            uploader: Arc::new(uploader),
            ocr: Arc::new(ocr),
            notifier,
        })
    }

    #[cfg(not(windows))]
    pub fn new(_config: Config) -> anyhow::Result<Self> {
        Err(picfly_types::AppError::InputSourceUnavailable(
            "screen overlay and keyboard hook need Windows".into(),
        )
        .into())
    }

    pub fn title(&self) -> &str {
        &self.config.notify.title
    }
}
