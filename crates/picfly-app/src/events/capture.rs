use picfly_capture::CaptureError;
use picfly_clients::UploadPayload;
use picfly_io::Notification;

use super::{ActionContext, preview};

/// Let the user pick a region and return it as PNG bytes.
///
/// `Err` carries the notification to show; `Ok(None)` means the selection was abandoned and
/// nothing should be reported.
async fn select_png(ctx: &ActionContext) -> Result<Option<Vec<u8>>, Notification> {
    let selector = ctx.state.selector.clone();
    let cancel = ctx.cancel.clone();

    let result = tokio::task::spawn_blocking(move || {
        let region = selector.select(&cancel)?;
        region.map(|region| region.to_png()).transpose()
    })
    .await;
    ctx.selection_finished();

    match result {
        Ok(Ok(png)) => Ok(png),
        Ok(Err(CaptureError::Busy)) => {
            tracing::info!("selector already active, dropping command");
            Ok(None)
        }
        Ok(Err(e)) => Err(ctx.error(e)),
        Err(e) => {
            tracing::error!("selection task failed: {e}");
            Err(ctx.error(CaptureError::Overlay(e.to_string())))
        }
    }
}

pub async fn handle_capture_upload(ctx: &ActionContext) -> Option<Notification> {
    let png = match select_png(ctx).await {
        Ok(Some(png)) => png,
        Ok(None) => return None,
        Err(notification) => return Some(notification),
    };

    tracing::debug!(bytes = png.len(), "uploading selection");
    let uploaded = ctx
        .cancel
        .run_until_cancelled(ctx.state.uploader.upload(UploadPayload::Bytes(png)))
        .await?;

    Some(match uploaded {
        Ok(link) => ctx.link_ready(&link),
        Err(e) => ctx.error(e),
    })
}

pub async fn handle_capture_ocr(ctx: &ActionContext) -> Option<Notification> {
    let png = match select_png(ctx).await {
        Ok(Some(png)) => png,
        Ok(None) => return None,
        Err(notification) => return Some(notification),
    };

    tracing::debug!(bytes = png.len(), "recognizing selection");
    let recognized = ctx
        .cancel
        .run_until_cancelled(ctx.state.ocr.recognize(UploadPayload::Bytes(png)))
        .await?;

    Some(match recognized {
        Ok(text) => ctx.text_ready(&text),
        Err(e) => ctx.error(e),
    })
}

impl ActionContext {
    /// Copy the link and report it.
    pub fn link_ready(&self, link: &str) -> Notification {
        tracing::info!(%link, "upload finished");
        self.copy(link);
        self.info(format!("Link copied: {link}"))
    }

    pub fn text_ready(&self, text: &str) -> Notification {
        let text = text.trim();
        if text.is_empty() {
            return self.info("No text found");
        }
        tracing::info!(chars = text.chars().count(), "text recognized");
        self.copy(text);
        self.info(format!("Text copied: {}", preview(text)))
    }

    fn copy(&self, text: &str) {
        if let Err(e) = self.state.clipboard.write_text(text) {
            tracing::warn!("failed to write clipboard: {e}");
        }
    }
}
