use picfly_capture::encode_png;
use picfly_clients::UploadPayload;
use picfly_io::{ClipboardContent, Notification, classify};
use picfly_types::AppError;

use super::ActionContext;

/// Read the clipboard off the async runtime and turn it into something sendable.
///
/// Images are encoded to PNG, links and files are passed along as they are.
async fn read_clipboard(ctx: &ActionContext, accept_urls: bool) -> Result<UploadPayload, Notification> {
    let clipboard = ctx.state.clipboard.clone();
    let read = tokio::task::spawn_blocking(move || {
        classify(clipboard.as_ref(), accept_urls).map(|content| match content {
            ClipboardContent::Image(image) => encode_png(&image).map(UploadPayload::Bytes),
            ClipboardContent::Url(url) => Ok(UploadPayload::Url(url)),
            ClipboardContent::ImageFile(path) => Ok(UploadPayload::Path(path)),
        })
    })
    .await;

    match read {
        Ok(Some(Ok(payload))) => {
            tracing::debug!(kind = payload.kind(), "clipboard content accepted");
            Ok(payload)
        }
        Ok(Some(Err(e))) => Err(ctx.error(e)),
        Ok(None) => Err(ctx.error(AppError::ClipboardEmptyOrUnsupported)),
        Err(e) => {
            tracing::error!("clipboard task failed: {e}");
            Err(ctx.error(AppError::ClipboardEmptyOrUnsupported))
        }
    }
}

pub async fn handle_clipboard_upload(ctx: &ActionContext) -> Option<Notification> {
    let payload = match read_clipboard(ctx, true).await {
        Ok(payload) => payload,
        Err(notification) => return Some(notification),
    };

    let uploaded = ctx
        .cancel
        .run_until_cancelled(ctx.state.uploader.upload(payload))
        .await?;

    Some(match uploaded {
        Ok(link) => ctx.link_ready(&link),
        Err(e) => ctx.error(e),
    })
}

pub async fn handle_clipboard_ocr(ctx: &ActionContext) -> Option<Notification> {
    let image = match read_clipboard(ctx, false).await {
        Ok(UploadPayload::Url(_)) => return Some(ctx.error(AppError::ClipboardEmptyOrUnsupported)),
        // Files go to the OCR service as they are on disk
        Ok(image) => image,
        Err(notification) => return Some(notification),
    };

    let recognized = ctx
        .cancel
        .run_until_cancelled(ctx.state.ocr.recognize(image))
        .await?;

    Some(match recognized {
        Ok(text) => ctx.text_ready(&text),
        Err(e) => ctx.error(e),
    })
}
