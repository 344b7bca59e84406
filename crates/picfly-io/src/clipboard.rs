use std::path::{Path, PathBuf};

use arboard::Clipboard;
use image::RgbaImage;
use url::Url;

use crate::IoError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// System clipboard, read and written in plain values.
///
/// Reads never block and return `None` for anything unavailable or unsupported.
pub trait ClipboardAccess: Send + Sync {
    fn read_image(&self) -> Option<RgbaImage>;

    fn read_text(&self) -> Option<String>;

    fn write_text(&self, text: &str) -> Result<(), IoError>;
}

/// arboard-backed clipboard. A handle is opened per call so nothing is held across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn open() -> Option<Clipboard> {
        Clipboard::new()
            .inspect_err(|e| tracing::warn!("clipboard unavailable: {e}"))
            .ok()
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_image(&self) -> Option<RgbaImage> {
        let data = Self::open()?.get_image().ok()?;
        RgbaImage::from_raw(
            data.width as u32,
            data.height as u32,
            data.bytes.into_owned(),
        )
    }

    fn read_text(&self) -> Option<String> {
        Self::open()?
            .get_text()
            .ok()
            .filter(|text| !text.trim().is_empty())
    }

    fn write_text(&self, text: &str) -> Result<(), IoError> {
        Clipboard::new()?.set_text(text)?;
        Ok(())
    }
}

/// Something on the clipboard worth sending somewhere
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    Image(RgbaImage),
    Url(String),
    ImageFile(PathBuf),
}

/// Inspect the clipboard: an image first, then text naming a remote image (only when
/// `accept_urls`), then text naming an image file on disk.
pub fn classify(clipboard: &dyn ClipboardAccess, accept_urls: bool) -> Option<ClipboardContent> {
    if let Some(image) = clipboard.read_image()
        && image.width() > 0
        && image.height() > 0
    {
        return Some(ClipboardContent::Image(image));
    }

    let text = clipboard.read_text()?;
    let text = unquote(text.trim());

    match Url::parse(text) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            accept_urls.then(|| ClipboardContent::Url(url.to_string()))
        }
        Ok(url) if url.scheme() == "file" => {
            let path = url.to_file_path().ok()?;
            is_image_file(&path).then_some(ClipboardContent::ImageFile(path))
        }
        // Plain paths, including drive paths that parse with a one-letter scheme
        _ => {
            let path = PathBuf::from(text);
            is_image_file(&path).then_some(ClipboardContent::ImageFile(path))
        }
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn is_image_file(path: &Path) -> bool {
    let known = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    known && path.is_file()
}
