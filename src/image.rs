// Selected receipt photo: the bytes that get uploaded plus a small textual
// preview shown on the confirm screen.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
#[cfg(test)]
use std::sync::Weak;

use indicatif::HumanBytes;
use mime_guess::mime;

use crate::error::ImageError;

/// Extensions for the native file dialog filter.
pub fn image_extensions() -> &'static [&'static str] {
    mime_guess::get_mime_extensions_str("image/*").unwrap_or(&["png", "jpg", "jpeg"])
}

/// MIME type guessed from the extension of `path`, if it names an image.
pub fn image_mime_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .iter()
        .find(|guess| guess.type_() == mime::IMAGE)
        .map(|guess| guess.essence_str().to_string())
}

/// What gets sent to the analysis service. Cloning is cheap: the bytes are
/// shared.
#[derive(Clone, Debug)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl ImagePayload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

static NEXT_PREVIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Locally derived preview of the selected photo. Released when dropped.
#[derive(Debug)]
pub struct Preview {
    id: u64,
    summary: String,
    alive: Arc<()>,
}

impl Preview {
    fn derive(payload: &ImagePayload) -> Self {
        let id = NEXT_PREVIEW_ID.fetch_add(1, Ordering::Relaxed);
        let summary = format!(
            "{} · {} · {}",
            payload.file_name,
            payload.mime_type,
            HumanBytes(payload.bytes.len() as u64)
        );
        log::debug!("created preview #{id}: {summary}");
        Self {
            id,
            summary,
            alive: Arc::new(()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Handle that stops upgrading once this preview has been released.
    #[cfg(test)]
    pub(crate) fn watch(&self) -> Weak<()> {
        Arc::downgrade(&self.alive)
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        log::debug!("released preview #{}", self.id);
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// The photo currently held by the upload session.
#[derive(Debug)]
pub struct SelectedImage {
    payload: ImagePayload,
    preview: Preview,
}

impl SelectedImage {
    /// Read an image file from disk. Non-image and empty files are refused.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let mime_type =
            image_mime_type(path).ok_or_else(|| ImageError::NotAnImage(path.to_path_buf()))?;
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ImageError::Empty(path.to_path_buf()));
        }
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("receipt.jpg")
            .to_string();

        Ok(Self::from_payload(ImagePayload::new(file_name, mime_type, bytes)))
    }

    /// Wrap bytes that did not come from a file (tests, pasted data).
    pub fn from_payload(payload: ImagePayload) -> Self {
        let preview = Preview::derive(&payload);
        Self { payload, preview }
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }
}
