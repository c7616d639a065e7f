//! Problem value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Reference to an image attached to a problem: a remote URI or a local path
///
/// The domain never reads the image. Remote references (`gs://`, `http(s)://`)
/// are forwarded by URI; backends load local files themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    uri: String,
    mime_type: String,
}

impl ImageRef {
    /// Create a reference, guessing the MIME type from the file extension
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let mime_type = guess_mime_type(&uri).to_string();
        Self { uri, mime_type }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the backend can fetch the image by URI
    pub fn is_remote(&self) -> bool {
        let uri = self.uri.to_ascii_lowercase();
        ["gs://", "http://", "https://"]
            .iter()
            .any(|scheme| uri.starts_with(scheme))
    }

    /// Filesystem path of a local image, `file://` prefix stripped
    pub fn local_path(&self) -> Option<&std::path::Path> {
        if self.is_remote() {
            return None;
        }
        let path = self.uri.strip_prefix("file://").unwrap_or(&self.uri);
        Some(std::path::Path::new(path))
    }
}

fn guess_mime_type(uri: &str) -> &'static str {
    let extension = uri
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

/// A reasoning problem: text plus an optional image (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    text: String,
    image: Option<ImageRef>,
}

impl Problem {
    /// Create a text-only problem
    pub fn try_new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyProblem);
        }
        Ok(Self { text, image: None })
    }

    /// Attach an image reference
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
