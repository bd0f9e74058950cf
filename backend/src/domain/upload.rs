//! Uploaded image names and acceptance rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Extensions accepted for uploads.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    /// No `image` part was sent.
    #[error("No file uploaded")]
    Missing,
    /// Extension or MIME type is not an accepted image type.
    #[error("Only image files are allowed!")]
    NotAnImage,
    /// File exceeded [`MAX_UPLOAD_BYTES`].
    #[error("File too large")]
    TooLarge,
    /// Stored name was empty or contained path components.
    #[error("invalid upload name")]
    InvalidName,
}

/// Name of a stored upload: a single path component with an image extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UploadName(String);

impl UploadName {
    /// Validate a name received in a URL.
    ///
    /// # Errors
    /// Returns [`UploadValidationError::InvalidName`] for empty names, names
    /// with separators or dot segments, and
    /// [`UploadValidationError::NotAnImage`] for other extensions.
    pub fn parse(raw: &str) -> Result<Self, UploadValidationError> {
        if raw.is_empty()
            || raw.starts_with('.')
            || raw.contains(['/', '\\', '\0'])
            || raw.contains("..")
        {
            return Err(UploadValidationError::InvalidName);
        }
        extension_of(raw).ok_or(UploadValidationError::NotAnImage)?;
        Ok(Self(raw.to_owned()))
    }

    /// Fresh name of the form `image-<millis>-<suffix>.<ext>`.
    #[must_use]
    pub fn generate(extension: ImageExtension, now: DateTime<Utc>, suffix: u32) -> Self {
        Self(format!(
            "image-{}-{suffix}.{}",
            now.timestamp_millis(),
            extension.as_str()
        ))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// MIME type implied by the extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match extension_of(&self.0) {
            Some(ext) => ext.mime(),
            None => "application/octet-stream",
        }
    }
}

impl fmt::Display for UploadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An accepted image extension, lower-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExtension(&'static str);

impl ImageExtension {
    /// The extension without its dot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    fn mime(self) -> &'static str {
        match self.0 {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        }
    }
}

fn extension_of(file_name: &str) -> Option<ImageExtension> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let lowered = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .into_iter()
        .find(|known| *known == lowered)
        .map(ImageExtension)
}

/// Check a client file name and MIME type.
///
/// Both must name an accepted image type; the MIME subtype is matched
/// against the same extension list.
///
/// # Errors
/// Returns [`UploadValidationError::NotAnImage`] otherwise.
pub fn accept_image(
    file_name: &str,
    mime: Option<&str>,
) -> Result<ImageExtension, UploadValidationError> {
    let extension = extension_of(file_name).ok_or(UploadValidationError::NotAnImage)?;
    let subtype = mime
        .and_then(|value| value.strip_prefix("image/"))
        .map(str::to_ascii_lowercase)
        .ok_or(UploadValidationError::NotAnImage)?;
    if !IMAGE_EXTENSIONS.contains(&subtype.as_str()) {
        return Err(UploadValidationError::NotAnImage);
    }
    Ok(extension)
}
