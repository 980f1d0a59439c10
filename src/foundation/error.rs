/// Convenience result type used across Frame ID.
pub type FrameIdResult<T> = Result<T, FrameIdError>;

/// Reasons a photo or frame could not be turned into a bitmap.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Bytes are not PNG, JPEG or WEBP.
    #[error("unsupported image format (expected PNG, JPEG or WEBP)")]
    UnsupportedFormat,

    /// Source exceeds the configured upload limit. Checked before decoding.
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        /// Size of the rejected source in bytes.
        size: u64,
        /// Configured maximum in bytes.
        limit: u64,
    },

    /// Recognized container with broken contents, or an unparsable data URL.
    #[error("malformed image: {0}")]
    Malformed(String),

    /// Source could not be read at all.
    #[error("cannot read image source: {0}")]
    Io(String),
}

/// Top-level error taxonomy used by editor, renderer and exporter APIs.
#[derive(thiserror::Error, Debug)]
pub enum FrameIdError {
    /// Photo or frame failed to load.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The restricted-platform export path could not open its window.
    #[error("export blocked: {0}")]
    ExportBlocked(String),

    /// The composite contains cross-origin pixels and cannot be serialized.
    #[error("canvas is tainted by a cross-origin frame")]
    CanvasTainted,

    /// Invalid caller-provided data or an operation issued in the wrong state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised while rasterizing or encoding pixels.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameIdError {
    /// Build a [`FrameIdError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FrameIdError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FrameIdError::ExportBlocked`] value.
    pub fn export_blocked(msg: impl Into<String>) -> Self {
        Self::ExportBlocked(msg.into())
    }

    /// Build a [`FrameIdError::Decode`] value carrying [`DecodeError::Malformed`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Decode(DecodeError::Malformed(msg.into()))
    }

    /// Message shown to the person at the keyboard.
    ///
    /// Every failure is surfaced at the boundary of the action that caused it, so each variant
    /// maps to text that tells the user what to do next.
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(DecodeError::TooLarge { limit, .. }) => format!(
                "File is too large. The maximum size is {} MB, please choose another image.",
                limit / (1024 * 1024)
            ),
            Self::Decode(_) => {
                "This image cannot be opened. Please choose a PNG, JPEG or WEBP file.".to_string()
            }
            Self::ExportBlocked(_) => {
                "Popup was blocked. Please allow popups for this site to download.".to_string()
            }
            Self::CanvasTainted => "Export failed, try another frame.".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Render(_) | Self::Other(_) => {
                "Download failed. Please take a screenshot of the result or try another browser."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
