use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{
    assets::decode,
    foundation::error::{DecodeError, FrameIdResult},
};

/// Where a photo or frame comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Local file (a file picker selection).
    Path(PathBuf),
    /// `data:image/...;base64,...` URL, as produced by reading an uploaded file.
    DataUrl(String),
    /// Encoded bytes already in memory.
    Bytes(Vec<u8>),
    /// Same-origin API path or external URL, resolved by an [`AssetFetcher`].
    Url(String),
}

impl ImageSource {
    /// Short description for logs. Never includes data URL payloads.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => format!("file '{}'", p.display()),
            Self::DataUrl(s) => format!("data url ({} chars)", s.len()),
            Self::Bytes(b) => format!("{} in-memory bytes", b.len()),
            Self::Url(u) => format!("url '{u}'"),
        }
    }
}

/// Bytes returned by an [`AssetFetcher`].
#[derive(Clone, Debug)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    /// `false` when the source did not grant cross-origin read access; pixels drawn from such a
    /// source taint the composite.
    pub cross_origin_ok: bool,
}

/// Resolves frame URLs to bytes.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FrameIdResult<Fetched>;
}

/// Serves previously uploaded frame artwork from a local directory.
///
/// Understands the application's same-origin paths (`/api/images/uploads/<file>` and
/// `/uploads/<file>`). Anything else, including external URLs, is refused.
#[derive(Clone, Debug)]
pub struct LocalUploads {
    root: PathBuf,
}

impl LocalUploads {
    const PREFIXES: [&'static str; 2] = ["/api/images/uploads/", "/uploads/"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, DecodeError> {
        let name = Self::PREFIXES
            .iter()
            .find_map(|p| url.strip_prefix(p))
            .ok_or_else(|| DecodeError::Io(format!("no fetcher can resolve '{url}'")))?;

        if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "." {
            return Err(DecodeError::Io(format!("invalid upload name in '{url}'")));
        }
        Ok(self.root.join(name))
    }
}

impl AssetFetcher for LocalUploads {
    fn fetch(&self, url: &str) -> FrameIdResult<Fetched> {
        let path = self.resolve(url)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| DecodeError::Io(format!("{}: {e}", path.display())))?;
        Ok(Fetched {
            bytes,
            cross_origin_ok: true,
        })
    }
}

/// Extract the encoded bytes from a base64 image data URL.
///
/// The payload size is estimated and checked against `max_bytes` before the base64 decode.
pub fn parse_data_url(url: &str, max_bytes: u64) -> FrameIdResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:image/")
        .ok_or_else(|| DecodeError::Malformed("not an image data url".to_string()))?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| DecodeError::Malformed("data url is not base64 encoded".to_string()))?;

    let estimated = (payload.len() as u64 / 4) * 3;
    decode::check_size(estimated, max_bytes)?;

    let bytes = STANDARD
        .decode(payload.trim())
        .context("decode base64 data url payload")
        .map_err(|e| DecodeError::Malformed(format!("{e:#}")))?;
    Ok(bytes)
}

/// Encode PNG bytes as a data URL (used for the restricted-platform export page).
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
