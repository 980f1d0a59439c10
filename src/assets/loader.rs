use std::sync::Arc;

use crate::{
    assets::{
        bitmap::Bitmap,
        decode,
        source::{self, AssetFetcher, ImageSource},
    },
    foundation::error::{DecodeError, FrameIdError, FrameIdResult},
};

/// Asynchronous photo/frame decoder.
///
/// Reading happens on tokio's IO facilities and decoding on the blocking pool, so the caller's
/// task stays responsive. A load never retries; the first failure is returned to the caller.
#[derive(Clone)]
pub struct ImageLoader {
    max_bytes: u64,
    fetcher: Option<Arc<dyn AssetFetcher>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("max_bytes", &self.max_bytes)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl ImageLoader {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            fetcher: None,
        }
    }

    /// Resolve [`ImageSource::Url`] sources through `fetcher`.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Load and decode `source`.
    pub async fn load(&self, source: ImageSource) -> FrameIdResult<Bitmap> {
        let what = source.describe();
        tracing::debug!(source = %what, "loading image");

        let result = self.load_inner(source).await;
        if let Err(err) = &result {
            tracing::warn!(source = %what, error = %err, "image load failed");
        }
        result
    }

    async fn load_inner(&self, src: ImageSource) -> FrameIdResult<Bitmap> {
        let max = self.max_bytes;
        match src {
            ImageSource::Bytes(bytes) => decode_blocking(bytes, max, false).await,
            ImageSource::DataUrl(url) => {
                let bytes = source::parse_data_url(&url, max)?;
                decode_blocking(bytes, max, false).await
            }
            ImageSource::Path(path) => {
                let meta = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| DecodeError::Io(format!("{}: {e}", path.display())))?;
                decode::check_size(meta.len(), max)?;
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| DecodeError::Io(format!("{}: {e}", path.display())))?;
                decode_blocking(bytes, max, false).await
            }
            ImageSource::Url(url) => {
                let fetcher = self.fetcher.clone().ok_or_else(|| {
                    DecodeError::Io(format!("no fetcher configured for '{url}'"))
                })?;
                let fetched = tokio::task::spawn_blocking(move || fetcher.fetch(&url))
                    .await
                    .map_err(|e| FrameIdError::Other(anyhow::anyhow!("fetch task failed: {e}")))??;
                decode_blocking(fetched.bytes, max, !fetched.cross_origin_ok).await
            }
        }
    }
}

async fn decode_blocking(bytes: Vec<u8>, max: u64, tainted: bool) -> FrameIdResult<Bitmap> {
    let bitmap = tokio::task::spawn_blocking(move || decode::decode_bitmap(&bytes, max))
        .await
        .map_err(|e| FrameIdError::Other(anyhow::anyhow!("decode task failed: {e}")))??;
    Ok(if tainted {
        bitmap.into_tainted()
    } else {
        bitmap
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
