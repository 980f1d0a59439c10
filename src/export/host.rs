use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    export::exporter::{ExportHost, ShareSheetRequest, WindowOutcome},
    foundation::error::{FrameIdError, FrameIdResult},
};

/// [`ExportHost`] backed by an output directory.
///
/// Downloads become files, windows become `window-<n>.html` files. URLs opened and links copied
/// are kept for the caller to print.
#[derive(Debug)]
pub struct DirectoryHost {
    dir: PathBuf,
    popups_allowed: bool,
    blobs: HashMap<String, Vec<u8>>,
    next_id: u64,
    written: Vec<PathBuf>,
    opened_urls: Vec<String>,
    clipboard: Option<String>,
}

impl DirectoryHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            popups_allowed: true,
            blobs: HashMap::new(),
            next_id: 0,
            written: Vec::new(),
            opened_urls: Vec::new(),
            clipboard: None,
        }
    }

    /// Simulate a popup blocker.
    pub fn with_popups_allowed(mut self, allowed: bool) -> Self {
        self.popups_allowed = allowed;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn opened_urls(&self) -> &[String] {
        &self.opened_urls
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn live_object_urls(&self) -> usize {
        self.blobs.len()
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> FrameIdResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(FrameIdError::validation(format!(
                "\"{name}\" is not a plain file name"
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory {}", self.dir.display()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        self.written.push(path.clone());
        Ok(path)
    }
}

impl ExportHost for DirectoryHost {
    fn create_object_url(&mut self, png: &[u8]) -> FrameIdResult<String> {
        self.next_id += 1;
        let url = format!("blob:frameid/{}", self.next_id);
        self.blobs.insert(url.clone(), png.to_vec());
        Ok(url)
    }

    fn revoke_object_url(&mut self, url: &str) {
        self.blobs.remove(url);
    }

    fn trigger_download(&mut self, url: &str, filename: &str) -> FrameIdResult<()> {
        let bytes = self
            .blobs
            .get(url)
            .cloned()
            .ok_or_else(|| FrameIdError::validation(format!("unknown object url {url}")))?;
        let path = self.write(filename, &bytes)?;
        tracing::debug!(path = %path.display(), "download saved");
        Ok(())
    }

    fn open_window(&mut self, html: &str) -> FrameIdResult<WindowOutcome> {
        if !self.popups_allowed {
            return Ok(WindowOutcome::Blocked);
        }
        self.next_id += 1;
        let name = format!("window-{}.html", self.next_id);
        self.write(&name, html.as_bytes())?;
        Ok(WindowOutcome::Opened)
    }

    fn open_url(&mut self, url: &str) -> FrameIdResult<WindowOutcome> {
        if !self.popups_allowed {
            return Ok(WindowOutcome::Blocked);
        }
        self.opened_urls.push(url.to_string());
        Ok(WindowOutcome::Opened)
    }

    fn share_files(&mut self, request: &ShareSheetRequest<'_>) -> FrameIdResult<()> {
        Err(FrameIdError::validation(format!(
            "no share sheet available for {}",
            request.filename
        )))
    }

    fn copy_to_clipboard(&mut self, text: &str) -> FrameIdResult<()> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/host.rs"]
mod tests;
