use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::FrameIdResult;

/// Campaign counter bumped after a successful download or share.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterAction {
    Download,
    Share,
}

/// Body of a counter update, `{"action":"download"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CounterUpdate {
    pub action: CounterAction,
}

/// Receives counter updates. Failures never fail the export that triggered them.
pub trait StatsSink {
    fn record(&mut self, slug: &str, update: CounterUpdate) -> FrameIdResult<()>;
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStats;

impl StatsSink for NoStats {
    fn record(&mut self, _slug: &str, _update: CounterUpdate) -> FrameIdResult<()> {
        Ok(())
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct StatsLine {
    pub slug: String,
    #[serde(flatten)]
    pub update: CounterUpdate,
}

/// Appends one JSON object per update to a file.
#[derive(Clone, Debug)]
pub struct JsonLinesStats {
    path: PathBuf,
}

impl JsonLinesStats {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSink for JsonLinesStats {
    fn record(&mut self, slug: &str, update: CounterUpdate) -> FrameIdResult<()> {
        let line = serde_json::to_string(&StatsLine {
            slug: slug.to_string(),
            update,
        })
        .context("serialize counter update")?;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open stats log {}", self.path.display()))?;
        writeln!(f, "{line}").with_context(|| format!("append to {}", self.path.display()))?;
        Ok(())
    }
}

/// Record `action` for `slug`, logging instead of failing.
pub fn record_best_effort(sink: &mut dyn StatsSink, slug: &str, action: CounterAction) {
    match sink.record(slug, CounterUpdate { action }) {
        Ok(()) => tracing::debug!(slug, ?action, "counter updated"),
        Err(e) => tracing::warn!(slug, ?action, error = %e, "counter update failed"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/stats.rs"]
mod tests;
