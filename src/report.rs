use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Where containers needing manual handling are recorded
pub trait DeferredSink: Send + Sync {
    fn record(&self, container: &Path) -> Result<()>;
}

/// Appends one path per line to a text file
pub struct FileDeferredSink {
    path: PathBuf,
}

impl FileDeferredSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeferredSink for FileDeferredSink {
    fn record(&self, container: &Path) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", container.display())?;
        Ok(())
    }
}

/// Keeps recorded containers in memory
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<PathBuf>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<PathBuf> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl DeferredSink for MemorySink {
    fn record(&self, container: &Path) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(container.to_path_buf());
        }
        Ok(())
    }
}

/// Terminal state of one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Target-language sidecar already on disk
    TargetExists,
    /// Container already carries a target-language track
    AlreadySatisfied,
    /// Inspection found no subtitle tracks (or failed)
    NoSubtitleTracks,
    /// No source-language track
    NoSourceTrack,
    /// Only bitmap source-language tracks; recorded for manual handling
    DeferredImageBased,
    /// Sidecar written with this many translated cues
    Translated { cues: usize },
    Failed(String),
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TargetExists => "target exists",
            Self::AlreadySatisfied => "target track embedded",
            Self::NoSubtitleTracks => "no subtitle tracks",
            Self::NoSourceTrack => "no source track",
            Self::DeferredImageBased => "deferred (image-based)",
            Self::Translated { .. } => "translated",
            Self::Failed(_) => "failed",
        }
    }
}

/// Outcome counts for a batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    counts: BTreeMap<&'static str, usize>,
    total: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        *self.counts.entry(outcome.label()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} files", self.total)?;
        for (label, count) in &self.counts {
            write!(f, ", {}: {}", label, count)?;
        }
        Ok(())
    }
}
