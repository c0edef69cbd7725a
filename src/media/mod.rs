// Container inspection and extraction
//
// The pipeline only needs two things from a container: the list of subtitle
// tracks and a way to demux one of them to a text file.
// - Commands: tool invocation builder
// - MkvToolNix: mkvmerge/mkvextract implementation

pub mod commands;
pub mod mkvtoolnix;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use mkvtoolnix::*;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::tracks::TrackDescriptor;

/// Operations the pipeline needs from the demux tooling
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerTools: Send + Sync {
    /// Subtitle tracks of a container; empty when inspection fails
    async fn subtitle_tracks(&self, container: &Path) -> Vec<TrackDescriptor>;

    /// Demux one track to `destination`, which exists and is non-empty on success
    async fn extract_track(&self, container: &Path, track_id: u64, destination: &Path) -> Result<()>;

    /// Version string of the tooling
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for container tool implementations
pub struct ContainerToolsFactory;

impl ContainerToolsFactory {
    pub fn create_tools(config: MediaConfig) -> Box<dyn ContainerTools> {
        Box::new(MkvToolNix::new(config))
    }
}
