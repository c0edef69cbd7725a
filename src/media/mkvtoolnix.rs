use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{Result, LegendaError};
use crate::tracks::TrackDescriptor;
use super::{ContainerTools, MkvCommandBuilder};

// Subset of the `mkvmerge -J` identification report
#[derive(Debug, Deserialize)]
struct IdentifyReport {
    #[serde(default)]
    tracks: Vec<ReportTrack>,
}

#[derive(Debug, Deserialize)]
struct ReportTrack {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    codec: String,
    #[serde(default)]
    properties: ReportProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ReportProperties {
    language: Option<String>,
    language_ietf: Option<String>,
    track_name: Option<String>,
}

/// Subtitle tracks from an identification report, in report order
pub fn parse_identify_report(json: &str) -> Result<Vec<TrackDescriptor>> {
    let report: IdentifyReport = serde_json::from_str(json)?;

    Ok(report
        .tracks
        .into_iter()
        .filter(|track| track.kind == "subtitles")
        .map(|track| TrackDescriptor {
            id: track.id,
            codec: track.codec,
            language: track
                .properties
                .language
                .filter(|lang| !lang.is_empty() && lang != "und")
                .or(track.properties.language_ietf),
            name: track.properties.track_name,
        })
        .collect())
}

/// mkvmerge/mkvextract backed container tools
pub struct MkvToolNix {
    config: MediaConfig,
    commands: MkvCommandBuilder,
}

impl MkvToolNix {
    pub fn new(config: MediaConfig) -> Self {
        let commands = MkvCommandBuilder::new(&config.mkvmerge_path, &config.mkvextract_path);
        Self { config, commands }
    }

    fn temp_path(&self) -> PathBuf {
        self.config
            .temp_dir
            .join(format!("legenda_track_{}.srt", Uuid::new_v4()))
    }
}

#[async_trait]
impl ContainerTools for MkvToolNix {
    async fn subtitle_tracks(&self, container: &Path) -> Vec<TrackDescriptor> {
        let output = match self.commands.identify(container).execute().await {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to inspect {}: {}", container.display(), e);
                return Vec::new();
            }
        };

        match parse_identify_report(&String::from_utf8_lossy(&output.stdout)) {
            Ok(tracks) => {
                debug!("{} subtitle tracks in {}", tracks.len(), container.display());
                tracks
            }
            Err(e) => {
                error!("Unreadable identification report for {}: {}", container.display(), e);
                Vec::new()
            }
        }
    }

    async fn extract_track(&self, container: &Path, track_id: u64, destination: &Path) -> Result<()> {
        fs::create_dir_all(&self.config.temp_dir).await?;
        let temp_path = self.temp_path();

        info!("Extracting track {} of {} to {}",
              track_id, container.display(), temp_path.display());

        let result = self.commands.extract_track(container, track_id, temp_path.as_path()).execute().await;
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        move_file(&temp_path, destination).await?;

        let size = fs::metadata(destination).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            warn!("Extracted subtitle is empty: {}", destination.display());
            let _ = fs::remove_file(destination).await;
            return Err(LegendaError::Media(format!(
                "Extraction produced no data for track {} of {}", track_id, container.display()
            )));
        }

        info!("Subtitle extracted: {}", destination.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<String> {
        let output = self.commands.version_check().execute().await?;
        let version = String::from_utf8_lossy(&output.stdout);
        Ok(version.lines().next().unwrap_or("Unknown version").to_string())
    }
}

/// Rename, falling back to copy+remove across filesystems
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    fs::copy(from, to).await?;
    fs::remove_file(from).await?;
    Ok(())
}
