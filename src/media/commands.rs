use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, LegendaError};

/// External tool invocation, built up argument by argument
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ToolCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Run to completion and return the captured output.
    ///
    /// A non-zero exit status becomes `LegendaError::Media` carrying stderr.
    pub async fn execute(&self) -> Result<Output> {
        debug!("Executing: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| LegendaError::Media(format!(
                "Failed to execute {}: {}", self.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(LegendaError::Media(format!(
                "{} failed ({}): {}",
                self.description,
                output.status,
                if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() }
            )));
        }

        Ok(output)
    }
}

/// Builders for the mkvtoolnix invocations
pub struct MkvCommandBuilder {
    mkvmerge_path: String,
    mkvextract_path: String,
}

impl MkvCommandBuilder {
    pub fn new<S1: Into<String>, S2: Into<String>>(mkvmerge_path: S1, mkvextract_path: S2) -> Self {
        Self {
            mkvmerge_path: mkvmerge_path.into(),
            mkvextract_path: mkvextract_path.into(),
        }
    }

    /// `mkvmerge -J <file>`: JSON identification report
    pub fn identify<P: AsRef<Path>>(&self, container: P) -> ToolCommand {
        ToolCommand::new(&self.mkvmerge_path, "Track identification")
            .arg("-J")
            .path_arg(container)
    }

    /// `mkvextract tracks <file> <id>:<dest>`
    pub fn extract_track<P: AsRef<Path>>(&self, container: P, track_id: u64, destination: P) -> ToolCommand {
        ToolCommand::new(&self.mkvextract_path, "Subtitle extraction")
            .arg("tracks")
            .path_arg(container)
            .arg(format!("{}:{}", track_id, destination.as_ref().to_string_lossy()))
    }

    pub fn version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.mkvmerge_path, "Version check").arg("--version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_command() {
        let builder = MkvCommandBuilder::new("mkvmerge", "mkvextract");
        let cmd = builder.identify("/movies/Film (2001)/Film.mkv");
        assert_eq!(cmd.binary_path, "mkvmerge");
        assert_eq!(cmd.args, vec!["-J", "/movies/Film (2001)/Film.mkv"]);
    }

    #[test]
    fn test_extract_command_keeps_paths_as_single_args() {
        let builder = MkvCommandBuilder::new("/usr/bin/mkvmerge", "/usr/bin/mkvextract");
        let cmd = builder.extract_track("/tv/Show S01E01.mkv", 3, "/tmp/out file.srt");
        assert_eq!(cmd.binary_path, "/usr/bin/mkvextract");
        assert_eq!(cmd.args, vec!["tracks", "/tv/Show S01E01.mkv", "3:/tmp/out file.srt"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_error() {
        let cmd = ToolCommand::new("/nonexistent/legenda-tool", "Probe").arg("-J");
        assert!(matches!(cmd.execute().await, Err(LegendaError::Media(_))));
    }
}
