use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, LegendaError};

/// One or more blank (or whitespace-only) lines between blocks
static BLOCK_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A numbered, timed caption. Index and timing lines are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    pub index: String,
    pub timing: String,
    pub lines: Vec<String>,
}

impl SubtitleBlock {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Same slot with new caption text
    pub fn with_text(&self, text: &str) -> Self {
        Self {
            index: self.index.clone(),
            timing: self.timing.clone(),
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Cue(SubtitleBlock),
    /// Fewer than three lines; written back untouched and never translated
    Opaque(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub blocks: Vec<Block>,
}

impl SubtitleDocument {
    pub fn decode(content: &str) -> Self {
        let content = content.replace("\r\n", "\n");

        let blocks = BLOCK_SEPARATOR
            .split(&content)
            .filter(|raw| !raw.trim().is_empty())
            .map(decode_block)
            .collect();

        Self { blocks }
    }

    pub fn encode(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Cue(cue) => format!("{}\n{}\n{}", cue.index, cue.timing, cue.text()),
                Block::Opaque(raw) => raw.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn cue_count(&self) -> usize {
        self.blocks.iter().filter(|block| matches!(block, Block::Cue(_))).count()
    }
}

fn decode_block(raw: &str) -> Block {
    let lines: Vec<&str> = raw.trim().split('\n').collect();
    if lines.len() < 3 {
        return Block::Opaque(raw.to_string());
    }

    Block::Cue(SubtitleBlock {
        index: lines[0].to_string(),
        timing: lines[1].to_string(),
        lines: lines[2..].iter().map(|line| line.to_string()).collect(),
    })
}

/// Read a subtitle file, replacing invalid UTF-8 sequences
pub async fn read_document<P: AsRef<Path>>(path: P) -> Result<SubtitleDocument> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LegendaError::FileNotFound(path.display().to_string()));
    }

    let bytes = fs::read(path).await?;
    let document = SubtitleDocument::decode(&String::from_utf8_lossy(&bytes));
    debug!("Decoded {} blocks ({} cues) from {}",
           document.blocks.len(), document.cue_count(), path.display());
    Ok(document)
}

/// Write the whole document at once; the target only appears when complete
pub async fn write_document<P: AsRef<Path>>(document: &SubtitleDocument, path: P) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    fs::create_dir_all(&parent).await?;

    let content = document.encode();
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut tmp = temp_file_in(&parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&target).map_err(|e| LegendaError::Io(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| LegendaError::Io(std::io::Error::other(e)))??;

    info!("Subtitle written: {}", path.display());
    Ok(())
}

/// Temp file created with the same umask-governed mode as a plain create
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".legenda-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
