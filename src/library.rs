use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Sidecar subtitle locations for one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePaths {
    /// `<base>.<source>.srt`, extracted track
    pub source: PathBuf,
    /// `<base>.<target>.srt`, translated output
    pub target: PathBuf,
}

impl SubtitlePaths {
    pub fn for_container(container: &Path, source_language: &str, target_language: &str) -> Self {
        let base = container.with_extension("");
        Self {
            source: sidecar(&base, source_language),
            target: sidecar(&base, target_language),
        }
    }
}

fn sidecar(base: &Path, language: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{}.srt", language));
    PathBuf::from(name)
}

/// All container files under `roots`, sorted. Missing roots are skipped.
pub fn find_containers(roots: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut containers = Vec::new();

    for root in roots {
        if !root.is_dir() {
            warn!("Library root not found, skipping: {}", root.display());
            continue;
        }

        info!("Scanning {}", root.display());
        let before = containers.len();

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                containers.push(entry.path().to_path_buf());
            }
        }

        info!("Found {} container files in {}", containers.len() - before, root.display());
    }

    containers.sort();
    containers
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}
