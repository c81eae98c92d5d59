//! Clip discovery: enumerate candidate files and probe their metadata.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{InventoryError, Result};
use crate::video::ffmpeg::check_ffprobe;
use crate::video::probe::probe_clip;
use crate::video::types::VideoClip;

/// Discovers candidate clips in a source directory
pub struct ClipInventory {
    probe_threads: usize,
}

impl ClipInventory {
    pub fn new(probe_threads: usize) -> Self {
        Self {
            probe_threads: probe_threads.max(1),
        }
    }

    /// Enumerate and probe every recognized video file in `source_dir`
    ///
    /// Files that fail probing are skipped with a warning; a partial
    /// inventory is valid. Only a missing source directory is fatal.
    /// Probing runs concurrently, bounded by the configured thread count;
    /// ordering is re-established later by the selection policy.
    pub async fn scan<P: AsRef<Path>>(&self, source_dir: P) -> Result<Vec<VideoClip>> {
        let source_dir = source_dir.as_ref();
        let candidates = collect_candidates(source_dir)?;

        // A missing ffprobe would make every probe fail and an empty
        // inventory look like "nothing to compile"; surface it up front.
        if !candidates.is_empty() {
            check_ffprobe()?;
        }

        debug!(
            "Probing {} candidate file(s) in {:?} ({} at a time)",
            candidates.len(),
            source_dir,
            self.probe_threads
        );

        let mut pending = candidates.into_iter();
        let mut tasks: JoinSet<(PathBuf, Result<VideoClip>)> = JoinSet::new();

        for path in pending.by_ref().take(self.probe_threads) {
            tasks.spawn(async move {
                let probed = probe_clip(&path).await;
                (path, probed)
            });
        }

        let mut clips = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(clip))) => {
                    info!(
                        "Found clip: {} ({:.1}s, {}, created {})",
                        clip.file_name(),
                        clip.duration,
                        clip.profile,
                        DateTime::<Local>::from(clip.created).format("%Y-%m-%d %H:%M:%S"),
                    );
                    clips.push(clip);
                }
                Ok((path, Err(e))) => {
                    warn!("Could not probe {:?}, skipping: {}", path, e);
                }
                Err(e) => {
                    warn!("Probe task failed: {}", e);
                }
            }

            if let Some(path) = pending.next() {
                tasks.spawn(async move {
                    let probed = probe_clip(&path).await;
                    (path, probed)
                });
            }
        }

        info!("Inventory complete: {} usable clip(s)", clips.len());
        Ok(clips)
    }
}

/// List the regular files in `source_dir` that carry a recognized video
/// extension, skipping hidden files
pub fn collect_candidates<P: AsRef<Path>>(source_dir: P) -> Result<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();

    if !source_dir.is_dir() {
        return Err(InventoryError::SourceMissing {
            path: source_dir.to_path_buf(),
        }
        .into());
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(source_dir)? {
        let path = entry?.path();

        if path.is_file() && !is_hidden_file(&path) && VideoClip::is_supported_path(&path) {
            candidates.push(path);
        }
    }

    // Stable enumeration order keeps log output reproducible
    candidates.sort();
    Ok(candidates)
}

/// List the sub-folders of the results root, each one a source collection
pub fn list_collections<P: AsRef<Path>>(results_root: P) -> Result<Vec<String>> {
    let results_root = results_root.as_ref();

    if !results_root.is_dir() {
        return Err(InventoryError::SourceMissing {
            path: results_root.to_path_buf(),
        }
        .into());
    }

    let mut collections = Vec::new();
    for entry in std::fs::read_dir(results_root)? {
        let path = entry?.path();
        if path.is_dir() && !is_hidden_file(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                collections.push(name.to_string());
            }
        }
    }

    collections.sort();
    Ok(collections)
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"stub").unwrap();
    }

    #[test]
    fn test_collect_candidates_filters_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "first.mp4");
        touch(dir.path(), "second.webm");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "thumb.png");
        touch(dir.path(), ".hidden.mp4");
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let candidates = collect_candidates(dir.path()).unwrap();
        let names: Vec<_> = candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["first.mp4", "second.webm"]);
    }

    #[test]
    fn test_collect_candidates_missing_directory() {
        let dir = tempdir().unwrap();
        let result = collect_candidates(dir.path().join("gone"));
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_candidates_empty_directory_is_valid() {
        let dir = tempdir().unwrap();
        let candidates = collect_candidates(dir.path()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_list_collections() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("askreddit")).unwrap();
        std::fs::create_dir(dir.path().join("memes")).unwrap();
        touch(dir.path(), "stray.mp4");

        let collections = list_collections(dir.path()).unwrap();
        assert_eq!(collections, vec!["askreddit", "memes"]);
    }

    #[tokio::test]
    async fn test_scan_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let inventory = ClipInventory::new(2);
        let result = inventory.scan(dir.path().join("gone")).await;
        assert!(result.is_err());
    }
}
