use super::{FileRecord, FilesMapping};
use crate::utils::{compute_file_hash, same_content, to_mb};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct MappingResult {
    pub mapping: FilesMapping,
    /// Files dropped because an identical file already holds their name.
    pub duplicates: Vec<PathBuf>,
    pub stats: MappingStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingStats {
    pub scanned_files: usize,
    pub scanned_bytes: u64,
    pub duplicates: usize,
    pub mapped_files: usize,
    pub mapped_bytes: u64,
}

impl MappingStats {
    pub fn retained_percent(&self) -> f64 {
        if self.scanned_bytes == 0 {
            return 100.0;
        }
        self.mapped_bytes as f64 / self.scanned_bytes as f64 * 100.0
    }
}

impl fmt::Display for MappingStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} duplicates, {} ({} MB) -> {} ({} MB) ({:.2}%)",
            self.duplicates,
            self.scanned_files,
            to_mb(self.scanned_bytes),
            self.mapped_files,
            to_mb(self.mapped_bytes),
            self.retained_percent()
        )
    }
}

/// Every regular file below `dirs`, directory by directory in the given
/// order. Entries inside a directory are sorted by name. Symlinks to regular
/// files count as files of their target's size; symlinked directories are
/// not descended into.
pub fn scan_files(dirs: &[PathBuf]) -> Result<Vec<FileRecord>> {
    let mut files = Vec::new();
    for dir in dirs {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("scanning {}", dir.display()))?;
            let metadata = if entry.path_is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "Skipping broken symlink");
                        continue;
                    }
                }
            } else {
                entry
                    .metadata()
                    .with_context(|| format!("reading metadata of {}", entry.path().display()))?
            };
            if !metadata.is_file() {
                if !metadata.is_dir() {
                    debug!(path = %entry.path().display(), "Skipping non-regular file");
                }
                continue;
            }
            let size = metadata.len();
            trace!(path = %entry.path().display(), size, "Found file");
            files.push(FileRecord {
                name: entry.file_name().to_os_string(),
                path: entry.into_path(),
                size,
            });
        }
    }
    Ok(files)
}

pub fn build_files_mapping(dirs: &[PathBuf]) -> Result<MappingResult> {
    info!("Directories with files to be merged: {:?}", dirs);
    let files = scan_files(dirs)?;
    let scanned_bytes = files.iter().map(|f| f.size).sum();
    info!(
        "Files found in {} directories = {} (size = {} MB)",
        dirs.len(),
        files.len(),
        to_mb(scanned_bytes)
    );
    let scanned_files = files.len();

    let mut mapping = FilesMapping::new();
    let mut duplicates = Vec::new();
    let mut comparer = ContentComparer::default();

    for file in files {
        let kept = match mapping.get(&file.name).cloned() {
            None => {
                mapping.insert(file.name.clone(), file);
                continue;
            }
            Some(kept) => kept,
        };

        if comparer.same(&kept, &file)? {
            debug!(
                "Same file in \"{}\" == \"{}\"",
                kept.path.display(),
                file.path.display()
            );
            duplicates.push(file.path);
            continue;
        }

        // The held key may itself be a rename; suffixes derive from the
        // retained file's real name.
        let source = file.path.clone();
        let renamed = mapping.insert_renamed(&kept.name, file);
        debug!(
            "Name collision: \"{}\" mapped as {:?}",
            source.display(),
            renamed
        );
    }

    debug!("Duplicates ({}): {:?}", duplicates.len(), duplicates);
    let stats = MappingStats {
        scanned_files,
        scanned_bytes,
        duplicates: duplicates.len(),
        mapped_files: mapping.len(),
        mapped_bytes: mapping.total_size(),
    };
    info!("Change in files = {}", stats);

    Ok(MappingResult {
        mapping,
        duplicates,
        stats,
    })
}

/// Decides content equality. Size and cached fingerprints rule out most
/// mismatches; equal fingerprints are confirmed byte for byte.
#[derive(Default)]
struct ContentComparer {
    fingerprints: HashMap<PathBuf, String>,
}

impl ContentComparer {
    fn same(&mut self, kept: &FileRecord, candidate: &FileRecord) -> Result<bool> {
        if kept.size != candidate.size {
            return Ok(false);
        }
        if self.fingerprint(&kept.path)? != self.fingerprint(&candidate.path)? {
            return Ok(false);
        }
        same_content(&kept.path, &candidate.path)
    }

    fn fingerprint(&mut self, path: &Path) -> Result<String> {
        if let Some(hash) = self.fingerprints.get(path) {
            return Ok(hash.clone());
        }
        let hash = compute_file_hash(path)?;
        trace!(path = %path.display(), %hash, "Fingerprinted");
        self.fingerprints.insert(path.to_path_buf(), hash.clone());
        Ok(hash)
    }
}
