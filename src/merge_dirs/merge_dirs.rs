use super::{build_actions, build_files_mapping, Action, MappingStats, SkipPolicy};
use crate::utils::to_mb;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub directories: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub remove_inputs: bool,
    pub dry_run: bool,
    pub skip_policy: SkipPolicy,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeReport {
    pub mapping: MappingStats,
    pub copied_files: usize,
    pub copied_bytes: u64,
    pub skipped_existing: usize,
    pub stale_existing: usize,
    pub removed_dirs: usize,
}

struct CopyProgress {
    files: usize,
    bytes: u64,
    total_bytes: u64,
}

impl CopyProgress {
    fn record(&mut self, size: u64) {
        self.files += 1;
        self.bytes += size;
        if self.files % PROGRESS_EVERY == 0 {
            self.log();
        }
    }

    fn log(&self) {
        info!(
            "Copied {} files ({}/{}) MB",
            self.files,
            to_mb(self.bytes),
            to_mb(self.total_bytes)
        );
    }
}

/// Scans, plans and then runs the merge. With `dry_run` the planned actions
/// are written to `out` and nothing on disk changes.
pub fn merge_dirs<W: Write>(options: &MergeOptions, out: &mut W) -> Result<MergeReport> {
    let result = build_files_mapping(&options.directories)?;
    if result.mapping.is_empty() {
        info!("No files found to merge");
    }

    if !options.dry_run {
        std::fs::create_dir_all(&options.out_dir)
            .with_context(|| format!("creating {}", options.out_dir.display()))?;
    }

    let remove_dirs: &[PathBuf] = if options.remove_inputs {
        &options.directories
    } else {
        &[]
    };
    let plan = build_actions(
        &result.mapping,
        &options.out_dir,
        options.skip_policy,
        remove_dirs,
    )?;

    let mut report = MergeReport {
        mapping: result.stats,
        skipped_existing: plan.existing.len(),
        stale_existing: plan.stale.len(),
        ..MergeReport::default()
    };

    if options.dry_run {
        for duplicate in &result.duplicates {
            writeln!(out, "Skip duplicate \"{}\"", duplicate.display())?;
        }
        for action in plan.actions() {
            writeln!(out, "{}", action)?;
        }
        return Ok(report);
    }

    let mut progress = CopyProgress {
        files: 0,
        bytes: 0,
        total_bytes: plan.copy_size(),
    };
    for action in &plan.copies {
        debug!("{}", action);
        action.run()?;
        if let Action::Copy { size, .. } = action {
            progress.record(*size);
        }
    }
    progress.log();
    report.copied_files = progress.files;
    report.copied_bytes = progress.bytes;

    for action in &plan.removals {
        info!("{}", action);
        action.run()?;
        report.removed_dirs += 1;
    }

    Ok(report)
}
