use super::{Action, FilesMapping};
use crate::utils::same_content;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What to do about a mapped name that already exists in the output directory.
/// Existing files are never overwritten under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Skip on name alone.
    Name,
    /// Skip, but compare with the source first and report a mismatch.
    Content,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        SkipPolicy::Name
    }
}

#[derive(Debug, Default)]
pub struct MergePlan {
    pub copies: Vec<Action>,
    pub removals: Vec<Action>,
    /// Names already present in the output directory.
    pub existing: Vec<OsString>,
    /// Existing names whose content differs from the mapped source.
    pub stale: Vec<OsString>,
}

impl MergePlan {
    /// All actions in execution order: every copy before any removal.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.copies.iter().chain(self.removals.iter())
    }

    pub fn copy_size(&self) -> u64 {
        self.copies
            .iter()
            .map(|action| match action {
                Action::Copy { size, .. } => *size,
                Action::RemoveDir(_) => 0,
            })
            .sum()
    }
}

pub fn build_actions(
    mapping: &FilesMapping,
    out_dir: &Path,
    policy: SkipPolicy,
    remove_dirs: &[PathBuf],
) -> Result<MergePlan> {
    let mut plan = MergePlan::default();

    for (name, record) in mapping.iter() {
        let target = out_dir.join(name);
        if !target.exists() {
            plan.copies.push(Action::Copy {
                from: record.path.clone(),
                to: target,
                size: record.size,
            });
            continue;
        }

        debug!("Already in output: \"{}\"", target.display());
        if policy == SkipPolicy::Content
            && (!target.is_file() || !same_content(&record.path, &target)?)
        {
            warn!(
                "Existing \"{}\" differs from \"{}\", leaving it as is",
                target.display(),
                record.path.display()
            );
            plan.stale.push(name.to_os_string());
        }
        plan.existing.push(name.to_os_string());
    }

    plan.removals = removal_actions(remove_dirs)?;

    Ok(plan)
}

/// One removal per distinct input. `A`, `./A` and `A/` are the same directory,
/// and an input inside another removed input goes away with its parent.
fn removal_actions(dirs: &[PathBuf]) -> Result<Vec<Action>> {
    let canonical = dirs
        .iter()
        .map(|dir| {
            dir.canonicalize()
                .with_context(|| format!("resolving {}", dir.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut actions = Vec::new();
    for (idx, (dir, real)) in dirs.iter().zip(&canonical).enumerate() {
        let covered = canonical.iter().enumerate().any(|(other_idx, other)| {
            (other == real && other_idx < idx) || (other != real && real.starts_with(other))
        });
        if covered {
            debug!("\"{}\" is removed along with another input", dir.display());
            continue;
        }
        actions.push(Action::RemoveDir(dir.clone()));
    }
    Ok(actions)
}
