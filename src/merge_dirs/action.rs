use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy { from: PathBuf, to: PathBuf, size: u64 },
    RemoveDir(PathBuf),
}

impl Action {
    pub fn run(&self) -> Result<()> {
        match self {
            Action::Copy { from, to, .. } => std::fs::copy(from, to)
                .map(|_| ())
                .with_context(|| format!("copying {} to {}", from.display(), to.display())),
            Action::RemoveDir(path) => std::fs::remove_dir_all(path)
                .with_context(|| format!("removing {}", path.display())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Copy { from, to, .. } => {
                write!(f, "Copy \"{}\" to \"{}\"", from.display(), to.display())
            }
            Action::RemoveDir(path) => write!(f, "Remove \"{}\"", path.display()),
        }
    }
}
