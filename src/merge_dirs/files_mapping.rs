use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Base name, without any directory component.
    pub name: OsString,
    pub path: PathBuf,
    pub size: u64,
}

/// Output filename -> the one source file chosen to produce it.
///
/// Entries keep insertion order, which is also the order files get copied in.
#[derive(Debug, Default)]
pub struct FilesMapping {
    entries: Vec<(OsString, FileRecord)>,
    index: HashMap<OsString, usize>,
    // contested name -> every suffix below this one is already a key
    next_suffix: HashMap<OsString, u64>,
}

impl FilesMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &OsStr) -> Option<&FileRecord> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &FileRecord)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.as_os_str(), record))
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|(_, record)| record.size).sum()
    }

    /// Inserts `record` under `name`. Returns false and leaves the mapping
    /// untouched if the name is taken.
    pub fn insert(&mut self, name: OsString, record: FileRecord) -> bool {
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, record));
        true
    }

    /// Inserts `record` under the first free `<stem>_<N><.ext>` derived from
    /// `contested`, counting N up from 1, and returns the chosen name.
    pub fn insert_renamed(&mut self, contested: &OsStr, record: FileRecord) -> OsString {
        let name = self.next_free_name(contested);
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name.clone(), record));
        name
    }

    fn next_free_name(&mut self, contested: &OsStr) -> OsString {
        let index = &self.index;
        let cursor = self
            .next_suffix
            .entry(contested.to_os_string())
            .or_insert(1);
        loop {
            let candidate = suffixed_name(contested, *cursor);
            *cursor += 1;
            if !index.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// `report.pdf` + 2 -> `report_2.pdf`. Only the last extension is kept apart,
/// so `a.tar.gz` becomes `a.tar_2.gz`. Names without a real extension get the
/// suffix at the very end: `.bashrc_2`, `notes._2`.
pub fn suffixed_name(name: &OsStr, n: u64) -> OsString {
    let path = Path::new(name);
    let ext = path.extension().filter(|ext| !ext.is_empty());
    let mut result = match ext {
        Some(_) => path.file_stem().unwrap_or(name).to_os_string(),
        None => name.to_os_string(),
    };
    result.push(format!("_{}", n));
    if let Some(ext) = ext {
        result.push(".");
        result.push(ext);
    }
    result
}
