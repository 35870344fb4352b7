//! Project enumeration and the source-image → regions index.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::store::{is_resource_path, ResourceStore};

/// Filesystem enumeration collaborator.
pub trait ResourceScanner {
    /// Every file under the project root, as forward-slash relative paths.
    fn list_all_resources(&self) -> Vec<String>;

    /// Asks for a rescan; the next `poll_changes` reports a change.
    fn request_rescan(&mut self) {}

    /// True once per detected change since the last poll.
    fn poll_changes(&mut self) -> bool {
        false
    }
}

// ── Filesystem scanner ──────────────────────────────────────────────────────

/// Walks the project root, skipping hidden directories and `target/`.
/// Changes are detected by comparing a fingerprint of every resource
/// file's path and modification time.
pub struct FsScanner {
    root: PathBuf,
    fingerprint: u64,
    rescan_requested: bool,
}

impl FsScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let fingerprint = fingerprint(&root);
        Self {
            root,
            fingerprint,
            rescan_requested: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Hidden directories and build output never hold project resources.
fn should_descend(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && name != "target"
}

/// Hashes path and modification time of every resource file.
fn fingerprint(root: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    let walk = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(should_descend);
    for entry in walk.flatten() {
        if !entry.file_type().is_file() || !is_resource_path(&entry.file_name().to_string_lossy()) {
            continue;
        }
        entry.path().hash(&mut hasher);
        if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
            modified.hash(&mut hasher);
        }
    }
    hasher.finish()
}

impl ResourceScanner for FsScanner {
    fn list_all_resources(&self) -> Vec<String> {
        let mut paths = Vec::new();
        let walk = WalkDir::new(&self.root).sort_by_file_name().into_iter().filter_entry(should_descend);
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry during scan: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() {
                if let Some(path) = relative_path(&self.root, entry.path()) {
                    paths.push(path);
                }
            }
        }
        paths
    }

    fn request_rescan(&mut self) {
        self.rescan_requested = true;
    }

    fn poll_changes(&mut self) -> bool {
        let current = fingerprint(&self.root);
        let changed = current != self.fingerprint || self.rescan_requested;
        self.fingerprint = current;
        self.rescan_requested = false;
        changed
    }
}

// ── Collection index ────────────────────────────────────────────────────────

/// Source image path → paths of the region resources that reference it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionIndex {
    refs: BTreeMap<String, BTreeSet<String>>,
}

impl CollectionIndex {
    /// Loads every resource file the scanner lists and groups the atlas
    /// regions by source. Files that are not atlas regions are skipped.
    pub fn rebuild<F, S>(scanner: &F, store: &S) -> Self
    where
        F: ResourceScanner + ?Sized,
        S: ResourceStore + ?Sized,
    {
        let mut index = Self::default();
        for path in scanner.list_all_resources() {
            if !is_resource_path(&path) {
                continue;
            }
            match store.load(&path) {
                Ok(resource) => index.insert(&resource.source_path, &path),
                Err(e) => log::debug!("Not an atlas region, skipping {path}: {e}"),
            }
        }
        log::debug!(
            "Rebuilt atlas index: {} sources, {} regions",
            index.refs.len(),
            index.len()
        );
        index
    }

    /// Region paths for `source`, in path order.
    pub fn regions_for(&self, source: &str) -> Vec<String> {
        self.refs
            .get(source)
            .map(|paths| paths.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, source: &str, path: &str) -> bool {
        self.refs.get(source).is_some_and(|paths| paths.contains(path))
    }

    pub fn insert(&mut self, source: &str, path: &str) {
        self.refs
            .entry(source.to_string())
            .or_default()
            .insert(path.to_string());
    }

    /// Removes `path` from `source`, dropping the source entry when empty.
    pub fn remove(&mut self, source: &str, path: &str) -> bool {
        let Some(paths) = self.refs.get_mut(source) else {
            return false;
        };
        let removed = paths.remove(path);
        if paths.is_empty() {
            self.refs.remove(source);
        }
        removed
    }

    pub fn rename(&mut self, source: &str, from: &str, to: &str) {
        self.remove(source, from);
        self.insert(source, to);
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.refs.keys().map(String::as_str)
    }

    /// Total number of indexed regions.
    pub fn len(&self) -> usize {
        self.refs.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
