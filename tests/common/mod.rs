//! Shared fixtures for the editor integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use quick_atlas::{
    AtlasEditor, AtlasResource, EditorConfig, FsScanner, FsStore, Rect, ResourceStore, StoreError,
    StoreResult, UndoStack,
};

/// Counters and failure switches shared between a test and its store.
#[derive(Default)]
pub struct IoCounter {
    pub loads: Cell<usize>,
    pub writes: Cell<usize>,
    pub fail_writes: Cell<bool>,
}

impl IoCounter {
    pub fn io_calls(&self) -> usize {
        self.loads.get() + self.writes.get()
    }
}

/// `FsStore` that counts every call and can be told to fail writes.
pub struct CountingStore {
    inner: FsStore,
    io: Rc<IoCounter>,
}

impl CountingStore {
    fn write<T>(&mut self, path: &str, op: impl FnOnce(&mut FsStore) -> StoreResult<T>) -> StoreResult<T> {
        self.io.writes.set(self.io.writes.get() + 1);
        if self.io.fail_writes.get() {
            return Err(StoreError::Io {
                path: path.to_string(),
                source: io::Error::other("disk full"),
            });
        }
        op(&mut self.inner)
    }
}

impl ResourceStore for CountingStore {
    fn save(&mut self, path: &str, resource: &AtlasResource) -> StoreResult<()> {
        self.write(path, |store| store.save(path, resource))
    }

    fn load(&self, path: &str) -> StoreResult<AtlasResource> {
        self.io.loads.set(self.io.loads.get() + 1);
        self.inner.load(path)
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        self.write(path, |store| store.delete(path))
    }

    fn rename(&mut self, from: &str, to: &str) -> StoreResult<()> {
        self.write(from, |store| store.rename(from, to))
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
}

pub type TestEditor = AtlasEditor<CountingStore, FsScanner>;

pub fn resource(source: &str, region: Rect) -> AtlasResource {
    AtlasResource {
        source_path: source.to_string(),
        region,
        margin: Rect::default(),
        filter_clip: false,
    }
}

/// Writes a resource straight to disk, bypassing the editor.
pub fn write_resource(root: &Path, path: &str, resource: &AtlasResource) {
    FsStore::new(root).save(path, resource).unwrap();
}

/// Editor over `root` with a merge window long enough that consecutive
/// mergeable edits in a test always coalesce.
pub fn editor(root: &Path) -> (TestEditor, Rc<IoCounter>) {
    let io = Rc::new(IoCounter::default());
    let store = CountingStore {
        inner: FsStore::new(root),
        io: Rc::clone(&io),
    };
    let editor = AtlasEditor::new(
        EditorConfig::default(),
        store,
        FsScanner::new(root),
        UndoStack::new(100, Duration::from_secs(3600)),
    );
    (editor, io)
}
