//! The region collection manager.
//!
//! `AtlasEditor` owns every `RegionEdits` for the active source image and is
//! the only place that writes to storage, the collection index and the undo
//! history. User-facing operations diff edited against persisted values and
//! build an `Action`; the action's forward commands are applied through
//! `apply`, and only once they succeed is the action recorded. Undo and redo
//! replay recorded commands through the same `apply`.

use std::collections::BTreeMap;

use crate::config::EditorConfig;
use crate::edits::{Attribute, RegionEdits};
use crate::error::{EditError, EditResult, StoreError};
use crate::geometry::{hit_test, screen_handle_rect, Grab, Grid, Handle, Rect, Vec2, HANDLE_COUNT};
use crate::history::{Action, Command, CommandHistory, MergeMode, UndoStack};
use crate::scan::{CollectionIndex, ResourceScanner};
use crate::store::{
    canonical_resource_path, file_name, is_resource_path, parent_path, AtlasResource, ResourceStore,
};

/// Arena key of a live region. Stable for the region's lifetime in the
/// collection, unlike its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey(u64);

/// An in-progress pointer drag. While it exists the targeted region is
/// claimed: no other operation may change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gesture {
    pub key: RegionKey,
    pub grab: Grab,
    /// The drag started in empty space and is sizing a new region.
    pub creating: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Selected,
    /// Being dragged.
    Active,
}

/// What the renderer needs for one region, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionView {
    pub key: RegionKey,
    pub path: String,
    pub rect: Rect,
    pub handles: [Rect; HANDLE_COUNT],
    pub highlight: Highlight,
    pub active_handle: Option<Handle>,
}

/// A delete waiting for the user's yes/no.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletePrompt {
    pub path: String,
    pub message: String,
}

pub struct AtlasEditor<S, F, H = UndoStack> {
    config: EditorConfig,
    store: S,
    scanner: F,
    history: H,
    index: CollectionIndex,
    source: Option<String>,
    base_path: String,
    regions: BTreeMap<RegionKey, RegionEdits>,
    next_key: u64,
    new_region_counter: u32,
    selected: Option<RegionKey>,
    gesture: Option<Gesture>,
    pending_delete: Option<RegionKey>,
    rescan_deferred: bool,
}

impl<S, F, H> AtlasEditor<S, F, H>
where
    S: ResourceStore,
    F: ResourceScanner,
    H: CommandHistory,
{
    pub fn new(config: EditorConfig, store: S, scanner: F, history: H) -> Self {
        let index = CollectionIndex::rebuild(&scanner, &store);
        Self {
            config,
            store,
            scanner,
            history,
            index,
            source: None,
            base_path: String::new(),
            regions: BTreeMap::new(),
            next_key: 0,
            new_region_counter: 0,
            selected: None,
            gesture: None,
            pending_delete: None,
            rescan_deferred: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.config.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.config.grid
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scanner(&self) -> &F {
        &self.scanner
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn index(&self) -> &CollectionIndex {
        &self.index
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Directory new regions are created in: the source image's directory.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionKey, &RegionEdits)> {
        self.regions.iter().map(|(key, edits)| (*key, edits))
    }

    pub fn region(&self, key: RegionKey) -> Option<&RegionEdits> {
        self.regions.get(&key)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Live region stored (or, if new, to be stored) at `path`.
    pub fn find(&self, path: &str) -> Option<RegionKey> {
        self.regions
            .iter()
            .find(|(_, edits)| edits.identity() == path)
            .map(|(key, _)| *key)
    }

    pub fn selected(&self) -> Option<RegionKey> {
        self.selected
    }

    pub fn selected_region(&self) -> Option<&RegionEdits> {
        self.selected.and_then(|key| self.regions.get(&key))
    }

    pub fn select(&mut self, key: Option<RegionKey>) {
        self.selected = key.filter(|key| self.regions.contains_key(key));
    }

    pub fn gesture(&self) -> Option<Gesture> {
        self.gesture
    }

    pub fn pending_delete(&self) -> Option<RegionKey> {
        self.pending_delete
    }

    // ── Source image ────────────────────────────────────────────────────

    /// Makes `source` the active image. Recorded in history so per-region
    /// undo entries replay against the image they were made on.
    pub fn set_source(&mut self, source: Option<&str>) -> EditResult<()> {
        self.ensure_idle()?;
        if self.source.as_deref() == source {
            return Ok(());
        }
        let action = Action::new("Change source image", MergeMode::Ends)
            .forward(Command::SetSource {
                source: source.map(str::to_string),
            })
            .backward(Command::SetSource {
                source: self.source.clone(),
            });
        self.commit(action)
    }

    /// Opens an image, or a region resource. A region switches to its
    /// source image and selects it.
    pub fn open(&mut self, path: &str) -> EditResult<()> {
        if is_resource_path(path) {
            if let Ok(resource) = self.store.load(path) {
                self.set_source(Some(&resource.source_path))?;
                match self.find(path) {
                    Some(key) => self.selected = Some(key),
                    None => log::warn!("Unable to find edit info for {path}"),
                }
                return Ok(());
            }
        }
        self.set_source(Some(path))
    }

    fn load_source(&mut self, source: Option<&str>) {
        self.regions.clear();
        self.selected = None;
        self.pending_delete = None;
        self.gesture = None;
        self.source = source.map(str::to_string);
        self.base_path = source.map(parent_path).unwrap_or_default().to_string();

        let Some(source) = source else {
            log::info!("Cleared source image");
            return;
        };
        log::info!("Getting atlas regions from {source}");
        for path in self.index.regions_for(source) {
            self.load_live(&path);
        }
    }

    fn load_live(&mut self, path: &str) {
        match self.store.load(path) {
            Ok(resource) => {
                log::debug!("\t{path}");
                let edits = RegionEdits::from_resource(path, resource, self.config.handle_size);
                self.insert_live(edits);
            }
            Err(e) => log::warn!("Skipping atlas region {path}: {e}"),
        }
    }

    fn insert_live(&mut self, edits: RegionEdits) -> RegionKey {
        let key = RegionKey(self.next_key);
        self.next_key += 1;
        self.regions.insert(key, edits);
        key
    }

    fn remove_live(&mut self, key: RegionKey) -> Option<RegionEdits> {
        if self.selected == Some(key) {
            self.selected = None;
        }
        if self.pending_delete == Some(key) {
            self.pending_delete = None;
        }
        self.regions.remove(&key)
    }

    // ── Creation & gestures ─────────────────────────────────────────────

    /// Adds an uncommitted, zero-sized region at `position` (source space)
    /// under a fresh placeholder path. Nothing is written until it commits.
    pub fn start_new_region(&mut self, position: Vec2) -> EditResult<RegionKey> {
        let source = self.source.clone().ok_or(EditError::NoSource)?;
        let position = self.config.grid.snap(position);
        let path = loop {
            self.new_region_counter += 1;
            let name = format!(
                "{}_{}.tres",
                self.config.new_region_stem, self.new_region_counter
            );
            let path = if self.base_path.is_empty() {
                name
            } else {
                format!("{}/{}", self.base_path, name)
            };
            if self.find(&path).is_none() && !self.store.exists(&path) {
                break path;
            }
        };
        let region = Rect::from_position_size(position, Vec2::ZERO);
        let edits = RegionEdits::new_uncommitted(&path, region, &source, self.config.handle_size);
        let key = self.insert_live(edits);
        self.selected = Some(key);
        log::debug!("Started new atlas region {path}");
        Ok(key)
    }

    /// Pointer pressed at `screen_pos`. Grabs the first region whose handle
    /// or body is under the pointer, or starts a new region sized from its
    /// bottom-right handle.
    pub fn begin_gesture(&mut self, screen_pos: Vec2, zoom: f32) -> EditResult<Gesture> {
        self.ensure_idle()?;
        if self.source.is_none() {
            return Err(EditError::NoSource);
        }
        let hit = self.regions.iter().find_map(|(key, edits)| {
            hit_test(&edits.region(), edits.handles(), screen_pos, zoom).map(|grab| (*key, grab))
        });
        let gesture = match hit {
            Some((key, grab)) => {
                if let Some(edits) = self.regions.get(&key) {
                    log::debug!("Pointer pressed on {} ({})", edits.path(), grab.index());
                }
                Gesture {
                    key,
                    grab,
                    creating: false,
                }
            }
            None => Gesture {
                key: self.start_new_region(screen_pos / zoom)?,
                grab: Grab::Handle(Handle::BottomRight),
                creating: true,
            },
        };
        self.selected = Some(gesture.key);
        self.gesture = Some(gesture);
        Ok(gesture)
    }

    /// Pointer moved with the button held. `screen_delta` is the movement
    /// since the previous event.
    pub fn drag_gesture(&mut self, screen_pos: Vec2, screen_delta: Vec2, zoom: f32) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        let Some(edits) = self.regions.get_mut(&gesture.key) else {
            return;
        };
        match gesture.grab {
            Grab::Body => edits.move_region(screen_delta / zoom),
            Grab::Handle(handle) => {
                let target = self.config.grid.snap(screen_pos / zoom);
                gesture.grab = Grab::Handle(edits.move_handle_to(handle, target));
            }
        }
    }

    /// Pointer released: releases the claim and commits whatever the
    /// gesture changed as a single history entry.
    pub fn end_gesture(&mut self) -> EditResult<bool> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        let result = self.save_changes_and_update_history(gesture.key, MergeMode::Disable);
        if self.rescan_deferred {
            self.rescan_deferred = false;
            self.on_filesystem_changed();
        }
        result
    }

    // ── Edits from property fields ──────────────────────────────────────

    pub fn edit_region(&mut self, key: RegionKey, region: Rect) -> EditResult<bool> {
        self.edit(key, MergeMode::Ends, |edits| edits.set_region(region))
    }

    pub fn edit_margin(&mut self, key: RegionKey, margin: Rect) -> EditResult<bool> {
        self.edit(key, MergeMode::Ends, |edits| edits.set_margin(margin))
    }

    pub fn edit_filter_clip(&mut self, key: RegionKey, filter_clip: bool) -> EditResult<bool> {
        self.edit(key, MergeMode::Disable, |edits| edits.set_filter_clip(filter_clip))
    }

    /// Renames a region. The extension is added when missing.
    pub fn rename(&mut self, key: RegionKey, path: &str) -> EditResult<bool> {
        let path = canonical_resource_path(path);
        self.edit(key, MergeMode::Disable, |edits| edits.set_path(&path))
    }

    fn edit(
        &mut self,
        key: RegionKey,
        merge: MergeMode,
        change: impl FnOnce(&mut RegionEdits),
    ) -> EditResult<bool> {
        self.ensure_idle()?;
        let Some(edits) = self.regions.get_mut(&key) else {
            log::warn!("Edit targets a region that is no longer loaded");
            return Ok(false);
        };
        change(edits);
        self.save_changes_and_update_history(key, merge)
    }

    // ── Commit protocol ─────────────────────────────────────────────────

    /// Commits the difference between a region's edited and persisted
    /// values. A new region is created (zero-area ones are discarded
    /// without touching storage); an existing one gets one history entry
    /// per changed attribute. A failing attribute is rolled back and its
    /// error returned after the remaining attributes have been tried.
    pub fn save_changes_and_update_history(
        &mut self,
        key: RegionKey,
        merge: MergeMode,
    ) -> EditResult<bool> {
        if self.gesture.is_some_and(|g| g.key == key) {
            return Err(EditError::GestureInProgress);
        }
        let Some(edits) = self.regions.get(&key) else {
            log::warn!("Cannot commit a region that is no longer loaded");
            return Ok(false);
        };

        if edits.is_new() {
            if !edits.region().has_area() {
                log::info!("Discarding zero-area atlas region {}", edits.path());
                self.remove_live(key);
                return Ok(false);
            }
            let path = edits.path().to_string();
            let action = Action::new("Create atlas region", MergeMode::Disable)
                .forward(Command::CreateRegion {
                    path: path.clone(),
                    source: edits.source().to_string(),
                    region: edits.region(),
                    margin: edits.margin(),
                    filter_clip: edits.filter_clip(),
                })
                .backward(Command::DeleteRegion { path });
            self.commit(action)?;
            return Ok(true);
        }

        let mut committed = false;
        let mut first_error = None;
        for attribute in Attribute::ALL {
            let Some(action) = self
                .regions
                .get(&key)
                .and_then(|edits| attribute_action(edits, attribute, merge))
            else {
                continue;
            };
            match self.commit(action) {
                Ok(()) => committed = true,
                Err(e) => {
                    log::warn!("Commit failed, rolled back: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(committed),
        }
    }

    /// Applies the forward commands, then records the action. Nothing is
    /// recorded when a command fails.
    fn commit(&mut self, action: Action) -> EditResult<()> {
        for command in &action.forward {
            self.apply(command)?;
        }
        log::info!("QuickAtlas - {}", action.label);
        self.history.record(action);
        Ok(())
    }

    // ── Deletion ────────────────────────────────────────────────────────

    /// Starts deleting the selected region. Nothing changes until
    /// `resolve_delete` is called with the user's answer.
    pub fn request_delete(&mut self) -> Option<DeletePrompt> {
        if self.gesture.is_some() {
            return None;
        }
        let key = self.selected?;
        let path = self.regions.get(&key)?.identity().to_string();
        self.pending_delete = Some(key);
        Some(DeletePrompt {
            message: format!("Delete atlas region \"{}\"?", file_name(&path)),
            path,
        })
    }

    pub fn resolve_delete(&mut self, confirmed: bool) -> EditResult<bool> {
        let Some(key) = self.pending_delete.take() else {
            return Ok(false);
        };
        if !confirmed {
            log::info!("Atlas region delete cancelled");
            return Ok(false);
        }
        self.ensure_idle()?;
        let Some(edits) = self.regions.get(&key) else {
            log::warn!("Region to delete is no longer loaded");
            return Ok(false);
        };
        let Some(snapshot) = edits.persisted() else {
            self.remove_live(key);
            return Ok(true);
        };
        let action = Action::new("Delete atlas region", MergeMode::Disable)
            .forward(Command::DeleteRegion {
                path: snapshot.path.clone(),
            })
            .backward(Command::CreateRegion {
                path: snapshot.path.clone(),
                source: edits.source().to_string(),
                region: snapshot.region,
                margin: snapshot.margin,
                filter_clip: snapshot.filter_clip,
            });
        self.commit(action)?;
        Ok(true)
    }

    // ── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> EditResult<bool> {
        self.ensure_idle()?;
        match self.history.undo() {
            Some(commands) => self.replay(&commands),
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> EditResult<bool> {
        self.ensure_idle()?;
        match self.history.redo() {
            Some(commands) => self.replay(&commands),
            None => Ok(false),
        }
    }

    fn replay(&mut self, commands: &[Command]) -> EditResult<bool> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(true)
    }

    // ── Command dispatcher ──────────────────────────────────────────────

    /// Executes one command against live state, storage and the index.
    /// A command naming a region that is not loaded is logged and ignored.
    pub fn apply(&mut self, command: &Command) -> EditResult<()> {
        match command {
            Command::SetSource { source } => {
                self.load_source(source.as_deref());
                Ok(())
            }
            Command::CreateRegion {
                path,
                source,
                region,
                margin,
                filter_clip,
            } => self.create_region(path, source, *region, *margin, *filter_clip),
            Command::DeleteRegion { path } => self.delete_region(path),
            Command::SetRegionRect { path, region } => {
                self.update_attribute(path, Attribute::Region, |e| e.set_region(*region))
            }
            Command::SetMargin { path, margin } => {
                self.update_attribute(path, Attribute::Margin, |e| e.set_margin(*margin))
            }
            Command::SetFilterClip { path, value } => {
                self.update_attribute(path, Attribute::FilterClip, |e| e.set_filter_clip(*value))
            }
            Command::SetPath { from, to } => self.change_path(from, to),
        }
    }

    fn create_region(
        &mut self,
        path: &str,
        source: &str,
        region: Rect,
        margin: Rect,
        filter_clip: bool,
    ) -> EditResult<()> {
        log::info!("(Re)create atlas region {path} {region:?}");
        let key = match self.find(path) {
            Some(key) if self.regions.get(&key).is_some_and(RegionEdits::is_new) => {
                log::debug!("Committing region created by drag");
                key
            }
            Some(_) => {
                log::error!("Creating atlas region that already exists via undo/redo: {path}");
                return Err(EditError::DuplicateIdentity(path.to_string()));
            }
            None if self.store.exists(path) => {
                return Err(StoreError::AlreadyExists(path.to_string()).into());
            }
            None if self.source.as_deref() != Some(source) => {
                // not shown in the current collection; persist only
                let resource = AtlasResource {
                    source_path: source.to_string(),
                    region: region.with_non_negative_size(),
                    margin,
                    filter_clip,
                };
                self.store.save(path, &resource)?;
                self.index.insert(source, path);
                self.scanner.request_rescan();
                return Ok(());
            }
            None => {
                let edits = RegionEdits::new_uncommitted(path, region, source, self.config.handle_size);
                self.insert_live(edits)
            }
        };

        let Some(edits) = self.regions.get_mut(&key) else {
            return Ok(());
        };
        edits.set_region(region);
        edits.set_margin(margin);
        edits.set_filter_clip(filter_clip);
        let resource = edits.to_resource();
        if let Err(e) = self.store.save(path, &resource) {
            self.remove_live(key);
            return Err(e.into());
        }
        edits.mark_persisted();
        self.index.insert(source, path);
        self.selected = Some(key);
        self.scanner.request_rescan();
        Ok(())
    }

    fn delete_region(&mut self, path: &str) -> EditResult<()> {
        log::info!("Delete atlas region {path}");
        let Some(key) = self.find(path) else {
            log::warn!("Deleting atlas region that was already deleted: {path}");
            return Ok(());
        };
        let Some(edits) = self.regions.get(&key) else {
            return Ok(());
        };
        if !edits.is_new() {
            self.store.delete(path)?;
            let source = edits.source().to_string();
            self.index.remove(&source, path);
            self.scanner.request_rescan();
        }
        self.remove_live(key);
        Ok(())
    }

    fn update_attribute(
        &mut self,
        path: &str,
        attribute: Attribute,
        change: impl FnOnce(&mut RegionEdits),
    ) -> EditResult<()> {
        log::info!("Change {attribute:?} of {path}");
        let Some(key) = self.find(path) else {
            log::warn!("Cannot find atlas region {path}, probably belongs to another source");
            return Ok(());
        };
        let Some(edits) = self.regions.get_mut(&key) else {
            return Ok(());
        };
        change(edits);
        let resource = edits.staged_resource(attribute);
        if let Err(e) = self.store.save(path, &resource) {
            edits.revert(attribute);
            return Err(e.into());
        }
        edits.mark_attribute_persisted(attribute);
        Ok(())
    }

    fn change_path(&mut self, from: &str, to: &str) -> EditResult<()> {
        if from == to {
            log::debug!("Changing {from} to the same name");
            return Ok(());
        }
        log::info!("Change path from {from} to {to}");
        let Some(key) = self.find(from) else {
            log::warn!("Cannot find atlas region {from}, probably belongs to another source");
            return Ok(());
        };
        let taken = self
            .regions
            .iter()
            .any(|(other, edits)| *other != key && (edits.identity() == to || edits.path() == to));

        let Some(edits) = self.regions.get_mut(&key) else {
            return Ok(());
        };
        edits.set_path(to);
        let result = if taken {
            Err(StoreError::AlreadyExists(to.to_string()))
        } else {
            self.store.rename(from, to)
        };
        if let Err(e) = result {
            edits.revert(Attribute::Path);
            return Err(e.into());
        }
        edits.mark_attribute_persisted(Attribute::Path);
        let source = edits.source().to_string();
        self.index.rename(&source, from, to);
        self.scanner.request_rescan();
        Ok(())
    }

    // ── Filesystem changes ──────────────────────────────────────────────

    /// Checks the scanner for changes and rebuilds when there are any.
    pub fn poll_filesystem(&mut self) -> bool {
        if self.scanner.poll_changes() {
            self.on_filesystem_changed();
            true
        } else {
            false
        }
    }

    /// Rebuilds the index and reconciles the live collection with it.
    /// Deferred until the current gesture ends.
    pub fn on_filesystem_changed(&mut self) {
        if self.gesture.is_some() {
            log::debug!("File system changed during a drag, deferring rebuild");
            self.rescan_deferred = true;
            return;
        }
        log::info!("File system state changed. Rebuilding atlas index");
        self.index = CollectionIndex::rebuild(&self.scanner, &self.store);
        self.reconcile_live_regions();
    }

    fn reconcile_live_regions(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let indexed = self.index.regions_for(&source);
        let vanished: Vec<RegionKey> = self
            .regions
            .iter()
            .filter(|(_, edits)| !edits.is_new() && !indexed.iter().any(|p| p == edits.identity()))
            .map(|(key, _)| *key)
            .collect();
        for key in vanished {
            if let Some(edits) = self.remove_live(key) {
                log::warn!("Atlas region {} disappeared from disk", edits.identity());
            }
        }
        for path in indexed {
            if self.find(&path).is_none() {
                self.load_live(&path);
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Everything to draw this frame, in screen coordinates at `zoom`.
    pub fn frame(&self, zoom: f32) -> Vec<RegionView> {
        self.regions
            .iter()
            .map(|(key, edits)| {
                let active = self.gesture.filter(|g| g.key == *key);
                let highlight = if active.is_some() {
                    Highlight::Active
                } else if self.selected == Some(*key) {
                    Highlight::Selected
                } else {
                    Highlight::Normal
                };
                let handles = *edits.handles();
                RegionView {
                    key: *key,
                    path: edits.path().to_string(),
                    rect: edits.region().scaled(zoom),
                    handles: handles.map(|h| screen_handle_rect(&h, zoom)),
                    highlight,
                    active_handle: active.and_then(|g| match g.grab {
                        Grab::Handle(handle) => Some(handle),
                        Grab::Body => None,
                    }),
                }
            })
            .collect()
    }

    fn ensure_idle(&self) -> EditResult<()> {
        if self.gesture.is_some() {
            Err(EditError::GestureInProgress)
        } else {
            Ok(())
        }
    }
}

/// History action for one changed attribute of a committed region.
fn attribute_action(edits: &RegionEdits, attribute: Attribute, merge: MergeMode) -> Option<Action> {
    if !edits.changed(attribute) {
        return None;
    }
    let snapshot = edits.persisted()?;
    let path = snapshot.path.clone();
    let action = match attribute {
        Attribute::Path => Action::new("Change resource path", MergeMode::Disable)
            .forward(Command::SetPath {
                from: path.clone(),
                to: edits.path().to_string(),
            })
            .backward(Command::SetPath {
                from: edits.path().to_string(),
                to: path,
            }),
        Attribute::Region => Action::new("Region", merge)
            .forward(Command::SetRegionRect {
                path: path.clone(),
                region: edits.region(),
            })
            .backward(Command::SetRegionRect {
                path,
                region: snapshot.region,
            }),
        Attribute::Margin => Action::new("Margin", merge)
            .forward(Command::SetMargin {
                path: path.clone(),
                margin: edits.margin(),
            })
            .backward(Command::SetMargin {
                path,
                margin: snapshot.margin,
            }),
        Attribute::FilterClip => Action::new("Filter clip", MergeMode::Disable)
            .forward(Command::SetFilterClip {
                path: path.clone(),
                value: edits.filter_clip(),
            })
            .backward(Command::SetFilterClip {
                path,
                value: snapshot.filter_clip,
            }),
    };
    Some(action)
}
