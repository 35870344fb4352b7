//! Paired do/undo commands and the linear history that records them.
//!
//! Commands carry absolute post-state parameters, never deltas, so applying
//! the same command twice leaves the same state as applying it once.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::geometry::Rect;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Switch the active source image (`None` clears it).
    SetSource { source: Option<String> },
    /// Create and persist a region at `path`.
    CreateRegion {
        path: String,
        source: String,
        region: Rect,
        margin: Rect,
        filter_clip: bool,
    },
    DeleteRegion { path: String },
    SetRegionRect { path: String, region: Rect },
    SetMargin { path: String, margin: Rect },
    /// Rename the region stored at `from` to `to`.
    SetPath { from: String, to: String },
    SetFilterClip { path: String, value: bool },
}

impl Command {
    /// Region path the command targets, used to decide whether two
    /// consecutive actions may merge.
    pub fn target(&self) -> Option<&str> {
        match self {
            Command::SetSource { .. } => None,
            Command::CreateRegion { path, .. }
            | Command::DeleteRegion { path }
            | Command::SetRegionRect { path, .. }
            | Command::SetMargin { path, .. }
            | Command::SetFilterClip { path, .. } => Some(path),
            Command::SetPath { from, .. } => Some(from),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Always a separate history entry.
    Disable,
    /// Consecutive actions with the same label and target inside the merge
    /// window collapse into one entry that keeps the first backward group
    /// and the latest forward group.
    Ends,
}

/// One undoable history entry: forward commands and the backward commands
/// that invert them. Backward commands run in reverse order.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub label: String,
    pub merge: MergeMode,
    pub forward: Vec<Command>,
    pub backward: Vec<Command>,
}

impl Action {
    pub fn new(label: impl Into<String>, merge: MergeMode) -> Self {
        Self {
            label: label.into(),
            merge,
            forward: Vec::new(),
            backward: Vec::new(),
        }
    }

    pub fn forward(mut self, command: Command) -> Self {
        self.forward.push(command);
        self
    }

    pub fn backward(mut self, command: Command) -> Self {
        self.backward.push(command);
        self
    }

    fn target(&self) -> Option<&str> {
        self.forward.first().and_then(Command::target)
    }

    fn merges_with(&self, next: &Action) -> bool {
        next.merge == MergeMode::Ends
            && self.merge == MergeMode::Ends
            && self.label == next.label
            && self.target() == next.target()
    }
}

// ── History port ────────────────────────────────────────────────────────────

/// Command history collaborator.
pub trait CommandHistory {
    /// Records an action whose forward commands have already been applied.
    fn record(&mut self, action: Action);
    /// Steps back; returns the backward commands to apply, in order.
    fn undo(&mut self) -> Option<Vec<Command>>;
    /// Steps forward; returns the forward commands to apply, in order.
    fn redo(&mut self) -> Option<Vec<Command>>;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}

// ── Undo stack ──────────────────────────────────────────────────────────────

struct Entry {
    action: Action,
    recorded_at: Instant,
    mergeable: bool,
}

/// Linear undo/redo history with a size cap.
pub struct UndoStack {
    undo: VecDeque<Entry>,
    redo: Vec<Action>,
    capacity: usize,
    merge_window: Duration,
}

impl UndoStack {
    pub fn new(capacity: usize, merge_window: Duration) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            merge_window,
        }
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Label of the entry `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.back().map(|e| e.action.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(|a| a.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100, Duration::from_millis(800))
    }
}

impl CommandHistory for UndoStack {
    fn record(&mut self, action: Action) {
        let now = Instant::now();
        self.redo.clear();
        if let Some(top) = self.undo.back_mut() {
            if top.mergeable
                && top.action.merges_with(&action)
                && now.duration_since(top.recorded_at) <= self.merge_window
            {
                log::debug!("Merging history entry '{}'", action.label);
                top.action.forward = action.forward;
                top.recorded_at = now;
                return;
            }
        }
        self.undo.push_back(Entry {
            action,
            recorded_at: now,
            mergeable: true,
        });
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    fn undo(&mut self) -> Option<Vec<Command>> {
        let entry = self.undo.pop_back()?;
        let commands = entry.action.backward.iter().rev().cloned().collect();
        self.redo.push(entry.action);
        Some(commands)
    }

    fn redo(&mut self) -> Option<Vec<Command>> {
        let action = self.redo.pop()?;
        let commands = action.forward.clone();
        self.undo.push_back(Entry {
            action,
            recorded_at: Instant::now(),
            mergeable: false,
        });
        Some(commands)
    }

    fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
