//! In-memory edit tracking for one atlas region.
//!
//! A `RegionEdits` holds the values last written to storage next to the
//! values currently being edited. Nothing here touches storage; the editor
//! compares the two to decide what to commit.

use crate::geometry::{handle_rects, Handle, Rect, Vec2, HANDLE_COUNT};
use crate::store::AtlasResource;

/// Attribute values as they were last persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub path: String,
    pub region: Rect,
    pub margin: Rect,
    pub filter_clip: bool,
}

/// Independently committed attribute categories, in commit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Path,
    Region,
    Margin,
    FilterClip,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Path,
        Attribute::Region,
        Attribute::Margin,
        Attribute::FilterClip,
    ];
}

#[derive(Clone, Debug)]
pub struct RegionEdits {
    source: String,
    persisted: Option<Snapshot>,
    path: String,
    region: Rect,
    margin: Rect,
    filter_clip: bool,
    handle_size: f32,
    handles: [Rect; HANDLE_COUNT],
}

impl RegionEdits {
    /// A region that does not exist in storage yet.
    pub fn new_uncommitted(path: &str, region: Rect, source: &str, handle_size: f32) -> Self {
        let region = region.with_non_negative_size();
        Self {
            source: source.to_string(),
            persisted: None,
            path: path.to_string(),
            region,
            margin: Rect::default(),
            filter_clip: false,
            handle_size,
            handles: handle_rects(&region, handle_size),
        }
    }

    /// Tracks edits to a region already stored at `path`.
    pub fn from_resource(path: &str, resource: AtlasResource, handle_size: f32) -> Self {
        let snapshot = Snapshot {
            path: path.to_string(),
            region: resource.region,
            margin: resource.margin,
            filter_clip: resource.filter_clip,
        };
        Self {
            source: resource.source_path,
            path: snapshot.path.clone(),
            region: snapshot.region,
            margin: snapshot.margin,
            filter_clip: snapshot.filter_clip,
            persisted: Some(snapshot),
            handle_size,
            handles: handle_rects(&resource.region, handle_size),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True until the first successful save.
    pub fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    pub fn persisted(&self) -> Option<&Snapshot> {
        self.persisted.as_ref()
    }

    /// The identity storage knows this region by: the persisted path, or
    /// the placeholder path while still new.
    pub fn identity(&self) -> &str {
        match &self.persisted {
            Some(snapshot) => &snapshot.path,
            None => &self.path,
        }
    }

    /// Edited path. Storage is not renamed until the change is committed.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    /// Negative sizes are clamped to zero.
    pub fn set_region(&mut self, region: Rect) {
        let region = region.with_non_negative_size();
        if region != self.region {
            self.region = region;
            self.recalculate_handles();
        }
    }

    pub fn margin(&self) -> Rect {
        self.margin
    }

    pub fn set_margin(&mut self, margin: Rect) {
        self.margin = margin;
    }

    pub fn filter_clip(&self) -> bool {
        self.filter_clip
    }

    pub fn set_filter_clip(&mut self, filter_clip: bool) {
        self.filter_clip = filter_clip;
    }

    pub fn handles(&self) -> &[Rect; HANDLE_COUNT] {
        &self.handles
    }

    pub fn handle_size(&self) -> f32 {
        self.handle_size
    }

    // ── Change detection ────────────────────────────────────────────────

    pub fn region_changed(&self) -> bool {
        self.persisted.as_ref().is_none_or(|s| s.region != self.region)
    }

    pub fn path_changed(&self) -> bool {
        self.persisted.as_ref().is_none_or(|s| s.path != self.path)
    }

    pub fn margin_changed(&self) -> bool {
        self.persisted.as_ref().is_none_or(|s| s.margin != self.margin)
    }

    pub fn filter_clip_changed(&self) -> bool {
        self.persisted
            .as_ref()
            .is_none_or(|s| s.filter_clip != self.filter_clip)
    }

    pub fn is_dirty(&self) -> bool {
        self.region_changed() || self.path_changed() || self.margin_changed() || self.filter_clip_changed()
    }

    pub fn changed(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Path => self.path_changed(),
            Attribute::Region => self.region_changed(),
            Attribute::Margin => self.margin_changed(),
            Attribute::FilterClip => self.filter_clip_changed(),
        }
    }

    pub fn revert(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Path => self.revert_path(),
            Attribute::Region => self.revert_region(),
            Attribute::Margin => self.revert_margin(),
            Attribute::FilterClip => self.revert_filter_clip(),
        }
    }

    /// The persisted resource with only `attribute` taken from the edited
    /// values. A new region stages everything.
    pub fn staged_resource(&self, attribute: Attribute) -> AtlasResource {
        let Some(snapshot) = &self.persisted else {
            return self.to_resource();
        };
        let mut resource = AtlasResource {
            source_path: self.source.clone(),
            region: snapshot.region,
            margin: snapshot.margin,
            filter_clip: snapshot.filter_clip,
        };
        match attribute {
            Attribute::Path => {}
            Attribute::Region => resource.region = self.region,
            Attribute::Margin => resource.margin = self.margin,
            Attribute::FilterClip => resource.filter_clip = self.filter_clip,
        }
        resource
    }

    /// Records `attribute` as persisted, leaving the other attributes'
    /// pending edits pending.
    pub fn mark_attribute_persisted(&mut self, attribute: Attribute) {
        let Some(snapshot) = &mut self.persisted else {
            self.mark_persisted();
            return;
        };
        match attribute {
            Attribute::Path => snapshot.path = self.path.clone(),
            Attribute::Region => snapshot.region = self.region,
            Attribute::Margin => snapshot.margin = self.margin,
            Attribute::FilterClip => snapshot.filter_clip = self.filter_clip,
        }
    }

    /// Records the current values as persisted.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(Snapshot {
            path: self.path.clone(),
            region: self.region,
            margin: self.margin,
            filter_clip: self.filter_clip,
        });
    }

    pub fn revert_path(&mut self) {
        if let Some(snapshot) = &self.persisted {
            self.path = snapshot.path.clone();
        }
    }

    pub fn revert_region(&mut self) {
        if let Some(region) = self.persisted.as_ref().map(|s| s.region) {
            self.set_region(region);
        }
    }

    pub fn revert_margin(&mut self) {
        if let Some(snapshot) = &self.persisted {
            self.margin = snapshot.margin;
        }
    }

    pub fn revert_filter_clip(&mut self) {
        if let Some(snapshot) = &self.persisted {
            self.filter_clip = snapshot.filter_clip;
        }
    }

    pub fn to_resource(&self) -> AtlasResource {
        AtlasResource {
            source_path: self.source.clone(),
            region: self.region,
            margin: self.margin,
            filter_clip: self.filter_clip,
        }
    }

    // ── Drag manipulation ───────────────────────────────────────────────

    /// Moves the whole region by `delta` (source space). No size change.
    pub fn move_region(&mut self, delta: Vec2) {
        self.set_region(self.region.translated(delta));
    }

    /// Moves `handle` to `position` (source space), resizing the region so
    /// it follows. When the drag pushes an edge past the opposite edge the
    /// region flips and the returned handle is the one now under the
    /// cursor; callers must keep dragging with the returned handle.
    pub fn move_handle_to(&mut self, handle: Handle, position: Vec2) -> Handle {
        let region = self.region;
        let mut handle = handle;
        let mut shift = Vec2::ZERO;
        let mut grow = Vec2::ZERO;

        if handle.on_left_edge() {
            let distance = position.x - region.x;
            shift.x = distance;
            grow.x = -distance;
            if distance > region.w {
                // left edge crossed the right edge
                shift.x = region.w;
                grow.x = distance - region.w * 2.0;
                handle = handle.mirrored_horizontally();
            }
        } else if handle.on_right_edge() {
            let distance = position.x - region.right();
            grow.x = distance;
            if distance < -region.w {
                // right edge crossed the left edge
                shift.x = distance + region.w;
                grow.x = -distance - region.w * 2.0;
                handle = handle.mirrored_horizontally();
            }
        }

        if handle.on_top_edge() {
            let distance = position.y - region.y;
            shift.y = distance;
            grow.y = -distance;
            if distance > region.h {
                shift.y = region.h;
                grow.y = distance - region.h * 2.0;
                handle = handle.mirrored_vertically();
            }
        } else if handle.on_bottom_edge() {
            let distance = position.y - region.bottom();
            grow.y = distance;
            if distance < -region.h {
                shift.y = distance + region.h;
                grow.y = -distance - region.h * 2.0;
                handle = handle.mirrored_vertically();
            }
        }

        self.set_region(Rect::from_position_size(
            region.position() + shift,
            region.size() + grow,
        ));
        handle
    }

    fn recalculate_handles(&mut self) {
        self.handles = handle_rects(&self.region, self.handle_size);
    }
}
