mod common;

use common::{editor, resource, write_resource};
use quick_atlas::{
    AtlasResource, Command, CommandHistory, EditError, MergeMode, Rect, ResourceStore, StoreError,
    Vec2,
};

const SHEET: &str = "sprites/sheet.png";

fn seeded_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_resource(dir.path(), "sprites/a.tres", &resource(SHEET, Rect::new(0.0, 0.0, 100.0, 100.0)));
    dir
}

// ── Creation ────────────────────────────────────────────────────────────────

#[test]
fn drawn_region_commits_and_undo_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some("sheet.png")).unwrap();

    editor.begin_gesture(Vec2::new(10.0, 10.0), 1.0).unwrap();
    editor.drag_gesture(Vec2::new(50.0, 40.0), Vec2::new(40.0, 30.0), 1.0);
    assert!(editor.end_gesture().unwrap());

    let path = "new_atlas_texture_1.tres";
    let key = editor.find(path).unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(10.0, 10.0, 40.0, 30.0));
    assert!(!editor.region(key).unwrap().is_new());
    assert!(editor.index().contains("sheet.png", path));
    assert!(dir.path().join(path).is_file());
    assert_eq!(editor.history().undo_label(), Some("Create atlas region"));

    assert!(editor.undo().unwrap());
    assert!(editor.find(path).is_none());
    assert!(!editor.index().contains("sheet.png", path));
    assert!(!dir.path().join(path).exists());

    assert!(editor.redo().unwrap());
    let key = editor.find(path).unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(10.0, 10.0, 40.0, 30.0));
    assert!(dir.path().join(path).is_file());
}

#[test]
fn zero_area_region_is_discarded_without_io() {
    let dir = tempfile::tempdir().unwrap();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some("sheet.png")).unwrap();
    let entries = editor.history().len();

    editor.begin_gesture(Vec2::new(10.0, 10.0), 1.0).unwrap();
    assert_eq!(editor.len(), 1);
    assert!(!editor.end_gesture().unwrap());

    assert!(editor.is_empty());
    assert_eq!(editor.history().len(), entries);
    assert_eq!(io.writes.get(), 0);
    assert!(editor.index().is_empty());
}

#[test]
fn placeholder_names_skip_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    write_resource(
        dir.path(),
        "sprites/new_atlas_texture_1.tres",
        &resource("sprites/other.png", Rect::new(0.0, 0.0, 4.0, 4.0)),
    );
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.start_new_region(Vec2::new(1.0, 1.0)).unwrap();
    assert_eq!(editor.region(key).unwrap().path(), "sprites/new_atlas_texture_2.tres");
    assert_eq!(editor.base_path(), "sprites");
}

#[test]
fn new_region_needs_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let (mut editor, _) = editor(dir.path());
    assert!(matches!(
        editor.start_new_region(Vec2::ZERO),
        Err(EditError::NoSource)
    ));
}

#[test]
fn grid_snaps_new_region_start() {
    let dir = tempfile::tempdir().unwrap();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some("sheet.png")).unwrap();
    editor.grid_mut().snap = true;
    editor.grid_mut().set_size_x(8);
    editor.grid_mut().set_size_y(8);
    let key = editor.start_new_region(Vec2::new(13.0, 2.0)).unwrap();
    assert_eq!(editor.region(key).unwrap().region().position(), Vec2::new(16.0, 0.0));
}

// ── Commit protocol ─────────────────────────────────────────────────────────

#[test]
fn unchanged_region_commits_nothing() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let entries = editor.history().len();
    let calls = io.io_calls();

    assert!(!editor.save_changes_and_update_history(key, MergeMode::Disable).unwrap());
    assert_eq!(editor.history().len(), entries);
    assert_eq!(io.io_calls(), calls);
}

#[test]
fn rename_onto_existing_resource_rolls_back() {
    let dir = seeded_dir();
    write_resource(
        dir.path(),
        "sprites/b.tres",
        &resource("sprites/other.png", Rect::new(5.0, 5.0, 5.0, 5.0)),
    );
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let index = editor.index().clone();
    let entries = editor.history().len();

    let result = editor.rename(key, "sprites/b");
    assert!(matches!(
        result,
        Err(EditError::Persistence(StoreError::AlreadyExists(ref p))) if p == "sprites/b.tres"
    ));
    assert_eq!(editor.region(key).unwrap().path(), "sprites/a.tres");
    assert!(!editor.region(key).unwrap().path_changed());
    assert_eq!(editor.index(), &index);
    assert_eq!(editor.history().len(), entries);
    assert_eq!(
        editor.store().load("sprites/b.tres").unwrap().source_path,
        "sprites/other.png"
    );
}

#[test]
fn rename_adds_extension_and_round_trips() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let index = editor.index().clone();

    assert!(editor.rename(key, "sprites/hero").unwrap());
    assert!(dir.path().join("sprites/hero.tres").is_file());
    assert!(!dir.path().join("sprites/a.tres").exists());
    assert!(editor.index().contains(SHEET, "sprites/hero.tres"));

    editor.undo().unwrap();
    assert!(dir.path().join("sprites/a.tres").is_file());
    assert_eq!(editor.index(), &index);
    let key = editor.find("sprites/a.tres").unwrap();
    assert_eq!(editor.region(key).unwrap().path(), "sprites/a.tres");

    editor.redo().unwrap();
    assert!(editor.find("sprites/hero.tres").is_some());
}

#[test]
fn failed_save_rolls_back_and_records_nothing() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let entries = editor.history().len();

    io.fail_writes.set(true);
    let result = editor.edit_margin(key, Rect::new(2.0, 2.0, 2.0, 2.0));
    assert!(matches!(result, Err(EditError::Persistence(StoreError::Io { .. }))));
    assert_eq!(editor.region(key).unwrap().margin(), Rect::default());
    assert!(!editor.region(key).unwrap().is_dirty());
    assert_eq!(editor.history().len(), entries);
}

#[test]
fn failed_region_and_filter_saves_roll_back() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let index = editor.index().clone();
    let entries = editor.history().len();

    io.fail_writes.set(true);
    assert!(matches!(
        editor.edit_region(key, Rect::new(5.0, 5.0, 10.0, 10.0)),
        Err(EditError::Persistence(StoreError::Io { .. }))
    ));
    assert!(matches!(
        editor.edit_filter_clip(key, true),
        Err(EditError::Persistence(StoreError::Io { .. }))
    ));

    let edits = editor.region(key).unwrap();
    assert_eq!(edits.region(), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert!(!edits.filter_clip());
    assert!(!edits.is_dirty());
    assert_eq!(editor.history().len(), entries);
    assert_eq!(editor.index(), &index);
    assert_eq!(
        editor.store().load("sprites/a.tres").unwrap(),
        resource(SHEET, Rect::new(0.0, 0.0, 100.0, 100.0))
    );
}

#[test]
fn failed_create_drops_the_drawn_region() {
    let dir = tempfile::tempdir().unwrap();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some("sheet.png")).unwrap();
    let entries = editor.history().len();

    editor.begin_gesture(Vec2::new(10.0, 10.0), 1.0).unwrap();
    editor.drag_gesture(Vec2::new(50.0, 40.0), Vec2::new(40.0, 30.0), 1.0);
    io.fail_writes.set(true);
    assert!(matches!(
        editor.end_gesture(),
        Err(EditError::Persistence(StoreError::Io { .. }))
    ));

    assert!(editor.is_empty());
    assert_eq!(editor.selected(), None);
    assert_eq!(editor.history().len(), entries);
    assert!(editor.index().is_empty());
    assert!(!dir.path().join("new_atlas_texture_1.tres").exists());
}

#[test]
fn failed_delete_keeps_the_region() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    editor.select(Some(key));
    let index = editor.index().clone();
    let entries = editor.history().len();

    editor.request_delete().unwrap();
    io.fail_writes.set(true);
    assert!(matches!(
        editor.resolve_delete(true),
        Err(EditError::Persistence(StoreError::Io { .. }))
    ));

    assert_eq!(editor.find("sprites/a.tres"), Some(key));
    assert_eq!(editor.len(), 1);
    assert_eq!(editor.history().len(), entries);
    assert_eq!(editor.index(), &index);
    assert!(dir.path().join("sprites/a.tres").is_file());
}

#[test]
fn failed_undo_leaves_region_and_file_as_they_were() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let edited = Rect::new(0.0, 0.0, 40.0, 40.0);
    editor.edit_region(key, edited).unwrap();
    let index = editor.index().clone();

    io.fail_writes.set(true);
    assert!(matches!(
        editor.undo(),
        Err(EditError::Persistence(StoreError::Io { .. }))
    ));

    let edits = editor.region(key).unwrap();
    assert_eq!(edits.region(), edited);
    assert!(!edits.is_dirty());
    assert_eq!(editor.store().load("sprites/a.tres").unwrap().region, edited);
    assert_eq!(editor.index(), &index);
    // the failed entry moved to the redo side
    assert!(editor.history().can_redo());

    io.fail_writes.set(false);
    assert!(editor.redo().unwrap());
    assert_eq!(editor.region(key).unwrap().region(), edited);
}

#[test]
fn negative_sizes_are_clamped_before_saving() {
    let dir = tempfile::tempdir().unwrap();
    write_resource(dir.path(), "sprites/a.tres", &resource(SHEET, Rect::new(0.0, 0.0, 10.0, 10.0)));
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();

    assert!(editor.edit_region(key, Rect::new(0.0, 0.0, -10.0, 5.0)).unwrap());
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(0.0, 0.0, 0.0, 5.0));
    assert_eq!(
        editor.store().load("sprites/a.tres").unwrap().region,
        Rect::new(0.0, 0.0, 0.0, 5.0)
    );

    editor
        .apply(&Command::SetRegionRect {
            path: "sprites/a.tres".into(),
            region: Rect::new(2.0, 2.0, 8.0, -1.0),
        })
        .unwrap();
    assert_eq!(
        editor.store().load("sprites/a.tres").unwrap().region,
        Rect::new(2.0, 2.0, 8.0, 0.0)
    );
}

#[test]
fn numeric_edits_coalesce_into_one_entry() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    let entries = editor.history().len();

    for w in [101.0, 102.0, 103.0] {
        editor.edit_region(key, Rect::new(0.0, 0.0, w, 100.0)).unwrap();
    }
    assert_eq!(editor.history().len(), entries + 1);
    assert_eq!(
        editor.store().load("sprites/a.tres").unwrap().region,
        Rect::new(0.0, 0.0, 103.0, 100.0)
    );

    editor.undo().unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn drag_records_exactly_one_entry() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let entries = editor.history().len();

    for _ in 0..2 {
        editor.begin_gesture(Vec2::new(50.0, 50.0), 1.0).unwrap();
        for step in 1..=5 {
            let x = 50.0 + step as f32;
            editor.drag_gesture(Vec2::new(x, 50.0), Vec2::new(1.0, 0.0), 1.0);
        }
        editor.end_gesture().unwrap();
    }
    assert_eq!(editor.history().len(), entries + 2);

    let key = editor.find("sprites/a.tres").unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(10.0, 0.0, 100.0, 100.0));
    editor.undo().unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(5.0, 0.0, 100.0, 100.0));
}

#[test]
fn gesture_claims_the_region() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();

    editor.begin_gesture(Vec2::new(50.0, 50.0), 1.0).unwrap();
    assert!(matches!(editor.undo(), Err(EditError::GestureInProgress)));
    assert!(matches!(
        editor.edit_filter_clip(key, true),
        Err(EditError::GestureInProgress)
    ));
    assert!(matches!(
        editor.save_changes_and_update_history(key, MergeMode::Disable),
        Err(EditError::GestureInProgress)
    ));
    assert!(editor.request_delete().is_none());
    editor.end_gesture().unwrap();
    assert!(!editor.region(key).unwrap().filter_clip());
}

// ── Deletion ────────────────────────────────────────────────────────────────

#[test]
fn declined_delete_changes_nothing() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();
    editor.select(Some(key));
    let entries = editor.history().len();
    let writes = io.writes.get();

    let prompt = editor.request_delete().unwrap();
    assert_eq!(prompt.path, "sprites/a.tres");
    assert!(!editor.resolve_delete(false).unwrap());

    assert_eq!(editor.selected(), Some(key));
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(editor.history().len(), entries);
    assert_eq!(io.writes.get(), writes);
    assert!(dir.path().join("sprites/a.tres").is_file());
}

#[test]
fn delete_undo_redo_restores_identical_state() {
    let dir = tempfile::tempdir().unwrap();
    let original = AtlasResource {
        source_path: SHEET.into(),
        region: Rect::new(4.0, 8.0, 15.0, 16.0),
        margin: Rect::new(1.0, 2.0, 3.0, 4.0),
        filter_clip: true,
    };
    write_resource(dir.path(), "sprites/a.tres", &original);
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let index = editor.index().clone();

    editor.select(editor.find("sprites/a.tres"));
    editor.request_delete().unwrap();
    assert!(editor.resolve_delete(true).unwrap());
    assert!(editor.find("sprites/a.tres").is_none());
    assert!(!dir.path().join("sprites/a.tres").exists());
    assert!(editor.index().is_empty());

    editor.undo().unwrap();
    assert_eq!(editor.store().load("sprites/a.tres").unwrap(), original);
    assert_eq!(editor.index(), &index);
    let key = editor.find("sprites/a.tres").unwrap();
    let edits = editor.region(key).unwrap();
    assert_eq!(edits.region(), original.region);
    assert_eq!(edits.margin(), original.margin);
    assert!(edits.filter_clip());
    assert!(!edits.is_dirty());

    editor.redo().unwrap();
    assert!(editor.find("sprites/a.tres").is_none());
    assert!(!dir.path().join("sprites/a.tres").exists());
}

// ── Attribute round trips ───────────────────────────────────────────────────

#[test]
fn region_margin_and_filter_changes_round_trip() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let key = editor.find("sprites/a.tres").unwrap();

    editor.edit_region(key, Rect::new(1.0, 1.0, 50.0, 50.0)).unwrap();
    editor.edit_margin(key, Rect::new(2.0, 2.0, 2.0, 2.0)).unwrap();
    editor.edit_filter_clip(key, true).unwrap();
    let stored = editor.store().load("sprites/a.tres").unwrap();
    assert_eq!(stored.region, Rect::new(1.0, 1.0, 50.0, 50.0));
    assert_eq!(stored.margin, Rect::new(2.0, 2.0, 2.0, 2.0));
    assert!(stored.filter_clip);

    editor.undo().unwrap();
    assert!(!editor.region(key).unwrap().filter_clip());
    editor.undo().unwrap();
    assert_eq!(editor.region(key).unwrap().margin(), Rect::default());
    editor.undo().unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(
        editor.store().load("sprites/a.tres").unwrap(),
        resource(SHEET, Rect::new(0.0, 0.0, 100.0, 100.0))
    );

    for _ in 0..3 {
        editor.redo().unwrap();
    }
    assert_eq!(editor.store().load("sprites/a.tres").unwrap(), stored);
    assert!(!editor.region(key).unwrap().is_dirty());
}

#[test]
fn source_switch_scopes_undo() {
    let dir = tempfile::tempdir().unwrap();
    write_resource(dir.path(), "one.tres", &resource("one.png", Rect::new(0.0, 0.0, 8.0, 8.0)));
    write_resource(dir.path(), "two.tres", &resource("two.png", Rect::new(0.0, 0.0, 8.0, 8.0)));
    let (mut editor, _) = editor(dir.path());

    editor.set_source(Some("one.png")).unwrap();
    let key = editor.find("one.tres").unwrap();
    editor.edit_filter_clip(key, true).unwrap();
    editor.set_source(Some("two.png")).unwrap();
    assert!(editor.find("one.tres").is_none());
    assert!(editor.find("two.tres").is_some());

    editor.undo().unwrap();
    assert_eq!(editor.source(), Some("one.png"));
    assert!(editor.find("two.tres").is_none());

    editor.undo().unwrap();
    let key = editor.find("one.tres").unwrap();
    assert!(!editor.region(key).unwrap().filter_clip());
    assert!(!editor.store().load("one.tres").unwrap().filter_clip);

    editor.redo().unwrap();
    editor.redo().unwrap();
    assert_eq!(editor.source(), Some("two.png"));
}

#[test]
fn opening_a_region_selects_it() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.open("sprites/a.tres").unwrap();
    assert_eq!(editor.source(), Some(SHEET));
    assert_eq!(editor.selected(), editor.find("sprites/a.tres"));
}

// ── Replay edge cases ───────────────────────────────────────────────────────

#[test]
fn create_over_live_region_is_a_duplicate() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let result = editor.apply(&Command::CreateRegion {
        path: "sprites/a.tres".into(),
        source: SHEET.into(),
        region: Rect::new(1.0, 1.0, 1.0, 1.0),
        margin: Rect::default(),
        filter_clip: false,
    });
    assert!(matches!(result, Err(EditError::DuplicateIdentity(ref p)) if p == "sprites/a.tres"));
    let key = editor.find("sprites/a.tres").unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn commands_for_unknown_regions_are_ignored() {
    let dir = seeded_dir();
    let (mut editor, io) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    let writes = io.writes.get();

    for command in [
        Command::SetRegionRect {
            path: "sprites/missing.tres".into(),
            region: Rect::new(0.0, 0.0, 1.0, 1.0),
        },
        Command::DeleteRegion {
            path: "sprites/missing.tres".into(),
        },
        Command::SetPath {
            from: "sprites/missing.tres".into(),
            to: "sprites/elsewhere.tres".into(),
        },
    ] {
        editor.apply(&command).unwrap();
    }
    assert_eq!(io.writes.get(), writes);
    assert_eq!(editor.len(), 1);
}

// ── Filesystem changes ──────────────────────────────────────────────────────

#[test]
fn filesystem_change_waits_for_drag_to_end() {
    let dir = seeded_dir();
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();

    editor.begin_gesture(Vec2::new(50.0, 50.0), 1.0).unwrap();
    write_resource(dir.path(), "sprites/c.tres", &resource(SHEET, Rect::new(200.0, 0.0, 8.0, 8.0)));
    editor.on_filesystem_changed();
    assert_eq!(editor.len(), 1);
    assert!(!editor.index().contains(SHEET, "sprites/c.tres"));

    editor.drag_gesture(Vec2::new(60.0, 50.0), Vec2::new(10.0, 0.0), 1.0);
    editor.end_gesture().unwrap();

    assert_eq!(editor.len(), 2);
    assert!(editor.index().contains(SHEET, "sprites/c.tres"));
    let key = editor.find("sprites/a.tres").unwrap();
    assert_eq!(editor.region(key).unwrap().region(), Rect::new(10.0, 0.0, 100.0, 100.0));
}

#[test]
fn regions_deleted_on_disk_leave_the_collection() {
    let dir = seeded_dir();
    write_resource(dir.path(), "sprites/b.tres", &resource(SHEET, Rect::new(0.0, 0.0, 8.0, 8.0)));
    let (mut editor, _) = editor(dir.path());
    editor.set_source(Some(SHEET)).unwrap();
    editor.select(editor.find("sprites/b.tres"));

    std::fs::remove_file(dir.path().join("sprites/b.tres")).unwrap();
    editor.on_filesystem_changed();

    assert!(editor.find("sprites/b.tres").is_none());
    assert!(editor.find("sprites/a.tres").is_some());
    assert_eq!(editor.selected(), None);
    assert!(!editor.index().contains(SHEET, "sprites/b.tres"));
}
