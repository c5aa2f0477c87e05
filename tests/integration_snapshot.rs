use deskwm::apps::{EXPLORER, NOTEPAD, SETTINGS, TERMINAL};
use deskwm::error::WmError;
use deskwm::layout::{Size, SnapZone};
use deskwm::lifecycle::ConcurrencyPolicy;
use deskwm::snapshot::LayoutSnapshot;
use deskwm::window::{WindowId, WindowManager, WindowState, WmConfig};

fn manager() -> WindowManager {
    WindowManager::new(WmConfig::new(
        Size::new(1920, 1080),
        ConcurrencyPolicy::Reject,
    ))
}

#[test]
fn layout_survives_a_save_and_load() {
    let mut wm = manager();
    let notepad = wm.create_window(NOTEPAD).unwrap();
    let terminal = wm.create_window(TERMINAL).unwrap();
    let explorer = wm.create_window(EXPLORER).unwrap();
    wm.snap_window(terminal, SnapZone::Left).unwrap();
    wm.minimize_window(explorer).unwrap();
    wm.focus_window(notepad).unwrap();
    wm.set_title(notepad, "todo.txt").unwrap();
    assert_eq!(wm.z_order(), &[explorer, terminal, notepad]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    wm.snapshot().save(&path).unwrap();
    let loaded = LayoutSnapshot::load(&path).unwrap();
    assert_eq!(loaded, wm.snapshot());

    let mut fresh = manager();
    let report = fresh.restore_snapshot(&loaded);
    assert!(report.is_complete());
    let mapped: Vec<WindowId> = [explorer, terminal, notepad]
        .into_iter()
        .map(|old| report.new_id(old).unwrap())
        .collect();
    assert_eq!(fresh.z_order(), mapped.as_slice());

    let restored_terminal = fresh.window(mapped[1]).unwrap();
    let original_terminal = wm.window(terminal).unwrap();
    assert_eq!(restored_terminal.state(), WindowState::SnappedLeft);
    assert_eq!(restored_terminal.bounds(), original_terminal.bounds());
    assert_eq!(
        restored_terminal.restore_bounds(),
        original_terminal.restore_bounds()
    );

    assert_eq!(
        fresh.window(mapped[0]).unwrap().state(),
        WindowState::Minimized
    );
    assert_eq!(fresh.window(mapped[2]).unwrap().title(), "todo.txt");
    assert_eq!(fresh.focused_window(), Some(mapped[2]));
}

#[test]
fn entries_that_cannot_be_replayed_are_reported() {
    let mut wm = manager();
    let settings = wm.create_window(SETTINGS).unwrap();
    let snapshot = wm.snapshot();

    // replaying onto the same manager collides with the open instance
    let report = wm.restore_snapshot(&snapshot);
    assert!(report.restored.is_empty());
    assert_eq!(
        report.failed,
        vec![(
            settings,
            WmError::InstanceLimit {
                app_id: SETTINGS.into(),
                existing: settings,
            }
        )]
    );
}

#[test]
fn unknown_versions_are_rejected() {
    let json = r#"{ "version": 99, "viewport": { "width": 10, "height": 10 }, "windows": [] }"#;
    assert!(LayoutSnapshot::from_json(json).is_err());
}
