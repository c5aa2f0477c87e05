use std::cell::Cell;
use std::rc::Rc;

use deskwm::apps::{NOTEPAD, SETTINGS};
use deskwm::error::{Transition, WmError};
use deskwm::events::Topic;
use deskwm::gesture::{Commit, GesturePhase};
use deskwm::layout::{Point, Rect, ResizeEdge, Size, SnapZone};
use deskwm::lifecycle::ConcurrencyPolicy;
use deskwm::window::{WindowId, WindowManager, WindowState, WmConfig};

const NOTEPAD_HOME: Rect = Rect::new(640, 276, 640, 480);

fn manager() -> WindowManager {
    WindowManager::new(WmConfig::new(
        Size::new(1920, 1080),
        ConcurrencyPolicy::Reject,
    ))
}

fn drag(wm: &mut WindowManager, id: WindowId, from: Point, to: Point) -> Commit {
    wm.begin_drag(id, from).unwrap();
    wm.update_gesture(Point::new((from.x + to.x) / 2, (from.y + to.y) / 2));
    wm.update_gesture(to);
    wm.end_gesture().unwrap()
}

fn count_notifications(wm: &mut WindowManager) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    for topic in [Topic::Registry, Topic::ZOrder] {
        let count = Rc::clone(&count);
        wm.subscribe(topic, move |_| count.set(count.get() + 1));
    }
    count
}

#[test]
fn drag_to_right_edge_snaps_and_remembers_restore_bounds() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    assert_eq!(wm.window(id).unwrap().bounds(), NOTEPAD_HOME);

    let commit = drag(&mut wm, id, Point::new(700, 276), Point::new(1915, 500));
    assert_eq!(
        commit,
        Commit::Snap {
            zone: SnapZone::Right,
            restore: NOTEPAD_HOME
        }
    );
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::SnappedRight);
    assert_eq!(window.bounds(), Rect::new(960, 0, 960, 1032));
    assert_eq!(window.restore_bounds(), Some(NOTEPAD_HOME));

    wm.restore_window(id).unwrap();
    assert_eq!(wm.window(id).unwrap().bounds(), NOTEPAD_HOME);
}

#[test]
fn zone_targets_on_a_full_hd_viewport() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();

    drag(&mut wm, id, Point::new(700, 276), Point::new(3, 600));
    assert_eq!(wm.window(id).unwrap().bounds(), Rect::new(0, 0, 960, 1032));

    // corner: the top band wins
    wm.restore_window(id).unwrap();
    drag(&mut wm, id, Point::new(700, 276), Point::new(0, 0));
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Maximized);
    assert_eq!(window.bounds(), Rect::new(0, 0, 1920, 1032));
}

#[test]
fn cancelled_drag_leaves_no_trace() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    let count = count_notifications(&mut wm);

    wm.begin_drag(id, Point::new(700, 276)).unwrap();
    let preview = wm.update_gesture(Point::new(5, 500)).unwrap();
    assert_eq!(preview.zone, Some(SnapZone::Left));
    assert_eq!(wm.gesture_phase(), GesturePhase::Dragging);
    // the registry is untouched while previewing
    assert_eq!(wm.window(id).unwrap().bounds(), NOTEPAD_HOME);

    assert_eq!(wm.cancel_gesture(), Some(NOTEPAD_HOME));
    assert_eq!(wm.gesture_phase(), GesturePhase::Idle);
    assert_eq!(wm.end_gesture(), Ok(Commit::Nothing));
    assert_eq!(wm.window(id).unwrap().bounds(), NOTEPAD_HOME);
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
    assert_eq!(count.get(), 0);
}

#[test]
fn click_without_moving_commits_nothing() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    let count = count_notifications(&mut wm);
    let commit = drag(&mut wm, id, Point::new(700, 276), Point::new(701, 277));
    assert_eq!(commit, Commit::Nothing);
    assert_eq!(count.get(), 0);
}

#[test]
fn dragging_a_snapped_window_tears_it_off_at_restore_size() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    wm.snap_window(id, SnapZone::Right).unwrap();

    let commit = drag(&mut wm, id, Point::new(1000, 0), Point::new(1000, 300));
    let Commit::Move { bounds } = commit else {
        panic!("expected a move, got {commit:?}");
    };
    assert_eq!(bounds.size(), NOTEPAD_HOME.size());
    assert_eq!(bounds.y, 300);
    assert!(bounds.x <= 1000 && 1000 < bounds.right());
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.restore_bounds(), None);
}

#[test]
fn fixed_size_windows_cannot_resize_or_side_snap() {
    let mut wm = manager();
    let id = wm.create_window(SETTINGS).unwrap();
    let home = wm.window(id).unwrap().bounds();

    let corner = Point::new(home.right() - 1, home.bottom() - 1);
    assert_eq!(
        wm.begin_resize(id, ResizeEdge::BottomRight, corner),
        Err(WmError::InvalidStateTransition {
            id,
            transition: Transition::Resize
        })
    );
    assert_eq!(
        wm.snap_window(id, SnapZone::Left),
        Err(WmError::InvalidStateTransition {
            id,
            transition: Transition::Snap
        })
    );
    assert_eq!(
        wm.maximize_window(id),
        Err(WmError::InvalidStateTransition {
            id,
            transition: Transition::Maximize
        })
    );

    // dropped on the left band it just moves
    let commit = drag(&mut wm, id, Point::new(home.x + 50, home.y), Point::new(5, 400));
    assert!(matches!(commit, Commit::Move { .. }));
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.size(), home.size());
}

#[test]
fn resize_gesture_respects_minimum_size() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    let corner = Point::new(NOTEPAD_HOME.right() - 1, NOTEPAD_HOME.bottom() - 1);
    wm.begin_resize(id, ResizeEdge::BottomRight, corner).unwrap();
    wm.update_gesture(Point::new(0, 0));
    let commit = wm.end_gesture().unwrap();
    assert_eq!(
        commit,
        Commit::Resize {
            bounds: Rect::new(640, 276, 320, 240)
        }
    );
    assert_eq!(wm.window(id).unwrap().size(), Size::new(320, 240));
}

#[test]
fn closing_the_dragged_window_cancels_the_gesture() {
    let mut wm = manager();
    let id = wm.create_window(NOTEPAD).unwrap();
    wm.begin_drag(id, Point::new(700, 276)).unwrap();
    wm.update_gesture(Point::new(900, 400));
    wm.close_window(id).unwrap();
    assert_eq!(wm.gesture_phase(), GesturePhase::Idle);
    assert_eq!(wm.end_gesture(), Ok(Commit::Nothing));
}
