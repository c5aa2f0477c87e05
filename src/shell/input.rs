use crossterm::event::{Event, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use super::Shell;
use super::render::{confirm_layout, taskbar_buttons};
use crate::error::WmResult;
use crate::keybindings::Action;
use crate::layout::{Point, SnapZone};
use crate::lifecycle::ConfirmAction;
use crate::window::WindowId;
use crate::window::decorator::{Hit, TitleButton, hit_test};

const CONFIRM_ACTIONS: [Action; 3] = [
    Action::ConfirmToggle,
    Action::ConfirmAccept,
    Action::ConfirmCancel,
];

const DESKTOP_ACTIONS: [Action; 12] = [
    Action::Quit,
    Action::ToggleHelp,
    Action::CancelGesture,
    Action::FocusNext,
    Action::FocusPrev,
    Action::CloseWindow,
    Action::MinimizeWindow,
    Action::MaximizeWindow,
    Action::RestoreWindow,
    Action::SnapLeft,
    Action::SnapRight,
    Action::SaveDocument,
];

impl Shell {
    /// Route one terminal event. Returns `true` when it changed something
    /// worth redrawing.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.wm
                    .set_viewport(crate::layout::Size::new(u32::from(*width), u32::from(*height)));
                true
            }
            // the release will never arrive, so drop the gesture
            Event::FocusLost => self.wm.cancel_gesture().is_some(),
            _ => false,
        }
    }

    fn screen(&self) -> Rect {
        let viewport = self.wm.config().viewport;
        Rect::new(
            0,
            0,
            u16::try_from(viewport.width).unwrap_or(u16::MAX),
            u16::try_from(viewport.height).unwrap_or(u16::MAX),
        )
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.pending_close.is_some() {
            let action = self.bindings.first_match(&CONFIRM_ACTIONS, key);
            match action {
                Some(Action::ConfirmToggle) => self.toggle_confirm_selection(),
                Some(Action::ConfirmAccept) => {
                    let selected = self.pending_close.map(|pending| pending.selected);
                    if let Some(selected) = selected {
                        let result = self.resolve_pending_close(selected);
                        self.report(result);
                    }
                }
                Some(Action::ConfirmCancel) => {
                    let result = self.resolve_pending_close(ConfirmAction::Cancel);
                    self.report(result);
                }
                _ => return false,
            }
            return true;
        }

        if self.help_visible {
            let closes = self.bindings.matches(Action::ToggleHelp, key)
                || self.bindings.matches(Action::CancelGesture, key);
            if self.bindings.matches(Action::Quit, key) {
                self.request_quit();
            } else if closes {
                self.help_visible = false;
            }
            return true;
        }

        let launch: Vec<Action> = (0..super::LAUNCHER.len()).map(Action::Launch).collect();
        let action = self
            .bindings
            .first_match(&DESKTOP_ACTIONS, key)
            .or_else(|| self.bindings.first_match(&launch, key));
        match action {
            Some(action) => {
                tracing::trace!(%action, "key action");
                let result = self.run_action(action);
                self.report(result);
                true
            }
            None => self.type_char(key),
        }
    }

    fn run_action(&mut self, action: Action) -> WmResult<()> {
        let focused = self.wm.focused_window();
        match action {
            Action::Quit => self.request_quit(),
            Action::ToggleHelp => self.toggle_help(),
            Action::CancelGesture => {
                self.wm.cancel_gesture();
            }
            Action::FocusNext => {
                self.wm.focus_next(true);
            }
            Action::FocusPrev => {
                self.wm.focus_next(false);
            }
            Action::Launch(slot) => {
                self.launch(slot)?;
            }
            Action::CloseWindow => with_focused(focused, |id| self.request_close(id))?,
            Action::MinimizeWindow => with_focused(focused, |id| self.wm.minimize_window(id))?,
            Action::MaximizeWindow => with_focused(focused, |id| self.wm.maximize_window(id))?,
            Action::RestoreWindow => with_focused(focused, |id| self.wm.restore_window(id))?,
            Action::SnapLeft => {
                with_focused(focused, |id| self.wm.snap_window(id, SnapZone::Left))?;
            }
            Action::SnapRight => {
                with_focused(focused, |id| self.wm.snap_window(id, SnapZone::Right))?;
            }
            Action::SaveDocument => with_focused(focused, |id| self.save_document(id))?,
            Action::ConfirmToggle | Action::ConfirmAccept | Action::ConfirmCancel => {}
        }
        Ok(())
    }

    fn type_char(&mut self, key: &KeyEvent) -> bool {
        let crossterm::event::KeyCode::Char(ch) = key.code else {
            return false;
        };
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        let Some(id) = self.wm.focused_window() else {
            return false;
        };
        let result = self.type_into(id, ch);
        self.report(result);
        true
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let pointer = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(mouse, pointer),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.wm.update_gesture(pointer).is_some()
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let live = self.wm.gesture_preview().is_some();
                let result = self.wm.end_gesture().map(|_| ());
                self.report(result);
                live
            }
            _ => false,
        }
    }

    fn pointer_down(&mut self, mouse: &MouseEvent, pointer: Point) -> bool {
        let screen = self.screen();
        if self.pending_close.is_some() {
            let Some(layout) = confirm_layout(screen) else {
                return false;
            };
            let action = if layout.confirm.contains((mouse.column, mouse.row).into()) {
                ConfirmAction::Confirm
            } else if layout.cancel.contains((mouse.column, mouse.row).into()) {
                ConfirmAction::Cancel
            } else {
                return false;
            };
            let result = self.resolve_pending_close(action);
            self.report(result);
            return true;
        }

        let taskbar_hit = taskbar_buttons(self, screen)
            .into_iter()
            .find(|(_, rect)| rect.contains((mouse.column, mouse.row).into()))
            .map(|(id, _)| id);
        if let Some(id) = taskbar_hit {
            let result = if self.wm.is_focused(id) {
                self.wm.minimize_window(id)
            } else {
                self.wm.focus_window(id)
            };
            self.report(result);
            return true;
        }

        let Some((id, hit)) = self.window_at(pointer) else {
            return false;
        };
        let result = self.press_window(id, hit, pointer);
        self.report(result);
        true
    }

    /// Top-most visible window under `pointer` and the part that was hit.
    fn window_at(&self, pointer: Point) -> Option<(WindowId, Hit)> {
        self.wm.visible_windows().iter().rev().find_map(|window| {
            hit_test(window.bounds(), pointer, window.resizable())
                .map(|hit| (window.id(), hit))
        })
    }

    fn press_window(&mut self, id: WindowId, hit: Hit, pointer: Point) -> WmResult<()> {
        self.wm.focus_window(id)?;
        match hit {
            Hit::Button(TitleButton::Minimize) => self.wm.minimize_window(id),
            Hit::Button(TitleButton::Maximize) => self.wm.maximize_window(id),
            Hit::Button(TitleButton::Close) => self.request_close(id),
            Hit::TitleBar => self.wm.begin_drag(id, pointer),
            Hit::Edge(edge) => {
                let normal = self
                    .wm
                    .window(id)
                    .is_some_and(|window| window.state() == crate::window::WindowState::Normal);
                // zoned windows are dragged by their border, not resized
                if normal {
                    self.wm.begin_resize(id, edge, pointer)
                } else {
                    self.wm.begin_drag(id, pointer)
                }
            }
            Hit::Body => Ok(()),
        }
    }
}

fn with_focused<F>(focused: Option<WindowId>, f: F) -> WmResult<()>
where
    F: FnOnce(WindowId) -> WmResult<()>,
{
    match focused {
        Some(id) => f(id),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use crate::lifecycle::ConcurrencyPolicy;
    use crate::window::WindowState;
    use crossterm::event::KeyCode;

    fn shell() -> Shell {
        Shell::new(Size::new(80, 24), ConcurrencyPolicy::Reject, 6)
    }

    fn key(code: KeyCode, mods: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    fn mouse(kind: MouseEventKind, column: i32, row: i32) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: u16::try_from(column).unwrap(),
            row: u16::try_from(row).unwrap(),
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn alt_digit_launches_and_ctrl_q_quits() {
        let mut shell = shell();
        shell.handle_event(&key(KeyCode::Char('2'), KeyModifiers::ALT));
        assert_eq!(shell.wm().live_count(), 1);
        shell.handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(shell.should_quit());
    }

    #[test]
    fn typing_then_ctrl_w_opens_confirm_dialog() {
        let mut shell = shell();
        let id = shell.launch(1).unwrap().unwrap();
        shell.handle_event(&key(KeyCode::Char('h'), KeyModifiers::NONE));
        shell.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(shell.pending_close().map(|p| p.window), Some(id));

        // Enter on the default selection keeps the window
        shell.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(shell.pending_close(), None);
        assert_eq!(shell.wm().window(id).unwrap().state(), WindowState::Normal);

        shell.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        shell.handle_event(&key(KeyCode::Tab, KeyModifiers::NONE));
        shell.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(shell.wm().window(id).is_none());
    }

    #[test]
    fn title_bar_drag_to_left_edge_snaps() {
        let mut shell = shell();
        let id = shell.launch(4).unwrap().unwrap();
        let bounds = shell.wm().window(id).unwrap().bounds();
        let grab = (bounds.x + 4, bounds.y);

        shell.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), grab.0, grab.1));
        shell.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 0, 10));
        assert_eq!(
            shell.wm().gesture_preview().and_then(|p| p.zone),
            Some(SnapZone::Left)
        );
        shell.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 0, 10));

        let window = shell.wm().window(id).unwrap();
        assert_eq!(window.state(), WindowState::SnappedLeft);
        assert_eq!(window.restore_bounds(), Some(bounds));
        assert_eq!(window.bounds(), crate::layout::Rect::new(0, 0, 40, 23));
    }

    #[test]
    fn losing_focus_mid_drag_leaves_the_window_in_place() {
        let mut shell = shell();
        let id = shell.launch(4).unwrap().unwrap();
        let bounds = shell.wm().window(id).unwrap().bounds();

        shell.handle_event(&mouse(
            MouseEventKind::Down(MouseButton::Left),
            bounds.x + 4,
            bounds.y,
        ));
        shell.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 0, 10));
        assert!(shell.handle_event(&Event::FocusLost));
        assert!(shell.wm().gesture_preview().is_none());
        shell.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 0, 10));

        let window = shell.wm().window(id).unwrap();
        assert_eq!(window.state(), WindowState::Normal);
        assert_eq!(window.bounds(), bounds);
    }

    #[test]
    fn taskbar_click_toggles_minimize() {
        let mut shell = shell();
        let id = shell.launch(1).unwrap().unwrap();
        shell.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 2, 23));
        assert_eq!(shell.wm().window(id).unwrap().state(), WindowState::Minimized);
        shell.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 2, 23));
        assert_eq!(shell.wm().window(id).unwrap().state(), WindowState::Normal);
        assert!(shell.wm().is_focused(id));
    }

    #[test]
    fn close_button_closes_clean_window() {
        let mut shell = shell();
        let id = shell.launch(4).unwrap().unwrap();
        let bounds = shell.wm().window(id).unwrap().bounds();
        let close_x = bounds.right() - 3;
        shell.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), close_x, bounds.y));
        assert!(shell.wm().window(id).is_none());
    }

    #[test]
    fn terminal_resize_relayouts_snapped_windows() {
        let mut shell = shell();
        let id = shell.launch(4).unwrap().unwrap();
        shell.wm_mut().snap_window(id, SnapZone::Right).unwrap();
        shell.handle_event(&Event::Resize(100, 30));
        assert_eq!(
            shell.wm().window(id).unwrap().bounds(),
            crate::layout::Rect::new(50, 0, 50, 29)
        );
    }
}
