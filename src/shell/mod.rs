//! Terminal desktop that drives [`WindowManager`] from crossterm events and
//! paints it with ratatui. Terminal cells stand in for pixels.

mod input;
pub mod render;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::apps::{AppCatalog, AppId, AppProfile, EXPLORER, NOTEPAD, RESUME, SETTINGS, TERMINAL};
use crate::error::WmResult;
use crate::events::{AnnouncementLog, Announcer};
use crate::keybindings::KeyBindings;
use crate::layout::{Size, SnapConfig};
use crate::lifecycle::{ConcurrencyPolicy, ConfirmAction};
use crate::snapshot::{LayoutSnapshot, RestoreReport};
use crate::window::decorator::{OpenStepDecorator, WindowDecorator};
use crate::window::{CloseOutcome, ContentState, WindowId, WindowManager, WmConfig};

/// Launcher order; `Alt+1` opens the first entry.
pub const LAUNCHER: [&str; 5] = [EXPLORER, NOTEPAD, SETTINGS, RESUME, TERMINAL];

/// Built-in apps sized for a terminal grid.
pub fn cell_catalog() -> AppCatalog {
    let mut catalog = AppCatalog::new();
    catalog.insert(
        EXPLORER,
        AppProfile::new("File Explorer", Size::new(50, 16), Size::new(30, 8))
            .with_icon("folder")
            .lazy(),
    );
    catalog.insert(
        NOTEPAD,
        AppProfile::new("Notepad", Size::new(44, 14), Size::new(24, 6)).with_icon("notepad"),
    );
    catalog.insert(
        SETTINGS,
        AppProfile::new("Settings", Size::new(40, 12), Size::new(40, 12))
            .with_icon("gear")
            .single_instance()
            .fixed_size(),
    );
    catalog.insert(
        RESUME,
        AppProfile::new("Resume", Size::new(56, 18), Size::new(32, 10))
            .with_icon("document")
            .single_instance()
            .lazy(),
    );
    catalog.insert(
        TERMINAL,
        AppProfile::new("Terminal", Size::new(48, 14), Size::new(28, 6)).with_icon("terminal"),
    );
    catalog
}

/// Window-manager tuning for a terminal: one-row taskbar, one-cell bands.
pub fn cell_config(viewport: Size, policy: ConcurrencyPolicy, max_windows: usize) -> WmConfig {
    WmConfig::new(viewport, policy)
        .with_snap(SnapConfig {
            taskbar_height: 1,
            side_band: 1,
            top_band: 0,
        })
        .with_max_windows(max_windows)
        .with_drag_threshold(2)
        .with_cascade_offset(2)
        .with_min_visible_margin(6)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClose {
    pub window: WindowId,
    pub selected: ConfirmAction,
}

pub struct Shell {
    wm: WindowManager,
    bindings: KeyBindings,
    announcements: Rc<RefCell<AnnouncementLog>>,
    documents: Rc<RefCell<BTreeMap<WindowId, String>>>,
    decorator: Arc<dyn WindowDecorator>,
    pending_close: Option<PendingClose>,
    help_visible: bool,
    quit: bool,
}

impl Shell {
    pub fn new(viewport: Size, policy: ConcurrencyPolicy, max_windows: usize) -> Self {
        let mut wm = WindowManager::with_catalog(
            cell_config(viewport, policy, max_windows),
            cell_catalog(),
        );
        let announcements = AnnouncementLog::shared();
        wm.set_announcer(Rc::clone(&announcements));
        Self {
            wm,
            bindings: KeyBindings::desktop(LAUNCHER.len()),
            announcements,
            documents: Rc::new(RefCell::new(BTreeMap::new())),
            decorator: Arc::new(OpenStepDecorator),
            pending_close: None,
            help_visible: false,
            quit: false,
        }
    }

    pub fn wm(&self) -> &WindowManager {
        &self.wm
    }

    pub fn wm_mut(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn decorator(&self) -> Arc<dyn WindowDecorator> {
        Arc::clone(&self.decorator)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn pending_close(&self) -> Option<PendingClose> {
        self.pending_close
    }

    pub fn latest_announcement(&self) -> Option<String> {
        self.announcements.borrow().latest().map(str::to_string)
    }

    pub fn document(&self, id: WindowId) -> Option<String> {
        self.documents.borrow().get(&id).cloned()
    }

    /// Open the app in launcher slot `slot`.
    pub fn launch(&mut self, slot: usize) -> WmResult<Option<WindowId>> {
        let Some(app) = LAUNCHER.get(slot) else {
            return Ok(None);
        };
        self.open(AppId::from(*app)).map(Some)
    }

    pub fn open(&mut self, app_id: AppId) -> WmResult<WindowId> {
        let is_notepad = app_id.as_str() == NOTEPAD;
        let id = self.wm.open_app(app_id)?;
        if is_notepad && !self.documents.borrow().contains_key(&id) {
            self.documents.borrow_mut().insert(id, String::new());
            let documents = Rc::clone(&self.documents);
            self.wm.register_cleanup(id, move |closed| {
                documents.borrow_mut().remove(&closed);
            })?;
        }
        Ok(id)
    }

    /// Ask to close `id`, showing the confirm dialog when it has unsaved
    /// changes.
    pub fn request_close(&mut self, id: WindowId) -> WmResult<()> {
        if self.wm.close_window(id)? == CloseOutcome::ConfirmationRequired {
            self.pending_close = Some(PendingClose {
                window: id,
                selected: ConfirmAction::Cancel,
            });
        }
        Ok(())
    }

    pub fn resolve_pending_close(&mut self, action: ConfirmAction) -> WmResult<()> {
        let Some(pending) = self.pending_close.take() else {
            return Ok(());
        };
        self.wm.resolve_close(pending.window, action)
    }

    pub fn toggle_confirm_selection(&mut self) {
        if let Some(pending) = self.pending_close.as_mut() {
            pending.selected = match pending.selected {
                ConfirmAction::Confirm => ConfirmAction::Cancel,
                ConfirmAction::Cancel => ConfirmAction::Confirm,
            };
        }
    }

    /// Append typed text to a notepad window and mark it dirty.
    pub fn type_into(&mut self, id: WindowId, ch: char) -> WmResult<()> {
        let appended = match self.documents.borrow_mut().get_mut(&id) {
            Some(text) => {
                text.push(ch);
                true
            }
            None => false,
        };
        if appended {
            self.wm.set_unsaved_changes(id, true)?;
        }
        Ok(())
    }

    pub fn save_document(&mut self, id: WindowId) -> WmResult<()> {
        if self.documents.borrow().contains_key(&id) {
            self.wm.set_unsaved_changes(id, false)?;
            self.announce("Document saved");
        }
        Ok(())
    }

    /// Content of lazily loaded apps arrives one frame after the window
    /// opens.
    pub fn tick(&mut self) {
        let loading: Vec<WindowId> = self
            .wm
            .windows()
            .filter(|window| window.content() == ContentState::Loading)
            .map(|window| window.id())
            .collect();
        for id in loading {
            let result = self.wm.mark_content_ready(id);
            self.report(result);
        }
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn restore_layout(&mut self, snapshot: &LayoutSnapshot) -> RestoreReport {
        let report = self.wm.restore_snapshot(snapshot);
        let notepads: Vec<WindowId> = report
            .restored
            .iter()
            .map(|(_, id)| *id)
            .filter(|id| {
                self.wm
                    .window(*id)
                    .is_some_and(|window| window.app_id().as_str() == NOTEPAD)
            })
            .collect();
        for id in notepads {
            self.documents.borrow_mut().insert(id, String::new());
            let documents = Rc::clone(&self.documents);
            let result = self.wm.register_cleanup(id, move |closed| {
                documents.borrow_mut().remove(&closed);
            });
            self.report(result);
        }
        report
    }

    pub fn shutdown(&mut self) -> usize {
        self.pending_close = None;
        self.wm.shutdown()
    }

    fn announce(&mut self, message: &str) {
        self.announcements.borrow_mut().announce(message);
    }

    /// Surface a rejected operation in the status line.
    pub(crate) fn report(&mut self, result: WmResult<()>) {
        if let Err(err) = result {
            tracing::debug!(%err, "operation rejected");
            self.announce(&err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(Size::new(80, 24), ConcurrencyPolicy::Reject, 6)
    }

    #[test]
    fn notepad_documents_are_dropped_on_close() {
        let mut shell = shell();
        let id = shell.launch(1).unwrap().unwrap();
        shell.type_into(id, 'h').unwrap();
        assert_eq!(shell.document(id).as_deref(), Some("h"));
        assert!(shell.wm().window(id).unwrap().has_unsaved_changes());

        shell.request_close(id).unwrap();
        assert_eq!(shell.pending_close().map(|p| p.window), Some(id));
        shell.toggle_confirm_selection();
        shell.resolve_pending_close(ConfirmAction::Confirm).unwrap();
        assert!(shell.wm().window(id).is_none());
        assert_eq!(shell.document(id), None);
    }

    #[test]
    fn saving_clears_unsaved_flag() {
        let mut shell = shell();
        let id = shell.launch(1).unwrap().unwrap();
        shell.type_into(id, 'x').unwrap();
        shell.save_document(id).unwrap();
        assert!(!shell.wm().window(id).unwrap().has_unsaved_changes());
        shell.request_close(id).unwrap();
        assert_eq!(shell.pending_close(), None);
    }

    #[test]
    fn lazy_content_is_ready_after_a_tick() {
        let mut shell = shell();
        let id = shell.launch(0).unwrap().unwrap();
        assert_eq!(
            shell.wm().window(id).unwrap().content(),
            ContentState::Loading
        );
        shell.tick();
        assert_eq!(shell.wm().window(id).unwrap().content(), ContentState::Ready);
    }

    #[test]
    fn launcher_slots_past_the_end_do_nothing() {
        let mut shell = shell();
        assert_eq!(shell.launch(LAUNCHER.len()), Ok(None));
    }
}
