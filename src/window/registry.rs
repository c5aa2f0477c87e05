//! Authoritative `WindowId -> Window` map.

use std::collections::BTreeMap;

use super::{ContentState, CreateOptions, Window, WindowId, WindowPatch, WindowState};
use crate::apps::{AppId, AppProfile};
use crate::error::{Transition, WmError, WmResult};
use crate::layout::{Rect, to_i32};

// cascade restarts after this many stacked windows of one app
const CASCADE_WRAP: usize = 8;

#[derive(Debug, Clone)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, Window>,
    next_id: u64,
    next_seq: u64,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Insert a new window for `app_id` and return its id.
    ///
    /// Without an explicit position the window is centered in `area`,
    /// shifted by `cascade` pixels for every window of the same app that is
    /// already registered.
    pub fn create(
        &mut self,
        app_id: &AppId,
        profile: &AppProfile,
        options: CreateOptions,
        area: Rect,
        cascade: u32,
    ) -> WmResult<WindowId> {
        if !profile.policy.multi_instance
            && let Some(existing) = self.instance_of(app_id)
        {
            return Err(WmError::InstanceLimit {
                app_id: app_id.clone(),
                existing,
            });
        }

        let size = options
            .size
            .unwrap_or(profile.default_size)
            .at_least(profile.min_size);
        let position = options.position.unwrap_or_else(|| {
            let step = u32::try_from(self.count_of(app_id) % CASCADE_WRAP).unwrap_or(0);
            let offset = to_i32(step.saturating_mul(cascade));
            area.centered(size).translated(offset, offset).position()
        });

        let id = WindowId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let seq = self.next_seq;
        self.next_seq = seq.saturating_add(1);

        let window = Window {
            id,
            app_id: app_id.clone(),
            title: options
                .title
                .unwrap_or_else(|| profile.display_name.clone()),
            position,
            size,
            min_size: profile.min_size,
            state: WindowState::Normal,
            restore_bounds: None,
            minimized_from: None,
            closing_from: None,
            unsaved_changes: false,
            policy: profile.policy,
            pinned: options.pinned,
            content: if profile.lazy_content {
                ContentState::Loading
            } else {
                ContentState::Ready
            },
            created_seq: seq,
        };
        tracing::debug!(window_id = %id, app_id = %app_id, seq, "registered window");
        self.windows.insert(id, window);
        Ok(id)
    }

    /// Apply `patch` atomically: either every field is applied or, on error,
    /// none are.
    pub fn update(&mut self, id: WindowId, patch: WindowPatch) -> WmResult<()> {
        let current = self
            .windows
            .get(&id)
            .filter(|window| !window.is_closing())
            .ok_or(WmError::NotFound(id))?;
        let next = patched(current, patch)?;
        self.windows.insert(id, next);
        Ok(())
    }

    /// Move a window into `closing`, remembering the state it came from.
    pub fn begin_close(&mut self, id: WindowId) -> WmResult<()> {
        let window = self
            .windows
            .get_mut(&id)
            .filter(|window| !window.is_closing())
            .ok_or(WmError::NotFound(id))?;
        window.closing_from = Some(window.state);
        window.state = WindowState::Closing;
        Ok(())
    }

    /// Return a `closing` window to the state it had before the close request.
    pub fn abort_close(&mut self, id: WindowId) -> WmResult<WindowState> {
        let window = self.windows.get_mut(&id).ok_or(WmError::NotFound(id))?;
        if !window.is_closing() {
            return Err(WmError::invalid(id, Transition::RestoreFromClosing));
        }
        let state = window.closing_from.take().unwrap_or(WindowState::Normal);
        window.state = state;
        Ok(state)
    }

    /// Drop the record. Callers also remove the id from the z-order.
    pub fn remove(&mut self, id: WindowId) -> WmResult<Window> {
        self.windows.remove(&id).ok_or(WmError::NotFound(id))
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// Windows in creation order.
    pub fn list(&self) -> impl Iterator<Item = &Window> {
        // ids are allocated monotonically, so key order is creation order
        self.windows.values()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    /// Oldest registered window of `app_id`, closing ones included.
    pub fn instance_of(&self, app_id: &AppId) -> Option<WindowId> {
        self.windows
            .values()
            .find(|window| &window.app_id == app_id)
            .map(|window| window.id)
    }

    pub fn count_of(&self, app_id: &AppId) -> usize {
        self.windows
            .values()
            .filter(|window| &window.app_id == app_id)
            .count()
    }

    /// Registered windows, counting those with a pending close: they keep
    /// their slot until the close is confirmed.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub(crate) fn clear(&mut self) -> Vec<Window> {
        std::mem::take(&mut self.windows).into_values().collect()
    }
}

fn patched(current: &Window, patch: WindowPatch) -> WmResult<Window> {
    let id = current.id;
    let target_state = patch.state.unwrap_or(current.state);
    let state_changes = target_state != current.state;

    match target_state {
        WindowState::Closing => return Err(WmError::invalid(id, Transition::Close)),
        WindowState::Maximized if state_changes && !current.policy.maximizable => {
            return Err(WmError::invalid(id, Transition::Maximize));
        }
        WindowState::SnappedLeft | WindowState::SnappedRight
            if state_changes && !current.policy.resizable =>
        {
            return Err(WmError::invalid(id, Transition::Snap));
        }
        _ => {}
    }

    // zone states dictate their own geometry, so a re-layout may resize them
    if let Some(size) = patch.size
        && size != current.size
        && !current.policy.resizable
        && !state_changes
        && target_state.zone().is_none()
    {
        return Err(WmError::invalid(id, Transition::Resize));
    }

    let mut next = current.clone();
    if let Some(title) = patch.title {
        next.title = title;
    }
    if let Some(position) = patch.position {
        next.position = position;
    }
    if let Some(size) = patch.size {
        next.size = size.at_least(current.min_size);
    }
    if let Some(unsaved) = patch.unsaved_changes {
        next.unsaved_changes = unsaved;
    }
    if let Some(content) = patch.content {
        next.content = content;
    }

    next.state = target_state;
    if state_changes {
        if target_state == WindowState::Minimized {
            next.minimized_from = Some(current.state);
        } else if current.state == WindowState::Minimized {
            next.minimized_from = None;
        }
    }
    next.restore_bounds = match target_state {
        WindowState::Normal => None,
        WindowState::Maximized | WindowState::SnappedLeft | WindowState::SnappedRight => patch
            .restore_bounds
            .flatten()
            .or(current.restore_bounds)
            .or(Some(current.bounds())),
        _ => patch.restore_bounds.unwrap_or(current.restore_bounds),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppCatalog, NOTEPAD, SETTINGS};
    use crate::layout::{Point, Size};

    const AREA: Rect = Rect::new(0, 0, 1920, 1032);

    fn create(registry: &mut WindowRegistry, app: &str) -> WmResult<WindowId> {
        let catalog = AppCatalog::builtin();
        let app_id = AppId::from(app);
        let profile = catalog.get(&app_id)?.clone();
        registry.create(&app_id, &profile, CreateOptions::new(), AREA, 24)
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = WindowRegistry::new();
        let a = create(&mut registry, NOTEPAD).unwrap();
        registry.remove(a).unwrap();
        let b = create(&mut registry, NOTEPAD).unwrap();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn new_windows_are_centered_and_cascade() {
        let mut registry = WindowRegistry::new();
        let a = create(&mut registry, NOTEPAD).unwrap();
        let b = create(&mut registry, NOTEPAD).unwrap();
        let first = registry.get(a).unwrap().bounds();
        let second = registry.get(b).unwrap().bounds();
        assert_eq!(first, AREA.centered(Size::new(640, 480)));
        assert_eq!(second.position(), Point::new(first.x + 24, first.y + 24));
    }

    #[test]
    fn single_instance_apps_reject_second_window() {
        let mut registry = WindowRegistry::new();
        let first = create(&mut registry, SETTINGS).unwrap();
        let err = create(&mut registry, SETTINGS).unwrap_err();
        assert_eq!(
            err,
            WmError::InstanceLimit {
                app_id: AppId::from(SETTINGS),
                existing: first
            }
        );
    }

    #[test]
    fn update_clamps_size_to_minimum() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, NOTEPAD).unwrap();
        registry
            .update(id, WindowPatch::new().with_size(Size::new(10, 10)))
            .unwrap();
        assert_eq!(registry.get(id).unwrap().size(), Size::new(320, 240));
    }

    #[test]
    fn fixed_size_window_rejects_resize_and_maximize_atomically() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, SETTINGS).unwrap();
        let before = registry.get(id).unwrap().clone();

        let err = registry
            .update(
                id,
                WindowPatch::new()
                    .with_title("changed")
                    .with_size(Size::new(900, 900)),
            )
            .unwrap_err();
        assert_eq!(err, WmError::invalid(id, Transition::Resize));

        let err = registry
            .update(id, WindowPatch::new().with_state(WindowState::Maximized))
            .unwrap_err();
        assert_eq!(err, WmError::invalid(id, Transition::Maximize));
        assert_eq!(registry.get(id).unwrap(), &before);
    }

    #[test]
    fn zone_states_capture_and_normal_clears_restore_bounds() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, NOTEPAD).unwrap();
        let original = registry.get(id).unwrap().bounds();

        registry
            .update(
                id,
                WindowPatch::new()
                    .with_state(WindowState::SnappedLeft)
                    .with_bounds(Rect::new(0, 0, 960, 1032)),
            )
            .unwrap();
        assert_eq!(registry.get(id).unwrap().restore_bounds(), Some(original));

        // moving between zones keeps the original restore bounds
        registry
            .update(
                id,
                WindowPatch::new()
                    .with_state(WindowState::Maximized)
                    .with_bounds(AREA),
            )
            .unwrap();
        assert_eq!(registry.get(id).unwrap().restore_bounds(), Some(original));

        registry
            .update(
                id,
                WindowPatch::new()
                    .with_state(WindowState::Normal)
                    .with_bounds(original),
            )
            .unwrap();
        let window = registry.get(id).unwrap();
        assert_eq!(window.restore_bounds(), None);
        assert_eq!(window.bounds(), original);
    }

    #[test]
    fn minimize_remembers_previous_state() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, NOTEPAD).unwrap();
        registry
            .update(id, WindowPatch::new().with_state(WindowState::Maximized))
            .unwrap();
        registry
            .update(id, WindowPatch::new().with_state(WindowState::Minimized))
            .unwrap();
        let window = registry.get(id).unwrap();
        assert_eq!(window.minimized_from(), Some(WindowState::Maximized));
        assert!(window.restore_bounds().is_some());
    }

    #[test]
    fn closing_windows_reject_updates_until_aborted() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, NOTEPAD).unwrap();
        registry.begin_close(id).unwrap();
        assert_eq!(
            registry.update(id, WindowPatch::new().with_title("x")),
            Err(WmError::NotFound(id))
        );
        assert_eq!(registry.begin_close(id), Err(WmError::NotFound(id)));
        assert_eq!(registry.abort_close(id), Ok(WindowState::Normal));
        assert!(registry.update(id, WindowPatch::new().with_title("x")).is_ok());
    }

    #[test]
    fn patch_cannot_enter_closing_directly() {
        let mut registry = WindowRegistry::new();
        let id = create(&mut registry, NOTEPAD).unwrap();
        assert_eq!(
            registry.update(id, WindowPatch::new().with_state(WindowState::Closing)),
            Err(WmError::invalid(id, Transition::Close))
        );
    }

    #[test]
    fn list_is_in_creation_order() {
        let mut registry = WindowRegistry::new();
        let a = create(&mut registry, NOTEPAD).unwrap();
        let b = create(&mut registry, SETTINGS).unwrap();
        let c = create(&mut registry, NOTEPAD).unwrap();
        let ids: Vec<_> = registry.list().map(Window::id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}
