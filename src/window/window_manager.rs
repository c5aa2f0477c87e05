use std::fmt;

use super::{
    ContentState, CreateOptions, Window, WindowId, WindowPatch, WindowRegistry, WindowState,
    ZOrder,
};
use crate::apps::{AppCatalog, AppId};
use crate::constants::{
    CASCADE_OFFSET, DEFAULT_MAX_WINDOWS, DRAG_THRESHOLD, MIN_VISIBLE_MARGIN,
};
use crate::error::{Transition, WmError, WmResult};
use crate::events::{
    Announcer, Change, DesktopView, Notification, Observer, Observers, SubscriptionId, Topic,
};
use crate::gesture::{Commit, Gesture, GestureContext, GesturePhase, GesturePreview};
use crate::layout::{
    Point, Rect, ResizeEdge, Size, SnapConfig, SnapZone, keep_reachable, snap_bounds_with,
};
use crate::lifecycle::{
    Admission, ConcurrencyPolicy, ConfirmAction, LifecycleManager, UnsavedChanges, WindowFlag,
};
use crate::snapshot::{LayoutSnapshot, RestoreReport, WindowSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmConfig {
    pub viewport: Size,
    pub snap: SnapConfig,
    pub max_windows: usize,
    pub policy: ConcurrencyPolicy,
    pub drag_threshold: u32,
    pub cascade_offset: u32,
    pub min_visible_margin: u32,
}

impl WmConfig {
    /// The concurrency policy has no default; hosts pick one explicitly.
    pub fn new(viewport: Size, policy: ConcurrencyPolicy) -> Self {
        Self {
            viewport,
            snap: SnapConfig::default(),
            max_windows: DEFAULT_MAX_WINDOWS,
            policy,
            drag_threshold: DRAG_THRESHOLD,
            cascade_offset: CASCADE_OFFSET,
            min_visible_margin: MIN_VISIBLE_MARGIN,
        }
    }

    pub fn with_snap(mut self, snap: SnapConfig) -> Self {
        self.snap = snap;
        self
    }

    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.max_windows = max_windows;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: u32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    pub fn with_cascade_offset(mut self, offset: u32) -> Self {
        self.cascade_offset = offset;
        self
    }

    pub fn with_min_visible_margin(mut self, margin: u32) -> Self {
        self.min_visible_margin = margin;
        self
    }

    pub fn usable_area(&self) -> Rect {
        self.snap
            .usable_area(self.viewport.width, self.viewport.height)
    }

    fn gesture_context(&self) -> GestureContext {
        GestureContext {
            viewport: self.viewport,
            snap: self.snap,
            drag_threshold: self.drag_threshold,
            min_visible_margin: self.min_visible_margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The window is now `closing`; answer with
    /// [`WindowManager::resolve_close`].
    ConfirmationRequired,
}

/// Keyboard focus cycling over a fixed order.
#[derive(Debug, Clone)]
pub struct FocusRing<T: Copy + Eq> {
    order: Vec<T>,
    current: Option<T>,
}

impl<T: Copy + Eq> FocusRing<T> {
    pub fn new(order: Vec<T>, current: Option<T>) -> Self {
        Self { order, current }
    }

    pub fn current(&self) -> Option<T> {
        self.current
    }

    pub fn advance(&mut self, forward: bool) -> Option<T> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        let next = match self
            .current
            .and_then(|current| self.order.iter().position(|item| *item == current))
        {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.current = self.order.get(next).copied();
        self.current
    }
}

/// Single writer over the registry and the z-order.
///
/// Every committed change notifies subscribers before the call returns.
/// Rejected operations change nothing and notify nobody.
pub struct WindowManager {
    config: WmConfig,
    catalog: AppCatalog,
    registry: WindowRegistry,
    z_order: ZOrder,
    lifecycle: LifecycleManager,
    observers: Observers,
    announcer: Option<Box<dyn Announcer>>,
    unsaved: Box<dyn UnsavedChanges>,
    gesture: Option<Gesture>,
}

impl fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("z_order", &self.z_order)
            .field("lifecycle", &self.lifecycle)
            .field("observers", &self.observers)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl WindowManager {
    pub fn new(config: WmConfig) -> Self {
        Self::with_catalog(config, AppCatalog::builtin())
    }

    pub fn with_catalog(config: WmConfig, catalog: AppCatalog) -> Self {
        Self {
            lifecycle: LifecycleManager::new(config.max_windows, config.policy),
            config,
            catalog,
            registry: WindowRegistry::new(),
            z_order: ZOrder::new(),
            observers: Observers::default(),
            announcer: None,
            unsaved: Box::new(WindowFlag),
            gesture: None,
        }
    }

    pub fn set_announcer<A: Announcer + 'static>(&mut self, announcer: A) {
        self.announcer = Some(Box::new(announcer));
    }

    /// Replace the collaborator consulted before closing or evicting.
    pub fn set_unsaved_source<U: UnsavedChanges + 'static>(&mut self, source: U) {
        self.unsaved = Box::new(source);
    }

    pub fn config(&self) -> &WmConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    pub fn subscribe<F>(&mut self, topic: Topic, observer: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        let observer: Observer = Box::new(observer);
        self.observers.subscribe(topic, observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Run `cleanup` when `id` closes, after any cleanups registered before.
    pub fn register_cleanup<F>(&mut self, id: WindowId, cleanup: F) -> WmResult<()>
    where
        F: FnOnce(WindowId) + 'static,
    {
        if !self.registry.contains(id) {
            return Err(WmError::NotFound(id));
        }
        self.lifecycle.register(id, cleanup);
        Ok(())
    }

    // ---- lifecycle -------------------------------------------------------

    pub fn create_window(&mut self, app_id: impl Into<AppId>) -> WmResult<WindowId> {
        self.create_window_with(app_id, CreateOptions::new())
    }

    pub fn create_window_with(
        &mut self,
        app_id: impl Into<AppId>,
        options: CreateOptions,
    ) -> WmResult<WindowId> {
        let app_id = app_id.into();
        let profile = self.catalog.get(&app_id)?.clone();
        if !profile.policy.multi_instance
            && let Some(existing) = self.registry.instance_of(&app_id)
        {
            return Err(WmError::InstanceLimit { app_id, existing });
        }

        let candidates: Vec<WindowId> = self
            .registry
            .list()
            .filter(|window| {
                !window.pinned()
                    && !window.is_closing()
                    && !self.unsaved.has_unsaved_changes(window)
            })
            .map(Window::id)
            .collect();
        if let Admission::Evict(victim) = self.lifecycle.admit(self.registry.len(), candidates)? {
            tracing::debug!(window_id = %victim, app_id = %app_id, "evicting window for new one");
            self.finish_close(victim)?;
        }

        let before = self.focused_window();
        let area = self.config.usable_area();
        let id = self.registry.create(
            &app_id,
            &profile,
            options,
            area,
            self.config.cascade_offset,
        )?;
        self.z_order.push(id);
        tracing::debug!(window_id = %id, app_id = %app_id, "opened window");
        self.emit(Topic::Registry, Change::Opened(id));
        self.emit(Topic::ZOrder, Change::Restacked);
        self.announce(id, "opened");
        self.sync_focus(before);
        Ok(id)
    }

    /// Open `app_id`, or focus its window when the app is single-instance
    /// and already open.
    pub fn open_app(&mut self, app_id: impl Into<AppId>) -> WmResult<WindowId> {
        let app_id = app_id.into();
        let profile = self.catalog.get(&app_id)?;
        if !profile.policy.multi_instance
            && let Some(existing) = self.registry.instance_of(&app_id)
        {
            self.focus_window(existing)?;
            return Ok(existing);
        }
        self.create_window(app_id)
    }

    /// Begin closing `id`. Windows with unsaved changes wait in `closing`
    /// for [`WindowManager::resolve_close`].
    pub fn close_window(&mut self, id: WindowId) -> WmResult<CloseOutcome> {
        let window = self.live(id)?;
        let needs_confirm = self.unsaved.has_unsaved_changes(window);
        self.cancel_gesture_for(id);
        if !needs_confirm {
            self.finish_close(id)?;
            return Ok(CloseOutcome::Closed);
        }
        let before = self.focused_window();
        self.registry.begin_close(id)?;
        tracing::debug!(window_id = %id, "close awaiting confirmation");
        self.emit(Topic::Registry, Change::CloseRequested(id));
        self.announce(id, "has unsaved changes");
        self.sync_focus(before);
        Ok(CloseOutcome::ConfirmationRequired)
    }

    pub fn resolve_close(&mut self, id: WindowId, action: ConfirmAction) -> WmResult<()> {
        let window = self.registry.get(id).ok_or(WmError::NotFound(id))?;
        if !window.is_closing() {
            return Err(WmError::invalid(id, Transition::RestoreFromClosing));
        }
        match action {
            ConfirmAction::Confirm => self.finish_close(id),
            ConfirmAction::Cancel => {
                let before = self.focused_window();
                let state = self.registry.abort_close(id)?;
                // the viewport may have changed while the dialog was up
                let target = self.registry.get(id).and_then(|w| self.relayout_target(w));
                if let Some(target) = target {
                    self.registry
                        .update(id, WindowPatch::new().with_bounds(target))?;
                }
                tracing::debug!(window_id = %id, state = ?state, "close cancelled");
                self.emit(Topic::Registry, Change::Updated(id));
                self.announce(id, "close cancelled");
                self.sync_focus(before);
                Ok(())
            }
        }
    }

    fn finish_close(&mut self, id: WindowId) -> WmResult<()> {
        let before = self.focused_window();
        let window = self.registry.remove(id)?;
        self.z_order.remove(id);
        self.cancel_gesture_for(id);
        self.lifecycle.on_close(id);
        tracing::debug!(window_id = %id, app_id = %window.app_id(), "closed window");
        self.emit(Topic::Registry, Change::Closed(id));
        self.emit(Topic::ZOrder, Change::Restacked);
        let name = self.display_name(window.app_id());
        self.announce_text(format!("{name} window closed"));
        self.sync_focus(before);
        Ok(())
    }

    /// Close every window and run every cleanup. Returns how many windows
    /// were closed.
    pub fn shutdown(&mut self) -> usize {
        if let Some(mut gesture) = self.gesture.take() {
            gesture.cancel();
        }
        let closed = self.registry.clear();
        self.z_order.clear();
        let cleanups = self.lifecycle.shutdown();
        tracing::debug!(windows = closed.len(), cleanups, "window manager shut down");
        for window in &closed {
            self.emit(Topic::Registry, Change::Closed(window.id()));
        }
        if !closed.is_empty() {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        closed.len()
    }

    // ---- state transitions ----------------------------------------------

    /// Raise `id`, restoring it first if it is minimized.
    pub fn focus_window(&mut self, id: WindowId) -> WmResult<()> {
        let window = self.live(id)?;
        let state = window.state();
        let resume = window.minimized_from().unwrap_or(WindowState::Normal);
        let before = self.focused_window();
        if state == WindowState::Minimized {
            let mut patch = WindowPatch::new().with_state(resume);
            if let Some(zone) = resume.zone() {
                patch = patch.with_bounds(self.zone_bounds(zone));
            }
            self.registry.update(id, patch)?;
            self.emit(Topic::Registry, Change::Updated(id));
            self.announce(id, "restored");
        }
        if self.z_order.raise(id) {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        self.sync_focus(before);
        Ok(())
    }

    /// Cycle focus over the visible windows in creation order.
    pub fn focus_next(&mut self, forward: bool) -> Option<WindowId> {
        let order: Vec<WindowId> = self
            .registry
            .list()
            .filter(|window| window.is_visible())
            .map(Window::id)
            .collect();
        let mut ring = FocusRing::new(order, self.focused_window());
        let next = ring.advance(forward)?;
        self.focus_window(next).ok()?;
        Some(next)
    }

    pub fn minimize_window(&mut self, id: WindowId) -> WmResult<()> {
        let window = self.live(id)?;
        if window.state() == WindowState::Minimized {
            return Ok(());
        }
        let before = self.focused_window();
        self.registry
            .update(id, WindowPatch::new().with_state(WindowState::Minimized))?;
        self.cancel_gesture_for(id);
        self.emit(Topic::Registry, Change::Updated(id));
        if self.z_order.sink(id) {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        self.announce(id, "minimized");
        self.sync_focus(before);
        Ok(())
    }

    /// Toggle between maximized and normal.
    pub fn maximize_window(&mut self, id: WindowId) -> WmResult<()> {
        if self.live(id)?.state() == WindowState::Maximized {
            return self.restore_window(id);
        }
        self.enter_zone(id, SnapZone::Maximized)
    }

    pub fn snap_window(&mut self, id: WindowId, zone: SnapZone) -> WmResult<()> {
        if self.live(id)?.state() == WindowState::from_zone(zone) {
            return Ok(());
        }
        self.enter_zone(id, zone)
    }

    fn enter_zone(&mut self, id: WindowId, zone: SnapZone) -> WmResult<()> {
        let before = self.focused_window();
        let patch = WindowPatch::new()
            .with_state(WindowState::from_zone(zone))
            .with_bounds(self.zone_bounds(zone));
        self.registry.update(id, patch)?;
        self.cancel_gesture_for(id);
        tracing::debug!(window_id = %id, zone = ?zone, "snapped window");
        self.emit(Topic::Registry, Change::Updated(id));
        if self.z_order.raise(id) {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        self.announce(id, WindowState::from_zone(zone).label());
        self.sync_focus(before);
        Ok(())
    }

    /// Return `id` to the normal state at its restore bounds.
    pub fn restore_window(&mut self, id: WindowId) -> WmResult<()> {
        let window = self.live(id)?;
        if window.state() == WindowState::Normal {
            return Ok(());
        }
        let bounds = window.restore_bounds().unwrap_or(window.bounds());
        let before = self.focused_window();
        self.registry.update(
            id,
            WindowPatch::new()
                .with_state(WindowState::Normal)
                .with_bounds(bounds),
        )?;
        self.cancel_gesture_for(id);
        self.emit(Topic::Registry, Change::Updated(id));
        if self.z_order.raise(id) {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        self.announce(id, WindowState::Normal.label());
        self.sync_focus(before);
        Ok(())
    }

    /// Move the window's top-left corner. A maximized or snapped window
    /// becomes normal at its restore size.
    pub fn move_window(&mut self, id: WindowId, position: Point) -> WmResult<()> {
        let window = self.live(id)?;
        if window.state() == WindowState::Minimized {
            return Err(WmError::invalid(id, Transition::Drag));
        }
        let size = match window.state().zone() {
            Some(_) => window.restore_bounds().unwrap_or(window.bounds()).size(),
            None => window.size(),
        };
        let target = keep_reachable(
            Rect::from_parts(position, size),
            self.config.usable_area(),
            self.config.min_visible_margin,
        );
        let was_zoned = window.state().zone().is_some();
        if !was_zoned && target == window.bounds() {
            return Ok(());
        }
        self.registry.update(
            id,
            WindowPatch::new()
                .with_state(WindowState::Normal)
                .with_bounds(target),
        )?;
        self.cancel_gesture_for(id);
        self.emit(Topic::Registry, Change::Updated(id));
        if was_zoned {
            self.announce(id, WindowState::Normal.label());
        }
        Ok(())
    }

    /// Resize a normal window, clamped to its minimum size.
    pub fn resize_window(&mut self, id: WindowId, size: Size) -> WmResult<()> {
        let window = self.live(id)?;
        if !window.resizable() || window.state() != WindowState::Normal {
            return Err(WmError::invalid(id, Transition::Resize));
        }
        if size.at_least(window.min_size()) == window.size() {
            return Ok(());
        }
        self.registry
            .update(id, WindowPatch::new().with_size(size))?;
        self.cancel_gesture_for(id);
        self.emit(Topic::Registry, Change::Updated(id));
        Ok(())
    }

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) -> WmResult<()> {
        let title = title.into();
        if self.live(id)?.title() == title {
            return Ok(());
        }
        self.registry
            .update(id, WindowPatch::new().with_title(title))?;
        self.emit(Topic::Registry, Change::Updated(id));
        Ok(())
    }

    pub fn set_unsaved_changes(&mut self, id: WindowId, unsaved: bool) -> WmResult<()> {
        if self.live(id)?.has_unsaved_changes() == unsaved {
            return Ok(());
        }
        self.registry
            .update(id, WindowPatch::new().with_unsaved_changes(unsaved))?;
        self.emit(Topic::Registry, Change::Updated(id));
        Ok(())
    }

    pub fn mark_content_ready(&mut self, id: WindowId) -> WmResult<()> {
        if self.live(id)?.content() == ContentState::Ready {
            return Ok(());
        }
        self.registry.update(
            id,
            WindowPatch::new().with_content(ContentState::Ready),
        )?;
        self.emit(Topic::Registry, Change::Updated(id));
        Ok(())
    }

    /// Change the viewport. Maximized and snapped windows follow their zone;
    /// normal windows are pulled back into reach.
    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport == self.config.viewport {
            return;
        }
        if let Some(mut gesture) = self.gesture.take() {
            gesture.cancel();
        }
        self.config.viewport = viewport;
        let relayout: Vec<(WindowId, WindowPatch)> = self
            .registry
            .list()
            .filter_map(|window| {
                let target = self.relayout_target(window)?;
                Some((window.id(), WindowPatch::new().with_bounds(target)))
            })
            .collect();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            windows = relayout.len(),
            "viewport changed"
        );
        for (id, patch) in relayout {
            match self.registry.update(id, patch) {
                Ok(()) => self.emit(Topic::Registry, Change::Updated(id)),
                Err(err) => tracing::warn!(window_id = %id, %err, "re-layout skipped"),
            }
        }
    }

    /// Bounds `window` should take in the current viewport, or `None` when
    /// it already has them. Minimized and closing windows are re-laid when
    /// they come back.
    fn relayout_target(&self, window: &Window) -> Option<Rect> {
        let target = match window.state() {
            WindowState::Maximized | WindowState::SnappedLeft | WindowState::SnappedRight => {
                self.zone_bounds(window.state().zone()?)
            }
            WindowState::Normal => keep_reachable(
                window.bounds(),
                self.config.usable_area(),
                self.config.min_visible_margin,
            ),
            WindowState::Minimized | WindowState::Closing => return None,
        };
        (target != window.bounds()).then_some(target)
    }

    // ---- gestures --------------------------------------------------------

    /// Pointer-down on a title bar. Any gesture still in flight is
    /// cancelled first.
    pub fn begin_drag(&mut self, id: WindowId, pointer: Point) -> WmResult<()> {
        self.cancel_gesture();
        let gesture = Gesture::drag(self.live(id)?, pointer, self.config.gesture_context())?;
        self.gesture = Some(gesture);
        Ok(())
    }

    pub fn begin_resize(&mut self, id: WindowId, edge: ResizeEdge, pointer: Point) -> WmResult<()> {
        self.cancel_gesture();
        let gesture = Gesture::resize(
            self.live(id)?,
            edge,
            pointer,
            self.config.gesture_context(),
        )?;
        self.gesture = Some(gesture);
        Ok(())
    }

    pub fn update_gesture(&mut self, pointer: Point) -> Option<GesturePreview> {
        self.gesture
            .as_mut()
            .map(|gesture| *gesture.update(pointer))
    }

    /// Pointer-up: commit the preview. Returns what was written.
    pub fn end_gesture(&mut self) -> WmResult<Commit> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(Commit::Nothing);
        };
        let id = gesture.window_id();
        let commit = gesture.finish();
        let patch = match commit {
            Commit::Nothing => return Ok(commit),
            Commit::Move { bounds } => WindowPatch::new()
                .with_state(WindowState::Normal)
                .with_bounds(bounds),
            Commit::Snap { zone, restore } => WindowPatch::new()
                .with_state(WindowState::from_zone(zone))
                .with_bounds(self.zone_bounds(zone))
                .with_restore_bounds(Some(restore)),
            Commit::Resize { bounds } => WindowPatch::new().with_bounds(bounds),
        };
        let was = self.live(id)?.state();
        self.registry.update(id, patch)?;
        self.emit(Topic::Registry, Change::Updated(id));
        match commit {
            Commit::Snap { zone, .. } => {
                tracing::debug!(window_id = %id, zone = ?zone, "snapped window");
                self.announce(id, WindowState::from_zone(zone).label());
            }
            Commit::Move { .. } if was != WindowState::Normal => {
                self.announce(id, WindowState::Normal.label());
            }
            _ => {}
        }
        Ok(commit)
    }

    /// Abandon the gesture in flight. Nothing was written, so nothing is
    /// notified. Returns the untouched bounds.
    pub fn cancel_gesture(&mut self) -> Option<Rect> {
        let mut gesture = self.gesture.take()?;
        tracing::trace!(window_id = %gesture.window_id(), "gesture cancelled");
        Some(gesture.cancel())
    }

    pub fn gesture_preview(&self) -> Option<&GesturePreview> {
        self.gesture.as_ref().map(Gesture::preview)
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture
            .as_ref()
            .map_or(GesturePhase::Idle, Gesture::phase)
    }

    fn cancel_gesture_for(&mut self, id: WindowId) {
        if self
            .gesture
            .as_ref()
            .is_some_and(|gesture| gesture.window_id() == id)
        {
            self.cancel_gesture();
        }
    }

    // ---- queries ---------------------------------------------------------

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.registry.get(id)
    }

    /// Windows in creation order.
    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.registry.list()
    }

    /// Top of the stack, when it is visible.
    pub fn focused_window(&self) -> Option<WindowId> {
        self.z_order.top().filter(|id| {
            self.registry
                .get(*id)
                .is_some_and(Window::is_visible)
        })
    }

    pub fn is_focused(&self, id: WindowId) -> bool {
        self.focused_window() == Some(id)
    }

    /// Back to front.
    pub fn visible_windows(&self) -> Vec<&Window> {
        self.stacked()
            .filter(|window| window.is_visible())
            .collect()
    }

    pub fn minimized_windows(&self) -> Vec<&Window> {
        self.stacked()
            .filter(|window| window.state() == WindowState::Minimized)
            .collect()
    }

    pub fn z_order(&self) -> &[WindowId] {
        self.z_order.ids()
    }

    /// Windows holding a slot under the concurrency ceiling.
    pub fn live_count(&self) -> usize {
        self.registry.len()
    }

    pub fn view(&self) -> DesktopView {
        DesktopView {
            z_order: self.z_order.ids().to_vec(),
            focused: self.focused_window(),
            visible: self.visible_windows().iter().map(|w| w.id()).collect(),
            minimized: self.minimized_windows().iter().map(|w| w.id()).collect(),
        }
    }

    pub fn zone_bounds(&self, zone: SnapZone) -> Rect {
        snap_bounds_with(
            &self.config.snap,
            zone,
            self.config.viewport.width,
            self.config.viewport.height,
        )
    }

    fn stacked(&self) -> impl Iterator<Item = &Window> {
        self.z_order
            .ids()
            .iter()
            .filter_map(|id| self.registry.get(*id))
    }

    fn live(&self, id: WindowId) -> WmResult<&Window> {
        self.registry
            .get(id)
            .filter(|window| !window.is_closing())
            .ok_or(WmError::NotFound(id))
    }

    // ---- snapshot --------------------------------------------------------

    /// Layout of every window not pending close, back to front.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let windows = self
            .stacked()
            .filter(|window| !window.is_closing())
            .map(WindowSnapshot::of)
            .collect();
        LayoutSnapshot::new(self.config.viewport, windows)
    }

    /// Replay `snapshot` on top of the current windows. Entries that fail
    /// are reported and skipped.
    pub fn restore_snapshot(&mut self, snapshot: &LayoutSnapshot) -> RestoreReport {
        let before = self.focused_window();
        let mut report = RestoreReport::default();
        for entry in &snapshot.windows {
            let normal = entry.normal_bounds();
            let options = CreateOptions::new()
                .with_title(entry.title.clone())
                .with_position(normal.position())
                .with_size(normal.size());
            let id = match self.create_window_with(entry.app_id.clone(), options) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(window_id = %entry.id, app_id = %entry.app_id, %err, "snapshot entry skipped");
                    report.failed.push((entry.id, err));
                    continue;
                }
            };
            report.restored.push((entry.id, id));
            if let Err(err) = self.replay_state(id, entry) {
                tracing::warn!(window_id = %entry.id, %err, "snapshot state not restored");
                report.failed.push((entry.id, err));
            }
        }

        // minimize sinks, so put the stack back in list order explicitly,
        // then keep minimized entries below the visible ones
        let mut restacked = false;
        for (_, id) in &report.restored {
            restacked |= self.z_order.raise(*id);
        }
        for (_, id) in report.restored.iter().rev() {
            if self
                .registry
                .get(*id)
                .is_some_and(|w| w.state() == WindowState::Minimized)
            {
                restacked |= self.z_order.sink(*id);
            }
        }
        if restacked {
            self.emit(Topic::ZOrder, Change::Restacked);
        }
        self.sync_focus(before);
        report
    }

    fn replay_state(&mut self, id: WindowId, entry: &WindowSnapshot) -> WmResult<()> {
        let settled = match entry.state {
            WindowState::Minimized => entry.minimized_from.unwrap_or(WindowState::Normal),
            state => state,
        };
        if let Some(zone) = settled.zone() {
            self.snap_window(id, zone)?;
        }
        if entry.state == WindowState::Minimized {
            self.minimize_window(id)?;
        }
        Ok(())
    }

    // ---- notifications ---------------------------------------------------

    fn emit(&mut self, topic: Topic, change: Change) {
        if self.observers.is_empty() {
            return;
        }
        let notification = Notification {
            topic,
            change,
            view: self.view(),
        };
        self.observers.notify(&notification);
    }

    fn sync_focus(&mut self, before: Option<WindowId>) {
        let after = self.focused_window();
        if after != before
            && let Some(id) = after
        {
            self.lifecycle.note_focus(id);
            tracing::debug!(window_id = %id, "focus changed");
        }
    }

    fn display_name(&self, app_id: &AppId) -> String {
        self.catalog
            .get(app_id)
            .map(|profile| profile.display_name.clone())
            .unwrap_or_else(|_| app_id.to_string())
    }

    fn announce(&mut self, id: WindowId, what: &str) {
        let Some(window) = self.registry.get(id) else {
            return;
        };
        let name = self.display_name(window.app_id());
        self.announce_text(format!("{name} window {what}"));
    }

    fn announce_text(&mut self, message: String) {
        if let Some(announcer) = self.announcer.as_mut() {
            announcer.announce(&message);
        }
    }
}
