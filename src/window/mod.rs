pub mod decorator;
pub mod registry;
pub mod z_order;

mod window_manager;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::apps::{AppId, WindowPolicy};
use crate::layout::{Point, Rect, Size, SnapZone};

pub use registry::WindowRegistry;
pub use window_manager::{CloseOutcome, WindowManager, WmConfig};
pub use z_order::ZOrder;

/// Opaque window handle. Ids are handed out in increasing order and never
/// reused, even after the window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
    SnappedLeft,
    SnappedRight,
    Closing,
}

impl WindowState {
    /// Drawn by the renderer and eligible for focus.
    pub fn is_visible(self) -> bool {
        !matches!(self, WindowState::Minimized | WindowState::Closing)
    }

    /// States whose geometry is dictated by a snap zone.
    pub fn zone(self) -> Option<SnapZone> {
        match self {
            WindowState::Maximized => Some(SnapZone::Maximized),
            WindowState::SnappedLeft => Some(SnapZone::Left),
            WindowState::SnappedRight => Some(SnapZone::Right),
            _ => None,
        }
    }

    pub fn from_zone(zone: SnapZone) -> Self {
        match zone {
            SnapZone::Left => WindowState::SnappedLeft,
            SnapZone::Right => WindowState::SnappedRight,
            SnapZone::Maximized => WindowState::Maximized,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindowState::Normal => "restored",
            WindowState::Minimized => "minimized",
            WindowState::Maximized => "maximized",
            WindowState::SnappedLeft => "snapped left",
            WindowState::SnappedRight => "snapped right",
            WindowState::Closing => "closing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentState {
    Loading,
    #[default]
    Ready,
}

/// One open application surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    id: WindowId,
    app_id: AppId,
    title: String,
    position: Point,
    size: Size,
    min_size: Size,
    state: WindowState,
    restore_bounds: Option<Rect>,
    // state to return to when un-minimizing
    minimized_from: Option<WindowState>,
    // state to return to when a close is vetoed
    closing_from: Option<WindowState>,
    unsaved_changes: bool,
    policy: WindowPolicy,
    pinned: bool,
    content: ContentState,
    created_seq: u64,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn restore_bounds(&self) -> Option<Rect> {
        self.restore_bounds
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn resizable(&self) -> bool {
        self.policy.resizable
    }

    pub fn maximizable(&self) -> bool {
        self.policy.maximizable
    }

    pub fn multi_instance(&self) -> bool {
        self.policy.multi_instance
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn content(&self) -> ContentState {
        self.content
    }

    pub fn created_seq(&self) -> u64 {
        self.created_seq
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn is_closing(&self) -> bool {
        self.state == WindowState::Closing
    }

    /// State a minimized window returns to when restored.
    pub fn minimized_from(&self) -> Option<WindowState> {
        self.minimized_from
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// Pinned windows are never evicted to make room for new ones.
    pub pinned: bool,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// Partial update applied by [`WindowRegistry::update`]. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowPatch {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub state: Option<WindowState>,
    pub restore_bounds: Option<Option<Rect>>,
    pub unsaved_changes: Option<bool>,
    pub content: Option<ContentState>,
}

impl WindowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.with_position(bounds.position()).with_size(bounds.size())
    }

    pub fn with_state(mut self, state: WindowState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_restore_bounds(mut self, bounds: Option<Rect>) -> Self {
        self.restore_bounds = Some(bounds);
        self
    }

    pub fn with_unsaved_changes(mut self, unsaved: bool) -> Self {
        self.unsaved_changes = Some(unsaved);
        self
    }

    pub fn with_content(mut self, content: ContentState) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
