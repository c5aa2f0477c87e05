//! Pointer-driven drag and resize.
//!
//! A [`Gesture`] only ever computes a [`GesturePreview`]. The window manager
//! writes to the registry once, from the [`Commit`] returned by
//! [`Gesture::finish`], so cancelling needs no rollback.

use crate::error::{Transition, WmError, WmResult};
use crate::layout::{
    Point, Rect, ResizeEdge, Size, SnapConfig, SnapZone, apply_resize, detect_zone_with,
    keep_reachable, snap_bounds_with,
};
use crate::window::{Window, WindowId, WindowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Resizing,
    Committing,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeEdge),
}

/// Viewport and tuning values a gesture needs, captured when it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureContext {
    pub viewport: Size,
    pub snap: SnapConfig,
    pub drag_threshold: u32,
    pub min_visible_margin: u32,
}

impl GestureContext {
    fn usable_area(&self) -> Rect {
        self.snap
            .usable_area(self.viewport.width, self.viewport.height)
    }

    fn zone_bounds(&self, zone: SnapZone) -> Rect {
        snap_bounds_with(&self.snap, zone, self.viewport.width, self.viewport.height)
    }
}

/// What the renderer should show while the pointer is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GesturePreview {
    pub window_id: WindowId,
    /// Where the window itself would be drawn.
    pub bounds: Rect,
    /// Zone the release would snap into, already filtered by the window's
    /// policy.
    pub zone: Option<SnapZone>,
    /// Outline of `zone`, for the snap hint.
    pub zone_bounds: Option<Rect>,
}

/// Registry write produced by releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Nothing,
    /// Leave any zone and become a normal window at `bounds`.
    Move { bounds: Rect },
    Snap { zone: SnapZone, restore: Rect },
    Resize { bounds: Rect },
}

#[derive(Debug, Clone)]
pub struct Gesture {
    window_id: WindowId,
    kind: GestureKind,
    phase: GesturePhase,
    ctx: GestureContext,
    pointer_start: Point,
    // geometry when the pointer went down
    start_bounds: Rect,
    // the normal-state rectangle a drag carries around
    restore: Rect,
    from_zone: Option<SnapZone>,
    min_size: Size,
    can_maximize: bool,
    can_side_snap: bool,
    past_threshold: bool,
    preview: GesturePreview,
}

impl Gesture {
    /// Start moving `window` by its title bar.
    pub fn drag(window: &Window, pointer: Point, ctx: GestureContext) -> WmResult<Self> {
        if !window.is_visible() {
            return Err(WmError::invalid(window.id(), Transition::Drag));
        }
        Ok(Self::new(window, GestureKind::Drag, pointer, ctx))
    }

    /// Start resizing `window` from `edge`. Only normal, resizable windows
    /// can be resized.
    pub fn resize(
        window: &Window,
        edge: ResizeEdge,
        pointer: Point,
        ctx: GestureContext,
    ) -> WmResult<Self> {
        if !window.resizable() || window.state() != WindowState::Normal {
            return Err(WmError::invalid(window.id(), Transition::Resize));
        }
        Ok(Self::new(window, GestureKind::Resize(edge), pointer, ctx))
    }

    fn new(window: &Window, kind: GestureKind, pointer: Point, ctx: GestureContext) -> Self {
        let start_bounds = window.bounds();
        let phase = match kind {
            GestureKind::Drag => GesturePhase::Dragging,
            GestureKind::Resize(_) => GesturePhase::Resizing,
        };
        Self {
            window_id: window.id(),
            kind,
            phase,
            ctx,
            pointer_start: pointer,
            start_bounds,
            restore: window.restore_bounds().unwrap_or(start_bounds),
            from_zone: window.state().zone(),
            min_size: window.min_size(),
            can_maximize: window.maximizable(),
            can_side_snap: window.resizable(),
            past_threshold: false,
            preview: GesturePreview {
                window_id: window.id(),
                bounds: start_bounds,
                zone: None,
                zone_bounds: None,
            },
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn preview(&self) -> &GesturePreview {
        &self.preview
    }

    /// Geometry to put back when the gesture is abandoned.
    pub fn start_bounds(&self) -> Rect {
        self.start_bounds
    }

    pub fn is_live(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging | GesturePhase::Resizing)
    }

    pub fn update(&mut self, pointer: Point) -> &GesturePreview {
        if !self.is_live() {
            return &self.preview;
        }
        match self.kind {
            GestureKind::Drag => self.update_drag(pointer),
            GestureKind::Resize(edge) => {
                let bounds = apply_resize(
                    self.start_bounds,
                    edge,
                    self.pointer_start,
                    pointer,
                    self.min_size,
                    Some(self.ctx.usable_area()),
                );
                self.preview.bounds = bounds;
            }
        }
        tracing::trace!(
            window_id = %self.window_id,
            x = self.preview.bounds.x,
            y = self.preview.bounds.y,
            zone = ?self.preview.zone,
            "gesture preview"
        );
        &self.preview
    }

    fn update_drag(&mut self, pointer: Point) {
        if !self.past_threshold {
            if pointer.manhattan(self.pointer_start) < self.ctx.drag_threshold {
                return;
            }
            self.past_threshold = true;
        }

        self.preview.bounds = match self.from_zone {
            None => self.start_bounds.translated(
                pointer.x.saturating_sub(self.pointer_start.x),
                pointer.y.saturating_sub(self.pointer_start.y),
            ),
            Some(_) => self.torn_off(pointer),
        };

        let zone = detect_zone_with(
            &self.ctx.snap,
            pointer.x,
            pointer.y,
            self.ctx.viewport.width,
            self.ctx.viewport.height,
        )
        .filter(|zone| self.allows(*zone));
        self.preview.zone = zone;
        self.preview.zone_bounds = zone.map(|zone| self.ctx.zone_bounds(zone));
    }

    // Restore-size rectangle under the pointer, holding the pointer at the
    // same relative spot of the title bar it grabbed.
    fn torn_off(&self, pointer: Point) -> Rect {
        let start = self.start_bounds;
        let grab_x = i64::from(self.pointer_start.x) - i64::from(start.x);
        let grab_x = grab_x.clamp(0, i64::from(start.width));
        let scaled_x = if start.width == 0 {
            0
        } else {
            grab_x * i64::from(self.restore.width) / i64::from(start.width)
        };
        let grab_y = i64::from(self.pointer_start.y) - i64::from(start.y);
        let grab_y = grab_y.clamp(0, i64::from(self.restore.height.saturating_sub(1)));
        let x = i64::from(pointer.x) - scaled_x;
        let y = i64::from(pointer.y) - grab_y;
        Rect::from_parts(
            Point::new(clamp_i32(x), clamp_i32(y)),
            self.restore.size(),
        )
    }

    fn allows(&self, zone: SnapZone) -> bool {
        match zone {
            SnapZone::Maximized => self.can_maximize,
            SnapZone::Left | SnapZone::Right => self.can_side_snap,
        }
    }

    /// Release the pointer and compute what to write.
    pub fn finish(&mut self) -> Commit {
        if !self.is_live() {
            return Commit::Nothing;
        }
        self.phase = GesturePhase::Committing;
        match self.kind {
            GestureKind::Drag => {
                if !self.past_threshold {
                    return Commit::Nothing;
                }
                if let Some(zone) = self.preview.zone {
                    if self.from_zone == Some(zone) {
                        return Commit::Nothing;
                    }
                    return Commit::Snap {
                        zone,
                        restore: self.restore,
                    };
                }
                let bounds = keep_reachable(
                    self.preview.bounds,
                    self.ctx.usable_area(),
                    self.ctx.min_visible_margin,
                );
                if self.from_zone.is_none() && bounds == self.start_bounds {
                    Commit::Nothing
                } else {
                    Commit::Move { bounds }
                }
            }
            GestureKind::Resize(_) => {
                if self.preview.bounds == self.start_bounds {
                    Commit::Nothing
                } else {
                    Commit::Resize {
                        bounds: self.preview.bounds,
                    }
                }
            }
        }
    }

    pub fn cancel(&mut self) -> Rect {
        self.phase = GesturePhase::Cancelled;
        self.preview.bounds = self.start_bounds;
        self.preview.zone = None;
        self.preview.zone_bounds = None;
        self.start_bounds
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
