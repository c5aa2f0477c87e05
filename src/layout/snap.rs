//! Snap-zone geometry.
//!
//! Pure functions over a viewport with a taskbar band reserved along the
//! bottom edge. Nothing here holds state.

use serde::{Deserialize, Serialize};

use super::{Rect, to_i32};
use crate::constants::{SNAP_SIDE_BAND, SNAP_TOP_BAND, TASKBAR_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapZone {
    Left,
    Right,
    Maximized,
}

/// Band widths used by [`detect_zone_with`] and [`snap_bounds_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapConfig {
    /// Height reserved for the taskbar at the bottom of the viewport.
    pub taskbar_height: u32,
    /// Width of the left and right trigger bands. Inclusive on both ends,
    /// so a band of 20 accepts distances `0..=20`.
    pub side_band: u32,
    /// Height of the top (maximize) trigger band, inclusive.
    pub top_band: u32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            taskbar_height: TASKBAR_HEIGHT,
            side_band: SNAP_SIDE_BAND,
            top_band: SNAP_TOP_BAND,
        }
    }
}

impl SnapConfig {
    pub fn usable_height(&self, viewport_height: u32) -> u32 {
        viewport_height.saturating_sub(self.taskbar_height)
    }

    /// The viewport minus the taskbar band.
    pub fn usable_area(&self, viewport_width: u32, viewport_height: u32) -> Rect {
        Rect::new(0, 0, viewport_width, self.usable_height(viewport_height))
    }
}

pub fn snap_bounds(zone: SnapZone, viewport_width: u32, viewport_height: u32) -> Rect {
    snap_bounds_with(&SnapConfig::default(), zone, viewport_width, viewport_height)
}

/// Target rectangle for `zone`. Left and right split the usable width; on
/// odd widths the right half takes the extra pixel so the halves tile the
/// usable area exactly.
pub fn snap_bounds_with(
    config: &SnapConfig,
    zone: SnapZone,
    viewport_width: u32,
    viewport_height: u32,
) -> Rect {
    let usable = config.usable_area(viewport_width, viewport_height);
    let half = usable.width / 2;
    match zone {
        SnapZone::Left => Rect {
            width: half,
            ..usable
        },
        SnapZone::Right => Rect {
            x: to_i32(half),
            width: usable.width - half,
            ..usable
        },
        SnapZone::Maximized => usable,
    }
}

pub fn detect_zone(
    pointer_x: i32,
    pointer_y: i32,
    viewport_width: u32,
    viewport_height: u32,
) -> Option<SnapZone> {
    detect_zone_with(
        &SnapConfig::default(),
        pointer_x,
        pointer_y,
        viewport_width,
        viewport_height,
    )
}

/// Hit-test the pointer against the trigger bands.
///
/// A pointer past an edge is treated as sitting on that edge. The top band
/// wins over the side bands where they overlap in the corners, and the
/// taskbar band never triggers a zone.
pub fn detect_zone_with(
    config: &SnapConfig,
    pointer_x: i32,
    pointer_y: i32,
    viewport_width: u32,
    viewport_height: u32,
) -> Option<SnapZone> {
    if viewport_width == 0 || viewport_height == 0 {
        return None;
    }
    let usable_height = config.usable_height(viewport_height);
    let x = pointer_x.clamp(0, to_i32(viewport_width - 1));
    let y = pointer_y.max(0);
    if y >= to_i32(usable_height) {
        return None;
    }
    // both coordinates are non-negative from here on
    if y.unsigned_abs() <= config.top_band {
        return Some(SnapZone::Maximized);
    }
    let from_left = x.unsigned_abs();
    let from_right = (viewport_width - 1) - from_left;
    if from_left <= config.side_band {
        Some(SnapZone::Left)
    } else if from_right <= config.side_band {
        Some(SnapZone::Right)
    } else {
        None
    }
}
