//! Shared crate-wide constants.

/// Height (px) reserved for the taskbar along the bottom of the viewport.
pub const TASKBAR_HEIGHT: u32 = 48;

/// Width (px) of the left and right snap trigger bands.
///
/// Bands are inclusive of their boundary pixel, so a pointer `SNAP_SIDE_BAND`
/// pixels away from the edge still triggers the zone.
pub const SNAP_SIDE_BAND: u32 = 20;

/// Height (px) of the top-edge band that triggers the maximize zone.
pub const SNAP_TOP_BAND: u32 = 10;

/// Manhattan distance (px) the pointer must travel before a drag moves a
/// maximized or snapped window out of its zone, and before snap preview
/// starts. Keeps a click on the title bar from being read as a drag.
pub const DRAG_THRESHOLD: u32 = 4;

/// Offset (px) applied per already-open window of the same app so newly
/// created windows cascade instead of stacking exactly on top of each other.
pub const CASCADE_OFFSET: u32 = 24;

/// Minimum number of pixels a window must keep within the usable area after
/// a move so the user can grab its title bar again.
pub const MIN_VISIBLE_MARGIN: u32 = 48;

/// Default ceiling on simultaneously open windows.
pub const DEFAULT_MAX_WINDOWS: usize = 12;

