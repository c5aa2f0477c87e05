//! JSON layout snapshot.
//!
//! Captures which apps are open and where, in back-to-front order, so a
//! session can be replayed on the next start. Content and unsaved state are
//! not captured.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apps::AppId;
use crate::error::WmError;
use crate::layout::{Point, Rect, Size};
use crate::window::{Window, WindowId, WindowState};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot io: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub app_id: AppId,
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub state: WindowState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized_from: Option<WindowState>,
}

impl WindowSnapshot {
    pub fn of(window: &Window) -> Self {
        Self {
            id: window.id(),
            app_id: window.app_id().clone(),
            title: window.title().to_string(),
            position: window.position(),
            size: window.size(),
            state: window.state(),
            restore_bounds: window.restore_bounds(),
            minimized_from: window.minimized_from(),
        }
    }

    /// Rectangle the window occupies when in the normal state.
    pub fn normal_bounds(&self) -> Rect {
        self.restore_bounds
            .unwrap_or_else(|| Rect::from_parts(self.position, self.size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub version: u32,
    pub viewport: Size,
    /// Back to front.
    pub windows: Vec<WindowSnapshot>,
}

impl LayoutSnapshot {
    pub fn new(viewport: Size, windows: Vec<WindowSnapshot>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            viewport,
            windows,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Result of replaying a snapshot. A failed entry does not stop the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// `(snapshot id, new id)` in replay order.
    pub restored: Vec<(WindowId, WindowId)>,
    pub failed: Vec<(WindowId, WmError)>,
}

impl RestoreReport {
    pub fn new_id(&self, old: WindowId) -> Option<WindowId> {
        self.restored
            .iter()
            .find(|(from, _)| *from == old)
            .map(|(_, to)| *to)
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutSnapshot {
        LayoutSnapshot::new(
            Size::new(1920, 1080),
            vec![
                WindowSnapshot {
                    id: WindowId::from_raw(2),
                    app_id: AppId::from("notepad"),
                    title: "Notepad".into(),
                    position: Point::new(0, 0),
                    size: Size::new(960, 1032),
                    state: WindowState::SnappedLeft,
                    restore_bounds: Some(Rect::new(100, 100, 640, 480)),
                    minimized_from: None,
                },
                WindowSnapshot {
                    id: WindowId::from_raw(5),
                    app_id: AppId::from("terminal"),
                    title: "Terminal".into(),
                    position: Point::new(40, 60),
                    size: Size::new(720, 440),
                    state: WindowState::Normal,
                    restore_bounds: None,
                    minimized_from: None,
                },
            ],
        )
    }

    #[test]
    fn json_uses_kebab_case_states_and_skips_empty_fields() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"snapped-left\""));
        assert!(json.contains("\"app_id\": \"notepad\""));
        assert!(!json.contains("minimized_from"));
        assert_eq!(LayoutSnapshot::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut snapshot = sample();
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            LayoutSnapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            LayoutSnapshot::from_json("{\"version\": 1"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn normal_bounds_prefers_restore_bounds() {
        let snapshot = sample();
        assert_eq!(
            snapshot.windows[0].normal_bounds(),
            Rect::new(100, 100, 640, 480)
        );
        assert_eq!(
            snapshot.windows[1].normal_bounds(),
            Rect::new(40, 60, 720, 440)
        );
    }
}
