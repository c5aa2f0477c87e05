//! Per-application capability profiles.
//!
//! The window manager never branches on a concrete application. Everything
//! it needs to know about an app (sizes and window policy) is looked up from
//! an [`AppCatalog`] when a window is created.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{WmError, WmResult};
use crate::layout::Size;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for AppId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Window policy copied into every window of an app at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub resizable: bool,
    pub maximizable: bool,
    pub multi_instance: bool,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            resizable: true,
            maximizable: true,
            multi_instance: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppProfile {
    pub display_name: String,
    pub icon: String,
    pub default_size: Size,
    pub min_size: Size,
    pub policy: WindowPolicy,
    /// Content arrives asynchronously; windows open in the loading state.
    pub lazy_content: bool,
}

impl AppProfile {
    pub fn new(display_name: impl Into<String>, default_size: Size, min_size: Size) -> Self {
        Self {
            display_name: display_name.into(),
            icon: String::new(),
            default_size: default_size.at_least(min_size),
            min_size,
            policy: WindowPolicy::default(),
            lazy_content: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_policy(mut self, policy: WindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn single_instance(mut self) -> Self {
        self.policy.multi_instance = false;
        self
    }

    pub fn fixed_size(mut self) -> Self {
        self.policy.resizable = false;
        self.policy.maximizable = false;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy_content = true;
        self
    }
}

/// Static `AppId -> AppProfile` table consulted at window creation.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    apps: BTreeMap<AppId, AppProfile>,
}

pub const EXPLORER: &str = "explorer";
pub const NOTEPAD: &str = "notepad";
pub const SETTINGS: &str = "settings";
pub const RESUME: &str = "resume";
pub const TERMINAL: &str = "terminal";

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The applications shipped with the desktop shell, sized in pixels.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            EXPLORER,
            AppProfile::new("File Explorer", Size::new(800, 560), Size::new(400, 300))
                .with_icon("folder")
                .lazy(),
        );
        catalog.insert(
            NOTEPAD,
            AppProfile::new("Notepad", Size::new(640, 480), Size::new(320, 240))
                .with_icon("notepad"),
        );
        catalog.insert(
            SETTINGS,
            AppProfile::new("Settings", Size::new(720, 520), Size::new(720, 520))
                .with_icon("gear")
                .single_instance()
                .fixed_size(),
        );
        catalog.insert(
            RESUME,
            AppProfile::new("Resume", Size::new(820, 680), Size::new(480, 400))
                .with_icon("document")
                .single_instance()
                .lazy(),
        );
        catalog.insert(
            TERMINAL,
            AppProfile::new("Terminal", Size::new(720, 440), Size::new(360, 200))
                .with_icon("terminal"),
        );
        catalog
    }

    pub fn insert(&mut self, id: impl Into<AppId>, profile: AppProfile) {
        self.apps.insert(id.into(), profile);
    }

    pub fn get(&self, id: &AppId) -> WmResult<&AppProfile> {
        self.apps
            .get(id)
            .ok_or_else(|| WmError::UnknownApp(id.clone()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.apps.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppId, &AppProfile)> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_every_shell_app() {
        let catalog = AppCatalog::builtin();
        for id in [EXPLORER, NOTEPAD, SETTINGS, RESUME, TERMINAL] {
            assert!(catalog.contains(id), "missing {id}");
        }
        let settings = catalog.get(&AppId::from(SETTINGS)).unwrap();
        assert!(!settings.policy.resizable);
        assert!(!settings.policy.maximizable);
        assert!(!settings.policy.multi_instance);
    }

    #[test]
    fn unknown_app_is_an_error() {
        let catalog = AppCatalog::builtin();
        let err = catalog.get(&AppId::from("minesweeper")).unwrap_err();
        assert_eq!(err, WmError::UnknownApp(AppId::from("minesweeper")));
    }

    #[test]
    fn default_size_never_below_min() {
        let profile = AppProfile::new("tiny", Size::new(10, 10), Size::new(100, 80));
        assert_eq!(profile.default_size, Size::new(100, 80));
    }
}
