use std::fmt;

use thiserror::Error;

use crate::apps::AppId;
use crate::window::WindowId;

pub type WmResult<T> = Result<T, WmError>;

/// State change that a window's policy or current state refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Maximize,
    Resize,
    Snap,
    Drag,
    Close,
    RestoreFromClosing,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transition::Maximize => "be maximized",
            Transition::Resize => "be resized",
            Transition::Snap => "be snapped",
            Transition::Drag => "be dragged",
            Transition::Close => "enter the closing state outside a close request",
            Transition::RestoreFromClosing => "leave the closing state",
        };
        f.write_str(s)
    }
}

/// Every failure is local to one operation; a returned error means nothing
/// was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window {0} not found")]
    NotFound(WindowId),
    #[error("application `{app_id}` allows a single window and {existing} is already open")]
    InstanceLimit { app_id: AppId, existing: WindowId },
    #[error("window limit of {limit} reached")]
    ConcurrencyLimit { limit: usize },
    #[error("unknown application `{0}`")]
    UnknownApp(AppId),
    #[error("window {id} cannot {transition}")]
    InvalidStateTransition { id: WindowId, transition: Transition },
}

impl WmError {
    pub(crate) fn invalid(id: WindowId, transition: Transition) -> Self {
        Self::InvalidStateTransition { id, transition }
    }
}
