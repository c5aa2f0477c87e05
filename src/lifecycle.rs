//! Per-window resource cleanup and the concurrency ceiling.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{WmError, WmResult};
use crate::window::{Window, WindowId};

pub type Cleanup = Box<dyn FnOnce(WindowId)>;

/// What happens when a new window would push the live count past the
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    Reject,
    /// Close the least-recently-focused window that is neither pinned nor
    /// holding unsaved changes.
    EvictLeastRecentlyFocused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Evict(WindowId),
}

/// Answer from the close-confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// Tells the window manager whether closing a window would lose work.
pub trait UnsavedChanges {
    fn has_unsaved_changes(&self, window: &Window) -> bool;
}

/// Reads the `unsaved_changes` flag hosts set through
/// `WindowManager::set_unsaved_changes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowFlag;

impl UnsavedChanges for WindowFlag {
    fn has_unsaved_changes(&self, window: &Window) -> bool {
        window.has_unsaved_changes()
    }
}

impl<F> UnsavedChanges for F
where
    F: Fn(&Window) -> bool,
{
    fn has_unsaved_changes(&self, window: &Window) -> bool {
        self(window)
    }
}

pub struct LifecycleManager {
    limit: usize,
    policy: ConcurrencyPolicy,
    cleanups: BTreeMap<WindowId, Vec<Cleanup>>,
    // logical clock; higher is more recent
    focus_clock: u64,
    last_focus: BTreeMap<WindowId, u64>,
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("limit", &self.limit)
            .field("policy", &self.policy)
            .field("tracked", &self.cleanups.len())
            .field("last_focus", &self.last_focus)
            .finish()
    }
}

impl LifecycleManager {
    pub fn new(limit: usize, policy: ConcurrencyPolicy) -> Self {
        Self {
            limit: limit.max(1),
            policy,
            cleanups: BTreeMap::new(),
            focus_clock: 0,
            last_focus: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Attach a cleanup to `id`. Cleanups run in registration order when the
    /// window closes.
    pub fn register<F>(&mut self, id: WindowId, cleanup: F)
    where
        F: FnOnce(WindowId) + 'static,
    {
        self.cleanups.entry(id).or_default().push(Box::new(cleanup));
    }

    pub fn cleanup_count(&self, id: WindowId) -> usize {
        self.cleanups.get(&id).map_or(0, Vec::len)
    }

    /// Record that `id` just received focus.
    pub fn note_focus(&mut self, id: WindowId) {
        self.focus_clock = self.focus_clock.saturating_add(1);
        self.last_focus.insert(id, self.focus_clock);
    }

    pub fn last_focused_at(&self, id: WindowId) -> Option<u64> {
        self.last_focus.get(&id).copied()
    }

    /// Decide whether a new window may be created while `live` windows
    /// exist. `candidates` are the windows eviction may pick from.
    pub fn admit<I>(&self, live: usize, candidates: I) -> WmResult<Admission>
    where
        I: IntoIterator<Item = WindowId>,
    {
        if live < self.limit {
            return Ok(Admission::Admit);
        }
        let limit = self.limit;
        match self.policy {
            ConcurrencyPolicy::Reject => Err(WmError::ConcurrencyLimit { limit }),
            ConcurrencyPolicy::EvictLeastRecentlyFocused => candidates
                .into_iter()
                .min_by_key(|id| (self.last_focused_at(*id).unwrap_or(0), *id))
                .map(Admission::Evict)
                .ok_or(WmError::ConcurrencyLimit { limit }),
        }
    }

    /// Run and drop every cleanup of `id`. Calling it again is a no-op.
    /// Returns how many cleanups ran.
    pub fn on_close(&mut self, id: WindowId) -> usize {
        self.last_focus.remove(&id);
        let Some(cleanups) = self.cleanups.remove(&id) else {
            return 0;
        };
        let count = cleanups.len();
        for cleanup in cleanups {
            cleanup(id);
        }
        if count > 0 {
            tracing::debug!(window_id = %id, count, "ran window cleanups");
        }
        count
    }

    /// Run cleanups for every tracked window.
    pub fn shutdown(&mut self) -> usize {
        let ids: Vec<WindowId> = self
            .cleanups
            .keys()
            .chain(self.last_focus.keys())
            .copied()
            .collect();
        ids.into_iter().map(|id| self.on_close(id)).sum()
    }

    pub fn is_tracking(&self, id: WindowId) -> bool {
        self.cleanups.contains_key(&id) || self.last_focus.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn id(raw: u64) -> WindowId {
        WindowId::from_raw(raw)
    }

    #[test]
    fn cleanups_run_once_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut lifecycle = LifecycleManager::new(4, ConcurrencyPolicy::Reject);
        for tag in ["timer", "listener", "worker"] {
            let log = Rc::clone(&log);
            lifecycle.register(id(1), move |_| log.borrow_mut().push(tag));
        }
        assert_eq!(lifecycle.on_close(id(1)), 3);
        assert_eq!(lifecycle.on_close(id(1)), 0);
        assert_eq!(*log.borrow(), vec!["timer", "listener", "worker"]);
    }

    #[test]
    fn shutdown_runs_everything() {
        let count = Rc::new(RefCell::new(0));
        let mut lifecycle = LifecycleManager::new(4, ConcurrencyPolicy::Reject);
        for raw in 1..=3 {
            let count = Rc::clone(&count);
            lifecycle.register(id(raw), move |_| *count.borrow_mut() += 1);
        }
        lifecycle.note_focus(id(4));
        assert_eq!(lifecycle.shutdown(), 3);
        assert_eq!(*count.borrow(), 3);
        for raw in 1..=4 {
            assert!(!lifecycle.is_tracking(id(raw)));
        }
    }

    #[test]
    fn admit_below_limit() {
        let lifecycle = LifecycleManager::new(2, ConcurrencyPolicy::Reject);
        assert_eq!(lifecycle.admit(1, []), Ok(Admission::Admit));
    }

    #[test]
    fn reject_policy_fails_at_limit() {
        let lifecycle = LifecycleManager::new(2, ConcurrencyPolicy::Reject);
        assert_eq!(
            lifecycle.admit(2, [id(1), id(2)]),
            Err(WmError::ConcurrencyLimit { limit: 2 })
        );
    }

    #[test]
    fn eviction_picks_least_recently_focused() {
        let mut lifecycle = LifecycleManager::new(3, ConcurrencyPolicy::EvictLeastRecentlyFocused);
        lifecycle.note_focus(id(1));
        lifecycle.note_focus(id(2));
        lifecycle.note_focus(id(3));
        lifecycle.note_focus(id(1));
        assert_eq!(
            lifecycle.admit(3, [id(1), id(2), id(3)]),
            Ok(Admission::Evict(id(2)))
        );
        // without candidates the limit still holds
        assert_eq!(
            lifecycle.admit(3, []),
            Err(WmError::ConcurrencyLimit { limit: 3 })
        );
    }

    #[test]
    fn closure_collaborator_overrides_flag() {
        use crate::apps::NOTEPAD;
        use crate::layout::Size;
        use crate::window::{WindowManager, WmConfig};

        let mut wm = WindowManager::new(WmConfig::new(
            Size::new(1920, 1080),
            ConcurrencyPolicy::Reject,
        ));
        let id = wm.create_window(NOTEPAD).unwrap();
        let always = |_: &Window| true;
        let clean = wm.window(id).unwrap();
        assert!(always.has_unsaved_changes(clean));
        assert!(!WindowFlag.has_unsaved_changes(clean));

        wm.set_unsaved_changes(id, true).unwrap();
        let dirty = wm.window(id).unwrap();
        assert!(WindowFlag.has_unsaved_changes(dirty));
        let never = |_: &Window| false;
        assert!(!never.has_unsaved_changes(dirty));
    }
}
