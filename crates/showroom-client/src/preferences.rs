//! # Preference Store
//!
//! UI selection state shared by every widget, currently the selected branch.
//!
//! One `watch` channel holds the value: the setter is the single writer and
//! every reader, however many are rendering, sees the same branch.
//!
//! ```text
//!   set_selected_branch(Some(3))
//!            │
//!            ▼
//!   ┌──────────────────┐    borrow()     ┌──────────────┐
//!   │ watch::Sender    │ ──────────────► │ dashboard    │
//!   │ Option<i64>      │ ──────────────► │ stock list   │
//!   └──────────────────┘    changed()    │ sale form    │
//!                                        └──────────────┘
//! ```

use tokio::sync::watch;
use tracing::debug;

/// Snapshot of all preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub selected_branch_id: Option<i64>,
}

/// Handle to the shared preferences. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    tx: watch::Sender<Preferences>,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Preferences::default());
        PreferenceStore { tx }
    }

    pub fn selected_branch(&self) -> Option<i64> {
        self.tx.borrow().selected_branch_id
    }

    pub fn snapshot(&self) -> Preferences {
        *self.tx.borrow()
    }

    /// Selects a branch (or `None` for all branches).
    ///
    /// Subscribers are only woken when the value actually changes.
    pub fn set_selected_branch(&self, branch_id: Option<i64>) {
        let changed = self.tx.send_if_modified(|prefs| {
            if prefs.selected_branch_id == branch_id {
                return false;
            }
            prefs.selected_branch_id = branch_id;
            true
        });
        if changed {
            debug!(branch_id = ?branch_id, "Selected branch changed");
        }
    }

    /// Receiver that observes every later change.
    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_all_branches() {
        let prefs = PreferenceStore::new();
        assert_eq!(prefs.selected_branch(), None);
    }

    #[test]
    fn test_clones_share_the_selection() {
        let prefs = PreferenceStore::new();
        let widget = prefs.clone();
        prefs.set_selected_branch(Some(4));
        assert_eq!(widget.selected_branch(), Some(4));
        widget.set_selected_branch(None);
        assert_eq!(prefs.selected_branch(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_once() {
        let prefs = PreferenceStore::new();
        let mut rx = prefs.subscribe();

        prefs.set_selected_branch(Some(2));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().selected_branch_id, Some(2));

        // Same value: no wake-up.
        prefs.set_selected_branch(Some(2));
        assert!(!rx.has_changed().unwrap());
    }
}
