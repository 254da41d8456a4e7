//! Single-fire action shared by several triggers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Action = Box<dyn FnOnce() + Send>;

/// Runs its action the first time any trigger fires; later calls are no-ops
pub struct OnceAction {
    fired: AtomicBool,
    action: Mutex<Option<Action>>,
}

impl OnceAction {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            fired: AtomicBool::new(false),
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// Run the action if it has not run yet; returns whether this call ran it
    pub fn run(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let action = self.action.lock().ok().and_then(|mut a| a.take());
        if let Some(action) = action {
            action();
        }
        true
    }

    pub fn has_run(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for OnceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceAction")
            .field("fired", &self.has_run())
            .finish_non_exhaustive()
    }
}
