//! Cooperative interruption of a running scan.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag polled by the scanner between candidate periods.
///
/// Clones share the same flag, so a handle can be moved to another thread
/// (a UI "Stop" action, a timeout watchdog) and raised from there.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the scan stop before its next candidate period.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_interrupt_visible_across_threads() {
        let handle = InterruptHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_interrupted());

        thread::spawn(move || remote.interrupt()).join().unwrap();

        assert!(handle.is_interrupted());
        handle.clear();
        assert!(!handle.is_interrupted());
    }
}
