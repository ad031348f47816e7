use std::sync::atomic::{AtomicBool, Ordering};

use console::Term;

/// Prints a dot to stderr on every tick so quiet runs still show signs of life.
pub struct HeartbeatReporter {
    term: Term,
    dirty: AtomicBool,
}

impl HeartbeatReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn tick(&self) {
        if self.term.write_str(".").is_ok() {
            self.dirty.store(true, Ordering::Relaxed);
        }
    }

    /// End the line of dots, if any were printed.
    pub fn finish(&self) {
        if self.dirty.swap(false, Ordering::Relaxed) {
            let _ = self.term.write_line("");
        }
    }
}

impl Default for HeartbeatReporter {
    fn default() -> Self {
        Self::new()
    }
}
