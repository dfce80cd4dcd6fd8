//! # Shell Session State
//!
//! The single live shell instance's state. One `Session` is created per
//! shell at startup and owned by it for the whole page/process lifetime,
//! so several shells can coexist (each with its own session) in tests.

use std::collections::HashMap;

/// Mutable state of one shell instance
#[derive(Debug, Default)]
pub struct Session {
    /// Whether the shell is currently accepting line input
    pub active: bool,
    /// Whether the next submitted line is owed to an external listener
    pub waiting_for_external_input: bool,
    /// Nesting counter for deferred re-enable; prompting resumes only at zero
    process_count: usize,
    /// Packages whose initialization banner has already been printed
    loaded_packages: HashMap<String, bool>,
    /// Backing state for the wallet-connected command precondition
    pub wallet_connected: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more in-flight operation that suspended prompting
    pub fn begin_process(&mut self) {
        self.process_count += 1;
    }

    /// Retire one in-flight operation; returns true once none remain.
    ///
    /// Saturates at zero so an unpaired `enable()` (the dispatcher's no-op
    /// branches never disabled) still reports readiness.
    pub fn end_process(&mut self) -> bool {
        self.process_count = self.process_count.saturating_sub(1);
        self.process_count == 0
    }

    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Mark a package's first use. Returns true exactly once per package,
    /// so initialization logging happens at most once.
    pub fn mark_package_loaded(&mut self, package: &str) -> bool {
        !self
            .loaded_packages
            .insert(package.to_string(), true)
            .unwrap_or(false)
    }

    pub fn is_package_loaded(&self, package: &str) -> bool {
        self.loaded_packages.get(package).copied().unwrap_or(false)
    }
}
