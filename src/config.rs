//! Configuration constants and utilities for tideline
//!
//! This module contains tideline-specific configuration constants and
//! utilities shared by the shell engine and the terminal binary.

/// Default prompt prefix printed before each line read
pub const DEFAULT_PROMPT: &str = "$ ";

/// Default number of history entries retained by the ring
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Default maximum number of autocomplete candidates listed without asking
pub const DEFAULT_AUTOCOMPLETE_MAX: usize = 100;

/// Delay in milliseconds before a deferred `enable()` step runs
pub const ENABLE_DELAY_MS: u64 = 10;

/// Minimum chunk length (in characters) for the paste heuristic.
/// Shorter chunks are always treated as a single logical key.
pub const PASTE_MIN_CHUNK_LEN: usize = 4;

/// Environment variable name for overriding the history capacity
pub const HISTORY_CAPACITY_ENV_VAR: &str = "TIDELINE_HISTORY_CAPACITY";

/// Get the history capacity, checking environment variable first, then falling back to default
pub fn get_history_capacity() -> usize {
    std::env::var(HISTORY_CAPACITY_ENV_VAR)
        .ok()
        .and_then(|val| val.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_HISTORY_CAPACITY)
}
