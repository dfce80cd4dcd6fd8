//! # Tideline - Embeddable Interactive Shell Engine
//!
//! A line-editing shell core for command consoles: cursor motion, history
//! navigation, escape-sequence decoding, autocomplete, paste expansion,
//! and command dispatch with lazily initialized command packages.
//!
//! ## Architecture
//!
//! ```text
//! raw input chunks
//!       │
//!       ▼
//! ┌──────────────┐  actions   ┌─────────────────────┐
//! │   Escape     │───────────▶│  Prompt Controller   │
//! │   Decoder    │            │  (line buffer,       │
//! └──────────────┘            │   history, reads)    │
//!                             └──────────┬──────────┘
//!                  submit line           │          ▲ re-prompt
//!                                        ▼          │
//!                             ┌─────────────────────┐
//!                             │ Command Dispatcher  │──▶ handlers /
//!                             │ (registry, lazy     │    packages
//!                             │  package loading)   │
//!                             └─────────────────────┘
//! ```
//!
//! Output flows through the [`shell::io::TerminalIo`] trait, so the same
//! core drives a crossterm terminal in production and a mock in tests.

pub mod cmd_args;
pub mod config;
pub mod shell;

// Re-export main types for easy access
pub use shell::*;
