//! # Shell Engine
//!
//! The interactive line-editing shell: decoder, line buffer, history,
//! autocomplete, prompt controller, and command dispatcher. All
//! components are designed around explicit state and injected I/O for
//! testability.

pub mod autocomplete;
pub mod commands;
pub mod controller;
pub mod dispatcher;
pub mod escape;
pub mod events;
pub mod history;
pub mod input_line;
pub mod io;
pub mod session;

// Re-export core types
pub use autocomplete::{AutocompleteEngine, Completion, CompletionProvider};
pub use commands::{
    builtin_commands, CommandDescriptor, CommandFuture, CommandHandlerFn, CommandRegistry,
    CommandRequest, PackageLoaderFn, Precondition,
};
pub use controller::{ContinuationPredicate, Shell, ShellBuilder};
pub use escape::{classify, has_unbalanced_brackets, KeyAction, TermInput};
pub use events::{ShellEvent, ShellEventBus, ShellEventHandler};
pub use history::HistoryRing;
pub use input_line::InputLine;
pub use io::{CrosstermTerminal, MockTerminal, RenderOp, TerminalIo};
pub use session::Session;
