//! # Command Registry
//!
//! Maps command names to handler descriptors with declared preconditions
//! and optional lazily loaded package backings. Exhaustiveness lives in
//! the descriptor data rather than a string-keyed switch, so the
//! dispatcher has one code path for every command.

use crate::shell::controller::Shell;
use crate::shell::session::Session;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by command handlers and package loaders
pub type CommandFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Handler body invoked with the completed line
pub type CommandHandlerFn = Arc<dyn Fn(CommandRequest) -> CommandFuture + Send + Sync>;

/// Loader for a lazily initialized command package
pub type PackageLoaderFn = Arc<dyn Fn(String) -> CommandFuture + Send + Sync>;

/// Declared requirement checked before a handler runs.
/// An unmet precondition skips the command silently; the prompt is still
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precondition {
    #[default]
    None,
    /// The session must have an active wallet connection
    WalletConnected,
}

impl Precondition {
    pub fn is_met(&self, session: &Session) -> bool {
        match self {
            Precondition::None => true,
            Precondition::WalletConnected => session.wallet_connected,
        }
    }
}

/// Everything a handler gets about one invocation
pub struct CommandRequest {
    /// Handle back into the shell for output and state
    pub shell: Shell,
    /// The raw submitted line, trimmed
    pub line: String,
    /// Whitespace tokens after the command name
    pub args: Vec<String>,
}

/// A registered command
pub struct CommandDescriptor {
    name: String,
    about: String,
    package: Option<String>,
    precondition: Precondition,
    handler: CommandHandlerFn,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        about: impl Into<String>,
        handler: impl Fn(CommandRequest) -> CommandFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            package: None,
            precondition: Precondition::None,
            handler: Arc::new(handler),
        }
    }

    /// Back this command with a lazily loaded package
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn precondition(&self) -> Precondition {
        self.precondition
    }

    pub fn run(&self, request: CommandRequest) -> CommandFuture {
        (self.handler)(request)
    }
}

/// Name-keyed set of command descriptors
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in commands
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_commands() {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a command, replacing any previous one with the same name
    pub fn register(&mut self, descriptor: CommandDescriptor) {
        self.commands.retain(|cmd| cmd.name() != descriptor.name());
        self.commands.push(Arc::new(descriptor));
    }

    pub fn find(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.commands.iter().find(|cmd| cmd.name() == name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.iter().map(|c| c.name().to_string()).collect();
        names.sort();
        names
    }

    /// (name, about) pairs, sorted by name
    pub fn summaries(&self) -> Vec<(String, String)> {
        let mut summaries: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|c| (c.name().to_string(), c.about().to_string()))
            .collect();
        summaries.sort();
        summaries
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The command set every shell ships with
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    vec![
        help_command(),
        clear_command(),
        echo_command(),
        connect_command(),
    ]
}

fn help_command() -> CommandDescriptor {
    CommandDescriptor::new("help", "List available commands", |req| {
        Box::pin(async move {
            let summaries = req.shell.command_summaries().await;
            let width = summaries
                .iter()
                .map(|(name, _)| name.len())
                .max()
                .unwrap_or(0);
            for (name, about) in summaries {
                req.shell.println(&format!("  {name:<width$}  {about}")).await?;
            }
            Ok(())
        })
    })
}

fn clear_command() -> CommandDescriptor {
    CommandDescriptor::new("clear", "Clear the terminal", |req| {
        Box::pin(async move { req.shell.clear_screen().await })
    })
}

fn echo_command() -> CommandDescriptor {
    CommandDescriptor::new("echo", "Print the given arguments", |req| {
        Box::pin(async move { req.shell.println(&req.args.join(" ")).await })
    })
}

fn connect_command() -> CommandDescriptor {
    CommandDescriptor::new("connect", "Toggle the wallet connection", |req| {
        Box::pin(async move {
            let connected = req.shell.is_wallet_connected().await;
            req.shell.set_wallet_connected(!connected).await;
            if connected {
                req.shell.println("Disconnected.").await
            } else {
                req.shell.println("Connected.").await
            }
        })
    })
}
