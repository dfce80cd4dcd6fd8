//! # Prompt/Read Controller
//!
//! Owns the whole shell state and manages the asynchronous read-a-line /
//! read-a-char lifecycle. [`Shell`] is a cloneable handle over the core;
//! command handlers receive a clone so they can print, toggle state, or
//! wait for further input while the engine keeps processing keystrokes.
//!
//! State transitions: Idle → Prompting (line read outstanding, edits
//! accepted) → Submitted (resolver fires) → back to Prompting after
//! dispatch, or → WaitingForExternalInput when an external listener has
//! claimed the next line.

use crate::config::{
    DEFAULT_AUTOCOMPLETE_MAX, DEFAULT_HISTORY_CAPACITY, DEFAULT_PROMPT, ENABLE_DELAY_MS,
};
use crate::shell::autocomplete::{AutocompleteEngine, Completion, CompletionProvider};
use crate::shell::commands::{CommandDescriptor, CommandRegistry, PackageLoaderFn};
use crate::shell::dispatcher::{self, Packages};
use crate::shell::escape::{self, KeyAction, TermInput};
use crate::shell::events::{ShellEvent, ShellEventBus, ShellEventHandler};
use crate::shell::history::HistoryRing;
use crate::shell::input_line::InputLine;
use crate::shell::io::TerminalIo;
use crate::shell::session::Session;
use anyhow::{anyhow, bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};

/// Predicate deciding whether ENTER should insert a literal newline
/// instead of submitting (e.g. unbalanced brackets)
pub type ContinuationPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// An outstanding request for one line of input
struct PendingRead {
    /// Fired exactly once with the submitted line
    resolver: oneshot::Sender<String>,
    /// Prompt prefix this read was issued with
    prefix: String,
}

/// Deferred work to run after the core lock is released
pub(crate) enum Effect {
    /// Hand the submitted line to the command dispatcher
    Dispatch(String),
    /// Re-enter the prompt once in-flight operations retire
    Enable,
    /// Await the y/n answer for an over-limit candidate listing
    Confirm {
        candidates: Vec<String>,
        answer: oneshot::Receiver<String>,
    },
}

/// All state of one shell instance
pub(crate) struct ShellCore {
    pub(crate) session: Session,
    pub(crate) history: HistoryRing,
    pub(crate) registry: CommandRegistry,
    pub(crate) packages: Packages,
    pub(crate) terminal: Box<dyn TerminalIo>,
    pub(crate) events: ShellEventBus,
    line: InputLine,
    autocomplete: AutocompleteEngine,
    prompt: String,
    continuation: Option<ContinuationPredicate>,
    pending_line: Option<PendingRead>,
    pending_char: Option<oneshot::Sender<String>>,
    external_wait: Option<oneshot::Sender<String>>,
}

impl ShellCore {
    /// Classify one raw input chunk and apply it.
    ///
    /// An inactive shell drops everything except CTRL+C; a pending
    /// char-read consumes the chunk before any line editing.
    fn ingest(&mut self, data: &str) -> Result<Vec<Effect>> {
        if !self.session.active && data != "\x03" {
            tracing::debug!("dropping input while inactive");
            return Ok(Vec::new());
        }
        if let Some(resolver) = self.pending_char.take() {
            let _ = resolver.send(data.to_string());
            return Ok(Vec::new());
        }
        match escape::classify(data) {
            TermInput::Pasted(text) => {
                // Expand the whole block before any later chunk is seen
                let mut effects = Vec::new();
                for ch in text.chars() {
                    let unit = ch.to_string();
                    if let TermInput::Key(action) = escape::classify(&unit) {
                        effects.extend(self.apply_key(action)?);
                    }
                }
                Ok(effects)
            }
            TermInput::Key(action) => self.apply_key(action),
        }
    }

    fn apply_key(&mut self, action: KeyAction) -> Result<Vec<Effect>> {
        match action {
            KeyAction::Insert(text) => {
                self.line.insert_str(&text);
                self.sync_terminal()?;
            }
            KeyAction::Backspace => {
                if self.line.erase_backward() {
                    self.sync_terminal()?;
                }
            }
            KeyAction::Delete => {
                if self.line.erase_forward() {
                    self.sync_terminal()?;
                }
            }
            KeyAction::CursorLeft => {
                if self.line.move_left() {
                    self.sync_terminal()?;
                }
            }
            KeyAction::CursorRight => {
                if self.line.move_right() {
                    self.sync_terminal()?;
                }
            }
            KeyAction::Home => {
                self.line.move_home();
                self.sync_terminal()?;
            }
            KeyAction::End => {
                self.line.move_end();
                self.sync_terminal()?;
            }
            KeyAction::WordLeft => {
                self.line.move_word_left();
                self.sync_terminal()?;
            }
            KeyAction::WordRight => {
                self.line.move_word_right();
                self.sync_terminal()?;
            }
            KeyAction::WordErase => {
                self.line.erase_word();
                self.sync_terminal()?;
            }
            KeyAction::KillToEnd => {
                self.line.kill_to_end();
                self.sync_terminal()?;
            }
            KeyAction::KillToStart => {
                self.line.kill_to_start();
                self.sync_terminal()?;
            }
            KeyAction::HistoryPrevious => {
                if let Some(entry) = self.history.previous() {
                    let entry = entry.to_string();
                    self.line.set(&entry);
                    self.sync_terminal()?;
                }
            }
            KeyAction::HistoryNext => {
                let entry = self.history.next().map(str::to_string).unwrap_or_default();
                self.line.set(&entry);
                self.sync_terminal()?;
            }
            KeyAction::Tab => return self.tab_complete(),
            KeyAction::Enter => return self.press_enter(),
            KeyAction::Interrupt => {
                // Let through even while inactive; no cancellation action
                // is bound in the core.
                tracing::debug!("ctrl-c received; no action bound");
            }
            KeyAction::Unknown => {}
        }
        Ok(Vec::new())
    }

    fn press_enter(&mut self) -> Result<Vec<Effect>> {
        if let Some(is_incomplete) = &self.continuation {
            if is_incomplete(self.line.text()) {
                self.line.insert('\n');
                self.sync_terminal()?;
                return Ok(Vec::new());
            }
        }
        self.handle_read_complete()
    }

    /// Commit the visible line and resolve the outstanding read exactly
    /// once. Routing happens in the read task holding the other end.
    fn handle_read_complete(&mut self) -> Result<Vec<Effect>> {
        let line = self.line.text().to_string();
        self.terminal.println("")?;
        self.line.clear();
        self.session.active = false;
        if let Some(pending) = self.pending_line.take() {
            let _ = pending.resolver.send(line);
        }
        Ok(Vec::new())
    }

    /// Push the resolved line into history and pick its consumer:
    /// the external-wait listener when one is registered, otherwise the
    /// command dispatcher.
    fn route_submitted(&mut self, line: &str) -> Vec<Effect> {
        if line.trim() != dispatcher::REPEAT_LAST {
            self.history.push(line);
        }
        if self.session.waiting_for_external_input {
            self.session.waiting_for_external_input = false;
            if let Some(listener) = self.external_wait.take() {
                let _ = listener.send(line.trim().to_string());
            }
            vec![Effect::Enable]
        } else {
            vec![Effect::Dispatch(line.to_string())]
        }
    }

    fn tab_complete(&mut self) -> Result<Vec<Effect>> {
        let fragment = self.line.fragment_before_cursor().to_string();
        let history: Vec<String> = self.history.entries().map(str::to_string).collect();
        match self.autocomplete.complete_with_history(&fragment, &history) {
            Completion::None => {}
            Completion::InsertSpace => {
                self.line.insert(' ');
                self.sync_terminal()?;
            }
            Completion::Replace(candidate) => {
                self.line.set(&candidate);
                self.sync_terminal()?;
            }
            Completion::List(candidates) => {
                self.terminal.println("")?;
                self.terminal.println(&candidates.join("  "))?;
                self.restore_prompt_line()?;
            }
            Completion::ConfirmList(candidates) => {
                let (resolver, answer) = oneshot::channel();
                self.terminal.println("")?;
                self.terminal
                    .print(&format!("Display all {} possibilities? (y/n) ", candidates.len()))?;
                self.pending_char = Some(resolver);
                return Ok(vec![Effect::Confirm { candidates, answer }]);
            }
        }
        Ok(Vec::new())
    }

    /// Reprint the prompt with the current input and cursor intact
    fn restore_prompt_line(&mut self) -> Result<()> {
        let prefix = self
            .pending_line
            .as_ref()
            .map(|pending| pending.prefix.clone())
            .unwrap_or_else(|| self.prompt.clone());
        self.terminal.print(&prefix)?;
        self.terminal.set_input(self.line.text())?;
        self.terminal.set_cursor(self.line.cursor())?;
        Ok(())
    }

    /// Issue a line read unless one is outstanding and the visible line
    /// still starts with its prompt prefix. A failure is printed and the
    /// prompt retried once.
    pub(crate) fn issue_prompt(&mut self) -> Option<oneshot::Receiver<String>> {
        if let Some(pending) = &self.pending_line {
            if let Some(current) = self.terminal.current_line() {
                if current.starts_with(&pending.prefix) {
                    self.session.active = true;
                    return None;
                }
            }
        }
        match self.try_issue_prompt() {
            Ok(receiver) => Some(receiver),
            Err(err) => {
                let _ = self.terminal.println(&format!("{err:#}"));
                match self.try_issue_prompt() {
                    Ok(receiver) => Some(receiver),
                    Err(err) => {
                        tracing::warn!("prompt failed after retry: {err:#}");
                        None
                    }
                }
            }
        }
    }

    fn try_issue_prompt(&mut self) -> Result<oneshot::Receiver<String>> {
        self.terminal.print(&self.prompt)?;
        self.terminal.set_input("")?;
        self.terminal.set_cursor(0)?;
        self.line.clear();
        let (resolver, receiver) = oneshot::channel();
        self.pending_line = Some(PendingRead {
            resolver,
            prefix: self.prompt.clone(),
        });
        self.session.active = true;
        Ok(receiver)
    }

    fn sync_terminal(&mut self) -> Result<()> {
        self.terminal.set_input(self.line.text())?;
        self.terminal.set_cursor(self.line.cursor())?;
        Ok(())
    }
}

/// Cloneable handle to one shell instance
#[derive(Clone)]
pub struct Shell {
    pub(crate) core: Arc<Mutex<ShellCore>>,
}

impl Shell {
    pub fn builder(terminal: Box<dyn TerminalIo>) -> ShellBuilder {
        ShellBuilder::new(terminal)
    }

    /// Print the first prompt and start accepting input
    pub async fn start(&self) {
        self.prompt().await;
    }

    /// Single ingestion entry point for raw terminal input chunks
    pub async fn handle_data(&self, data: &str) -> Result<()> {
        let effects = { self.core.lock().await.ingest(data)? };
        self.run_effects(effects).await;
        Ok(())
    }

    /// Idempotently make sure a line read is outstanding
    pub async fn prompt(&self) {
        let receiver = { self.core.lock().await.issue_prompt() };
        if let Some(receiver) = receiver {
            self.spawn_read_task(receiver);
        }
    }

    /// Suspend prompting for one in-flight operation
    pub async fn disable(&self) {
        let mut core = self.core.lock().await;
        core.session.begin_process();
        core.session.active = false;
    }

    /// Schedule the deferred re-enable step: after a short delay the
    /// nesting counter is decremented and, only at zero, the prompt is
    /// re-issued. Concurrent disable/enable pairs nest correctly.
    pub fn enable(&self) {
        let shell = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ENABLE_DELAY_MS)).await;
            let receiver = {
                let mut core = shell.core.lock().await;
                if core.session.end_process() {
                    core.issue_prompt()
                } else {
                    None
                }
            };
            if let Some(receiver) = receiver {
                shell.spawn_read_task(receiver);
            }
        });
    }

    /// Claim the next submitted line for an external listener.
    ///
    /// Only one such request may be outstanding: a second call fails
    /// immediately while the first stays untouched.
    pub async fn wait_for_user_input(&self, message: &str) -> Result<String> {
        let receiver = {
            let mut core = self.core.lock().await;
            if core.external_wait.is_some() {
                bail!("already waiting for user input");
            }
            core.terminal.println(message)?;
            let (listener, receiver) = oneshot::channel();
            core.external_wait = Some(listener);
            core.session.waiting_for_external_input = true;
            core.events.publish(&ShellEvent::ExternalInputRequested {
                message: message.to_string(),
            });
            receiver
        };
        self.enable();
        receiver
            .await
            .map_err(|_| anyhow!("shell dropped while waiting for input"))
    }

    /// Run a command line through the dispatcher without the read cycle
    pub async fn run_command(&self, line: &str) {
        dispatcher::dispatch(self.clone(), line.to_string()).await;
    }

    pub async fn println(&self, text: &str) -> Result<()> {
        self.core.lock().await.terminal.println(text)
    }

    pub async fn print(&self, text: &str) -> Result<()> {
        self.core.lock().await.terminal.print(text)
    }

    pub async fn clear_screen(&self) -> Result<()> {
        self.core.lock().await.terminal.clear_screen()
    }

    pub async fn command_summaries(&self) -> Vec<(String, String)> {
        self.core.lock().await.registry.summaries()
    }

    pub async fn command_names(&self) -> Vec<String> {
        self.core.lock().await.registry.names()
    }

    pub async fn is_wallet_connected(&self) -> bool {
        self.core.lock().await.session.wallet_connected
    }

    pub async fn set_wallet_connected(&self, connected: bool) {
        self.core.lock().await.session.wallet_connected = connected;
    }

    pub async fn is_active(&self) -> bool {
        self.core.lock().await.session.active
    }

    pub async fn history_entries(&self) -> Vec<String> {
        self.core
            .lock()
            .await
            .history
            .entries()
            .map(str::to_string)
            .collect()
    }

    fn spawn_read_task(&self, receiver: oneshot::Receiver<String>) {
        let shell = self.clone();
        tokio::spawn(async move {
            let Ok(line) = receiver.await else { return };
            let effects = { shell.core.lock().await.route_submitted(&line) };
            shell.run_effects(effects).await;
        });
    }

    pub(crate) async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(line) => {
                    tokio::spawn(dispatcher::dispatch(self.clone(), line));
                }
                Effect::Enable => self.enable(),
                Effect::Confirm { candidates, answer } => {
                    let shell = self.clone();
                    tokio::spawn(async move {
                        shell.finish_confirm(candidates, answer).await;
                    });
                }
            }
        }
    }

    /// Complete the over-limit listing once the y/n answer arrives.
    /// Anything but `y`/`Y` suppresses the listing; the prompt line is
    /// restored either way.
    async fn finish_confirm(&self, candidates: Vec<String>, answer: oneshot::Receiver<String>) {
        let confirmed = answer
            .await
            .map(|reply| reply == "y" || reply == "Y")
            .unwrap_or(false);
        let mut core = self.core.lock().await;
        let result = (|| {
            core.terminal.println("")?;
            if confirmed {
                let listing = candidates.join("  ");
                core.terminal.println(&listing)?;
            }
            core.restore_prompt_line()
        })();
        if let Err(err) = result {
            tracing::warn!("failed to finish candidate listing: {err:#}");
        }
    }
}

/// Builder assembling a shell instance
pub struct ShellBuilder {
    terminal: Box<dyn TerminalIo>,
    prompt: String,
    history_capacity: usize,
    autocomplete_max: usize,
    continuation: Option<ContinuationPredicate>,
    providers: Vec<CompletionProvider>,
    commands: Vec<CommandDescriptor>,
    package_loader: Option<PackageLoaderFn>,
    event_handlers: Vec<ShellEventHandler>,
    builtins: bool,
}

impl ShellBuilder {
    pub fn new(terminal: Box<dyn TerminalIo>) -> Self {
        Self {
            terminal,
            prompt: DEFAULT_PROMPT.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            autocomplete_max: DEFAULT_AUTOCOMPLETE_MAX,
            continuation: None,
            providers: Vec::new(),
            commands: Vec::new(),
            package_loader: None,
            event_handlers: Vec::new(),
            builtins: true,
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn autocomplete_max(mut self, max: usize) -> Self {
        self.autocomplete_max = max;
        self
    }

    /// Multi-line continuation predicate: when it judges the line
    /// incomplete, ENTER inserts a literal newline instead of submitting
    pub fn continuation(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.continuation = Some(Arc::new(predicate));
        self
    }

    pub fn completion_provider(
        mut self,
        provider: impl Fn(usize, &[String]) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn command(mut self, descriptor: CommandDescriptor) -> Self {
        self.commands.push(descriptor);
        self
    }

    /// Skip registering the built-in command set
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    pub fn package_loader(mut self, loader: PackageLoaderFn) -> Self {
        self.package_loader = Some(loader);
        self
    }

    pub fn on_event(mut self, handler: impl Fn(&ShellEvent) + Send + Sync + 'static) -> Self {
        self.event_handlers.push(Box::new(handler));
        self
    }

    pub fn build(self) -> Shell {
        let mut registry = if self.builtins {
            CommandRegistry::with_builtins()
        } else {
            CommandRegistry::new()
        };
        for descriptor in self.commands {
            registry.register(descriptor);
        }
        let mut autocomplete = AutocompleteEngine::new(self.autocomplete_max);
        for provider in self.providers {
            autocomplete.register(provider);
        }
        let mut events = ShellEventBus::new();
        for handler in self.event_handlers {
            events.subscribe(handler);
        }
        let core = ShellCore {
            session: Session::new(),
            history: HistoryRing::new(self.history_capacity),
            registry,
            packages: Packages::new(self.package_loader),
            terminal: self.terminal,
            events,
            line: InputLine::new(),
            autocomplete,
            prompt: self.prompt,
            continuation: self.continuation,
            pending_line: None,
            pending_char: None,
            external_wait: None,
        };
        Shell {
            core: Arc::new(Mutex::new(core)),
        }
    }
}
