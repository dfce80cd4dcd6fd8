//! # Tideline Main Entry Point
//!
//! Runs the shell engine on a real terminal: crossterm raw mode in, raw
//! byte chunks out. Everything interesting happens inside the engine;
//! this adapter only encodes key events the way a terminal would.

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tideline::cmd_args::CommandLineArgs;
use tideline::shell::commands::{CommandDescriptor, PackageLoaderFn, Precondition};
use tideline::shell::escape::has_unbalanced_brackets;
use tideline::shell::io::CrosstermTerminal;
use tideline::shell::Shell;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();
    let shell = build_shell(&args);

    println!("Tideline shell");
    println!("Try 'help', TAB completion, and '!!'. Press Ctrl+Q to quit.");
    println!();

    enable_raw_mode()?;
    execute!(std::io::stdout(), EnableBracketedPaste)?;
    shell.start().await;

    let result = run_event_loop(&shell).await;

    execute!(std::io::stdout(), DisableBracketedPaste)?;
    disable_raw_mode()?;
    println!();
    result
}

fn build_shell(args: &CommandLineArgs) -> Shell {
    let command_names = [
        "help", "clear", "echo", "connect", "deploy",
    ];
    let package_loader: PackageLoaderFn = std::sync::Arc::new(|package| {
        Box::pin(async move {
            // Stand-in for fetching and initializing a real package
            tracing::debug!(%package, "initializing package");
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        })
    });

    Shell::builder(Box::new(CrosstermTerminal::new()))
        .prompt(args.prompt())
        .history_capacity(args.history_capacity())
        .continuation(has_unbalanced_brackets)
        .completion_provider(move |index, _tokens| {
            if index == 0 {
                command_names.iter().map(|name| name.to_string()).collect()
            } else {
                Vec::new()
            }
        })
        .command(deploy_command())
        .package_loader(package_loader)
        .build()
}

fn deploy_command() -> CommandDescriptor {
    CommandDescriptor::new("deploy", "Deploy the current program", |req| {
        Box::pin(async move {
            let answer = req
                .shell
                .wait_for_user_input("Deploy the current program? (y/n)")
                .await?;
            if answer.starts_with('y') || answer.starts_with('Y') {
                req.shell.println("Deployed.").await
            } else {
                req.shell.println("Aborted.").await
            }
        })
    })
    .with_package("deployer")
    .with_precondition(Precondition::WalletConnected)
}

async fn run_event_loop(shell: &Shell) -> Result<()> {
    loop {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_quit(&key) {
                    return Ok(());
                }
                if let Some(chunk) = encode_key(&key) {
                    shell.handle_data(&chunk).await?;
                }
            }
            Event::Paste(text) => shell.handle_data(&text).await?,
            _ => {}
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q')
}

/// Encode a crossterm key event as the raw chunk a terminal would send
fn encode_key(key: &KeyEvent) -> Option<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let chunk = match key.code {
        KeyCode::Char(c) if ctrl => {
            let lower = c.to_ascii_lowercase();
            if !lower.is_ascii_lowercase() {
                return None;
            }
            ((lower as u8 - b'a' + 1) as char).to_string()
        }
        KeyCode::Char(c) if alt => format!("\x1b{c}"),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "\r".into(),
        KeyCode::Backspace if ctrl || alt => "\x1b\x7f".into(),
        KeyCode::Backspace => "\x7f".into(),
        KeyCode::Tab => "\t".into(),
        KeyCode::Up => "\x1b[A".into(),
        KeyCode::Down => "\x1b[B".into(),
        KeyCode::Left if alt => "\x1bb".into(),
        KeyCode::Right if alt => "\x1bf".into(),
        KeyCode::Left => "\x1b[D".into(),
        KeyCode::Right => "\x1b[C".into(),
        KeyCode::Home => "\x1b[H".into(),
        KeyCode::End => "\x1b[F".into(),
        KeyCode::Delete => "\x1b[3~".into(),
        _ => return None,
    };
    Some(chunk)
}
