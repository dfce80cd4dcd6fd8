//! End-to-end tests driving the shell engine through raw input chunks
//! against the mock rendering sink. Time is paused so the deferred
//! enable step and package loads settle deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tideline::shell::commands::{CommandDescriptor, PackageLoaderFn, Precondition};
use tideline::shell::escape::has_unbalanced_brackets;
use tideline::shell::io::MockTerminal;
use tideline::shell::{Shell, ShellEvent};

/// Type a line character by character and press ENTER
async fn type_line(shell: &Shell, line: &str) {
    for ch in line.chars() {
        shell.handle_data(&ch.to_string()).await.unwrap();
    }
    shell.handle_data("\r").await.unwrap();
}

/// Let spawned read/dispatch/enable tasks run to completion
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

fn basic_shell(mock: &MockTerminal) -> Shell {
    Shell::builder(Box::new(mock.clone())).build()
}

#[tokio::test(start_paused = true)]
async fn submitted_command_executes_and_reprompts() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "echo hello world").await;
    settle().await;

    let lines = mock.lines();
    assert!(lines.contains(&"$ echo hello world".to_string()));
    assert!(lines.contains(&"hello world".to_string()));
    // A fresh prompt is outstanding
    assert_eq!(mock.current_line_text(), "$ ");
    assert!(shell.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn unknown_command_prints_not_found_and_reprompts() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "frobnicate").await;
    settle().await;

    assert!(mock
        .lines()
        .contains(&"Command 'frobnicate' not found.".to_string()));
    assert!(shell.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn empty_line_just_reprompts() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "").await;
    settle().await;

    assert_eq!(mock.current_line_text(), "$ ");
    assert!(shell.history_entries().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn history_retains_most_recent_entries() {
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .history_capacity(3)
        .build();
    shell.start().await;

    for n in 1..=5 {
        type_line(&shell, &format!("echo {n}")).await;
        settle().await;
    }

    assert_eq!(
        shell.history_entries().await,
        vec!["echo 3", "echo 4", "echo 5"]
    );
}

#[tokio::test(start_paused = true)]
async fn history_navigation_walks_both_directions() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;
    type_line(&shell, "echo one").await;
    settle().await;
    type_line(&shell, "echo two").await;
    settle().await;

    shell.handle_data("\x1b[A").await.unwrap();
    assert_eq!(mock.input_text(), "echo two");
    shell.handle_data("\x1b[A").await.unwrap();
    assert_eq!(mock.input_text(), "echo one");
    // Already at the oldest entry; stepping further changes nothing
    shell.handle_data("\x1b[A").await.unwrap();
    assert_eq!(mock.input_text(), "echo one");

    shell.handle_data("\x1b[B").await.unwrap();
    assert_eq!(mock.input_text(), "echo two");
    // Past the newest entry the line goes empty
    shell.handle_data("\x1b[B").await.unwrap();
    assert_eq!(mock.input_text(), "");
}

#[tokio::test(start_paused = true)]
async fn tab_with_single_candidate_replaces_line() {
    // "hel" completes to "help" with the cursor at its end
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .completion_provider(|_, _| vec!["help".to_string()])
        .build();
    shell.start().await;

    for ch in ["h", "e", "l"] {
        shell.handle_data(ch).await.unwrap();
    }
    // Move the cursor away from the end first; the result must not depend on it
    shell.handle_data("\x1b[D").await.unwrap();
    shell.handle_data("\t").await.unwrap();

    assert_eq!(mock.input_text(), "help");
    assert_eq!(mock.cursor_col(), 4);
}

#[tokio::test(start_paused = true)]
async fn tab_with_trailing_whitespace_and_no_candidates_does_nothing() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    for ch in ["x", "y", "z", " "] {
        shell.handle_data(ch).await.unwrap();
    }
    shell.handle_data("\t").await.unwrap();

    assert_eq!(mock.input_text(), "xyz ");
    assert_eq!(mock.cursor_col(), 4);
}

#[tokio::test(start_paused = true)]
async fn tab_without_candidates_inserts_one_space() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    shell.handle_data("x").await.unwrap();
    shell.handle_data("\t").await.unwrap();

    assert_eq!(mock.input_text(), "x ");
}

#[tokio::test(start_paused = true)]
async fn tab_with_several_candidates_lists_and_restores_input() {
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .completion_provider(|_, _| vec!["deploy".to_string(), "debug".to_string()])
        .build();
    shell.start().await;

    shell.handle_data("d").await.unwrap();
    shell.handle_data("e").await.unwrap();
    shell.handle_data("\t").await.unwrap();

    assert!(mock.lines().contains(&"debug  deploy".to_string()));
    assert_eq!(mock.input_text(), "de");
    assert_eq!(mock.cursor_col(), 2);
    assert!(mock.current_line_text().starts_with("$ "));
}

#[tokio::test(start_paused = true)]
async fn over_limit_listing_waits_for_confirmation() {
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .autocomplete_max(3)
        .completion_provider(|_, _| (0..5).map(|n| format!("cmd{n}")).collect())
        .build();
    shell.start().await;

    shell.handle_data("c").await.unwrap();
    shell.handle_data("\t").await.unwrap();
    assert!(mock
        .screen()
        .contains("Display all 5 possibilities? (y/n)"));

    shell.handle_data("y").await.unwrap();
    settle().await;

    assert!(mock
        .lines()
        .contains(&"cmd0  cmd1  cmd2  cmd3  cmd4".to_string()));
    assert_eq!(mock.input_text(), "c");
}

#[tokio::test(start_paused = true)]
async fn over_limit_listing_is_suppressed_on_refusal() {
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .autocomplete_max(3)
        .completion_provider(|_, _| (0..5).map(|n| format!("cmd{n}")).collect())
        .build();
    shell.start().await;

    shell.handle_data("c").await.unwrap();
    shell.handle_data("\t").await.unwrap();
    shell.handle_data("n").await.unwrap();
    settle().await;

    assert!(!mock.screen().contains("cmd0  cmd1"));
    // The prompt line came back intact either way
    assert_eq!(mock.input_text(), "c");
}

#[tokio::test(start_paused = true)]
async fn history_entries_are_completion_candidates() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;
    type_line(&shell, "echo again").await;
    settle().await;

    shell.handle_data("e").await.unwrap();
    shell.handle_data("\t").await.unwrap();

    assert_eq!(mock.input_text(), "echo again");
}

#[tokio::test(start_paused = true)]
async fn clear_clears_the_screen_and_reprompts() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "clear").await;
    settle().await;

    assert_eq!(mock.clear_screen_count(), 1);
    assert_eq!(mock.current_line_text(), "$ ");
    assert_eq!(shell.history_entries().await, vec!["clear"]);
}

#[tokio::test(start_paused = true)]
async fn repeat_last_reinvokes_the_previous_command() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "echo again").await;
    settle().await;
    type_line(&shell, "!!").await;
    settle().await;

    let lines = mock.lines();
    let output: Vec<&String> = lines.iter().filter(|l| *l == "again").collect();
    assert_eq!(output.len(), 2);
    // The repeat token itself never enters history
    assert_eq!(shell.history_entries().await, vec!["echo again"]);
}

#[tokio::test(start_paused = true)]
async fn repeat_last_with_empty_history_reports_it() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    type_line(&shell, "!!").await;
    settle().await;

    assert!(mock.lines().contains(&"No previous command.".to_string()));
    assert!(shell.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn wait_for_user_input_is_exclusive_and_resolves() {
    let mock = MockTerminal::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&events);
    let shell = Shell::builder(Box::new(mock.clone()))
        .on_event(move |event| seen.lock().unwrap().push(event.clone()))
        .build();
    shell.start().await;

    let first = tokio::spawn({
        let shell = shell.clone();
        async move { shell.wait_for_user_input("Enter a passphrase:").await }
    });
    settle().await;

    let second = shell.wait_for_user_input("Enter a passphrase:").await;
    let err = second.expect_err("second wait must fail").to_string();
    assert!(err.contains("already waiting"), "unexpected error: {err}");

    type_line(&shell, "hunter2").await;
    settle().await;

    assert_eq!(first.await.unwrap().unwrap(), "hunter2");
    let events = events.lock().unwrap();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ShellEvent::ExternalInputRequested { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn externally_claimed_line_skips_the_dispatcher() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    let wait = tokio::spawn({
        let shell = shell.clone();
        async move { shell.wait_for_user_input("Name?").await }
    });
    settle().await;

    type_line(&shell, "frobnicate").await;
    settle().await;

    // Delivered to the listener, never dispatched as a command
    assert_eq!(wait.await.unwrap().unwrap(), "frobnicate");
    assert!(!mock
        .lines()
        .contains(&"Command 'frobnicate' not found.".to_string()));
    assert!(shell.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn package_initializes_once_across_invocations() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let loader: PackageLoaderFn = Arc::new(move |_package| {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        })
    });

    let mock = MockTerminal::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&events);
    let shell = Shell::builder(Box::new(mock.clone()))
        .command(
            CommandDescriptor::new("anchor", "Anchor tooling", |req| {
                Box::pin(async move { req.shell.println("anchor ready").await })
            })
            .with_package("anchor-tools"),
        )
        .package_loader(loader)
        .on_event(move |event| seen.lock().unwrap().push(event.clone()))
        .build();
    shell.start().await;

    type_line(&shell, "anchor").await;
    settle().await;
    type_line(&shell, "anchor").await;
    settle().await;

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    let banner_count = mock
        .lines()
        .iter()
        .filter(|line| line.contains("Loading anchor-tools..."))
        .count();
    assert_eq!(banner_count, 1);
    assert_eq!(
        mock.lines()
            .iter()
            .filter(|line| *line == "anchor ready")
            .count(),
        2
    );
    let events = events.lock().unwrap();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ShellEvent::PackageLoaded { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn unmet_precondition_skips_silently_but_releases_the_prompt() {
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ran);
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .command(
            CommandDescriptor::new("deploy", "Deploy", move |_req| {
                let counter = Arc::clone(&counter);
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .with_precondition(Precondition::WalletConnected),
        )
        .build();
    shell.start().await;

    type_line(&shell, "deploy").await;
    settle().await;
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert!(shell.is_active().await);

    type_line(&shell, "connect").await;
    settle().await;
    type_line(&shell, "deploy").await;
    settle().await;
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn pasted_block_executes_like_typed_input() {
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    // One chunk, newline normalized to carriage return, submitted as ENTER
    shell.handle_data("echo pasted\n").await.unwrap();
    settle().await;

    assert!(mock.lines().contains(&"pasted".to_string()));
    assert_eq!(shell.history_entries().await, vec!["echo pasted"]);
}

#[tokio::test(start_paused = true)]
async fn word_motion_over_two_words_lands_on_second_word_start() {
    // ALT+LEFT over "foo bar" from the end lands on index 4
    let mock = MockTerminal::new();
    let shell = basic_shell(&mock);
    shell.start().await;

    for ch in "foo bar".chars() {
        shell.handle_data(&ch.to_string()).await.unwrap();
    }
    shell.handle_data("\x1bb").await.unwrap();

    assert_eq!(mock.cursor_col(), 4);
    assert_eq!(mock.input_text(), "foo bar");
}

#[tokio::test(start_paused = true)]
async fn multiline_input_submits_when_brackets_balance() {
    let mock = MockTerminal::new();
    let shell = Shell::builder(Box::new(mock.clone()))
        .continuation(has_unbalanced_brackets)
        .build();
    shell.start().await;

    shell.handle_data("{").await.unwrap();
    shell.handle_data("\r").await.unwrap();
    assert_eq!(mock.input_text(), "{\n");

    shell.handle_data("}").await.unwrap();
    shell.handle_data("\r").await.unwrap();
    settle().await;

    // "{\n}" is not a command; it was submitted, not held open
    assert_eq!(shell.history_entries().await, vec!["{\n}"]);
}
