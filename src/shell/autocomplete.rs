//! # Autocomplete Engine
//!
//! Collects candidate completions from registered providers for the input
//! fragment left of the cursor and decides what TAB should do. The
//! decision is pure data; the controller applies it to the line buffer and
//! the rendering sink.

use std::sync::Arc;

/// A candidate source: `(cursor token index, token list) -> candidates`
pub type CompletionProvider = Arc<dyn Fn(usize, &[String]) -> Vec<String> + Send + Sync>;

/// What TAB resolved to for the current fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Trailing whitespace and no candidates: no mutation at all
    None,
    /// No candidates and no trailing whitespace: insert one space
    InsertSpace,
    /// Exactly one candidate: replace the whole line with it
    Replace(String),
    /// Between two and the configured maximum: list below the line
    List(Vec<String>),
    /// Over the maximum: ask before listing
    ConfirmList(Vec<String>),
}

/// Candidate collection plus the TAB decision rules
pub struct AutocompleteEngine {
    providers: Vec<CompletionProvider>,
    max_listed: usize,
}

impl AutocompleteEngine {
    pub fn new(max_listed: usize) -> Self {
        Self {
            providers: Vec::new(),
            max_listed: max_listed.max(1),
        }
    }

    pub fn register(&mut self, provider: CompletionProvider) {
        self.providers.push(provider);
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Decide what TAB does for the fragment from line start to cursor
    pub fn complete(&self, fragment: &str) -> Completion {
        self.complete_with_history(fragment, &[])
    }

    /// Like [`complete`](Self::complete), with the history ring acting as
    /// the implicit default provider: every history line is a candidate.
    pub fn complete_with_history(&self, fragment: &str, history: &[String]) -> Completion {
        let trailing_whitespace = fragment.chars().last().is_some_and(char::is_whitespace);
        let tokens: Vec<String> = fragment.split_whitespace().map(str::to_string).collect();
        let (index, current) = if trailing_whitespace || tokens.is_empty() {
            (tokens.len(), "")
        } else {
            (tokens.len() - 1, tokens[tokens.len() - 1].as_str())
        };

        let mut candidates: Vec<String> = self
            .providers
            .iter()
            .flat_map(|provider| provider(index, &tokens))
            .chain(history.iter().cloned())
            .filter(|candidate| candidate.starts_with(current))
            .collect();
        candidates.sort();
        candidates.dedup();

        match candidates.len() {
            0 if trailing_whitespace => Completion::None,
            0 => Completion::InsertSpace,
            1 => Completion::Replace(candidates.remove(0)),
            n if n <= self.max_listed => Completion::List(candidates),
            _ => Completion::ConfirmList(candidates),
        }
    }
}
