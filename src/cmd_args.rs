use std::ffi::OsString;

pub use clap::Parser;

use crate::config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Prompt prefix printed before each line read
    #[clap(short = 'p', long, default_value = config::DEFAULT_PROMPT, help = "prompt prefix")]
    prompt: String,

    /// Number of history entries to retain
    #[clap(long, help = "history capacity")]
    history: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    prompt: String,
    history: Option<usize>,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        let args = ClapArgs::parse();
        Self {
            prompt: args.prompt,
            history: args.history,
        }
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = ClapArgs::parse_from(itr);
        Self {
            prompt: args.prompt,
            history: args.history,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// History capacity: flag first, then env var, then default
    pub fn history_capacity(&self) -> usize {
        self.history.unwrap_or_else(config::get_history_capacity)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_prompt_only() {
        let args = CommandLineArgs::parse_from(["program", "--prompt", "> "]);
        assert_eq!(args.prompt(), "> ");
    }

    #[test]
    fn test_parse_args_short_flags() {
        let args = CommandLineArgs::parse_from(["program", "-p", ">> "]);
        assert_eq!(args.prompt(), ">> ");
    }

    #[test]
    fn test_parse_args_history_flag() {
        let args = CommandLineArgs::parse_from(["program", "--history", "50"]);
        assert_eq!(args.history_capacity(), 50);
    }

    #[test]
    fn test_default_values() {
        let args = CommandLineArgs::parse_from(["program"]);
        assert_eq!(args.prompt(), config::DEFAULT_PROMPT);
    }
}
