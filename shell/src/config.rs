//! Command-line options of the `mshell` binary.

use crate::interpreter::DEFAULT_PROMPT;
use argh::FromArgs;
use std::time::Duration;

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_timeout() -> u64 {
    60
}

#[derive(FromArgs, Debug)]
/// A small interactive shell with a fixed set of built-in commands.
///
/// Log verbosity is controlled with RUST_LOG (default: warn).
pub struct Config {
    #[argh(option, default = "default_prompt()")]
    /// prompt printed before each line (default: "shell> ").
    pub prompt: String,

    #[argh(option, default = "default_timeout()")]
    /// seconds to wait for an external program before terminating it; 0 waits forever.
    pub timeout: u64,

    #[argh(switch)]
    /// read lines without editing or history, even on a terminal.
    pub plain: bool,
}

impl Config {
    pub fn program_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, argh::EarlyExit> {
        Config::from_args(&["mshell"], args)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.prompt, "shell> ");
        assert_eq!(config.program_timeout(), Some(Duration::from_secs(60)));
        assert!(!config.plain);
    }

    #[test]
    fn test_zero_timeout_is_unbounded() {
        let config = parse(&["--timeout", "0"]).unwrap();
        assert_eq!(config.program_timeout(), None);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&["--prompt", "$ ", "--timeout", "5", "--plain"]).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.program_timeout(), Some(Duration::from_secs(5)));
        assert!(config.plain);
    }

    #[test]
    fn test_rejects_malformed_timeout() {
        let err = parse(&["--timeout", "soon"]).err().unwrap();
        assert!(err.status.is_err());
    }

    #[test]
    fn test_rejects_positionals() {
        assert!(parse(&["script.sh"]).is_err());
    }
}
