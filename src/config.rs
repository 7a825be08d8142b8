//! Command-line and environment configuration
//!
//! Every flag can also come from a `STEPWISE_*` environment variable, which is
//! how a controlling process usually tunes a spawned debugger.

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_MAX_STEPS: u64 = 10_000;
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 20_000;
pub const DEFAULT_MAX_VALUE_CHARS: usize = 500;
pub const DEFAULT_LOG_FILE: &str = "debugger_log.txt";

/// Limits applied to one debugging session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Step events allowed before the run is cut off
    pub max_steps: u64,
    /// Longest `output` carried by a step event, in characters
    pub max_output_chars: usize,
    /// Longest rendered variable value, in characters; 0 disables the cap
    pub max_value_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_steps: DEFAULT_MAX_STEPS,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
            max_value_chars: DEFAULT_MAX_VALUE_CHARS,
        }
    }
}

/// Statement-stepping script debugger.
///
/// Reads a session id and source text on stdin, then emits one JSON line per
/// executed statement on stdout and waits for a command after each.
#[derive(Debug, Clone, Parser)]
#[command(name = "stepwise", version, about)]
pub struct Cli {
    /// Step events allowed before the run is stopped
    #[arg(long, env = "STEPWISE_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Longest program output carried by a step event, in characters
    #[arg(long, env = "STEPWISE_MAX_OUTPUT_CHARS", default_value_t = DEFAULT_MAX_OUTPUT_CHARS)]
    pub max_output_chars: usize,

    /// Longest rendered variable value, in characters (0 = unlimited)
    #[arg(long, env = "STEPWISE_MAX_VALUE_CHARS", default_value_t = DEFAULT_MAX_VALUE_CHARS)]
    pub max_value_chars: usize,

    /// Append-only diagnostic log file
    #[arg(long, env = "STEPWISE_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "STEPWISE_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_steps: self.max_steps,
            max_output_chars: self.max_output_chars,
            max_value_chars: self.max_value_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_session_config() {
        let cli = Cli::try_parse_from(["stepwise"]).unwrap();
        assert_eq!(cli.session_config(), SessionConfig::default());
        assert_eq!(cli.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "stepwise",
            "--max-steps",
            "5",
            "--max-output-chars",
            "10",
            "--max-value-chars",
            "0",
        ])
        .unwrap();
        assert_eq!(
            cli.session_config(),
            SessionConfig {
                max_steps: 5,
                max_output_chars: 10,
                max_value_chars: 0,
            }
        );
    }
}
