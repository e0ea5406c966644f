//! Command-line interface for the `flowdown` binary.
//!
//! Argument parsing only; the binary entry point lives in `main.rs`.

use clap::Parser;

use crate::config::{Window, DEFAULT_MAX_BUF};

/// flowdown - a streaming markdown renderer pipeline harness
#[derive(Parser, Debug)]
#[command(name = "flowdown")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Flush cadence in bytes: `-1` unbuffered (flush at every safe
    /// boundary), `0` buffered (flush only at EOF), or a positive byte
    /// count to force a flush once that much is accumulated.
    #[arg(long, visible_alias = "flow", value_name = "INT", default_value_t = 0)]
    pub window: i64,

    /// Override the hard ceiling on accumulated bytes between flushes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_BUF)]
    pub max_buf: usize,

    /// Override `RUST_LOG` with an explicit level.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

impl Cli {
    /// Resolve the parsed `--window` integer into a [`Window`], reporting
    /// the original clap-style error message on an invalid value.
    pub fn window(&self) -> Result<Window, String> {
        Window::try_from(self.window).map_err(|e| e.to_string())
    }
}

/// Log level argument for the CLI, mirroring `log::LevelFilter`'s variants
/// as a `clap::ValueEnum` so it can be parsed directly from argv.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_window_is_buffered() {
        let cli = Cli::parse_from(["flowdown"]);
        assert_eq!(cli.window().unwrap(), Window::Buffered);
    }

    #[test]
    fn flow_alias_sets_window() {
        let cli = Cli::parse_from(["flowdown", "--flow", "8192"]);
        assert_eq!(cli.window().unwrap(), Window::Windowed(8192));
    }

    #[test]
    fn rejects_invalid_window() {
        let cli = Cli::parse_from(["flowdown", "--window", "-7"]);
        assert!(cli.window().is_err());
    }

    #[test]
    fn max_buf_defaults_to_constant() {
        let cli = Cli::parse_from(["flowdown"]);
        assert_eq!(cli.max_buf, DEFAULT_MAX_BUF);
    }
}
