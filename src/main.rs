//! `flowdown` — CLI harness around the streaming markdown renderer core.
//!
//! Reads stdin, writes stdout, and renders each chunk with the bundled
//! [`flowdown::demo_renderer::DemoRenderer`] — a clearly-toy stand-in for
//! a real renderer, which is always the caller's responsibility.

use clap::Parser;
use flowdown::cli::Cli;
use flowdown::config::FlowConfig;
use flowdown::demo_renderer::DemoRenderer;
use flowdown::{flow, CancellationToken};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = cli.log_level {
        builder.filter_level(level.to_level_filter());
    }
    builder.init();

    let window = match cli.window() {
        Ok(window) => window,
        Err(e) => {
            eprintln!("flowdown: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = FlowConfig::new(window).with_max_buf(cli.max_buf);
    let cancel = CancellationToken::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut source = stdin.lock();
    let mut sink = stdout.lock();

    log::info!("flowdown: starting with window={window:?}, max_buf={}", config.max_buf);

    match flow(&cancel, &mut source, &mut sink, config, &DemoRenderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("flowdown: {e}");
            ExitCode::FAILURE
        }
    }
}
