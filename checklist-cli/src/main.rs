use std::process::ExitCode;

use clap::{ArgMatches, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod config;

fn cli() -> Command {
    // Running without a subcommand is the same as `checklist build`.
    cmd::build::add_build_args(Command::new("checklist"))
        .about("Build onboarding checklist pages from markdown")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(cmd::build::make_subcommand())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "checklist=info,checklist_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Exit status for one invocation, plus the line to print when it failed.
fn run(matches: &ArgMatches) -> (u8, Option<String>) {
    let result = match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        _ => cmd::build::execute(matches),
    };

    match result {
        Ok(()) => (0, None),
        Err(e) => (1, Some(format!("Build failed: {e:#}"))),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let matches = cli().get_matches();
    let (code, message) = run(&matches);
    if let Some(message) = message {
        println!("{message}");
    }
    ExitCode::from(code)
}
