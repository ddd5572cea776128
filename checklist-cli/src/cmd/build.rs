use anyhow::Result;
use checklist_core::ChecklistBuilder;
use checklist_core::builder::output_files;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use crate::config::load_build_config;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Project root containing the checklist sources"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory, relative to the root [default: dist]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: <root>/checklist.toml]"),
        )
        .arg(
            Arg::new("no-lint")
                .long("no-lint")
                .help("Skip the HTML tidy pass")
                .action(ArgAction::SetTrue),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Build the onboarding checklist pages, manifests and logo assets")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = load_build_config(args)?;

    info!("Building onboarding checklists...");
    let build = ChecklistBuilder::new(config.build).build()?;
    let report = build.render_all()?;

    for page in &report.pages {
        info!("{}: {} items", page.slug, page.items);
    }
    println!("Build complete! Version {}", report.version);
    println!("Output files:");
    for file in output_files(build.output_dir()) {
        println!("  - {}", file.display());
    }

    Ok(())
}
