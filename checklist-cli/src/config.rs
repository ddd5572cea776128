use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use checklist_core::BuildConfig;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "checklist.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Build configuration (from checklist-core)
    pub build: BuildConfig,
}

impl ChecklistConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (CHECKLIST_BUILD__*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let root = arg(args, "root");
        let explicit_file = arg(args, "config").map(PathBuf::from);
        let config_file = explicit_file.clone().unwrap_or_else(|| {
            Path::new(root.as_deref().unwrap_or(".")).join(DEFAULT_CONFIG_FILE)
        });

        let mut builder = ConfigBuilder::builder();

        // Defaults come from `#[serde(default)]`, so only real sources are added.
        if config_file.exists() {
            builder = builder.add_source(File::from(config_file.as_path()).format(FileFormat::Toml));
        } else if explicit_file.is_some() {
            bail!("Configuration file not found: {}", config_file.display());
        }

        builder = builder.add_source(
            Environment::with_prefix("CHECKLIST")
                .prefix_separator("_")
                .separator("__") // Use double underscore for nested keys
                .try_parsing(true),
        );

        if let Some(root) = root {
            builder = builder.set_override("build.root", root)?;
        }
        if let Some(output) = arg(args, "output") {
            builder = builder.set_override("build.output", output)?;
        }
        if args.try_get_one::<bool>("no-lint").ok().flatten() == Some(&true) {
            builder = builder.set_override("build.lint", false)?;
        }

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

// Only read args that are actually defined for this command
fn arg(args: &ArgMatches, name: &str) -> Option<String> {
    args.try_get_one::<String>(name).ok().flatten().cloned()
}

/// Load configuration specifically for build commands
pub fn load_build_config(args: &ArgMatches) -> Result<ChecklistConfig> {
    ChecklistConfig::load(args)
}
