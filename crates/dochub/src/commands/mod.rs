//! CLI command implementations.

pub(crate) mod book;
pub(crate) mod combine;
pub(crate) mod sidebar;

use std::path::PathBuf;

use clap::Args;
use dochub_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use book::BookArgs;
pub(crate) use combine::CombineArgs;
pub(crate) use sidebar::SidebarArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover dochub.toml).
    #[arg(short, long, env = "DOCHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only process these submodule keys (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load the configuration with `settings` applied on top.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Validation`] if `--only` names an unknown key.
    pub(crate) fn load(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            only: self.only.clone(),
            ..settings
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;

        if let Some(only) = &self.only
            && let Some(unknown) = only.iter().find(|key| config.submodule(key).is_none())
        {
            return Err(CliError::Validation(format!("Unknown submodule: {unknown}")));
        }
        Ok(config)
    }
}
