//! `dochub sidebar` command implementation.

use std::path::PathBuf;

use clap::Args;
use dochub_config::CliSettings;
use dochub_site::{ingest, write_sidebar_files};

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sidebar command.
#[derive(Args)]
pub(crate) struct SidebarArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory for sidebar JSON files (overrides config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

impl SidebarArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load(CliSettings {
            sidebar_dir: self.out_dir,
            ..CliSettings::default()
        })?;

        output.path("Root", &config.root_dir);
        output.path("Output", &config.sidebar_dir);

        let ingested = ingest(&config)?;
        let collections = ingested.sidebars(&config);
        write_sidebar_files(&config.sidebar_dir, &collections)?;
        for collection in &collections {
            output.info(&format!(
                "  {}: {} top-level link(s)",
                collection.key,
                collection.links.len()
            ));
        }

        output.success(&format!(
            "Sidebar links written for {} collection(s)",
            collections.len()
        ));
        Ok(())
    }
}
