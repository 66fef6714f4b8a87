//! `dochub combine` command implementation.

use std::path::PathBuf;

use clap::Args;
use dochub_config::CliSettings;
use dochub_site::combine_book;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the combine command.
#[derive(Args)]
pub(crate) struct CombineArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Generated book directory (default: book output from config).
    #[arg(short, long)]
    book_dir: Option<PathBuf>,

    /// Output file (default: <book_dir>/combined-docs.md).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl CombineArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let book_dir = match self.book_dir {
            Some(dir) => dir,
            None => self.common.load(CliSettings::default())?.book_dir,
        };
        let src_dir = book_dir.join("src");
        if !src_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Book source not found: {} (run `dochub book` first)",
                src_dir.display()
            )));
        }

        let target = self
            .output
            .unwrap_or_else(|| book_dir.join("combined-docs.md"));
        let combined = combine_book(&src_dir)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, combined)?;

        output.path("Combined", &target);
        output.success("Combined documentation written");
        Ok(())
    }
}
