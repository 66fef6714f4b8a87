//! `dochub book` command implementation.

use std::path::PathBuf;

use clap::Args;
use dochub_config::CliSettings;
use dochub_site::{BookWriter, LINK_ISSUE_MARKER, combine_book, ingest};

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the book command.
#[derive(Args)]
pub(crate) struct BookArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory for the book (overrides config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Columns per outline nesting level (overrides config).
    #[arg(long)]
    indent_width: Option<usize>,

    /// Also write combined-docs.md next to the book.
    #[arg(long)]
    combined: bool,
}

impl BookArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load(CliSettings {
            book_dir: self.out_dir,
            indent_width: self.indent_width,
            ..CliSettings::default()
        })?;

        output.path("Root", &config.root_dir);
        output.path("Output", &config.book_dir);

        let ingested = ingest(&config)?;
        let sections = ingested.book_sections(config.outline.indent_width);
        let pages = ingested.book_pages();

        let writer = BookWriter::new(&config.book, &config.book_dir);
        writer.write(&sections, &pages)?;

        let unresolved: usize = sections
            .iter()
            .map(|s| s.outline.matches(LINK_ISSUE_MARKER).count())
            .sum();
        if unresolved > 0 {
            output.warning(&format!(
                "{unresolved} outline link(s) could not be resolved (search for '#link-error-')"
            ));
        }

        if self.combined {
            let combined = combine_book(&writer.src_dir())?;
            let path = config.book_dir.join("combined-docs.md");
            std::fs::write(&path, combined)?;
            output.path("Combined", &path);
        }

        output.success(&format!(
            "Book written: {} document(s) in {} collection(s)",
            pages.len(),
            sections.len()
        ));
        Ok(())
    }
}
