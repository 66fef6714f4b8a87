//! Offline book output: `SUMMARY.md`, `README.md`, `book.toml` and the
//! rewritten documents under `src/`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use dochub_config::BookConfig;
use rayon::prelude::*;
use serde::Serialize;

use crate::{BuildError, write_file};

/// One part of the book outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSection {
    pub key: String,
    pub name: String,
    /// Outline text produced by [`OutlineRenderer`](crate::OutlineRenderer).
    pub outline: String,
}

/// A rewritten document ready to be written at its canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub canonical_path: String,
    pub content: String,
}

/// Summary text: an introduction chapter, then one part per section.
pub fn summary_text(sections: &[BookSection]) -> String {
    let mut out = String::from("# Summary\n\n[Introduction](README.md)\n\n");
    for section in sections {
        let _ = write!(out, "# {}\n\n", section.name);
        out.push_str(&section.outline);
        out.push('\n');
    }
    out
}

/// Landing page listing the included collections.
pub fn readme_text(title: &str, sections: &[BookSection]) -> String {
    let mut out = format!(
        "# {title}\n\nThis book contains documentation aggregated from multiple repositories.\n\n## Included Collections\n\n"
    );
    for section in sections {
        let _ = writeln!(out, "- {}", section.name);
    }
    out
}

#[derive(Serialize)]
struct BookToml<'a> {
    book: BookTable<'a>,
    output: OutputTable,
}

#[derive(Serialize)]
struct BookTable<'a> {
    authors: &'a [String],
    language: &'static str,
    multilingual: bool,
    src: &'static str,
    title: &'a str,
}

#[derive(Serialize)]
struct OutputTable {
    html: HtmlTable,
}

#[derive(Serialize)]
struct HtmlTable {
    search: SearchTable,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct SearchTable {
    limit_results: u32,
    use_boolean_and: bool,
    boost_title: u32,
    boost_hierarchy: u32,
    boost_paragraph: u32,
    expand: bool,
    heading_split_level: u32,
}

/// `book.toml` contents for the configured title and authors.
pub fn book_toml(config: &BookConfig) -> Result<String, BuildError> {
    let book = BookToml {
        book: BookTable {
            authors: &config.authors,
            language: "en",
            multilingual: false,
            src: "src",
            title: &config.title,
        },
        output: OutputTable {
            html: HtmlTable {
                search: SearchTable {
                    limit_results: 30,
                    use_boolean_and: true,
                    boost_title: 2,
                    boost_hierarchy: 1,
                    boost_paragraph: 1,
                    expand: true,
                    heading_split_level: 3,
                },
            },
        },
    };
    Ok(toml::to_string(&book)?)
}

/// Writes the book layout below an output directory.
#[derive(Debug)]
pub struct BookWriter<'a> {
    config: &'a BookConfig,
    out_dir: PathBuf,
}

impl<'a> BookWriter<'a> {
    pub fn new(config: &'a BookConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            out_dir: out_dir.into(),
        }
    }

    pub fn src_dir(&self) -> PathBuf {
        self.out_dir.join("src")
    }

    /// Write every page and the book scaffolding.
    pub fn write(&self, sections: &[BookSection], pages: &[BookPage]) -> Result<(), BuildError> {
        let src = self.src_dir();
        std::fs::create_dir_all(&src).map_err(|source| BuildError::Io {
            path: src.clone(),
            source,
        })?;

        pages
            .par_iter()
            .try_for_each(|page| write_file(&src.join(&page.canonical_path), &page.content))?;

        write_file(&src.join("SUMMARY.md"), &summary_text(sections))?;
        write_file(&src.join("README.md"), &readme_text(&self.config.title, sections))?;
        write_file(&self.out_dir.join("book.toml"), &book_toml(self.config)?)?;

        tracing::info!(
            pages = pages.len(),
            sections = sections.len(),
            dir = %self.out_dir.display(),
            "Book written"
        );
        Ok(())
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
