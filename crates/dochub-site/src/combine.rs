//! Single-file concatenation of a generated book.

use std::fmt::Write as _;
use std::path::Path;

use dochub_source::to_slash;

use crate::BuildError;

/// Concatenate every markdown file of each top-level book directory.
///
/// Files directly in `src_dir` and any `SUMMARY.md` are skipped. Unreadable
/// files are logged and left out.
pub fn combine_book(src_dir: &Path) -> Result<String, BuildError> {
    let mut books: Vec<String> = std::fs::read_dir(src_dir)
        .map_err(|source| BuildError::Io {
            path: src_dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .filter(|name| !name.starts_with('.'))
        .collect();
    books.sort();

    let mut out = String::from("# Combined Documentation\n\n");
    for book in books {
        let _ = write!(out, "## Book: {book}\n\n");
        for file in markdown_files(&src_dir.join(&book))? {
            let relative = file
                .strip_prefix(src_dir)
                .map_or_else(|_| to_slash(&file), to_slash);
            match std::fs::read_to_string(&file) {
                Ok(content) => {
                    let _ = write!(out, "### File: {relative}\n\n{content}\n\n---\n\n");
                }
                Err(e) => {
                    tracing::warn!(path = %relative, error = %e, "Skipping unreadable file");
                }
            }
        }
    }
    Ok(out)
}

fn markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, BuildError> {
    let pattern = format!("{}/**/*.md", glob::Pattern::escape(&to_slash(dir)));
    let paths = glob::glob(&pattern).map_err(|e| BuildError::Pattern(e.to_string()))?;
    let mut files: Vec<_> = paths
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .filter(|path| {
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case("SUMMARY.md"))
        })
        .collect();
    files.sort();
    Ok(files)
}
