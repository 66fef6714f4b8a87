//! Configuration management for dochub.
//!
//! Parses `dochub.toml` with serde and discovers it in the current
//! directory or its parents. The directory holding the config file is the
//! repository root: every submodule path is a forward-slash path relative
//! to it.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path-valued settings support `${VAR}` and `${VAR:-default}`:
//! - `book.output_dir`
//! - `sidebar.output_dir`
//! - `submodules.*.toc_path`
//! - `submodules.*.source_base_dir`
//! - `submodules.*.patterns`
//! - `submodules.*.snippet_root`
//! - `submodules.*.order_path`

mod expand;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dochub.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override book output directory.
    pub book_dir: Option<PathBuf>,
    /// Override sidebar JSON output directory.
    pub sidebar_dir: Option<PathBuf>,
    /// Override outline indentation unit.
    pub indent_width: Option<usize>,
    /// Restrict the run to these submodule keys.
    pub only: Option<Vec<String>>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Offline book settings.
    pub book: BookConfig,
    /// Live-site sidebar settings.
    pub sidebar: SidebarConfig,
    /// Outline parsing settings.
    pub outline: OutlineConfig,
    /// Documentation collections, in output order.
    pub submodules: Vec<SubmoduleConfig>,

    /// Repository root (directory of the config file).
    #[serde(skip)]
    pub root_dir: PathBuf,
    /// Resolved book output directory.
    #[serde(skip)]
    pub book_dir: PathBuf,
    /// Resolved sidebar output directory.
    #[serde(skip)]
    pub sidebar_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_root(Path::new("."))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub output_dir: String,
    pub title: String,
    pub authors: Vec<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            output_dir: "mdbook".to_owned(),
            title: "Documentation".to_owned(),
            authors: Vec::new(),
        }
    }
}

/// Sidebar link generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Directory for per-collection JSON files.
    pub output_dir: String,
    /// Slug prefix for every generated link.
    pub base_path: String,
    /// Label of the first breadcrumb.
    pub root_label: String,
    /// Order of collections in `all-orders.json`.
    pub collection_order: Vec<String>,
    /// Slug prefixes whose labels keep their original casing.
    pub lowercase_paths: Vec<String>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            output_dir: "sidebar-links".to_owned(),
            base_path: "docs".to_owned(),
            root_label: "Docs".to_owned(),
            collection_order: Vec::new(),
            lowercase_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Leading whitespace columns per nesting level.
    pub indent_width: usize,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Shape of a submodule's table of contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmoduleKind {
    /// mdBook-style `SUMMARY.md` outline.
    Outline,
    /// VitePress sidebar config or JSON nav array.
    Structured,
    /// No table of contents; documents are listed by order and title.
    #[default]
    #[serde(rename = "none")]
    Flat,
}

/// Prefix rewrite applied to snippet paths before resolution.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PathCorrection {
    pub prefix: String,
    pub replacement: String,
}

/// One independently sourced documentation collection.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmoduleConfig {
    /// Output directory name and link prefix.
    pub key: String,
    /// Display name. Defaults to the key.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SubmoduleKind,
    /// Table of contents file, required unless `type = "none"`.
    #[serde(default)]
    pub toc_path: Option<String>,
    /// Content root the canonical paths are computed from.
    pub source_base_dir: String,
    /// Ordered glob patterns; `!` negates.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Root for `@/` snippet paths. Defaults to `source_base_dir`.
    #[serde(default)]
    pub snippet_root: Option<String>,
    #[serde(default)]
    pub path_corrections: Vec<PathCorrection>,
    /// Optional sidebar ordering JSON.
    #[serde(default)]
    pub order_path: Option<String>,
}

impl SubmoduleConfig {
    /// Display name, falling back to the key.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Glob patterns, defaulting to every markdown file under the base dir.
    pub fn effective_patterns(&self) -> Vec<String> {
        if self.patterns.is_empty() {
            let base = self.source_base_dir.trim_end_matches('/');
            vec![format!("{base}/**/*.md"), format!("{base}/**/*.mdx")]
        } else {
            self.patterns.clone()
        }
    }

    pub fn snippet_root(&self) -> &str {
        self.snippet_root.as_deref().unwrap_or(&self.source_base_dir)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`book.output_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_OUT`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dochub.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no config file exists, or a parse,
    /// expansion, or validation error.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => Self::discover_config().ok_or_else(|| {
                let cwd = std::env::current_dir().unwrap_or_default();
                ConfigError::NotFound(cwd.join(CONFIG_FILENAME))
            })?,
        };

        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }
        Ok(config)
    }

    /// Parse configuration text, treating `root_dir` as the repository root.
    pub fn from_toml(content: &str, root_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(root_dir);
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let root_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, root_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_root(root: &Path) -> Self {
        let book = BookConfig::default();
        let sidebar = SidebarConfig::default();
        Self {
            book_dir: root.join(&book.output_dir),
            sidebar_dir: root.join(&sidebar.output_dir),
            book,
            sidebar,
            outline: OutlineConfig::default(),
            submodules: Vec::new(),
            root_dir: root.to_path_buf(),
            config_path: None,
        }
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(book_dir) = &settings.book_dir {
            self.book_dir.clone_from(book_dir);
        }
        if let Some(sidebar_dir) = &settings.sidebar_dir {
            self.sidebar_dir.clone_from(sidebar_dir);
        }
        if let Some(indent_width) = settings.indent_width {
            self.outline.indent_width = indent_width;
        }
        if let Some(only) = &settings.only {
            self.submodules.retain(|s| only.contains(&s.key));
        }
    }

    /// Look up a submodule by key.
    pub fn submodule(&self, key: &str) -> Option<&SubmoduleConfig> {
        self.submodules.iter().find(|s| s.key == key)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outline.indent_width == 0 {
            return Err(ConfigError::Validation(
                "outline.indent_width must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.sidebar.base_path, "sidebar.base_path")?;

        let mut seen = HashSet::new();
        for submodule in &self.submodules {
            require_non_empty(&submodule.key, "submodules.key")?;
            if submodule.key.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "submodule key '{}' cannot contain '/'",
                    submodule.key
                )));
            }
            if !seen.insert(submodule.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate submodule key '{}'",
                    submodule.key
                )));
            }
            require_non_empty(
                &submodule.source_base_dir,
                &format!("submodules.{}.source_base_dir", submodule.key),
            )?;
            if submodule.kind != SubmoduleKind::Flat && submodule.toc_path.is_none() {
                return Err(ConfigError::Validation(format!(
                    "submodule '{}' requires toc_path for type {:?}",
                    submodule.key, submodule.kind
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.book.output_dir = expand::expand_env(&self.book.output_dir, "book.output_dir")?;
        self.sidebar.output_dir =
            expand::expand_env(&self.sidebar.output_dir, "sidebar.output_dir")?;

        for submodule in &mut self.submodules {
            let prefix = format!("submodules.{}", submodule.key);
            submodule.source_base_dir = expand::expand_env(
                &submodule.source_base_dir,
                &format!("{prefix}.source_base_dir"),
            )?;
            for (field, value) in [
                ("toc_path", &mut submodule.toc_path),
                ("snippet_root", &mut submodule.snippet_root),
                ("order_path", &mut submodule.order_path),
            ] {
                if let Some(raw) = value {
                    *raw = expand::expand_env(raw, &format!("{prefix}.{field}"))?;
                }
            }
            expand::expand_all(&mut submodule.patterns, &format!("{prefix}.patterns"))?;
        }
        Ok(())
    }

    fn resolve_paths(&mut self, root_dir: &Path) {
        self.root_dir = root_dir.to_path_buf();
        self.book_dir = root_dir.join(&self.book.output_dir);
        self.sidebar_dir = root_dir.join(&self.sidebar.output_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[book]
output_dir = "out/book"
title = "Docs Hub"
authors = ["Docs Team"]

[sidebar]
collection_order = ["sway", "guides"]
lowercase_paths = ["docs/forc/commands/"]

[[submodules]]
key = "sway"
name = "Sway Language"
type = "outline"
toc_path = "docs/sway/src/SUMMARY.md"
source_base_dir = "docs/sway/src"
patterns = ["docs/sway/src/**/*.md", "!**/SUMMARY.md"]

[[submodules.path_corrections]]
prefix = "/../../sway/"
replacement = "docs/sway/"

[[submodules]]
key = "guides"
source_base_dir = "docs/guides"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_root(Path::new("/repo"));
        assert_eq!(config.book_dir, PathBuf::from("/repo/mdbook"));
        assert_eq!(config.sidebar_dir, PathBuf::from("/repo/sidebar-links"));
        assert_eq!(config.outline.indent_width, 2);
        assert_eq!(config.sidebar.root_label, "Docs");
        assert!(config.submodules.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(SAMPLE, Path::new("/repo")).unwrap();
        assert_eq!(config.book.title, "Docs Hub");
        assert_eq!(config.book_dir, PathBuf::from("/repo/out/book"));
        assert_eq!(config.submodules.len(), 2);

        let sway = config.submodule("sway").unwrap();
        assert_eq!(sway.kind, SubmoduleKind::Outline);
        assert_eq!(sway.display_name(), "Sway Language");
        assert_eq!(
            sway.path_corrections,
            vec![PathCorrection {
                prefix: "/../../sway/".to_owned(),
                replacement: "docs/sway/".to_owned(),
            }]
        );
        assert_eq!(sway.snippet_root(), "docs/sway/src");

        let guides = config.submodule("guides").unwrap();
        assert_eq!(guides.kind, SubmoduleKind::Flat);
        assert_eq!(guides.display_name(), "guides");
    }

    #[test]
    fn test_effective_patterns_default() {
        let config = Config::from_toml(SAMPLE, Path::new("/repo")).unwrap();
        let guides = config.submodule("guides").unwrap();
        assert_eq!(
            guides.effective_patterns(),
            vec![
                "docs/guides/**/*.md".to_owned(),
                "docs/guides/**/*.mdx".to_owned()
            ]
        );
    }

    #[test]
    fn test_outline_requires_toc_path() {
        let toml = r#"
[[submodules]]
key = "sway"
type = "outline"
source_base_dir = "docs/sway"
"#;
        let err = Config::from_toml(toml, Path::new("/repo")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("toc_path"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let toml = r#"
[[submodules]]
key = "a"
source_base_dir = "docs/a"

[[submodules]]
key = "a"
source_base_dir = "docs/b"
"#;
        let err = Config::from_toml(toml, Path::new("/repo")).unwrap_err();
        assert!(err.to_string().contains("duplicate submodule key 'a'"));
    }

    #[test]
    fn test_zero_indent_rejected() {
        let toml = "[outline]\nindent_width = 0\n";
        let err = Config::from_toml(toml, Path::new("/repo")).unwrap_err();
        assert!(err.to_string().contains("indent_width"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::from_toml(SAMPLE, Path::new("/repo")).unwrap();
        config.apply_cli_settings(&CliSettings {
            book_dir: Some(PathBuf::from("/tmp/book")),
            indent_width: Some(4),
            only: Some(vec!["guides".to_owned()]),
            ..Default::default()
        });

        assert_eq!(config.book_dir, PathBuf::from("/tmp/book"));
        assert_eq!(config.sidebar_dir, PathBuf::from("/repo/sidebar-links"));
        assert_eq!(config.outline.indent_width, 4);
        assert_eq!(config.submodules.len(), 1);
        assert_eq!(config.submodules[0].key, "guides");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dochub.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.root_dir, dir.path());
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/dochub.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
