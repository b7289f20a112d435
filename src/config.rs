use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::scanner::DEFAULT_INFORMAL_PATTERN;

/// Name of the project config file, looked up in the project root.
pub const CONFIG_FILE: &str = ".docxref.toml";

/// Project configuration loaded from `.docxref.toml`.
/// Include/exclude patterns are path prefixes applied to content files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories holding API member records.
    pub api: Vec<PathBuf>,
    /// Path prefixes that are skipped.
    exclude: Vec<String>,
    /// Path prefixes that are loaded; empty means everything.
    include: Vec<String>,
    /// Regex for inline-code references; empty disables them.
    pub informal_pattern: String,
    /// How link targets are spelled in rewritten bodies.
    pub links: LinkStyle,
    /// Directories holding markdown pages.
    pub manual: Vec<PathBuf>,
    /// Where `build` writes the manifest, relative to the root.
    pub output: PathBuf,
}

/// Raw TOML structure for `.docxref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DocxrefTomlConfig {
    #[serde(default = "default_api_dirs")]
    api: Vec<PathBuf>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default = "default_informal_pattern")]
    informal_pattern: String,
    #[serde(default)]
    links: LinkStyle,
    #[serde(default = "default_manual_dirs")]
    manual: Vec<PathBuf>,
    #[serde(default = "default_output")]
    output: PathBuf,
}

/// Spelling of link targets in rewritten bodies.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkStyle {
    /// Directory prefix for API member pages, e.g. `api/`.
    pub api_prefix: String,
    /// Extension of rendered pages without the dot, e.g. `html`.
    pub page_extension: String,
}

impl Default for LinkStyle {
    fn default() -> Self {
        return Self {
            api_prefix: "api/".to_string(),
            page_extension: "html".to_string(),
        };
    }
}

impl Config {
    /// Load config from `.docxref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed — never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocxrefTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            api: raw.api,
            exclude: raw.exclude,
            include: raw.include,
            informal_pattern: raw.informal_pattern,
            links: raw.links,
            manual: raw.manual,
            output: raw.output,
        });
    }

    /// Check whether a content file path should be loaded.
    ///
    /// A path is included if no include patterns are set (load everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            api: default_api_dirs(),
            exclude: Vec::new(),
            include: Vec::new(),
            informal_pattern: default_informal_pattern(),
            links: LinkStyle::default(),
            manual: default_manual_dirs(),
            output: default_output(),
        };
    }
}

fn default_api_dirs() -> Vec<PathBuf> {
    return vec![PathBuf::from("api")];
}

fn default_informal_pattern() -> String {
    return DEFAULT_INFORMAL_PATTERN.to_string();
}

fn default_manual_dirs() -> Vec<PathBuf> {
    return vec![PathBuf::from("docs")];
}

fn default_output() -> PathBuf {
    return PathBuf::from("_site/manifest.json");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.manual, vec![PathBuf::from("docs")]);
        assert_eq!(config.output, PathBuf::from("_site/manifest.json"));
        assert_eq!(config.links, LinkStyle::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("api = [\"reference\"]\n[links]\napi_prefix = \"ref/\"\n").unwrap();
        assert_eq!(config.api, vec![PathBuf::from("reference")]);
        assert_eq!(config.links.api_prefix, "ref/");
        assert_eq!(config.links.page_extension, "html");
        assert_eq!(config.informal_pattern, DEFAULT_INFORMAL_PATTERN);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "manual = 3").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(Config::parse("output_dir = \"site\"").is_err());
    }

    #[test]
    fn include_then_exclude() {
        let config = Config::parse("include = [\"docs/\"]\nexclude = [\"docs/archive/\"]").unwrap();
        assert!(config.should_scan("docs/guide.md"));
        assert!(!config.should_scan("docs/archive/old.md"));
        assert!(!config.should_scan("notes/todo.md"));
    }
}
