use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Output written for each help file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Xml,
    Txt,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(OutputFormat::Html),
            "xml" => Some(OutputFormat::Xml),
            "txt" => Some(OutputFormat::Txt),
            _ => None,
        }
    }

    /// Suffix appended to the source file name, e.g. `intro.txt.html`.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Xml => "xml",
            OutputFormat::Txt => "txt",
        }
    }
}

fn default_tab_stop() -> usize {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Tag index; `OUTPUT_DIR/tags` when unset.
    #[serde(default)]
    pub tags_file: Option<PathBuf>,
    /// Replaces the pattern that marks version and title words.
    #[serde(default)]
    pub title_pattern: Option<String>,
    #[serde(default = "default_tab_stop")]
    pub tab_stop: usize,
    #[serde(default = "default_true")]
    pub table_fixups: bool,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags_file: None,
            title_pattern: None,
            tab_stop: default_tab_stop(),
            table_fixups: true,
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the tags path
        config.tags_file = config
            .tags_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/vimhelp");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The configured tags file, or `tags` inside `output_dir`.
    pub fn tags_path(&self, output_dir: &Path) -> PathBuf {
        self.tags_file
            .clone()
            .unwrap_or_else(|| output_dir.join("tags"))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
