//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.social-summary.toml` files.

use crate::models::{PreviewFormat, RoundingMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".social-summary.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input table settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Output table settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Rows shown in each console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Console preview rendering.
    #[serde(default)]
    pub preview_format: PreviewFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            preview_format: PreviewFormat::default(),
        }
    }
}

fn default_preview_rows() -> usize {
    5
}

/// Input table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Posts table to read.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            delimiter: default_delimiter(),
        }
    }
}

impl InputConfig {
    /// The delimiter as the byte the csv reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        delimiter_byte(self.delimiter)
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("socialMedia.csv")
}

fn default_delimiter() -> char {
    ','
}

/// Falls back to a comma for anything that is not a single ASCII byte.
fn delimiter_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        b','
    }
}

/// Output table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Average likes per platform and post type.
    #[serde(default = "default_platform_summary")]
    pub platform_summary: PathBuf,

    /// Average likes per calendar date.
    #[serde(default = "default_date_summary")]
    pub date_summary: PathBuf,

    /// Likes spread per age group; not written unless set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group_summary: Option<PathBuf>,

    /// Field delimiter for every output table.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            platform_summary: default_platform_summary(),
            date_summary: default_date_summary(),
            age_group_summary: None,
            delimiter: default_delimiter(),
        }
    }
}

impl OutputConfig {
    pub fn delimiter_byte(&self) -> u8 {
        delimiter_byte(self.delimiter)
    }
}

fn default_platform_summary() -> PathBuf {
    PathBuf::from("socialMediaAvg.csv")
}

fn default_date_summary() -> PathBuf {
    PathBuf::from("socialMediaTime.csv")
}

/// Aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Tie-breaking rule when rounding to two decimals.
    #[serde(default)]
    pub rounding: RoundingMode,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.social-summary.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.path = input.clone();
        }
        if let Some(ref path) = args.platform_output {
            self.output.platform_summary = path.clone();
        }
        if let Some(ref path) = args.date_output {
            self.output.date_summary = path.clone();
        }
        if let Some(ref path) = args.age_group_output {
            self.output.age_group_summary = Some(path.clone());
        }

        if let Some(delimiter) = args.delimiter {
            self.input.delimiter = delimiter;
            self.output.delimiter = delimiter;
        }

        if let Some(rounding) = args.rounding {
            self.aggregation.rounding = rounding;
        }

        if let Some(rows) = args.preview_rows {
            self.general.preview_rows = rows;
        }
        if let Some(format) = args.preview_format {
            self.general.preview_format = format;
        }
    }

    /// Output paths in the order they are written.
    pub fn output_paths(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.output.platform_summary.as_path(),
            self.output.date_summary.as_path(),
        ];
        if let Some(ref path) = self.output.age_group_summary {
            paths.push(path.as_path());
        }
        paths
    }

    /// Check settings that the file format alone cannot enforce.
    pub fn validate(&self) -> Result<(), String> {
        for (name, delimiter) in [
            ("input", self.input.delimiter),
            ("output", self.output.delimiter),
        ] {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
                return Err(format!(
                    "The {} delimiter must be a single ASCII character other than a quote or newline",
                    name
                ));
            }
        }

        if self.general.preview_rows == 0 {
            return Err("Preview rows must be at least 1".to_string());
        }

        let outputs = self.output_paths();
        for (i, path) in outputs.iter().enumerate() {
            if *path == self.input.path.as_path() {
                return Err(format!(
                    "Output {} would overwrite the input table",
                    path.display()
                ));
            }
            if outputs[..i].contains(path) {
                return Err(format!("Output {} is used for two tables", path.display()));
            }
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.path, PathBuf::from("socialMedia.csv"));
        assert_eq!(config.output.platform_summary, PathBuf::from("socialMediaAvg.csv"));
        assert_eq!(config.output.date_summary, PathBuf::from("socialMediaTime.csv"));
        assert_eq!(config.output.age_group_summary, None);
        assert_eq!(config.general.preview_rows, 5);
        assert_eq!(config.aggregation.rounding, RoundingMode::HalfEven);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
preview_rows = 3
preview_format = "json"

[input]
path = "data/posts.tsv"
delimiter = "\t"

[output]
age_group_summary = "ages.csv"

[aggregation]
rounding = "half-up"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.preview_rows, 3);
        assert_eq!(config.general.preview_format, PreviewFormat::Json);
        assert_eq!(config.input.path, PathBuf::from("data/posts.tsv"));
        assert_eq!(config.input.delimiter_byte(), b'\t');
        assert_eq!(config.output.age_group_summary, Some(PathBuf::from("ages.csv")));
        assert_eq!(config.output.date_summary, PathBuf::from("socialMediaTime.csv"));
        assert_eq!(config.aggregation.rounding, RoundingMode::HalfUp);
    }

    #[test]
    fn test_unknown_general_key_is_ignored() {
        let config: Config =
            toml::from_str("[general]\nverbose = true\npreview_rows = 4\n").unwrap();
        assert_eq!(config.general.preview_rows, 4);
    }

    #[test]
    fn test_validate_rejects_overwriting_input() {
        let mut config = Config::default();
        config.output.date_summary = config.input.path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_output() {
        let mut config = Config::default();
        config.output.age_group_summary = Some(config.output.platform_summary.clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unicode_delimiter() {
        let mut config = Config::default();
        config.output.delimiter = '·';
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[general]\npreview_rows = 2\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.general.preview_rows, 2);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[general\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml().unwrap();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("rounding = \"half-even\""));
        assert!(!toml_str.contains("verbose"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.input.path, PathBuf::from("socialMedia.csv"));
    }
}
