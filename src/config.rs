use anyhow::{Context, Result};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2";

lazy_static! {
    // Locale tags the service accepts: "en", "en-US", "de-DE-x-simple-language", "auto"
    static ref LANGUAGE_TAG: Regex =
        Regex::new(r"^(auto|[a-z]{2,3}(-[A-Z]{2})?(-[a-zA-Z0-9-]+)?)$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: String,
    pub language: String,
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub disabled_rules: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_suggestions() -> usize {
    5
}

fn default_max_text_length() -> usize {
    20_000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "en-US".to_string(),
            ignore_patterns: vec![
                r"^[A-Z0-9_]{2,}$".to_string(),    // ALL_CAPS
                r"^https?://\S+$".to_string(),     // URLs
                r"^[a-fA-F0-9]{32,}$".to_string(), // Hashes
                r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$".to_string(), // Emails
            ],
            disabled_rules: Vec::new(),
            max_suggestions: 5,
            max_text_length: 20_000,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: String,
        endpoint: Option<String>,
        cli_patterns: Vec<String>,
        timeout: Option<u64>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".grammarchk.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        config.language = language;
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        if !cli_patterns.is_empty() {
            config.ignore_patterns.extend(cli_patterns);
        }
        if let Some(timeout) = timeout {
            config.timeout_secs = timeout;
        }

        if !is_valid_language(&config.language) {
            anyhow::bail!(
                "'{}' does not look like a language code (expected e.g. en-US, de-DE or auto)",
                config.language
            );
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.endpoint != DEFAULT_ENDPOINT {
            self.endpoint = other.endpoint;
        }
        if other.language != "en-US" {
            self.language = other.language;
        }
        if !other.ignore_patterns.is_empty() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if !other.disabled_rules.is_empty() {
            self.disabled_rules = other.disabled_rules;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.max_text_length != default_max_text_length() {
            self.max_text_length = other.max_text_length;
        }
        if other.timeout_secs != default_timeout_secs() {
            self.timeout_secs = other.timeout_secs;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "grammarchk").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

pub fn is_valid_language(tag: &str) -> bool {
    LANGUAGE_TAG.is_match(tag)
}
