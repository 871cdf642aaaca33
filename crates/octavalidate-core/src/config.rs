//! Validator options
//!
//! Options can be built in code, read from the environment or loaded from a
//! JSON, YAML or TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};

/// Words rejected in strict mode regardless of configuration
pub const DEFAULT_PROHIBITED_WORDS: [&str; 3] = ["null", "undefined", "empty"];

/// Environment variable enabling strict mode
pub const ENV_STRICT_MODE: &str = "OCTAVALIDATE_STRICT_MODE";

/// Environment variable with extra prohibited words, comma separated
pub const ENV_PROHIBITED_WORDS: &str = "OCTAVALIDATE_PROHIBITED_WORDS";

/// Options a [`Validator`](crate::Validator) is created with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Reject prohibited words and compare `matches` case-sensitively
    #[serde(alias = "strict_mode")]
    pub strict_mode: bool,

    /// Words rejected in strict mode, on top of the defaults
    #[serde(alias = "prohibited_words", alias = "strictWords")]
    pub prohibited_words: Vec<String>,
}

impl ValidatorOptions {
    /// Create a new options builder
    pub fn builder() -> ValidatorOptionsBuilder {
        ValidatorOptionsBuilder::new()
    }

    /// Read options from `OCTAVALIDATE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let strict_mode = lookup(ENV_STRICT_MODE)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let prohibited_words = lookup(ENV_PROHIBITED_WORDS)
            .map(|v| split_words(&v))
            .unwrap_or_default();

        Self {
            strict_mode,
            prohibited_words,
        }
    }

    /// Load options from a file, picking the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::FileError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let options: Self = match extension.as_str() {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            other => {
                return Err(EngineError::config_error(format!(
                    "unsupported options format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        tracing::debug!(path = %path.display(), strict_mode = options.strict_mode, "loaded validator options");
        Ok(options)
    }

    /// Defaults followed by the configured words
    pub fn effective_prohibited_words(&self) -> Vec<String> {
        DEFAULT_PROHIBITED_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(self.prohibited_words.iter().cloned())
            .collect()
    }

    /// Combine with another set of options; strict mode is enabled if either
    /// enables it and word lists are concatenated
    pub fn merged_with(mut self, other: ValidatorOptions) -> Self {
        self.strict_mode |= other.strict_mode;
        self.prohibited_words.extend(other.prohibited_words);
        self
    }
}

fn split_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Builder for ValidatorOptions
#[derive(Debug, Default)]
pub struct ValidatorOptionsBuilder {
    options: ValidatorOptions,
}

impl ValidatorOptionsBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict mode
    pub fn strict_mode(mut self, enabled: bool) -> Self {
        self.options.strict_mode = enabled;
        self
    }

    /// Add a prohibited word
    pub fn prohibited_word(mut self, word: impl Into<String>) -> Self {
        self.options.prohibited_words.push(word.into());
        self
    }

    /// Add several prohibited words
    pub fn prohibited_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .prohibited_words
            .extend(words.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> ValidatorOptions {
        self.options
    }
}
