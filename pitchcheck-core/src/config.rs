// Copyright 2025 Pitchcheck Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration for pitchcheck runs
//!
//! Settings come from an optional TOML file, then environment variables,
//! then defaults. Model credentials live in [`ModelConfig`] and are handed
//! to the model client explicitly; nothing in the scoring engine reads the
//! process environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default prompt template location, relative to the working directory
pub const DEFAULT_PROMPT_PATH: &str = "prompts/real_estate_analysis_prompt.txt";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PitchcheckConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Model client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Gemini API key (GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name (GEMINI_MODEL)
    #[serde(default = "default_model")]
    pub model: String,

    /// REST base URL (GEMINI_BASE_URL)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// The API key, or [`ConfigError::MissingApiKey`] if none was configured
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }
}

/// Which scorers a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    /// Buyer profile, graded format compliance, theme structure
    #[default]
    Full,
    /// Strict format compliance, relevance, logical consistency
    Minimal,
    /// Critical minimal scorers only
    Quick,
    /// Everything
    All,
}

impl SuiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteKind::Full => "full",
            SuiteKind::Minimal => "minimal",
            SuiteKind::Quick => "quick",
            SuiteKind::All => "all",
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(SuiteKind::Full),
            "minimal" => Ok(SuiteKind::Minimal),
            "quick" => Ok(SuiteKind::Quick),
            "all" => Ok(SuiteKind::All),
            _ => Err(ConfigError::InvalidValue {
                key: "suite".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How over-long bullets are penalized by the graded format scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharPolicy {
    /// Linear decay from the limit to zero over the decay window
    #[default]
    Graded,
    /// Anything over the limit scores zero
    Strict,
}

impl FromStr for CharPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graded" => Ok(CharPolicy::Graded),
            "strict" => Ok(CharPolicy::Strict),
            _ => Err(ConfigError::InvalidValue {
                key: "char_policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Evaluation run settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluationConfig {
    /// Prompt template file (PITCHCHECK_PROMPT_PATH)
    #[serde(default = "default_prompt_path")]
    pub prompt_path: PathBuf,

    /// Scorer suite (PITCHCHECK_SUITE)
    #[serde(default)]
    pub suite: SuiteKind,

    /// Character budget policy for the full suite's format scorer
    /// (PITCHCHECK_CHAR_POLICY)
    #[serde(default)]
    pub char_policy: CharPolicy,

    /// Per-scorer threshold overrides, keyed by scorer id
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            prompt_path: default_prompt_path(),
            suite: SuiteKind::default(),
            char_policy: CharPolicy::default(),
            thresholds: BTreeMap::new(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_prompt_path() -> PathBuf {
    PathBuf::from(DEFAULT_PROMPT_PATH)
}

impl PitchcheckConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override settings from environment variables
    ///
    /// Supported environment variables:
    /// - GEMINI_API_KEY: model API key
    /// - GEMINI_MODEL: model name (default: gemini-2.0-flash)
    /// - GEMINI_BASE_URL: REST endpoint
    /// - PITCHCHECK_PROMPT_PATH: prompt template file
    /// - PITCHCHECK_SUITE: full | minimal | quick | all
    /// - PITCHCHECK_CHAR_POLICY: graded | strict
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`merge_env`](Self::merge_env) with an explicit variable lookup
    pub fn merge_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.model.model = model;
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Some(path) = lookup("PITCHCHECK_PROMPT_PATH") {
            self.evaluation.prompt_path = PathBuf::from(path);
        }
        if let Some(suite) = lookup("PITCHCHECK_SUITE") {
            self.evaluation.suite = suite.parse()?;
        }
        if let Some(policy) = lookup("PITCHCHECK_CHAR_POLICY") {
            self.evaluation.char_policy = policy.parse()?;
        }

        Ok(self)
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        config.merge_env()
    }

    /// Threshold override for a scorer, if configured
    pub fn threshold_for(&self, scorer_id: &str) -> Option<f64> {
        self.evaluation.thresholds.get(scorer_id).copied()
    }
}
