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

//! # Pitchcheck Evaluation Engine
//!
//! Heuristic scorers for three-bullet real-estate investment theses.
//!
//! ## Features
//!
//! - **Trait-based scorer system**: each scorer returns a fresh [`ScoreResult`]
//! - **Built-in scorers**: format compliance, buyer profile, theme structure,
//!   relevance, logical consistency
//! - **Suites**: pre-configured scorer sets with critical/advisory marking
//! - **Evaluation runner**: one model call per scenario, replayed through
//!   every scorer, with per-scenario error isolation
//!
//! ## Example
//!
//! ```rust,ignore
//! use pitchcheck_evals::{EvaluationRunner, Suite};
//! use pitchcheck_evals::llm_client::GeminiClient;
//! use pitchcheck_evals::prompt::PromptTemplate;
//! use std::sync::Arc;
//!
//! let client = Arc::new(GeminiClient::from_config(&config.model)?);
//! let template = PromptTemplate::from_file(&config.evaluation.prompt_path)?;
//! let runner = EvaluationRunner::new(client, template)
//!     .with_scorers(Suite::new(SuiteKind::Full).build());
//! let report = runner.run(&fixtures::builtin_scenarios()).await;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod evaluators;
pub mod llm_client;
pub mod presets;
pub mod prompt;
pub mod runner;
pub mod segmenter;

pub use llm_client::{CannedResponses, GeminiClient, GenerationError, ResponseGenerator};
pub use pitchcheck_core::{ScoreResult, TestCase};
pub use presets::Suite;
pub use prompt::{PromptTemplate, TemplateError};
pub use runner::{
    EvaluationReport, EvaluationRunner, ReportSummary, ScenarioReport, ScenarioStatus,
    ScorerOutcome,
};
pub use segmenter::Segmenter;

/// Core trait that all scorers implement
///
/// Scorers hold configuration only. `evaluate` must not mutate the scorer,
/// so one instance can be shared across scenarios and threads.
pub trait Scorer: Send + Sync {
    /// Stable identifier (e.g., "format_compliance")
    fn id(&self) -> &str;

    /// Display name (e.g., "Format Compliance")
    fn name(&self) -> &str;

    /// Score one test case
    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError>;

    /// Metadata about this scorer
    fn metadata(&self) -> ScorerMetadata;

    /// Whether failing this scorer fails the scenario
    fn is_critical(&self) -> bool {
        true
    }

    /// Pass/fail threshold
    fn threshold(&self) -> f64;
}

/// Metadata about a scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerMetadata {
    /// Human-readable name
    pub name: String,

    /// Version string (e.g., "1.0.0")
    pub version: String,

    /// What the scorer checks
    pub description: String,

    /// Tags for categorization
    pub tags: Vec<String>,
}

/// Errors a scorer may report instead of a score
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scorer panicked: {0}")]
    Panic(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Lowercased keyword list from string literals
pub(crate) fn keywords(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

/// Keywords from `set` that occur as substrings of `haystack`
pub(crate) fn matched_keywords<'a>(haystack: &str, set: &'a [String]) -> Vec<&'a str> {
    set.iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .map(String::as_str)
        .collect()
}

/// Arithmetic mean, 0.0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 0.0]), 0.5);
    }

    #[test]
    fn test_matched_keywords_are_substrings() {
        let set = keywords(&["MRT", "walk"]);
        assert_eq!(matched_keywords("5 mins walking to mrt", &set), vec!["mrt", "walk"]);
        assert!(matched_keywords("", &set).is_empty());
    }
}
