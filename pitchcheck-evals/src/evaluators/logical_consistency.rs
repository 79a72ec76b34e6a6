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

//! Logical consistency (advisory): penalties for self-contradicting theses

use crate::{keywords, matched_keywords, EvalError, Scorer, ScorerMetadata};
use pitchcheck_core::{ScoreResult, TestCase};

const MIXED_TONE_PENALTY: f64 = 0.3;
const SIZE_MISMATCH_PENALTY: f64 = 0.2;
const NEGATIVE_FRAMING_PENALTY: f64 = 0.2;

/// A deduction applied to the consistency score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// "excellent" and "poor" in the same thesis
    MixedTone,
    /// Small unit described as spacious or large
    SmallUnitOversold,
    /// Large unit described as compact
    LargeUnitUndersold,
    /// More than one negative-sentiment term
    NegativeFraming,
}

impl Inconsistency {
    pub fn penalty(&self) -> f64 {
        match self {
            Inconsistency::MixedTone => MIXED_TONE_PENALTY,
            Inconsistency::SmallUnitOversold | Inconsistency::LargeUnitUndersold => {
                SIZE_MISMATCH_PENALTY
            }
            Inconsistency::NegativeFraming => NEGATIVE_FRAMING_PENALTY,
        }
    }
}

/// Logical consistency scorer
///
/// Starts from 1.0 and subtracts a penalty per detected inconsistency,
/// flooring at 0.0. Advisory: it never fails a scenario on its own.
pub struct LogicalConsistency {
    threshold: f64,
    small_unit_marker: String,
    large_unit_marker: String,
    negative_terms: Vec<String>,
}

impl LogicalConsistency {
    pub fn new() -> Self {
        Self {
            threshold: 0.6,
            small_unit_marker: "750".to_string(),
            large_unit_marker: "1500".to_string(),
            negative_terms: keywords(&["avoid", "poor", "bad", "risky", "decline"]),
        }
    }

    /// Set threshold for pass/fail (default: 0.6)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Size markers searched for in the input (defaults: "750", "1500")
    pub fn with_size_markers(mut self, small: impl Into<String>, large: impl Into<String>) -> Self {
        self.small_unit_marker = small.into();
        self.large_unit_marker = large.into();
        self
    }

    /// Inconsistencies found given raw input and lowercased output
    pub fn detect(&self, input: &str, output: &str) -> Vec<Inconsistency> {
        let mut found = Vec::new();

        if output.contains("excellent") && output.contains("poor") {
            found.push(Inconsistency::MixedTone);
        }

        if input.contains(&self.small_unit_marker)
            && (output.contains("spacious") || output.contains("large"))
        {
            found.push(Inconsistency::SmallUnitOversold);
        }

        if input.contains(&self.large_unit_marker)
            && (output.contains("compact") || output.contains("efficient size"))
        {
            found.push(Inconsistency::LargeUnitUndersold);
        }

        if matched_keywords(output, &self.negative_terms).len() > 1 {
            found.push(Inconsistency::NegativeFraming);
        }

        found
    }
}

impl Default for LogicalConsistency {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for LogicalConsistency {
    fn id(&self) -> &str {
        "logical_consistency"
    }

    fn name(&self) -> &str {
        "Logical Consistency"
    }

    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError> {
        let output = case.actual_output().to_lowercase();
        let found = self.detect(&case.input_with_context(), &output);
        let penalty: f64 = found.iter().map(Inconsistency::penalty).sum();
        let score = (1.0 - penalty).max(0.0);

        if !found.is_empty() {
            tracing::debug!(?found, "logical consistency penalties");
        }

        let verdict = if score > 0.7 {
            "Consistent"
        } else {
            "Some inconsistencies"
        };

        Ok(ScoreResult::from_threshold(
            score,
            self.threshold,
            format!("Logic: {verdict} reasoning"),
        ))
    }

    fn metadata(&self) -> ScorerMetadata {
        ScorerMetadata {
            name: self.name().to_string(),
            version: "1.0.0".to_string(),
            description: "Penalizes contradictory tone, size claims that contradict the unit, and negative framing.".to_string(),
            tags: vec!["consistency".to_string(), "advisory".to_string()],
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
