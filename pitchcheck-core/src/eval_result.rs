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

use serde::{Deserialize, Serialize};

/// Outcome of a single scorer invocation.
///
/// Every call to a scorer produces a fresh value; nothing is cached on the
/// scorer itself, so results can be handed across threads or stored freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Bounded score in `[0.0, 1.0]`
    pub score: f64,

    /// Whether `score` reached the scorer's threshold
    pub passed: bool,

    /// Human-readable justification
    pub reason: String,
}

impl ScoreResult {
    /// Build a result, clamping `score` into `[0, 1]` and deriving `passed`
    /// from `threshold`. Non-finite scores collapse to 0.0.
    pub fn from_threshold(score: f64, threshold: f64, reason: impl Into<String>) -> Self {
        let score = clamp_unit(score);
        Self {
            score,
            passed: score >= threshold,
            reason: reason.into(),
        }
    }

    /// Zero score, not passed. Used when a scenario or scorer errored.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            passed: false,
            reason: reason.into(),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let result = ScoreResult::from_threshold(0.7, 0.7, "edge");
        assert!(result.passed);

        let result = ScoreResult::from_threshold(0.69, 0.7, "below");
        assert!(!result.passed);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(ScoreResult::from_threshold(1.4, 1.0, "").score, 1.0);
        assert_eq!(ScoreResult::from_threshold(-0.2, 0.0, "").score, 0.0);
        assert_eq!(ScoreResult::from_threshold(f64::NAN, 0.5, "").score, 0.0);
    }

    #[test]
    fn test_failed_result() {
        let result = ScoreResult::failed("generation failed");
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
        assert_eq!(result.reason, "generation failed");
    }

    #[test]
    fn test_serializes_flat() {
        let json = serde_json::to_value(ScoreResult::failed("x")).unwrap();
        assert_eq!(json["score"], 0.0);
        assert_eq!(json["passed"], false);
        assert_eq!(json["reason"], "x");
    }
}
