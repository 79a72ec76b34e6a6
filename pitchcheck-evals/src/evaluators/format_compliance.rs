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

//! Format compliance: exactly three bullets, each within the character budget

use crate::segmenter::{char_len, Segmenter};
use crate::{mean, EvalError, Scorer, ScorerMetadata};
use pitchcheck_core::{CharPolicy, ScoreResult, TestCase};

/// Per-response breakdown of the two format rules
#[derive(Debug, Clone, PartialEq)]
pub struct FormatBreakdown {
    /// Bullet candidates found
    pub bullet_count: usize,
    /// 1.0 iff `bullet_count` equals the target
    pub count_score: f64,
    /// Character length of each bullet after stripping its marker
    pub lengths: Vec<usize>,
    /// Mean per-bullet character score (0.0 with no bullets)
    pub char_score: f64,
}

impl FormatBreakdown {
    /// Final score: mean of the count and character components
    pub fn score(&self) -> f64 {
        (self.count_score + self.char_score) / 2.0
    }
}

/// Format compliance scorer
///
/// Scores the bullet count (exactly `target_bullets`) and the average
/// per-bullet character compliance, then averages the two.
pub struct FormatCompliance {
    id: &'static str,
    threshold: f64,
    segmenter: Segmenter,
    policy: CharPolicy,
    char_limit: usize,
    decay_window: usize,
    target_bullets: usize,
}

impl FormatCompliance {
    /// Graded policy over the lenient segmenter (threshold 1.0)
    pub fn new() -> Self {
        Self {
            id: "format_compliance",
            threshold: 1.0,
            segmenter: Segmenter::lenient(),
            policy: CharPolicy::Graded,
            char_limit: 80,
            decay_window: 40,
            target_bullets: 3,
        }
    }

    /// Strict policy over the strict segmenter, as used by the minimal suite
    pub fn minimal() -> Self {
        Self {
            id: "format_compliance_strict",
            segmenter: Segmenter::strict(),
            policy: CharPolicy::Strict,
            ..Self::new()
        }
    }

    /// Set threshold for pass/fail (default: 1.0)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_policy(mut self, policy: CharPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Set the per-bullet character limit (default: 80)
    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit;
        self
    }

    /// Characters over the limit at which a graded bullet reaches 0 (default: 40)
    pub fn with_decay_window(mut self, decay_window: usize) -> Self {
        self.decay_window = decay_window.max(1);
        self
    }

    /// Score for a single bullet of `len` characters
    pub fn char_score(&self, len: usize) -> f64 {
        if len <= self.char_limit {
            return 1.0;
        }

        match self.policy {
            CharPolicy::Strict => 0.0,
            CharPolicy::Graded => {
                let over = (len - self.char_limit) as f64;
                (1.0 - over / self.decay_window as f64).max(0.0)
            }
        }
    }

    /// Apply both rules to raw output text
    pub fn analyze(&self, output: &str) -> FormatBreakdown {
        let bullets = self.segmenter.segment(output);

        let lengths: Vec<usize> = bullets
            .iter()
            .map(|bullet| char_len(self.segmenter.strip_leading_marker(bullet)))
            .collect();
        let char_scores: Vec<f64> = lengths.iter().map(|&len| self.char_score(len)).collect();

        FormatBreakdown {
            bullet_count: bullets.len(),
            count_score: if bullets.len() == self.target_bullets {
                1.0
            } else {
                0.0
            },
            lengths,
            char_score: mean(&char_scores),
        }
    }
}

impl Default for FormatCompliance {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for FormatCompliance {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        "Format Compliance"
    }

    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError> {
        let breakdown = self.analyze(case.actual_output().trim());

        tracing::debug!(
            bullets = breakdown.bullet_count,
            char_score = breakdown.char_score,
            "format compliance"
        );

        let reason = match self.policy {
            CharPolicy::Graded => format!(
                "Bullets: {}/{}, Avg char compliance: {:.2}",
                breakdown.bullet_count, self.target_bullets, breakdown.char_score
            ),
            CharPolicy::Strict => format!(
                "Format: {}/{} bullets, {:.0}% char compliance",
                breakdown.bullet_count,
                self.target_bullets,
                breakdown.char_score * 100.0
            ),
        };

        Ok(ScoreResult::from_threshold(
            breakdown.score(),
            self.threshold,
            reason,
        ))
    }

    fn metadata(&self) -> ScorerMetadata {
        let policy = match self.policy {
            CharPolicy::Graded => "linear decay past the limit",
            CharPolicy::Strict => "zero past the limit",
        };

        ScorerMetadata {
            name: self.name().to_string(),
            version: "1.0.0".to_string(),
            description: format!(
                "Checks for exactly {} bullets of at most {} characters ({}).",
                self.target_bullets, self.char_limit, policy
            ),
            tags: vec!["format".to_string(), "structure".to_string()],
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn case(output: &str) -> TestCase {
        TestCase::new("input", output, "")
    }

    #[test]
    fn test_three_short_bullets_pass() {
        let output = "• Spacious 1,200 sqft 2BR with unblocked water views\n\
                      • Freehold Waterfront Residences with pool and gym\n\
                      • 5 mins walk to Central Station in Central District";

        let result = FormatCompliance::new().evaluate(&case(output)).unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.passed);
        assert_eq!(result.reason, "Bullets: 3/3, Avg char compliance: 1.00");
    }

    #[test]
    fn test_graded_char_scores() {
        let scorer = FormatCompliance::new();
        assert_eq!(scorer.char_score(80), 1.0);
        assert_eq!(scorer.char_score(100), 0.5);
        assert_eq!(scorer.char_score(120), 0.0);
        assert_eq!(scorer.char_score(200), 0.0);
    }

    #[test]
    fn test_strict_char_scores() {
        let scorer = FormatCompliance::new().with_policy(CharPolicy::Strict);
        assert_eq!(scorer.char_score(80), 1.0);
        assert_eq!(scorer.char_score(81), 0.0);
    }

    #[test]
    fn test_long_bullet_is_measured_without_marker() {
        let long = "x".repeat(100);
        let output = format!("- {}\n- short bullet\n- another one", long);

        let breakdown = FormatCompliance::new().analyze(&output);
        assert_eq!(breakdown.lengths, vec![100, 12, 11]);
        assert_eq!(breakdown.count_score, 1.0);
        assert!((breakdown.char_score - 2.5 / 3.0).abs() < 1e-9);

        let result = FormatCompliance::new().evaluate(&case(&output)).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn test_empty_output() {
        let result = FormatCompliance::new().evaluate(&case("")).unwrap();
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
        assert_eq!(result.reason, "Bullets: 0/3, Avg char compliance: 0.00");
    }

    #[test]
    fn test_strict_variant_reason() {
        let long = "y".repeat(90);
        let output = format!("- {}\n- first real bullet here\n- second real bullet here", long);

        let result = FormatCompliance::minimal().evaluate(&case(&output)).unwrap();
        assert_eq!(result.reason, "Format: 3/3 bullets, 67% char compliance");
        assert!(!result.passed);
    }

    #[test]
    fn test_minimal_variant_ignores_short_unmarked_lines() {
        // 15-char unmarked line counts for the lenient family only
        let output = "- first bullet\n- second bullet\nNear MRT, 5 min";
        assert_eq!(FormatCompliance::new().analyze(output).bullet_count, 3);
        assert_eq!(FormatCompliance::minimal().analyze(output).bullet_count, 2);
    }

    proptest! {
        #[test]
        fn prop_three_bullets_within_limit_score_one(
            bullets in prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9 ,]{0,79}", 3)
        ) {
            let output = bullets
                .iter()
                .map(|b| format!("- {}", b))
                .collect::<Vec<_>>()
                .join("\n");

            let result = FormatCompliance::new().evaluate(&case(&output)).unwrap();
            prop_assert_eq!(result.score, 1.0);
            prop_assert!(result.passed);
        }

        #[test]
        fn prop_wrong_count_zeroes_count_component(
            count in (0usize..8).prop_filter("not three", |n| *n != 3),
            len in 1usize..150,
        ) {
            let line = format!("- {}", "a".repeat(len));
            let output = vec![line; count].join("\n");

            let breakdown = FormatCompliance::new().analyze(&output);
            prop_assert_eq!(breakdown.bullet_count, count);
            prop_assert_eq!(breakdown.count_score, 0.0);
            prop_assert!(breakdown.score() <= 0.5);
        }
    }
}
