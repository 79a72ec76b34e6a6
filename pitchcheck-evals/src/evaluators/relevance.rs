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

//! Output relevance: does the thesis use the data it was given?

use crate::{keywords, matched_keywords, mean, EvalError, Scorer, ScorerMetadata};
use pitchcheck_core::{ScoreResult, TestCase};

/// Indicators collected for one response
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceBreakdown {
    /// One entry per property term present in the input: 1.0 if echoed in
    /// the output, 0.0 if not
    pub term_overlap: Vec<f64>,
    /// Fraction of investment vocabulary present in the output
    pub investment_density: f64,
    /// 1.0 if a known property or location name appears in the output.
    /// Defaults to 0.0 when none does.
    pub specificity: f64,
}

impl RelevanceBreakdown {
    /// Mean over every collected indicator
    pub fn score(&self) -> f64 {
        let mut indicators = self.term_overlap.clone();
        indicators.push(self.investment_density);
        indicators.push(self.specificity);
        mean(&indicators)
    }
}

/// Relevance scorer
///
/// Averages property-term overlap between input and output, investment
/// vocabulary density and a specificity bonus for naming the property.
pub struct OutputRelevance {
    threshold: f64,
    property_terms: Vec<String>,
    investment_terms: Vec<String>,
    proper_nouns: Vec<String>,
}

impl OutputRelevance {
    pub fn new() -> Self {
        Self {
            threshold: 0.7,
            property_terms: keywords(&[
                "sqft",
                "bedroom",
                "freehold",
                "leasehold",
                "mrt",
                "transit",
                "view",
            ]),
            investment_terms: keywords(&[
                "investment",
                "value",
                "asset",
                "price",
                "market",
                "property",
            ]),
            proper_nouns: keywords(&[
                "waterfront",
                "compact towers",
                "premium towers",
                "central district",
            ]),
        }
    }

    /// Set threshold for pass/fail (default: 0.7)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_property_terms(mut self, terms: Vec<String>) -> Self {
        self.property_terms = terms.into_iter().map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn with_proper_nouns(mut self, nouns: Vec<String>) -> Self {
        self.proper_nouns = nouns.into_iter().map(|n| n.to_lowercase()).collect();
        self
    }

    /// Collect indicators from lowercased input and output
    pub fn analyze(&self, input: &str, output: &str) -> RelevanceBreakdown {
        let term_overlap = self
            .property_terms
            .iter()
            .filter(|term| input.contains(term.as_str()))
            .map(|term| if output.contains(term.as_str()) { 1.0 } else { 0.0 })
            .collect();

        let investment_density = if self.investment_terms.is_empty() {
            0.0
        } else {
            matched_keywords(output, &self.investment_terms).len() as f64
                / self.investment_terms.len() as f64
        };

        let specificity = if matched_keywords(output, &self.proper_nouns).is_empty() {
            0.0
        } else {
            1.0
        };

        RelevanceBreakdown {
            term_overlap,
            investment_density,
            specificity,
        }
    }
}

impl Default for OutputRelevance {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for OutputRelevance {
    fn id(&self) -> &str {
        "output_relevance"
    }

    fn name(&self) -> &str {
        "Output Relevance"
    }

    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError> {
        let input = case.input_with_context().to_lowercase();
        let output = case.actual_output().to_lowercase();
        let breakdown = self.analyze(&input, &output);
        let score = breakdown.score();

        tracing::debug!(
            terms = breakdown.term_overlap.len(),
            density = breakdown.investment_density,
            specificity = breakdown.specificity,
            "output relevance"
        );

        Ok(ScoreResult::from_threshold(
            score,
            self.threshold,
            format!(
                "Relevance: {:.0}% data utilization, context-appropriate",
                score * 100.0
            ),
        ))
    }

    fn metadata(&self) -> ScorerMetadata {
        ScorerMetadata {
            name: self.name().to_string(),
            version: "1.0.0".to_string(),
            description: "Checks that the thesis reuses listing attributes and names the property.".to_string(),
            tags: vec!["relevance".to_string(), "grounding".to_string()],
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_overlap_skips_terms_absent_from_input() {
        let scorer = OutputRelevance::new();
        let breakdown = scorer.analyze("1200 sqft freehold", "1,200 sqft home");
        assert_eq!(breakdown.term_overlap, vec![1.0, 0.0]);
    }

    #[test]
    fn test_specificity_defaults_to_zero_without_proper_nouns() {
        let scorer = OutputRelevance::new();
        let breakdown = scorer.analyze("", "a nice flat somewhere");
        assert_eq!(breakdown.specificity, 0.0);
        assert!(breakdown.term_overlap.is_empty());
        assert_eq!(breakdown.investment_density, 0.0);
        assert_eq!(breakdown.score(), 0.0);
    }

    #[test]
    fn test_specificity_bonus() {
        let scorer = OutputRelevance::new();
        let breakdown = scorer.analyze("", "premium towers penthouse");
        assert_eq!(breakdown.specificity, 1.0);
    }

    #[test]
    fn test_full_score() {
        let case = TestCase::new(
            "1200 sqft freehold with water view",
            "- 1,200 sqft freehold unit with water view\n\
             - Waterfront investment: value, asset, price, market, property",
            "",
        );
        let result = OutputRelevance::new().evaluate(&case).unwrap();
        // 3 terms matched, density 1.0, specificity 1.0
        assert_eq!(result.score, 1.0);
        assert!(result.passed);
        assert_eq!(result.reason, "Relevance: 100% data utilization, context-appropriate");
    }

    #[test]
    fn test_mixed_score() {
        let case = TestCase::new("freehold leasehold", "freehold asset", "");
        let result = OutputRelevance::new().evaluate(&case).unwrap();
        // indicators: [1, 0, 1/6, 0]
        let expected = (1.0 + 0.0 + 1.0 / 6.0 + 0.0) / 4.0;
        assert!((result.score - expected).abs() < 1e-9);
        assert!(!result.passed);
    }

    #[test]
    fn test_builtin_prompt_adds_no_property_terms() {
        let scenario = pitchcheck_core::fixtures::compact_towers();
        let input = crate::prompt::PromptTemplate::builtin()
            .render(&scenario.payload)
            .unwrap();
        let case = TestCase::for_scenario(&scenario, input, "");
        let payload = scenario.payload_json().to_string().to_lowercase();

        let scorer = OutputRelevance::new();
        let breakdown = scorer.analyze(&case.input_with_context().to_lowercase(), "");
        let in_payload = matched_keywords(&payload, &scorer.property_terms);

        assert_eq!(breakdown.term_overlap.len(), in_payload.len());
        assert!(!in_payload.contains(&"mrt"));
        assert!(!in_payload.contains(&"transit"));
    }

    #[test]
    fn test_empty_output_is_finite() {
        let case = TestCase::new("sqft bedroom", "", "");
        let result = OutputRelevance::new().evaluate(&case).unwrap();
        assert!(result.score.is_finite());
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
    }
}
