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

//! Pre-configured scorer suites
//!
//! ```rust,ignore
//! use pitchcheck_evals::presets::Suite;
//!
//! let scorers = Suite::new(SuiteKind::Minimal)
//!     .with_threshold("output_relevance", 0.6)
//!     .build();
//! ```

use crate::evaluators::*;
use crate::Scorer;
use pitchcheck_core::{CharPolicy, PitchcheckConfig, SuiteKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A suite kind plus the knobs configuration may turn
#[derive(Debug, Clone, PartialEq)]
pub struct Suite {
    kind: SuiteKind,
    char_policy: CharPolicy,
    thresholds: BTreeMap<String, f64>,
}

impl Suite {
    pub fn new(kind: SuiteKind) -> Self {
        Self {
            kind,
            char_policy: CharPolicy::Graded,
            thresholds: BTreeMap::new(),
        }
    }

    /// Suite, char policy and threshold overrides from configuration
    pub fn from_config(config: &PitchcheckConfig) -> Self {
        Self::new(config.evaluation.suite)
            .with_char_policy(config.evaluation.char_policy)
            .with_thresholds(&config.evaluation.thresholds)
    }

    pub fn kind(&self) -> SuiteKind {
        self.kind
    }

    /// Char policy of the full suite's format scorer
    ///
    /// The minimal suite always scores format strictly.
    pub fn with_char_policy(mut self, policy: CharPolicy) -> Self {
        self.char_policy = policy;
        self
    }

    /// Override the threshold of the scorer with id `scorer_id`
    pub fn with_threshold(mut self, scorer_id: &str, threshold: f64) -> Self {
        self.thresholds.insert(scorer_id.to_string(), threshold);
        self
    }

    pub fn with_thresholds(mut self, thresholds: &BTreeMap<String, f64>) -> Self {
        self.thresholds
            .extend(thresholds.iter().map(|(id, t)| (id.clone(), *t)));
        self
    }

    fn threshold(&self, scorer_id: &str, default: f64) -> f64 {
        self.thresholds.get(scorer_id).copied().unwrap_or(default)
    }

    fn full(&self) -> Vec<Arc<dyn Scorer>> {
        let profile = BuyerProfileAccuracy::new();
        let format = FormatCompliance::new().with_policy(self.char_policy);
        let theme = ThemeStructure::new();

        vec![
            Arc::new(profile.with_threshold(self.threshold("buyer_profile_accuracy", 0.8))),
            Arc::new(format.with_threshold(self.threshold("format_compliance", 1.0))),
            Arc::new(theme.with_threshold(self.threshold("theme_structure", 0.7))),
        ]
    }

    fn critical_minimal(&self) -> Vec<Arc<dyn Scorer>> {
        let format = FormatCompliance::minimal();
        let relevance = OutputRelevance::new();

        vec![
            Arc::new(format.with_threshold(self.threshold("format_compliance_strict", 1.0))),
            Arc::new(relevance.with_threshold(self.threshold("output_relevance", 0.7))),
        ]
    }

    fn minimal(&self) -> Vec<Arc<dyn Scorer>> {
        let consistency = LogicalConsistency::new();
        let mut scorers = self.critical_minimal();
        scorers.push(Arc::new(
            consistency.with_threshold(self.threshold("logical_consistency", 0.6)),
        ));
        scorers
    }

    /// Create the scorers for this suite
    pub fn build(&self) -> Vec<Arc<dyn Scorer>> {
        match self.kind {
            SuiteKind::Full => self.full(),
            SuiteKind::Minimal => self.minimal(),
            SuiteKind::Quick => self.critical_minimal(),
            SuiteKind::All => {
                let mut scorers = self.full();
                scorers.extend(self.minimal());
                scorers
            }
        }
    }

    /// Get a description of this suite
    pub fn description(&self) -> &'static str {
        match self.kind {
            SuiteKind::Full => "Buyer profile, format compliance, theme structure",
            SuiteKind::Minimal => {
                "Strict format, relevance, logical consistency (advisory)"
            }
            SuiteKind::Quick => "Critical checks only: strict format and relevance",
            SuiteKind::All => "Every scorer from the full and minimal suites",
        }
    }

    /// Get all suite kinds
    pub fn all() -> Vec<Self> {
        [
            SuiteKind::Full,
            SuiteKind::Minimal,
            SuiteKind::Quick,
            SuiteKind::All,
        ]
        .into_iter()
        .map(Self::new)
        .collect()
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new(SuiteKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcheck_core::TestCase;

    fn ids(suite: &Suite) -> Vec<String> {
        suite.build().iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn test_suite_descriptions() {
        for suite in Suite::all() {
            assert!(!suite.description().is_empty());
            assert!(!suite.build().is_empty());
        }
    }

    #[test]
    fn test_full_suite_composition() {
        let suite = Suite::new(SuiteKind::Full);
        assert_eq!(
            ids(&suite),
            vec!["buyer_profile_accuracy", "format_compliance", "theme_structure"]
        );
        assert!(suite.build().iter().all(|s| s.is_critical()));

        let thresholds: Vec<f64> = suite.build().iter().map(|s| s.threshold()).collect();
        assert_eq!(thresholds, vec![0.8, 1.0, 0.7]);
    }

    #[test]
    fn test_minimal_suite_marks_consistency_advisory() {
        let scorers = Suite::new(SuiteKind::Minimal).build();
        let critical: Vec<(&str, bool)> =
            scorers.iter().map(|s| (s.id(), s.is_critical())).collect();
        assert_eq!(
            critical,
            vec![
                ("format_compliance_strict", true),
                ("output_relevance", true),
                ("logical_consistency", false),
            ]
        );
    }

    #[test]
    fn test_quick_is_critical_subset_of_minimal() {
        let quick = ids(&Suite::new(SuiteKind::Quick));
        assert_eq!(quick, vec!["format_compliance_strict", "output_relevance"]);
    }

    #[test]
    fn test_all_is_union() {
        let all = ids(&Suite::new(SuiteKind::All));
        assert_eq!(all.len(), 6);
        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 6);
    }

    #[test]
    fn test_threshold_overrides() {
        let suite = Suite::new(SuiteKind::Full).with_threshold("theme_structure", 0.5);
        let theme = suite
            .build()
            .into_iter()
            .find(|s| s.id() == "theme_structure")
            .unwrap();
        assert_eq!(theme.threshold(), 0.5);
    }

    #[test]
    fn test_char_policy_applies_to_full_format() {
        // 100-char bullets: graded gives 0.5 per bullet, strict gives 0.0
        let bullet = format!("• {}", "a".repeat(100));
        let output = vec![bullet.clone(), bullet.clone(), bullet].join("\n");
        let case = TestCase::new("input", output, "");

        let score_with = |policy| {
            Suite::new(SuiteKind::Full)
                .with_char_policy(policy)
                .build()
                .into_iter()
                .find(|s| s.id() == "format_compliance")
                .unwrap()
                .evaluate(&case)
                .unwrap()
                .score
        };

        assert!((score_with(CharPolicy::Graded) - 0.75).abs() < 1e-9);
        assert!((score_with(CharPolicy::Strict) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_config() {
        let mut config = PitchcheckConfig::default();
        config.evaluation.suite = SuiteKind::Quick;
        config
            .evaluation
            .thresholds
            .insert("output_relevance".to_string(), 0.4);

        let suite = Suite::from_config(&config);
        assert_eq!(suite.kind(), SuiteKind::Quick);
        let relevance = suite
            .build()
            .into_iter()
            .find(|s| s.id() == "output_relevance")
            .unwrap();
        assert_eq!(relevance.threshold(), 0.4);
    }
}
