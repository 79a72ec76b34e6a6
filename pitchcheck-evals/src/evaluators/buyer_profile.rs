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

//! Buyer-profile accuracy: does the thesis speak to the right buyer?

use crate::{keywords, matched_keywords, EvalError, Scorer, ScorerMetadata};
use pitchcheck_core::{Profile, ScoreResult, TestCase};

/// Rule that decides which profile a listing calls for
///
/// This is a stand-in oracle: large-unit size markers in the input imply an
/// owner-occupier, anything else an investor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOracle {
    /// Substrings that mark a large unit
    pub large_unit_markers: Vec<String>,
}

impl ProfileOracle {
    pub fn new(large_unit_markers: Vec<String>) -> Self {
        Self { large_unit_markers }
    }

    /// Expected profile for the given input text
    pub fn expected_profile(&self, input: &str) -> Profile {
        if self
            .large_unit_markers
            .iter()
            .any(|marker| input.contains(marker.as_str()))
        {
            Profile::OwnerOccupier
        } else {
            Profile::Investor
        }
    }
}

impl Default for ProfileOracle {
    fn default() -> Self {
        Self::new(vec!["1200".to_string(), "1500".to_string()])
    }
}

/// Buyer profile accuracy scorer
///
/// Scores 1.0 when the output uses at least one keyword for the expected
/// profile, 0.0 otherwise.
pub struct BuyerProfileAccuracy {
    threshold: f64,
    oracle: ProfileOracle,
    owner_keywords: Vec<String>,
    investor_keywords: Vec<String>,
}

impl BuyerProfileAccuracy {
    pub fn new() -> Self {
        Self {
            threshold: 0.8,
            oracle: ProfileOracle::default(),
            owner_keywords: keywords(&["legacy", "owner", "occupier", "home", "family", "lifestyle"]),
            investor_keywords: keywords(&["yield", "investor", "rental", "returns", "income"]),
        }
    }

    /// Set threshold for pass/fail (default: 0.8)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_oracle(mut self, oracle: ProfileOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replace the keyword set for one profile
    pub fn with_keywords(mut self, profile: Profile, words: Vec<String>) -> Self {
        let words = words.into_iter().map(|w| w.to_lowercase()).collect();
        match profile {
            Profile::OwnerOccupier => self.owner_keywords = words,
            Profile::Investor => self.investor_keywords = words,
        }
        self
    }

    fn keywords_for(&self, profile: Profile) -> &[String] {
        match profile {
            Profile::OwnerOccupier => &self.owner_keywords,
            Profile::Investor => &self.investor_keywords,
        }
    }
}

impl Default for BuyerProfileAccuracy {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for BuyerProfileAccuracy {
    fn id(&self) -> &str {
        "buyer_profile_accuracy"
    }

    fn name(&self) -> &str {
        "Buyer Profile Accuracy"
    }

    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError> {
        let expected = self.oracle.expected_profile(&case.input_with_context());
        let output = case.actual_output().to_lowercase();
        let matched = matched_keywords(&output, self.keywords_for(expected));

        let score = if matched.is_empty() { 0.0 } else { 1.0 };
        let verdict = if score > 0.5 { "correct" } else { "incorrect" };

        tracing::debug!(%expected, ?matched, "buyer profile");

        Ok(ScoreResult::from_threshold(
            score,
            self.threshold,
            format!("Expected {expected}, analysis shows {verdict} identification"),
        ))
    }

    fn metadata(&self) -> ScorerMetadata {
        ScorerMetadata {
            name: self.name().to_string(),
            version: "1.0.0".to_string(),
            description: "Checks that the thesis uses vocabulary for the buyer profile implied by the unit size.".to_string(),
            tags: vec!["profile".to_string(), "vocabulary".to_string()],
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
