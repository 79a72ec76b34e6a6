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

//! Theme structure: Unit, then Project, then Location

use crate::segmenter::Segmenter;
use crate::{keywords, mean, EvalError, Scorer, ScorerMetadata};
use pitchcheck_core::{ScoreResult, TestCase};

/// What a bullet at a given index is expected to talk about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePosition {
    Unit,
    Project,
    Location,
    /// Any bullet past the third
    Overflow,
}

impl ThemePosition {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => ThemePosition::Unit,
            1 => ThemePosition::Project,
            2 => ThemePosition::Location,
            _ => ThemePosition::Overflow,
        }
    }
}

/// Theme structure scorer
///
/// A bullet that mentions its position's vocabulary scores 1.0; one that
/// doesn't still gets 0.5. Extra bullets score a neutral 0.5.
pub struct ThemeStructure {
    threshold: f64,
    segmenter: Segmenter,
    unit_keywords: Vec<String>,
    project_keywords: Vec<String>,
    location_keywords: Vec<String>,
}

impl ThemeStructure {
    pub fn new() -> Self {
        Self {
            threshold: 0.7,
            segmenter: Segmenter::lenient(),
            unit_keywords: keywords(&[
                "sqft", "spacious", "bedroom", "unit", "space", "layout", "floor", "view",
            ]),
            project_keywords: keywords(&[
                "residence",
                "building",
                "development",
                "amenities",
                "facilities",
                "estate",
            ]),
            location_keywords: keywords(&[
                "mrt",
                "transit",
                "location",
                "district",
                "neighborhood",
                "area",
                "mins",
                "walk",
                "proximity",
            ]),
        }
    }

    /// Set threshold for pass/fail (default: 0.7)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replace the vocabulary for one position. Overflow has none.
    pub fn with_keywords(mut self, position: ThemePosition, words: Vec<String>) -> Self {
        let words = words.into_iter().map(|w| w.to_lowercase()).collect();
        match position {
            ThemePosition::Unit => self.unit_keywords = words,
            ThemePosition::Project => self.project_keywords = words,
            ThemePosition::Location => self.location_keywords = words,
            ThemePosition::Overflow => {}
        }
        self
    }

    /// Score for one lowercased bullet at `position`
    pub fn position_score(&self, position: ThemePosition, bullet: &str) -> f64 {
        let vocabulary = match position {
            ThemePosition::Unit => &self.unit_keywords,
            ThemePosition::Project => &self.project_keywords,
            ThemePosition::Location => &self.location_keywords,
            ThemePosition::Overflow => return 0.5,
        };

        if vocabulary.iter().any(|k| bullet.contains(k.as_str())) {
            1.0
        } else {
            0.5
        }
    }
}

impl Default for ThemeStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for ThemeStructure {
    fn id(&self) -> &str {
        "theme_structure"
    }

    fn name(&self) -> &str {
        "Theme Structure"
    }

    fn evaluate(&self, case: &TestCase) -> Result<ScoreResult, EvalError> {
        let output = case.actual_output().to_lowercase();
        let bullets = self.segmenter.segment(&output);

        let scores: Vec<f64> = bullets
            .iter()
            .enumerate()
            .map(|(i, bullet)| self.position_score(ThemePosition::from_index(i), bullet))
            .collect();

        Ok(ScoreResult::from_threshold(
            mean(&scores),
            self.threshold,
            format!("Theme structure adherence across {} bullets", bullets.len()),
        ))
    }

    fn metadata(&self) -> ScorerMetadata {
        ScorerMetadata {
            name: self.name().to_string(),
            version: "1.0.0".to_string(),
            description: "Checks that bullets follow the Unit, Project, Location order.".to_string(),
            tags: vec!["structure".to_string(), "theme".to_string()],
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
