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

use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};

/// Everything a scorer sees for one evaluation: the rendered prompt, the
/// model's response, a reference description and serialized context payloads.
///
/// Fields are read-only once built; scorers only ever borrow a test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    input: String,
    actual_output: String,
    expected_output: String,
    #[serde(default)]
    context: Vec<String>,
}

impl TestCase {
    pub fn new(
        input: impl Into<String>,
        actual_output: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            actual_output: actual_output.into(),
            expected_output: expected_output.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Build the test case for `scenario` given the rendered prompt and the
    /// response the model produced for it.
    pub fn for_scenario(
        scenario: &Scenario,
        input: impl Into<String>,
        actual_output: impl Into<String>,
    ) -> Self {
        let expected_output = format!(
            "Expected analysis for {} with {} challenge. Should contain 3 bullet points \
             under 80 characters each following Unit-Project-Location structure.",
            scenario.expected_profile, scenario.expected_challenge
        );

        Self::new(input, actual_output, expected_output)
            .with_context(vec![scenario.payload_json().to_string()])
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn actual_output(&self) -> &str {
        &self.actual_output
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Input followed by every context payload, newline separated. Rules that
    /// look for signals in "the input data" search this.
    pub fn input_with_context(&self) -> String {
        let mut text = self.input.clone();
        for entry in &self.context {
            text.push('\n');
            text.push_str(entry);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_for_scenario_carries_payload_context() {
        let scenario = fixtures::compact_towers();
        let case = TestCase::for_scenario(&scenario, "prompt", "- bullet");

        assert_eq!(case.input(), "prompt");
        assert_eq!(case.actual_output(), "- bullet");
        assert_eq!(case.context().len(), 1);
        assert!(case.context()[0].contains("\"sqft\":750"));
        assert!(case.expected_output().contains("yield_investor"));
        assert!(case.expected_output().contains("market_competition"));
    }

    #[test]
    fn test_input_with_context_joins_payloads() {
        let case = TestCase::new("in", "out", "exp")
            .with_context(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(case.input_with_context(), "in\na\nb");
    }

    #[test]
    fn test_plain_case_has_no_context() {
        let case = TestCase::new("in", "", "");
        assert!(case.context().is_empty());
        assert_eq!(case.input_with_context(), "in");
    }
}
