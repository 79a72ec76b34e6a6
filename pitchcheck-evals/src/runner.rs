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

//! Evaluation runner: one generation per scenario, replayed through every
//! scorer

use crate::llm_client::ResponseGenerator;
use crate::prompt::PromptTemplate;
use crate::{EvalError, Scorer};
use chrono::{DateTime, Utc};
use pitchcheck_core::{Scenario, ScoreResult, TestCase};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Whether a scenario produced output to score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Evaluated,
    Errored,
}

/// One scorer's verdict on one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerOutcome {
    pub scorer_id: String,
    pub scorer_name: String,
    pub critical: bool,
    pub score: f64,
    pub passed: bool,
    pub reason: String,
}

impl ScorerOutcome {
    fn new(scorer: &dyn Scorer, result: ScoreResult) -> Self {
        Self {
            scorer_id: scorer.id().to_string(),
            scorer_name: scorer.name().to_string(),
            critical: scorer.is_critical(),
            score: result.score,
            passed: result.passed,
            reason: result.reason,
        }
    }
}

/// Results for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub status: ScenarioStatus,
    /// Generated text, or `None` when generation failed
    pub output: Option<String>,
    pub results: Vec<ScorerOutcome>,
    /// True iff generation succeeded and every critical scorer passed
    pub passed: bool,
}

impl ScenarioReport {
    fn new(
        name: &str,
        status: ScenarioStatus,
        output: Option<String>,
        results: Vec<ScorerOutcome>,
    ) -> Self {
        let passed = status == ScenarioStatus::Evaluated
            && results.iter().filter(|r| r.critical).all(|r| r.passed);
        Self {
            name: name.to_string(),
            status,
            output,
            results,
            passed,
        }
    }

    pub fn failures(&self) -> Vec<&ScorerOutcome> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    pub fn result(&self, scorer_id: &str) -> Option<&ScorerOutcome> {
        self.results.iter().find(|r| r.scorer_id == scorer_id)
    }
}

/// Scenario counts for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub scenarios: usize,
    pub passed: usize,
    pub errored: usize,
}

/// Results for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub scenarios: Vec<ScenarioReport>,
    pub summary: ReportSummary,
}

impl EvaluationReport {
    fn new(model: &str, scenarios: Vec<ScenarioReport>) -> Self {
        let summary = ReportSummary {
            scenarios: scenarios.len(),
            passed: scenarios.iter().filter(|s| s.passed).count(),
            errored: scenarios
                .iter()
                .filter(|s| s.status == ScenarioStatus::Errored)
                .count(),
        };
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            model: model.to_string(),
            scenarios,
            summary,
        }
    }

    /// True iff every scenario passed
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }
}

/// Runs scenarios through a generator and a scorer set
pub struct EvaluationRunner {
    generator: Arc<dyn ResponseGenerator>,
    template: PromptTemplate,
    scorers: Vec<Arc<dyn Scorer>>,
}

impl EvaluationRunner {
    pub fn new(generator: Arc<dyn ResponseGenerator>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
            scorers: Vec::new(),
        }
    }

    pub fn with_scorers(mut self, scorers: Vec<Arc<dyn Scorer>>) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn add_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    pub fn scorers(&self) -> &[Arc<dyn Scorer>] {
        &self.scorers
    }

    /// Evaluate every scenario in order
    pub async fn run(&self, scenarios: &[Scenario]) -> EvaluationReport {
        info!(
            scenarios = scenarios.len(),
            scorers = self.scorers.len(),
            model = self.generator.model_name(),
            "Starting evaluation run"
        );

        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.evaluate_scenario(scenario).await);
        }

        let report = EvaluationReport::new(self.generator.model_name(), reports);
        info!(
            passed = report.summary.passed,
            errored = report.summary.errored,
            total = report.summary.scenarios,
            "Evaluation run complete"
        );
        report
    }

    /// Generate once for `scenario` and score the output
    pub async fn evaluate_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        info!(scenario = %scenario.name, "Generating response");

        match self.generator.generate(&self.template, scenario).await {
            Ok(output) => self.evaluate_output(scenario, &output),
            Err(e) => {
                warn!(scenario = %scenario.name, error = %e, "Generation failed");
                let reason = format!("Generation failed: {}", e);
                let results = self
                    .scorers
                    .iter()
                    .map(|scorer| {
                        ScorerOutcome::new(scorer.as_ref(), ScoreResult::failed(reason.clone()))
                    })
                    .collect();
                ScenarioReport::new(&scenario.name, ScenarioStatus::Errored, None, results)
            }
        }
    }

    /// Score an already generated `output` without calling the model
    pub fn evaluate_output(&self, scenario: &Scenario, output: &str) -> ScenarioReport {
        let input = self
            .template
            .render(&scenario.payload)
            .unwrap_or_else(|_| scenario.payload_json().to_string());
        let case = TestCase::for_scenario(scenario, input, output);

        let results = self
            .scorers
            .iter()
            .map(|scorer| {
                let result = score_isolated(scorer.as_ref(), &case).unwrap_or_else(|e| {
                    warn!(
                        scenario = %scenario.name,
                        scorer = scorer.id(),
                        error = %e,
                        "Scorer failed"
                    );
                    ScoreResult::failed(e.to_string())
                });
                debug!(
                    scenario = %scenario.name,
                    scorer = scorer.id(),
                    score = result.score,
                    passed = result.passed,
                    "Scored"
                );
                ScorerOutcome::new(scorer.as_ref(), result)
            })
            .collect();

        ScenarioReport::new(
            &scenario.name,
            ScenarioStatus::Evaluated,
            Some(output.to_string()),
            results,
        )
    }
}

/// Run a scorer, turning a panic into [`EvalError::Panic`]
fn score_isolated(scorer: &dyn Scorer, case: &TestCase) -> Result<ScoreResult, EvalError> {
    match catch_unwind(AssertUnwindSafe(|| scorer.evaluate(case))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(EvalError::Panic(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{CannedResponses, GenerationError};
    use crate::presets::Suite;
    use crate::ScorerMetadata;
    use async_trait::async_trait;
    use pitchcheck_core::{fixtures, SuiteKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GOOD_OWNER_OUTPUT: &str = "\
• Spacious 1200 sqft 2 bedroom unit with an unblocked water view
• Freehold residence with pool and gym amenities for family life
• 5 mins walk to Central Station MRT in the Central District";

    /// Fails for the named scenario, echoes a fixed response otherwise
    struct FlakyGenerator {
        fail_for: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResponseGenerator for FlakyGenerator {
        async fn generate(
            &self,
            _template: &PromptTemplate,
            scenario: &Scenario,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if scenario.name == self.fail_for {
                Err(GenerationError::InvalidResponse("boom".to_string()))
            } else {
                Ok(GOOD_OWNER_OUTPUT.to_string())
            }
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    struct PanickingScorer;

    impl Scorer for PanickingScorer {
        fn id(&self) -> &str {
            "panics"
        }

        fn name(&self) -> &str {
            "Panics"
        }

        fn evaluate(&self, _case: &TestCase) -> Result<ScoreResult, EvalError> {
            panic!("scorer exploded")
        }

        fn metadata(&self) -> ScorerMetadata {
            ScorerMetadata {
                name: "Panics".to_string(),
                version: "0.0.0".to_string(),
                description: "Always panics".to_string(),
                tags: vec![],
            }
        }

        fn is_critical(&self) -> bool {
            false
        }

        fn threshold(&self) -> f64 {
            0.5
        }
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("Analyze:\n{data_payload}").unwrap()
    }

    #[tokio::test]
    async fn test_generation_failure_is_isolated() {
        let scenarios = fixtures::builtin_scenarios();
        let generator = Arc::new(FlakyGenerator {
            fail_for: scenarios[0].name.clone(),
            calls: AtomicUsize::new(0),
        });
        let runner = EvaluationRunner::new(generator.clone(), template())
            .with_scorers(Suite::new(SuiteKind::Full).build());

        let report = runner.run(&scenarios).await;

        assert_eq!(generator.calls.load(Ordering::SeqCst), scenarios.len());
        assert_eq!(report.summary.scenarios, 3);
        assert_eq!(report.summary.errored, 1);

        let errored = &report.scenarios[0];
        assert_eq!(errored.status, ScenarioStatus::Errored);
        assert!(errored.output.is_none());
        assert!(!errored.passed);
        assert_eq!(errored.results.len(), 3);
        assert!(errored
            .results
            .iter()
            .all(|r| !r.passed && r.score == 0.0 && r.reason.contains("boom")));

        for later in &report.scenarios[1..] {
            assert_eq!(later.status, ScenarioStatus::Evaluated);
            assert_eq!(later.output.as_deref(), Some(GOOD_OWNER_OUTPUT));
        }
    }

    #[tokio::test]
    async fn test_errored_scenario_fails_without_critical_scorers() {
        let advisory_only = EvaluationRunner::new(Arc::new(CannedResponses::new()), template())
            .add_scorer(Arc::new(crate::evaluators::LogicalConsistency::new()));
        let report = advisory_only.run(&[fixtures::compact_towers()]).await;

        assert_eq!(report.scenarios[0].status, ScenarioStatus::Errored);
        assert!(!report.scenarios[0].passed);
        assert_eq!(report.summary.passed, 0);
        assert_eq!(report.summary.errored, 1);
        assert!(!report.passed());

        let no_scorers = EvaluationRunner::new(Arc::new(CannedResponses::new()), template());
        let report = no_scorers.run(&[fixtures::compact_towers()]).await;
        assert!(report.scenarios[0].results.is_empty());
        assert!(!report.scenarios[0].passed);
    }

    #[tokio::test]
    async fn test_one_generation_per_scenario() {
        let generator = Arc::new(FlakyGenerator {
            fail_for: String::new(),
            calls: AtomicUsize::new(0),
        });
        let runner = EvaluationRunner::new(generator.clone(), template())
            .with_scorers(Suite::new(SuiteKind::All).build());

        let report = runner.run(&[fixtures::waterfront_residences()]).await;

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.scenarios[0].results.len(), 6);
    }

    #[tokio::test]
    async fn test_good_owner_output_passes_full_suite() {
        let scenario = fixtures::waterfront_residences();
        let canned = CannedResponses::new().with_response(scenario.name.clone(), GOOD_OWNER_OUTPUT);
        let runner = EvaluationRunner::new(Arc::new(canned), template())
            .with_scorers(Suite::new(SuiteKind::Full).build());

        let report = runner.run(std::slice::from_ref(&scenario)).await;
        let scenario_report = &report.scenarios[0];

        assert!(scenario_report.passed, "{:?}", scenario_report.failures());
        assert!(report.passed());
        assert_eq!(report.model, "canned");
        assert_eq!(scenario_report.result("format_compliance").unwrap().score, 1.0);
    }

    #[test]
    fn test_panicking_scorer_becomes_failed_result() {
        let runner = EvaluationRunner::new(Arc::new(CannedResponses::new()), template())
            .with_scorers(Suite::new(SuiteKind::Full).build())
            .add_scorer(Arc::new(PanickingScorer));

        let report = runner.evaluate_output(&fixtures::waterfront_residences(), GOOD_OWNER_OUTPUT);
        let panicked = report.result("panics").unwrap();

        assert!(!panicked.passed);
        assert_eq!(panicked.score, 0.0);
        assert!(panicked.reason.contains("scorer exploded"));
        // Advisory failures do not fail the scenario
        assert!(report.passed);
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_advisory_failure_does_not_fail_scenario() {
        let runner = EvaluationRunner::new(Arc::new(CannedResponses::new()), template())
            .with_scorers(Suite::new(SuiteKind::Full).build())
            .add_scorer(Arc::new(crate::evaluators::LogicalConsistency::new().with_threshold(1.1)));

        let report = runner.evaluate_output(&fixtures::waterfront_residences(), GOOD_OWNER_OUTPUT);
        assert!(!report.result("logical_consistency").unwrap().passed);
        assert!(report.passed);
    }

    #[test]
    fn test_empty_output_fails_critical_scorers() {
        let runner = EvaluationRunner::new(Arc::new(CannedResponses::new()), template())
            .with_scorers(Suite::new(SuiteKind::Full).build());

        let report = runner.evaluate_output(&fixtures::compact_towers(), "");
        assert_eq!(report.status, ScenarioStatus::Evaluated);
        assert!(!report.passed);
        assert!(report
            .results
            .iter()
            .all(|r| r.score.is_finite() && (0.0..=1.0).contains(&r.score)));
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let runner = EvaluationRunner::new(Arc::new(CannedResponses::new()), template())
            .with_scorers(Suite::new(SuiteKind::Quick).build());

        let report = runner.run(&[fixtures::premium_towers()]).await;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["errored"], 1);
        assert_eq!(json["scenarios"][0]["status"], "errored");
        assert_eq!(json["scenarios"][0]["results"][0]["scorer_id"], "format_compliance_strict");
        assert!(json["run_id"].is_string());
    }
}
