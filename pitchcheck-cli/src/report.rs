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

//! Text rendering for evaluation results

use pitchcheck_core::Scenario;
use pitchcheck_evals::{EvaluationReport, ScenarioReport, ScenarioStatus, Segmenter};
use std::fmt::Write;

/// Bullets shown by the analyze command
const ANALYZE_BULLETS: usize = 3;

/// Classifier for the analyze breakdown: lenient thresholds, no fallback pass
pub fn analysis_segmenter() -> Segmenter {
    Segmenter::lenient().with_fallback(false)
}

/// Mean scorer score, 0.0 when nothing was scored
fn average_score(report: &ScenarioReport) -> f64 {
    if report.results.is_empty() {
        0.0
    } else {
        report.results.iter().map(|r| r.score).sum::<f64>() / report.results.len() as f64
    }
}

fn pass_label(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Per-scorer lines for one scenario
pub fn render_scenario(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:=<60}", "");
    let _ = writeln!(out, "Scenario: {}", report.name);
    let _ = writeln!(out, "{:=<60}", "");

    if report.status == ScenarioStatus::Errored {
        let _ = writeln!(out, "Generation failed; every scorer recorded as failed.");
    }

    for result in &report.results {
        let marker = if result.critical { "" } else { " [advisory]" };
        let _ = writeln!(
            out,
            "{}{}: {:.2} ({})",
            result.scorer_name,
            marker,
            result.score,
            pass_label(result.passed)
        );
        let _ = writeln!(out, "  Reason: {}", result.reason);
    }

    let _ = writeln!(out, "Overall: {}", pass_label(report.passed));
    out
}

/// Every scenario followed by a summary block
pub fn render_report(report: &EvaluationReport) -> String {
    let mut out = String::new();
    for scenario in &report.scenarios {
        out.push_str(&render_scenario(scenario));
        out.push('\n');
    }

    let _ = writeln!(out, "{:=<60}", "");
    let _ = writeln!(out, "EVALUATION SUMMARY (model: {})", report.model);
    let _ = writeln!(out, "{:=<60}", "");
    for scenario in &report.scenarios {
        let status = if scenario.passed { "✓" } else { "✗" };
        let passed = scenario.results.iter().filter(|r| r.passed).count();
        let _ = writeln!(
            out,
            "{} {}: {} (average score {:.2}, {}/{} scorers passed)",
            status,
            scenario.name,
            pass_label(scenario.passed),
            average_score(scenario),
            passed,
            scenario.results.len()
        );
    }
    let _ = writeln!(
        out,
        "\nScenarios passed: {}/{} ({} errored)",
        report.summary.passed, report.summary.scenarios, report.summary.errored
    );
    out
}

/// Quick critical-only verdict
pub fn render_check(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quick check: {}", report.name);
    let _ = writeln!(out, "{:-<30}", "");
    if let Some(output) = &report.output {
        let _ = writeln!(out, "Generated Output:\n{}\n", output);
    }
    for result in &report.results {
        let status = if result.passed { "✓" } else { "✗" };
        let _ = writeln!(out, "{} {}: {:.2}", status, result.scorer_name, result.score);
        if report.status == ScenarioStatus::Errored {
            let _ = writeln!(out, "    {}", result.reason);
        }
    }
    let verdict = if report.passed {
        "READY"
    } else {
        "NEEDS REFINEMENT"
    };
    let _ = writeln!(out, "\n{}", verdict);
    out
}

/// Payload, output, a quick bullet breakdown and the scorer verdicts
pub fn render_analysis(
    scenario: &Scenario,
    output: &str,
    segmenter: &Segmenter,
    evaluation: &ScenarioReport,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyzing: {}", scenario.name);
    let _ = writeln!(out, "{:=<60}", "");
    let payload = serde_json::to_string_pretty(&scenario.payload)
        .unwrap_or_else(|_| scenario.payload_json().to_string());
    let _ = writeln!(out, "Input Data:\n{}", payload);
    let _ = writeln!(out, "\nGenerated Analysis:\n{}", output);

    let bullets = segmenter.segment(output);
    let _ = writeln!(out, "\nQuick Format Check:");
    let _ = writeln!(out, "Number of bullets: {}", bullets.len());
    for (i, bullet) in bullets.iter().take(ANALYZE_BULLETS).enumerate() {
        let clean = segmenter.strip_all_markers(bullet);
        let _ = writeln!(
            out,
            "Bullet {} ({} chars): {}",
            i + 1,
            pitchcheck_evals::segmenter::char_len(&clean),
            clean
        );
    }

    let _ = writeln!(out, "\nQuick Metric Evaluation:");
    for result in &evaluation.results {
        let _ = writeln!(
            out,
            "{}: {:.2} ({})",
            result.scorer_name,
            result.score,
            pass_label(result.passed)
        );
    }
    out
}
