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

//! Pitchcheck CLI
//!
//! Generates investment theses for listing scenarios and scores them.

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pitchcheck_core::{fixtures, PitchcheckConfig, Scenario, SuiteKind};
use pitchcheck_evals::{
    CannedResponses, EvaluationRunner, GeminiClient, PromptTemplate, ResponseGenerator, Suite,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "pitchcheck")]
#[command(about = "Pitchcheck - evaluate real-estate investment theses", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scenario file (JSON array) instead of the builtin scenarios
    #[arg(long, global = true)]
    scenarios: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every scenario
    Run {
        /// Scorer suite (full, minimal, quick, all); defaults to config
        #[arg(long)]
        suite: Option<SuiteKind>,

        /// Replay responses from a JSON map of scenario name to response
        #[arg(long)]
        responses: Option<PathBuf>,
    },

    /// Quick critical-only check of one scenario
    Check {
        /// Scenario name or prefix (first scenario by default)
        #[arg(long)]
        scenario: Option<String>,

        /// Replay responses from a JSON map of scenario name to response
        #[arg(long)]
        responses: Option<PathBuf>,
    },

    /// Generate once, show a quick format breakdown and the full-suite scores
    Analyze {
        /// Scenario name or prefix (first scenario by default)
        #[arg(long)]
        scenario: Option<String>,

        /// Replay responses from a JSON map of scenario name to response
        #[arg(long)]
        responses: Option<PathBuf>,
    },

    /// Score an existing response file without calling the model
    Score {
        /// Scenario name or prefix
        #[arg(long)]
        scenario: String,

        /// File holding the model response
        #[arg(long)]
        output: PathBuf,

        /// Scorer suite (full, minimal, quick, all); defaults to config
        #[arg(long)]
        suite: Option<SuiteKind>,
    },

    /// List available scenarios
    Scenarios,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = PitchcheckConfig::load(cli.config.clone()).context("Failed to load config")?;
    let scenarios = load_scenarios(cli.scenarios.as_deref())?;

    let passed = match cli.command {
        Commands::Run { suite, responses } => {
            let suite = suite_for(&config, suite);
            let generator = build_generator(&config, responses.as_deref())?;
            let runner = EvaluationRunner::new(generator, load_template(&config)?)
                .with_scorers(suite.build());

            info!(suite = %suite.kind(), "{}", suite.description());
            let report = runner.run(&scenarios).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report::render_report(&report));
            }
            report.passed()
        }

        Commands::Check {
            scenario,
            responses,
        } => {
            let scenario = pick_scenario(&scenarios, scenario.as_deref())?;
            let generator = build_generator(&config, responses.as_deref())?;
            let runner = EvaluationRunner::new(generator, load_template(&config)?)
                .with_scorers(suite_for(&config, Some(SuiteKind::Quick)).build());

            let report = runner.evaluate_scenario(scenario).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report::render_check(&report));
            }
            report.passed
        }

        Commands::Analyze {
            scenario,
            responses,
        } => {
            let scenario = pick_scenario(&scenarios, scenario.as_deref())?;
            let generator = build_generator(&config, responses.as_deref())?;
            let template = load_template(&config)?;
            let output = generator
                .generate(&template, scenario)
                .await
                .with_context(|| format!("Generation failed for {}", scenario.name))?;

            let segmenter = report::analysis_segmenter();
            let evaluation = EvaluationRunner::new(generator, template)
                .with_scorers(suite_for(&config, Some(SuiteKind::Full)).build())
                .evaluate_output(scenario, &output);

            if cli.json {
                let analysis = serde_json::json!({
                    "scenario": scenario.name,
                    "payload": scenario.payload,
                    "output": output,
                    "bullets": segmenter.segment(&output),
                    "evaluation": evaluation,
                });
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!(
                    "{}",
                    report::render_analysis(scenario, &output, &segmenter, &evaluation)
                );
            }
            true
        }

        Commands::Score {
            scenario,
            output,
            suite,
        } => {
            let scenario = pick_scenario(&scenarios, Some(&scenario))?;
            let text = std::fs::read_to_string(&output)
                .with_context(|| format!("Failed to read response file {:?}", output))?;

            // No model call, so no API key is needed here.
            let runner = EvaluationRunner::new(
                Arc::new(CannedResponses::new()),
                load_template(&config)?,
            )
            .with_scorers(suite_for(&config, suite).build());

            let report = runner.evaluate_output(scenario, &text);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report::render_scenario(&report));
            }
            report.passed
        }

        Commands::Scenarios => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&scenarios)?);
            } else {
                println!("Scenarios ({}):", scenarios.len());
                println!("{:-<60}", "");
                for scenario in &scenarios {
                    println!("{}", scenario.name);
                    println!("    Profile: {}", scenario.expected_profile);
                    println!("    Challenge: {}", scenario.expected_challenge);
                    println!("    Size: {} sqft", scenario.payload.unit_data.sqft);
                }
            }
            true
        }
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn suite_for(config: &PitchcheckConfig, kind: Option<SuiteKind>) -> Suite {
    match kind {
        Some(kind) => Suite::new(kind)
            .with_char_policy(config.evaluation.char_policy)
            .with_thresholds(&config.evaluation.thresholds),
        None => Suite::from_config(config),
    }
}

fn load_scenarios(path: Option<&Path>) -> Result<Vec<Scenario>> {
    match path {
        Some(path) => fixtures::load_scenarios(path)
            .with_context(|| format!("Failed to load scenarios from {:?}", path)),
        None => Ok(fixtures::builtin_scenarios()),
    }
}

fn pick_scenario<'a>(scenarios: &'a [Scenario], name: Option<&str>) -> Result<&'a Scenario> {
    match name {
        Some(name) => Ok(fixtures::find_scenario(scenarios, name)?),
        None => scenarios.first().context("No scenarios available"),
    }
}

fn load_template(config: &PitchcheckConfig) -> Result<PromptTemplate> {
    let path = &config.evaluation.prompt_path;
    if path.exists() {
        PromptTemplate::from_file(path)
            .with_context(|| format!("Failed to load prompt template {:?}", path))
    } else {
        warn!("Prompt template {:?} not found, using builtin template", path);
        Ok(PromptTemplate::builtin())
    }
}

fn build_generator(
    config: &PitchcheckConfig,
    responses: Option<&Path>,
) -> Result<Arc<dyn ResponseGenerator>> {
    match responses {
        Some(path) => {
            let canned = CannedResponses::from_file(path)?;
            info!(responses = canned.len(), "Replaying recorded responses");
            Ok(Arc::new(canned))
        }
        None => {
            let client = GeminiClient::from_config(&config.model)
                .context("Gemini client needs GEMINI_API_KEY or [model].api_key")?;
            Ok(Arc::new(client))
        }
    }
}
