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

//! Pitchcheck Core
//!
//! Data structures shared by the scoring engine and the CLI: test cases,
//! score results, listing scenarios and run configuration.

pub mod config;
pub mod error;
pub mod eval_result;
pub mod fixtures;
pub mod scenario;
pub mod test_case;

pub use config::{
    CharPolicy, EvaluationConfig, ModelConfig, PitchcheckConfig, SuiteKind, DEFAULT_BASE_URL,
    DEFAULT_MODEL, DEFAULT_PROMPT_PATH,
};
pub use error::{ConfigError, FixtureError};
pub use eval_result::ScoreResult;
pub use scenario::{
    CompetitiveListing, CurrentListing, ListingPayload, MarketContext, PastTransaction,
    PointOfInterest, PricingData, Profile, ProjectData, Scenario, UnitData,
};
pub use test_case::TestCase;
