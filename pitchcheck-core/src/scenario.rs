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

//! Scenario fixtures: a structured property listing plus what the evaluation
//! expects the model to conclude about it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Buyer profile a thesis should be written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    /// Larger units bought to live in or hand down
    #[serde(rename = "legacy_owner_occupier")]
    OwnerOccupier,

    /// Smaller units bought for rental yield
    #[serde(rename = "yield_investor")]
    Investor,
}

impl Profile {
    /// Stable label, matching the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Profile::OwnerOccupier => "legacy_owner_occupier",
            Profile::Investor => "yield_investor",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One evaluation fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub payload: ListingPayload,
    pub expected_profile: Profile,
    pub expected_challenge: String,
}

impl Scenario {
    /// Payload as a JSON value, for prompt rendering and test case context
    pub fn payload_json(&self) -> serde_json::Value {
        // ListingPayload only holds strings, numbers and vectors of those, so
        // conversion to a Value cannot fail.
        serde_json::to_value(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

/// Structured listing data handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub unit_data: UnitData,
    pub pricing_data: PricingData,
    pub project_data: ProjectData,
    pub market_context: MarketContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    pub address: String,
    pub floor: u32,
    pub stack: String,
    pub sqft: u32,
    pub config: String,
    pub orientation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingData {
    pub current_listing: CurrentListing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentListing {
    pub asking_price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub name: String,
    pub neighborhood: String,
    pub completion_year: u16,
    pub tenure: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub pois: Vec<PointOfInterest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub walking_duration_mins: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    #[serde(default)]
    pub competitive_listings: Vec<CompetitiveListing>,
    #[serde(default)]
    pub past_transactions: Vec<PastTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveListing {
    pub sqft: u32,
    pub asking_psf: u32,
    pub days_on_market: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastTransaction {
    pub sqft: u32,
    pub transacted_psf: u32,
    /// ISO date, e.g. "2025-05-10"
    pub sale_date: String,
}
