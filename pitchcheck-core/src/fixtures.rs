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

//! Reference listing scenarios used by the evaluation runs.

use crate::error::FixtureError;
use crate::scenario::*;
use std::path::Path;

/// 1200 sqft freehold unit with a water view; owner-occupier territory
pub fn waterfront_residences() -> Scenario {
    Scenario {
        name: "Waterfront Residences - Legacy Buyer".to_string(),
        payload: ListingPayload {
            unit_data: UnitData {
                address: "19-01, Waterfront Residences".to_string(),
                floor: 15,
                stack: "A".to_string(),
                sqft: 1200,
                config: "2 Bedroom".to_string(),
                orientation: "Unblocked water view".to_string(),
            },
            pricing_data: PricingData {
                current_listing: CurrentListing {
                    asking_price: 2_400_000,
                },
            },
            project_data: ProjectData {
                name: "Waterfront Residences".to_string(),
                neighborhood: "Central District".to_string(),
                completion_year: 2010,
                tenure: "Freehold".to_string(),
                amenities: strings(&["Swimming Pool", "Gym", "BBQ Area"]),
                pois: vec![
                    poi("Central Station", "METRO", 5),
                    poi("Food Court Plaza", "FOOD", 6),
                ],
            },
            market_context: MarketContext {
                competitive_listings: vec![
                    listing(750, 2100, 25),
                    listing(1210, 2050, 95),
                    listing(780, 2080, 40),
                ],
                past_transactions: vec![
                    transaction(760, 2050, "2025-05-10"),
                    transaction(755, 2045, "2025-04-22"),
                    transaction(1200, 1990, "2025-02-15"),
                ],
            },
        },
        expected_profile: Profile::OwnerOccupier,
        expected_challenge: "price_sensitivity".to_string(),
    }
}

/// 750 sqft leasehold unit next to a station; yield investor territory
pub fn compact_towers() -> Scenario {
    Scenario {
        name: "Compact Towers - Yield Investor".to_string(),
        payload: ListingPayload {
            unit_data: UnitData {
                address: "05-12, The Compact Towers".to_string(),
                floor: 5,
                stack: "C".to_string(),
                sqft: 750,
                config: "2 Bedroom".to_string(),
                orientation: "City view".to_string(),
            },
            pricing_data: PricingData {
                current_listing: CurrentListing {
                    asking_price: 1_600_000,
                },
            },
            project_data: ProjectData {
                name: "The Compact Towers".to_string(),
                neighborhood: "Business District".to_string(),
                completion_year: 2009,
                tenure: "99-year leasehold".to_string(),
                amenities: strings(&["Sky Gardens", "Multi-purpose Hall"]),
                pois: vec![poi("Business District Station", "METRO", 3)],
            },
            market_context: MarketContext {
                competitive_listings: vec![
                    listing(760, 2100, 30),
                    listing(755, 2120, 22),
                    listing(1200, 1950, 120),
                ],
                past_transactions: vec![
                    transaction(750, 2080, "2025-06-15"),
                    transaction(765, 2090, "2025-05-20"),
                ],
            },
        },
        expected_profile: Profile::Investor,
        expected_challenge: "market_competition".to_string(),
    }
}

/// 1500 sqft high-floor freehold unit; owner-occupier territory
pub fn premium_towers() -> Scenario {
    Scenario {
        name: "Premium Towers - Legacy Buyer".to_string(),
        payload: ListingPayload {
            unit_data: UnitData {
                address: "25-01, Premium Towers".to_string(),
                floor: 25,
                stack: "A".to_string(),
                sqft: 1500,
                config: "3 Bedroom".to_string(),
                orientation: "Waterfront view".to_string(),
            },
            pricing_data: PricingData {
                current_listing: CurrentListing {
                    asking_price: 3_200_000,
                },
            },
            project_data: ProjectData {
                name: "Premium Towers".to_string(),
                neighborhood: "Financial District".to_string(),
                completion_year: 2008,
                tenure: "Freehold".to_string(),
                amenities: strings(&["Infinity Pool", "Private Dining", "Concierge Service"]),
                pois: vec![
                    poi("Financial District Station", "METRO", 2),
                    poi("Riverside Entertainment", "ENTERTAINMENT", 8),
                ],
            },
            market_context: MarketContext {
                competitive_listings: vec![
                    listing(750, 2200, 18),
                    listing(800, 2180, 25),
                    listing(1480, 2100, 150),
                ],
                past_transactions: vec![
                    transaction(780, 2150, "2025-07-01"),
                    transaction(1520, 2000, "2025-03-10"),
                ],
            },
        },
        expected_profile: Profile::OwnerOccupier,
        expected_challenge: "age_condition".to_string(),
    }
}

/// The three reference scenarios, in evaluation order
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![waterfront_residences(), compact_towers(), premium_towers()]
}

/// Load a JSON array of scenarios
pub fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<Scenario>, FixtureError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find a scenario by exact name, falling back to a case-insensitive prefix
/// match ("compact" finds "Compact Towers - Yield Investor").
pub fn find_scenario<'a>(
    scenarios: &'a [Scenario],
    name: &str,
) -> Result<&'a Scenario, FixtureError> {
    if let Some(scenario) = scenarios.iter().find(|s| s.name == name) {
        return Ok(scenario);
    }

    let needle = name.to_lowercase();
    scenarios
        .iter()
        .find(|s| s.name.to_lowercase().starts_with(&needle))
        .ok_or_else(|| FixtureError::UnknownScenario(name.to_string()))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn poi(name: &str, kind: &str, walking_duration_mins: u32) -> PointOfInterest {
    PointOfInterest {
        name: name.to_string(),
        kind: kind.to_string(),
        walking_duration_mins,
    }
}

fn listing(sqft: u32, asking_psf: u32, days_on_market: u32) -> CompetitiveListing {
    CompetitiveListing {
        sqft,
        asking_psf,
        days_on_market,
    }
}

fn transaction(sqft: u32, transacted_psf: u32, sale_date: &str) -> PastTransaction {
    PastTransaction {
        sqft,
        transacted_psf,
        sale_date: sale_date.to_string(),
    }
}
