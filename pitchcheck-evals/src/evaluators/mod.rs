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

//! Built-in scorers for three-bullet investment theses

pub mod buyer_profile;
pub mod format_compliance;
pub mod logical_consistency;
pub mod relevance;
pub mod theme_structure;

pub use buyer_profile::{BuyerProfileAccuracy, ProfileOracle};
pub use format_compliance::{FormatBreakdown, FormatCompliance};
pub use logical_consistency::{Inconsistency, LogicalConsistency};
pub use relevance::{OutputRelevance, RelevanceBreakdown};
pub use theme_structure::{ThemePosition, ThemeStructure};
