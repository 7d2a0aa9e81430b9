//! Land planning: basic-land quotas and utility-land sourcing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::category::Category;
use crate::color::{Color, ColorIdentity};
use crate::storage::{CardQuery, CardRepository, RepositoryError};

/// Total lands in a standard deck, utility and basic combined.
pub const DEFAULT_LAND_TARGET: u32 = 38;

/// A basic land type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicLand {
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
    /// Colorless fallback.
    Wastes,
}

impl BasicLand {
    /// The basic land producing `color`.
    #[must_use]
    pub const fn for_color(color: Color) -> Self {
        match color {
            Color::White => Self::Plains,
            Color::Blue => Self::Island,
            Color::Black => Self::Swamp,
            Color::Red => Self::Mountain,
            Color::Green => Self::Forest,
        }
    }

    /// Exact card name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plains => "Plains",
            Self::Island => "Island",
            Self::Swamp => "Swamp",
            Self::Mountain => "Mountain",
            Self::Forest => "Forest",
            Self::Wastes => "Wastes",
        }
    }
}

impl fmt::Display for BasicLand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many of each basic land to add, in canonical W, U, B, R, G order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicLandPlan(Vec<(BasicLand, u32)>);

impl BasicLandPlan {
    /// Planned entries. Counts are always positive.
    #[must_use]
    pub fn entries(&self) -> &[(BasicLand, u32)] {
        &self.0
    }

    /// Count planned for a land, zero if absent.
    #[must_use]
    pub fn count(&self, land: BasicLand) -> u32 {
        self.0
            .iter()
            .find(|(l, _)| *l == land)
            .map_or(0, |(_, n)| *n)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splits the basic-land share of the land target across the identity's colors.
///
/// `needed = land_target - utility_land_count`. A colorless identity gets all
/// of it as Wastes. Otherwise each present color gets `needed / k`, and the
/// first `needed % k` colors in canonical order get one extra.
#[must_use]
pub fn basic_land_counts(
    identity: &ColorIdentity,
    utility_land_count: usize,
    land_target: u32,
) -> BasicLandPlan {
    let utility = u32::try_from(utility_land_count).unwrap_or(u32::MAX);
    let needed = land_target.saturating_sub(utility);
    if needed == 0 {
        return BasicLandPlan::default();
    }

    if identity.is_colorless() {
        return BasicLandPlan(vec![(BasicLand::Wastes, needed)]);
    }

    let colors: Vec<Color> = Color::ALL
        .into_iter()
        .filter(|c| identity.contains(*c))
        .collect();
    if colors.is_empty() {
        return BasicLandPlan::default();
    }

    // `colors` holds at most five entries.
    #[allow(clippy::cast_possible_truncation)]
    let k = colors.len() as u32;
    let base = needed / k;
    let remainder = needed % k;

    BasicLandPlan(
        colors
            .into_iter()
            .zip(0u32..)
            .map(|(color, idx)| {
                let extra = u32::from(idx < remainder);
                (BasicLand::for_color(color), base + extra)
            })
            .filter(|(_, n)| *n > 0)
            .collect(),
    )
}

/// Sources lands for a deck from a repository.
pub struct LandPlanner<'a> {
    repository: &'a dyn CardRepository,
    land_target: u32,
    utility_land_limit: usize,
}

impl<'a> LandPlanner<'a> {
    #[must_use]
    pub fn new(repository: &'a dyn CardRepository, land_target: u32, utility_land_limit: usize) -> Self {
        Self {
            repository,
            land_target,
            utility_land_limit,
        }
    }

    /// Random non-basic lands priced against the full `max_price`.
    pub fn utility_lands(
        &self,
        identity: &ColorIdentity,
        max_price: f64,
    ) -> Result<Vec<Card>, RepositoryError> {
        let query = CardQuery::new(
            identity.clone(),
            Category::Lands,
            max_price,
            self.utility_land_limit,
        );
        Ok(self
            .repository
            .sample(&query)?
            .into_iter()
            .map(|record| Card::from_record(record, Category::Lands))
            .collect())
    }

    /// Quota for the given number of utility lands.
    #[must_use]
    pub fn plan_basics(&self, identity: &ColorIdentity, utility_land_count: usize) -> BasicLandPlan {
        basic_land_counts(identity, utility_land_count, self.land_target)
    }

    /// Resolves each planned basic to a card entry. Names missing from the
    /// repository are skipped.
    pub fn basic_lands(&self, plan: &BasicLandPlan) -> Result<Vec<Card>, RepositoryError> {
        let mut cards = Vec::with_capacity(plan.entries().len());
        for &(land, count) in plan.entries() {
            match self.repository.find_by_name(land.name())? {
                Some(record) => {
                    cards.push(Card::from_record(record, Category::Lands).with_count(count));
                }
                None => {
                    tracing::warn!(land = land.name(), count, "basic land missing from repository, skipping");
                }
            }
        }
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::card::CardRecord;
    use crate::storage::InMemoryCardRepository;

    fn identity(symbols: &str) -> ColorIdentity {
        ColorIdentity::from_symbols(symbols)
    }

    #[test]
    fn test_colorless_gets_wastes() {
        let plan = basic_land_counts(&ColorIdentity::colorless(), 0, DEFAULT_LAND_TARGET);
        assert_eq!(plan.entries(), &[(BasicLand::Wastes, 38)]);
    }

    #[test]
    fn test_two_colors_split_evenly() {
        let plan = basic_land_counts(&identity("WU"), 0, DEFAULT_LAND_TARGET);
        assert_eq!(plan.entries(), &[(BasicLand::Plains, 19), (BasicLand::Island, 19)]);
    }

    #[test]
    fn test_three_colors_remainder_goes_first() {
        let plan = basic_land_counts(&identity("WUB"), 0, DEFAULT_LAND_TARGET);
        assert_eq!(
            plan.entries(),
            &[
                (BasicLand::Plains, 13),
                (BasicLand::Island, 13),
                (BasicLand::Swamp, 12)
            ]
        );
    }

    #[test]
    fn test_remainder_follows_canonical_not_identity_order() {
        // Identity order G, R, W; canonical order W, R, G.
        let plan = basic_land_counts(&identity("GRW"), 0, 38);
        assert_eq!(
            plan.entries(),
            &[
                (BasicLand::Plains, 13),
                (BasicLand::Mountain, 13),
                (BasicLand::Forest, 12)
            ]
        );
    }

    #[test]
    fn test_utility_lands_reduce_basics() {
        let plan = basic_land_counts(&identity("G"), 18, 38);
        assert_eq!(plan.entries(), &[(BasicLand::Forest, 20)]);
    }

    #[test]
    fn test_no_basics_when_utility_covers_target() {
        assert!(basic_land_counts(&identity("WU"), 38, 38).is_empty());
        assert!(basic_land_counts(&identity("WU"), 50, 38).is_empty());
        assert!(basic_land_counts(&ColorIdentity::colorless(), 40, 38).is_empty());
    }

    #[test]
    fn test_small_needed_omits_zero_counts() {
        let plan = basic_land_counts(&identity("WUBRG"), 35, 38);
        assert_eq!(
            plan.entries(),
            &[
                (BasicLand::Plains, 1),
                (BasicLand::Island, 1),
                (BasicLand::Swamp, 1)
            ]
        );
    }

    #[test]
    fn test_sum_and_spread_for_every_identity_size() {
        let all = "WUBRG";
        for k in 0..=5usize {
            let id = identity(&all[..k]);
            for utility in 0..=38usize {
                let plan = basic_land_counts(&id, utility, 38);
                let needed = 38 - u32::try_from(utility).unwrap();
                assert_eq!(plan.total(), needed, "k={k} utility={utility}");
                if k == 0 {
                    continue;
                }
                let k32 = u32::try_from(k).unwrap();
                let base = needed / k32;
                let remainder = needed % k32;
                let plus_one = plan.entries().iter().filter(|(_, n)| *n == base + 1).count();
                assert!(plan.entries().iter().all(|(_, n)| *n == base || *n == base + 1));
                if base > 0 {
                    assert_eq!(plus_one, remainder as usize);
                }
                // Extras land on the leading canonical colors.
                let counts: Vec<u32> = plan.entries().iter().map(|(_, n)| *n).collect();
                assert!(counts.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_basic_lands_skip_missing_names() {
        let repo = InMemoryCardRepository::with_seed(1).unwrap();
        repo.insert(CardRecord::new("plains", "Plains", "Basic Land — Plains", Some(0.1)))
            .unwrap();

        let planner = LandPlanner::new(&repo, 38, 18);
        let plan = planner.plan_basics(&identity("WU"), 0);
        let cards = planner.basic_lands(&plan).unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Plains");
        assert_eq!(cards[0].count, 19);
        assert_eq!(cards[0].category, Category::Lands);
    }

    #[test]
    fn test_utility_lands_use_full_budget_and_colors() {
        let repo = InMemoryCardRepository::with_seed(3).unwrap();
        repo.insert_all([
            CardRecord::new("tower", "Command Tower", "Land", Some(0.5)),
            CardRecord::new("fountain", "Adarkar Wastes", "Land", Some(2.0)).with_colors("['W', 'U']"),
            CardRecord::new("grove", "Overgrown Tomb", "Land", Some(15.0)).with_colors("['B', 'G']"),
            CardRecord::new("cradle", "Gaea's Cradle", "Legendary Land", Some(900.0)),
            CardRecord::new("island", "Island", "Basic Land — Island", Some(0.1)),
        ])
        .unwrap();

        let planner = LandPlanner::new(&repo, 38, 18);
        let mut names: Vec<String> = planner
            .utility_lands(&identity("U"), 100.0)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Adarkar Wastes", "Command Tower"]);
    }
}
