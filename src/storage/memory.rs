//! In-memory card repository.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`CardRepository`]. It is intended for embedded usage, tests, and as a
//! reference implementation. Sampling goes through a seedable RNG so tests
//! can pin the otherwise random order.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::SeedableRng;

use crate::card::{CardId, CardRecord};
use crate::category::ClassifierRegistry;
use crate::storage::traits::{
    contains_ignore_ascii_case, CardQuery, CardRepository, CommanderFilter, RepositoryError,
};

fn lock_err(context: &'static str) -> RepositoryError {
    RepositoryError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct CardState {
    by_id: HashMap<CardId, CardRecord>,
    /// Insertion order, used for paginated listings.
    order: Vec<CardId>,
    /// First card inserted under each exact name.
    by_name: HashMap<String, CardId>,
}

impl CardState {
    fn in_order(&self) -> impl Iterator<Item = &CardRecord> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

/// Thread-safe in-memory card repository.
#[derive(Debug)]
pub struct InMemoryCardRepository {
    state: RwLock<CardState>,
    rng: Mutex<StdRng>,
    classifiers: ClassifierRegistry,
}

impl InMemoryCardRepository {
    /// Create a new empty repository with OS-seeded sampling and the
    /// standard classifiers.
    pub fn new() -> Result<Self, RepositoryError> {
        Ok(Self::with_parts(StdRng::from_os_rng(), ClassifierRegistry::standard()?))
    }

    /// Create a new empty repository whose sampling is reproducible.
    pub fn with_seed(seed: u64) -> Result<Self, RepositoryError> {
        Ok(Self::with_parts(StdRng::seed_from_u64(seed), ClassifierRegistry::standard()?))
    }

    fn with_parts(rng: StdRng, classifiers: ClassifierRegistry) -> Self {
        Self {
            state: RwLock::new(CardState::default()),
            rng: Mutex::new(rng),
            classifiers,
        }
    }

    /// Replace the classifiers used to evaluate category filters.
    #[must_use]
    pub fn with_classifiers(mut self, classifiers: ClassifierRegistry) -> Self {
        self.classifiers = classifiers;
        self
    }

    /// Insert a card. Returns error if the ID already exists.
    pub fn insert(&self, card: CardRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("card.insert"))?;
        if state.by_id.contains_key(&card.id) {
            return Err(RepositoryError::DuplicateKey(card.id.to_string()));
        }
        state
            .by_name
            .entry(card.name.clone())
            .or_insert_with(|| card.id.clone());
        state.order.push(card.id.clone());
        state.by_id.insert(card.id.clone(), card);
        Ok(())
    }

    /// Insert many cards, stopping at the first duplicate.
    pub fn insert_all(
        &self,
        cards: impl IntoIterator<Item = CardRecord>,
    ) -> Result<(), RepositoryError> {
        for card in cards {
            self.insert(card)?;
        }
        Ok(())
    }

    /// Number of stored cards.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("card.len"))?;
        Ok(state.by_id.len())
    }

    /// Returns true if no cards are stored.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl CardRepository for InMemoryCardRepository {
    fn find_by_id(&self, id: &CardId) -> Result<Option<CardRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("card.find_by_id"))?;
        Ok(state.by_id.get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<CardRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("card.find_by_name"))?;
        Ok(state
            .by_name
            .get(name)
            .and_then(|id| state.by_id.get(id))
            .cloned())
    }

    fn sample(&self, query: &CardQuery) -> Result<Vec<CardRecord>, RepositoryError> {
        if query.is_vacuous() {
            return Ok(Vec::new());
        }

        let state = self.state.read().map_err(|_| lock_err("card.sample"))?;
        let mut rng = self.rng.lock().map_err(|_| lock_err("card.sample.rng"))?;

        // Reservoir selection keeps order only partly random, so shuffle the picks.
        let mut chosen: Vec<&CardRecord> = state
            .in_order()
            .filter(|card| query.admits(card))
            .filter(|card| self.classifiers.matches(query.category, card))
            .choose_multiple(&mut *rng, query.limit);
        chosen.shuffle(&mut *rng);
        Ok(chosen.into_iter().cloned().collect())
    }

    fn search_by_name(
        &self,
        fragment: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CardRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("card.search_by_name"))?;
        Ok(state
            .in_order()
            .filter(|card| contains_ignore_ascii_case(&card.name, fragment))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn list_commanders(&self, filter: &CommanderFilter) -> Result<Vec<CardRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("card.list_commanders"))?;
        Ok(state
            .in_order()
            .filter(|card| filter.admits(card))
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::category::Category;
    use crate::color::{Color, ColorIdentity};

    fn seeded() -> InMemoryCardRepository {
        let repo = InMemoryCardRepository::with_seed(7).unwrap();
        for i in 0..20 {
            repo.insert(
                CardRecord::new(format!("art-{i}"), format!("Signet {i}"), "Artifact", Some(f64::from(i)))
                    .with_colors("['U']"),
            )
            .unwrap();
        }
        repo.insert(CardRecord::new("forest", "Forest", "Basic Land — Forest", Some(0.2)))
            .unwrap();
        repo.insert(
            CardRecord::new("bolt", "Lightning Bolt", "Instant", Some(1.0))
                .with_colors("['R']")
                .with_oracle_text("Lightning Bolt deals 3 damage to any target."),
        )
        .unwrap();
        repo
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let repo = InMemoryCardRepository::new().unwrap();
        repo.insert(CardRecord::new("a", "A", "Land", None)).unwrap();
        let err = repo.insert(CardRecord::new("a", "A2", "Land", None)).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateKey(_)));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn test_find_by_id_and_name() {
        let repo = seeded();
        let forest = repo.find_by_name("Forest").unwrap().unwrap();
        assert_eq!(forest.id, CardId::new("forest"));
        assert!(repo.find_by_name("forest").unwrap().is_none());
        assert!(repo.find_by_id(&CardId::new("bolt")).unwrap().is_some());
        assert!(repo.find_by_id(&CardId::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_sample_respects_limit_price_and_category() {
        let repo = seeded();
        let query = CardQuery::new(
            ColorIdentity::from_colors([Color::Blue]),
            Category::Ramp,
            9.0,
            5,
        );
        let cards = repo.sample(&query).unwrap();
        assert_eq!(cards.len(), 5);
        assert!(cards.iter().all(|c| c.price() <= 9.0));
        assert!(cards.iter().all(|c| c.type_line == "Artifact"));
    }

    #[test]
    fn test_sample_filters_colors() {
        let repo = seeded();
        let query = CardQuery::new(
            ColorIdentity::from_colors([Color::Green]),
            Category::Interaction,
            100.0,
            10,
        );
        assert!(repo.sample(&query).unwrap().is_empty());
    }

    #[test]
    fn test_comma_joined_colors_are_filtered() {
        let repo = InMemoryCardRepository::with_seed(3).unwrap();
        repo.insert_all([
            CardRecord::new("bolt", "Lightning Bolt", "Instant", Some(1.0)).with_colors("R"),
            CardRecord::new("helix", "Lightning Helix", "Instant", Some(1.0)).with_colors("R,W"),
            CardRecord::new("brago", "Brago, King Eternal", "Legendary Creature — Spirit", Some(2.0))
                .with_colors("W,U"),
        ])
        .unwrap();

        let white = ColorIdentity::from_colors([Color::White]);
        let query = CardQuery::new(white.clone(), Category::Interaction, 100.0, 10);
        let ids: Vec<_> = repo.sample(&query).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CardId::new("helix")]);

        let filter = CommanderFilter {
            colors: white,
            ..CommanderFilter::default()
        };
        let commanders = repo.list_commanders(&filter).unwrap();
        assert_eq!(commanders.len(), 1);
        assert_eq!(commanders[0].id, CardId::new("brago"));
    }

    #[test]
    fn test_sample_negative_budget_matches_nothing() {
        let repo = seeded();
        let query = CardQuery::new(ColorIdentity::colorless(), Category::Synergy, -1.0, 10);
        assert!(repo.sample(&query).unwrap().is_empty());
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        let a = seeded();
        let b = seeded();
        let query = CardQuery::new(ColorIdentity::colorless(), Category::Synergy, 100.0, 8);
        let ids_a: Vec<_> = a.sample(&query).unwrap().into_iter().map(|c| c.id).collect();
        let ids_b: Vec<_> = b.sample(&query).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_search_by_name_paginates() {
        let repo = seeded();
        let first = repo.search_by_name("signet", 5, 0).unwrap();
        let second = repo.search_by_name("signet", 5, 5).unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        assert_eq!(first[0].name, "Signet 0");
        assert_eq!(second[0].name, "Signet 5");
        assert!(repo.search_by_name("signet", 50, 100).unwrap().is_empty());
    }

    #[test]
    fn test_list_commanders() {
        let repo = seeded();
        repo.insert(
            CardRecord::new("krenko", "Krenko, Mob Boss", "Legendary Creature — Goblin Warrior", Some(2.0))
                .with_colors("['R']"),
        )
        .unwrap();
        let all = repo.list_commanders(&CommanderFilter::default()).unwrap();
        assert_eq!(all.len(), 1);

        let blue = CommanderFilter {
            colors: ColorIdentity::from_colors([Color::Blue]),
            ..CommanderFilter::default()
        };
        assert!(repo.list_commanders(&blue).unwrap().is_empty());
    }
}
