//! Deck assembly engine.
//!
//! This module provides a synchronous assembler that builds one deck per call
//! against a pluggable [`CardRepository`]. A build is a single pass with no
//! backtracking:
//!
//! 1. resolve the commander and its color identity
//! 2. add utility lands, priced against the full ceiling
//! 3. add basic lands for the rest of the land target
//! 4. settle the remaining budget
//! 5. fill each category in configured order
//! 6. recompute the total price from the final card list

/// Bounded worker pool for concurrent builds.
pub mod runtime;

use std::sync::Arc;

use crate::card::{CardId, Commander};
use crate::color::ColorIdentity;
use crate::config::AllocationConfig;
use crate::deck::{Deck, DeckConstraints, DeckDraft};
use crate::error::{DeckResult, ExecutionError, ValidationError};
use crate::land::LandPlanner;
use crate::selector::{CategoryFill, CategorySelector};
use crate::storage::CardRepository;

/// Builds budget-constrained decks.
#[derive(Clone)]
pub struct DeckAssembler {
    repository: Arc<dyn CardRepository>,
    config: AllocationConfig,
}

impl DeckAssembler {
    /// Create an assembler with the default allocation.
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self::with_config(repository, AllocationConfig::default())
    }

    /// Create an assembler with a custom allocation.
    pub fn with_config(repository: Arc<dyn CardRepository>, config: AllocationConfig) -> Self {
        Self { repository, config }
    }

    /// The repository cards are drawn from.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn CardRepository> {
        &self.repository
    }

    /// The allocation in use.
    #[must_use]
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Looks up a commander and resolves its color identity.
    pub fn resolve_commander(&self, commander_id: &CardId) -> DeckResult<Commander> {
        if commander_id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyCommanderId.into());
        }
        let record = self.repository.find_by_id(commander_id)?.ok_or_else(|| {
            ExecutionError::CommanderNotFound {
                id: commander_id.clone(),
            }
        })?;
        Ok(Commander::from_record(&record))
    }

    /// Builds a deck for `commander_id`.
    ///
    /// Fails only on invalid input, an unknown commander, or a repository
    /// error. A deck with fewer than the maximum entries is still a success.
    pub fn build(&self, commander_id: &CardId, constraints: &DeckConstraints) -> DeckResult<Deck> {
        constraints.validate()?;
        let commander = self.resolve_commander(commander_id)?;
        Ok(self.build_for(&commander, constraints)?.0)
    }

    /// Builds a deck for an already resolved commander, also returning the
    /// per-category fill results.
    pub fn build_for(
        &self,
        commander: &Commander,
        constraints: &DeckConstraints,
    ) -> DeckResult<(Deck, Vec<CategoryFill>)> {
        constraints.validate()?;
        let identity: &ColorIdentity = &commander.colors;
        tracing::info!(
            commander = %commander.id,
            colors = %identity,
            max_price = constraints.max_price,
            "building deck"
        );

        let repository = self.repository.as_ref();
        let lands = LandPlanner::new(
            repository,
            self.config.land_target,
            self.config.utility_land_limit,
        );
        let mut draft = DeckDraft::new(constraints.max_price, self.config.max_deck_entries);

        let utility = lands.utility_lands(identity, constraints.max_price)?;
        let utility_count = draft.push_lands(utility);

        let plan = lands.plan_basics(identity, utility_count);
        let basics = lands.basic_lands(&plan)?;
        draft.push_lands(basics);
        tracing::debug!(utility = utility_count, basics = plan.total(), "lands planned");

        let remaining = draft.settle_budget();
        tracing::debug!(remaining, "budget after lands");

        let selector = CategorySelector::new(repository);
        let mut fills = Vec::with_capacity(self.config.quotas.len());
        for quota in &self.config.quotas {
            fills.push(selector.fill(&mut draft, identity, *quota)?);
        }

        let deck = draft.into_deck(
            commander.id.clone(),
            commander.name.clone(),
            identity.clone(),
            constraints.clone(),
        );
        tracing::info!(
            commander = %commander.id,
            entries = deck.len(),
            cards = deck.card_count(),
            total_price = deck.total_price,
            "deck built"
        );
        Ok((deck, fills))
    }
}
