//! Deck service facade.
//!
//! Wraps the assembler and an enhancer, and exposes the catalog lookups a
//! client needs to pick a commander before asking for a deck.

use std::sync::Arc;

use crate::card::{CardId, CardRecord};
use crate::config::AllocationConfig;
use crate::deck::{Deck, DeckConstraints};
use crate::engine::DeckAssembler;
use crate::enhance::{BasicEnhancer, DeckEnhancer};
use crate::error::{DeckResult, ExecutionError, ValidationError};
use crate::storage::{CardRepository, CommanderFilter};

/// Default page size for searches and listings.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: usize = 500;

/// Entry point for deck generation and card lookups.
pub struct DeckService {
    assembler: DeckAssembler,
    enhancer: Arc<dyn DeckEnhancer>,
}

impl DeckService {
    /// Service with the default allocation and [`BasicEnhancer`].
    pub fn new(repository: Arc<dyn CardRepository>) -> Self {
        Self::with_assembler(DeckAssembler::new(repository))
    }

    /// Service with a custom allocation.
    pub fn with_config(repository: Arc<dyn CardRepository>, config: AllocationConfig) -> Self {
        Self::with_assembler(DeckAssembler::with_config(repository, config))
    }

    fn with_assembler(assembler: DeckAssembler) -> Self {
        Self {
            assembler,
            enhancer: Arc::new(BasicEnhancer),
        }
    }

    /// Replaces the enhancer.
    #[must_use]
    pub fn with_enhancer(mut self, enhancer: Arc<dyn DeckEnhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    #[must_use]
    pub fn assembler(&self) -> &DeckAssembler {
        &self.assembler
    }

    /// Builds a deck and runs the enhancer over it.
    pub fn generate_deck(&self, commander_id: &CardId, constraints: &DeckConstraints) -> DeckResult<Deck> {
        constraints.validate()?;
        let commander = self.assembler.resolve_commander(commander_id)?;
        let (deck, _) = self.assembler.build_for(&commander, constraints)?;
        Ok(self.enhancer.enhance(deck, &commander))
    }

    /// Full record for a card.
    pub fn get_card(&self, id: &CardId) -> DeckResult<CardRecord> {
        self.assembler
            .repository()
            .find_by_id(id)?
            .ok_or_else(|| ExecutionError::CardNotFound { id: id.clone() }.into())
    }

    /// Cards whose name contains `term`.
    pub fn search_cards(&self, term: &str, limit: usize, offset: usize) -> DeckResult<Vec<CardRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ValidationError::EmptySearchTerm.into());
        }
        Ok(self
            .assembler
            .repository()
            .search_by_name(term, clamp_page(limit), offset)?)
    }

    /// Commander-eligible cards matching `filter`.
    pub fn list_commanders(&self, filter: &CommanderFilter) -> DeckResult<Vec<CardRecord>> {
        let mut filter = filter.clone();
        filter.limit = clamp_page(filter.limit);
        Ok(self.assembler.repository().list_commanders(&filter)?)
    }
}

fn clamp_page(limit: usize) -> usize {
    limit.min(MAX_PAGE_SIZE)
}
