//! Post-assembly deck enhancement.

use crate::card::Commander;
use crate::deck::{Deck, DeckAnalysis};

/// Adds analysis to a finished deck.
///
/// Enhancers run after assembly and must not change the card list or its
/// total price.
pub trait DeckEnhancer: Send + Sync {
    /// Returns the deck with analysis attached.
    fn enhance(&self, deck: Deck, commander: &Commander) -> Deck;
}

/// Enhancer that tags a deck with a fixed, color-based strategy note.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEnhancer;

impl DeckEnhancer for BasicEnhancer {
    fn enhance(&self, mut deck: Deck, commander: &Commander) -> Deck {
        tracing::debug!(commander = %commander.id, "applying basic analysis");
        deck.analysis = Some(DeckAnalysis {
            suggestions: Vec::new(),
            synergies: Vec::new(),
            strategy: "Basic strategy based on commander colors".to_string(),
            ai_enhanced: false,
        });
        deck
    }
}
