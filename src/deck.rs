//! Deck types and the in-progress draft used during assembly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::{Card, CardId};
use crate::category::Category;
use crate::color::ColorIdentity;
use crate::error::ValidationError;

/// Price ceiling used when a caller does not name one.
pub const DEFAULT_MAX_PRICE: f64 = 1_000_000.0;

/// Maximum length accepted for the free-form strategy hint.
const MAX_STRATEGY_LEN: usize = 256;

/// Unique identifier for a generated deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(Uuid);

impl DeckId {
    /// Creates a new random deck ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeckId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied limits for a build.
///
/// `power_level` and `strategy` are carried through to the deck untouched;
/// they do not influence card selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConstraints {
    pub max_price: f64,
    #[serde(default)]
    pub power_level: Option<i32>,
    #[serde(default)]
    pub strategy: Option<String>,
}

impl Default for DeckConstraints {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PRICE)
    }
}

impl DeckConstraints {
    #[must_use]
    pub fn new(max_price: f64) -> Self {
        Self {
            max_price,
            power_level: None,
            strategy: None,
        }
    }

    #[must_use]
    pub fn with_power_level(mut self, power_level: i32) -> Self {
        self.power_level = Some(power_level);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Rejects NaN, infinite or negative ceilings. Zero is allowed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.max_price.is_finite() || self.max_price < 0.0 {
            return Err(ValidationError::InvalidMaxPrice {
                value: self.max_price,
            });
        }
        if let Some(strategy) = &self.strategy {
            if strategy.len() > MAX_STRATEGY_LEN {
                return Err(ValidationError::FieldTooLong {
                    field: "strategy".to_string(),
                    max_length: MAX_STRATEGY_LEN,
                });
            }
        }
        Ok(())
    }
}

/// Notes attached to a deck by an enhancer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckAnalysis {
    pub suggestions: Vec<String>,
    pub synergies: Vec<String>,
    pub strategy: String,
    pub ai_enhanced: bool,
}

/// A generated deck. The commander itself is not part of `cards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub commander: String,
    pub commander_id: CardId,
    pub colors: ColorIdentity,
    pub cards: Vec<Card>,
    pub total_price: f64,
    pub constraints: DeckConstraints,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DeckAnalysis>,
}

impl Deck {
    /// `Σ price × count` over the current cards.
    #[must_use]
    pub fn computed_total(&self) -> f64 {
        sum_prices(&self.cards)
    }

    /// Resets `total_price` from the cards and returns it.
    pub fn recompute_total(&mut self) -> f64 {
        self.total_price = self.computed_total();
        self.total_price
    }

    /// Number of entries, one per distinct card line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of physical cards, counting every basic land copy.
    #[must_use]
    pub fn card_count(&self) -> u32 {
        self.cards.iter().map(|c| c.count).sum()
    }

    /// Returns true once the deck holds `max_entries` entries.
    #[must_use]
    pub fn is_complete(&self, max_entries: usize) -> bool {
        self.cards.len() >= max_entries
    }

    /// Entries tagged with `category`.
    pub fn cards_in(&self, category: Category) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.category == category)
    }

    /// Stable digest over the ordered `(id, count)` pairs.
    ///
    /// Two builds that picked the same cards in the same order share a
    /// fingerprint regardless of deck id or timestamp.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.commander_id.as_str().as_bytes());
        for card in &self.cards {
            hasher.update(&[0]);
            hasher.update(card.id.as_str().as_bytes());
            hasher.update(&card.count.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

fn sum_prices(cards: &[Card]) -> f64 {
    cards.iter().map(Card::line_price).sum()
}

/// Why a card was turned away by [`DeckDraft::try_admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The deck already holds the maximum number of entries.
    DeckFull,
    /// The remaining budget is zero or negative.
    BudgetExhausted,
    /// The card costs more than the remaining budget.
    OverBudget,
}

/// Mutable deck state during a single build.
#[derive(Debug, Clone)]
pub struct DeckDraft {
    cards: Vec<Card>,
    max_price: f64,
    remaining_budget: f64,
    max_entries: usize,
}

impl DeckDraft {
    #[must_use]
    pub fn new(max_price: f64, max_entries: usize) -> Self {
        Self {
            cards: Vec::new(),
            max_price,
            remaining_budget: max_price,
            max_entries,
        }
    }

    /// Appends lands without a budget check. Returns how many fit.
    pub fn push_lands(&mut self, lands: impl IntoIterator<Item = Card>) -> usize {
        let mut added = 0;
        for land in lands {
            if self.is_full() {
                tracing::debug!(land = %land.name, "deck full, dropping land");
                continue;
            }
            self.cards.push(land);
            added += 1;
        }
        added
    }

    /// Sets the remaining budget to `max_price` minus everything added so far.
    ///
    /// The result may be negative; it is not clamped.
    pub fn settle_budget(&mut self) -> f64 {
        self.remaining_budget = self.max_price - sum_prices(&self.cards);
        self.remaining_budget
    }

    #[must_use]
    pub fn remaining_budget(&self) -> f64 {
        self.remaining_budget
    }

    #[must_use]
    pub fn budget_exhausted(&self) -> bool {
        self.remaining_budget <= 0.0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.max_entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Adds a card if the deck has room and the budget covers it, charging
    /// its price against the remaining budget.
    pub fn try_admit(&mut self, card: Card) -> Result<(), Rejection> {
        if self.is_full() {
            return Err(Rejection::DeckFull);
        }
        if self.budget_exhausted() {
            return Err(Rejection::BudgetExhausted);
        }
        let cost = card.line_price();
        if cost > self.remaining_budget {
            return Err(Rejection::OverBudget);
        }
        self.remaining_budget -= cost;
        self.cards.push(card);
        Ok(())
    }

    /// Finalizes into a deck with a freshly computed total.
    #[must_use]
    pub fn into_deck(
        self,
        commander_id: CardId,
        commander: String,
        colors: ColorIdentity,
        constraints: DeckConstraints,
    ) -> Deck {
        let mut deck = Deck {
            id: DeckId::new(),
            commander,
            commander_id,
            colors,
            cards: self.cards,
            total_price: 0.0,
            constraints,
            generated_at: Utc::now(),
            analysis: None,
        };
        deck.recompute_total();
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::card::CardRecord;

    fn card(id: &str, price: f64, category: Category) -> Card {
        Card::from_record(CardRecord::new(id, id, "Artifact", Some(price)), category)
    }

    #[test]
    fn test_constraints_validate() {
        assert!(DeckConstraints::new(0.0).validate().is_ok());
        assert!(DeckConstraints::new(250.0).validate().is_ok());
        assert!(DeckConstraints::new(-1.0).validate().is_err());
        assert!(DeckConstraints::new(f64::NAN).validate().is_err());
        assert!(DeckConstraints::new(f64::INFINITY).validate().is_err());

        let long = DeckConstraints::new(10.0).with_strategy("x".repeat(300));
        assert!(matches!(
            long.validate(),
            Err(ValidationError::FieldTooLong { .. })
        ));
    }

    #[test]
    fn test_constraints_defaults_from_json() {
        let c: DeckConstraints = serde_json::from_str(r#"{"max_price": 50.0}"#).unwrap();
        assert_eq!(c.max_price, 50.0);
        assert!(c.power_level.is_none());
        assert!(c.strategy.is_none());
    }

    #[test]
    fn test_draft_admission_rules() {
        let mut draft = DeckDraft::new(10.0, 3);
        assert_eq!(draft.try_admit(card("a", 4.0, Category::Ramp)), Ok(()));
        assert_eq!(
            draft.try_admit(card("b", 7.0, Category::Ramp)),
            Err(Rejection::OverBudget)
        );
        assert_eq!(draft.try_admit(card("c", 6.0, Category::Ramp)), Ok(()));
        assert!(draft.budget_exhausted());
        assert_eq!(
            draft.try_admit(card("d", 0.0, Category::Ramp)),
            Err(Rejection::BudgetExhausted)
        );
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_draft_stops_at_max_entries() {
        let mut draft = DeckDraft::new(100.0, 2);
        assert!(draft.try_admit(card("a", 1.0, Category::Synergy)).is_ok());
        assert!(draft.try_admit(card("b", 1.0, Category::Synergy)).is_ok());
        assert_eq!(
            draft.try_admit(card("c", 1.0, Category::Synergy)),
            Err(Rejection::DeckFull)
        );
        assert_eq!(draft.push_lands([card("l", 0.0, Category::Lands)]), 0);
    }

    #[test]
    fn test_settle_budget_can_go_negative() {
        let mut draft = DeckDraft::new(5.0, 99);
        draft.push_lands([card("land", 2.0, Category::Lands).with_count(4)]);
        assert_eq!(draft.settle_budget(), -3.0);
        assert!(draft.budget_exhausted());
    }

    #[test]
    fn test_deck_total_is_recomputed_and_idempotent() {
        let mut draft = DeckDraft::new(100.0, 99);
        draft.push_lands([card("forest", 0.25, Category::Lands).with_count(20)]);
        draft.settle_budget();
        draft.try_admit(card("sol", 1.5, Category::Ramp)).unwrap();

        let mut deck = draft.into_deck(
            CardId::new("cmdr"),
            "Commander".to_string(),
            ColorIdentity::colorless(),
            DeckConstraints::default(),
        );
        assert!((deck.total_price - 6.5).abs() < 1e-9);
        assert_eq!(deck.card_count(), 21);
        assert_eq!(deck.len(), 2);
        let first = deck.recompute_total();
        let second = deck.recompute_total();
        assert_eq!(first, second);
        assert_eq!(deck.cards_in(Category::Lands).count(), 1);
    }

    #[test]
    fn test_fingerprint_ignores_id_and_time() {
        let draft = {
            let mut d = DeckDraft::new(100.0, 99);
            d.try_admit(card("a", 1.0, Category::Ramp)).unwrap();
            d
        };
        let a = draft.clone().into_deck(
            CardId::new("c"),
            "C".to_string(),
            ColorIdentity::colorless(),
            DeckConstraints::default(),
        );
        let b = draft.into_deck(
            CardId::new("c"),
            "C".to_string(),
            ColorIdentity::colorless(),
            DeckConstraints::default(),
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
