//! Card types.
//!
//! A [`CardRecord`] is a full row as the repository stores it. A [`Card`] is
//! the slimmer entry placed in a deck, carrying the category it was picked
//! for and, for basic lands, how many copies it stands for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::color::ColorIdentity;

/// Identifier of a card in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A card as stored in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    /// Colors as stored: a serialized list or comma-joined symbols.
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub price_usd: Option<f64>,
}

impl CardRecord {
    /// Creates a record with the fields the generator reads; the rest are empty.
    #[must_use]
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        type_line: impl Into<String>,
        price_usd: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mana_cost: None,
            type_line: type_line.into(),
            oracle_text: None,
            power: None,
            toughness: None,
            colors: None,
            rarity: None,
            set_name: None,
            image_uri: None,
            price_usd,
        }
    }

    /// Sets the oracle text.
    #[must_use]
    pub fn with_oracle_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = Some(text.into());
        self
    }

    /// Sets the stored color field.
    #[must_use]
    pub fn with_colors(mut self, colors: impl Into<String>) -> Self {
        self.colors = Some(colors.into());
        self
    }

    /// Colors of this card read as a commander identity. Only list forms
    /// count; see [`ColorIdentity::parse`].
    #[must_use]
    pub fn color_identity(&self) -> ColorIdentity {
        ColorIdentity::parse(self.colors.as_deref())
    }

    /// Colors of this card for catalog filtering. Also reads comma-joined
    /// symbols; see [`ColorIdentity::from_card_field`].
    #[must_use]
    pub fn card_colors(&self) -> ColorIdentity {
        ColorIdentity::from_card_field(self.colors.as_deref())
    }

    /// Price used for budgeting; a missing price counts as free.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.price_usd.unwrap_or(0.0)
    }

    /// Oracle text, or empty when the card has none.
    #[must_use]
    pub fn oracle(&self) -> &str {
        self.oracle_text.as_deref().unwrap_or_default()
    }
}

/// A card placed in a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type")]
    pub type_line: String,
    pub price: f64,
    pub category: Category,
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

impl Card {
    /// Builds a single-copy deck entry from a stored record.
    #[must_use]
    pub fn from_record(record: CardRecord, category: Category) -> Self {
        let price = record.price();
        Self {
            id: record.id,
            name: record.name,
            type_line: record.type_line,
            price,
            category,
            count: 1,
        }
    }

    /// Sets how many copies this entry stands for (basic lands only).
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    /// Price of every copy this entry stands for.
    #[must_use]
    pub fn line_price(&self) -> f64 {
        self.price * f64::from(self.count)
    }
}

/// The commander a deck is built around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commander {
    pub id: CardId,
    pub name: String,
    pub colors: ColorIdentity,
    pub oracle_text: Option<String>,
}

impl Commander {
    /// Resolves the commander view of a stored card.
    #[must_use]
    pub fn from_record(record: &CardRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            colors: record.color_identity(),
            oracle_text: record.oracle_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_missing_price_counts_as_free() {
        let record = CardRecord::new("sol-ring", "Sol Ring", "Artifact", None);
        assert_eq!(record.price(), 0.0);

        let card = Card::from_record(record, Category::Ramp);
        assert_eq!(card.price, 0.0);
        assert_eq!(card.count, 1);
    }

    #[test]
    fn test_line_price_multiplies_count() {
        let record = CardRecord::new("plains", "Plains", "Basic Land — Plains", Some(0.25));
        let card = Card::from_record(record, Category::Lands).with_count(12);
        assert!((card.line_price() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_count_never_drops_below_one() {
        let record = CardRecord::new("wastes", "Wastes", "Basic Land", Some(0.1));
        let card = Card::from_record(record, Category::Lands).with_count(0);
        assert_eq!(card.count, 1);
    }

    #[test]
    fn test_commander_resolves_colors() {
        let record = CardRecord::new("atraxa", "Atraxa", "Legendary Creature", Some(20.0))
            .with_colors("['W', 'U', 'B', 'G']")
            .with_oracle_text("Flying, vigilance, deathtouch, lifelink");
        let commander = Commander::from_record(&record);
        assert_eq!(commander.name, "Atraxa");
        assert_eq!(commander.colors.len(), 4);
        assert!(commander.colors.contains(Color::Green));
        assert!(!commander.colors.contains(Color::Red));
    }

    #[test]
    fn test_card_serializes_type_and_category() {
        let record = CardRecord::new("bolt", "Lightning Bolt", "Instant", Some(1.5));
        let card = Card::from_record(record, Category::Interaction);
        let v = serde_json::to_value(&card).unwrap();
        assert_eq!(v["type"], "Instant");
        assert_eq!(v["category"], "interaction");
        assert_eq!(v["count"], 1);
    }
}
