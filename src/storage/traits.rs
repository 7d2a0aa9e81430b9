//! Abstract card repository for deckgen.
//!
//! The generator only ever reads cards. By using a trait, we enable:
//! - In-memory backends for testing and embedded use, with seedable sampling
//! - A SQLite backend over a card catalog table

use thiserror::Error;

use crate::card::{CardId, CardRecord};
use crate::category::Category;
use crate::color::ColorIdentity;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Repository backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Connection failed.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A category classifier failed to build.
    #[error("Classifier error: {0}")]
    ClassifierError(String),
}

impl From<regex::Error> for RepositoryError {
    fn from(err: regex::Error) -> Self {
        Self::ClassifierError(err.to_string())
    }
}

/// A bounded, randomized sample request.
#[derive(Debug, Clone, PartialEq)]
pub struct CardQuery {
    /// Deck identity. Cards must share a color with it or be colorless.
    /// A colorless identity applies no color filter.
    pub colors: ColorIdentity,
    /// Inclusive price ceiling. Negative ceilings match nothing.
    pub max_price: f64,
    /// Category whose classifier a card must satisfy.
    pub category: Category,
    /// Maximum number of cards returned.
    pub limit: usize,
}

impl CardQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(colors: ColorIdentity, category: Category, max_price: f64, limit: usize) -> Self {
        Self {
            colors,
            max_price,
            category,
            limit,
        }
    }

    /// True when the query cannot match anything.
    #[must_use]
    pub fn is_vacuous(&self) -> bool {
        self.limit == 0 || self.max_price.is_nan() || self.max_price < 0.0
    }

    /// Color and price checks shared by every backend.
    #[must_use]
    pub fn admits(&self, card: &CardRecord) -> bool {
        if card.price() > self.max_price {
            return false;
        }
        if self.colors.is_colorless() {
            return true;
        }
        let card_colors = card.card_colors();
        card_colors.is_colorless() || card_colors.intersects(&self.colors)
    }
}

/// Filters for listing commander-eligible cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommanderFilter {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    /// Every listed color must be among the card's colors.
    pub colors: ColorIdentity,
    pub limit: usize,
    pub offset: usize,
}

impl Default for CommanderFilter {
    fn default() -> Self {
        Self {
            name: None,
            colors: ColorIdentity::colorless(),
            limit: 50,
            offset: 0,
        }
    }
}

impl CommanderFilter {
    /// Returns true if the card may lead a deck and passes the filters.
    #[must_use]
    pub fn admits(&self, card: &CardRecord) -> bool {
        let type_line = card.type_line.to_ascii_lowercase();
        let eligible = type_line.contains("legendary creature")
            || (type_line.contains("legendary")
                && card
                    .oracle()
                    .to_ascii_lowercase()
                    .contains("can be your commander"));
        if !eligible {
            return false;
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if !contains_ignore_ascii_case(&card.name, name) {
                return false;
            }
        }
        card.card_colors().contains_all(&self.colors)
    }
}

pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Read-side contract between the generator and a card catalog.
///
/// Implementations must be safe to share across concurrent builds.
pub trait CardRepository: Send + Sync {
    /// Get a card by ID.
    fn find_by_id(&self, id: &CardId) -> Result<Option<CardRecord>, RepositoryError>;

    /// Find a card by exact name. Used to resolve basic lands.
    fn find_by_name(&self, name: &str) -> Result<Option<CardRecord>, RepositoryError>;

    /// Random sample of at most `query.limit` cards matching the query.
    fn sample(&self, query: &CardQuery) -> Result<Vec<CardRecord>, RepositoryError>;

    /// Cards whose name contains `fragment`, paginated in storage order.
    fn search_by_name(
        &self,
        fragment: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CardRecord>, RepositoryError>;

    /// Commander-eligible cards matching the filter, paginated in storage order.
    fn list_commanders(&self, filter: &CommanderFilter) -> Result<Vec<CardRecord>, RepositoryError>;
}
