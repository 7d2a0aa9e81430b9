//! Deck-role categories and the classifiers that recognize them.
//!
//! A classifier is a pure predicate over a card's type line and oracle text.
//! The standard set is a coarse substring matcher; it can be swapped per
//! category through [`ClassifierRegistry::with`] without touching the
//! assembler.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::card::CardRecord;

/// The role a card fills in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Utility and basic lands.
    Lands,
    Ramp,
    CardDraw,
    Removal,
    BoardWipes,
    Interaction,
    /// Filler; matches any card.
    Synergy,
}

impl Category {
    /// Non-land categories in fill order.
    pub const FILL_ORDER: [Category; 6] = [
        Category::Ramp,
        Category::CardDraw,
        Category::Removal,
        Category::BoardWipes,
        Category::Interaction,
        Category::Synergy,
    ];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lands => "lands",
            Self::Ramp => "ramp",
            Self::CardDraw => "card_draw",
            Self::Removal => "removal",
            Self::BoardWipes => "board_wipes",
            Self::Interaction => "interaction",
            Self::Synergy => "synergy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lands" => Ok(Self::Lands),
            "ramp" => Ok(Self::Ramp),
            "card_draw" => Ok(Self::CardDraw),
            "removal" => Ok(Self::Removal),
            "board_wipes" => Ok(Self::BoardWipes),
            "interaction" => Ok(Self::Interaction),
            "synergy" => Ok(Self::Synergy),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Decides whether a card belongs to a category.
pub trait CardClassifier: Send + Sync {
    /// Returns true if the card fits.
    fn matches(&self, card: &CardRecord) -> bool;
}

/// Matches every card.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyCard;

impl CardClassifier for AnyCard {
    fn matches(&self, _card: &CardRecord) -> bool {
        true
    }
}

/// Regex classifier over the type line and oracle text.
///
/// A card matches when any type-line or oracle pattern hits and no exclusion
/// pattern hits the type line. Patterns are case-insensitive and `.` spans
/// line breaks, so `draw.*card` behaves like `LIKE '%draw%card%'`.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    type_line: Vec<Regex>,
    oracle: Vec<Regex>,
    type_line_exclude: Vec<Regex>,
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

impl PatternClassifier {
    /// Creates a classifier that matches nothing until patterns are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type-line pattern.
    pub fn type_line(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.type_line.push(compile(pattern)?);
        Ok(self)
    }

    /// Adds an oracle-text pattern.
    pub fn oracle(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.oracle.push(compile(pattern)?);
        Ok(self)
    }

    /// Adds a type-line pattern that vetoes a match.
    pub fn exclude_type_line(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.type_line_exclude.push(compile(pattern)?);
        Ok(self)
    }
}

impl CardClassifier for PatternClassifier {
    fn matches(&self, card: &CardRecord) -> bool {
        if self.type_line_exclude.iter().any(|re| re.is_match(&card.type_line)) {
            return false;
        }
        let oracle = card.oracle();
        self.type_line.iter().any(|re| re.is_match(&card.type_line))
            || self.oracle.iter().any(|re| re.is_match(oracle))
    }
}

static STANDARD: LazyLock<Result<ClassifierRegistry, regex::Error>> =
    LazyLock::new(ClassifierRegistry::compile_standard);

/// Category to classifier mapping.
///
/// Categories without an entry match every card.
#[derive(Clone)]
pub struct ClassifierRegistry {
    classifiers: HashMap<Category, Arc<dyn CardClassifier>>,
}

impl fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.classifiers.keys().collect();
        keys.sort();
        f.debug_struct("ClassifierRegistry")
            .field("categories", &keys)
            .finish()
    }
}

impl ClassifierRegistry {
    /// A registry with no classifiers; every category matches every card.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            classifiers: HashMap::new(),
        }
    }

    /// The standard substring classifiers. Compiled once per process.
    ///
    /// # Errors
    /// Returns the compile error if a built-in pattern is rejected.
    pub fn standard() -> Result<Self, regex::Error> {
        STANDARD.clone()
    }

    fn compile_standard() -> Result<Self, regex::Error> {
        Ok(Self::empty()
            .with(
                Category::Lands,
                PatternClassifier::new()
                    .type_line("land")?
                    .exclude_type_line("basic land")?,
            )
            .with(
                Category::Ramp,
                PatternClassifier::new()
                    .type_line("artifact")?
                    .oracle("search.*library.*land")?,
            )
            .with(Category::CardDraw, PatternClassifier::new().oracle("draw.*card")?)
            .with(
                Category::Removal,
                PatternClassifier::new().oracle("destroy")?.oracle("exile")?,
            )
            .with(
                Category::BoardWipes,
                PatternClassifier::new()
                    .oracle("destroy all")?
                    .oracle("exile all")?,
            )
            .with(
                Category::Interaction,
                PatternClassifier::new().type_line("instant")?.type_line("flash")?,
            )
            .with(Category::Synergy, AnyCard))
    }

    /// Sets the classifier for a category, replacing any existing one.
    #[must_use]
    pub fn with(mut self, category: Category, classifier: impl CardClassifier + 'static) -> Self {
        self.classifiers.insert(category, Arc::new(classifier));
        self
    }

    /// Returns true if the card fits the category.
    #[must_use]
    pub fn matches(&self, category: Category, card: &CardRecord) -> bool {
        self.classifiers
            .get(&category)
            .map_or(true, |c| c.matches(card))
    }
}
