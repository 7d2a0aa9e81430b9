//! Allocation settings for deck generation.
//!
//! The defaults describe a standard 100-card Commander deck: 38 lands, at
//! most 18 of them utility lands, and 99 entries besides the commander.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::ValidationError;

/// Target sample size for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryQuota {
    pub category: Category,
    pub target: usize,
}

impl CategoryQuota {
    #[must_use]
    pub const fn new(category: Category, target: usize) -> Self {
        Self { category, target }
    }
}

/// Numbers that shape a generated deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Total lands aimed for, utility and basic combined.
    pub land_target: u32,
    /// Maximum utility lands sampled.
    pub utility_land_limit: usize,
    /// Maximum deck entries, commander excluded.
    pub max_deck_entries: usize,
    /// Categories in fill order, with their sample sizes.
    pub quotas: Vec<CategoryQuota>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            land_target: 38,
            utility_land_limit: 18,
            max_deck_entries: 99,
            quotas: vec![
                CategoryQuota::new(Category::Ramp, 10),
                CategoryQuota::new(Category::CardDraw, 10),
                CategoryQuota::new(Category::Removal, 8),
                CategoryQuota::new(Category::BoardWipes, 3),
                CategoryQuota::new(Category::Interaction, 7),
                CategoryQuota::new(Category::Synergy, 23),
            ],
        }
    }
}

impl AllocationConfig {
    const MAX_DECK_ENTRIES: usize = 1_000;

    /// Checks the config for values the assembler cannot work with.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.max_deck_entries == 0 || self.max_deck_entries > Self::MAX_DECK_ENTRIES {
            return Err(ValidationError::InvalidConfig {
                reason: format!(
                    "max_deck_entries must be in 1..={} (got {})",
                    Self::MAX_DECK_ENTRIES,
                    self.max_deck_entries
                ),
            });
        }

        for (idx, quota) in self.quotas.iter().enumerate() {
            if quota.category == Category::Lands {
                return Err(ValidationError::InvalidConfig {
                    reason: "lands are planned separately and cannot have a quota".to_string(),
                });
            }
            if self.quotas[..idx].iter().any(|q| q.category == quota.category) {
                return Err(ValidationError::InvalidConfig {
                    reason: format!("category '{}' appears more than once", quota.category),
                });
            }
        }

        Ok(self)
    }

    /// Loads and validates a JSON config file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("invalid JSON: {e}"),
        })?;
        config.validate()
    }
}
