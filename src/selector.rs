//! Category fill: sourcing cards for each deck role within the remaining budget.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::category::Category;
use crate::color::ColorIdentity;
use crate::config::CategoryQuota;
use crate::deck::{DeckDraft, Rejection};
use crate::storage::{CardQuery, CardRepository, RepositoryError};

/// Outcome of filling one category.
///
/// Fewer admissions than requested is normal: the repository may run out of
/// matches, or the budget or deck size may cut the category short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFill {
    pub category: Category,
    pub requested: usize,
    pub fetched: usize,
    pub admitted: usize,
}

impl CategoryFill {
    /// True when fewer cards were admitted than requested.
    #[must_use]
    pub const fn is_underfilled(&self) -> bool {
        self.admitted < self.requested
    }
}

/// Samples category cards and admits them into a draft.
pub struct CategorySelector<'a> {
    repository: &'a dyn CardRepository,
}

impl<'a> CategorySelector<'a> {
    #[must_use]
    pub fn new(repository: &'a dyn CardRepository) -> Self {
        Self { repository }
    }

    /// Fetches up to `quota.target` cards priced within the current remaining
    /// budget and admits them in the order received. Rejected cards are dropped.
    pub fn fill(
        &self,
        draft: &mut DeckDraft,
        identity: &ColorIdentity,
        quota: CategoryQuota,
    ) -> Result<CategoryFill, RepositoryError> {
        let mut fill = CategoryFill {
            category: quota.category,
            requested: quota.target,
            fetched: 0,
            admitted: 0,
        };

        if draft.is_full() || draft.budget_exhausted() {
            tracing::debug!(
                category = %quota.category,
                remaining = draft.remaining_budget(),
                entries = draft.len(),
                "skipping category, deck full or budget exhausted"
            );
            return Ok(fill);
        }

        let query = CardQuery::new(
            identity.clone(),
            quota.category,
            draft.remaining_budget(),
            quota.target,
        );
        let records = self.repository.sample(&query)?;
        fill.fetched = records.len();

        for record in records {
            match draft.try_admit(Card::from_record(record, quota.category)) {
                Ok(()) => fill.admitted += 1,
                Err(Rejection::OverBudget) => {}
                Err(Rejection::DeckFull | Rejection::BudgetExhausted) => break,
            }
        }

        tracing::debug!(
            category = %quota.category,
            requested = fill.requested,
            fetched = fill.fetched,
            admitted = fill.admitted,
            remaining = draft.remaining_budget(),
            "category filled"
        );
        Ok(fill)
    }
}
