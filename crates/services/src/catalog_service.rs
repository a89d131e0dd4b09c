use std::path::Path;

use drill_core::catalog::{self, NumberRange, PokerLevel, PotOddsRecord, PotOddsSelection};
use drill_core::eval::{INVALID_SENTINEL, Operator};
use drill_core::model::Item;
use storage::dataset;
use storage::repository::StorageError;

use crate::error::CatalogServiceError;

/// What the user picked before starting a run.
#[derive(Debug, Clone, Default)]
pub struct ExerciseSelection {
    /// Picked numbers for the generated drills; empty generates none.
    pub numbers: Vec<u32>,
    pub range: NumberRange,
    pub levels: Vec<PokerLevel>,
    pub ops: Vec<Operator>,
    pub pot_odds: PotOddsSelection,
    /// Items from a user-supplied list, appended after the built-in ones.
    pub extra_items: Vec<Item>,
}

/// Ordered items for one run plus the pre-run stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExercisePlan {
    pub items: Vec<Item>,
    pub pot_odds_count: usize,
}

impl ExercisePlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn stats_line(&self) -> String {
        catalog::stats_line(self.total(), self.pot_odds_count)
    }

    /// Expressions whose plain or mirrored form only accepts the invalid sentinel.
    #[must_use]
    pub fn sentinel_items(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.is_expression())
            .filter(|item| [false, true].into_iter().any(|mirror| item.presented(mirror).expected == INVALID_SENTINEL))
            .collect()
    }
}

/// Builds initial item lists from the Poker Numbs tables and the Pot Odds dataset.
#[derive(Debug, Clone, Default)]
pub struct CatalogService {
    pot_odds: Vec<PotOddsRecord>,
}

impl CatalogService {
    #[must_use]
    pub fn new(pot_odds: Vec<PotOddsRecord>) -> Self {
        Self { pot_odds }
    }

    /// Load the Pot Odds dataset; a missing or malformed file leaves it empty.
    #[must_use]
    pub fn from_dataset_file(path: &Path) -> Self {
        match dataset::load_pot_odds(path) {
            Ok(records) => {
                tracing::debug!(path = %path.display(), count = records.len(), "loaded pot odds dataset");
                Self::new(records)
            }
            Err(StorageError::NotFound) => {
                tracing::warn!(path = %path.display(), "pot odds dataset not found, continuing without it");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "pot odds dataset unreadable, continuing without it");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn pot_odds_records(&self) -> &[PotOddsRecord] {
        &self.pot_odds
    }

    /// Items for `selection` without the emptiness check, for live stats.
    #[must_use]
    pub fn preview(&self, selection: &ExerciseSelection) -> ExercisePlan {
        let mut items = catalog::number_expressions(&selection.ops, &selection.numbers, selection.range);
        items.extend(catalog::poker_expressions(&selection.levels, &selection.ops));
        let pot_odds = selection.pot_odds.select(&self.pot_odds);
        let pot_odds_count = pot_odds.len();
        items.extend(pot_odds);
        items.extend(selection.extra_items.iter().cloned());
        ExercisePlan {
            items,
            pot_odds_count,
        }
    }

    /// Build the run's initial item list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Empty` if nothing was selected, or
    /// `CatalogServiceError::Catalog` if a picked number is not offered.
    pub fn build(&self, selection: &ExerciseSelection) -> Result<ExercisePlan, CatalogServiceError> {
        catalog::check_numbers(&selection.numbers)?;
        let plan = self.preview(selection);
        if plan.items.is_empty() {
            return Err(CatalogServiceError::Empty);
        }
        for item in plan.sentinel_items() {
            tracing::warn!(
                expression = %item,
                "item has no numeric answer in one orientation; only \"{INVALID_SENTINEL}\" will be accepted there"
            );
        }
        tracing::info!(total = plan.total(), pot_odds = plan.pot_odds_count, "built exercise plan");
        Ok(plan)
    }
}
