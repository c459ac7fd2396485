//! Character budget for document text sent to a model.
//!
//! Priority order:
//! 1. catalog `context_length` × 4 (rough chars per token)
//! 2. catalog `parameter_size` matched against [`SIZE_BUDGETS`]
//! 3. the model name matched against [`SIZE_BUDGETS`]
//! 4. [`DEFAULT_CHAR_BUDGET`]

use crate::catalog::ModelCatalog;

/// Approximate characters per token
pub const CHARS_PER_TOKEN: f64 = 4.0;

pub const DEFAULT_CHAR_BUDGET: usize = 16_000;

/// Parameter-size tokens and their budgets, smallest first. The first token
/// found as a substring wins, so order matters: "14b" matches "4b" first.
pub const SIZE_BUDGETS: &[(&str, usize)] = &[
    ("1b", 4_000),
    ("2b", 6_000),
    ("3b", 8_000),
    ("4b", 10_000),
    ("7b", 14_000),
    ("8b", 16_000),
    ("14b", 22_000),
    ("32b", 30_000),
    ("70b", 45_000),
    ("110b", 60_000),
    ("480b", 100_000),
];

/// Look up a size label or model tag in [`SIZE_BUDGETS`].
pub fn budget_from_label(label: &str) -> Option<usize> {
    let lower = label.to_lowercase();
    SIZE_BUDGETS
        .iter()
        .find(|(token, _)| lower.contains(token))
        .map(|&(_, budget)| budget)
}

/// Budget for a model name alone, ignoring any catalog data.
pub fn estimate_from_name(model: &str) -> usize {
    budget_from_label(model).unwrap_or(DEFAULT_CHAR_BUDGET)
}

#[derive(Debug, Clone, Copy)]
pub struct CharBudgetEstimator<'a> {
    catalog: &'a ModelCatalog,
}

impl<'a> CharBudgetEstimator<'a> {
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self { catalog }
    }

    /// Maximum characters of document text for `model`. Always positive.
    pub fn budget_for(&self, model: &str) -> usize {
        if let Some(info) = self.catalog.lookup(model) {
            if let Some(ctx) = info.context_length.filter(|c| c.is_finite() && *c > 0.0) {
                return ((ctx * CHARS_PER_TOKEN).round() as usize).max(1);
            }
            if let Some(budget) = info.parameter_size.as_deref().and_then(budget_from_label) {
                return budget;
            }
        }
        estimate_from_name(model)
    }
}
