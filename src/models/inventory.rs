use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::reference::EntityRef;

/// Derived, non-persisted per-article movement summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub article: EntityRef,
    /// Business code of the article
    pub reference: Option<String>,
    /// Σ external quantities − Σ internal quantities. May be negative.
    pub net_quantite: i64,
    /// Names of the locations touched by the orders moving this article
    pub locals: BTreeSet<String>,
    pub stock_minimal: Option<i32>,
}

impl InventoryRow {
    pub fn article_name(&self) -> String {
        self.article.label()
    }

    pub fn is_below_minimum(&self) -> bool {
        self.stock_minimal
            .map(|min| self.net_quantite < i64::from(min))
            .unwrap_or(false)
    }
}
