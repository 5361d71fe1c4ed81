//! Views module - per-topic aggregations feeding the dashboard pages

pub mod credit_risk;
pub mod format;
pub mod inventory;

pub use credit_risk::CreditRiskSummary;
pub use inventory::InventorySummary;

use crate::data::schema::SchemaError;
use crate::data::DatasetKey;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Datos no disponibles: {0}")]
    DatasetUnavailable(DatasetKey),
    #[error("Datos inválidos en {dataset}: {source}")]
    InvalidData {
        dataset: DatasetKey,
        #[source]
        source: SchemaError,
    },
}

/// A labelled total, used for every category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledAmount {
    pub label: String,
    pub amount: f64,
}

impl LabeledAmount {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Sum amounts per label. Output is ordered by label.
pub fn sum_by_label<'a, I>(items: I) -> Vec<LabeledAmount>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (label, amount) in items {
        *totals.entry(label).or_insert(0.0) += amount;
    }
    totals
        .into_iter()
        .map(|(label, amount)| LabeledAmount::new(label, amount))
        .collect()
}

/// Sort by amount, largest first. Equal amounts keep label order.
pub fn sort_descending(items: &mut [LabeledAmount]) {
    items.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.label.cmp(&b.label)));
}
