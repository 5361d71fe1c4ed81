//! Inventory Module
//! Current-snapshot KPIs and breakdowns plus the historical value trend.

use crate::data::schema::{self, InventoryRecord};
use crate::data::{DatasetKey, LoadedDatasets};
use crate::views::{sort_descending, sum_by_label, LabeledAmount, ViewError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Total inventory value of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotValue {
    pub cutoff_date: NaiveDate,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    /// `None` when no row carries a cutoff date.
    pub latest_cutoff: Option<NaiveDate>,
    pub current_rows: usize,
    pub total_value: f64,
    pub total_units: f64,
    pub distinct_products: usize,
    /// Largest value first.
    pub value_by_center: Vec<LabeledAmount>,
    pub value_by_category: Vec<LabeledAmount>,
    pub units_by_category: Vec<LabeledAmount>,
    /// Every snapshot, oldest first.
    pub value_history: Vec<SnapshotValue>,
}

/// Rows belonging to the most recent snapshot.
pub fn current_snapshot(
    records: &[InventoryRecord],
) -> (Option<NaiveDate>, Vec<&InventoryRecord>) {
    let latest = records.iter().filter_map(|r| r.cutoff_date).max();
    let current = match latest {
        Some(date) => records
            .iter()
            .filter(|r| r.cutoff_date == Some(date))
            .collect(),
        None => Vec::new(),
    };
    (latest, current)
}

impl InventorySummary {
    pub fn from_datasets(datasets: &LoadedDatasets) -> Result<Self, ViewError> {
        let df = datasets
            .get(DatasetKey::Inventory)
            .ok_or(ViewError::DatasetUnavailable(DatasetKey::Inventory))?;
        let records =
            schema::inventory_from_frame(df).map_err(|source| ViewError::InvalidData {
                dataset: DatasetKey::Inventory,
                source,
            })?;
        Ok(Self::compute(&records))
    }

    pub fn compute(records: &[InventoryRecord]) -> Self {
        let (latest_cutoff, current) = current_snapshot(records);

        let distinct_products = current
            .iter()
            .filter_map(|r| r.product_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let mut value_by_center = sum_by_label(
            current
                .iter()
                .filter_map(|r| r.logistic_center.as_deref().map(|c| (c, r.value))),
        );
        sort_descending(&mut value_by_center);

        let value_by_category = sum_by_label(
            current
                .iter()
                .filter_map(|r| r.category.as_deref().map(|c| (c, r.value))),
        );
        let units_by_category = sum_by_label(
            current
                .iter()
                .filter_map(|r| r.category.as_deref().map(|c| (c, r.stock_units))),
        );

        let summary = Self {
            latest_cutoff,
            current_rows: current.len(),
            total_value: current.iter().map(|r| r.value).sum(),
            total_units: current.iter().map(|r| r.stock_units).sum(),
            distinct_products,
            value_by_center,
            value_by_category,
            units_by_category,
            value_history: Self::value_history(records),
        };

        debug!(
            cutoff = ?summary.latest_cutoff,
            rows = summary.current_rows,
            snapshots = summary.value_history.len(),
            "inventory summary computed"
        );
        summary
    }

    fn value_history(records: &[InventoryRecord]) -> Vec<SnapshotValue> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in records {
            if let Some(date) = record.cutoff_date {
                *totals.entry(date).or_insert(0.0) += record.value;
            }
        }
        totals
            .into_iter()
            .map(|(cutoff_date, total_value)| SnapshotValue {
                cutoff_date,
                total_value,
            })
            .collect()
    }
}
