//! Credit Risk Module
//! Receivables KPIs, aging buckets, overdue balance by region and the most
//! delinquent invoices.

use crate::data::schema::{self, ReceivableRecord};
use crate::data::{DatasetKey, LoadedDatasets};
use crate::views::{sort_descending, sum_by_label, LabeledAmount, ViewError};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Number of rows in the delinquent invoice table.
pub const TOP_DELINQUENT_LIMIT: usize = 20;

/// Fixed aging categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub const ORDERED: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    /// Fractional day counts fall into the bucket whose upper bound they
    /// do not exceed, so `0.5` is already overdue.
    pub fn from_days(days_overdue: f64) -> Self {
        if days_overdue <= 0.0 {
            AgingBucket::Current
        } else if days_overdue <= 30.0 {
            AgingBucket::Days1To30
        } else if days_overdue <= 60.0 {
            AgingBucket::Days31To60
        } else if days_overdue <= 90.0 {
            AgingBucket::Days61To90
        } else {
            AgingBucket::Over90
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Current => "Al Día",
            AgingBucket::Days1To30 => "1-30 Días",
            AgingBucket::Days31To60 => "31-60 Días",
            AgingBucket::Days61To90 => "61-90 Días",
            AgingBucket::Over90 => "90+ Días",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketBalance {
    pub bucket: AgingBucket,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelinquentInvoice {
    pub client_id: String,
    pub invoice_id: String,
    pub overdue_balance: f64,
    pub max_days_overdue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditRiskSummary {
    pub record_count: usize,
    pub total_balance: f64,
    pub overdue_balance: f64,
    pub overdue_pct: f64,
    /// Always five entries, in [`AgingBucket::ORDERED`] order.
    pub aging: Vec<BucketBalance>,
    /// Largest overdue balance first.
    pub region_risk: Vec<LabeledAmount>,
    pub top_delinquent: Vec<DelinquentInvoice>,
}

/// Overdue share of the portfolio in percent; 0 for an empty portfolio.
pub fn overdue_percentage(overdue: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        overdue / total * 100.0
    }
}

impl CreditRiskSummary {
    pub fn from_datasets(datasets: &LoadedDatasets) -> Result<Self, ViewError> {
        let df = datasets
            .get(DatasetKey::Receivables)
            .ok_or(ViewError::DatasetUnavailable(DatasetKey::Receivables))?;
        let records =
            schema::receivables_from_frame(df).map_err(|source| ViewError::InvalidData {
                dataset: DatasetKey::Receivables,
                source,
            })?;
        Ok(Self::compute(&records))
    }

    pub fn compute(records: &[ReceivableRecord]) -> Self {
        let total_balance: f64 = records.iter().map(|r| r.balance).sum();
        let overdue_balance: f64 = records
            .iter()
            .filter(|r| r.is_overdue())
            .map(|r| r.balance)
            .sum();

        let summary = Self {
            record_count: records.len(),
            total_balance,
            overdue_balance,
            overdue_pct: overdue_percentage(overdue_balance, total_balance),
            aging: Self::aging_balances(records),
            region_risk: Self::region_risk(records),
            top_delinquent: Self::top_delinquent(records, TOP_DELINQUENT_LIMIT),
        };

        debug!(
            records = summary.record_count,
            total = summary.total_balance,
            overdue = summary.overdue_balance,
            "credit risk summary computed"
        );
        summary
    }

    fn aging_balances(records: &[ReceivableRecord]) -> Vec<BucketBalance> {
        let mut sums: HashMap<AgingBucket, f64> = HashMap::new();
        for record in records {
            *sums
                .entry(AgingBucket::from_days(record.days_overdue))
                .or_insert(0.0) += record.balance;
        }

        AgingBucket::ORDERED
            .iter()
            .map(|&bucket| BucketBalance {
                bucket,
                balance: sums.get(&bucket).copied().unwrap_or(0.0),
            })
            .collect()
    }

    /// Overdue balance per region. Rows without a region are left out.
    fn region_risk(records: &[ReceivableRecord]) -> Vec<LabeledAmount> {
        let mut regions = sum_by_label(
            records
                .iter()
                .filter(|r| r.is_overdue())
                .filter_map(|r| r.region.as_deref().map(|region| (region, r.balance))),
        );
        sort_descending(&mut regions);
        regions
    }

    fn top_delinquent(records: &[ReceivableRecord], limit: usize) -> Vec<DelinquentInvoice> {
        let mut groups: HashMap<(&str, &str), (f64, f64)> = HashMap::new();
        for record in records.iter().filter(|r| r.is_overdue()) {
            let entry = groups
                .entry((record.client_id.as_str(), record.invoice_id.as_str()))
                .or_insert((0.0, f64::NEG_INFINITY));
            entry.0 += record.balance;
            entry.1 = entry.1.max(record.days_overdue);
        }

        let mut invoices: Vec<DelinquentInvoice> = groups
            .into_iter()
            .map(|((client_id, invoice_id), (balance, max_days))| DelinquentInvoice {
                client_id: client_id.to_string(),
                invoice_id: invoice_id.to_string(),
                overdue_balance: balance,
                max_days_overdue: max_days,
            })
            .collect();

        invoices.sort_by(|a, b| {
            b.overdue_balance
                .total_cmp(&a.overdue_balance)
                .then_with(|| a.client_id.cmp(&b.client_id))
                .then_with(|| a.invoice_id.cmp(&b.invoice_id))
        });
        invoices.truncate(limit);
        invoices
    }

    #[cfg(test)]
    fn bucket_balance(&self, bucket: AgingBucket) -> f64 {
        self.aging
            .iter()
            .find(|b| b.bucket == bucket)
            .map(|b| b.balance)
            .unwrap_or(0.0)
    }

    /// Aging buckets as chart input, in display order.
    pub fn aging_series(&self) -> Vec<LabeledAmount> {
        self.aging
            .iter()
            .map(|b| LabeledAmount::new(b.bucket.label(), b.balance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use std::fs;
    use tempfile::TempDir;

    fn record(
        client: &str,
        invoice: &str,
        balance: f64,
        days: i64,
        region: &str,
    ) -> ReceivableRecord {
        ReceivableRecord {
            invoice_id: invoice.to_string(),
            client_id: client.to_string(),
            invoice_date: None,
            due_date: None,
            balance,
            days_overdue: days as f64,
            region: Some(region.to_string()),
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(AgingBucket::from_days(-5.0), AgingBucket::Current);
        assert_eq!(AgingBucket::from_days(0.0), AgingBucket::Current);
        assert_eq!(AgingBucket::from_days(0.5), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::from_days(1.0), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::from_days(30.0), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::from_days(30.5), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::from_days(60.0), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::from_days(61.0), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::from_days(90.0), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::from_days(90.1), AgingBucket::Over90);
    }

    #[test]
    fn test_worked_example() {
        let records = vec![
            record("C1", "F1", 100.0, 10, "Andina"),
            record("C2", "F2", 200.0, 45, "Caribe"),
            record("C3", "F3", 50.0, 0, "Andina"),
        ];

        let summary = CreditRiskSummary::compute(&records);

        assert_eq!(summary.total_balance, 350.0);
        assert_eq!(summary.overdue_balance, 300.0);
        assert!((summary.overdue_pct - 85.714).abs() < 0.01);
        assert_eq!(summary.bucket_balance(AgingBucket::Current), 50.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Days1To30), 100.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Days31To60), 200.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Days61To90), 0.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Over90), 0.0);
    }

    #[test]
    fn test_aging_keeps_fixed_order_and_sums_to_total() {
        let records = vec![
            record("C1", "F1", 70.0, 120, "Andina"),
            record("C2", "F2", 30.0, 75, "Caribe"),
            record("C3", "F3", -10.0, -3, "Andina"),
        ];

        let summary = CreditRiskSummary::compute(&records);

        let order: Vec<AgingBucket> = summary.aging.iter().map(|b| b.bucket).collect();
        assert_eq!(order, AgingBucket::ORDERED.to_vec());
        let bucket_total: f64 = summary.aging.iter().map(|b| b.balance).sum();
        assert_eq!(bucket_total, summary.total_balance);

        let labels: Vec<String> = summary.aging_series().into_iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec!["Al Día", "1-30 Días", "31-60 Días", "61-90 Días", "90+ Días"]
        );
    }

    #[test]
    fn test_overdue_percentage_zero_total() {
        assert_eq!(overdue_percentage(0.0, 0.0), 0.0);
        assert_eq!(overdue_percentage(50.0, 200.0), 25.0);
        assert_eq!(overdue_percentage(-50.0, -100.0), 50.0);

        let summary = CreditRiskSummary::compute(&[
            record("C1", "F1", 100.0, 5, "Andina"),
            record("C2", "F2", -100.0, 0, "Andina"),
        ]);
        assert_eq!(summary.total_balance, 0.0);
        assert_eq!(summary.overdue_pct, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let summary = CreditRiskSummary::compute(&[]);
        assert_eq!(summary.aging.len(), 5);
        assert!(summary.aging.iter().all(|b| b.balance == 0.0));
        assert!(summary.region_risk.is_empty());
        assert!(summary.top_delinquent.is_empty());
        assert_eq!(summary.overdue_pct, 0.0);
    }

    #[test]
    fn test_region_risk_counts_only_overdue() {
        let mut records = vec![
            record("C1", "F1", 100.0, 10, "Andina"),
            record("C2", "F2", 300.0, 45, "Caribe"),
            record("C3", "F3", 500.0, 0, "Andina"),
            record("C4", "F4", 20.0, 5, "Andina"),
        ];
        records.push(ReceivableRecord {
            region: None,
            ..record("C5", "F5", 999.0, 10, "")
        });

        let summary = CreditRiskSummary::compute(&records);

        assert_eq!(
            summary.region_risk,
            vec![
                LabeledAmount::new("Caribe", 300.0),
                LabeledAmount::new("Andina", 120.0),
            ]
        );
    }

    #[test]
    fn test_top_delinquent_groups_sorts_and_limits() {
        let mut records: Vec<ReceivableRecord> = (0..25)
            .map(|i| {
                let (client, invoice) = (format!("C{i}"), format!("F{i}"));
                record(&client, &invoice, i as f64 * 10.0, 5 + i, "Andina")
            })
            .collect();
        // Second line of the same invoice, not overdue: excluded from the group.
        records.push(record("C3", "F3", 1_000.0, 0, "Andina"));
        // Second overdue line of the same invoice: summed, max days kept.
        records.push(record("C24", "F24", 60.0, 200, "Andina"));

        let summary = CreditRiskSummary::compute(&records);
        let top = &summary.top_delinquent;

        assert_eq!(top.len(), TOP_DELINQUENT_LIMIT);
        assert!(top.windows(2).all(|w| w[0].overdue_balance >= w[1].overdue_balance));
        assert!(top.iter().all(|d| d.max_days_overdue > 0.0));
        assert_eq!(top[0].invoice_id, "F24");
        assert_eq!(top[0].overdue_balance, 300.0);
        assert_eq!(top[0].max_days_overdue, 200.0);
        // C0 has zero balance, C1..C4 are pushed out by the limit.
        assert!(top.iter().all(|d| d.client_id != "C0"));
    }

    #[test]
    fn test_fractional_days_count_as_overdue() {
        let mut half_day = record("C1", "F1", 100.0, 0, "Andina");
        half_day.days_overdue = 0.5;
        let records = vec![half_day, record("C2", "F2", 40.0, 0, "Caribe")];

        let summary = CreditRiskSummary::compute(&records);

        assert_eq!(summary.overdue_balance, 100.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Current), 40.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Days1To30), 100.0);
        assert_eq!(summary.region_risk, vec![LabeledAmount::new("Andina", 100.0)]);
        assert_eq!(summary.top_delinquent.len(), 1);
        assert_eq!(summary.top_delinquent[0].max_days_overdue, 0.5);
    }

    #[test]
    fn test_missing_dataset_is_reported() {
        let dir = TempDir::new().unwrap();
        let datasets = DataLoader::new(dir.path()).load_all();

        let err = CreditRiskSummary::from_datasets(&datasets).unwrap_err();
        assert!(matches!(
            err,
            ViewError::DatasetUnavailable(DatasetKey::Receivables)
        ));
    }

    #[test]
    fn test_from_loaded_csv() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cartera_andina.csv"),
            "documento_id,cliente_id,fecha_factura,fecha_vencimiento,saldo_cop,dias_mora,region\n\
             F-1,C1,2024-01-01,2024-01-31,100,10,Andina\n\
             F-2,C2,2024-01-05,2024-02-04,200,45,Caribe\n\
             F-3,C3,2024-02-01,2024-03-02,50,0,Andina\n",
        )
        .unwrap();
        let datasets = DataLoader::new(dir.path()).load_all();

        let summary = CreditRiskSummary::from_datasets(&datasets).unwrap();

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.total_balance, 350.0);
        assert_eq!(summary.region_risk[0], LabeledAmount::new("Caribe", 200.0));
        assert_eq!(summary.top_delinquent.len(), 2);
    }

    #[test]
    fn test_fractional_days_from_csv() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cartera_andina.csv"),
            "documento_id,cliente_id,fecha_factura,fecha_vencimiento,saldo_cop,dias_mora,region\n\
             F-1,C1,2024-01-01,2024-01-31,100,0.5,Andina\n\
             F-2,C2,2024-01-05,2024-02-04,50,0,Caribe\n",
        )
        .unwrap();
        let datasets = DataLoader::new(dir.path()).load_all();

        let summary = CreditRiskSummary::from_datasets(&datasets).unwrap();

        assert_eq!(summary.overdue_balance, 100.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Days1To30), 100.0);
        assert_eq!(summary.bucket_balance(AgingBucket::Current), 50.0);
    }

    #[test]
    fn test_non_numeric_days_fail_the_view() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cartera_andina.csv"),
            "documento_id,cliente_id,fecha_factura,fecha_vencimiento,saldo_cop,dias_mora,region\n\
             F-1,C1,2024-01-01,2024-01-31,100,N/A,Andina\n",
        )
        .unwrap();
        let datasets = DataLoader::new(dir.path()).load_all();

        let err = CreditRiskSummary::from_datasets(&datasets).unwrap_err();
        assert!(matches!(err, ViewError::InvalidData { .. }));
    }
}
