//! Schema Module
//! Required-column checks at load time and typed record extraction for the
//! receivables and inventory extracts.

use crate::data::loader::DatasetKey;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("invalid date '{value}' in column '{column}' (row {row})")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },
    #[error("invalid number '{value}' in column '{column}' (row {row})")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Column names of the receivables extract (`cartera`).
pub mod receivables {
    pub const INVOICE_ID: &str = "documento_id";
    pub const CLIENT_ID: &str = "cliente_id";
    pub const INVOICE_DATE: &str = "fecha_factura";
    pub const DUE_DATE: &str = "fecha_vencimiento";
    pub const BALANCE: &str = "saldo_cop";
    pub const DAYS_OVERDUE: &str = "dias_mora";
    pub const REGION: &str = "region";
}

/// Column names of the inventory extract (`inventario`).
pub mod inventory {
    pub const CUTOFF_DATE: &str = "fecha_corte";
    pub const PRODUCT_ID: &str = "producto_id";
    pub const LOGISTIC_CENTER: &str = "centro_logistico";
    pub const CATEGORY: &str = "categoria";
    pub const STOCK_UNITS: &str = "stock_unidades";
    pub const VALUE: &str = "valor_inventario_cop";
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One open invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivableRecord {
    pub invoice_id: String,
    pub client_id: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub balance: f64,
    pub days_overdue: f64,
    pub region: Option<String>,
}

impl ReceivableRecord {
    pub fn is_overdue(&self) -> bool {
        self.days_overdue > 0.0
    }
}

/// One product line of an inventory snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub cutoff_date: Option<NaiveDate>,
    pub product_id: Option<String>,
    pub logistic_center: Option<String>,
    pub category: Option<String>,
    pub stock_units: f64,
    pub value: f64,
}

/// Columns a dataset must carry to be accepted by the loader.
/// Datasets without a consumer only need to be parseable.
pub fn required_columns(key: DatasetKey) -> &'static [&'static str] {
    match key {
        DatasetKey::Receivables => &[
            receivables::INVOICE_ID,
            receivables::CLIENT_ID,
            receivables::INVOICE_DATE,
            receivables::DUE_DATE,
            receivables::BALANCE,
            receivables::DAYS_OVERDUE,
            receivables::REGION,
        ],
        DatasetKey::Inventory => &[
            inventory::CUTOFF_DATE,
            inventory::PRODUCT_ID,
            inventory::LOGISTIC_CENTER,
            inventory::CATEGORY,
            inventory::STOCK_UNITS,
            inventory::VALUE,
        ],
        DatasetKey::Clients | DatasetKey::Imports | DatasetKey::Products | DatasetKey::Sales => &[],
    }
}

pub fn validate(key: DatasetKey, df: &DataFrame) -> Result<(), SchemaError> {
    let missing: Vec<String> = required_columns(key)
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingColumns(missing))
    }
}

/// Parse a calendar date, accepting a trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, SchemaError> {
    df.column(name)
        .map_err(|_| SchemaError::MissingColumns(vec![name.to_string()]))
}

fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, SchemaError> {
    let as_text = required_column(df, name)?.cast(&DataType::String)?;
    let values = as_text
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    let as_float = required_column(df, name)?.cast(&DataType::Float64)?;
    let values = as_float
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Numbers read from text so that a stray label fails loudly instead of
/// turning into a null.
fn strict_float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    text_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(raw) => match raw.parse::<f64>() {
                Ok(number) if number.is_finite() => Ok(Some(number)),
                _ => Err(SchemaError::InvalidNumber {
                    column: name.to_string(),
                    row,
                    value: raw,
                }),
            },
        })
        .collect()
}

/// Blank cells become `None`; anything unparseable is an error.
fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>, SchemaError> {
    text_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(raw) => parse_date(&raw).map(Some).ok_or(SchemaError::InvalidDate {
                column: name.to_string(),
                row,
                value: raw,
            }),
        })
        .collect()
}

/// Convert a validated `cartera` table into typed records.
///
/// Null balances count as zero and null days-overdue as current.
pub fn receivables_from_frame(df: &DataFrame) -> Result<Vec<ReceivableRecord>, SchemaError> {
    validate(DatasetKey::Receivables, df)?;

    let invoice_ids = text_values(df, receivables::INVOICE_ID)?;
    let client_ids = text_values(df, receivables::CLIENT_ID)?;
    let invoice_dates = date_values(df, receivables::INVOICE_DATE)?;
    let due_dates = date_values(df, receivables::DUE_DATE)?;
    let balances = float_values(df, receivables::BALANCE)?;
    let days = strict_float_values(df, receivables::DAYS_OVERDUE)?;
    let regions = text_values(df, receivables::REGION)?;

    let records = (0..df.height())
        .map(|i| ReceivableRecord {
            invoice_id: invoice_ids[i].clone().unwrap_or_default(),
            client_id: client_ids[i].clone().unwrap_or_default(),
            invoice_date: invoice_dates[i],
            due_date: due_dates[i],
            balance: balances[i].unwrap_or(0.0),
            days_overdue: days[i].unwrap_or(0.0),
            region: regions[i].clone(),
        })
        .collect();
    Ok(records)
}

/// Convert a validated `inventario` table into typed records.
pub fn inventory_from_frame(df: &DataFrame) -> Result<Vec<InventoryRecord>, SchemaError> {
    validate(DatasetKey::Inventory, df)?;

    let cutoff_dates = date_values(df, inventory::CUTOFF_DATE)?;
    let product_ids = text_values(df, inventory::PRODUCT_ID)?;
    let centers = text_values(df, inventory::LOGISTIC_CENTER)?;
    let categories = text_values(df, inventory::CATEGORY)?;
    let units = float_values(df, inventory::STOCK_UNITS)?;
    let values = float_values(df, inventory::VALUE)?;

    let records = (0..df.height())
        .map(|i| InventoryRecord {
            cutoff_date: cutoff_dates[i],
            product_id: product_ids[i].clone(),
            logistic_center: centers[i].clone(),
            category: categories[i].clone(),
            stock_units: units[i].unwrap_or(0.0),
            value: values[i].unwrap_or(0.0),
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receivables_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("documento_id".into(), ["F-1", "F-2"]),
            Column::new("cliente_id".into(), [101i64, 102]),
            Column::new("fecha_factura".into(), ["2024-01-01", "2024-01-05 08:30:00"]),
            Column::new("fecha_vencimiento".into(), [Some("31/01/2024"), None]),
            Column::new("saldo_cop".into(), [Some(100.5), None]),
            Column::new("dias_mora".into(), [Some(10i64), None]),
            Column::new("region".into(), [Some("Andina"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date(" 2024/03/15 "), Some(expected));
        assert_eq!(parse_date("15/03/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-15 23:59:59"), Some(expected));
        assert_eq!(parse_date("2024-03-15T00:00:00"), Some(expected));
        assert_eq!(parse_date("marzo"), None);
    }

    #[test]
    fn test_validate_lists_every_missing_column() {
        let df = DataFrame::new(vec![Column::new("fecha_corte".into(), ["2024-01-01"])]).unwrap();

        let err = validate(DatasetKey::Inventory, &df).unwrap_err();
        match err {
            SchemaError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 5);
                assert!(!missing.contains(&"fecha_corte".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unconsumed_datasets_have_no_requirements() {
        let df = DataFrame::new(vec![Column::new("anything".into(), [1i64])]).unwrap();
        assert!(validate(DatasetKey::Sales, &df).is_ok());
        assert!(validate(DatasetKey::Imports, &df).is_ok());
    }

    #[test]
    fn test_receivables_from_frame_handles_nulls() {
        let records = receivables_from_frame(&receivables_frame()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].client_id, "101");
        assert_eq!(records[0].balance, 100.5);
        assert_eq!(records[0].days_overdue, 10.0);
        assert!(records[0].is_overdue());
        assert_eq!(records[0].due_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(records[1].invoice_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(records[1].due_date, None);
        assert_eq!(records[1].balance, 0.0);
        assert_eq!(records[1].days_overdue, 0.0);
        assert_eq!(records[1].region, None);
    }

    #[test]
    fn test_fractional_days_overdue_are_kept() {
        let mut df = receivables_frame();
        df.replace("dias_mora", Series::new("dias_mora".into(), [0.5, 31.25]))
            .unwrap();

        let records = receivables_from_frame(&df).unwrap();

        assert_eq!(records[0].days_overdue, 0.5);
        assert!(records[0].is_overdue());
        assert_eq!(records[1].days_overdue, 31.25);
    }

    #[test]
    fn test_non_numeric_days_overdue_is_rejected() {
        let mut df = receivables_frame();
        df.replace("dias_mora", Series::new("dias_mora".into(), [Some("N/A"), None]))
            .unwrap();

        let err = receivables_from_frame(&df).unwrap_err();
        match err {
            SchemaError::InvalidNumber { column, row, value } => {
                assert_eq!(column, "dias_mora");
                assert_eq!(row, 0);
                assert_eq!(value, "N/A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let df = DataFrame::new(vec![
            Column::new("fecha_corte".into(), ["2024-01-31", "ayer"]),
            Column::new("producto_id".into(), ["P1", "P2"]),
            Column::new("centro_logistico".into(), ["Bogota", "Cali"]),
            Column::new("categoria".into(), ["A", "B"]),
            Column::new("stock_unidades".into(), [1.0, 2.0]),
            Column::new("valor_inventario_cop".into(), [10.0, 20.0]),
        ])
        .unwrap();

        let err = inventory_from_frame(&df).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDate { row: 1, .. }));
    }
}
