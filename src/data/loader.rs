//! Dataset Loader Module
//! Reads the fixed set of CSV extracts into Polars DataFrames.
//!
//! A failure on one file never aborts the load: the dataset is recorded as
//! failed with a diagnostic and exposes an empty table instead.

use crate::data::schema::{self, SchemaError};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Schema check failed: {0}")]
    Schema(#[from] SchemaError),
    #[error("File has no columns")]
    NoColumns,
}

/// Logical dataset names, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKey {
    Receivables,
    Clients,
    Imports,
    Inventory,
    Products,
    Sales,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 6] = [
        DatasetKey::Receivables,
        DatasetKey::Clients,
        DatasetKey::Imports,
        DatasetKey::Inventory,
        DatasetKey::Products,
        DatasetKey::Sales,
    ];

    /// Short key used in the source extracts.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKey::Receivables => "cartera",
            DatasetKey::Clients => "clientes",
            DatasetKey::Imports => "importaciones",
            DatasetKey::Inventory => "inventario",
            DatasetKey::Products => "productos",
            DatasetKey::Sales => "ventas",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKey::Receivables => "cartera_andina.csv",
            DatasetKey::Clients => "clientes_andina.csv",
            DatasetKey::Imports => "importaciones_andina.csv",
            DatasetKey::Inventory => "inventario_andina.csv",
            DatasetKey::Products => "productos_andina.csv",
            DatasetKey::Sales => "ventas_andina.csv",
        }
    }

    /// Imports are exported with `;` separators and decimal commas.
    pub fn csv_format(self) -> CsvFormat {
        match self {
            DatasetKey::Imports => CsvFormat::SEMICOLON_DECIMAL_COMMA,
            _ => CsvFormat::DEFAULT,
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field delimiter and decimal convention of a CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub separator: u8,
    pub decimal_comma: bool,
}

impl CsvFormat {
    pub const DEFAULT: CsvFormat = CsvFormat {
        separator: b',',
        decimal_comma: false,
    };

    pub const SEMICOLON_DECIMAL_COMMA: CsvFormat = CsvFormat {
        separator: b';',
        decimal_comma: true,
    };
}

/// Result of loading a single dataset.
#[derive(Debug, Clone)]
pub enum DatasetOutcome {
    Loaded(DataFrame),
    Failed { diagnostic: String },
}

impl DatasetOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, DatasetOutcome::Loaded(_))
    }

    pub fn table(&self) -> Option<&DataFrame> {
        match self {
            DatasetOutcome::Loaded(df) => Some(df),
            DatasetOutcome::Failed { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            DatasetOutcome::Loaded(_) => None,
            DatasetOutcome::Failed { diagnostic } => Some(diagnostic),
        }
    }
}

/// Load status of one dataset, as shown on the datasets page and in exports.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub key: DatasetKey,
    pub file_name: &'static str,
    pub loaded: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    pub diagnostic: Option<String>,
}

/// All datasets of one load cycle, keyed by logical name.
#[derive(Debug, Clone)]
pub struct LoadedDatasets {
    data_dir: PathBuf,
    outcomes: BTreeMap<DatasetKey, DatasetOutcome>,
}

impl LoadedDatasets {
    pub fn new(data_dir: PathBuf, outcomes: BTreeMap<DatasetKey, DatasetOutcome>) -> Self {
        Self { data_dir, outcomes }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Table for a dataset, only if it loaded successfully.
    pub fn get(&self, key: DatasetKey) -> Option<&DataFrame> {
        self.outcomes.get(&key).and_then(DatasetOutcome::table)
    }

    /// Table for a dataset, or an empty table if it is missing or failed.
    pub fn table_or_empty(&self, key: DatasetKey) -> DataFrame {
        self.get(key).cloned().unwrap_or_else(DataFrame::empty)
    }

    pub fn keys(&self) -> impl Iterator<Item = DatasetKey> + '_ {
        self.outcomes.keys().copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_loaded()).count()
    }

    /// Diagnostics of every failed dataset.
    pub fn diagnostics(&self) -> Vec<(DatasetKey, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(key, outcome)| outcome.diagnostic().map(|d| (*key, d)))
            .collect()
    }

    /// Failed datasets report zero rows and no columns.
    pub fn statuses(&self) -> Vec<DatasetStatus> {
        self.outcomes
            .iter()
            .map(|(key, outcome)| {
                let table = self.table_or_empty(*key);
                DatasetStatus {
                    key: *key,
                    file_name: key.file_name(),
                    loaded: outcome.is_loaded(),
                    rows: table.height(),
                    columns: table
                        .get_column_names()
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    diagnostic: outcome.diagnostic().map(str::to_string),
                }
            })
            .collect()
    }
}

/// Reads every known dataset from one directory.
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: DatasetKey) -> PathBuf {
        self.data_dir.join(key.file_name())
    }

    /// Load all datasets. Files are parsed in parallel; every key is present
    /// in the result whether or not its file loaded.
    pub fn load_all(&self) -> LoadedDatasets {
        let outcomes: BTreeMap<DatasetKey, DatasetOutcome> = DatasetKey::ALL
            .par_iter()
            .map(|&key| (key, self.load_dataset(key)))
            .collect();

        let loaded = outcomes.values().filter(|o| o.is_loaded()).count();
        info!(
            data_dir = %self.data_dir.display(),
            loaded,
            failed = outcomes.len() - loaded,
            "dataset load finished"
        );

        LoadedDatasets::new(self.data_dir.clone(), outcomes)
    }

    /// Load one dataset, turning any failure into a diagnostic.
    pub fn load_dataset(&self, key: DatasetKey) -> DatasetOutcome {
        let path = self.path_for(key);

        let result = Self::read_csv(&path, key.csv_format()).and_then(|df| {
            schema::validate(key, &df)?;
            Ok(df)
        });

        match result {
            Ok(df) => {
                info!(
                    dataset = key.as_str(),
                    rows = df.height(),
                    columns = df.width(),
                    "dataset loaded"
                );
                DatasetOutcome::Loaded(df)
            }
            Err(e) => {
                warn!(
                    dataset = key.as_str(),
                    path = %path.display(),
                    error = %e,
                    "dataset failed to load, using empty table"
                );
                DatasetOutcome::Failed {
                    diagnostic: format!("Error loading {}: {}", key.file_name(), e),
                }
            }
        }
    }

    /// Parse a CSV file with the given delimiter/decimal convention.
    pub fn read_csv(path: &Path, format: CsvFormat) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(format.separator)
            .with_decimal_comma(format.decimal_comma)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        if df.width() == 0 {
            return Err(LoaderError::NoColumns);
        }
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RECEIVABLES_CSV: &str = "\
documento_id,cliente_id,fecha_factura,fecha_vencimiento,saldo_cop,dias_mora,region
F-1,C1,2024-01-01,2024-01-31,100,10,Andina
F-2,C2,2024-01-05,2024-02-04,200,45,Caribe
F-3,C3,2024-02-01,2024-03-02,50,0,Andina
";

    const INVENTORY_CSV: &str = "\
fecha_corte,producto_id,centro_logistico,categoria,stock_unidades,valor_inventario_cop
2024-01-31,P1,Bogota,Bebidas,10,1000
2024-02-29,P1,Bogota,Bebidas,12,1200
";

    fn write_all_datasets(dir: &Path) {
        fs::write(dir.join("cartera_andina.csv"), RECEIVABLES_CSV).unwrap();
        fs::write(dir.join("clientes_andina.csv"), "cliente_id,nombre\nC1,Uno\n").unwrap();
        fs::write(
            dir.join("importaciones_andina.csv"),
            "importacion_id;valor_usd\nI1;1234,5\nI2;10,25\n",
        )
        .unwrap();
        fs::write(dir.join("inventario_andina.csv"), INVENTORY_CSV).unwrap();
        fs::write(dir.join("productos_andina.csv"), "producto_id,nombre\nP1,Agua\n").unwrap();
        fs::write(dir.join("ventas_andina.csv"), "venta_id,total\nV1,99.5\n").unwrap();
    }

    #[test]
    fn test_imports_use_semicolon_and_decimal_comma() {
        assert_eq!(
            DatasetKey::Imports.csv_format(),
            CsvFormat::SEMICOLON_DECIMAL_COMMA
        );
        for key in DatasetKey::ALL {
            if key != DatasetKey::Imports {
                assert_eq!(key.csv_format(), CsvFormat::DEFAULT);
            }
        }
    }

    #[test]
    fn test_load_all_datasets() {
        let dir = TempDir::new().unwrap();
        write_all_datasets(dir.path());

        let datasets = DataLoader::new(dir.path()).load_all();

        assert_eq!(datasets.keys().count(), 6);
        assert_eq!(datasets.loaded_count(), 6);
        assert!(datasets.diagnostics().is_empty());
        assert_eq!(datasets.get(DatasetKey::Receivables).unwrap().height(), 3);

        let imports = datasets.get(DatasetKey::Imports).unwrap();
        assert_eq!(imports.height(), 2);
        assert_eq!(imports.width(), 2);

        let value_usd = imports.column("valor_usd").unwrap();
        assert_eq!(value_usd.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = value_usd
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1234.5), Some(10.25)]);
    }

    #[test]
    fn test_malformed_file_is_replaced_by_empty_table() {
        let dir = TempDir::new().unwrap();
        write_all_datasets(dir.path());
        fs::write(
            dir.path().join("inventario_andina.csv"),
            "this,is,not\nan,inventory,extract\n",
        )
        .unwrap();

        let datasets = DataLoader::new(dir.path()).load_all();

        assert_eq!(datasets.keys().count(), 6);
        assert_eq!(datasets.loaded_count(), 5);
        assert!(datasets.get(DatasetKey::Inventory).is_none());
        assert_eq!(datasets.table_or_empty(DatasetKey::Inventory).height(), 0);

        let diagnostics = datasets.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].0, DatasetKey::Inventory);
        assert!(diagnostics[0].1.contains("inventario_andina.csv"));
        assert!(diagnostics[0].1.contains("fecha_corte"));
    }

    #[test]
    fn test_missing_file_reports_diagnostic() {
        let dir = TempDir::new().unwrap();
        write_all_datasets(dir.path());
        fs::remove_file(dir.path().join("ventas_andina.csv")).unwrap();

        let loader = DataLoader::new(dir.path());
        let outcome = loader.load_dataset(DatasetKey::Sales);

        assert!(!outcome.is_loaded());
        assert!(outcome.diagnostic().unwrap().contains("File not found"));
    }

    #[test]
    fn test_missing_directory_still_yields_every_key() {
        let dir = TempDir::new().unwrap();
        let datasets = DataLoader::new(dir.path().join("nope")).load_all();

        assert_eq!(datasets.keys().count(), 6);
        assert_eq!(datasets.loaded_count(), 0);
        assert_eq!(datasets.diagnostics().len(), 6);
    }

    #[test]
    fn test_statuses_describe_each_dataset() {
        let dir = TempDir::new().unwrap();
        write_all_datasets(dir.path());
        fs::remove_file(dir.path().join("productos_andina.csv")).unwrap();

        let statuses = DataLoader::new(dir.path()).load_all().statuses();

        assert_eq!(statuses.len(), 6);
        let clients = statuses
            .iter()
            .find(|s| s.key == DatasetKey::Clients)
            .unwrap();
        assert!(clients.loaded);
        assert_eq!(clients.rows, 1);
        assert_eq!(clients.columns, vec!["cliente_id", "nombre"]);

        let products = statuses
            .iter()
            .find(|s| s.key == DatasetKey::Products)
            .unwrap();
        assert!(!products.loaded);
        assert_eq!(products.rows, 0);
        assert!(products.columns.is_empty());
        assert!(products.diagnostic.is_some());
    }
}
