//! CSV ingestion and missing-value handling.
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::dataset::{Column, ColumnData, Dataset, OrderedF64};
use crate::error::{PipelineError, Result};
use crate::error_handler::{log_warning, LogOnError};
use crate::stats;

/// Cell contents treated as missing (pandas defaults).
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const NOT_LOADED: &str = "No data loaded. Call load_csv() first.";

/// How missing cells are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImputeStrategy {
    /// Column mean, numeric columns only.
    Mean,
    /// Column median, numeric columns only.
    Median,
    /// Most frequent value, any column type.
    MostFrequent,
}

impl FromStr for ImputeStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(ImputeStrategy::Mean),
            "median" => Ok(ImputeStrategy::Median),
            "most_frequent" => Ok(ImputeStrategy::MostFrequent),
            other => Err(PipelineError::UnsupportedStrategy(other.to_string())),
        }
    }
}

impl ImputeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::MostFrequent => "most_frequent",
        }
    }
}

/// Holds the loaded table and the operations that inspect or repair it.
#[derive(Debug, Default)]
pub struct DataLoader {
    data: Option<Dataset>,
}

impl DataLoader {
    pub fn new() -> Self {
        DataLoader { data: None }
    }

    /// Wrap an already built table.
    pub fn from_dataset(data: Dataset) -> Self {
        DataLoader { data: Some(data) }
    }

    pub fn data(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut Dataset> {
        self.data.as_mut()
    }

    pub fn into_data(self) -> Option<Dataset> {
        self.data
    }

    /// Load a CSV file with a header row, replacing any previously loaded table.
    pub fn load_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let context = format!("Failed to load CSV from file {}", path.display());
        if !path.exists() {
            return Err(PipelineError::NotFound(path.to_path_buf())).log_on_error(&context);
        }
        let data = read_csv(path).log_on_error(&context)?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            data.n_rows(),
            data.n_cols(),
            path.display()
        );
        self.data = Some(data);
        Ok(())
    }

    /// Log and return the first `n` rows.
    pub fn watch_data_head(&self, n: usize) -> Option<String> {
        match &self.data {
            Some(data) => {
                let head = data.head(n);
                log::info!("First {} rows:\n{}", n, head);
                Some(head)
            }
            None => {
                log_warning(NOT_LOADED);
                None
            }
        }
    }

    /// Log and return the number of missing cells per column.
    pub fn count_missing_values(&self) -> Option<Vec<(String, usize)>> {
        match &self.data {
            Some(data) => {
                let counts = data.missing_counts();
                let listing = counts
                    .iter()
                    .map(|(name, count)| format!("{:<40} {}", name, count))
                    .collect::<Vec<_>>()
                    .join("\n");
                log::info!("Missing values per column:\n{}", listing);
                Some(counts)
            }
            None => {
                log_warning(NOT_LOADED);
                None
            }
        }
    }

    /// Fill missing cells with `strategy` ("mean", "median" or
    /// "most_frequent"). The name is validated before the table is touched.
    pub fn fill_missing_values(&mut self, strategy: &str) -> Result<()> {
        let strategy: ImputeStrategy = strategy.parse()?;
        self.fill_missing_with(strategy);
        Ok(())
    }

    pub fn fill_missing_with(&mut self, strategy: ImputeStrategy) {
        let Some(data) = self.data.as_mut() else {
            log_warning(NOT_LOADED);
            return;
        };
        if data.total_missing() == 0 {
            log::info!("No missing values, nothing to fill.");
            return;
        }
        for column in data.columns_mut() {
            fill_column(column, strategy);
        }
        log::info!(
            "Filled missing values using strategy: {}",
            strategy.as_str()
        );
    }
}

fn fill_column(column: &mut Column, strategy: ImputeStrategy) {
    if column.null_count() == 0 {
        return;
    }
    match (&mut column.data, strategy) {
        (ColumnData::Numeric(values), ImputeStrategy::Mean | ImputeStrategy::Median) => {
            let valid: Vec<f64> = values.iter().flatten().copied().collect();
            if valid.is_empty() {
                return;
            }
            let fill = match strategy {
                ImputeStrategy::Mean => stats::mean(&valid),
                _ => stats::median(&valid),
            };
            values.iter_mut().filter(|v| v.is_none()).for_each(|v| *v = Some(fill));
        }
        (ColumnData::Numeric(values), ImputeStrategy::MostFrequent) => {
            let mut counts: BTreeMap<OrderedF64, usize> = BTreeMap::new();
            for value in values.iter().flatten() {
                *counts.entry(OrderedF64(*value)).or_default() += 1;
            }
            if let Some(mode) = mode_of(counts) {
                values.iter_mut().filter(|v| v.is_none()).for_each(|v| *v = Some(mode.0));
            }
        }
        (ColumnData::Text(values), ImputeStrategy::MostFrequent) => {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for value in values.iter().flatten() {
                *counts.entry(value.clone()).or_default() += 1;
            }
            if let Some(mode) = mode_of(counts) {
                values
                    .iter_mut()
                    .filter(|v| v.is_none())
                    .for_each(|v| *v = Some(mode.clone()));
            }
        }
        // mean and median do not apply to text columns
        (ColumnData::Text(_), _) => {}
    }
}

/// Most frequent key; the smallest key wins a tie.
fn mode_of<K: Ord>(counts: BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}

/// Read a comma separated file with a header row into a [`Dataset`].
///
/// A column is numeric when every non-missing cell parses as a number,
/// otherwise it is kept as text.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (idx, column) in cells.iter_mut().enumerate() {
            let raw = record.get(idx).unwrap_or_default();
            if NA_VALUES.contains(&raw) {
                column.push(None);
            } else {
                column.push(Some(raw.to_string()));
            }
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Dataset::from_columns(columns)
}

fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|cell| match cell {
            Some(text) => text.parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();
    match parsed {
        Some(numbers) => Column::numeric(name, numbers),
        None => Column::text(name, values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names() {
        assert_eq!("mean".parse::<ImputeStrategy>().unwrap(), ImputeStrategy::Mean);
        assert_eq!("median".parse::<ImputeStrategy>().unwrap(), ImputeStrategy::Median);
        assert_eq!(
            "most_frequent".parse::<ImputeStrategy>().unwrap(),
            ImputeStrategy::MostFrequent
        );
        assert!("Mean".parse::<ImputeStrategy>().is_err());
    }

    #[test]
    fn infer_numeric_and_text_columns() {
        let numeric = infer_column("n", vec![Some("1".into()), None, Some("2.5".into())]);
        assert_eq!(numeric.as_numeric().unwrap(), &[Some(1.0), None, Some(2.5)]);

        let text = infer_column("t", vec![Some("1".into()), Some("abc".into())]);
        assert!(text.as_numeric().is_none());

        let empty = infer_column("e", vec![None, None]);
        assert!(empty.as_numeric().is_some());
    }

    #[test]
    fn mode_prefers_smallest_on_tie() {
        let mut counts = BTreeMap::new();
        counts.insert(3, 2);
        counts.insert(1, 2);
        counts.insert(2, 1);
        assert_eq!(mode_of(counts), Some(1));
    }

    #[test]
    fn median_fill_on_numeric_column() {
        let data = Dataset::from_columns(vec![Column::numeric(
            "x",
            vec![Some(1.0), None, Some(3.0), Some(10.0)],
        )])
        .unwrap();
        let mut loader = DataLoader::from_dataset(data);
        loader.fill_missing_values("median").unwrap();
        let column = loader.data().unwrap().column("x").unwrap();
        assert_eq!(column.as_numeric().unwrap()[1], Some(3.0));
    }

    #[test]
    fn text_columns_ignored_by_mean() {
        let data = Dataset::from_columns(vec![
            Column::numeric("x", vec![Some(1.0), None]),
            Column::text("t", vec![None, Some("a".into())]),
        ])
        .unwrap();
        let mut loader = DataLoader::from_dataset(data);
        loader.fill_missing_values("mean").unwrap();
        let data = loader.data().unwrap();
        assert_eq!(data.column("x").unwrap().null_count(), 0);
        assert_eq!(data.column("t").unwrap().null_count(), 1);
    }

    #[test]
    fn operations_without_data_are_soft() {
        let mut loader = DataLoader::new();
        assert!(loader.count_missing_values().is_none());
        assert!(loader.watch_data_head(5).is_none());
        assert!(loader.fill_missing_values("mean").is_ok());
    }
}
