//! In-memory table used between loading and modelling.
//!
//! A [`Dataset`] holds named, typed columns of equal length. Cells may be
//! missing (`None`). The row count is fixed once the table is built; only
//! column drops and missing-value fills mutate it afterwards.
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Numeric,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Numeric => write!(f, "numeric"),
            DataType::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self.data {
            ColumnData::Numeric(_) => DataType::Numeric,
            ColumnData::Text(_) => DataType::Text,
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    /// Non-missing values of a numeric column, in row order.
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        self.as_numeric()
            .map(|values| values.iter().flatten().copied().collect())
    }

    /// Cell rendered as text; missing cells render as `NaN`.
    pub fn cell_to_string(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Numeric(v) => match v[row] {
                Some(value) => format_number(value),
                None => "NaN".to_string(),
            },
            ColumnData::Text(v) => match &v[row] {
                Some(value) => value.clone(),
                None => "NaN".to_string(),
            },
        }
    }

    /// Occurrences of each distinct non-missing value, most frequent first.
    /// Ties keep ascending value order.
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = match &self.data {
            ColumnData::Numeric(v) => {
                let mut map: BTreeMap<OrderedF64, usize> = BTreeMap::new();
                for value in v.iter().flatten() {
                    *map.entry(OrderedF64(*value)).or_default() += 1;
                }
                map.into_iter()
                    .map(|(k, c)| (format_number(k.0), c))
                    .collect()
            }
            ColumnData::Text(v) => {
                let mut map: BTreeMap<&str, usize> = BTreeMap::new();
                for value in v.iter().flatten() {
                    *map.entry(value.as_str()).or_default() += 1;
                }
                map.into_iter().map(|(k, c)| (k.to_string(), c)).collect()
            }
        };
        // stable sort keeps the ascending key order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Total order over finite floats, used as a map key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrderedF64(pub f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset {
            columns: Vec::new(),
        }
    }

    /// Build a table from columns of equal length with unique names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n_rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
                return Err(PipelineError::InvalidArgument(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    n_rows
                )));
            }
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(PipelineError::InvalidArgument(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Dataset { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
    }

    pub fn dtypes(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type()))
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.data_type() == DataType::Numeric)
            .collect()
    }

    /// Rename columns by exact name match. Pairs whose source name is absent
    /// are ignored. Returns how many columns were renamed.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) -> usize {
        let mut renamed = 0;
        for column in self.columns.iter_mut() {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.name) {
                column.name = (*to).to_string();
                renamed += 1;
            }
        }
        renamed
    }

    /// Drop the named columns. Every name must exist; nothing is dropped
    /// otherwise.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        if let Some(missing) = names.iter().find(|name| !self.has_column(name)) {
            return Err(PipelineError::ColumnNotFound((*missing).to_string()));
        }
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
        Ok(())
    }

    /// Separate the target column from the remaining feature columns.
    pub fn split_target(&self, target: &str) -> Result<(Dataset, Column)> {
        let target_column = self.column(target)?.clone();
        let features = self
            .columns
            .iter()
            .filter(|c| c.name != target)
            .cloned()
            .collect();
        Ok((Dataset { columns: features }, target_column))
    }

    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.null_count()))
            .collect()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// First `n` rows rendered as an aligned text table.
    pub fn head(&self, n: usize) -> String {
        let headers: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let rows = (0..n.min(self.n_rows()))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.cell_to_string(row))
                    .collect()
            })
            .collect::<Vec<Vec<String>>>();
        format_table(&headers, &rows)
    }
}

/// Render a right-aligned text table with a header line.
pub(crate) fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }
    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    let mut out = render(headers);
    for row in rows {
        out.push('\n');
        out.push_str(&render(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            Column::numeric("a", vec![Some(1.0), None, Some(3.0)]),
            Column::text("b", vec![Some("x".into()), Some("y".into()), None]),
            Column::numeric("c", vec![Some(0.5), Some(0.5), Some(2.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let result = Dataset::from_columns(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn drop_unknown_column_leaves_table_untouched() {
        let mut ds = sample();
        let err = ds.drop_columns(&["a", "zzz"]).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(name) if name == "zzz"));
        assert_eq!(ds.n_cols(), 3);
    }

    #[test]
    fn drop_keeps_row_count() {
        let mut ds = sample();
        ds.drop_columns(&["a", "b"]).unwrap();
        assert_eq!(ds.shape(), (3, 1));
        assert_eq!(ds.column_names(), vec!["c"]);
    }

    #[test]
    fn missing_counts_per_column() {
        let ds = sample();
        assert_eq!(
            ds.missing_counts(),
            vec![("a".to_string(), 1), ("b".to_string(), 1), ("c".to_string(), 0)]
        );
        assert_eq!(ds.total_missing(), 2);
    }

    #[test]
    fn value_counts_orders_by_frequency() {
        let ds = sample();
        let counts = ds.column("c").unwrap().value_counts();
        assert_eq!(counts, vec![("0.5".to_string(), 2), ("2.0".to_string(), 1)]);
    }

    #[test]
    fn split_target_removes_target_from_features() {
        let ds = sample();
        let (features, target) = ds.split_target("b").unwrap();
        assert_eq!(features.column_names(), vec!["a", "c"]);
        assert_eq!(target.name, "b");
        assert!(ds.split_target("missing").is_err());
    }

    #[test]
    fn head_renders_missing_as_nan() {
        let ds = sample();
        let head = ds.head(2);
        assert!(head.lines().next().unwrap().contains('a'));
        assert!(head.contains("NaN"));
        assert_eq!(head.lines().count(), 3);
    }
}
