//! Sparse iteration-indexed table backing the logger.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Text(String),
    /// Path of the stored image file, relative to nothing in particular:
    /// exactly the string written into the data file.
    Image(String),
}

/// Rows are iteration numbers, columns are named series. Cells are sparse;
/// an absent entry is null.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    /// Column names in insertion order, mirrored as the CSV header order.
    order: Vec<String>,
    columns: HashMap<String, BTreeMap<i64, Value>>,
    /// Every iteration any column has ever been written at.
    rows: BTreeSet<i64>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Create an empty column. No-op if it already exists.
    pub fn add_column(&mut self, name: &str) {
        if !self.columns.contains_key(name) {
            self.order.push(name.to_string());
            self.columns.insert(name.to_string(), BTreeMap::new());
        }
    }

    /// Write a cell. The column must already exist.
    pub fn set(&mut self, name: &str, iteration: i64, value: Value) {
        if let Some(cells) = self.columns.get_mut(name) {
            cells.insert(iteration, value);
            self.rows.insert(iteration);
        }
    }

    pub fn get(&self, name: &str, iteration: i64) -> Option<&Value> {
        self.columns.get(name).and_then(|cells| cells.get(&iteration))
    }

    /// Number of distinct iterations present in the table. The default
    /// target row for a write.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.order.len()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// All iterations in ascending order.
    pub fn iterations(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().copied()
    }

    /// Iterations where `name` holds a value, ascending.
    pub fn non_null_index(&self, name: &str) -> Option<Vec<i64>> {
        self.columns.get(name).map(|cells| cells.keys().copied().collect())
    }

    /// The populated cells of `name` ordered by iteration.
    pub fn cells(&self, name: &str) -> Option<impl Iterator<Item = (i64, &Value)>> {
        self.columns
            .get(name)
            .map(|cells| cells.iter().map(|(it, v)| (*it, v)))
    }
}
