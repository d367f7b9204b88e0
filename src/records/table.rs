use std::collections::HashMap;

use serde_json::Value;

static NULL: Value = Value::Null;

pub type Row = HashMap<String, Value>;

/// Ordered rows over a growing column set. Missing cells read as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column.into());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn add_column(&mut self, name: String) {
        if !self.has_column(&name) {
            self.columns.push(name);
        }
    }

    /// Append a row given as ordered cells; unseen columns are added in that order.
    pub fn push_row(&mut self, cells: Vec<(String, Value)>) {
        let mut row = Row::with_capacity(cells.len());
        for (column, value) in cells {
            self.add_column(column.clone());
            row.insert(column, value);
        }
        self.rows.push(row);
    }

    /// Concatenate another table below this one.
    pub fn extend(&mut self, other: Table) {
        for column in other.columns {
            self.add_column(column);
        }
        self.rows.extend(other.rows);
    }

    pub fn cell(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|row| row.get(column))
            .unwrap_or(&NULL)
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL))
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }
}
