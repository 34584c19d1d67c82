use std::{collections::HashMap, path::Path};

use serde_json::Value;

use crate::{CrawlError, types::Record};

/// Collects JSON records and turns them into a [`Table`] in one go.
///
/// Columns are the record keys in the order they were first seen, followed by
/// any seed column no record carried. Cells missing from a record stay empty.
#[derive(Debug, Default)]
pub struct RowAccumulator {
    seed: Vec<String>,
    records: Vec<Record>,
}

impl RowAccumulator {
    /// Starts with a fixed header, so an empty result still has its columns.
    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            seed: columns.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, rows: Vec<Record>) -> &mut Self {
        self.records.extend(rows);
        self
    }

    pub fn build(self) -> Table {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let keys = self.records.iter().flat_map(|r| r.keys()).chain(self.seed.iter());
        for key in keys {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }

        let rows = self
            .records
            .into_iter()
            .map(|record| {
                let mut row = vec![String::new(); columns.len()];
                for (key, value) in record {
                    if let Some(&i) = index.get(&key) {
                        row[i] = cell(&value);
                    }
                }
                row
            })
            .collect();

        Table { columns, rows }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Row-major table of string cells with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require(&self, name: &str) -> Result<usize, CrawlError> {
        self.column_index(name)
            .ok_or_else(|| CrawlError::Table(format!("missing column '{name}'")))
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), CrawlError> {
        if row.len() != self.columns.len() {
            return Err(CrawlError::Table(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let i = self.column_index(column)?;
        self.rows.get(row).map(|r| r[i].as_str())
    }

    /// Every value of a column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<String>, CrawlError> {
        let i = self.require(name)?;
        Ok(self.rows.iter().map(|r| r[i].clone()).collect())
    }

    /// Renames a column if it exists.
    pub fn rename(&mut self, from: &str, to: &str) -> &mut Self {
        if let Some(i) = self.column_index(from) {
            self.columns[i] = to.to_string();
        }
        self
    }

    /// Keeps the first row of every distinct combination of `keys`.
    pub fn dedupe_on(&self, keys: &[&str]) -> Result<Table, CrawlError> {
        let idx = keys
            .iter()
            .map(|k| self.require(k))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = std::collections::HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| seen.insert(idx.iter().map(|&i| row[i].clone()).collect::<Vec<_>>()))
            .cloned()
            .collect();

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Inner join on `key`. Left row order is kept; for each left row the
    /// matching right rows follow in their own order. Rows with an empty key
    /// never match. Non-key columns present on both sides get `_x` and `_y`
    /// suffixes.
    pub fn inner_join(&self, right: &Table, key: &str) -> Result<Table, CrawlError> {
        let lk = self.require(key)?;
        let rk = right.require(key)?;

        let mut lookup: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if !row[rk].is_empty() {
                lookup.entry(row[rk].as_str()).or_default().push(i);
            }
        }

        let right_keep: Vec<usize> = (0..right.columns.len()).filter(|&i| i != rk).collect();

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let clash = i != lk && right_keep.iter().any(|&j| right.columns[j] == *c);
                if clash { format!("{c}_x") } else { c.clone() }
            })
            .collect();
        for &j in &right_keep {
            let c = &right.columns[j];
            let clash = self
                .columns
                .iter()
                .enumerate()
                .any(|(i, l)| i != lk && l == c);
            columns.push(if clash { format!("{c}_y") } else { c.clone() });
        }

        let mut rows = Vec::new();
        for left in &self.rows {
            let Some(matches) = lookup.get(left[lk].as_str()) else {
                continue;
            };
            for &m in matches {
                let mut row = left.clone();
                row.extend(right_keep.iter().map(|&j| right.rows[m][j].clone()));
                rows.push(row);
            }
        }

        Ok(Table { columns, rows })
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, CrawlError> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| CrawlError::Io(e.into_error()))
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Table, CrawlError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut table = Table::new(columns);
        if table.columns.is_empty() {
            return Ok(table);
        }

        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(|c| c.to_string()).collect())?;
        }
        Ok(table)
    }

    pub async fn write_csv(&self, path: &Path) -> Result<(), CrawlError> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let bytes = self.to_csv_bytes()?;
        async_fs::write(path, bytes).await?;
        Ok(())
    }

    pub async fn read_csv(path: &Path) -> Result<Table, CrawlError> {
        let bytes = async_fs::read(path).await?;
        Table::from_csv_bytes(&bytes)
    }
}
