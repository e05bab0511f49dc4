use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

/// Number of fields in a task record: name, lead time, process time, %C&A.
const RECORD_FIELDS: usize = 4;

/// One process step, with times in the unit of the current pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    pub lead_time: f64,
    pub process_time: f64,
    /// Percentage complete and accurate; `0` means not measured.
    pub completeness_rate: f64,
}

impl Row {
    pub fn new(
        name: impl Into<String>,
        lead_time: f64,
        process_time: f64,
        completeness_rate: f64,
    ) -> Self {
        Row {
            name: name.into(),
            lead_time,
            process_time,
            completeness_rate,
        }
    }
}

/// Ordered task rows, keyed by name. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `row`, or replaces the values of an existing row with the same
    /// name while keeping its original position.
    pub fn insert(&mut self, row: Row) {
        match self.rows.iter_mut().find(|r| r.name == row.name) {
            Some(existing) => {
                warn!(task = %row.name, "duplicate task name, later values win");
                *existing = row;
            }
            None => self.rows.push(row),
        }
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

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for row in iter {
            dataset.insert(row);
        }
        dataset
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Reads task records from CSV text.
///
/// There is no header row, `#` starts a comment line and `|` quotes fields.
/// Records without exactly four fields are skipped with a warning.
pub fn read_data<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .quote(b'|')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut dataset = Dataset::new();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        if record.len() != RECORD_FIELDS {
            warn!(
                line,
                fields = record.len(),
                "expected {RECORD_FIELDS} columns, got {}, skipping: {}",
                record.len(),
                record.iter().collect::<Vec<_>>().join(",")
            );
            continue;
        }

        let row: Row = record.deserialize(None).map_err(|e| Error::InvalidRecord {
            line,
            reason: e.to_string(),
        })?;

        if row.name.is_empty() {
            return Err(Error::InvalidRecord {
                line,
                reason: "empty task name".to_string(),
            });
        }
        let values = [row.lead_time, row.process_time, row.completeness_rate];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRecord {
                line,
                reason: format!("non-finite value in task {:?}", row.name),
            });
        }

        dataset.insert(row);
    }

    Ok(dataset)
}

pub fn load_data(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    read_data(file)
}
