use serde::Serialize;

use crate::data::{Dataset, Row};

/// Label shown for the synthesized rollup row.
pub const ROLLUP_LABEL: &str = "Overall";

/// A row with its derived idle time attached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measured {
    pub name: String,
    pub lead_time: f64,
    pub process_time: f64,
    pub completeness_rate: f64,
    /// Lead time minus process time: how long the work sat idle.
    pub activity_ratio: f64,
}

impl Measured {
    fn from_parts(name: &str, lead_time: f64, process_time: f64, completeness_rate: f64) -> Self {
        Measured {
            name: name.to_string(),
            lead_time,
            process_time,
            completeness_rate,
            activity_ratio: lead_time - process_time,
        }
    }

    /// Share of the lead time spent actively working, as a percentage.
    pub fn efficiency(&self) -> Option<f64> {
        (self.lead_time > 0.0).then(|| 100.0 * self.process_time / self.lead_time)
    }
}

impl From<&Row> for Measured {
    fn from(row: &Row) -> Self {
        Measured::from_parts(
            &row.name,
            row.lead_time,
            row.process_time,
            row.completeness_rate,
        )
    }
}

/// Task rows plus the rollup, which is held apart so it can never collide
/// with a task name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AugmentedDataset {
    pub tasks: Vec<Measured>,
    pub rollup: Measured,
}

impl AugmentedDataset {
    /// Tasks in input order followed by the rollup.
    pub fn iter(&self) -> impl Iterator<Item = &Measured> {
        self.tasks.iter().chain(std::iter::once(&self.rollup))
    }

    /// Row count including the rollup.
    pub fn len(&self) -> usize {
        self.tasks.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Compounds per-task completeness into one rate. Unmeasured tasks count as
/// 100% so a single missing value does not zero the rollup.
fn compound_completeness<'a>(rows: impl IntoIterator<Item = &'a Row>) -> f64 {
    let product: f64 = rows
        .into_iter()
        .map(|row| {
            if row.completeness_rate == 0.0 {
                1.0
            } else {
                row.completeness_rate / 100.0
            }
        })
        .product();
    product * 100.0
}

/// Derives the rollup row and each row's activity ratio.
///
/// Call once per pipeline run, after unit conversion.
pub fn augment(dataset: &Dataset) -> AugmentedDataset {
    let lead_time: f64 = dataset.iter().map(|r| r.lead_time).sum();
    let process_time: f64 = dataset.iter().map(|r| r.process_time).sum();
    let completeness_rate = compound_completeness(dataset);

    AugmentedDataset {
        tasks: dataset.iter().map(Measured::from).collect(),
        rollup: Measured::from_parts(ROLLUP_LABEL, lead_time, process_time, completeness_rate),
    }
}
