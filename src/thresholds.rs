use serde::Serialize;

use crate::metrics::{AugmentedDataset, Measured};

/// Cutoffs marking the worst rows for highlighting. `None` means there were
/// no positive candidates and nothing is flagged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Thresholds {
    /// Completeness at or below this marks a high-error row.
    pub ca_threshold: Option<f64>,
    /// Activity ratio at or above this marks a long lead-time row.
    pub ar_threshold: Option<f64>,
}

impl Thresholds {
    pub fn is_high_error(&self, row: &Measured) -> bool {
        self.ca_threshold
            .is_some_and(|t| row.completeness_rate > 0.0 && row.completeness_rate <= t)
    }

    pub fn is_long_lead(&self, row: &Measured) -> bool {
        self.ar_threshold
            .is_some_and(|t| row.activity_ratio > 0.0 && row.activity_ratio >= t)
    }
}

/// Ascending positive values, ignoring zero (unmeasured) and negatives.
fn positive_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.filter(|&x| x > 0.0).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Picks the cutoffs that single out the `k` worst rows.
///
/// The rollup is among the candidates but is never flagged by the layout, so
/// the cutoff is taken at rank `k + 1`. With fewer candidates the cutoff falls
/// back to the least extreme one available.
pub fn select(dataset: &AugmentedDataset, k: usize) -> Thresholds {
    let ca = positive_sorted(dataset.iter().map(|m| m.completeness_rate));
    let ar = positive_sorted(dataset.iter().map(|m| m.activity_ratio));

    Thresholds {
        ca_threshold: ca.get(k.min(ca.len().saturating_sub(1))).copied(),
        ar_threshold: ar.iter().rev().nth(k.min(ar.len().saturating_sub(1))).copied(),
    }
}
