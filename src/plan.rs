use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::config::EngineConfig;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::layout::{layout, LayoutElement};
use crate::metrics::augment;
use crate::thresholds::{select, Thresholds};
use crate::units::{convert, TimeUnit};

/// Everything a renderer needs to draw one timemap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPlan {
    pub title: String,
    pub unit: TimeUnit,
    /// Requested axis maximum; widens the drawn range, never moves bars.
    pub axis_max: Option<f64>,
    pub thresholds: Thresholds,
    pub elements: Vec<LayoutElement>,
}

impl ChartPlan {
    /// Runs the full pipeline: unit conversion, rollup, thresholds, layout.
    pub fn build(dataset: &Dataset, title: impl Into<String>, config: &EngineConfig) -> Self {
        let converted = convert(dataset, config.unit);
        let augmented = augment(&converted);
        let thresholds = select(&augmented, config.outliers);
        debug!(
            ca = ?thresholds.ca_threshold,
            ar = ?thresholds.ar_threshold,
            k = config.outliers,
            "selected outlier thresholds"
        );
        let elements = layout(&augmented, &thresholds, config.unit);

        ChartPlan {
            title: title.into(),
            unit: config.unit,
            axis_max: config.axis_max,
            thresholds,
            elements,
        }
    }

    /// Right end of the horizontal range: the furthest bar end, or the
    /// requested axis maximum if that is further.
    pub fn extent(&self) -> f64 {
        let bars = self
            .elements
            .iter()
            .map(|e| e.bar_outer.end().max(e.bar_inner.end()))
            .fold(0.0, f64::max);
        self.axis_max.map_or(bars, |max| bars.max(max))
    }

    /// Number of vertical slots, rollup included.
    pub fn rows(&self) -> usize {
        self.elements.len()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| Error::io(path, e))
    }
}
