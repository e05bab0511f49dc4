//! Value stream map timelines.
//!
//! A CSV of process steps (task, lead time, process time, %C&A) goes through
//! a fixed pipeline: [`units::convert`] rescales the times, [`metrics::augment`]
//! adds the `Overall` rollup and idle times, [`thresholds::select`] picks the
//! outlier cutoffs and [`layout::layout`] positions every bar and label on a
//! shared time axis. [`plan::ChartPlan`] runs the pipeline and
//! [`render`] draws the result to PNG.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod plan;
pub mod render;
pub mod text;
pub mod thresholds;
pub mod units;

pub use config::{EngineConfig, RenderConfig};
pub use data::{Dataset, Row};
pub use error::{ConfigError, Error, Result};
pub use layout::{LayoutElement, RowKind};
pub use plan::ChartPlan;
pub use units::TimeUnit;
