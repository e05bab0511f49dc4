use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::units::TimeUnit;

#[derive(Parser, Debug)]
#[command(
    name = "vsm-timemap",
    about = "Render value stream map timelines",
    long_about = "Read CSV files with columns (task), (lead time), (process time), \
                  (%C&A) and render one timeline chart per file."
)]
pub struct RenderConfig {
    /// Input CSV files, one chart each
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Chart title (defaults to the input file name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Image width
    #[arg(short = 'W', long, default_value_t = 800)]
    pub width: u32,

    /// Image height
    #[arg(short = 'H', long, default_value_t = 350)]
    pub height: u32,

    /// Maximum value of the time axis, shared by every chart
    #[arg(short = 'x', long)]
    pub xrange: Option<f64>,

    /// Display unit: h, d (8h) or w (40h)
    #[arg(short, long, default_value = "h")]
    pub unit: String,

    /// Number of worst tasks to highlight per metric
    #[arg(short = 'k', long, default_value_t = 3)]
    pub outliers: usize,

    /// Directory for the rendered PNG files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write the layout plan as JSON next to each PNG
    #[arg(long)]
    pub plan: bool,

    /// TTF/OTF font used for labels; without one only shapes are drawn
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Log computed thresholds and per-file details
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated parameters of the metrics and layout pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub unit: TimeUnit,
    /// Worst rows highlighted per metric.
    pub outliers: usize,
    pub axis_max: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            unit: TimeUnit::Hours,
            outliers: 3,
            axis_max: None,
        }
    }
}

impl RenderConfig {
    /// Checks every option before any input is processed.
    pub fn engine(&self) -> Result<EngineConfig, ConfigError> {
        if self.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.outliers == 0 {
            return Err(ConfigError::NonPositiveOutliers);
        }
        if let Some(max) = self.xrange {
            if !(max.is_finite() && max > 0.0) {
                return Err(ConfigError::InvalidAxisMax(max));
            }
        }

        Ok(EngineConfig {
            unit: self.unit.parse()?,
            outliers: self.outliers,
            axis_max: self.xrange,
        })
    }

    /// Title for the chart of `input`.
    pub fn title_for(&self, input: &Path) -> String {
        self.title.clone().unwrap_or_else(|| file_stem(input))
    }

    pub fn png_path(&self, input: &Path) -> PathBuf {
        self.output_dir.join(format!("{}.png", file_stem(input)))
    }

    pub fn plan_path(&self, input: &Path) -> PathBuf {
        self.output_dir.join(format!("{}.json", file_stem(input)))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "timemap".to_string(), |s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RenderConfig {
        RenderConfig::try_parse_from(std::iter::once("vsm-timemap").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_to_hours_and_standard_size() {
        let config = parse(&["steps.csv"]);
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 350);
        assert_eq!(config.engine().unwrap(), EngineConfig::default());
        assert_eq!(config.title_for(Path::new("data/steps.csv")), "steps");
        assert_eq!(config.png_path(Path::new("data/steps.csv")), Path::new("./steps.png"));
    }

    #[test]
    fn parses_engine_options() {
        let config = parse(&["-u", "weeks", "-k", "2", "-x", "120", "a.csv", "b.csv"]);
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(
            config.engine().unwrap(),
            EngineConfig {
                unit: TimeUnit::Weeks,
                outliers: 2,
                axis_max: Some(120.0),
            }
        );
    }

    #[test]
    fn rejects_unknown_unit() {
        let config = parse(&["-u", "months", "a.csv"]);
        assert_eq!(
            config.engine(),
            Err(ConfigError::UnknownUnit("months".to_string()))
        );
    }

    #[test]
    fn rejects_zero_outliers() {
        let config = parse(&["-k", "0", "a.csv"]);
        assert_eq!(config.engine(), Err(ConfigError::NonPositiveOutliers));
    }

    #[test]
    fn rejects_bad_dimensions_and_axis() {
        assert!(matches!(
            parse(&["-W", "0", "a.csv"]).engine(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert_eq!(
            parse(&["--xrange=-5", "a.csv"]).engine(),
            Err(ConfigError::InvalidAxisMax(-5.0))
        );
    }

    #[test]
    fn explicit_title_and_output_dir() {
        let config = parse(&["-t", "Release flow", "-o", "out", "--plan", "a.csv"]);
        assert_eq!(config.title_for(Path::new("a.csv")), "Release flow");
        assert_eq!(config.plan_path(Path::new("a.csv")), Path::new("out/a.json"));
        assert!(config.plan);
    }

    #[test]
    fn requires_an_input() {
        assert!(RenderConfig::try_parse_from(["vsm-timemap"]).is_err());
    }
}
