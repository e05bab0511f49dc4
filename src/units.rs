use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::data::{Dataset, Row};
use crate::error::ConfigError;

/// Display unit for lead and process times. Raw input is always hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Hours,
    /// Working days of 8 hours.
    Days,
    /// Working weeks of 40 hours.
    Weeks,
}

impl TimeUnit {
    /// Hours per unit.
    pub fn factor(self) -> f64 {
        match self {
            TimeUnit::Hours => 1.0,
            TimeUnit::Days => 8.0,
            TimeUnit::Weeks => 40.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
            TimeUnit::Weeks => "w",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            "w" | "week" | "weeks" => Ok(TimeUnit::Weeks),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

/// Rescales every row's lead and process time from hours into `unit`.
/// Completeness is a ratio and passes through unchanged.
pub fn convert(dataset: &Dataset, unit: TimeUnit) -> Dataset {
    let factor = unit.factor();
    dataset
        .iter()
        .map(|row| Row {
            name: row.name.clone(),
            lead_time: row.lead_time / factor,
            process_time: row.process_time / factor,
            completeness_rate: row.completeness_rate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("h".parse::<TimeUnit>(), Ok(TimeUnit::Hours));
        assert_eq!("Days".parse::<TimeUnit>(), Ok(TimeUnit::Days));
        assert_eq!("w".parse::<TimeUnit>(), Ok(TimeUnit::Weeks));
        assert_eq!(
            "fortnights".parse::<TimeUnit>(),
            Err(ConfigError::UnknownUnit("fortnights".to_string()))
        );
    }

    #[test]
    fn converts_to_days_and_keeps_completeness() {
        let data: Dataset = [Row::new("Build", 20.0, 16.0, 80.0)].into_iter().collect();
        let days = convert(&data, TimeUnit::Days);
        assert_eq!(days.rows()[0], Row::new("Build", 2.5, 2.0, 80.0));
    }

    #[test]
    fn hours_is_identity() {
        let data: Dataset = [Row::new("A", 7.0, 3.0, 0.0)].into_iter().collect();
        assert_eq!(convert(&data, TimeUnit::Hours), data);
    }

    proptest! {
        #[test]
        fn inverse_scaling_restores_times(
            lead in 0.0f64..10_000.0,
            process in 0.0f64..10_000.0,
            unit in prop_oneof![Just(TimeUnit::Hours), Just(TimeUnit::Days), Just(TimeUnit::Weeks)],
        ) {
            let data: Dataset = [Row::new("T", lead, process, 50.0)].into_iter().collect();
            let converted = convert(&data, unit);
            let row = &converted.rows()[0];
            let tolerance = 1e-9 * lead.max(process).max(1.0);
            prop_assert!((row.lead_time * unit.factor() - lead).abs() <= tolerance);
            prop_assert!((row.process_time * unit.factor() - process).abs() <= tolerance);
        }
    }
}
