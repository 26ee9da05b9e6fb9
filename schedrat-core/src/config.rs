use serde::{Deserialize, Serialize};

use crate::error::RationalizeError;
use crate::model::DistanceUnit;

/// immutable parameters of one rationalization run. passed by reference into each
/// component so that batches for different transit authorities can run side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationalizeConfig {
    /// descriptive name of the region or authority, echoed into run metadata
    pub region: String,
    /// unit for distance columns in output tables
    pub distance_unit: DistanceUnit,
    /// timing-status tokens that mark a stop as a timing point
    pub timing_statuses: Vec<String>,
    /// candidate pair generation for subsection equality
    pub match_strategy: MatchStrategy,
    pub period: PeriodConfig,
    /// write `.csv.gz` files instead of `.csv`
    pub compress_output: bool,
    /// if true, allow overwriting files in the output directory
    pub overwrite: bool,
}

impl Default for RationalizeConfig {
    fn default() -> Self {
        Self {
            region: String::from("default"),
            distance_unit: DistanceUnit::Meters,
            timing_statuses: vec![
                String::from("PTP"),
                String::from("principalTimingPoint"),
                String::from("true"),
                String::from("1"),
            ],
            match_strategy: MatchStrategy::AllPairs,
            period: PeriodConfig::default(),
            compress_output: false,
            overwrite: true,
        }
    }
}

impl RationalizeConfig {
    pub fn is_timing_point(&self, timing_status: Option<&str>) -> bool {
        match timing_status.map(str::trim) {
            None => false,
            Some(status) => self.timing_statuses.iter().any(|s| s == status),
        }
    }

    pub fn validate(&self) -> Result<(), RationalizeError> {
        self.period.validate()
    }
}

/// how candidate pairs of stop sequences are enumerated before the equality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// every unordered pair within a line
    #[default]
    AllPairs,
    /// only pairs whose stop sequences share a hash bucket
    Hashed,
}

/// parameters of the schedule period generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// period starts are rounded down to a multiple of this many minutes
    pub rounding_minutes: u32,
    /// minimum distance between consecutive period starts
    pub min_separation_minutes: u32,
    /// the last period of every group ends at this hour of the operating day
    pub day_end_hours: u32,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            rounding_minutes: 15,
            min_separation_minutes: 1,
            day_end_hours: 36,
        }
    }
}

impl PeriodConfig {
    pub fn validate(&self) -> Result<(), RationalizeError> {
        if self.rounding_minutes == 0 {
            return Err(RationalizeError::InvalidConfiguration(String::from(
                "period.rounding_minutes must be greater than zero",
            )));
        }
        if self.min_separation_minutes == 0 {
            return Err(RationalizeError::InvalidConfiguration(String::from(
                "period.min_separation_minutes must be greater than zero",
            )));
        }
        if self.day_end_hours < 24 {
            return Err(RationalizeError::InvalidConfiguration(format!(
                "period.day_end_hours must cover at least one day, found {}",
                self.day_end_hours
            )));
        }
        Ok(())
    }
}
