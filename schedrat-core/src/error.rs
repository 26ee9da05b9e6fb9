use std::path::PathBuf;

use itertools::Itertools;

/// failures that abort a batch. no meaningful output table can be produced
/// once one of these is raised.
#[derive(thiserror::Error, Debug)]
pub enum RationalizeError {
    #[error("batch contains no lines with valid timing links")]
    NoLines,
    #[error("journey pattern {journey_pattern_id} on line {line_name} references subsection {subsection_id} which does not exist in the batch")]
    UnknownSubsection {
        line_name: String,
        journey_pattern_id: String,
        subsection_id: String,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failure reading table '{path}': {message}")]
    TableRead { path: PathBuf, message: String },
    #[error("failure writing table '{path}': {message}")]
    TableWrite { path: PathBuf, message: String },
    #[error("error due to dataset contents: {0}")]
    InvalidData(String),
    #[error("Internal Error: {0}")]
    Internal(String),
    #[error("errors encountered during batch processing: {0}")]
    BatchProcessing(String),
}

/// data-quality problems that are absorbed by a component. the offending row or
/// value is excluded or treated as unknown and the batch continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BatchWarning {
    #[error("malformed {table} row excluded ({row}): {message}")]
    MalformedInput {
        table: String,
        row: String,
        message: String,
    },
    #[error("distance '{raw}' on {row} is not a number, treated as unknown")]
    UnresolvableDistance { row: String, raw: String },
    #[error("duration '{raw}' on {row} is not an ISO-8601 duration, treated as 0 seconds")]
    UnresolvableDuration { row: String, raw: String },
    #[error("mapping chain starting at {start} revisits {revisited}, resolution stopped there")]
    CycleInMapping { start: String, revisited: String },
    #[error("stop {0} has no place code, using the stop id")]
    MissingPlace(String),
    #[error("vehicle journey {vehicle_journey_code} references journey pattern {journey_pattern_id} which has no timing links")]
    MissingJourneyPattern {
        vehicle_journey_code: String,
        journey_pattern_id: String,
    },
}

impl BatchWarning {
    /// writes this warning to the log and hands it back, for use when
    /// a warning is raised and collected in the same expression.
    pub fn logged(self) -> Self {
        log::warn!("{self}");
        self
    }
}

pub fn batch_processing_error(errors: &[RationalizeError]) -> RationalizeError {
    let concatenated = errors.iter().map(|e| e.to_string()).join("\n  ");
    RationalizeError::BatchProcessing(format!("[\n  {concatenated}\n]"))
}
