use std::collections::HashMap;
use std::path::{Path, PathBuf};

use schedrat_core::config::RationalizeConfig;
use schedrat_core::error::{BatchWarning, RationalizeError};
use schedrat_core::model::{
    malformed, JourneyPatternRecord, LineRecord, StopPlaceRecord, TimingLink, TimingLinkRecord,
    VehicleJourney, VehicleJourneyLinkOverride, VehicleJourneyLinkRecord, VehicleJourneyRecord,
};
use serde::de::DeserializeOwned;

use super::fs::{open_table, table_path};

pub const LINES_TABLE: &str = "lines";
pub const JOURNEY_PATTERNS_TABLE: &str = "journey_patterns";
pub const TIMING_LINKS_TABLE: &str = "timing_links";
pub const VEHICLE_JOURNEYS_TABLE: &str = "vehicle_journeys";
pub const VEHICLE_JOURNEY_LINKS_TABLE: &str = "vehicle_journey_timing_links";
pub const STOP_PLACES_TABLE: &str = "stop_places";

/// the raw tables of one batch directory, as read from disk.
#[derive(Debug, Default)]
pub struct BatchInput {
    pub name: String,
    pub lines: Vec<LineRecord>,
    pub journey_patterns: Vec<JourneyPatternRecord>,
    pub timing_links: Vec<TimingLinkRecord>,
    pub vehicle_journeys: Vec<VehicleJourneyRecord>,
    pub vehicle_journey_links: Vec<VehicleJourneyLinkRecord>,
    pub stop_places: Vec<StopPlaceRecord>,
}

/// a batch whose rows have been validated into typed values. rows that could
/// not be validated are gone and accounted for in `warnings`.
#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub name: String,
    pub timing_links: Vec<TimingLink>,
    pub journey_patterns: Vec<JourneyPatternRecord>,
    pub vehicle_journeys: Vec<VehicleJourney>,
    pub link_overrides: Vec<VehicleJourneyLinkOverride>,
    pub stop_places: Vec<StopPlaceRecord>,
    pub warnings: Vec<BatchWarning>,
}

/// true if the directory holds a timing link table.
pub fn is_batch_directory(path: &Path) -> bool {
    path.is_dir() && table_path(path, TIMING_LINKS_TABLE).is_some()
}

/// the batch directories to process: the input itself if it is a batch, otherwise
/// every batch directory directly below it, sorted by path.
pub fn batch_directories(input: &Path) -> Result<Vec<PathBuf>, RationalizeError> {
    if is_batch_directory(input) {
        return Ok(vec![input.to_path_buf()]);
    }
    let read_error = |e: std::io::Error| RationalizeError::TableRead {
        path: input.to_path_buf(),
        message: format!("failure reading directory: {e}"),
    };
    let mut batches = input
        .read_dir()
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| is_batch_directory(path))
        .collect::<Vec<_>>();
    batches.sort();
    Ok(batches)
}

/// reads all tables of a batch directory. `lines` and `timing_links` are
/// required, the remaining tables are empty when absent.
///
/// # Errors
///
/// `TableRead` when a required table is missing or a file cannot be opened or
/// parsed as csv. rows that fail to deserialize are skipped with a
/// `MalformedInput` warning instead.
pub fn read_batch(directory: &Path) -> Result<(BatchInput, Vec<BatchWarning>), RationalizeError> {
    let name = directory
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("batch")
        .to_string();
    log::debug!("reading batch {name} from {}", directory.display());
    let mut warnings = vec![];
    let input = BatchInput {
        name,
        lines: read_table(directory, LINES_TABLE, true, &mut warnings)?,
        journey_patterns: read_table(directory, JOURNEY_PATTERNS_TABLE, false, &mut warnings)?,
        timing_links: read_table(directory, TIMING_LINKS_TABLE, true, &mut warnings)?,
        vehicle_journeys: read_table(directory, VEHICLE_JOURNEYS_TABLE, false, &mut warnings)?,
        vehicle_journey_links: read_table(
            directory,
            VEHICLE_JOURNEY_LINKS_TABLE,
            false,
            &mut warnings,
        )?,
        stop_places: read_table(directory, STOP_PLACES_TABLE, false, &mut warnings)?,
    };
    log::info!(
        "batch {}: {} lines, {} timing links, {} vehicle journeys",
        input.name,
        input.lines.len(),
        input.timing_links.len(),
        input.vehicle_journeys.len()
    );
    Ok((input, warnings))
}

fn read_table<T>(
    directory: &Path,
    table: &str,
    required: bool,
    warnings: &mut Vec<BatchWarning>,
) -> Result<Vec<T>, RationalizeError>
where
    T: DeserializeOwned,
{
    let Some((filepath, mut reader)) = open_table(directory, table)? else {
        if required {
            return Err(RationalizeError::TableRead {
                path: directory.join(format!("{table}.csv")),
                message: String::from("required table is missing"),
            });
        }
        return Ok(vec![]);
    };
    let headers = reader
        .headers()
        .map_err(|e| RationalizeError::TableRead {
            path: filepath.clone(),
            message: format!("failure reading header row: {e}"),
        })?
        .clone();

    let mut rows = vec![];
    for (idx, record) in reader.records().enumerate() {
        // header is line 1
        let row = format!("line {}", idx + 2);
        let record = record.map_err(|e| RationalizeError::TableRead {
            path: filepath.clone(),
            message: format!("{row}: {e}"),
        })?;
        match record.deserialize::<T>(Some(&headers)) {
            Ok(value) => rows.push(value),
            Err(e) => warnings.push(malformed(table, &row, &e.to_string())),
        }
    }
    Ok(rows)
}

/// turns raw records into typed rows. timing links take their line name from
/// the lines table; a link on an unknown line is excluded.
pub fn validate_batch(input: BatchInput, config: &RationalizeConfig) -> ValidatedBatch {
    let mut warnings = vec![];
    let line_names: HashMap<(String, String), String> = input
        .lines
        .into_iter()
        .map(|l| ((l.data_source_id, l.line_id), l.line_name))
        .collect();

    let mut timing_links = Vec::with_capacity(input.timing_links.len());
    for record in input.timing_links.into_iter() {
        let line_key = (record.data_source_id.clone(), record.line_id.clone());
        let Some(line_name) = line_names.get(&line_key) else {
            let message = format!("unknown line {}", record.line_id);
            warnings.push(malformed(TIMING_LINKS_TABLE, &record.row_label(), &message));
            continue;
        };
        match record.validate(line_name, config) {
            Ok((link, link_warnings)) => {
                timing_links.push(link);
                warnings.extend(link_warnings);
            }
            Err(warning) => warnings.push(warning),
        }
    }

    let mut vehicle_journeys = Vec::with_capacity(input.vehicle_journeys.len());
    for record in input.vehicle_journeys.into_iter() {
        match record.validate() {
            Ok(journey) => vehicle_journeys.push(journey),
            Err(warning) => warnings.push(warning),
        }
    }

    let mut link_overrides = Vec::with_capacity(input.vehicle_journey_links.len());
    for record in input.vehicle_journey_links.into_iter() {
        let (link_override, override_warnings) = record.validate();
        link_overrides.push(link_override);
        warnings.extend(override_warnings);
    }

    log::debug!(
        "batch {}: {} timing links and {} vehicle journeys passed validation",
        input.name,
        timing_links.len(),
        vehicle_journeys.len()
    );
    ValidatedBatch {
        name: input.name,
        timing_links,
        journey_patterns: input.journey_patterns,
        vehicle_journeys,
        link_overrides,
        stop_places: input.stop_places,
        warnings,
    }
}
