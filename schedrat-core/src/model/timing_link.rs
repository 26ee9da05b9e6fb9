use serde::{Deserialize, Serialize};

use crate::config::RationalizeConfig;
use crate::error::BatchWarning;
use crate::model::duration::parse_duration_seconds;
use crate::model::DistanceCell;

/// a timing link row as handed over by the ingestion adapter. all text cells are
/// kept raw here; [`TimingLinkRecord::validate`] turns them into a [`TimingLink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingLinkRecord {
    pub data_source_id: String,
    pub line_id: String,
    pub journey_pattern_id: String,
    #[serde(default)]
    pub timing_link_id: Option<String>,
    pub section_position: u32,
    pub link_position_in_section: u32,
    #[serde(default)]
    pub from_stop_id: Option<String>,
    #[serde(default)]
    pub to_stop_id: Option<String>,
    #[serde(default)]
    pub from_timing_status: Option<String>,
    #[serde(default)]
    pub to_timing_status: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub run_time: Option<String>,
    #[serde(default)]
    pub from_wait_time: Option<String>,
    #[serde(default)]
    pub to_wait_time: Option<String>,
}

/// one directed edge of a journey pattern, ordered within the pattern by
/// `(section_position, link_position_in_section)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingLink {
    pub data_source_id: String,
    pub line_id: String,
    pub line_name: String,
    pub journey_pattern_id: String,
    pub timing_link_id: Option<String>,
    pub section_position: u32,
    pub link_position_in_section: u32,
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub from_is_timing_point: bool,
    pub to_is_timing_point: bool,
    /// meters, `None` when unknown
    pub distance_meters: Option<f64>,
    pub run_time_seconds: u32,
    pub from_wait_seconds: Option<u32>,
    pub to_wait_seconds: Option<u32>,
}

impl TimingLinkRecord {
    /// short human-readable identity used in warnings
    pub fn row_label(&self) -> String {
        format!(
            "{}/{} section {} link {}",
            self.data_source_id,
            self.journey_pattern_id,
            self.section_position,
            self.link_position_in_section
        )
    }

    /// validates this record into a [`TimingLink`].
    ///
    /// # Result
    ///
    /// the typed link with any absorbed warnings, or a `MalformedInput` warning
    /// when a required stop id is missing and the row must be excluded.
    pub fn validate(
        self,
        line_name: &str,
        config: &RationalizeConfig,
    ) -> Result<(TimingLink, Vec<BatchWarning>), BatchWarning> {
        let row = self.row_label();
        let from_stop_id = non_empty(self.from_stop_id).ok_or_else(|| {
            malformed("timing_links", &row, "missing fromStopId")
        })?;
        let to_stop_id =
            non_empty(self.to_stop_id).ok_or_else(|| malformed("timing_links", &row, "missing toStopId"))?;

        let mut warnings = vec![];
        let distance_cell = DistanceCell::parse(self.distance.as_deref());
        if let (DistanceCell::Unparsable, Some(raw)) = (distance_cell, self.distance.as_ref()) {
            warnings.push(
                BatchWarning::UnresolvableDistance {
                    row: row.clone(),
                    raw: raw.clone(),
                }
                .logged(),
            );
        }
        let run_time_seconds =
            read_duration(self.run_time.as_deref(), &row, &mut warnings).unwrap_or_default();
        let from_wait_seconds = read_duration(self.from_wait_time.as_deref(), &row, &mut warnings);
        let to_wait_seconds = read_duration(self.to_wait_time.as_deref(), &row, &mut warnings);

        let link = TimingLink {
            data_source_id: self.data_source_id,
            line_id: self.line_id,
            line_name: line_name.to_string(),
            journey_pattern_id: self.journey_pattern_id,
            timing_link_id: non_empty(self.timing_link_id),
            section_position: self.section_position,
            link_position_in_section: self.link_position_in_section,
            from_stop_id,
            to_stop_id,
            from_is_timing_point: config.is_timing_point(self.from_timing_status.as_deref()),
            to_is_timing_point: config.is_timing_point(self.to_timing_status.as_deref()),
            distance_meters: distance_cell.meters(),
            run_time_seconds,
            from_wait_seconds,
            to_wait_seconds,
        };
        Ok((link, warnings))
    }
}

/// treats empty or whitespace-only cells as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn malformed(table: &str, row: &str, message: &str) -> BatchWarning {
    BatchWarning::MalformedInput {
        table: table.to_string(),
        row: row.to_string(),
        message: message.to_string(),
    }
    .logged()
}

/// reads an optional duration cell. absent stays absent; unreadable values become
/// zero seconds with an `UnresolvableDuration` warning.
pub fn read_duration(
    raw: Option<&str>,
    row: &str,
    warnings: &mut Vec<BatchWarning>,
) -> Option<u32> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match parse_duration_seconds(value) {
        Ok(seconds) => Some(seconds),
        Err(_) => {
            warnings.push(
                BatchWarning::UnresolvableDuration {
                    row: row.to_string(),
                    raw: value.to_string(),
                }
                .logged(),
            );
            Some(0)
        }
    }
}
