use serde::{Deserialize, Serialize};

use crate::error::BatchWarning;
use crate::model::timing_link::{malformed, non_empty, read_duration};
use crate::model::{DayType, OperatingDays, ServiceTime};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub data_source_id: String,
    pub line_id: String,
    pub line_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPatternRecord {
    pub data_source_id: String,
    pub journey_pattern_id: String,
    pub line_id: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub destination_display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleJourneyRecord {
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub line_id: String,
    pub journey_pattern_id: String,
    pub departure_time: String,
    #[serde(default)]
    pub days_of_week: Option<String>,
}

/// one scheduled trip of a journey pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleJourney {
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub line_id: String,
    pub journey_pattern_id: String,
    pub departure_time: ServiceTime,
    pub day_type: DayType,
    pub operating_days: OperatingDays,
}

impl VehicleJourneyRecord {
    pub fn validate(self) -> Result<VehicleJourney, BatchWarning> {
        let row = format!("{}/{}", self.data_source_id, self.vehicle_journey_code);
        let departure_time = ServiceTime::parse(&self.departure_time)
            .map_err(|e| malformed("vehicle_journeys", &row, &e))?;
        let days_of_week = non_empty(self.days_of_week);
        let day_type = DayType::from_days_of_week(days_of_week.as_deref());
        let operating_days = OperatingDays::new(day_type, days_of_week.as_deref());
        Ok(VehicleJourney {
            data_source_id: self.data_source_id,
            vehicle_journey_code: self.vehicle_journey_code,
            line_id: self.line_id,
            journey_pattern_id: self.journey_pattern_id,
            departure_time,
            day_type,
            operating_days,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleJourneyLinkRecord {
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub timing_link_id: String,
    #[serde(default)]
    pub run_time: Option<String>,
    #[serde(default)]
    pub from_wait_time: Option<String>,
    #[serde(default)]
    pub to_wait_time: Option<String>,
}

/// per-trip replacement of the run and wait times declared on a pattern's timing link.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleJourneyLinkOverride {
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub timing_link_id: String,
    pub run_time_seconds: Option<u32>,
    pub from_wait_seconds: Option<u32>,
    pub to_wait_seconds: Option<u32>,
}

impl VehicleJourneyLinkRecord {
    pub fn validate(self) -> (VehicleJourneyLinkOverride, Vec<BatchWarning>) {
        let row = format!(
            "{}/{} link {}",
            self.data_source_id, self.vehicle_journey_code, self.timing_link_id
        );
        let mut warnings = vec![];
        let run_time_seconds = read_duration(self.run_time.as_deref(), &row, &mut warnings);
        let from_wait_seconds = read_duration(self.from_wait_time.as_deref(), &row, &mut warnings);
        let to_wait_seconds = read_duration(self.to_wait_time.as_deref(), &row, &mut warnings);
        let link_override = VehicleJourneyLinkOverride {
            data_source_id: self.data_source_id,
            vehicle_journey_code: self.vehicle_journey_code,
            timing_link_id: self.timing_link_id,
            run_time_seconds,
            from_wait_seconds,
            to_wait_seconds,
        };
        (link_override, warnings)
    }
}

/// place code of a stop, produced by the external abbreviation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPlaceRecord {
    pub stop_id: String,
    pub place: String,
}
