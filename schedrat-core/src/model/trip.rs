use serde::{Deserialize, Serialize};

use crate::model::{DayType, DistanceColumns, DistanceUnit, OperatingDays, ServiceTime};

/// one row per vehicle journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripHeader {
    pub data_source_id: String,
    pub line_name: String,
    pub vehicle_journey_code: String,
    pub journey_pattern_id: String,
    pub variant_code: String,
    pub direction: Option<String>,
    pub destination_display: Option<String>,
    pub day_type: DayType,
    pub operating_days: OperatingDays,
    pub departure_time: ServiceTime,
    pub arrival_time: ServiceTime,
    pub distance: Option<f64>,
    pub from_stop_id: String,
    pub to_stop_id: String,
}

impl DistanceColumns for TripHeader {
    fn in_unit(self, unit: DistanceUnit) -> Self {
        TripHeader {
            distance: self.distance.map(|d| unit.from_meters(d)),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub data_source_id: String,
    pub line_name: String,
    pub day_type: DayType,
    pub direction: Option<String>,
    pub trip_count: usize,
    /// distinct variant codes, `|`-separated
    pub variant_codes: String,
}
