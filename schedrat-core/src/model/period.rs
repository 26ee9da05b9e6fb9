use serde::{Deserialize, Serialize};

use crate::model::{DayType, DistanceColumns, DistanceUnit, ServiceTime};

/// one visit of a vehicle journey to a subsection, with the time the vehicle
/// leaves the subsection's first stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSubsection {
    pub data_source_id: String,
    pub line_name: String,
    pub vehicle_journey_code: String,
    pub journey_pattern_id: String,
    pub variant_code: String,
    pub day_type: DayType,
    pub subsection_id: String,
    pub subsection_position: u32,
    pub subsection_base_id: String,
    pub departure_time: ServiceTime,
    pub run_time_seconds: u32,
    pub distance: Option<f64>,
    pub from_stop_id: String,
    pub to_stop_id: String,
}

impl DistanceColumns for TripSubsection {
    fn in_unit(self, unit: DistanceUnit) -> Self {
        TripSubsection {
            distance: self.distance.map(|d| unit.from_meters(d)),
            ..self
        }
    }
}

/// the reporting period assigned to one trip subsection within its
/// `(line, subsectionBaseId, dayType)` group. `period_end` is inclusive to the
/// minute: the next period of the group starts one minute later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePeriod {
    pub line_name: String,
    pub subsection_base_id: String,
    pub day_type: DayType,
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub departure_time: ServiceTime,
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub run_time_seconds: u32,
    pub period_start: ServiceTime,
    pub period_end: ServiceTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePeriod {
    pub day_type: DayType,
    pub line_name: String,
    pub variant_code: String,
    pub subsection_base_id: String,
    pub data_source_id: String,
    pub vehicle_journey_code: String,
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub from_place: String,
    pub to_place: String,
    pub run_time_minutes: u32,
    pub period_start: ServiceTime,
    pub period_end: ServiceTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPeriod {
    pub day_type: DayType,
    pub place: String,
    pub period_start: ServiceTime,
    pub period_end: ServiceTime,
    pub wait_time_minutes: u32,
    pub line_name: String,
    pub variant_code: String,
}
