use serde::{Deserialize, Serialize};

use crate::model::{DistanceColumns, DistanceUnit};

/// one stop visit on a variant or a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub data_source_id: String,
    pub line_id: String,
    pub line_name: String,
    pub journey_pattern_id: String,
    pub vehicle_journey_code: Option<String>,
    pub variant_code: String,
    pub subsection_id: String,
    pub subsection_base_id: String,
    pub section_position: u32,
    /// 0 for the leading point of a route, otherwise the position of the link
    /// arriving at this stop
    pub link_position_in_pattern: u32,
    pub stop_id: String,
    pub is_timing_point: bool,
    /// length of the link arriving at this stop, meters until written out
    pub distance: Option<f64>,
    pub run_time_seconds: u32,
    pub wait_time_seconds: u32,
    pub is_first_in_subsection: bool,
    pub is_last_in_subsection: bool,
    pub is_first_in_route: bool,
    pub is_last_in_route: bool,
    /// running distance since the start of the subsection. only filled for
    /// variant points.
    pub cumulative_distance: Option<f64>,
}

impl DistanceColumns for Point {
    fn in_unit(self, unit: DistanceUnit) -> Self {
        Point {
            distance: self.distance.map(|d| unit.from_meters(d)),
            cumulative_distance: self.cumulative_distance.map(|d| unit.from_meters(d)),
            ..self
        }
    }
}
