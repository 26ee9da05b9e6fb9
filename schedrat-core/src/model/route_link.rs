use serde::{Deserialize, Serialize};

use crate::model::{
    DistanceColumns, DistanceUnit, TimingLink, VariantMapping, VehicleJourneyLinkOverride,
};

/// a timing link placed within its journey pattern: the position across all
/// sections and the subsection it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedLink {
    pub link: TimingLink,
    /// 1-based position of the link across the whole pattern
    pub link_position_in_pattern: u32,
    pub subsection_position: u32,
    pub subsection_id: String,
}

/// a sequenced link annotated with its canonical subsection and variant. one row
/// per edge of either a base variant or a vehicle journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLink {
    pub data_source_id: String,
    pub line_id: String,
    pub line_name: String,
    pub journey_pattern_id: String,
    pub vehicle_journey_code: Option<String>,
    pub timing_link_id: Option<String>,
    pub section_position: u32,
    pub link_position_in_section: u32,
    pub link_position_in_pattern: u32,
    pub subsection_id: String,
    pub subsection_position: u32,
    pub subsection_base_id: String,
    pub base_data_source_id: String,
    pub base_journey_pattern_id: String,
    pub variant_code: String,
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub from_is_timing_point: bool,
    pub to_is_timing_point: bool,
    /// meters until written out
    pub distance: Option<f64>,
    pub run_time_seconds: u32,
    pub from_wait_seconds: Option<u32>,
    pub to_wait_seconds: Option<u32>,
}

impl RouteLink {
    pub fn new(
        sequenced: &SequencedLink,
        subsection_base_id: &str,
        variant: &VariantMapping,
    ) -> RouteLink {
        let link = &sequenced.link;
        RouteLink {
            data_source_id: link.data_source_id.clone(),
            line_id: link.line_id.clone(),
            line_name: link.line_name.clone(),
            journey_pattern_id: link.journey_pattern_id.clone(),
            vehicle_journey_code: None,
            timing_link_id: link.timing_link_id.clone(),
            section_position: link.section_position,
            link_position_in_section: link.link_position_in_section,
            link_position_in_pattern: sequenced.link_position_in_pattern,
            subsection_id: sequenced.subsection_id.clone(),
            subsection_position: sequenced.subsection_position,
            subsection_base_id: subsection_base_id.to_string(),
            base_data_source_id: variant.base_data_source_id.clone(),
            base_journey_pattern_id: variant.base_journey_pattern_id.clone(),
            variant_code: variant.variant_code.clone(),
            from_stop_id: link.from_stop_id.clone(),
            to_stop_id: link.to_stop_id.clone(),
            from_is_timing_point: link.from_is_timing_point,
            to_is_timing_point: link.to_is_timing_point,
            distance: link.distance_meters,
            run_time_seconds: link.run_time_seconds,
            from_wait_seconds: link.from_wait_seconds,
            to_wait_seconds: link.to_wait_seconds,
        }
    }

    /// copies this pattern link onto a vehicle journey, replacing any run or
    /// wait time the journey declares for it.
    pub fn for_vehicle_journey(
        &self,
        vehicle_journey_code: &str,
        link_override: Option<&VehicleJourneyLinkOverride>,
    ) -> RouteLink {
        let mut trip_link = RouteLink {
            vehicle_journey_code: Some(vehicle_journey_code.to_string()),
            ..self.clone()
        };
        if let Some(o) = link_override {
            if let Some(run_time) = o.run_time_seconds {
                trip_link.run_time_seconds = run_time;
            }
            if o.from_wait_seconds.is_some() {
                trip_link.from_wait_seconds = o.from_wait_seconds;
            }
            if o.to_wait_seconds.is_some() {
                trip_link.to_wait_seconds = o.to_wait_seconds;
            }
        }
        trip_link
    }

    /// seconds spent on this link including dwell at both ends
    pub fn elapsed_seconds(&self) -> u32 {
        self.from_wait_seconds
            .unwrap_or_default()
            .saturating_add(self.run_time_seconds)
            .saturating_add(self.to_wait_seconds.unwrap_or_default())
    }
}

impl DistanceColumns for RouteLink {
    fn in_unit(self, unit: DistanceUnit) -> Self {
        RouteLink {
            distance: self.distance.map(|d| unit.from_meters(d)),
            ..self
        }
    }
}
