use schedrat_core::error::BatchWarning;
use schedrat_core::model::{
    LoadPeriod, Point, RouteLink, RuntimePeriod, SchedulePeriod, SubsectionMapping, TripHeader,
    TripSubsection, TripSummary, VariantMapping,
};

/// the result of processing one batch directory
#[derive(Debug, Default)]
pub struct BatchBundle {
    pub name: String,
    pub subsection_mapping: Vec<SubsectionMapping>,
    pub variant_mapping: Vec<VariantMapping>,
    pub variant_links: Vec<RouteLink>,
    pub variant_points: Vec<Point>,
    pub trip_points: Vec<Point>,
    pub trip_subsections: Vec<TripSubsection>,
    pub trips: Vec<TripHeader>,
    pub trip_summary: Vec<TripSummary>,
    pub schedule_periods: Vec<SchedulePeriod>,
    pub runtime_periods: Vec<RuntimePeriod>,
    pub load_periods: Vec<LoadPeriod>,
    pub warnings: Vec<BatchWarning>,
    pub metadata: serde_json::Value,
}

impl BatchBundle {
    /// true if no route links survived rationalization, in which case there is
    /// nothing worth writing.
    pub fn is_empty(&self) -> bool {
        self.variant_links.is_empty()
    }
}
