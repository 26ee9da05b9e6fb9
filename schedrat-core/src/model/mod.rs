mod day_type;
mod distance;
mod journey;
mod period;
mod point;
mod route_link;
mod service_time;
mod subsection;
mod timing_link;
mod trip;
mod variant;

pub mod duration;

pub use day_type::{DayType, OperatingDays};
pub use distance::{sum_distances, DistanceCell, DistanceColumns, DistanceUnit};
pub use journey::{
    JourneyPatternRecord, LineRecord, StopPlaceRecord, VehicleJourney, VehicleJourneyLinkOverride,
    VehicleJourneyLinkRecord, VehicleJourneyRecord,
};
pub use period::{LoadPeriod, RuntimePeriod, SchedulePeriod, TripSubsection};
pub use point::Point;
pub use route_link::{RouteLink, SequencedLink};
pub use service_time::ServiceTime;
pub use subsection::{subsection_id, Subsection, SubsectionKey, SubsectionMapping};
pub use timing_link::{malformed, TimingLink, TimingLinkRecord};
pub use trip::{TripHeader, TripSummary};
pub use variant::{variant_code, Variant, VariantKey, VariantMapping};
