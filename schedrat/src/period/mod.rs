mod period_ops;
mod report_ops;

pub use period_ops::{generate_periods, schedule_periods};
pub use report_ops::{load_periods, runtime_periods, PlaceLookup};
