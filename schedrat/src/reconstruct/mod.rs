mod distance_ops;
mod point_ops;

pub use distance_ops::with_cumulative_distance;
pub use point_ops::{links_to_points, PointGrouping};
