mod trip_ops;

pub use trip_ops::{trip_headers, trip_links, trip_subsections, trip_summary};
