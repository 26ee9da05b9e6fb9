pub mod app;
pub mod batch;
pub mod period;
pub mod rationalize;
pub mod reconstruct;
pub mod trip;
