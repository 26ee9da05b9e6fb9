mod operation;
mod schedrat_app;

pub use operation::{load_configuration, SchedratOperation};
pub use schedrat_app::SchedratApp;
