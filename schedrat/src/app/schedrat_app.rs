use clap::Parser;

use super::SchedratOperation;

/// Command line tool for rationalizing transit route and timetable tables into
/// canonical subsections, variants and schedule periods
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct SchedratApp {
    #[command(subcommand)]
    pub op: SchedratOperation,
}
