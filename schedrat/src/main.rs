use clap::Parser;
use schedrat::app::SchedratApp;
use schedrat_core::error::RationalizeError;

fn main() -> Result<(), RationalizeError> {
    env_logger::init();
    let args = SchedratApp::parse();
    args.op.run()
}
