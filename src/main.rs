use std::process::ExitCode;

use basic_viewer::{
    config::{Args, ViewerConfig},
    flow,
};
use clap::Parser;

fn main() -> ExitCode {
    let args = Args::parse();
    match flow::run(ViewerConfig::from(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
