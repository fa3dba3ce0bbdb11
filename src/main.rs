mod args;
mod pipeline;

use clap::Parser;
use env_logger::Env;
use log::{debug, warn};
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    if let Err(e) = pipeline::run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        let mut cur: Option<&dyn std::error::Error> = std::error::Error::source(e.as_ref());
        while let Some(s) = cur {
            eprintln!("  caused by: {}", s);
            cur = s.source();
        }
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
