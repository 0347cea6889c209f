mod args;
mod pipeline;

use clap::Parser;
use log::info;

use crate::args::Args;

fn main() {
    let args = Args::parse();
    if args.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();
    info!("args: {:?}", args);

    if let Err(e) = pipeline::run_map(&args) {
        eprintln!("An error occured {}", e);
        std::process::exit(1);
    }
}
