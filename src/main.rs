//! Binary entry point for the `mhkdf` command-line tool.

use clap::Parser;

use mhkdf::cli::{run, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("mhkdf: {err:#}");
        std::process::exit(1);
    }
}
