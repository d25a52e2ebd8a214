use clap::Parser;
use std::io::{self, BufReader};
use std::process::exit;
use tracing::{error, info};

use crate::core::config::Cli;
use crate::core::emu::{Emulator, EMU_NAME, EMU_VERSION};

mod core;
mod loader;
mod log;
mod stats;
mod trace;

fn main() {
    log::init_logging();
    let cli = Cli::parse();

    info!("{} v{}", EMU_NAME, EMU_VERSION);

    let memory = match loader::load(BufReader::new(io::stdin())) {
        Ok(memory) => memory,
        Err(err) => {
            error!("{err}");
            exit(1);
        }
    };

    let mut emu = Emulator::new(memory, cli.cache);
    let level = cli.trace_level();

    let result = emu.run(|cpu, step| trace::print_step(level, cpu, step));

    match result {
        Ok(()) => {
            stats::print_summary(&emu);
            exit(0);
        }
        Err(err) => {
            error!("{err}");
            exit(1);
        }
    }
}
