use clap::Parser;

/// Command-line configuration (§6): the only flags recognized are the two
/// trace-verbosity switches and the cache-model toggle. Any positional
/// argument or unknown flag is a configuration error (§7), which `clap`
/// reports and this binary turns into exit code 1.
#[derive(Debug, Parser)]
#[command(name = "pdp11-sim", about = "A PDP-11 instruction-set simulator", version)]
pub struct Cli {
    /// Emit a one-line instruction trace per executed opcode.
    #[arg(short = 't', long = "trace", conflicts_with = "verbose")]
    pub trace: bool,

    /// Emit a verbose trace: the -t line plus operand values, NZVC, and R0-R7.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable the four-way set-associative PLRU data cache model.
    #[arg(long = "cache")]
    pub cache: bool,
}

impl Cli {
    pub fn trace_level(&self) -> TraceLevel {
        if self.verbose {
            TraceLevel::Verbose
        } else if self.trace {
            TraceLevel::Trace
        } else {
            TraceLevel::Silent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Silent,
    Trace,
    Verbose,
}
