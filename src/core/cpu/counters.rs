/// Execution statistics, monotonic for the lifetime of the CPU (§3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub inst_execs: u64,
    pub inst_fetches: u64,
    pub memory_reads: u64,
    pub memory_writes: u64,
    pub branch_execs: u64,
    pub branch_taken: u64,
}

impl Counters {
    pub fn new() -> Self {
        Counters::default()
    }

    pub fn branch_taken_percent(&self) -> f64 {
        if self.branch_execs == 0 {
            0.0
        } else {
            100.0 * self.branch_taken as f64 / self.branch_execs as f64
        }
    }
}
