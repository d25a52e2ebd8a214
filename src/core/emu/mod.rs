use crate::core::cache::Cache;
use crate::core::cpu::{Cpu, CpuError, StepTrace};
use crate::core::memory::WordMemory;
use crate::core::MEMORY_SIZE;
use tracing::info;

pub const EMU_NAME: &str = "pdp11-sim";
pub const EMU_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Owns the whole machine: CPU, memory, and the optional cache model
/// (§2.2's runtime `--cache` wiring). The driver loop lives here rather
/// than in `main` so it can be exercised directly by tests.
pub struct Emulator {
    pub cpu: Cpu,
    pub memory: WordMemory,
    pub cache: Option<Cache>,
}

impl Emulator {
    pub fn new(memory: WordMemory, cache_enabled: bool) -> Self {
        info!("Building emulator (cache {})", if cache_enabled { "enabled" } else { "disabled" });
        Emulator { cpu: Cpu::new(), memory, cache: cache_enabled.then(Cache::new) }
    }

    /// Runs fetch-decode-execute until `HALT` or a fatal `CpuError`,
    /// invoking `on_step` with every executed instruction's trace for the
    /// boundary-layer `-t`/`-v` formatter (§6).
    pub fn run(&mut self, mut on_step: impl FnMut(&Cpu, &StepTrace)) -> Result<(), CpuError> {
        loop {
            if self.cpu.regs.pc() as usize >= MEMORY_SIZE {
                return Err(CpuError::PcRunaway(self.cpu.regs.pc()));
            }

            let trace = self.cpu.step(&mut self.memory, self.cache.as_mut())?;
            on_step(&self.cpu, &trace);

            if self.cpu.halted {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_to_halt_without_a_cache() {
        let mut memory = WordMemory::new();
        memory.load_word(0, 0).unwrap();
        let mut emu = Emulator::new(memory, false);
        emu.run(|_, _| {}).unwrap();
        assert_eq!(emu.cpu.counters.inst_execs, 1);
    }

    #[test]
    fn pc_running_off_the_end_is_a_fatal_error() {
        let memory = WordMemory::new();
        let mut emu = Emulator::new(memory, false);
        emu.cpu.regs.set_pc(MEMORY_SIZE as u16);
        let err = emu.run(|_, _| {}).unwrap_err();
        assert!(matches!(err, CpuError::PcRunaway(_)));
    }
}
