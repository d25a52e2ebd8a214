//! Resolves a 6-bit `mode|reg` field into one of the eight addressing modes
//! (§4.1), performing reads and writes with the correct auto-inc/dec and
//! PC-relative side effects and counting every memory/instruction-fetch
//! reference as it happens, in source-then-destination order.

use crate::core::cache::{AccessKind, Cache};
use crate::core::cpu::counters::Counters;
use crate::core::cpu::registers::Registers;
use crate::core::memory::{Memory, MemoryError};

/// Where an operand's value lives, captured at resolution time so the
/// later write-back targets exactly the location that was read — never a
/// value-carrying descriptor reused after further side effects have run
/// (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(usize),
    Memory(u16),
    /// Mode 2 with reg=7: the operand word itself lives in the instruction
    /// stream at `address`. A destination resolved this way (e.g. `MOV
    /// R0,(PC)+`) writes back into that word, the same as real PDP-11
    /// hardware.
    Immediate { address: u16, value: u16 },
}

fn cache_access(cache: Option<&mut Cache>, address: u16, kind: AccessKind) {
    if let Some(cache) = cache {
        cache.access(address as u32, kind);
    }
}

/// Resolves `mode|reg` to an `Operand`, reading whatever memory/registers
/// are needed to compute it and bumping counters/cache along the way.
/// Returns the operand descriptor plus (for non-register operands) the
/// value currently stored there, so callers that only need to read avoid a
/// second traversal.
pub fn resolve<M: Memory>(
    mode: u8,
    reg: usize,
    regs: &mut Registers,
    mem: &mut M,
    counters: &mut Counters,
    mut cache: Option<&mut Cache>,
) -> Result<(Operand, u16), MemoryError> {
    match mode {
        0 => {
            let value = regs.get(reg);
            Ok((Operand::Register(reg), value))
        }
        1 => {
            let address = regs.get(reg);
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        2 => {
            if reg == 7 {
                let address = regs.pc();
                let value = mem.read_word(address)?;
                counters.inst_fetches += 1;
                regs.advance_pc(2);
                Ok((Operand::Immediate { address, value }, value))
            } else {
                let address = regs.get(reg);
                let value = mem.read_word(address)?;
                counters.memory_reads += 1;
                cache_access(cache.as_deref_mut(), address, AccessKind::Read);
                regs.set(reg, address.wrapping_add(2));
                Ok((Operand::Memory(address), value))
            }
        }
        3 => {
            let pointer = regs.get(reg);
            let address = if reg == 7 {
                let word = mem.read_word(pointer)?;
                counters.inst_fetches += 1;
                word
            } else {
                let word = mem.read_word(pointer)?;
                counters.memory_reads += 1;
                cache_access(cache.as_deref_mut(), pointer, AccessKind::Read);
                word
            };
            regs.set(reg, pointer.wrapping_add(2));
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        4 => {
            let address = regs.get(reg).wrapping_sub(2);
            regs.set(reg, address);
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        5 => {
            let pointer = regs.get(reg).wrapping_sub(2);
            regs.set(reg, pointer);
            let address = mem.read_word(pointer)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), pointer, AccessKind::Read);
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        6 => {
            let index_word_addr = regs.pc();
            let index_word = mem.read_word(index_word_addr)?;
            counters.inst_fetches += 1;
            regs.advance_pc(2);
            let address = index_word.wrapping_add(regs.get(reg));
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        7 => {
            let index_word_addr = regs.pc();
            let index_word = mem.read_word(index_word_addr)?;
            counters.inst_fetches += 1;
            regs.advance_pc(2);
            let pointer = index_word.wrapping_add(regs.get(reg));
            let address = mem.read_word(pointer)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), pointer, AccessKind::Read);
            let value = mem.read_word(address)?;
            counters.memory_reads += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Read);
            Ok((Operand::Memory(address), value))
        }
        _ => unreachable!("mode field is 3 bits wide"),
    }
}

/// Stores `value` back to wherever `operand` was resolved from. An
/// `Immediate` destination (mode 2, reg 7, e.g. `MOV R0,(PC)+`) writes
/// back into the instruction word it was read from, same as real
/// PDP-11 hardware — it does not panic on this valid encoding.
pub fn store<M: Memory>(
    operand: Operand,
    value: u16,
    regs: &mut Registers,
    mem: &mut M,
    counters: &mut Counters,
    mut cache: Option<&mut Cache>,
) -> Result<(), MemoryError> {
    match operand {
        Operand::Register(reg) => {
            regs.set(reg, value);
            Ok(())
        }
        Operand::Memory(address) | Operand::Immediate { address, .. } => {
            mem.write_word(address, value)?;
            counters.memory_writes += 1;
            cache_access(cache.as_deref_mut(), address, AccessKind::Write);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::WordMemory;

    #[test]
    fn mode0_register_reads_and_writes_the_register() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        regs.set(2, 0o123);
        let (operand, value) = resolve(0, 2, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(value, 0o123);
        store(operand, 0o456, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(regs.get(2), 0o456);
        assert_eq!(counters.memory_reads, 0);
    }

    #[test]
    fn mode2_autoincrement_bumps_register_by_two() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        regs.set(1, 100);
        mem.write_word(100, 0xBEEF).unwrap();
        let (operand, value) = resolve(2, 1, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(value, 0xBEEF);
        assert_eq!(operand, Operand::Memory(100));
        assert_eq!(regs.get(1), 102);
        assert_eq!(counters.memory_reads, 1);
    }

    #[test]
    fn mode2_reg7_is_immediate_and_advances_pc() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        regs.set_pc(10);
        mem.write_word(10, 5).unwrap();
        let (operand, value) = resolve(2, 7, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(value, 5);
        assert_eq!(operand, Operand::Immediate { address: 10, value: 5 });
        assert_eq!(regs.pc(), 12);
        assert_eq!(counters.memory_reads, 0);
        assert_eq!(counters.inst_fetches, 1);
    }

    #[test]
    fn mode4_autodecrement_predecrements_before_use() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        regs.set(3, 10);
        mem.write_word(8, 0o42).unwrap();
        let (operand, value) = resolve(4, 3, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(regs.get(3), 8);
        assert_eq!(operand, Operand::Memory(8));
        assert_eq!(value, 0o42);
    }

    #[test]
    fn mode6_index_reads_index_word_then_adds_register() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        regs.set_pc(0);
        regs.set(1, 4);
        mem.write_word(0, 10).unwrap();
        mem.write_word(14, 0o77).unwrap();
        let (operand, value) = resolve(6, 1, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(operand, Operand::Memory(14));
        assert_eq!(value, 0o77);
        assert_eq!(regs.pc(), 2);
        assert_eq!(counters.inst_fetches, 1);
        assert_eq!(counters.memory_reads, 1);
    }

    #[test]
    fn store_to_memory_counts_a_write() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        store(Operand::Memory(20), 0o17, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(mem.read_word(20).unwrap(), 0o17);
        assert_eq!(counters.memory_writes, 1);
    }

    #[test]
    fn store_to_immediate_destination_writes_back_into_its_own_word() {
        let mut regs = Registers::new();
        let mut mem = WordMemory::new();
        let mut counters = Counters::new();
        store(Operand::Immediate { address: 30, value: 0 }, 0o37, &mut regs, &mut mem, &mut counters, None).unwrap();
        assert_eq!(mem.read_word(30).unwrap(), 0o37);
        assert_eq!(counters.memory_writes, 1);
    }
}
