use crate::core::cache::Cache;
use crate::core::cpu::counters::Counters;
use crate::core::cpu::flags::Flags;
use crate::core::cpu::instruction::{decode, Decoded, DecodeError, OneOperand, TwoOperand};
use crate::core::cpu::operand::{resolve, store, Operand};
use crate::core::cpu::registers::Registers;
use crate::core::memory::{Memory, MemoryError};
use tracing::debug;

pub mod counters;
pub mod flags;
pub mod instruction;
pub mod operand;
pub mod registers;

/// Every way the fetch-decode-execute loop can come to a fatal stop (§7),
/// other than the clean `HALT` the driver treats as success.
#[derive(Debug)]
pub enum CpuError {
    Decode(DecodeError, u16),
    Address(MemoryError),
    PcRunaway(u16),
}

impl std::fmt::Display for CpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuError::Decode(err, pc) => write!(f, "{err} at PC={pc:06o}"),
            CpuError::Address(err) => write!(f, "{err}"),
            CpuError::PcRunaway(pc) => write!(f, "PC ran away to {pc:06o} without executing HALT"),
        }
    }
}

impl std::error::Error for CpuError {}

impl From<MemoryError> for CpuError {
    fn from(value: MemoryError) -> Self {
        CpuError::Address(value)
    }
}

/// One executed instruction's observable detail, handed to the boundary
/// trace formatter (§6); the CPU never formats its own trace lines.
#[derive(Debug, Clone, Copy)]
pub struct StepTrace {
    pub pc_before: u16,
    pub decoded: Decoded,
    pub src_value: Option<u16>,
    pub dst_value: Option<u16>,
    pub result: Option<u16>,
}

pub struct Cpu {
    pub regs: Registers,
    pub flags: Flags,
    pub counters: Counters,
    pub halted: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu { regs: Registers::new(), flags: Flags::new(), counters: Counters::new(), halted: false }
    }

    /// Fetches, decodes and executes a single instruction, advancing `PC`
    /// past the opcode word before the operand resolver runs (§2: "driver
    /// fetches mem[PC], advances PC by 2").
    pub fn step<M: Memory>(&mut self, mem: &mut M, mut cache: Option<&mut Cache>) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let word = mem.read_word(pc_before)?;
        self.counters.inst_fetches += 1;
        self.regs.advance_pc(2);

        let decoded = decode(word).map_err(|e| CpuError::Decode(e, pc_before))?;
        self.counters.inst_execs += 1;

        let trace = match decoded {
            Decoded::Halt => {
                self.halted = true;
                StepTrace { pc_before, decoded, src_value: None, dst_value: None, result: None }
            }
            Decoded::Mov(op) => self.exec_mov(op, mem, cache.as_deref_mut())?,
            Decoded::Cmp(op) => self.exec_cmp(op, mem, cache.as_deref_mut())?,
            Decoded::Add(op) => self.exec_add(op, mem, cache.as_deref_mut())?,
            Decoded::Sub(op) => self.exec_sub(op, mem, cache.as_deref_mut())?,
            Decoded::Asr(op) => self.exec_asr(op, mem, cache.as_deref_mut())?,
            Decoded::Asl(op) => self.exec_asl(op, mem, cache.as_deref_mut())?,
            Decoded::Br(off) => self.exec_branch(decoded, off, true),
            Decoded::Bne(off) => {
                let taken = !self.flags.z;
                self.exec_branch(decoded, off, taken)
            }
            Decoded::Beq(off) => {
                let taken = self.flags.z;
                self.exec_branch(decoded, off, taken)
            }
            Decoded::Sob { reg, offset } => self.exec_sob(decoded, reg, offset),
        };

        debug!("{} at {:06o}", decoded.mnemonic(), pc_before);
        Ok(trace)
    }

    fn exec_mov<M: Memory>(
        &mut self,
        op: TwoOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (_, src_value) = resolve(op.src_mode, op.src_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;
        let (dst_operand, dst_value) =
            resolve(op.dst_mode, op.dst_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        self.flags.set_nz(src_value);
        self.flags.v = false;

        store(dst_operand, src_value, &mut self.regs, mem, &mut self.counters, cache)?;

        Ok(StepTrace {
            pc_before,
            decoded: Decoded::Mov(op),
            src_value: Some(src_value),
            dst_value: Some(dst_value),
            result: Some(src_value),
        })
    }

    fn exec_cmp<M: Memory>(
        &mut self,
        op: TwoOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (_, src) = resolve(op.src_mode, op.src_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;
        let (_, dst) = resolve(op.dst_mode, op.dst_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        let result = src.wrapping_sub(dst);
        self.flags.set_nz(result);
        self.flags.v = sign(src) != sign(dst) && sign(result) != sign(src);
        self.flags.c = src < dst;

        Ok(StepTrace { pc_before, decoded: Decoded::Cmp(op), src_value: Some(src), dst_value: Some(dst), result: Some(result) })
    }

    fn exec_add<M: Memory>(
        &mut self,
        op: TwoOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (_, src) = resolve(op.src_mode, op.src_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;
        let (dst_operand, dst) =
            resolve(op.dst_mode, op.dst_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        let wide = dst as u32 + src as u32;
        let result = wide as u16;
        self.flags.set_nz(result);
        self.flags.v = sign(dst) == sign(src) && sign(result) != sign(src);
        self.flags.c = wide > 0xFFFF;

        store(dst_operand, result, &mut self.regs, mem, &mut self.counters, cache)?;

        Ok(StepTrace { pc_before, decoded: Decoded::Add(op), src_value: Some(src), dst_value: Some(dst), result: Some(result) })
    }

    fn exec_sub<M: Memory>(
        &mut self,
        op: TwoOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (_, src) = resolve(op.src_mode, op.src_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;
        let (dst_operand, dst) =
            resolve(op.dst_mode, op.dst_reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        let result = dst.wrapping_sub(src);
        self.flags.set_nz(result);
        self.flags.v = sign(src) != sign(dst) && sign(result) != sign(dst);
        self.flags.c = dst < src;

        store(dst_operand, result, &mut self.regs, mem, &mut self.counters, cache)?;

        Ok(StepTrace { pc_before, decoded: Decoded::Sub(op), src_value: Some(src), dst_value: Some(dst), result: Some(result) })
    }

    fn exec_asr<M: Memory>(
        &mut self,
        op: OneOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (operand, old) = resolve(op.mode, op.reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        let new = (old as i16 >> 1) as u16;
        self.flags.set_nz(new);
        self.flags.v = sign(old) != (new & 1 != 0);
        self.flags.c = old & 1 != 0;

        store(operand, new, &mut self.regs, mem, &mut self.counters, cache)?;

        Ok(StepTrace { pc_before, decoded: Decoded::Asr(op), src_value: Some(old), dst_value: Some(old), result: Some(new) })
    }

    fn exec_asl<M: Memory>(
        &mut self,
        op: OneOperand,
        mem: &mut M,
        mut cache: Option<&mut Cache>,
    ) -> Result<StepTrace, CpuError> {
        let pc_before = self.regs.pc();
        let (operand, old) = resolve(op.mode, op.reg, &mut self.regs, mem, &mut self.counters, cache.as_deref_mut())?;

        let new = old << 1;
        self.flags.set_nz(new);
        self.flags.v = sign(old) != sign(new);
        self.flags.c = old & 0x8000 != 0;

        store(operand, new, &mut self.regs, mem, &mut self.counters, cache)?;

        Ok(StepTrace { pc_before, decoded: Decoded::Asl(op), src_value: Some(old), dst_value: Some(old), result: Some(new) })
    }

    fn exec_branch(&mut self, decoded: Decoded, offset: i8, taken: bool) -> StepTrace {
        let pc_before = self.regs.pc();
        self.counters.branch_execs += 1;
        if taken {
            self.counters.branch_taken += 1;
            self.regs.advance_pc(2 * offset as i32);
        }
        StepTrace { pc_before, decoded, src_value: None, dst_value: None, result: None }
    }

    fn exec_sob(&mut self, decoded: Decoded, reg: usize, offset: u8) -> StepTrace {
        let pc_before = self.regs.pc();
        self.counters.branch_execs += 1;
        let new = self.regs.get(reg).wrapping_sub(1);
        self.regs.set(reg, new);
        let taken = new != 0;
        if taken {
            self.counters.branch_taken += 1;
            self.regs.advance_pc(-2 * offset as i32);
        }
        StepTrace { pc_before, decoded, src_value: Some(new), dst_value: None, result: Some(new) }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn sign(value: u16) -> bool {
    value & 0x8000 != 0
}
