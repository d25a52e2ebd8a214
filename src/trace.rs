//! Per-instruction trace formatting (§6): a read-only consumer of CPU
//! state via its public accessors, never a mutator. Lives outside `core`
//! per the spec's explicit core/boundary split.

use crate::core::config::TraceLevel;
use crate::core::cpu::instruction::Decoded;
use crate::core::cpu::{Cpu, StepTrace};

pub fn print_step(level: TraceLevel, cpu: &Cpu, trace: &StepTrace) {
    if level == TraceLevel::Silent {
        return;
    }

    println!("{:06o}: {}{}", trace.pc_before, trace.decoded.mnemonic(), operand_suffix(&trace.decoded));

    if level == TraceLevel::Verbose {
        if let Some(src) = trace.src_value {
            print!("  src={src:06o}");
        }
        if let Some(dst) = trace.dst_value {
            print!(" dst={dst:06o}");
        }
        if let Some(result) = trace.result {
            print!(" result={result:06o}");
        }
        println!();
        println!(
            "  N={} Z={} V={} C={}",
            cpu.flags.n as u8, cpu.flags.z as u8, cpu.flags.v as u8, cpu.flags.c as u8
        );
        print_registers(cpu);
    }
}

fn print_registers(cpu: &Cpu) {
    let regs = cpu.regs.all();
    let formatted: Vec<String> = regs.iter().enumerate().map(|(i, r)| format!("R{i}={r:06o}")).collect();
    println!("  {}", formatted.join(" "));
}

fn operand_suffix(decoded: &Decoded) -> String {
    match decoded {
        Decoded::Halt => String::new(),
        Decoded::Br(off) | Decoded::Bne(off) | Decoded::Beq(off) => format!(" {off}"),
        Decoded::Sob { reg, offset } => format!(" R{reg},-{offset}"),
        Decoded::Asr(op) | Decoded::Asl(op) => format!(" m{}r{}", op.mode, op.reg),
        Decoded::Mov(op) | Decoded::Cmp(op) | Decoded::Add(op) | Decoded::Sub(op) => {
            format!(" m{}r{},m{}r{}", op.src_mode, op.src_reg, op.dst_mode, op.dst_reg)
        }
    }
}
