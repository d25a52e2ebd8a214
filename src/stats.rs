//! Final statistics block printed after a clean `HALT` (§6). Reads the
//! emulator's public counters and the first 20 words of memory; never
//! mutates anything.

use crate::core::emu::Emulator;

const DUMP_WORDS: usize = 20;

pub fn print_summary(emu: &Emulator) {
    let c = emu.cpu.counters;
    println!("instructions executed : {}", c.inst_execs);
    println!("instruction words fetched : {}", c.inst_fetches);
    println!("data words read : {}", c.memory_reads);
    println!("data words written : {}", c.memory_writes);
    println!("branches executed : {}", c.branch_execs);
    println!("branches taken : {} ({:.1}%)", c.branch_taken, c.branch_taken_percent());

    println!("memory[0..{}]:", DUMP_WORDS * 2);
    for i in 0..DUMP_WORDS {
        let address = (i * 2) as u16;
        let word = emu.memory.peek_word(address).unwrap_or(0);
        println!("  {address:06o}: {word:06o}");
    }

    if let Some(cache) = &emu.cache {
        let stats = cache.counters();
        println!("cache reads : {}", stats.cache_reads);
        println!("cache writes : {}", stats.cache_writes);
        println!("cache hits : {}", stats.hits);
        println!("cache misses : {}", stats.misses);
        println!("cache write-backs : {}", stats.write_backs);
    }
}
