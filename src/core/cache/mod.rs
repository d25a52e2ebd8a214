/// Four-way set-associative write-back data cache, directory only: no line
/// payload is modeled, only the per-way valid/dirty/tag bookkeeping and the
/// pseudo-LRU replacement state machine (§3, §4.8).
const NUM_SETS: usize = 32;
const NUM_WAYS: usize = 4;

/// Victim way chosen by PLRU state, when every way in the set is already
/// valid (§4.8's replacement-choice table). Reproduced verbatim.
const PLRU_VICTIM: [usize; 8] = [0, 0, 1, 1, 2, 3, 2, 3];

/// Next PLRU state given `(state, way_used)`, reproduced verbatim from the
/// three-bit binary-decision-tree table in §4.8.
const NEXT_STATE: [[u8; 4]; 8] = [
    [6, 4, 1, 0],
    [7, 5, 1, 0],
    [6, 4, 3, 2],
    [7, 5, 3, 2],
    [6, 4, 1, 0],
    [7, 5, 1, 0],
    [6, 4, 3, 2],
    [7, 5, 3, 2],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, Default)]
struct Way {
    valid: bool,
    dirty: bool,
    tag: u32,
}

/// Outcome of a single `access` call, returned for trace/verbose output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResult {
    pub hit: bool,
    pub way: usize,
    pub wrote_back: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCounters {
    pub cache_reads: u64,
    pub cache_writes: u64,
    pub hits: u64,
    pub misses: u64,
    pub write_backs: u64,
}

pub struct Cache {
    ways: [[Way; NUM_WAYS]; NUM_SETS],
    plru_state: [u8; NUM_SETS],
    counters: CacheCounters,
}

impl Cache {
    /// `cache_init`: every way invalid, every PLRU state 0 (§8's round-trip
    /// invariant that zero accesses leave an all-zero directory).
    pub fn new() -> Self {
        Cache {
            ways: [[Way::default(); NUM_WAYS]; NUM_SETS],
            plru_state: [0; NUM_SETS],
            counters: CacheCounters::default(),
        }
    }

    pub fn counters(&self) -> CacheCounters {
        self.counters
    }

    /// Decomposes a 32-bit byte address into `(tag, set)` per §4.8: low 5
    /// bits are the ignored byte offset, next 5 bits the set index, the
    /// remaining 22 bits the tag.
    fn decompose(address: u32) -> (u32, usize) {
        let set = ((address >> 5) & 0x1F) as usize;
        let tag = address >> 10;
        (tag, set)
    }

    /// Performs one cache access and returns its hit/miss/write-back
    /// outcome (§4.8). `address` is a full 32-bit byte address; callers
    /// zero-extend the simulator's 16-bit addresses before calling.
    pub fn access(&mut self, address: u32, kind: AccessKind) -> AccessResult {
        match kind {
            AccessKind::Read => self.counters.cache_reads += 1,
            AccessKind::Write => self.counters.cache_writes += 1,
        }

        let (tag, set) = Self::decompose(address);
        let ways = &mut self.ways[set];

        let hit_way = ways.iter().position(|w| w.valid && w.tag == tag);

        let (way, wrote_back) = if let Some(way) = hit_way {
            self.counters.hits += 1;
            (way, false)
        } else {
            self.counters.misses += 1;
            let victim = ways
                .iter()
                .position(|w| !w.valid)
                .unwrap_or_else(|| PLRU_VICTIM[self.plru_state[set] as usize]);

            let wrote_back = ways[victim].valid && ways[victim].dirty;
            if wrote_back {
                self.counters.write_backs += 1;
            }

            ways[victim] = Way { valid: true, dirty: false, tag };
            (victim, wrote_back)
        };

        self.plru_state[set] = NEXT_STATE[self.plru_state[set] as usize][way];

        if kind == AccessKind::Write {
            self.ways[set][way].dirty = true;
        }

        AccessResult { hit: hit_way.is_some(), way, wrote_back }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
