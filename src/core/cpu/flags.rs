/// The four PDP-11 condition-code bits, kept as a flat struct rather than a
/// packed register: this core has no instruction that reads them as a byte,
/// only per-bit producers and consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub n: bool,
    pub z: bool,
    pub v: bool,
    pub c: bool,
}

impl Flags {
    pub fn new() -> Self {
        Flags::default()
    }

    /// Sets N and Z from a 16-bit result; every instruction that touches
    /// flags at all sets these two the same way.
    pub fn set_nz(&mut self, result: u16) {
        self.n = (result & 0x8000) != 0;
        self.z = result == 0;
    }
}
