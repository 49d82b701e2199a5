//! Fallback device for addresses no real peripheral claims.
//!
//! Every access is logged so unmodeled registers show up while bringing up
//! new firmware. Reads return 0, writes are dropped.

use crate::Device;

#[derive(Debug, Default)]
pub struct CatchAll {
    /// Unclaimed reads since creation
    pub reads: u64,
    /// Unclaimed writes since creation
    pub writes: u64,
}

impl CatchAll {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for CatchAll {
    fn read(&mut self, address: u32) -> u8 {
        log::warn!("Uncaught read 0x{:06x}", address);
        self.reads += 1;
        0
    }

    fn write(&mut self, address: u32, value: u8) {
        log::warn!("Uncaught write 0x{:06x}, 0x{:02x}", address, value);
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_misses() {
        let mut dev = CatchAll::new();
        assert_eq!(dev.read(0x12_3456), 0);
        assert_eq!(dev.read(0), 0);
        dev.write(0xFF_FFFF, 0xAA);
        assert_eq!(dev.reads, 2);
        assert_eq!(dev.writes, 1);
    }
}
