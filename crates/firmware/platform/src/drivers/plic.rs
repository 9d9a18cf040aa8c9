use scr_abi::prelude::*;

use super::mmio::Mmio;

const PRIORITY_BASE: u64 = 0;
const PRIORITY_STRIDE: u64 = 4;
const ENABLE_BASE: u64 = 0x2000;
const ENABLE_STRIDE: u64 = 0x80;
const CONTEXT_BASE: u64 = 0x20_0000;
const CONTEXT_STRIDE: u64 = 0x1000;

/// Sources a PLIC can have. Source 0 is reserved.
pub const MAX_SOURCES: u32 = 1023;

/// Platform-level interrupt controller.
#[derive(Debug)]
pub struct Plic<M> {
    mmio: M,
    base: u64,
    num_sources: u32,
}

impl<M> Plic<M> {
    pub const fn new(mmio: M, base: u64, num_sources: u32) -> Plic<M> {
        Plic {
            mmio,
            base,
            num_sources,
        }
    }

    pub fn num_sources(&self) -> u32 {
        self.num_sources
    }

    fn check_source(&self, source: u32) -> SbiResult<()> {
        if source == 0 || source > self.num_sources {
            return Err(SbiError::InvalidParam);
        }
        Ok(())
    }
}

impl<M: Mmio> Plic<M> {
    /// Mask every source by dropping its priority to 0.
    pub fn cold_init(&self) -> SbiResult<()> {
        if self.num_sources > MAX_SOURCES {
            return Err(SbiError::InvalidParam);
        }
        for source in 1..=self.num_sources {
            self.set_priority(source, 0)?;
        }
        debug!(target: "platform", "plic at {:#x}: {} sources masked", self.base, self.num_sources);
        Ok(())
    }

    pub fn set_priority(&self, source: u32, priority: u32) -> SbiResult<()> {
        self.check_source(source)?;
        let addr = self.base + PRIORITY_BASE + PRIORITY_STRIDE * source as u64;
        self.mmio.write32(addr, priority);
        Ok(())
    }

    pub fn priority(&self, source: u32) -> SbiResult<u32> {
        self.check_source(source)?;
        Ok(self
            .mmio
            .read32(self.base + PRIORITY_BASE + PRIORITY_STRIDE * source as u64))
    }

    /// Route `source` to `context`, or stop routing it.
    pub fn enable_for_context(&self, context: u32, source: u32, enable: bool) -> SbiResult<()> {
        self.check_source(source)?;
        let addr = self.base
            + ENABLE_BASE
            + ENABLE_STRIDE * context as u64
            + 4 * (source / 32) as u64;
        let bit = 1u32 << (source % 32);
        let word = self.mmio.read32(addr);
        let word = if enable { word | bit } else { word & !bit };
        self.mmio.write32(addr, word);
        Ok(())
    }

    /// Sources with priority at or below `threshold` are masked for `context`.
    pub fn set_threshold(&self, context: u32, threshold: u32) {
        let addr = self.base + CONTEXT_BASE + CONTEXT_STRIDE * context as u64;
        self.mmio.write32(addr, threshold);
    }
}
