use bitflags::bitflags;
use getset::CopyGetters;
use scr_utils::align::log2_ceil;

bitflags! {
    /// Access rights of a domain memory region.
    pub struct MemRegionFlags: u64 {
        /// Region may be read by the domain.
        const READABLE   = 1 << 0;
        /// Region may be written by the domain.
        const WRITEABLE  = 1 << 1;
        /// Region may be executed by the domain.
        const EXECUTABLE = 1 << 2;
        /// Region is device memory and must not be cached.
        const MMIO       = 1 << 31;
    }
}

impl MemRegionFlags {
    /// Read/write device window, the usual flags for a peripheral.
    pub const MMIO_RW: MemRegionFlags = MemRegionFlags::from_bits_truncate(
        MemRegionFlags::READABLE.bits() | MemRegionFlags::WRITEABLE.bits() | MemRegionFlags::MMIO.bits(),
    );
}

/// A naturally aligned power-of-two window of the physical address space.
///
/// The runtime can only protect naturally aligned windows, so a requested
/// `[base, base + size)` range is widened to the smallest such window that
/// covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct MemRegion {
    /// Start of the window, aligned to `1 << order`.
    base: u64,
    /// log2 of the window size. `64` covers the whole address space.
    order: u32,
    flags: MemRegionFlags,
}

impl MemRegion {
    /// Create the covering region for `[addr, addr + size)`.
    ///
    /// A zero `size` is treated as a single byte.
    pub fn new(addr: u64, size: u64, flags: MemRegionFlags) -> MemRegion {
        let size = size.max(1);
        let last = addr as u128 + size as u128 - 1;

        let mut order = log2_ceil(size);
        let mut base = 0u64;
        while order < 64 {
            base = addr & !((1u64 << order) - 1);
            let end = base as u128 + (1u128 << order);
            if (base as u128) <= last && last < end {
                break;
            }
            order += 1;
        }
        if order >= 64 {
            base = 0;
            order = 64;
        }

        MemRegion { base, order, flags }
    }

    /// Size of the window in bytes, saturated to `u64::MAX` for the full space.
    pub fn size(&self) -> u64 {
        if self.order >= 64 {
            u64::MAX
        } else {
            1 << self.order
        }
    }

    /// Whether `addr` falls inside the window.
    pub fn contains(&self, addr: u64) -> bool {
        let offset = addr.wrapping_sub(self.base);
        self.order >= 64 || (addr >= self.base && offset < (1u64 << self.order))
    }
}
