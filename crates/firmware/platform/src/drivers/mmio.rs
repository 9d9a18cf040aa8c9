use core::ptr;

/// Device register access by physical address.
pub trait Mmio: Sync {
    fn read8(&self, addr: u64) -> u8;

    fn write8(&self, addr: u64, value: u8);

    fn read16(&self, addr: u64) -> u16;

    fn write16(&self, addr: u64, value: u16);

    fn read32(&self, addr: u64) -> u32;

    fn write32(&self, addr: u64, value: u32);
}

/// Volatile loads and stores through the machine's identity view of memory.
#[derive(Debug, Clone, Copy)]
pub struct RawMmio(());

impl RawMmio {
    /// # Safety
    /// Every address later passed to the accessors must be a device register
    /// that is safe to access at that width.
    pub const unsafe fn new() -> RawMmio {
        RawMmio(())
    }
}

macro_rules! raw_access {
    ($read:ident, $write:ident, $t:ty) => {
        #[inline]
        fn $read(&self, addr: u64) -> $t {
            unsafe { ptr::read_volatile(addr as usize as *const $t) }
        }

        #[inline]
        fn $write(&self, addr: u64, value: $t) {
            unsafe { ptr::write_volatile(addr as usize as *mut $t, value) }
        }
    };
}

impl Mmio for RawMmio {
    raw_access!(read8, write8, u8);
    raw_access!(read16, write16, u16);
    raw_access!(read32, write32, u32);
}

impl<M: Mmio + ?Sized> Mmio for &M {
    fn read8(&self, addr: u64) -> u8 {
        (**self).read8(addr)
    }

    fn write8(&self, addr: u64, value: u8) {
        (**self).write8(addr, value)
    }

    fn read16(&self, addr: u64) -> u16 {
        (**self).read16(addr)
    }

    fn write16(&self, addr: u64, value: u16) {
        (**self).write16(addr, value)
    }

    fn read32(&self, addr: u64) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&self, addr: u64, value: u32) {
        (**self).write32(addr, value)
    }
}
