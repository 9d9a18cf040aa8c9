use scr_abi::prelude::*;

use super::{add_root_windows, DeviceWindow};
use crate::{
    drivers::{mmio::Mmio, mtimer::CsrMtimer, plic::Plic, uart8250::Uart8250},
    hart::CsrAccess,
};

pub const HART_COUNT: u32 = 4;

pub const PLIC_BASE: u64 = 0xffff_8fff_c000_0000;
pub const PLIC_SIZE: u64 = 0x100_0000;
pub const PLIC_NUM_SOURCES: u32 = 10;

pub const UART1_BASE: u64 = 0xffff_8fff_e021_8000;
pub const UART1_SIZE: u64 = 0x1000;
pub const UART1_FREQ: u32 = 50_000_000;
pub const UART1_BAUD: u32 = 115_200;
pub const UART1_REG_SHIFT: u32 = 2;
pub const UART1_REG_WIDTH: u32 = 4;

pub const MTIMER_BASE: u64 = 0xffff_8fff_e800_0000;
pub const MTIMER_SIZE: u64 = 0x1000;
pub const MTIMER_FREQ: u64 = 50_000_000;

/// Peripheral windows the root domain may touch.
pub const DEVICE_WINDOWS: [DeviceWindow; 3] = [
    DeviceWindow {
        name: "PLIC",
        base: PLIC_BASE,
        size: PLIC_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
    DeviceWindow {
        name: "UART1",
        base: UART1_BASE,
        size: UART1_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
    DeviceWindow {
        name: "MTIMER",
        base: MTIMER_BASE,
        size: MTIMER_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
];

pub static DESCRIPTOR: PlatformDescriptor = PlatformDescriptor::new(
    "NextSilicon SCR7",
    PlatformVersion::new(0, 1),
    PlatformFeatures::empty(),
    HART_COUNT,
);

/// The SCR7 board, over whatever register access its devices are given.
pub struct Scr7<M: 'static, C: 'static> {
    uart: &'static Uart8250<M>,
    plic: &'static Plic<M>,
    timer: &'static CsrMtimer<C>,
}

impl<M: 'static, C: 'static> Scr7<M, C> {
    pub const fn new(
        uart: &'static Uart8250<M>,
        plic: &'static Plic<M>,
        timer: &'static CsrMtimer<C>,
    ) -> Scr7<M, C> {
        Scr7 { uart, plic, timer }
    }
}

impl<M, C> PlatformOperations for Scr7<M, C>
where
    M: Mmio + 'static,
    C: CsrAccess + Send + 'static,
{
    fn descriptor(&self) -> &PlatformDescriptor {
        &DESCRIPTOR
    }

    fn early_init(&self, _cold_boot: bool, host: &mut dyn PlatformHost) -> SbiResult<()> {
        add_root_windows(&DEVICE_WINDOWS, host)
    }

    fn console_init(&self, host: &mut dyn PlatformHost) -> SbiResult<()> {
        self.uart.init();
        host.set_console_device(self.uart);
        Ok(())
    }

    fn irqchip_init(&self, cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        if !cold_boot {
            return Err(SbiError::NotSupported);
        }
        self.plic.cold_init()
    }

    fn timer_init(&self, _cold_boot: bool, host: &mut dyn PlatformHost) -> SbiResult<()> {
        host.set_timer_device(self.timer);
        Ok(())
    }
}

#[cfg(target_arch = "riscv64")]
mod board {
    use super::*;
    use crate::{arch::MachineCsrs, drivers::mmio::RawMmio};

    static UART1: Uart8250<RawMmio> = Uart8250::new(
        unsafe { RawMmio::new() },
        UART1_BASE,
        UART1_FREQ,
        UART1_BAUD,
        UART1_REG_SHIFT,
        UART1_REG_WIDTH,
    );

    static PLIC: Plic<RawMmio> = Plic::new(unsafe { RawMmio::new() }, PLIC_BASE, PLIC_NUM_SOURCES);

    static MTIMER: CsrMtimer<MachineCsrs> = CsrMtimer::new(MachineCsrs, MTIMER_FREQ);

    pub static PLATFORM: Scr7<RawMmio, MachineCsrs> = Scr7::new(&UART1, &PLIC, &MTIMER);
}

/// Operations table of this board.
#[cfg(target_arch = "riscv64")]
pub fn operations() -> &'static dyn PlatformOperations {
    &board::PLATFORM
}
