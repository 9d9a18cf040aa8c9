use scr_abi::prelude::*;

use super::DeviceWindow;

pub const HART_COUNT: u32 = 4;

/// Sign-extend a 32-bit bus address into the 64-bit physical map.
pub const fn expand32(addr: u32) -> u64 {
    addr as i32 as i64 as u64
}

/// DDR, where the firmware image is loaded.
pub const MEM_BASE: u64 = 0xA8_0000;
pub const MEM_SIZE: u64 = 4 << 30;

pub const MMCFG_BASE: u64 = expand32(0xf004_0000);
pub const MMCFG_SIZE: u64 = 64 << 10;
pub const MTIMER_BASE: u64 = MMCFG_BASE;
pub const L2CTL_BASE: u64 = MMCFG_BASE + 0x1000;

pub const PLIC_BASE: u64 = expand32(0xfe00_0000);
pub const PLIC_SIZE: u64 = 16 << 20;

pub const MMIO_BASE: u64 = expand32(0xff00_0000);
pub const MMIO_SIZE: u64 = 8 << 20;
/// FPGA build id register.
pub const BUILD_ID_ADDR: u64 = MMIO_BASE;
/// FPGA system clock in MHz.
pub const SYSCLK_MHZ_ADDR: u64 = MMIO_BASE + 0x1000;

pub const OCRAM_BASE: u64 = expand32(0xffff_0000);
pub const OCRAM_SIZE: u64 = 64 << 10;

pub const UART0_BASE: u64 = 0xffff_8fff_e021_8000;

/// SCR7 FPGA memory map.
pub const MEMORY_MAP: [DeviceWindow; 5] = [
    DeviceWindow {
        name: "DDR",
        base: MEM_BASE,
        size: MEM_SIZE,
        flags: MemRegionFlags::all(),
    },
    DeviceWindow {
        name: "MMCFG",
        base: MMCFG_BASE,
        size: MMCFG_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
    DeviceWindow {
        name: "PLIC",
        base: PLIC_BASE,
        size: PLIC_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
    DeviceWindow {
        name: "MMIO",
        base: MMIO_BASE,
        size: MMIO_SIZE,
        flags: MemRegionFlags::MMIO_RW,
    },
    DeviceWindow {
        name: "On-Chip RAM",
        base: OCRAM_BASE,
        size: OCRAM_SIZE,
        flags: MemRegionFlags::from_bits_truncate(
            MemRegionFlags::READABLE.bits() | MemRegionFlags::EXECUTABLE.bits(),
        ),
    },
];

/// How a PLIC source signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    LevelHigh,
    LevelLow,
    EdgeRising,
    EdgeFalling,
}

/// An external interrupt line wired to the PLIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptLine {
    pub name: &'static str,
    pub source: u32,
    pub mode: TriggerMode,
}

pub const INTERRUPT_LINES: [InterruptLine; 4] = [
    InterruptLine {
        name: "UART0",
        source: 1,
        mode: TriggerMode::LevelHigh,
    },
    InterruptLine {
        name: "ETH0_RX",
        source: 2,
        mode: TriggerMode::LevelHigh,
    },
    InterruptLine {
        name: "ETH0_TX",
        source: 3,
        mode: TriggerMode::LevelHigh,
    },
    InterruptLine {
        name: "PCI_MSI",
        source: 4,
        mode: TriggerMode::LevelHigh,
    },
];

pub static DESCRIPTOR: PlatformDescriptor = PlatformDescriptor::new(
    "NextSilicon NSC v1",
    PlatformVersion::new(7, 0),
    PlatformFeatures::DEFAULT,
    HART_COUNT,
);

/// The NSC v1 board. Every hook is a successful no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nsc;

impl Nsc {
    pub fn memory_window(name: &str) -> Option<&'static DeviceWindow> {
        MEMORY_MAP.iter().find(|w| w.name == name)
    }

    pub fn interrupt_line(name: &str) -> Option<&'static InterruptLine> {
        INTERRUPT_LINES.iter().find(|l| l.name == name)
    }
}

impl PlatformOperations for Nsc {
    fn descriptor(&self) -> &PlatformDescriptor {
        &DESCRIPTOR
    }
}

/// Operations table of this board.
#[cfg(target_arch = "riscv64")]
pub fn operations() -> &'static dyn PlatformOperations {
    static PLATFORM: Nsc = Nsc;
    &PLATFORM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::RecordingHost;

    #[test]
    fn descriptor() {
        let d = Nsc.descriptor();
        assert_eq!(d.name(), "NextSilicon NSC v1");
        assert_eq!(d.version().bits(), 0x0007_0000);
        assert_eq!(d.features(), PlatformFeatures::DEFAULT);
        assert_eq!(d.hart_count(), 4);
        assert_eq!(d.total_stack_size(), 4 * 8192);
    }

    #[test]
    fn every_hook_is_a_noop() {
        let mut host = RecordingHost::default();
        for cold in [true, false].iter().copied() {
            assert_eq!(Nsc.nascent_init(&mut host), Ok(()));
            assert_eq!(Nsc.early_init(cold, &mut host), Ok(()));
            assert_eq!(Nsc.final_init(cold, &mut host), Ok(()));
            assert_eq!(Nsc.console_init(&mut host), Ok(()));
            assert_eq!(Nsc.irqchip_init(cold, &mut host), Ok(()));
            assert_eq!(Nsc.ipi_init(cold, &mut host), Ok(()));
            assert_eq!(Nsc.timer_init(cold, &mut host), Ok(()));
        }
        assert!(host.regions.is_empty());
        assert!(host.console.is_none());
        assert!(host.timer.is_none());
    }

    #[test]
    fn memory_map() {
        assert_eq!(MMCFG_BASE, 0xffff_ffff_f004_0000);
        assert_eq!(OCRAM_BASE, 0xffff_ffff_ffff_0000);
        assert_eq!(expand32(0x7fff_f000), 0x7fff_f000);

        let ddr = Nsc::memory_window("DDR").unwrap();
        assert_eq!((ddr.base, ddr.size), (0xA8_0000, 0x1_0000_0000));
        assert_eq!(Nsc::memory_window("PLIC").unwrap().region().order(), 24);
        assert!(Nsc::memory_window("SRAM").is_none());
    }

    #[test]
    fn interrupt_lines() {
        let uart = Nsc::interrupt_line("UART0").unwrap();
        assert_eq!(uart.source, 1);
        assert_eq!(uart.mode, TriggerMode::LevelHigh);
        let sources: Vec<_> = INTERRUPT_LINES.iter().map(|l| l.source).collect();
        assert_eq!(sources, vec![1, 2, 3, 4]);
    }
}
