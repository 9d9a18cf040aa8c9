use bitflags::bitflags;
use getset::CopyGetters;

use crate::{error::SbiResult, memregion::MemRegion};

/// Default per-hart stack the runtime reserves for a platform.
pub const DEFAULT_HART_STACK_SIZE: u32 = 8192;

/// Platform version, packed as `major << 16 | minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PlatformVersion(u32);

assert_eq_size!(u32, PlatformVersion);

impl PlatformVersion {
    pub const fn new(major: u16, minor: u16) -> PlatformVersion {
        PlatformVersion(((major as u32) << 16) | minor as u32)
    }

    pub const fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn minor(self) -> u16 {
        self.0 as u16
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Optional runtime features a platform opts into.
    pub struct PlatformFeatures: u64 {
        /// Timer value can be read by the runtime.
        const TIMER_VALUE         = 1 << 0;
        /// Harts can be hot-plugged.
        const HART_HOTPLUG        = 1 << 1;
        /// Misaligned and access faults are delegated to lower modes.
        const MFAULTS_DELEGATION  = 1 << 2;
        /// Secondary harts are booted by the platform.
        const HART_SECONDARY_BOOT = 1 << 3;
    }
}

impl PlatformFeatures {
    /// Features every board gets unless it asks otherwise.
    pub const DEFAULT: PlatformFeatures = PlatformFeatures::from_bits_truncate(
        PlatformFeatures::TIMER_VALUE.bits() | PlatformFeatures::MFAULTS_DELEGATION.bits(),
    );
}

/// Static description of a board, handed to the runtime at link time.
#[derive(Debug, Clone, Copy, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PlatformDescriptor {
    name: &'static str,
    version: PlatformVersion,
    features: PlatformFeatures,
    hart_count: u32,
    hart_stack_size: u32,
}

impl PlatformDescriptor {
    pub const fn new(
        name: &'static str,
        version: PlatformVersion,
        features: PlatformFeatures,
        hart_count: u32,
    ) -> PlatformDescriptor {
        PlatformDescriptor {
            name,
            version,
            features,
            hart_count,
            hart_stack_size: DEFAULT_HART_STACK_SIZE,
        }
    }

    /// Total stack the runtime reserves across all harts.
    pub const fn total_stack_size(&self) -> u64 {
        self.hart_count as u64 * self.hart_stack_size as u64
    }
}

/// A machine timer the runtime can program.
pub trait TimerDevice: Sync {
    fn name(&self) -> &'static str;

    /// Tick frequency in Hz.
    fn frequency(&self) -> u64;

    /// Current tick count.
    fn value(&self) -> u64;

    /// Arm the compare register for `next_event` ticks.
    fn event_start(&self, next_event: u64);

    /// Disarm the compare register.
    fn event_stop(&self);
}

/// A byte-oriented console the runtime can print through.
pub trait ConsoleDevice: Sync {
    fn putc(&self, byte: u8);

    /// Non-blocking read.
    fn getc(&self) -> Option<u8>;
}

/// Services the runtime provides back to a board during initialization.
pub trait PlatformHost {
    /// Grant the root domain access to a memory window.
    fn add_root_memregion(&mut self, region: &MemRegion) -> SbiResult<()>;

    /// Install the machine timer.
    fn set_timer_device(&mut self, device: &'static dyn TimerDevice);

    /// Install the console.
    fn set_console_device(&mut self, device: &'static dyn ConsoleDevice);
}

/// The platform-operations table. Every hook defaults to a no-op success, so
/// a board only overrides what it actually needs.
pub trait PlatformOperations: Sync {
    fn descriptor(&self) -> &PlatformDescriptor;

    /// Earliest hook, before the runtime touches any device.
    fn nascent_init(&self, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    fn early_init(&self, _cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    fn final_init(&self, _cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    fn console_init(&self, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    /// Interrupt controller bring-up for the current hart.
    fn irqchip_init(&self, _cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    /// Inter-processor interrupt bring-up for the current hart.
    fn ipi_init(&self, _cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }

    fn timer_init(&self, _cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
        Ok(())
    }
}

/// Run every hook in the order the runtime calls them on a cold boot.
pub fn cold_boot(ops: &dyn PlatformOperations, host: &mut dyn PlatformHost) -> SbiResult<()> {
    ops.nascent_init(host)?;
    ops.early_init(true, host)?;
    ops.console_init(host)?;
    ops.irqchip_init(true, host)?;
    ops.ipi_init(true, host)?;
    ops.timer_init(true, host)?;
    ops.final_init(true, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SbiError;

    struct Stub {
        descriptor: PlatformDescriptor,
    }

    impl PlatformOperations for Stub {
        fn descriptor(&self) -> &PlatformDescriptor {
            &self.descriptor
        }
    }

    struct WarmOnly(PlatformDescriptor);

    impl PlatformOperations for WarmOnly {
        fn descriptor(&self) -> &PlatformDescriptor {
            &self.0
        }

        fn irqchip_init(&self, cold_boot: bool, _host: &mut dyn PlatformHost) -> SbiResult<()> {
            if cold_boot {
                Err(SbiError::NotSupported)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct NullHost {
        regions: usize,
    }

    impl PlatformHost for NullHost {
        fn add_root_memregion(&mut self, _region: &MemRegion) -> SbiResult<()> {
            self.regions += 1;
            Ok(())
        }

        fn set_timer_device(&mut self, _device: &'static dyn TimerDevice) {}

        fn set_console_device(&mut self, _device: &'static dyn ConsoleDevice) {}
    }

    #[test]
    fn test_version_packing() {
        let version = PlatformVersion::new(0x07, 0x00);
        assert_eq!(0x0007_0000, version.bits());
        assert_eq!(7, version.major());
        assert_eq!(0, version.minor());
        assert!(PlatformVersion::new(0, 1) < version);
    }

    #[test]
    fn test_stub_operations_succeed() {
        let stub = Stub {
            descriptor: PlatformDescriptor::new(
                "stub",
                PlatformVersion::new(0, 1),
                PlatformFeatures::DEFAULT,
                4,
            ),
        };
        let mut host = NullHost::default();
        assert_eq!(Ok(()), cold_boot(&stub, &mut host));
        assert_eq!(0, host.regions);
        assert_eq!(4 * DEFAULT_HART_STACK_SIZE as u64, stub.descriptor().total_stack_size());
        assert!(stub
            .descriptor()
            .features()
            .contains(PlatformFeatures::MFAULTS_DELEGATION));
    }

    #[test]
    fn test_cold_boot_stops_at_first_error() {
        let ops = WarmOnly(PlatformDescriptor::new(
            "warm",
            PlatformVersion::new(0, 1),
            PlatformFeatures::empty(),
            1,
        ));
        let mut host = NullHost::default();
        assert_eq!(Err(SbiError::NotSupported), cold_boot(&ops, &mut host));
        assert_eq!(Ok(()), ops.irqchip_init(false, &mut host));
    }
}
