use scr_abi::prelude::*;

/// NextSilicon SCR7 board with UART, PLIC and CSR timer.
pub mod nextsilicon;

/// NextSilicon NSC v1 board on the SCR7 FPGA, stub operations only.
pub mod pcore;

#[cfg(feature = "pcore")]
pub use self::pcore as current;

#[cfg(all(feature = "nextsilicon", not(feature = "pcore")))]
pub use self::nextsilicon as current;

#[cfg(not(any(feature = "nextsilicon", feature = "pcore")))]
compile_error!("select a board with the `nextsilicon` or `pcore` feature");

/// A device window granted to the root domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceWindow {
    pub name: &'static str,
    pub base: u64,
    pub size: u64,
    pub flags: MemRegionFlags,
}

impl DeviceWindow {
    pub fn region(&self) -> MemRegion {
        MemRegion::new(self.base, self.size, self.flags)
    }
}

/// Hand every window to the runtime, stopping at the first refusal.
pub fn add_root_windows(windows: &[DeviceWindow], host: &mut dyn PlatformHost) -> SbiResult<()> {
    for window in windows {
        let region = window.region();
        host.add_root_memregion(&region)?;
        info!(
            target: "platform",
            "{}: {:#x} order {} {:?}",
            window.name,
            region.base(),
            region.order(),
            region.flags()
        );
    }
    Ok(())
}
