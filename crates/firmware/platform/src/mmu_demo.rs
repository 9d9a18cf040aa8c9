use std::sync::atomic::{AtomicBool, Ordering};

use getset::CopyGetters;
use scr_abi::prelude::*;
use scr_mmu_core::prelude::*;
use spin::Mutex;
#[cfg(target_arch = "riscv64")]
use spin::Once;

/// Tables for the supervisor identity map. Never freed; `satp` points here
/// once the bring-up ran.
static PAGE_TABLES: Mutex<PageTables> = Mutex::new(PageTables::new());

#[cfg(target_arch = "riscv64")]
static BRINGUP: OneShot = OneShot::new();

#[cfg(target_arch = "riscv64")]
static IMAGE: Once<FirmwareImage> = Once::new();

/// Physical extent of the running firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct FirmwareImage {
    base: PAddr,
    size: u64,
}

impl FirmwareImage {
    pub const fn new(base: PAddr, size: u64) -> FirmwareImage {
        FirmwareImage { base, size }
    }

    /// Identity map of the image with 4 KiB pages.
    pub fn plan(&self) -> Result<IdentityPlan, MappingError> {
        IdentityPlan::for_image(self.base, self.size)
    }
}

/// A flag that can be claimed once.
#[derive(Debug)]
pub struct OneShot(AtomicBool);

impl OneShot {
    pub const fn new() -> OneShot {
        OneShot(AtomicBool::new(false))
    }

    pub fn claim(&self) -> SbiResult<()> {
        if self.0.swap(true, Ordering::AcqRel) {
            return Err(SbiError::AlreadyStarted);
        }
        Ok(())
    }
}

impl Default for OneShot {
    fn default() -> Self {
        OneShot::new()
    }
}

/// Build `plan` into `tables` and switch `hart` over to it.
///
/// Nothing reaches the hart unless every level was written.
pub fn enable_identity_mapping<H: Hart>(
    tables: &mut PageTables,
    plan: &IdentityPlan,
    hart: &mut H,
) -> Result<Satp, MappingError> {
    let mut space = AddressSpace::new(tables);
    space.build(plan)?;
    space.dump();

    let space = space.activate(hart);
    info!(target: "mmu", "After sfence");
    Ok(space.satp())
}

/// Identity map `image` into the firmware's own tables.
pub fn configure_mmu<H: Hart>(image: &FirmwareImage, hart: &mut H) -> Result<Satp, MappingError> {
    let plan = image.plan()?;
    let mut tables = PAGE_TABLES.lock();
    enable_identity_mapping(&mut tables, &plan, hart)
}

/// Drop to supervisor mode and run under an identity map of `image`.
///
/// Only returns if the bring-up already ran on this firmware.
#[cfg(target_arch = "riscv64")]
pub fn test_mmu(image: FirmwareImage) -> SbiResult<std::convert::Infallible> {
    use crate::{
        arch::{enter_supervisor, MachineCsrs},
        hart::setup_supervisor,
    };

    info!(target: "bootstrap", "Start in M-mode...");
    BRINGUP.claim()?;
    IMAGE.call_once(|| image);

    setup_supervisor(&mut MachineCsrs);
    unsafe { enter_supervisor(exec_s_mode) }
}

#[cfg(target_arch = "riscv64")]
extern "C" fn exec_s_mode() -> ! {
    use crate::arch::{park, MachineCsrs};

    info!(target: "bootstrap", "Executing S-mode!!!");
    info!(target: "mmu", "Starting configuring mmu");
    match IMAGE.get() {
        Some(image) => match configure_mmu(image, &mut MachineCsrs) {
            Ok(satp) => info!(target: "mmu", "Finished configuring mmu! satp {:016x}", satp),
            Err(e) => error!(target: "mmu", "mmu configuration failed: {}", e),
        },
        None => error!(target: "mmu", "no firmware image recorded"),
    }
    park()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hart::{
        testing::{CsrOp, RecordingCsrs},
        Csr,
    };

    #[test]
    fn identity_mapping_reaches_hart_last() {
        let mut tables = Box::new(PageTables::new());
        let plan = IdentityPlan::for_image(PAddr::new(0x8000_0000), 0x2_9000).unwrap();
        let mut hart = RecordingCsrs::default();

        let satp = enable_identity_mapping(&mut tables, &plan, &mut hart).unwrap();
        assert_eq!(satp.root(), tables.table(Level::L2).paddr());
        assert_eq!(
            hart.ops,
            vec![CsrOp::Write(Csr::Satp, satp.bits()), CsrOp::SfenceVma]
        );
        assert_eq!(tables.table(Level::L0).valid_entries().count(), 41);
    }

    #[test]
    fn failed_build_leaves_hart_alone() {
        let mut tables = Box::new(PageTables::new());
        let mut plan = IdentityPlan::new();
        plan.declare(Level::L2, MappingEntry::identity(1 << 56)).unwrap();
        let mut hart = RecordingCsrs::default();

        let err = enable_identity_mapping(&mut tables, &plan, &mut hart).unwrap_err();
        assert_eq!(
            err,
            MappingError::AddressOutOfRange {
                level: Level::L2,
                addr: 1 << 56
            }
        );
        assert!(hart.ops.is_empty());
    }

    #[test]
    fn configure_uses_firmware_tables() {
        let image = FirmwareImage::new(PAddr::new(0x80_0000), 0x1000);
        let mut hart = RecordingCsrs::default();
        let satp = configure_mmu(&image, &mut hart).unwrap();
        assert_eq!(satp.root(), PAGE_TABLES.lock().table(Level::L2).paddr());
        assert_eq!(hart.writes(), vec![(Csr::Satp, satp.bits())]);
    }

    #[test]
    fn bringup_is_one_shot() {
        let guard = OneShot::new();
        assert_eq!(guard.claim(), Ok(()));
        assert_eq!(guard.claim(), Err(SbiError::AlreadyStarted));
    }
}
