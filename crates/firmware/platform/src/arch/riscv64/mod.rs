use core::arch::asm;

mod csr;

pub use self::csr::MachineCsrs;

/// Return from machine mode into `entry`, at the privilege selected by
/// `mstatus.MPP`.
///
/// # Safety
/// Must run in machine mode with `mstatus` prepared, see
/// [`setup_supervisor`](crate::hart::setup_supervisor).
#[inline]
pub unsafe fn enter_supervisor(entry: extern "C" fn() -> !) -> ! {
    asm!(
        "csrw mepc, {0}",
        "mret",
        in(reg) entry as usize,
        options(noreturn)
    )
}

/// Stop this hart for good.
pub fn park() -> ! {
    loop {
        unsafe { asm!("wfi", options(nomem, nostack)) }
    }
}
