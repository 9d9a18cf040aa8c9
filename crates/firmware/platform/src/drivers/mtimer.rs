use scr_abi::prelude::*;
use spin::Mutex;

use crate::hart::{Csr, CsrAccess};

/// Machine timer whose counter and compare registers are CSRs rather than
/// memory-mapped, as on SCR7 cores.
pub struct CsrMtimer<C> {
    csrs: Mutex<C>,
    frequency: u64,
}

impl<C> CsrMtimer<C> {
    pub const fn new(csrs: C, frequency: u64) -> CsrMtimer<C> {
        CsrMtimer {
            csrs: Mutex::new(csrs),
            frequency,
        }
    }
}

impl<C: CsrAccess + Send> TimerDevice for CsrMtimer<C> {
    fn name(&self) -> &'static str {
        "MTIMER"
    }

    fn frequency(&self) -> u64 {
        self.frequency
    }

    fn value(&self) -> u64 {
        self.csrs.lock().read(Csr::Mtime)
    }

    fn event_start(&self, next_event: u64) {
        self.csrs.lock().write(Csr::MtimerCmp, next_event);
    }

    fn event_stop(&self) {
        self.csrs.lock().write(Csr::MtimerCmp, u64::MAX);
    }
}
