use core::arch::asm;

use scr_mmu_core::paging::address_space::{Hart, Satp};

use crate::hart::{Csr, CsrAccess};

/// The running hart's own control registers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MachineCsrs;

// The register number is encoded in the instruction, hence one arm each.
macro_rules! machine_csr_access {
    ( $( $(#[$doc:meta])* $name:ident = $num:literal, )* ) => {
        impl CsrAccess for MachineCsrs {
            #[inline]
            fn read(&mut self, csr: Csr) -> u64 {
                let value: u64;
                unsafe {
                    match csr {
                        $( Csr::$name => asm!("csrr {0}, {1}", out(reg) value, const $num, options(nomem, nostack)), )*
                    }
                }
                value
            }

            #[inline]
            fn write(&mut self, csr: Csr, value: u64) {
                unsafe {
                    match csr {
                        $( Csr::$name => asm!("csrw {1}, {0}", in(reg) value, const $num, options(nostack)), )*
                    }
                }
            }
        }
    };
}

for_each_csr!(machine_csr_access);

impl Hart for MachineCsrs {
    fn write_satp(&mut self, satp: Satp) {
        self.write(Csr::Satp, satp.bits());
    }

    fn sfence_vma(&mut self) {
        unsafe { asm!("sfence.vma", options(nostack)) }
    }
}
