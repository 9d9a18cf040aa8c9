use scr_mmu_core::paging::address_space::Satp;

/// Invokes `$m!` with every control register the firmware touches, as
/// `Name = number,` pairs.
macro_rules! for_each_csr {
    ($m:ident) => {
        $m! {
            /// Supervisor interrupt enable.
            Sie = 0x104,
            /// Supervisor trap vector.
            Stvec = 0x105,
            /// Supervisor interrupt pending.
            Sip = 0x144,
            /// Supervisor address translation and protection.
            Satp = 0x180,
            /// Machine status.
            Mstatus = 0x300,
            /// Machine exception delegation.
            Medeleg = 0x302,
            /// Machine interrupt delegation.
            Mideleg = 0x303,
            /// Machine exception program counter.
            Mepc = 0x341,
            /// SCR7 machine timer compare.
            MtimerCmp = 0x7C0,
            /// SCR MMU page attributes.
            MmuPattr = 0xBC0,
            /// SCR MMU virtual address.
            MmuVaddr = 0xBC1,
            /// SCR MMU TLB update.
            MmuUpdate = 0xBC2,
            /// SCR MMU TLB scan.
            MmuScan = 0xBC3,
            /// SCR7 machine timer counter.
            Mtime = 0xBFF,
        }
    };
}

macro_rules! define_csrs {
    ( $( $(#[$doc:meta])* $name:ident = $num:literal, )* ) => {
        /// Control and status registers touched by the firmware.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Csr {
            $( $(#[$doc])* $name, )*
        }

        $( const_assert!($num < 0x1000); )*

        impl Csr {
            pub const ALL: &'static [Csr] = &[ $( Csr::$name, )* ];

            /// 12-bit register number.
            pub const fn number(self) -> u16 {
                match self {
                    $( Csr::$name => $num, )*
                }
            }
        }
    };
}

for_each_csr!(define_csrs);

/// Read and write access to control registers.
pub trait CsrAccess {
    fn read(&mut self, csr: Csr) -> u64;

    fn write(&mut self, csr: Csr, value: u64);
}

bitflags! {
    /// Fields of `mstatus` changed on the way to supervisor mode.
    pub struct Mstatus: u64 {
        /// Supervisor interrupt enable.
        const SIE    = bit!(1);
        /// Machine previous interrupt enable.
        const MPIE   = bit!(7);
        /// Supervisor previous privilege.
        const SPP    = bit!(8);
        /// Machine previous privilege, low bit.
        const MPP_LO = bit!(11);
        /// Machine previous privilege, high bit.
        const MPP_HI = bit!(12);
    }
}

impl Mstatus {
    /// The whole machine previous privilege field.
    pub const MPP: Mstatus =
        Mstatus::from_bits_truncate(Mstatus::MPP_LO.bits() | Mstatus::MPP_HI.bits());

    /// `mret` lands in supervisor mode.
    pub const MPP_SUPERVISOR: Mstatus = Mstatus::MPP_LO;
}

bitflags! {
    /// Exception causes, as bits of `medeleg`.
    pub struct Exceptions: u64 {
        const INSTRUCTION_PAGE_FAULT = bit!(12);
        const LOAD_PAGE_FAULT        = bit!(13);
        const STORE_PAGE_FAULT       = bit!(15);
    }
}

impl Exceptions {
    /// Page faults are taken in supervisor mode. On SCR cores this is also
    /// what turns TLB misses into page walks instead of machine traps.
    pub const PAGE_FAULTS: Exceptions = Exceptions::all();
}

/// Prepare the hart so that `mret` enters supervisor mode with translation
/// off, interrupts masked and only page faults delegated.
pub fn setup_supervisor<C: CsrAccess>(csrs: &mut C) {
    csrs.write(Csr::Mstatus, 0);
    csrs.write(Csr::Satp, Satp::BARE.bits());
    csrs.write(Csr::Mideleg, 0);
    csrs.write(Csr::Medeleg, Exceptions::PAGE_FAULTS.bits());

    csrs.write(Csr::Stvec, 0);
    csrs.write(Csr::Sie, 0);
    csrs.write(Csr::Sip, 0);

    let cleared = Mstatus::MPP | Mstatus::SPP | Mstatus::MPIE | Mstatus::SIE;
    let status = csrs.read(Csr::Mstatus) & !cleared.bits();
    csrs.write(Csr::Mstatus, status | Mstatus::MPP_SUPERVISOR.bits());

    debug!(target: "bootstrap", "mstatus {:#x}", csrs.read(Csr::Mstatus));
}

#[cfg(test)]
pub(crate) mod testing {
    use scr_mmu_core::paging::address_space::{Hart, Satp};

    use super::{Csr, CsrAccess};

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub enum CsrOp {
        Write(Csr, u64),
        SfenceVma,
    }

    /// Register file that remembers every write.
    #[derive(Debug, Default)]
    pub struct RecordingCsrs {
        values: Vec<(Csr, u64)>,
        pub ops: Vec<CsrOp>,
    }

    impl RecordingCsrs {
        pub fn with(csr: Csr, value: u64) -> RecordingCsrs {
            RecordingCsrs {
                values: vec![(csr, value)],
                ops: Vec::new(),
            }
        }

        pub fn writes(&self) -> Vec<(Csr, u64)> {
            self.ops
                .iter()
                .filter_map(|op| match *op {
                    CsrOp::Write(csr, value) => Some((csr, value)),
                    CsrOp::SfenceVma => None,
                })
                .collect()
        }
    }

    impl CsrAccess for RecordingCsrs {
        fn read(&mut self, csr: Csr) -> u64 {
            self.values
                .iter()
                .find(|(c, _)| *c == csr)
                .map(|(_, v)| *v)
                .unwrap_or(0)
        }

        fn write(&mut self, csr: Csr, value: u64) {
            self.ops.push(CsrOp::Write(csr, value));
            match self.values.iter_mut().find(|(c, _)| *c == csr) {
                Some(slot) => slot.1 = value,
                None => self.values.push((csr, value)),
            }
        }
    }

    impl Hart for RecordingCsrs {
        fn write_satp(&mut self, satp: Satp) {
            self.write(Csr::Satp, satp.bits());
        }

        fn sfence_vma(&mut self) {
            self.ops.push(CsrOp::SfenceVma);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingCsrs;
    use super::*;

    #[test]
    fn register_numbers() {
        assert_eq!(Csr::Mstatus.number(), 0x300);
        assert_eq!(Csr::Satp.number(), 0x180);
        assert_eq!(Csr::Mtime.number(), 0xBFF);
        assert_eq!(Csr::MtimerCmp.number(), 0x7C0);
        assert_eq!(Csr::MmuScan.number(), 0xBC3);
        assert_eq!(Csr::ALL.len(), 14);
    }

    #[test]
    fn supervisor_setup_sequence() {
        let mut csrs = RecordingCsrs::default();
        setup_supervisor(&mut csrs);
        assert_eq!(
            csrs.writes(),
            vec![
                (Csr::Mstatus, 0),
                (Csr::Satp, 0),
                (Csr::Mideleg, 0),
                (Csr::Medeleg, (1 << 12) | (1 << 13) | (1 << 15)),
                (Csr::Stvec, 0),
                (Csr::Sie, 0),
                (Csr::Sip, 0),
                (Csr::Mstatus, 1 << 11),
            ]
        );
    }

    #[test]
    fn supervisor_setup_keeps_unrelated_status_bits() {
        // A core that forces some read-only status bits back on.
        struct Sticky(RecordingCsrs);

        impl CsrAccess for Sticky {
            fn read(&mut self, csr: Csr) -> u64 {
                let value = self.0.read(csr);
                if csr == Csr::Mstatus {
                    value | (3 << 32) | (1 << 12) | (1 << 8) | (1 << 7) | (1 << 1)
                } else {
                    value
                }
            }

            fn write(&mut self, csr: Csr, value: u64) {
                self.0.write(csr, value)
            }
        }

        let mut csrs = Sticky(RecordingCsrs::with(Csr::Mstatus, 0));
        setup_supervisor(&mut csrs);
        let last = csrs.0.writes().last().copied();
        assert_eq!(last, Some((Csr::Mstatus, (3 << 32) | (1 << 11))));
    }
}
