use crate::addr::PAddr;

use super::level::Level;

macro_rules! check_flag {
    ($doc:meta, $fun:ident, $flag:ident) => {
        #[$doc]
        pub fn $fun(&self) -> bool {
            self.contains(Self::$flag)
        }
    };
}

/// Placement of the physical page number inside an entry.
/// Each segment is `(first address bit, width, first entry bit)`.
const PPN_SEGMENTS: [(u32, u32, u32); 3] = [
    (12, 9, 10), // PA[12, 21)
    (21, 9, 19), // PA[21, 30)
    (30, 34, 28), // PA[30, 64)
];

/// Bits of an entry that hold the physical page number.
pub const PPN_FIELD_MASK: u64 = mask!(52) << 10;

/// Pack a physical address into the entry's page-number field.
/// Bits below 4 KiB are dropped.
pub fn pack_ppn(pa: PAddr) -> u64 {
    let pa = pa.as_u64();
    PPN_SEGMENTS
        .iter()
        .fold(0, |acc, &(from, width, to)| acc | (((pa >> from) & mask!(width)) << to))
}

/// Inverse of [`pack_ppn`].
pub fn unpack_ppn(bits: u64) -> PAddr {
    let pa = PPN_SEGMENTS
        .iter()
        .fold(0, |acc, &(from, width, to)| acc | (((bits >> to) & mask!(width)) << from));
    PAddr::new(pa)
}

bitflags! {
    /// Sv39 page table entry bits description.
    pub struct PageTableEntry: u64 {
        /// Valid; must be 1 for the entry to take part in translation.
        const VALID         = bit!(0);
        /// Readable leaf.
        const READ          = bit!(1);
        /// Writeable leaf.
        const WRITE         = bit!(2);
        /// Executable leaf.
        const EXECUTE       = bit!(3);
        /// Accessible from user mode.
        const USER          = bit!(4);
        /// Present in every address space.
        const GLOBAL        = bit!(5);
        /// Accessed; set up front so the hardware never has to.
        const ACCESSED      = bit!(6);
        /// Dirty; set up front so the hardware never has to.
        const DIRTY         = bit!(7);
        /// Low bit of the page-size class. Set alone on a 2 MiB leaf.
        const SIZE_CLASS_LO = bit!(8);
        /// High bit of the page-size class. Set alone on a 1 GiB leaf.
        const SIZE_CLASS_HI = bit!(9);
    }
}

bitflags! {
    /// Access rights requested for a leaf mapping.
    pub struct PagePermissions: u64 {
        const READ    = bit!(1);
        const WRITE   = bit!(2);
        const EXECUTE = bit!(3);
    }
}

impl Default for PagePermissions {
    fn default() -> Self {
        PagePermissions::all()
    }
}

impl PageTableEntry {
    /// Creates a leaf entry mapping the page of `level` that contains `pa`.
    ///
    /// The entry carries `VALID | perms | ACCESSED | DIRTY` plus the
    /// page-size class of `level`.
    pub fn leaf(pa: PAddr, perms: PagePermissions, level: Level) -> PageTableEntry {
        let pa = pa.align_down(level.page_size());
        PageTableEntry {
            bits: pack_ppn(pa)
                | (Self::VALID | Self::ACCESSED | Self::DIRTY).bits
                | perms.bits
                | (level.size_class() << 8),
        }
    }

    /// Creates an entry pointing at the next table. Only `VALID` is set.
    pub fn next_table(table: PAddr) -> PageTableEntry {
        PageTableEntry {
            bits: pack_ppn(table) | Self::VALID.bits,
        }
    }

    /// Retrieves the physical address in this entry.
    pub fn address(self) -> PAddr {
        unpack_ppn(self.bits)
    }

    /// Raw page-number field, for diagnostics.
    pub fn ppn_field(self) -> u64 {
        self.bits & PPN_FIELD_MASK
    }

    /// Page-size class from bits 8-9.
    pub fn size_class(self) -> u64 {
        (self.bits >> 8) & mask!(2)
    }

    /// Leaf permissions carried by this entry.
    pub fn permissions(self) -> PagePermissions {
        PagePermissions::from_bits_truncate(self.bits)
    }

    /// A valid entry with any of R, W or X set maps memory; otherwise it
    /// points at another table.
    pub fn is_leaf(&self) -> bool {
        self.is_valid() && !self.permissions().is_empty()
    }

    check_flag!(doc = "Does the entry take part in translation?", is_valid, VALID);
    check_flag!(doc = "Can the mapped page be read?", is_readable, READ);
    check_flag!(doc = "Can the mapped page be written?", is_writeable, WRITE);
    check_flag!(doc = "Can instructions be fetched from the mapped page?", is_executable, EXECUTE);
    check_flag!(doc = "Is the mapped page accessible from user mode?", is_user_mode_allowed, USER);
    check_flag!(doc = "Is the accessed bit preset?", is_accessed, ACCESSED);
    check_flag!(doc = "Is the dirty bit preset?", is_dirty, DIRTY);
}

impl Default for PageTableEntry {
    fn default() -> Self {
        PageTableEntry::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppn_segments() {
        // PA[12,21) lands at bit 10.
        assert_eq!(pack_ppn(PAddr::new(0x1000)), 1 << 10);
        // PA[21,30) lands at bit 19.
        assert_eq!(pack_ppn(PAddr::new(0x20_0000)), 1 << 19);
        // PA[30,64) lands at bit 28.
        assert_eq!(pack_ppn(PAddr::new(0x4000_0000)), 1 << 28);
        // Offset bits are dropped.
        assert_eq!(pack_ppn(PAddr::new(0xfff)), 0);
    }

    #[test]
    fn pack_unpack_covers_physical_width() {
        for &pa in [0u64, 0xA8_0000, 0xAA_8000, 0x4000_0000, 0x00ff_ffff_ffff_f000].iter() {
            let pa = PAddr::new(pa);
            assert_eq!(unpack_ppn(pack_ppn(pa)), pa);
            assert_eq!(pack_ppn(pa) & !PPN_FIELD_MASK, 0);
        }
    }

    #[test]
    fn leaf_attributes() {
        let e = PageTableEntry::leaf(PAddr::new(0xA8_0000), PagePermissions::default(), Level::L0);
        assert!(e.is_valid() && e.is_readable() && e.is_writeable() && e.is_executable());
        assert!(e.is_accessed() && e.is_dirty());
        assert!(!e.is_user_mode_allowed());
        assert!(e.is_leaf());
        assert_eq!(e.size_class(), 0);
        assert_eq!(e.address(), PAddr::new(0xA8_0000));
        assert_eq!(e.bits() & 0x3ff, 0xcf);

        let e = PageTableEntry::leaf(PAddr::new(0x4000_0000), PagePermissions::READ, Level::L2);
        assert_eq!(e.size_class(), 2);
        assert_eq!(e.bits() & 0x3ff, 0x2c3);
        assert!(!e.is_writeable());

        let e = PageTableEntry::leaf(PAddr::new(0x20_0000), PagePermissions::all(), Level::L1);
        assert_eq!(e.size_class(), 1);
    }

    #[test]
    fn leaf_rounds_to_page_of_level() {
        let e = PageTableEntry::leaf(PAddr::new(0x4012_3456), PagePermissions::all(), Level::L1);
        assert_eq!(e.address(), PAddr::new(0x4000_0000));
        let e = PageTableEntry::leaf(PAddr::new(0x4012_3456), PagePermissions::all(), Level::L0);
        assert_eq!(e.address(), PAddr::new(0x4012_3000));
    }

    #[test]
    fn next_table_carries_valid_only() {
        let e = PageTableEntry::next_table(PAddr::new(0x8020_3000));
        assert_eq!(e.bits() & 0x3ff, PageTableEntry::VALID.bits());
        assert!(e.is_valid());
        assert!(!e.is_leaf());
        assert_eq!(e.address(), PAddr::new(0x8020_3000));
    }
}
