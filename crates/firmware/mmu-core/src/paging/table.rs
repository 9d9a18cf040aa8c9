use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::addr::PAddr;

use super::{entry::PageTableEntry, level::Level, BASE_PAGE_LENGTH, ENTRIES_PER_TABLE};

/// One translation table. Must occupy, and be aligned to, a single 4 KiB page.
#[derive(Clone)]
#[repr(C, align(4096))]
pub struct PageTable([PageTableEntry; ENTRIES_PER_TABLE]);

assert_eq_size!([u8; BASE_PAGE_LENGTH as usize], PageTable);

impl PageTable {
    pub const fn new() -> PageTable {
        PageTable([PageTableEntry::empty(); ENTRIES_PER_TABLE])
    }

    /// Invalidate every entry.
    pub fn zero(&mut self) {
        for entry in self.0.iter_mut() {
            *entry = PageTableEntry::empty();
        }
    }

    /// Physical address of this table.
    pub fn paddr(&self) -> PAddr {
        PAddr::of(self)
    }

    /// Index and value of each valid entry.
    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, PageTableEntry)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, e)| e.is_valid())
    }
}

impl Default for PageTable {
    fn default() -> Self {
        PageTable::new()
    }
}

impl Deref for PageTable {
    type Target = [PageTableEntry; ENTRIES_PER_TABLE];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PageTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Debug for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PageTable")
            .field("paddr", &self.paddr())
            .field("valid", &self.valid_entries().count())
            .finish()
    }
}

/// Storage for one address space: a table per level.
#[derive(Debug, Default)]
#[repr(C)]
pub struct PageTables {
    level2: PageTable,
    level1: PageTable,
    level0: PageTable,
}

impl PageTables {
    pub const fn new() -> PageTables {
        PageTables {
            level2: PageTable::new(),
            level1: PageTable::new(),
            level0: PageTable::new(),
        }
    }

    pub fn table(&self, level: Level) -> &PageTable {
        match level {
            Level::L2 => &self.level2,
            Level::L1 => &self.level1,
            Level::L0 => &self.level0,
        }
    }

    /// The table at `level`, writable, alongside the next finer table.
    pub fn split_mut(&mut self, level: Level) -> (&mut PageTable, Option<&PageTable>) {
        match level {
            Level::L2 => (&mut self.level2, Some(&self.level1)),
            Level::L1 => (&mut self.level1, Some(&self.level0)),
            Level::L0 => (&mut self.level0, None),
        }
    }

    /// Level whose table sits at `paddr`.
    pub fn level_at(&self, paddr: PAddr) -> Option<Level> {
        Level::WALK
            .iter()
            .copied()
            .find(|&level| self.table(level).paddr() == paddr)
    }

    pub fn zero(&mut self) {
        self.level2.zero();
        self.level1.zero();
        self.level0.zero();
    }
}
