use std::{borrow::Borrow, fmt, marker::PhantomData};

use crate::addr::{PAddr, VAddr};

use super::{
    build_level,
    level::Level,
    mapping::{MappingEntry, MappingError},
    plan::IdentityPlan,
    table::{PageTable, PageTables},
    PAGE_SHIFT,
};

/// Value of the supervisor address translation register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Satp(u64);

impl Satp {
    /// Translation disabled.
    pub const BARE: Satp = Satp(0);

    /// Mode field selecting three-level Sv39 translation.
    pub const MODE_SV39: u64 = 8 << 60;

    const PPN_MASK: u64 = mask!(44);

    /// Sv39 translation rooted at `root`, ASID 0.
    pub fn sv39(root: PAddr) -> Satp {
        Satp(Self::MODE_SV39 | ((root.as_u64() >> PAGE_SHIFT) & Self::PPN_MASK))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Physical address of the root table.
    pub fn root(self) -> PAddr {
        PAddr::new((self.0 & Self::PPN_MASK) << PAGE_SHIFT)
    }
}

impl fmt::LowerHex for Satp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// The instructions that commit a translation context on the running hart.
pub trait Hart {
    /// Write the translation root register.
    fn write_satp(&mut self, satp: Satp);

    /// Order previous table writes before later translations.
    fn sfence_vma(&mut self);
}

/// Tables are being populated and are not in use by the hardware.
#[derive(Debug)]
pub struct Unmapped;

/// Tables are live on a hart. They can be inspected but not changed.
#[derive(Debug)]
pub struct Mapped;

/// A translation context over caller-owned [`PageTables`].
///
/// The tables are borrowed for the lifetime of the handle so their physical
/// addresses stay fixed once referenced by entries or by `satp`.
pub struct AddressSpace<'a, S> {
    tables: &'a mut PageTables,
    _state: PhantomData<S>,
}

impl<'a> AddressSpace<'a, Unmapped> {
    /// Take over `tables`, invalidating every entry.
    pub fn new(tables: &'a mut PageTables) -> AddressSpace<'a, Unmapped> {
        tables.zero();
        AddressSpace {
            tables,
            _state: PhantomData,
        }
    }

    /// Write `entries` into the table for `level`, with the next finer table
    /// as the target of [`TableRef::Child`](super::mapping::TableRef::Child).
    pub fn build_level<I>(&mut self, entries: I, level: Level) -> Result<(), MappingError>
    where
        I: IntoIterator,
        I::Item: Borrow<MappingEntry>,
        I::IntoIter: Clone,
    {
        let (table, child) = self.tables.split_mut(level);
        build_level(entries, level, table, child.map(PageTable::paddr))
    }

    /// Populate every level from `plan`, root first.
    pub fn build(&mut self, plan: &IdentityPlan) -> Result<(), MappingError> {
        for level in Level::WALK.iter().copied() {
            self.build_level(plan.entries(level), level)?;
            info!(
                target: "mmu",
                "{} has {} entries",
                level,
                self.tables.table(level).valid_entries().count()
            );
        }
        Ok(())
    }

    /// Point the hart at these tables and turn translation on.
    pub fn activate<H: Hart>(self, hart: &mut H) -> AddressSpace<'a, Mapped> {
        let satp = self.satp();
        info!(target: "mmu", "satp {:016x}", satp);
        hart.write_satp(satp);
        hart.sfence_vma();
        AddressSpace {
            tables: self.tables,
            _state: PhantomData,
        }
    }
}

impl<'a, S> AddressSpace<'a, S> {
    pub fn root(&self) -> PAddr {
        self.tables.table(Level::L2).paddr()
    }

    /// Register value selecting these tables. Depends only on where the root
    /// table lives.
    pub fn satp(&self) -> Satp {
        Satp::sv39(self.root())
    }

    pub fn table(&self, level: Level) -> &PageTable {
        self.tables.table(level)
    }

    /// Walk the tables in software.
    ///
    /// Next-table entries are only followed when they point at this address
    /// space's table for the next level.
    pub fn translate(&self, va: VAddr) -> Option<PAddr> {
        if !va.is_canonical() {
            return None;
        }
        let mut level = Level::L2;
        loop {
            let entry = self.tables.table(level)[level.index(va)];
            if !entry.is_valid() {
                return None;
            }
            if entry.is_leaf() {
                let offset = va.as_u64() & (level.page_size() - 1);
                return Some(entry.address() + offset);
            }
            let child = level.child()?;
            if self.tables.table(child).paddr() != entry.address() {
                return None;
            }
            level = child;
        }
    }

    /// Log every valid entry.
    pub fn dump(&self) {
        for level in Level::WALK.iter().copied() {
            let table = self.tables.table(level);
            info!(target: "mmu", "{} table at {:016x}", level, table.paddr());
            for (index, entry) in table.valid_entries() {
                info!(
                    target: "mmu",
                    "  [{:3}] {:016x} -> {:016x}{}",
                    index,
                    entry,
                    entry.address(),
                    if entry.is_leaf() { " leaf" } else { "" }
                );
            }
        }
    }
}

impl<S> fmt::Debug for AddressSpace<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AddressSpace")
            .field("root", &self.root())
            .finish()
    }
}
