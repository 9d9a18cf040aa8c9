use getset::CopyGetters;
use scr_utils::align;

use crate::addr::{PAddr, VAddr};

use super::{
    level::Level,
    mapping::{MappingEntry, MappingError, TableRef},
    BASE_PAGE_LENGTH, ENTRIES_PER_TABLE,
};

/// Explicit declarations a plan holds per level.
pub const DECLARATIONS_PER_LEVEL: usize = 8;

/// Identity runs a plan holds.
pub const RUNS_PER_PLAN: usize = 4;

type Declarations = heapless::Vec<MappingEntry, DECLARATIONS_PER_LEVEL>;

/// Contiguous 4 KiB identity leaves.
#[derive(Copy, Clone, Debug, Eq, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct IdentityRun {
    base: PAddr,
    pages: u64,
}

impl IdentityRun {
    pub fn entries(&self) -> impl Iterator<Item = MappingEntry> + Clone {
        let base = self.base.as_u64();
        (0..self.pages).map(move |page| MappingEntry::identity(base + page * BASE_PAGE_LENGTH))
    }
}

/// Declarations for an identity-mapped firmware image.
///
/// Next-table declarations all use the address space's own child tables, and
/// an address space has a single level 0 table. That table can only serve
/// one 2 MiB window: routing a second window through it would make its
/// leaves answer for addresses in both. Every identity run therefore has to
/// lie in the same 2 MiB window, and images that would need a second one are
/// refused.
#[derive(Clone, Debug, Default)]
pub struct IdentityPlan {
    level2: Declarations,
    level1: Declarations,
    level0: Declarations,
    runs: heapless::Vec<IdentityRun, RUNS_PER_PLAN>,
}

impl IdentityPlan {
    pub fn new() -> IdentityPlan {
        IdentityPlan::default()
    }

    /// Plan mapping `[base, base + size)` onto itself with 4 KiB pages.
    pub fn for_image(base: PAddr, size: u64) -> Result<IdentityPlan, MappingError> {
        let mut plan = IdentityPlan::new();
        plan.add_image(base, size)?;
        Ok(plan)
    }

    /// Add an identity mapping of `[base, base + size)` with 4 KiB pages.
    pub fn add_image(&mut self, base: PAddr, size: u64) -> Result<(), MappingError> {
        if size == 0 {
            return Ok(());
        }
        let start = base.align_down(BASE_PAGE_LENGTH);
        let end = base
            .as_u64()
            .checked_add(size)
            .ok_or(MappingError::AddressOutOfRange {
                level: Level::L0,
                addr: base.as_u64(),
            })?;
        let pages = align::div_ceil(end - start.as_u64(), BASE_PAGE_LENGTH);
        if pages > ENTRIES_PER_TABLE as u64 || self.runs.is_full() {
            return Err(MappingError::PlanCapacityExceeded);
        }

        let window = start.align_down(Level::L1.page_size());
        let last = start + (pages - 1) * BASE_PAGE_LENGTH;
        if last.align_down(Level::L1.page_size()) != window {
            return Err(MappingError::PlanCapacityExceeded);
        }
        if let Some(run) = self.runs.first() {
            if run.base.align_down(Level::L1.page_size()) != window {
                return Err(MappingError::PlanCapacityExceeded);
            }
        }

        let va = VAddr::new(window.as_u64());
        let mut missing = [Level::L2, Level::L1]
            .iter()
            .copied()
            .filter(|&level| !self.routes_to_child(level, va));
        if missing.any(|level| self.declared(level).len() == DECLARATIONS_PER_LEVEL) {
            return Err(MappingError::PlanCapacityExceeded);
        }

        for level in [Level::L2, Level::L1].iter().copied() {
            if !self.routes_to_child(level, va) {
                self.declare(level, MappingEntry::child(va))?;
            }
        }
        self.runs
            .push(IdentityRun { base: start, pages })
            .map_err(|_| MappingError::PlanCapacityExceeded)?;

        info!(
            target: "mmu",
            "identity map {} size {:#x}: {} pages",
            start,
            size,
            pages
        );
        Ok(())
    }

    /// Add a 1 GiB identity leaf at the root level for the window containing
    /// `addr`.
    pub fn add_huge_identity(&mut self, addr: PAddr) -> Result<(), MappingError> {
        let window = addr.align_down(Level::L2.page_size()).as_u64();
        self.declare(Level::L2, MappingEntry::identity(window))
    }

    /// Add an arbitrary declaration for `level`.
    pub fn declare(&mut self, level: Level, entry: MappingEntry) -> Result<(), MappingError> {
        self.declared_mut(level)
            .push(entry)
            .map_err(|_| MappingError::PlanCapacityExceeded)
    }

    /// Declarations for `level`, in the order they will be written.
    pub fn entries(&self, level: Level) -> impl Iterator<Item = MappingEntry> + Clone + '_ {
        let runs = match level {
            Level::L0 => &self.runs[..],
            _ => &[][..],
        };
        self.declared(level)
            .iter()
            .copied()
            .chain(runs.iter().flat_map(IdentityRun::entries))
    }

    /// Number of level 0 leaves the plan produces.
    pub fn leaf_pages(&self) -> u64 {
        self.runs.iter().map(IdentityRun::pages).sum::<u64>() + self.level0.len() as u64
    }

    fn declared(&self, level: Level) -> &[MappingEntry] {
        match level {
            Level::L2 => &self.level2,
            Level::L1 => &self.level1,
            Level::L0 => &self.level0,
        }
    }

    fn declared_mut(&mut self, level: Level) -> &mut Declarations {
        match level {
            Level::L2 => &mut self.level2,
            Level::L1 => &mut self.level1,
            Level::L0 => &mut self.level0,
        }
    }

    /// Whether `level` already routes `va` through the child table.
    fn routes_to_child(&self, level: Level, va: VAddr) -> bool {
        let index = level.index(va);
        self.declared(level).iter().any(|entry| match *entry {
            MappingEntry::NextTable {
                va: declared,
                table: TableRef::Child,
            } => level.index(declared) == index,
            _ => false,
        })
    }
}
