use std::fmt;

use crate::addr::{PAddr, VAddr};

use super::{entry::PagePermissions, level::Level};

/// Where a next-table declaration points.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableRef {
    /// The next finer table of the address space being built.
    Child,
    /// A table owned elsewhere.
    At(PAddr),
}

/// One declaration handed to the builder for a given level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MappingEntry {
    /// Map the page of the level containing `pa` at `va`.
    Leaf {
        va: VAddr,
        pa: PAddr,
        perms: PagePermissions,
    },
    /// Route translation of `va` through another table.
    NextTable { va: VAddr, table: TableRef },
}

impl MappingEntry {
    /// Leaf with the default read/write/execute rights.
    pub const fn leaf(va: VAddr, pa: PAddr) -> MappingEntry {
        MappingEntry::Leaf {
            va,
            pa,
            perms: PagePermissions::all(),
        }
    }

    pub const fn identity(addr: u64) -> MappingEntry {
        MappingEntry::leaf(VAddr::new(addr), PAddr::new(addr))
    }

    /// Next-table declaration pointing at the address space's own child.
    pub const fn child(va: VAddr) -> MappingEntry {
        MappingEntry::NextTable {
            va,
            table: TableRef::Child,
        }
    }

    pub fn va(&self) -> VAddr {
        match *self {
            MappingEntry::Leaf { va, .. } | MappingEntry::NextTable { va, .. } => va,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MappingEntry::Leaf { .. })
    }
}

/// Reasons a declaration cannot be written into a table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MappingError {
    /// The slot already holds a valid entry.
    DuplicateMapping { level: Level, index: usize },
    /// The virtual address is not canonical Sv39 or the physical address
    /// is wider than 56 bits.
    AddressOutOfRange { level: Level, addr: u64 },
    /// A next-table declaration at level 0, or one naming a missing or
    /// misaligned table.
    InvalidNextTable { level: Level },
    /// A leaf declaration with no access rights.
    InvalidPermissions { level: Level },
    /// A plan declared more entries than its storage holds.
    PlanCapacityExceeded,
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MappingError::DuplicateMapping { level, index } => {
                write!(f, "{} index {} is already mapped", level, index)
            }
            MappingError::AddressOutOfRange { level, addr } => {
                write!(f, "{} address {:#018x} is out of range", level, addr)
            }
            MappingError::InvalidNextTable { level } => {
                write!(f, "{} next table reference is invalid", level)
            }
            MappingError::InvalidPermissions { level } => {
                write!(f, "{} leaf grants no access", level)
            }
            MappingError::PlanCapacityExceeded => write!(f, "mapping plan is full"),
        }
    }
}
