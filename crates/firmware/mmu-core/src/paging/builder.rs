use std::borrow::Borrow;

use crate::addr::PAddr;

use super::{
    entry::PageTableEntry,
    level::Level,
    mapping::{MappingEntry, MappingError, TableRef},
    table::PageTable,
    BASE_PAGE_LENGTH, ENTRIES_PER_TABLE,
};

/// Write `entries` into `table`, which translates at `level`.
///
/// `child` is the physical address used for [`TableRef::Child`]. Every
/// declaration is checked before any slot is written, so on error the table
/// is left as it was. A slot that is already valid, whether from an earlier
/// call or from an earlier declaration in `entries`, is a
/// [`MappingError::DuplicateMapping`].
pub fn build_level<I>(
    entries: I,
    level: Level,
    table: &mut PageTable,
    child: Option<PAddr>,
) -> Result<(), MappingError>
where
    I: IntoIterator,
    I::Item: Borrow<MappingEntry>,
    I::IntoIter: Clone,
{
    let entries = entries.into_iter();

    let mut claimed = [0u64; ENTRIES_PER_TABLE / 64];
    for (index, _) in table.valid_entries() {
        claimed[index / 64] |= bit!(index % 64);
    }

    for entry in entries.clone() {
        let entry: &MappingEntry = entry.borrow();
        let (index, _) = encode(entry, level, child)?;
        let slot = bit!(index % 64);
        if claimed[index / 64] & slot != 0 {
            return Err(MappingError::DuplicateMapping { level, index });
        }
        claimed[index / 64] |= slot;
    }

    for (ordinal, entry) in entries.enumerate() {
        let entry: &MappingEntry = entry.borrow();
        let (index, pte) = encode(entry, level, child)?;
        table[index] = pte;
        trace_entry(level, ordinal, entry, index, pte);
    }

    Ok(())
}

/// Slot and encoded value for one declaration.
fn encode(
    entry: &MappingEntry,
    level: Level,
    child: Option<PAddr>,
) -> Result<(usize, PageTableEntry), MappingError> {
    let va = entry.va();
    if !va.is_canonical() {
        return Err(MappingError::AddressOutOfRange {
            level,
            addr: va.as_u64(),
        });
    }
    let index = level.index(va);

    let pte = match *entry {
        MappingEntry::Leaf { pa, perms, .. } => {
            if !pa.is_valid() {
                return Err(MappingError::AddressOutOfRange {
                    level,
                    addr: pa.as_u64(),
                });
            }
            if perms.is_empty() {
                return Err(MappingError::InvalidPermissions { level });
            }
            PageTableEntry::leaf(pa, perms, level)
        }
        MappingEntry::NextTable { table, .. } => {
            let invalid = MappingError::InvalidNextTable { level };
            if level.child().is_none() {
                return Err(invalid);
            }
            let addr = match table {
                TableRef::Child => child.ok_or(invalid)?,
                TableRef::At(addr) => addr,
            };
            if !addr.is_valid() || !addr.is_aligned(BASE_PAGE_LENGTH) {
                return Err(invalid);
            }
            PageTableEntry::next_table(addr)
        }
    };

    Ok((index, pte))
}

fn trace_entry(level: Level, ordinal: usize, entry: &MappingEntry, index: usize, pte: PageTableEntry) {
    let (kind, target) = match *entry {
        MappingEntry::Leaf { pa, .. } => ("leaf", pa),
        MappingEntry::NextTable { .. } => ("next", pte.address()),
    };
    debug!(
        target: "mmu",
        "{} {} #{}: va {:016x} pa {:016x} vpn {:016x} ppn {:016x} pte {:016x}",
        level,
        kind,
        ordinal,
        entry.va(),
        target,
        index,
        pte.ppn_field(),
        pte
    );
}
