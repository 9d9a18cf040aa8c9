#![cfg_attr(not(test), no_std)]

extern crate core as std;

#[macro_use]
extern crate bitflags;

#[macro_use]
extern crate log;

#[macro_use]
extern crate scr_utils;

#[macro_use]
extern crate static_assertions;

/// Support for addresses.
pub mod addr;

/// SV39 page tables and the builder that fills them.
pub mod paging;

/// Prelude to re-export commonly used items.
pub mod prelude {
    pub use crate::addr::{PAddr, VAddr};
    pub use crate::paging::{
        address_space::{AddressSpace, Hart, Mapped, Satp, Unmapped},
        build_level,
        entry::{PagePermissions, PageTableEntry},
        level::Level,
        mapping::{MappingEntry, MappingError, TableRef},
        plan::IdentityPlan,
        table::{PageTable, PageTables},
    };
}
