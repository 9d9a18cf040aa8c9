/// Page table entry encoding.
pub mod entry;

/// Translation levels.
pub mod level;

/// Declarations consumed by the builder.
pub mod mapping;

/// Storage for the translation tables.
pub mod table;

/// Translation context and its activation.
pub mod address_space;

/// Identity mapping of the firmware image.
pub mod plan;

mod builder;

pub use builder::build_level;

/// Basic page length (4 KiB).
pub const BASE_PAGE_LENGTH: u64 = 4096;

/// log2 of [`BASE_PAGE_LENGTH`].
pub const PAGE_SHIFT: u32 = 12;

/// Entries per table at every level.
pub const ENTRIES_PER_TABLE: usize = 512;

/// Index bits consumed per level.
pub const INDEX_BITS: u32 = 9;

/// Width of an Sv39 virtual address.
pub const VA_BITS: u32 = 39;

/// Width of a physical address.
pub const PA_BITS: u32 = 56;
