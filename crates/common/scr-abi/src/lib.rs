#![cfg_attr(not(test), no_std)]

//! The fixed contract between a board descriptor and the boot runtime that
//! hosts it: error codes, the platform descriptor, the operations table and
//! the services the runtime offers back to the board.

pub mod error;
pub mod memregion;
pub mod platform;

#[macro_use]
extern crate static_assertions;

/// Prelude to re-export commonly used items.
pub mod prelude {
    pub use crate::error::{SbiError, SbiResult};
    pub use crate::memregion::{MemRegion, MemRegionFlags};
    pub use crate::platform::{
        ConsoleDevice, PlatformDescriptor, PlatformFeatures, PlatformHost, PlatformOperations,
        PlatformVersion, TimerDevice,
    };
}
