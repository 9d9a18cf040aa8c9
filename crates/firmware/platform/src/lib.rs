#![cfg_attr(not(test), no_std)]

//! Board support for SCR7-based NextSilicon platforms and the supervisor-mode
//! MMU bring-up that runs on them.

extern crate core as std;

#[macro_use]
extern crate bitflags;

#[macro_use]
extern crate log;

#[macro_use]
extern crate scr_utils;

#[macro_use]
extern crate static_assertions;

/// Firmware level configuration.
pub mod globals;

/// Control registers and privilege transitions.
#[macro_use]
pub mod hart;

/// Instruction-level primitives for the running architecture.
pub mod arch;

/// Logging over the platform console.
pub mod console;

/// Device drivers.
pub mod drivers;

/// Board descriptors.
pub mod platform;

/// Identity-mapped supervisor-mode bring-up.
pub mod mmu_demo;

pub use platform::current;
