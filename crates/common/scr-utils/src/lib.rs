#![cfg_attr(not(test), no_std)]

extern crate core as std;

/// Alignment helpers for addresses and sizes.
pub mod align;

#[macro_use]
mod macros;
