use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
};

use scr_utils::align;

macro_rules! addr_common {
    ( $t:ident ) => {
        impl Add<u64> for $t {
            type Output = Self;

            fn add(self, rhs: u64) -> Self {
                $t(self.0 + rhs)
            }
        }

        impl AddAssign<u64> for $t {
            fn add_assign(&mut self, rhs: u64) {
                self.0 += rhs;
            }
        }

        impl Sub<$t> for $t {
            type Output = u64;

            fn sub(self, rhs: $t) -> u64 {
                self.0 - rhs.0
            }
        }

        impl fmt::Binary for $t {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Binary::fmt(&self.0, f)
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{:#018x}", self.0)
            }
        }

        impl fmt::LowerHex for $t {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::LowerHex::fmt(&self.0, f)
            }
        }

        impl fmt::UpperHex for $t {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::UpperHex::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(v: u64) -> Self {
                $t(v)
            }
        }

        impl From<usize> for $t {
            fn from(v: usize) -> Self {
                $t(v as u64)
            }
        }

        impl From<$t> for u64 {
            fn from(v: $t) -> u64 {
                v.0
            }
        }

        impl $t {
            pub const fn new(v: u64) -> $t {
                $t(v)
            }

            pub const fn as_u64(self) -> u64 {
                self.0
            }

            /// Round down to a multiple of `align`, which must be a power of two.
            pub fn align_down(self, align: u64) -> $t {
                $t(align::align_down(self.0, align))
            }

            pub fn is_aligned(self, align: u64) -> bool {
                align::is_aligned(self.0, align)
            }
        }
    };
}

/// Represent a physical memory address.
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct PAddr(u64);

addr_common!(PAddr);

/// Represent a virtual memory address.
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct VAddr(u64);

addr_common!(VAddr);

impl PAddr {
    /// Physical address of a value. Firmware runs with an identity view of
    /// memory before translation is enabled, so this is the pointer value.
    pub fn of<T>(value: &T) -> PAddr {
        PAddr(value as *const T as usize as u64)
    }

    /// Whether the address fits in the physical address width.
    pub const fn is_valid(self) -> bool {
        self.0 >> crate::paging::PA_BITS == 0
    }
}

impl VAddr {
    /// Bits 63..39 must all equal bit 38.
    pub const fn is_canonical(self) -> bool {
        let upper = (self.0 as i64) >> (crate::paging::VA_BITS - 1);
        upper == 0 || upper == -1
    }
}
