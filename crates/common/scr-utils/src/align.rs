use std::ops::{BitAnd, Div, Not};

use num::Num;

/// Greatest multiple of `align` not above `value`. `align` must be a power of 2.
#[inline]
pub fn align_down<T: Num + Copy + BitAnd<Output = T> + Not<Output = T>>(value: T, align: T) -> T {
    value & !(align - T::one())
}

/// Whether `value` is a multiple of `align`. `align` must be a power of 2.
#[inline]
pub fn is_aligned<T: Num + Copy + BitAnd<Output = T>>(value: T, align: T) -> bool {
    value & (align - T::one()) == T::zero()
}

/// Number of `chunk`-sized pieces needed to cover `value`.
#[inline]
pub fn div_ceil<T: Num + Copy + Div<Output = T>>(value: T, chunk: T) -> T {
    if value == T::zero() {
        T::zero()
    } else {
        (value - T::one()) / chunk + T::one()
    }
}

/// Ceil of log2 for a non-zero value. `log2_ceil(1) == 0`.
#[inline]
pub const fn log2_ceil(value: u64) -> u32 {
    if value <= 1 {
        0
    } else {
        64 - (value - 1).leading_zeros()
    }
}
