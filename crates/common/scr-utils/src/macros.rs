/// Single set bit at position `$x`, as a `u64`.
#[macro_export]
macro_rules! bit {
    ( $x:expr ) => {
        (1u64 << $x)
    };
}

/// Contiguous mask of `$width` bits starting at bit 0, as a `u64`.
/// `$width` must be in `1..=64`.
#[macro_export]
macro_rules! mask {
    ( $width:expr ) => {
        (u64::MAX >> (64 - $width))
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_bit_and_mask() {
        assert_eq!(0b1000, bit!(3));
        assert_eq!(1 << 63, bit!(63));
        assert_eq!(0x1ff, mask!(9));
        assert_eq!(0x3_ffff_ffff, mask!(34));
        assert_eq!(u64::MAX, mask!(64));
    }
}
