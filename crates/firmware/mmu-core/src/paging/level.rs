use std::fmt;

use crate::addr::VAddr;

use super::{INDEX_BITS, PAGE_SHIFT};

/// One of the three Sv39 translation levels. Level 2 is the root.
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Level {
    /// 4 KiB pages.
    L0 = 0,
    /// 2 MiB pages.
    L1 = 1,
    /// 1 GiB pages.
    L2 = 2,
}

impl Level {
    /// Levels in walk order, root first.
    pub const WALK: [Level; 3] = [Level::L2, Level::L1, Level::L0];

    pub const fn number(self) -> u32 {
        self as u32
    }

    pub const fn from_number(number: u32) -> Option<Level> {
        match number {
            0 => Some(Level::L0),
            1 => Some(Level::L1),
            2 => Some(Level::L2),
            _ => None,
        }
    }

    /// First virtual address bit indexed by this level.
    pub const fn shift(self) -> u32 {
        PAGE_SHIFT + INDEX_BITS * self.number()
    }

    /// Bytes covered by one entry at this level.
    pub const fn page_size(self) -> u64 {
        1 << self.shift()
    }

    /// Table slot selected by `va`: bits `[12 + 9L, 21 + 9L)`.
    pub fn index(self, va: VAddr) -> usize {
        ((va.as_u64() >> self.shift()) & mask!(INDEX_BITS)) as usize
    }

    /// Page-size class written into leaf entries at this level.
    pub const fn size_class(self) -> u64 {
        self as u64
    }

    /// The next finer level, if any.
    pub const fn child(self) -> Option<Level> {
        match self {
            Level::L2 => Some(Level::L1),
            Level::L1 => Some(Level::L0),
            Level::L0 => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "level {}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_extracts_nine_bits_per_level() {
        let va = VAddr::new(0x4000_0000);
        assert_eq!(Level::L2.index(va), 1);
        assert_eq!(Level::L1.index(va), 0);
        assert_eq!(Level::L0.index(va), 0);

        let va = VAddr::new(0xA8_0000);
        assert_eq!(Level::L2.index(va), 0);
        assert_eq!(Level::L1.index(va), 5);
        assert_eq!(Level::L0.index(va), 0x80);

        let va = VAddr::new(0x7f_ffff_f000);
        for level in Level::WALK.iter() {
            assert_eq!(level.index(va), 511);
        }
    }

    #[test]
    fn geometry() {
        assert_eq!(Level::L0.page_size(), 0x1000);
        assert_eq!(Level::L1.page_size(), 0x20_0000);
        assert_eq!(Level::L2.page_size(), 0x4000_0000);
        assert_eq!(Level::L2.child(), Some(Level::L1));
        assert_eq!(Level::L0.child(), None);
        assert_eq!(Level::from_number(1), Some(Level::L1));
        assert_eq!(Level::from_number(3), None);
    }
}
