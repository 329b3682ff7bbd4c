//! Dense bitset augmented with a sentinel window bounding its non-zero blocks.

use std::fmt;

use crate::dense::DenseBitset;
use crate::primitive;
use crate::scan::{ScanCursor, ScanMode, Scannable};
use crate::error::ScanError;

/// `noBit` sentinel for an empty window, matching [`crate::scan::NO_BIT`].
pub const NO_BIT: i64 = -1;

/// A [`DenseBitset`] plus a `(low, high)` block-index window outside which
/// every block is guaranteed zero (SPEC_FULL §4.5).
///
/// Grounded on the teacher's own block-pruning idiom in its `BitSet::remove`
/// (`lib.rs`): when a clear empties a block, the owning structure drops its
/// reference to that block and cascades the check upward. Here the "upward"
/// direction is simply shrinking `low`/`high` by probing the next block in.
pub struct SentinelBitset {
    dense: DenseBitset,
    low: i64,
    high: i64,
}

impl SentinelBitset {
    #[inline]
    pub fn with_capacity_blocks(blocks: usize) -> Self {
        Self { dense: DenseBitset::with_capacity_blocks(blocks), low: NO_BIT, high: NO_BIT }
    }

    #[inline]
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self::with_capacity_blocks(bits.div_ceil(64))
    }

    pub fn from_bits(capacity_blocks: usize, set_bits: impl IntoIterator<Item = usize>) -> Self {
        let mut this = Self::with_capacity_blocks(capacity_blocks);
        for b in set_bits {
            this.set_bit(b);
        }
        this
    }

    #[inline]
    pub fn capacity_blocks(&self) -> usize {
        self.dense.capacity_blocks()
    }

    #[inline]
    pub fn capacity_bits(&self) -> usize {
        self.dense.capacity_bits()
    }

    /// The current window, or `None` if the bitset is known-empty.
    #[inline]
    pub fn sentinels(&self) -> Option<(usize, usize)> {
        if self.low == NO_BIT {
            None
        } else {
            Some((self.low as usize, self.high as usize))
        }
    }

    /// Resets the window to empty. Does not touch block contents (a caller
    /// that has just cleared every block directly should call this).
    #[inline]
    pub fn clear_sentinels(&mut self) {
        self.low = NO_BIT;
        self.high = NO_BIT;
    }

    /// Underlying dense bitset, for callers that need raw block access.
    #[inline]
    pub fn dense(&self) -> &DenseBitset {
        &self.dense
    }

    /// Expands the window (if necessary) to include `block(v)`.
    pub fn update_sentinels_to_v(&mut self, v: usize) {
        let block = primitive::block_index(v) as i64;
        if self.low == NO_BIT {
            self.low = block;
            self.high = block;
        } else {
            if block < self.low {
                self.low = block;
            }
            if block > self.high {
                self.high = block;
            }
        }
    }

    /// Recomputes the window from scratch by scanning every block
    /// (`update_sentinels`, SPEC_FULL §8 scenario 5).
    pub fn update_sentinels(&mut self) {
        match self.dense.lsb() {
            None => self.clear_sentinels(),
            Some(lo_bit) => {
                let hi_bit = self.dense.msb().unwrap();
                self.low = primitive::block_index(lo_bit) as i64;
                self.high = primitive::block_index(hi_bit) as i64;
            }
        }
    }

    /// Sets bit `b`, expanding the window to include it.
    pub fn set_bit(&mut self, b: usize) {
        self.dense.set_bit(b);
        self.update_sentinels_to_v(b);
    }

    /// Tests bit `b`. Bits outside the window are known zero without a
    /// block read, but we still delegate for a single code path.
    #[inline]
    pub fn is_bit(&self, b: usize) -> bool {
        self.dense.is_bit(b)
    }

    /// Clears bit `b`; if it was the sole occupant of the block at the
    /// low/high boundary, shrinks the window past that block
    /// (`erase_bit_and_update`, SPEC_FULL §4.5 / §8 scenario 5).
    pub fn erase_bit_and_update(&mut self, b: usize) {
        self.dense.clear_bit(b);
        let block = primitive::block_index(b) as i64;

        if self.low == NO_BIT {
            return;
        }

        if block == self.low && self.dense.block(block as usize) == 0 {
            self.advance_low();
        }
        if self.low != NO_BIT && block == self.high && self.dense.block(block as usize) == 0 {
            self.retreat_high();
        }
    }

    fn advance_low(&mut self) {
        let start = self.low as usize + 1;
        if start as i64 > self.high {
            self.clear_sentinels();
            return;
        }
        match (start..=(self.high as usize)).find(|&i| self.dense.block(i) != 0) {
            Some(i) => self.low = i as i64,
            None => self.clear_sentinels(),
        }
    }

    fn retreat_high(&mut self) {
        if self.high - 1 < self.low {
            self.clear_sentinels();
            return;
        }
        match (self.low as usize..(self.high as usize)).rev().find(|&i| self.dense.block(i) != 0) {
            Some(i) => self.high = i as i64,
            None => self.clear_sentinels(),
        }
    }

    /// True iff the window is empty (and therefore the bitset has no set bit).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low == NO_BIT
    }

    /// Population count, restricted to the window.
    pub fn count_ones(&self) -> usize {
        match self.sentinels() {
            None => 0,
            Some((lo, hi)) => (lo..=hi).map(|i| primitive::popcount(self.dense.block(i)) as usize).sum(),
        }
    }

    pub fn lsb(&self) -> Option<usize> {
        let (lo, hi) = self.sentinels()?;
        (lo..=hi).find_map(|i| primitive::lsb(self.dense.block(i)).map(|off| i * 64 + off as usize))
    }

    pub fn msb(&self) -> Option<usize> {
        let (lo, hi) = self.sentinels()?;
        (lo..=hi).rev().find_map(|i| primitive::msb(self.dense.block(i)).map(|off| i * 64 + off as usize))
    }

    /// `self &= rhs`, restricted to `self`'s window. Shrinks the window
    /// afterwards via [`Self::update_sentinels`].
    pub fn and_assign(&mut self, rhs: &SentinelBitset) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        if let Some((lo, hi)) = self.sentinels() {
            for i in lo..=hi {
                self.dense.blocks_mut()[i] &= rhs.dense.block(i);
            }
        }
        self.update_sentinels();
    }

    /// `out = a & b`, restricted to `a`'s window.
    pub fn and_into(a: &SentinelBitset, b: &SentinelBitset, out: &mut SentinelBitset) {
        debug_assert_eq!(a.capacity_blocks(), b.capacity_blocks());
        debug_assert_eq!(a.capacity_blocks(), out.capacity_blocks());
        out.dense.clear();
        if let Some((lo, hi)) = a.sentinels() {
            for i in lo..=hi {
                out.dense.blocks_mut()[i] = a.dense.block(i) & b.dense.block(i);
            }
        }
        out.update_sentinels();
    }

    /// `self &= !rhs`, restricted to `self`'s window.
    pub fn erase_bit_rhs(&mut self, rhs: &SentinelBitset) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        if let Some((lo, hi)) = self.sentinels() {
            for i in lo..=hi {
                self.dense.blocks_mut()[i] &= !rhs.dense.block(i);
            }
        }
        self.update_sentinels();
    }

    /// Ascending iterator over set bits, restricted to the window.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        let (lo, hi) = self.sentinels().unwrap_or((1, 0)); // empty range if no window
        (lo..=hi).flat_map(move |i| {
            let base = i * 64;
            let mut bits = self.dense.block(i);
            std::iter::from_fn(move || {
                let off = primitive::lsb(bits)?;
                bits &= bits - 1;
                Some(base + off as usize)
            })
        })
    }

    #[inline]
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter_ones().collect()
    }
}

impl fmt::Debug for SentinelBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelBitset")
            .field("window", &self.sentinels())
            .field("set", &self.to_vec())
            .finish()
    }
}

/// Scan specialization: a destructive scan over a sentinel bitset shrinks the
/// window on the fly as leading/trailing blocks empty, instead of doing a
/// final [`SentinelBitset::update_sentinels`] rescan (SPEC_FULL §4.5).
pub struct SentinelScan<'a> {
    bitset: &'a mut SentinelBitset,
    cursor: ScanCursor,
}

impl<'a> SentinelScan<'a> {
    pub fn new(bitset: &'a mut SentinelBitset) -> Self {
        Self { bitset, cursor: ScanCursor::uninitialized(ScanMode::NonDestructive) }
    }

    /// Current window of the wrapped bitset, readable without ending the scan.
    pub fn sentinels(&self) -> Option<(usize, usize)> {
        self.bitset.sentinels()
    }
}

impl Scannable for SentinelScan<'_> {
    fn capacity_blocks(&self) -> usize {
        self.bitset.capacity_blocks()
    }

    fn block_bits(&self, i: usize) -> u64 {
        self.bitset.dense.block(i)
    }

    fn clear_block_bit(&mut self, i: usize, offset: u32) {
        let bit = i * 64 + offset as usize;
        self.bitset.erase_bit_and_update(bit);
    }

    fn scan_is_empty(&self) -> bool {
        self.bitset.is_empty()
    }

    fn init_scan(&mut self, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        crate::scan::drive::init_scan(&mut cursor, self, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn init_scan_from(&mut self, first_bit: Option<usize>, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        crate::scan::drive::init_scan_from(&mut cursor, self, first_bit, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn next_bit(&mut self) -> Option<usize> {
        let mut cursor = self.cursor;
        let result = crate::scan::drive::next_bit(&mut cursor, self);
        self.cursor = cursor;
        result
    }
}
