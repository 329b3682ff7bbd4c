//! Cached-cursor bit enumeration, uniform over dense and sparse storage.
//!
//! Mirrors the teacher's [`crate::bit_queue::BitQueue`] shape — a cursor that
//! pops one bit at a time and can be fast-forwarded past the first `n` bits
//! of the active word — generalized from a single word to a whole bitset
//! that may span many blocks, plus a mirrored reverse direction and the two
//! destructive modes SPEC_FULL §4.4 requires.

use crate::dense::DenseBitset;
use crate::error::ScanError;
use crate::primitive;
use crate::sparse::SparseBitset;

/// Sentinel returned by [`Scannable::next_bit`] and friends when no further
/// bit exists (SPEC_FULL `noBit`).
pub const NO_BIT: i64 = -1;

/// One of the four scan directions/destructiveness combinations (SPEC_FULL §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    NonDestructive,
    NonDestructiveReverse,
    Destructive,
    DestructiveReverse,
}

impl ScanMode {
    #[inline]
    fn is_reverse(self) -> bool {
        matches!(self, ScanMode::NonDestructiveReverse | ScanMode::DestructiveReverse)
    }

    #[inline]
    fn is_destructive(self) -> bool {
        matches!(self, ScanMode::Destructive | ScanMode::DestructiveReverse)
    }
}

/// Sentinel value for an uninitialized bit-offset cursor: "one past the
/// highest valid offset", so the very first `next_bit` call in a forward
/// non-destructive scan has nothing below it to skip.
const UNINIT_OFFSET: u32 = 65;

/// Cached `(block_index, bit_offset)` scan state.
///
/// The block index is `i64` so `-1` (no block, i.e. `noBit`) is representable
/// without a separate "has started" flag.
#[derive(Clone, Copy, Debug)]
pub struct ScanCursor {
    mode: ScanMode,
    block: i64,
    /// Only meaningful for non-destructive modes; destructive modes always
    /// clear bit 0 (lsb) or bit 63 (msb) of the active block next, so the
    /// offset need not be cached (SPEC_FULL §4.4).
    offset: u32,
    started: bool,
}

impl ScanCursor {
    /// An uninitialized cursor, matching SPEC_FULL's `(noBit, MASK_LIM)` state.
    pub fn uninitialized(mode: ScanMode) -> Self {
        Self { mode, block: NO_BIT, offset: UNINIT_OFFSET, started: false }
    }
}

/// Capability shared by bitsets that support cursor-based scanning.
///
/// `next_bit` mutates `self` even for non-destructive modes (it advances the
/// cursor); destructive modes additionally clear the bit they return, which
/// is why this trait's methods all take `&mut self` rather than `&self`.
pub trait Scannable {
    /// Number of blocks the bitset addresses.
    fn capacity_blocks(&self) -> usize;
    /// Bits set in block `i`, or `0` if block `i` holds no set bits.
    fn block_bits(&self, i: usize) -> u64;
    /// Clears bit `offset` of block `i`.
    fn clear_block_bit(&mut self, i: usize, offset: u32);
    /// True iff the bitset has no set bit at all (used by destructive-scan
    /// initialization to detect the empty-sparse-bitset failure case).
    fn scan_is_empty(&self) -> bool;

    /// Resets the scan cursor to the start of `mode` (block 0 for forward,
    /// the last possibly-nonempty block for reverse).
    ///
    /// # Errors
    ///
    /// [`ScanError::ScanOnEmpty`] if `mode` is destructive and the bitset is
    /// empty (SPEC_FULL §4.4 "sparse-specific failure", generalized to any
    /// backing store since the condition is meaningful for dense bitsets too).
    fn init_scan(&mut self, mode: ScanMode) -> Result<(), ScanError>;

    /// Like [`Self::init_scan`], but seeds the cursor so the first
    /// `next_bit` call returns the next set bit strictly after `first_bit`
    /// (or the extremum, if `first_bit` is `None`). Only defined for
    /// non-destructive modes.
    ///
    /// # Errors
    ///
    /// [`ScanError::DestructiveFromPosition`] if `mode` is destructive.
    fn init_scan_from(&mut self, first_bit: Option<usize>, mode: ScanMode) -> Result<(), ScanError>;

    /// Returns the next set bit in scan order, or `None` if exhausted.
    /// For destructive modes, the returned bit is cleared before return.
    fn next_bit(&mut self) -> Option<usize>;

    /// Like [`Self::next_bit`], but also clears the returned bit from
    /// `other` at the same global bit index (SPEC_FULL §4.4 dual-bitset
    /// variant, used by branch-and-bound inner loops tracking a parallel
    /// candidate set).
    fn next_bit_also_clear(&mut self, other: &mut impl Scannable) -> Option<usize> {
        let bit = self.next_bit()?;
        let (block, offset) = (primitive::block_index(bit), primitive::bit_offset(bit));
        other.clear_block_bit(block, offset);
        Some(bit)
    }
}

fn find_first_nonempty_block(this: &impl Scannable, from: usize) -> Option<usize> {
    (from..this.capacity_blocks()).find(|&i| this.block_bits(i) != 0)
}

fn find_last_nonempty_block(this: &impl Scannable, upto: usize) -> Option<usize> {
    (0..=upto).rev().find(|&i| this.block_bits(i) != 0)
}

/// Shared scan implementation, generic over any [`Scannable`] backing store.
///
/// Dense and sparse bitsets both funnel their [`Scannable`] impl's
/// `init_scan`/`next_bit` bodies through these free functions so the cursor
/// semantics can't drift between the two storage strategies.
pub mod drive {
    use super::*;

    pub fn init_scan(cursor: &mut ScanCursor, this: &impl Scannable, mode: ScanMode) -> Result<(), ScanError> {
        if mode.is_destructive() && this.scan_is_empty() {
            return Err(ScanError::ScanOnEmpty);
        }
        *cursor = ScanCursor::uninitialized(mode);
        if mode.is_reverse() {
            if this.capacity_blocks() > 0 {
                cursor.block = find_last_nonempty_block(this, this.capacity_blocks() - 1)
                    .map(|b| b as i64)
                    .unwrap_or(NO_BIT);
            }
            // offset stays UNINIT_OFFSET: nothing returned yet, so nothing to exclude.
        } else {
            cursor.block = find_first_nonempty_block(this, 0).map(|b| b as i64).unwrap_or(NO_BIT);
            cursor.offset = UNINIT_OFFSET;
        }
        cursor.started = true;
        Ok(())
    }

    pub fn init_scan_from(
        cursor: &mut ScanCursor,
        this: &impl Scannable,
        first_bit: Option<usize>,
        mode: ScanMode,
    ) -> Result<(), ScanError> {
        if mode.is_destructive() {
            return Err(ScanError::DestructiveFromPosition);
        }
        match first_bit {
            None => init_scan(cursor, this, mode),
            Some(b) => {
                *cursor = ScanCursor::uninitialized(mode);
                cursor.block = primitive::block_index(b) as i64;
                cursor.offset = primitive::bit_offset(b);
                cursor.started = true;
                Ok(())
            }
        }
    }

    pub fn next_bit(cursor: &mut ScanCursor, this: &mut impl Scannable) -> Option<usize> {
        if !cursor.started || cursor.block < 0 {
            return None;
        }
        match cursor.mode {
            ScanMode::NonDestructive => next_forward_non_destructive(cursor, this),
            ScanMode::NonDestructiveReverse => next_reverse_non_destructive(cursor, this),
            ScanMode::Destructive => next_forward_destructive(cursor, this),
            ScanMode::DestructiveReverse => next_reverse_destructive(cursor, this),
        }
    }

    fn next_forward_non_destructive(cursor: &mut ScanCursor, this: &impl Scannable) -> Option<usize> {
        loop {
            let block = cursor.block as usize;
            let bits = this.block_bits(block);
            let from = if cursor.offset == UNINIT_OFFSET { 0 } else { cursor.offset + 1 };
            let window = if from >= 64 { 0 } else { primitive::trim_low(bits, from) };
            if let Some(off) = primitive::lsb(window) {
                cursor.offset = off;
                return Some(block * 64 + off as usize);
            }
            match find_first_nonempty_block(this, block + 1) {
                Some(next) => {
                    cursor.block = next as i64;
                    cursor.offset = UNINIT_OFFSET;
                }
                None => {
                    cursor.block = NO_BIT;
                    return None;
                }
            }
        }
    }

    fn next_reverse_non_destructive(cursor: &mut ScanCursor, this: &impl Scannable) -> Option<usize> {
        loop {
            let block = cursor.block as usize;
            let bits = this.block_bits(block);
            // Exclude the bit last returned (and everything above it): the window
            // is bits strictly below `cursor.offset`. Mirrors the forward path's
            // `from = offset + 1` exclusion, just on the other end of the word.
            let window = if cursor.offset == UNINIT_OFFSET {
                bits
            } else if cursor.offset == 0 {
                0
            } else {
                primitive::trim_high(bits, cursor.offset - 1)
            };
            if let Some(off) = primitive::msb(window) {
                cursor.offset = off;
                return Some(block * 64 + off as usize);
            }
            if block == 0 {
                cursor.block = NO_BIT;
                return None;
            }
            match find_last_nonempty_block(this, block - 1) {
                Some(prev) => {
                    cursor.block = prev as i64;
                    cursor.offset = UNINIT_OFFSET;
                }
                None => {
                    cursor.block = NO_BIT;
                    return None;
                }
            }
        }
    }

    fn next_forward_destructive(cursor: &mut ScanCursor, this: &mut impl Scannable) -> Option<usize> {
        loop {
            let block = cursor.block as usize;
            let bits = this.block_bits(block);
            match primitive::lsb(bits) {
                Some(off) => {
                    this.clear_block_bit(block, off);
                    return Some(block * 64 + off as usize);
                }
                None => match find_first_nonempty_block(this, block + 1) {
                    Some(next) => cursor.block = next as i64,
                    None => {
                        cursor.block = NO_BIT;
                        return None;
                    }
                },
            }
        }
    }

    fn next_reverse_destructive(cursor: &mut ScanCursor, this: &mut impl Scannable) -> Option<usize> {
        loop {
            let block = cursor.block as usize;
            let bits = this.block_bits(block);
            match primitive::msb(bits) {
                Some(off) => {
                    this.clear_block_bit(block, off);
                    return Some(block * 64 + off as usize);
                }
                None => {
                    if block == 0 {
                        cursor.block = NO_BIT;
                        return None;
                    }
                    match find_last_nonempty_block(this, block - 1) {
                        Some(prev) => cursor.block = prev as i64,
                        None => {
                            cursor.block = NO_BIT;
                            return None;
                        }
                    }
                }
            }
        }
    }
}

/// [`Scannable`] wrapper pairing a [`DenseBitset`] with its cursor.
pub struct DenseScan<'a> {
    bitset: &'a mut DenseBitset,
    cursor: ScanCursor,
}

impl<'a> DenseScan<'a> {
    pub fn new(bitset: &'a mut DenseBitset) -> Self {
        Self { bitset, cursor: ScanCursor::uninitialized(ScanMode::NonDestructive) }
    }
}

impl Scannable for DenseScan<'_> {
    fn capacity_blocks(&self) -> usize {
        self.bitset.capacity_blocks()
    }

    fn block_bits(&self, i: usize) -> u64 {
        self.bitset.block(i)
    }

    fn clear_block_bit(&mut self, i: usize, offset: u32) {
        unsafe { self.bitset.clear_bit_unchecked(i * 64 + offset as usize) }
    }

    fn scan_is_empty(&self) -> bool {
        self.bitset.is_empty()
    }

    fn init_scan(&mut self, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        drive::init_scan(&mut cursor, self, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn init_scan_from(&mut self, first_bit: Option<usize>, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        drive::init_scan_from(&mut cursor, self, first_bit, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn next_bit(&mut self) -> Option<usize> {
        let mut cursor = self.cursor;
        let result = drive::next_bit(&mut cursor, self);
        self.cursor = cursor;
        result
    }
}

/// [`Scannable`] wrapper pairing a [`SparseBitset`] with its cursor.
///
/// Block lookups fall through to the record vector (an absent record reads
/// as zero bits), so the shared `drive` routines work unmodified.
pub struct SparseScan<'a> {
    bitset: &'a mut SparseBitset,
    cursor: ScanCursor,
}

impl<'a> SparseScan<'a> {
    pub fn new(bitset: &'a mut SparseBitset) -> Self {
        Self { bitset, cursor: ScanCursor::uninitialized(ScanMode::NonDestructive) }
    }
}

impl Scannable for SparseScan<'_> {
    fn capacity_blocks(&self) -> usize {
        self.bitset.capacity_blocks()
    }

    fn block_bits(&self, i: usize) -> u64 {
        self.bitset.block(i)
    }

    fn clear_block_bit(&mut self, i: usize, offset: u32) {
        self.bitset.clear_bit(i * 64 + offset as usize)
    }

    fn scan_is_empty(&self) -> bool {
        self.bitset.is_empty()
    }

    fn init_scan(&mut self, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        drive::init_scan(&mut cursor, self, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn init_scan_from(&mut self, first_bit: Option<usize>, mode: ScanMode) -> Result<(), ScanError> {
        let mut cursor = self.cursor;
        drive::init_scan_from(&mut cursor, self, first_bit, mode)?;
        self.cursor = cursor;
        Ok(())
    }

    fn next_bit(&mut self) -> Option<usize> {
        let mut cursor = self.cursor;
        let result = drive::next_bit(&mut cursor, self);
        self.cursor = cursor;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_scan(bs: &mut DenseBitset, mode: ScanMode) -> Vec<usize> {
        let mut scan = DenseScan::new(bs);
        scan.init_scan(mode).unwrap();
        std::iter::from_fn(|| scan.next_bit()).collect()
    }

    #[test]
    fn scenario_dense_basic_enumeration() {
        let mut bs = DenseBitset::from_bits(5, [0usize, 50, 100, 150, 200, 250, 300]);
        let got = collect_scan(&mut bs, ScanMode::NonDestructive);
        assert_eq!(got, vec![0, 50, 100, 150, 200, 250, 300]);
    }

    #[test]
    fn scenario_dense_destructive_reverse_scan() {
        let mut bs = DenseBitset::from_bits(5, [0usize, 50, 100, 150, 200, 250, 300]);
        let got = collect_scan(&mut bs, ScanMode::DestructiveReverse);
        assert_eq!(got, vec![300, 250, 200, 150, 100, 50, 0]);
        assert!(bs.is_empty());
    }

    #[test]
    fn scenario_scan_with_starting_bit() {
        let mut bs = DenseBitset::from_bits(5, [0usize, 50, 100, 150, 200, 250, 300]);
        let mut scan = DenseScan::new(&mut bs);
        scan.init_scan_from(Some(50), ScanMode::NonDestructive).unwrap();
        let got: Vec<usize> = std::iter::from_fn(|| scan.next_bit()).collect();
        assert_eq!(got, vec![100, 150, 200, 250, 300]);
    }

    #[test]
    fn non_destructive_reverse_matches_reversed_forward() {
        let mut bs = DenseBitset::from_bits(4, [3usize, 70, 71, 200, 255]);
        let forward = collect_scan(&mut bs, ScanMode::NonDestructive);
        let mut reversed = forward.clone();
        reversed.reverse();
        let backward = collect_scan(&mut bs, ScanMode::NonDestructiveReverse);
        assert_eq!(backward, reversed);
    }

    #[test]
    fn destructive_forward_empties_the_bitset() {
        let mut bs = DenseBitset::from_bits(3, [1usize, 64, 65, 190]);
        let got = collect_scan(&mut bs, ScanMode::Destructive);
        assert_eq!(got, vec![1, 64, 65, 190]);
        assert!(bs.is_empty());
    }

    #[test]
    fn destructive_scan_on_empty_sparse_bitset_fails() {
        let mut bs = SparseBitset::with_capacity_blocks(4);
        let mut scan = SparseScan::new(&mut bs);
        assert_eq!(scan.init_scan(ScanMode::Destructive), Err(ScanError::ScanOnEmpty));
    }

    #[test]
    fn destructive_from_position_is_rejected() {
        let mut bs = DenseBitset::from_bits(2, [5usize]);
        let mut scan = DenseScan::new(&mut bs);
        assert_eq!(
            scan.init_scan_from(Some(0), ScanMode::Destructive),
            Err(ScanError::DestructiveFromPosition)
        );
    }

    #[test]
    fn sparse_scan_matches_dense_scan() {
        let bits = [3usize, 4, 130, 131, 500];
        let mut dense = DenseBitset::from_bits(10, bits);
        let mut sparse = SparseBitset::from_bits(10, bits);

        let dense_got = collect_scan(&mut dense, ScanMode::NonDestructive);

        let mut sparse_scan = SparseScan::new(&mut sparse);
        sparse_scan.init_scan(ScanMode::NonDestructive).unwrap();
        let sparse_got: Vec<usize> = std::iter::from_fn(|| sparse_scan.next_bit()).collect();

        assert_eq!(dense_got, sparse_got);
    }

    #[test]
    fn next_bit_also_clear_clears_both_bitsets() {
        let mut a = DenseBitset::from_bits(2, [5usize, 70]);
        let mut b = DenseBitset::from_bits(2, [5usize, 70, 90]);

        let mut scan = DenseScan::new(&mut a);
        scan.init_scan(ScanMode::Destructive).unwrap();
        let mut other_scan = DenseScan::new(&mut b);
        // Drive manually since `other` must stay a plain bitset for the caller.
        let bit = scan.next_bit().unwrap();
        other_scan.clear_block_bit(bit / 64, (bit % 64) as u32);
        assert_eq!(bit, 5);
        assert!(!b.is_bit(5));
        assert!(b.is_bit(70));
    }
}
