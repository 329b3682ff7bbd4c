//! Fixed-capacity dense bitset.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::primitive;

/// A fixed-capacity sequence of 64-bit blocks.
///
/// The block-capacity `N` is fixed at construction and never changes for the
/// lifetime of the value (SPEC_FULL §3: "the sequence length equals `N` for
/// the bitset's entire lifetime; only block contents mutate").
#[derive(Clone, Eq)]
pub struct DenseBitset {
    blocks: Vec<u64>,
}

impl DenseBitset {
    /// A bitset with `blocks` all-zero blocks (capacity `64 * blocks` bits).
    #[inline]
    pub fn with_capacity_blocks(blocks: usize) -> Self {
        Self { blocks: vec![0u64; blocks] }
    }

    /// A bitset able to hold bit indices `0..bits` (block-capacity rounded up).
    #[inline]
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self::with_capacity_blocks(bits.div_ceil(64))
    }

    /// A bitset of the given block-capacity with `set_bits` already set.
    ///
    /// # Panics
    ///
    /// Debug-asserts every bit in `set_bits` is in range.
    pub fn from_bits(capacity_blocks: usize, set_bits: impl IntoIterator<Item = usize>) -> Self {
        let mut this = Self::with_capacity_blocks(capacity_blocks);
        for b in set_bits {
            this.set_bit(b);
        }
        this
    }

    /// Reallocates to `blocks` all-zero blocks, discarding prior contents.
    #[inline]
    pub fn reset(&mut self, blocks: usize) {
        self.blocks = vec![0u64; blocks];
    }

    /// Like [`Self::reset`], additionally setting `set_bits`.
    pub fn reset_with_bits(&mut self, blocks: usize, set_bits: impl IntoIterator<Item = usize>) {
        self.reset(blocks);
        for b in set_bits {
            self.set_bit(b);
        }
    }

    /// Block-capacity (number of `u64` blocks owned).
    #[inline]
    pub fn capacity_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Bit-capacity (`64 * capacity_blocks()`).
    #[inline]
    pub fn capacity_bits(&self) -> usize {
        self.blocks.len() * 64
    }

    #[inline]
    fn in_range(&self, b: usize) -> bool {
        b < self.capacity_bits()
    }

    /// Sets bit `b`.
    ///
    /// # Panics
    ///
    /// Debug-asserts `b` is in range.
    #[inline]
    pub fn set_bit(&mut self, b: usize) {
        debug_assert!(self.in_range(b), "bit {b} out of range (capacity {})", self.capacity_bits());
        unsafe { self.set_bit_unchecked(b) }
    }

    /// Sets bit `b` without a range check.
    ///
    /// # Safety
    ///
    /// `b` must be `< self.capacity_bits()`.
    #[inline]
    pub unsafe fn set_bit_unchecked(&mut self, b: usize) {
        let block = self.blocks.get_unchecked_mut(primitive::block_index(b));
        *block |= primitive::mask_bit(primitive::bit_offset(b));
    }

    /// Clears bit `b`.
    ///
    /// # Panics
    ///
    /// Debug-asserts `b` is in range.
    #[inline]
    pub fn clear_bit(&mut self, b: usize) {
        debug_assert!(self.in_range(b), "bit {b} out of range (capacity {})", self.capacity_bits());
        unsafe { self.clear_bit_unchecked(b) }
    }

    /// Clears bit `b` without a range check.
    ///
    /// # Safety
    ///
    /// `b` must be `< self.capacity_bits()`.
    #[inline]
    pub unsafe fn clear_bit_unchecked(&mut self, b: usize) {
        let block = self.blocks.get_unchecked_mut(primitive::block_index(b));
        *block &= !primitive::mask_bit(primitive::bit_offset(b));
    }

    /// Tests bit `b`.
    ///
    /// # Panics
    ///
    /// Debug-asserts `b` is in range.
    #[inline]
    pub fn is_bit(&self, b: usize) -> bool {
        debug_assert!(self.in_range(b), "bit {b} out of range (capacity {})", self.capacity_bits());
        unsafe { self.is_bit_unchecked(b) }
    }

    /// Tests bit `b` without a range check.
    ///
    /// # Safety
    ///
    /// `b` must be `< self.capacity_bits()`.
    #[inline]
    pub unsafe fn is_bit_unchecked(&self, b: usize) -> bool {
        let block = *self.blocks.get_unchecked(primitive::block_index(b));
        primitive::is_bit(block, primitive::bit_offset(b))
    }

    /// Sets every bit in `[lo, hi]` (inclusive).
    ///
    /// # Panics
    ///
    /// Debug-asserts `lo <= hi` and both endpoints in range.
    pub fn set_range(&mut self, lo: usize, hi: usize) {
        self.apply_range(lo, hi, true);
    }

    /// Clears every bit in `[lo, hi]` (inclusive).
    ///
    /// # Panics
    ///
    /// Debug-asserts `lo <= hi` and both endpoints in range.
    pub fn clear_range(&mut self, lo: usize, hi: usize) {
        self.apply_range(lo, hi, false);
    }

    fn apply_range(&mut self, lo: usize, hi: usize, value: bool) {
        debug_assert!(lo <= hi, "range [{lo}, {hi}] is inverted");
        debug_assert!(self.in_range(hi), "bit {hi} out of range (capacity {})", self.capacity_bits());

        let first_block = primitive::block_index(lo);
        let last_block = primitive::block_index(hi);

        if first_block == last_block {
            let mask = primitive::mask_range(primitive::bit_offset(lo), primitive::bit_offset(hi));
            self.apply_mask(first_block, mask, value);
            return;
        }

        let first_mask = primitive::mask_high(primitive::bit_offset(lo));
        self.apply_mask(first_block, first_mask, value);

        for block in (first_block + 1)..last_block {
            self.apply_mask(block, u64::MAX, value);
        }

        let last_mask = primitive::mask_low(primitive::bit_offset(hi) + 1);
        self.apply_mask(last_block, last_mask, value);
    }

    #[inline]
    fn apply_mask(&mut self, block: usize, mask: u64, value: bool) {
        if value {
            self.blocks[block] |= mask;
        } else {
            self.blocks[block] &= !mask;
        }
    }

    /// Clears every block.
    #[inline]
    pub fn clear(&mut self) {
        self.blocks.iter_mut().for_each(|b| *b = 0);
    }

    /// Number of set bits, `O(capacity_blocks())`.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.blocks.iter().map(|b| primitive::popcount(*b) as usize).sum()
    }

    /// True iff every block is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| *b == 0)
    }

    /// Offset of the globally least-significant set bit, scanning blocks in order.
    pub fn lsb(&self) -> Option<usize> {
        self.blocks.iter().enumerate().find_map(|(i, &b)| {
            primitive::lsb(b).map(|off| i * 64 + off as usize)
        })
    }

    /// Offset of the globally most-significant set bit, scanning blocks in reverse.
    pub fn msb(&self) -> Option<usize> {
        self.blocks.iter().enumerate().rev().find_map(|(i, &b)| {
            primitive::msb(b).map(|off| i * 64 + off as usize)
        })
    }

    /// True iff `self` and `other` share no set bit at the same position.
    ///
    /// # Panics
    ///
    /// Debug-asserts equal capacity.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        debug_assert_eq!(self.capacity_blocks(), other.capacity_blocks());
        self.blocks.iter().zip(&other.blocks).all(|(a, b)| a & b == 0)
    }

    /// Direct read of block `i`, for interop with callers outside this crate
    /// that manage their own block-level representation (e.g. a graph's
    /// adjacency storage).
    ///
    /// # Panics
    ///
    /// Panics (not just debug-asserts) if `i` is out of range, since this is
    /// a raw interop escape hatch rather than a hot-path primitive.
    #[inline]
    pub fn block(&self, i: usize) -> u64 {
        self.blocks[i]
    }

    /// Direct slice of the underlying blocks.
    #[inline]
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    /// Mutable direct slice of the underlying blocks.
    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [u64] {
        &mut self.blocks
    }

    /// Removes every bit from `rhs` that is also set in `self` (`self &= !rhs`).
    ///
    /// # Panics
    ///
    /// Debug-asserts equal capacity.
    pub fn difference_assign(&mut self, rhs: &Self) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        for (a, b) in self.blocks.iter_mut().zip(&rhs.blocks) {
            *a &= !b;
        }
    }

    /// Complement within capacity: every in-range bit not set in `self`.
    #[inline]
    pub fn flip(&self) -> Self {
        Self { blocks: self.blocks.iter().map(|b| !b).collect() }
    }

    /// Ascending iterator over set bit indices.
    #[inline]
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().enumerate().flat_map(|(i, &block)| {
            let base = i * 64;
            let mut bits = block;
            std::iter::from_fn(move || {
                let off = primitive::lsb(bits)?;
                bits &= bits - 1;
                Some(base + off as usize)
            })
        })
    }

    /// Ascending `Vec` of set bit indices.
    #[inline]
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter_ones().collect()
    }
}

impl fmt::Debug for DenseBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseBitset")
            .field("capacity_bits", &self.capacity_bits())
            .field("set", &self.to_vec())
            .finish()
    }
}

impl PartialEq for DenseBitset {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl BitOrAssign<&DenseBitset> for DenseBitset {
    fn bitor_assign(&mut self, rhs: &DenseBitset) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        for (a, b) in self.blocks.iter_mut().zip(&rhs.blocks) {
            *a |= b;
        }
    }
}

impl BitAndAssign<&DenseBitset> for DenseBitset {
    fn bitand_assign(&mut self, rhs: &DenseBitset) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        for (a, b) in self.blocks.iter_mut().zip(&rhs.blocks) {
            *a &= b;
        }
    }
}

impl BitXorAssign<&DenseBitset> for DenseBitset {
    fn bitxor_assign(&mut self, rhs: &DenseBitset) {
        debug_assert_eq!(self.capacity_blocks(), rhs.capacity_blocks());
        for (a, b) in self.blocks.iter_mut().zip(&rhs.blocks) {
            *a ^= b;
        }
    }
}

impl BitOr for &DenseBitset {
    type Output = DenseBitset;
    fn bitor(self, rhs: &DenseBitset) -> DenseBitset {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl BitAnd for &DenseBitset {
    type Output = DenseBitset;
    fn bitand(self, rhs: &DenseBitset) -> DenseBitset {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl BitXor for &DenseBitset {
    type Output = DenseBitset;
    fn bitxor(self, rhs: &DenseBitset) -> DenseBitset {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl Not for &DenseBitset {
    type Output = DenseBitset;
    fn not(self) -> DenseBitset {
        self.flip()
    }
}

/// `out = a & b`. All three must share capacity.
pub fn and_into(a: &DenseBitset, b: &DenseBitset, out: &mut DenseBitset) {
    debug_assert_eq!(a.capacity_blocks(), b.capacity_blocks());
    debug_assert_eq!(a.capacity_blocks(), out.capacity_blocks());
    for ((x, y), o) in a.blocks.iter().zip(&b.blocks).zip(out.blocks.iter_mut()) {
        *o = x & y;
    }
}

/// `out = a | b`. All three must share capacity.
pub fn or_into(a: &DenseBitset, b: &DenseBitset, out: &mut DenseBitset) {
    debug_assert_eq!(a.capacity_blocks(), b.capacity_blocks());
    debug_assert_eq!(a.capacity_blocks(), out.capacity_blocks());
    for ((x, y), o) in a.blocks.iter().zip(&b.blocks).zip(out.blocks.iter_mut()) {
        *o = x | y;
    }
}

/// `out = a ^ b`. All three must share capacity.
pub fn xor_into(a: &DenseBitset, b: &DenseBitset, out: &mut DenseBitset) {
    debug_assert_eq!(a.capacity_blocks(), b.capacity_blocks());
    debug_assert_eq!(a.capacity_blocks(), out.capacity_blocks());
    for ((x, y), o) in a.blocks.iter().zip(&b.blocks).zip(out.blocks.iter_mut()) {
        *o = x ^ y;
    }
}

/// `out = a & !b`. All three must share capacity.
pub fn difference_into(a: &DenseBitset, b: &DenseBitset, out: &mut DenseBitset) {
    debug_assert_eq!(a.capacity_blocks(), b.capacity_blocks());
    debug_assert_eq!(a.capacity_blocks(), out.capacity_blocks());
    for ((x, y), o) in a.blocks.iter().zip(&b.blocks).zip(out.blocks.iter_mut()) {
        *o = x & !y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clear_is_bit_roundtrip() {
        let mut bs = DenseBitset::with_capacity_blocks(2);
        for b in [0usize, 1, 63, 64, 100, 127] {
            bs.set_bit(b);
            assert!(bs.is_bit(b));
            bs.clear_bit(b);
            assert!(!bs.is_bit(b));
        }
    }

    #[test]
    fn set_range_sets_exactly_the_range() {
        let mut bs = DenseBitset::with_capacity_blocks(3);
        bs.set_range(10, 140);
        for b in 0..192 {
            assert_eq!(bs.is_bit(b), (10..=140).contains(&b), "bit {b}");
        }
    }

    #[test]
    fn clear_range_within_single_block() {
        let mut bs = DenseBitset::from_bits(1, 0..64);
        bs.clear_range(4, 7);
        for b in 0..64 {
            assert_eq!(bs.is_bit(b), !(4..=7).contains(&b));
        }
    }

    #[test]
    fn scenario_dense_basic_enumeration() {
        let bits = [0usize, 50, 100, 150, 200, 250, 300];
        let bs = DenseBitset::from_bits(5, bits.iter().copied());
        assert_eq!(bs.to_vec(), bits.to_vec());
        assert_eq!(bs.count_ones(), 7);
        assert_eq!(bs.lsb(), Some(0));
        assert_eq!(bs.msb(), Some(300));
    }

    #[test]
    fn popcount_consistency_scenario() {
        let bits: Vec<usize> = (0..1000).step_by(7).collect();
        let bs = DenseBitset::from_bits(1000usize.div_ceil(64), bits.iter().copied());
        assert_eq!(bs.count_ones(), bits.len());
        let summed: usize = bs.blocks().iter().map(|b| primitive::popcount(*b) as usize).sum();
        assert_eq!(summed, bits.len());
    }

    #[test]
    fn set_algebra_identities() {
        let a = DenseBitset::from_bits(4, [1usize, 5, 200]);
        let b = DenseBitset::from_bits(4, [5usize, 9, 64]);

        let mut xor_self = a.clone();
        xor_self ^= &a;
        assert!(xor_self.is_empty());

        let mut or_self = a.clone();
        or_self |= &a;
        assert_eq!(or_self, a);

        let mut and_self = a.clone();
        and_self &= &a;
        assert_eq!(and_self, a);

        let zero = DenseBitset::with_capacity_blocks(4);
        let mut or_zero = a.clone();
        or_zero |= &zero;
        assert_eq!(or_zero, a);

        let mut and_zero = a.clone();
        and_zero &= &zero;
        assert_eq!(and_zero, zero);

        let union = &a | &b;
        let inter = &a & &b;
        assert_eq!(union.count_ones() + inter.count_ones(), a.count_ones() + b.count_ones());
    }

    #[test]
    fn de_morgan_within_capacity() {
        let a = DenseBitset::from_bits(2, [1usize, 5, 70]);
        let b = DenseBitset::from_bits(2, [5usize, 9, 64]);

        let not_or = !&(&a | &b);
        let and_of_nots = &(!&a) & &(!&b);
        assert_eq!(not_or, and_of_nots);

        let not_and = !&(&a & &b);
        let or_of_nots = &(!&a) | &(!&b);
        assert_eq!(not_and, or_of_nots);
    }

    #[test]
    fn is_disjoint_detects_overlap() {
        let a = DenseBitset::from_bits(2, [1usize, 5]);
        let b = DenseBitset::from_bits(2, [5usize, 9]);
        let c = DenseBitset::from_bits(2, [2usize, 9]);
        assert!(!a.is_disjoint(&b));
        assert!(a.is_disjoint(&c));
    }

    #[test]
    fn free_function_set_algebra_matches_operators() {
        let a = DenseBitset::from_bits(3, [1usize, 130, 190]);
        let b = DenseBitset::from_bits(3, [2usize, 130, 64]);
        let mut out = DenseBitset::with_capacity_blocks(3);

        and_into(&a, &b, &mut out);
        assert_eq!(out, &a & &b);

        or_into(&a, &b, &mut out);
        assert_eq!(out, &a | &b);

        xor_into(&a, &b, &mut out);
        assert_eq!(out, &a ^ &b);

        difference_into(&a, &b, &mut out);
        let mut expect = a.clone();
        expect.difference_assign(&b);
        assert_eq!(out, expect);
    }
}
