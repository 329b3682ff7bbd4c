//! Stateless bitset algorithms (SPEC_FULL §4.7): conversion, random block
//! generation and bit extraction, used by the graph/test layers built on top
//! of the engine rather than by the bitset types themselves.

use rand::Rng;

use crate::primitive;

/// Ascending `Vec` of set bit indices across `blocks`, treated as a
/// contiguous sequence starting at global bit `0`.
///
/// Grounded on [`crate::dense::DenseBitset::to_vec`]/[`crate::sparse::SparseBitset::to_vec`];
/// provided standalone for callers holding a raw `&[u64]` (e.g. a graph's
/// adjacency row) rather than a bitset value.
pub fn bits_to_vec(blocks: &[u64]) -> Vec<usize> {
    blocks
        .iter()
        .enumerate()
        .flat_map(|(i, &w)| {
            let base = i * 64;
            let mut bits = w;
            std::iter::from_fn(move || {
                let off = primitive::lsb(bits)?;
                bits &= bits - 1;
                Some(base + off as usize)
            })
        })
        .collect()
}

/// A random 64-bit block where each bit is independently set with
/// probability `p` (`0.0 ..= 1.0`).
///
/// Grounded on the teacher's `fuzzy_test` fixture generator (`test.rs`),
/// which drives random insert/remove sessions off `rng.gen_range`; here
/// applied to generate a single block's density instead of a session script.
pub fn gen_random_block<R: Rng + ?Sized>(rng: &mut R, p: f64) -> u64 {
    debug_assert!((0.0..=1.0).contains(&p));
    let mut block = 0u64;
    for b in 0..64 {
        if rng.gen_bool(p) {
            block |= primitive::mask_bit(b);
        }
    }
    block
}

/// The block made of the `k` lowest bits of `bb` (bits `0..k`), written into
/// `out`. `k` may exceed 64, in which case the whole block is copied.
pub fn first_k_bits(k: u32, bb: u64, out: &mut u64) {
    *out = if k >= 64 { bb } else { bb & primitive::mask_low(k) };
}
