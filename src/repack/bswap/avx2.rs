use archmage::prelude::*;
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

use super::{swap16_tail, swap32_tail};

// ===========================================================================
// SIMD constants
// ===========================================================================

const SWAP16_SHUF_AVX: [i8; 32] = [
    1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14, 1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13,
    12, 15, 14,
];

const SWAP32_SHUF_AVX: [i8; 32] = [
    3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12, 3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15,
    14, 13, 12,
];

// ===========================================================================
// x86-64 AVX2: rite row implementations
// ===========================================================================

#[rite]
fn shuffle_row_v3(_token: X64V3Token, row: &mut [u8], mask: &[i8; 32]) -> usize {
    let mask = _mm256_loadu_si256(mask);
    let n = row.len();
    let mut i = 0;
    while i + 32 <= n {
        let arr: &[u8; 32] = row[i..i + 32].try_into().unwrap();
        let v = _mm256_loadu_si256(arr);
        let shuffled = _mm256_shuffle_epi8(v, mask);
        let out: &mut [u8; 32] = (&mut row[i..i + 32]).try_into().unwrap();
        _mm256_storeu_si256(out, shuffled);
        i += 32;
    }
    i
}

// ===========================================================================
// x86-64 arcane contiguous wrappers
// ===========================================================================

#[arcane]
pub(super) fn swap16_impl_v3(t: X64V3Token, b: &mut [u8]) {
    let done = shuffle_row_v3(t, b, &SWAP16_SHUF_AVX);
    swap16_tail(&mut b[done..]);
}

#[arcane]
pub(super) fn swap32_impl_v3(t: X64V3Token, b: &mut [u8]) {
    let done = shuffle_row_v3(t, b, &SWAP32_SHUF_AVX);
    swap32_tail(&mut b[done..]);
}
