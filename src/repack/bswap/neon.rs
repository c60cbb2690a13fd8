use archmage::prelude::*;

use super::{swap16_tail, swap32_tail};

// ===========================================================================
// ARM NEON: rite row implementations
// ===========================================================================

#[rite]
fn shuffle_row_arm_v2(_token: Arm64V2Token, row: &mut [u8], mask_bytes: &[u8; 16]) -> usize {
    use core::arch::aarch64::vqtbl1q_u8;
    let mask = safe_unaligned_simd::aarch64::vld1q_u8(mask_bytes);
    let n = row.len();
    let mut i = 0;
    while i + 16 <= n {
        let arr: &[u8; 16] = row[i..i + 16].try_into().unwrap();
        let v = safe_unaligned_simd::aarch64::vld1q_u8(arr);
        let shuffled = vqtbl1q_u8(v, mask);
        let out: &mut [u8; 16] = (&mut row[i..i + 16]).try_into().unwrap();
        safe_unaligned_simd::aarch64::vst1q_u8(out, shuffled);
        i += 16;
    }
    i
}

// ===========================================================================
// ARM arcane contiguous wrappers
// ===========================================================================

#[arcane]
pub(super) fn swap16_impl_arm_v2(t: Arm64V2Token, b: &mut [u8]) {
    let mask = [1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14];
    let done = shuffle_row_arm_v2(t, b, &mask);
    swap16_tail(&mut b[done..]);
}

#[arcane]
pub(super) fn swap32_impl_arm_v2(t: Arm64V2Token, b: &mut [u8]) {
    let mask = [3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12];
    let done = shuffle_row_arm_v2(t, b, &mask);
    swap32_tail(&mut b[done..]);
}
