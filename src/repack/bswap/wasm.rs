use core::arch::wasm32::{i8x16_swizzle, v128};

use archmage::prelude::*;
use safe_unaligned_simd::wasm32::{v128_load, v128_store};

use super::{swap16_tail, swap32_tail};

// ===========================================================================
// WASM SIMD128: rite row implementations
// ===========================================================================

#[rite]
fn shuffle_row_wasm128(_token: Wasm128Token, row: &mut [u8], mask: v128) -> usize {
    let n = row.len();
    let mut i = 0;
    while i + 16 <= n {
        let arr: &[u8; 16] = row[i..i + 16].try_into().unwrap();
        let v = v128_load(arr);
        let out: &mut [u8; 16] = (&mut row[i..i + 16]).try_into().unwrap();
        v128_store(out, i8x16_swizzle(v, mask));
        i += 16;
    }
    i
}

// ===========================================================================
// WASM arcane contiguous wrappers
// ===========================================================================

#[arcane]
pub(super) fn swap16_impl_wasm128(t: Wasm128Token, b: &mut [u8]) {
    use core::arch::wasm32::i8x16;
    let mask = i8x16(1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14);
    let done = shuffle_row_wasm128(t, b, mask);
    swap16_tail(&mut b[done..]);
}

#[arcane]
pub(super) fn swap32_impl_wasm128(t: Wasm128Token, b: &mut [u8]) {
    use core::arch::wasm32::i8x16;
    let mask = i8x16(3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12);
    let done = shuffle_row_wasm128(t, b, mask);
    swap32_tail(&mut b[done..]);
}
