//! In-place byte swapping of 16- and 32-bit words for the endian step.
//!
//! `#[arcane]` wrappers are dispatched with `incant!`; each tier handles whole
//! vectors and leaves the tail to the scalar word loop.

use archmage::incant;

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
use avx2::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon::*;

#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
use wasm::*;

#[cfg(test)]
mod tests;

// ===========================================================================
// Word helpers
// ===========================================================================

#[inline(always)]
fn swap16_tail(row: &mut [u8]) {
    for w in row.chunks_exact_mut(2) {
        w.swap(0, 1);
    }
}

#[inline(always)]
fn swap32_tail(row: &mut [u8]) {
    for w in row.chunks_exact_mut(4) {
        w.reverse();
    }
}

// ===========================================================================
// Dispatch
// ===========================================================================

/// Reverse the bytes of every `size`-byte word of `buf` (2 or 4). A trailing
/// partial word is left alone.
pub(crate) fn swap_words(buf: &mut [u8], size: usize) {
    match size {
        2 => incant!(swap16_impl(buf), [v3, arm_v2, wasm128, scalar]),
        4 => incant!(swap32_impl(buf), [v3, arm_v2, wasm128, scalar]),
        _ => panic!("unsupported endian word size {size}"),
    }
}
