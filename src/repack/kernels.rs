//! Scalar scanline kernels behind [`StepKind::Repack`](super::StepKind) and
//! [`StepKind::Float`](super::StepKind).
//!
//! Every kernel converts one line of `w` pixels. Packed words and multi-byte
//! samples are little-endian; big-endian formats reach these kernels only
//! after (or before) an endian step.

use super::{Kernel, WordLayout};

/// Read a little-endian unsigned value of `n` bytes (1..=8).
#[inline(always)]
fn load(b: &[u8], n: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf[..n].copy_from_slice(&b[..n]);
    u64::from_le_bytes(buf)
}

#[inline(always)]
fn store(b: &mut [u8], n: usize, v: u64) {
    b[..n].copy_from_slice(&v.to_le_bytes()[..n]);
}

impl Kernel {
    /// Plane of the packed format the kernel reads or writes.
    #[inline]
    pub(super) fn packed_plane(&self) -> usize {
        match self {
            Kernel::Nv { .. } => 1,
            _ => 0,
        }
    }

    /// Whether the kernel writes planar plane `p` itself.
    #[inline]
    pub(super) fn writes_plane(&self, p: usize) -> bool {
        match self {
            Kernel::Copy => false,
            Kernel::Nv { .. } => p != 0,
            _ => true,
        }
    }
}

// ===========================================================================
// Pack: planar lines -> packed line
// ===========================================================================

/// Pack `w` pixels (luma resolution) from `planar` into `packed`.
/// `chroma_xs` is the packed format's horizontal chroma shift.
pub(super) fn pack_line(kernel: &Kernel, planar: [&[u8]; 4], packed: &mut [u8], w: usize, chroma_xs: u8) {
    match kernel {
        Kernel::Copy | Kernel::Palette => {}
        Kernel::Words { layout, planes } => pack_words(layout, planes, &planar, packed, w),
        Kernel::Nv { layout, planes } => {
            let cw = (w + (1 << chroma_xs) - 1) >> chroma_xs;
            pack_words(layout, &[planes[0], planes[1], 0, 0], &planar, packed, cw);
        }
        Kernel::Bitmap { lut } => {
            let src = planar[0];
            for x in (0..w).step_by(8) {
                let mut d = 0u8;
                for bp in 0..8.min(w - x) {
                    d |= lut[src[x + bp] as usize] << (7 - bp);
                }
                packed[x / 8] = d;
            }
        }
        Kernel::FringeRgb {
            word_bytes,
            shifts,
            planes,
            lut,
        } => {
            let wb = *word_bytes as usize;
            for x in 0..w {
                let mut c = 0u64;
                for n in 0..3 {
                    let v = planar[planes[n] as usize][x] as usize;
                    c |= (lut[n * 256 + v] as u64) << shifts[n];
                }
                store(&mut packed[x * wb..], wb, c);
            }
        }
        Kernel::PackedYuv {
            sample_bytes,
            group,
            map,
        } => {
            let sb = *sample_bytes as usize;
            let g = *group as usize;
            for x in (0..w).step_by(g) {
                let base = x / g * (g + 2);
                for k in 0..g {
                    let at = (base + map[k] as usize) * sb;
                    packed[at..at + sb].copy_from_slice(&planar[0][(x + k) * sb..(x + k + 1) * sb]);
                }
                let c = x / g * sb;
                let cb = (base + map[4] as usize) * sb;
                packed[cb..cb + sb].copy_from_slice(&planar[1][c..c + sb]);
                let cr = (base + map[5] as usize) * sb;
                packed[cr..cr + sb].copy_from_slice(&planar[2][c..c + sb]);
            }
        }
    }
}

fn pack_words(layout: &WordLayout, planes: &[u8; 4], planar: &[&[u8]; 4], packed: &mut [u8], w: usize) {
    let pb = layout.packed_bytes as usize;
    let sb = layout.sample_bytes as usize;
    let mask = (1u64 << layout.comp_bits) - 1;
    let count = layout.count as usize;
    for x in 0..w {
        let mut word = 0u64;
        for k in 0..count {
            let v = load(&planar[planes[k] as usize][x * sb..], sb) & mask;
            word |= v << layout.shift(k);
        }
        store(&mut packed[x * pb..], pb, word);
    }
}

// ===========================================================================
// Unpack: packed line -> planar lines
// ===========================================================================

/// Unpack `w` pixels from `packed` into `planar`. Palette kernels read
/// `palette`, which must be present; release builds decode a missing one as
/// all zeros.
pub(super) fn unpack_line(
    kernel: &Kernel,
    packed: &[u8],
    palette: Option<&[u32; 256]>,
    mut planar: [&mut [u8]; 4],
    w: usize,
    chroma_xs: u8,
) {
    match kernel {
        Kernel::Copy => {}
        Kernel::Words { layout, planes } => unpack_words(layout, planes, packed, &mut planar, w),
        Kernel::Nv { layout, planes } => {
            let cw = (w + (1 << chroma_xs) - 1) >> chroma_xs;
            unpack_words(layout, &[planes[0], planes[1], 0, 0], packed, &mut planar, cw);
        }
        Kernel::Palette => {
            debug_assert!(palette.is_some(), "palette format unpacked without a palette");
            let pal = palette.unwrap_or(&[0; 256]);
            let [g, b, r, a] = planar;
            for x in 0..w {
                let c = pal[packed[x] as usize];
                g[x] = (c >> 8) as u8;
                b[x] = c as u8;
                r[x] = (c >> 16) as u8;
                a[x] = (c >> 24) as u8;
            }
        }
        Kernel::Bitmap { lut } => {
            let dst = &mut planar[0];
            for x in (0..w).step_by(8) {
                let d = packed[x / 8];
                for bp in 0..8.min(w - x) {
                    dst[x + bp] = lut[(d & (1 << (7 - bp))) as usize];
                }
            }
        }
        Kernel::FringeRgb {
            word_bytes,
            shifts,
            planes,
            lut,
        } => {
            let wb = *word_bytes as usize;
            for x in 0..w {
                let c = load(&packed[x * wb..], wb);
                for n in 0..3 {
                    let v = ((c >> shifts[n]) & 0xFF) as usize;
                    planar[planes[n] as usize][x] = lut[n * 256 + v];
                }
            }
        }
        Kernel::PackedYuv {
            sample_bytes,
            group,
            map,
        } => {
            let sb = *sample_bytes as usize;
            let g = *group as usize;
            for x in (0..w).step_by(g) {
                let base = x / g * (g + 2);
                for k in 0..g {
                    let at = (base + map[k] as usize) * sb;
                    planar[0][(x + k) * sb..(x + k + 1) * sb].copy_from_slice(&packed[at..at + sb]);
                }
                let c = x / g * sb;
                let cb = (base + map[4] as usize) * sb;
                planar[1][c..c + sb].copy_from_slice(&packed[cb..cb + sb]);
                let cr = (base + map[5] as usize) * sb;
                planar[2][c..c + sb].copy_from_slice(&packed[cr..cr + sb]);
            }
        }
    }
}

fn unpack_words(layout: &WordLayout, planes: &[u8; 4], packed: &[u8], planar: &mut [&mut [u8]; 4], w: usize) {
    let pb = layout.packed_bytes as usize;
    let sb = layout.sample_bytes as usize;
    let mask = (1u64 << layout.comp_bits) - 1;
    let count = layout.count as usize;
    for x in 0..w {
        let word = load(&packed[x * pb..], pb);
        for k in 0..count {
            let v = (word >> layout.shift(k)) & mask;
            store(&mut planar[planes[k] as usize][x * sb..], sb, v);
        }
    }
}

// ===========================================================================
// Float
// ===========================================================================

/// `n` integer samples of `int_bytes` each to normalized floats:
/// `f = v * m + o`.
pub(super) fn int_to_float(src: &[u8], dst: &mut [u8], n: usize, int_bytes: usize, m: f32, o: f32) {
    for (s, d) in src
        .chunks_exact(int_bytes)
        .zip(dst.chunks_exact_mut(4))
        .take(n)
    {
        let v = load(s, int_bytes) as f32;
        d.copy_from_slice(&(v * m + o).to_le_bytes());
    }
}

/// `n` floats to integers: `clamp(round((f + o) * m), 0, pmax)`, ties to even.
pub(super) fn float_to_int(
    src: &[u8],
    dst: &mut [u8],
    n: usize,
    int_bytes: usize,
    m: f32,
    o: f32,
    pmax: u32,
) {
    for (s, d) in src
        .chunks_exact(4)
        .zip(dst.chunks_exact_mut(int_bytes))
        .take(n)
    {
        let f = f32::from_le_bytes([s[0], s[1], s[2], s[3]]);
        let v = ((f + o) * m).round_ties_even().clamp(0.0, pmax as f32);
        store(d, int_bytes, v as u64);
    }
}
