//! Packed ↔ planar repacking.
//!
//! [`RepackPlan::new`] decides how a user format decomposes into a native
//! planar format and which steps (float range mapping, component repack,
//! endian swap) bridge the two. A [`Repacker`] binds a plan to buffers and
//! converts one line group at a time with [`Repacker::repack_line`].
//!
//! Direction: a *pack* plan has the user format as its destination (planar
//! in, user format out); an *unpack* plan has it as its source.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::format::ImgFormat;

mod bswap;
mod engine;
mod kernels;
mod planner;

pub use engine::{BufferRef, Repacker, Side};


/// How fringe RGB component depths collapse into one planar depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DepthRounding {
    /// Use the widest component (lossless on unpack).
    #[default]
    Up,
    /// Use the narrowest component.
    Down,
}

/// Planner knobs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RepackOptions {
    pub rounding: DepthRounding,
    /// Map sub-8-bit planar targets (1-bit gray, fringe RGB) to 8 bits.
    pub expand_8bit: bool,
    /// Use float samples on the planar side.
    pub planar_f32: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Integer ↔ float sample mapping.
    Float,
    /// Component interleave/deinterleave (or a plain copy for planar formats).
    Repack,
    /// Byte swap of 2- or 4-byte words.
    Endian,
}

/// One stage of a plan, in data-flow order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepackStep {
    pub kind: StepKind,
    pub input: ImgFormat,
    pub output: ImgFormat,
}

/// Packing width of a regular word repacker. Shifts of component `k` are
/// `prepad + k * comp_bits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WordLayout {
    pub packed_bytes: u8,
    pub comp_bits: u8,
    /// Bytes of each planar sample.
    pub sample_bytes: u8,
    pub count: u8,
    pub prepad: u8,
}

impl WordLayout {
    #[inline]
    pub fn shift(&self, k: usize) -> u32 {
        self.prepad as u32 + k as u32 * self.comp_bits as u32
    }
}

/// Per-format kernel of the [`StepKind::Repack`] step with the constants it
/// needs. Plane indices refer to the planar format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kernel {
    /// Packed and planar formats are the same; planes are copied.
    Copy,
    /// One plane of words; component `k` of each word goes to `planes[k]`.
    Words { layout: WordLayout, planes: [u8; 4] },
    /// Luma plane copied; interleaved chroma pair goes to `planes`.
    Nv { layout: WordLayout, planes: [u8; 2] },
    /// 8-bit index → G, B, R, A planes. Unpack only.
    Palette,
    /// One bit per pixel ↔ one sample per pixel through a 256-entry table.
    Bitmap { lut: Box<[u8; 256]> },
    /// Sub-byte RGB fields in 1- or 2-byte words, rescaled through a
    /// per-component 256-entry table.
    FringeRgb {
        word_bytes: u8,
        shifts: [u8; 3],
        planes: [u8; 3],
        lut: Box<[u8; 768]>,
    },
    /// Packed subsampled YUV. `map[..group]` are luma sample positions,
    /// `map[4]`/`map[5]` Cb/Cr positions, all in samples within a group.
    PackedYuv {
        sample_bytes: u8,
        group: u8,
        map: [u8; 6],
    },
}

/// How to get from one user format to its native planar equivalent.
///
/// Immutable once built; share it between engines with an `Arc`.
#[derive(Clone, Debug)]
pub struct RepackPlan {
    pack: bool,
    options: RepackOptions,
    user: ImgFormat,
    /// Format the repack kernel sees on its packed side (the user format or
    /// its other-endian sibling).
    packed: ImgFormat,
    /// Native integer planar format on the kernel's planar side.
    planar: ImgFormat,
    kernel: Kernel,
    endian_size: u8,
    /// Bytes of the integer planar samples when a float step is present.
    float_int_bytes: Option<u8>,
    steps: Vec<RepackStep>,
}

impl RepackPlan {
    /// Whether the user format is the destination.
    #[inline]
    pub fn is_pack(&self) -> bool {
        self.pack
    }

    #[inline]
    pub fn options(&self) -> RepackOptions {
        self.options
    }

    #[inline]
    pub fn user_format(&self) -> ImgFormat {
        self.user
    }

    /// The planar format on the non-user end of the chain (float if
    /// requested).
    pub fn planar_format(&self) -> ImgFormat {
        if self.pack {
            self.src_format()
        } else {
            self.dst_format()
        }
    }

    /// Format the first step reads.
    #[inline]
    pub fn src_format(&self) -> ImgFormat {
        self.steps[0].input
    }

    /// Format the last step writes.
    #[inline]
    pub fn dst_format(&self) -> ImgFormat {
        self.steps[self.steps.len() - 1].output
    }

    #[inline]
    pub fn steps(&self) -> &[RepackStep] {
        &self.steps
    }

    /// Horizontal alignment of x coordinates and widths passed to
    /// [`Repacker::repack_line`].
    #[inline]
    pub fn align_x(&self) -> usize {
        self.packed.desc().align_x as usize
    }

    /// Vertical alignment of y coordinates passed to
    /// [`Repacker::repack_line`].
    #[inline]
    pub fn align_y(&self) -> usize {
        self.packed.desc().align_y as usize
    }

    /// Byte-swap word size, 0 without an endian step.
    #[inline]
    pub fn endian_size(&self) -> usize {
        self.endian_size as usize
    }

    #[inline]
    pub(crate) fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    #[inline]
    pub(crate) fn planar_int(&self) -> ImgFormat {
        self.planar
    }

    #[inline]
    pub(crate) fn float_int_bytes(&self) -> Option<u8> {
        self.float_int_bytes
    }
}
