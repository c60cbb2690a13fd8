//! Decide how a user format decomposes into a native planar format.

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::debug;

use super::{DepthRounding, Kernel, RepackOptions, RepackPlan, RepackStep, StepKind, WordLayout};
use crate::format::{
    ColorFamily, ComponentType, FormatFlags, ImgFormat, PlaneLayout, RegularLayout, find_regular,
};

/// Word layouts the regular packed kernel handles:
/// (packed bits, component bits, leading padding bits, component count).
const REGULAR_REPACKERS: [(u8, u8, u8, u8); 10] = [
    (32, 8, 0, 3),
    (32, 8, 8, 3),
    (32, 8, 0, 4),
    (64, 16, 0, 4),
    (64, 16, 0, 3),
    (24, 8, 0, 3),
    (48, 16, 0, 3),
    (16, 8, 0, 2),
    (32, 16, 0, 2),
    (32, 10, 0, 3),
];

fn word_layout(packed_bits: u8, comp_bits: u8, prepad: u8, count: u8) -> Option<WordLayout> {
    REGULAR_REPACKERS
        .iter()
        .find(|&&e| e == (packed_bits, comp_bits, prepad, count))
        .map(|_| WordLayout {
            packed_bytes: packed_bits / 8,
            comp_bits,
            sample_bytes: if comp_bits > 8 { 2 } else { 1 },
            count,
            prepad,
        })
}

/// Outcome of one strategy: the planar format the kernel talks to.
struct Matched {
    planar: ImgFormat,
    kernel: Kernel,
    endian_size: u8,
}

impl Matched {
    fn new(planar: ImgFormat, kernel: Kernel) -> Self {
        Self {
            planar,
            kernel,
            endian_size: 0,
        }
    }
}

// ===========================================================================
// Strategies
// ===========================================================================

/// Semi-planar: luma plane plus one interleaved chroma plane.
fn match_nv(packed: ImgFormat) -> Option<Matched> {
    let layout = packed.regular()?;
    if layout.num_planes != 2
        || layout.planes[0] != PlaneLayout::single(1)
        || layout.planes[1].num_components != 2
    {
        return None;
    }
    let [c0, c1, ..] = layout.planes[1].components;
    if !matches!((c0, c1), (2, 3) | (3, 2)) {
        return None;
    }

    let mut target = layout;
    target.num_planes = 3;
    target.planes = [
        PlaneLayout::single(1),
        PlaneLayout::single(2),
        PlaneLayout::single(3),
        PlaneLayout::default(),
    ];
    // P010 keeps its samples in the high bits; the planar side sees 16-bit.
    target.component_pad = target.component_pad.min(0);
    let planar = find_regular(&target)?;

    let size = layout.component_size;
    let words = word_layout(size * 16, size * 8, 0, 2)?;
    Some(Matched::new(
        planar,
        Kernel::Nv {
            layout: words,
            planes: [c0 - 1, c1 - 1],
        },
    ))
}

/// Palette expansion and 1-bit bitmaps.
fn match_misc(packed: ImgFormat, pack: bool, options: &RepackOptions) -> Option<Matched> {
    if packed == ImgFormat::Pal8 {
        if pack {
            return None;
        }
        let planar = find_regular(&RegularLayout::gbrp(8, 4))?;
        return Some(Matched::new(planar, Kernel::Palette));
    }
    if !matches!(packed, ImgFormat::MonoWhite | ImgFormat::MonoBlack) {
        return None;
    }

    let (depth, max) = if options.expand_8bit { (8, 255u8) } else { (1, 1u8) };
    let planar = find_regular(&RegularLayout::yuvp(depth, 1))?;
    let inv = packed == ImgFormat::MonoWhite;
    let half = (max as usize + 1) / 2;
    let lut: [u8; 256] = core::array::from_fn(|n| {
        if pack {
            (inv ^ (n >= half)) as u8
        } else if inv ^ (n != 0) {
            max
        } else {
            0
        }
    });
    Some(Matched::new(planar, Kernel::Bitmap { lut: Box::new(lut) }))
}

/// One plane of equally sized components packed into words.
fn match_packed(packed: ImgFormat) -> Option<Matched> {
    let desc = packed.desc();
    if !desc.flags.contains(FormatFlags::HAS_COMPONENTS)
        || desc.is_float()
        || desc.is_big_endian()
        || desc.num_planes != 1
    {
        return None;
    }

    let first = desc.comps[0];
    let mut slots = [0u8; 4];
    let mut count = 0u8;
    for (i, c) in desc.comps.iter().enumerate() {
        if !c.is_present() {
            continue;
        }
        if c.size != first.size || c.pad != first.pad || c.offset % first.size != 0 {
            return None;
        }
        let slot = (c.offset / first.size) as usize;
        if slot >= 4 {
            return None;
        }
        slots[slot] = i as u8 + 1;
        count += 1;
    }
    if count == 0 {
        return None;
    }

    let depth = (first.size as i16 + first.pad.min(0) as i16) as u8;
    // Maps component id to planar plane: R→2, G→0, B→1 for GBR, identity
    // for YUV; alpha is always the last plane.
    let (layout, reorder) = match desc.family {
        ColorFamily::Yuv => (RegularLayout::yuvp(depth, count), [0u8, 1, 2, 3, 4]),
        ColorFamily::Rgb => (RegularLayout::gbrp(depth, count), [0u8, 3, 1, 2, 4]),
    };
    let planar = find_regular(&layout)?;

    let (prepad, first_slot) = if slots[0] != 0 { (0, 0) } else { (8, 1) };
    let words = word_layout(desc.bpp[0], depth, prepad, count)?;
    let mut planes = [0u8; 4];
    for (k, plane) in planes.iter_mut().take(count as usize).enumerate() {
        let c = reorder[slots[first_slot + k] as usize];
        *plane = if c == 4 { count - 1 } else { c - 1 };
    }
    Some(Matched::new(
        planar,
        Kernel::Words {
            layout: words,
            planes,
        },
    ))
}

/// RGB with sub-byte fields in one 8- or 16-bit word (RGB565 and friends).
fn match_fringe_rgb(packed: ImgFormat, pack: bool, options: &RepackOptions) -> Option<Matched> {
    let desc = packed.desc();
    if !desc.flags.contains(FormatFlags::HAS_COMPONENTS)
        || desc.bpp[0] > 16
        || desc.bpp[0] % 8 != 0
        || desc.family != ColorFamily::Rgb
        || desc.num_planes != 1
        || desc.comps[3].is_present()
    {
        return None;
    }

    let mut depth = desc.comps[0].size;
    for c in &desc.comps[..3] {
        if !(1..=8).contains(&c.size) || c.pad != 0 {
            return None;
        }
        depth = match options.rounding {
            DepthRounding::Up => depth.max(c.size),
            DepthRounding::Down => depth.min(c.size),
        };
    }
    if options.expand_8bit {
        depth = 8;
    }
    let planar = find_regular(&RegularLayout::gbrp(depth, 3))?;

    let zmax = (1u32 << depth) - 1;
    let mut lut = Box::new([0u8; 768]);
    let mut shifts = [0u8; 3];
    for (n, c) in desc.comps[..3].iter().enumerate() {
        shifts[n] = c.offset;
        let cmax = (1u32 << c.size) - 1;
        for (v, e) in lut[n * 256..(n + 1) * 256].iter_mut().enumerate() {
            let v = v as u32;
            *e = if pack {
                (v * cmax + zmax / 2) / zmax
            } else {
                (v & cmax) * zmax / cmax
            } as u8;
        }
    }

    let mut matched = Matched::new(
        planar,
        Kernel::FringeRgb {
            word_bytes: desc.bpp[0] / 8,
            shifts,
            planes: [2, 0, 1],
            lut,
        },
    );
    if desc.is_big_endian() {
        matched.endian_size = 2;
    }
    Some(matched)
}

/// Packed YUV with horizontally subsampled chroma (YUYV, UYVY, Y210, ...).
fn match_fringe_yuv(packed: ImgFormat) -> Option<Matched> {
    let desc = packed.desc();
    if !desc.flags.contains(FormatFlags::PACKED_SS_YUV)
        || desc.num_components() != 3
        || desc.align_x > 4
    {
        return None;
    }

    let size = desc.comps[0].size;
    let mut map = [0u8; 6];
    for (n, c) in desc.comps.iter().enumerate() {
        if !c.is_present() {
            continue;
        }
        if c.size != size || c.pad < 0 || c.offset % size != 0 {
            return None;
        }
        if n == 1 || n == 2 {
            map[4 + n - 1] = c.offset / size;
        }
    }
    for n in 0..desc.align_x as usize {
        if desc.luma_offsets[n] % size != 0 {
            return None;
        }
        map[n] = desc.luma_offsets[n] / size;
    }
    if !matches!((size, desc.align_x), (8, 2) | (16, 2) | (8, 4)) {
        return None;
    }

    let target = RegularLayout {
        family: ColorFamily::Yuv,
        component_type: ComponentType::Uint,
        component_size: size / 8,
        component_pad: 0,
        num_planes: 3,
        planes: [
            PlaneLayout::single(1),
            PlaneLayout::single(2),
            PlaneLayout::single(3),
            PlaneLayout::default(),
        ],
        chroma_xs: desc.chroma_xs,
        chroma_ys: 0,
    };
    let planar = find_regular(&target)?;

    let mut matched = Matched::new(
        planar,
        Kernel::PackedYuv {
            sample_bytes: size / 8,
            group: desc.align_x,
            map,
        },
    );
    if desc.is_big_endian() {
        matched.endian_size = 1 << desc.endian_shift;
    }
    Some(matched)
}

// ===========================================================================
// Plan assembly
// ===========================================================================

impl RepackPlan {
    /// Plan a conversion between `user` and its native planar equivalent.
    ///
    /// `pack` selects the direction: `true` converts planar data into `user`,
    /// `false` converts `user` into planar data. Returns `None` if the format
    /// can't be handled in that direction with these options.
    pub fn new(user: ImgFormat, pack: bool, options: RepackOptions) -> Option<Self> {
        let plan = Self::for_packed(user, user, pack, options).or_else(|| {
            let sibling = user.other_endian()?;
            Self::for_packed(user, sibling, pack, options)
        });
        match &plan {
            Some(plan) => debug!(
                "repack {} {user}: {} -> {} in {} step(s)",
                if pack { "pack" } else { "unpack" },
                plan.src_format(),
                plan.dst_format(),
                plan.steps.len()
            ),
            None => debug!(
                "repack {} {user}: no planar equivalent",
                if pack { "pack" } else { "unpack" }
            ),
        }
        plan
    }

    /// Build the plan with `packed` (the user format or its other-endian
    /// sibling) on the kernel's packed side.
    fn for_packed(
        user: ImgFormat,
        packed: ImgFormat,
        pack: bool,
        options: RepackOptions,
    ) -> Option<Self> {
        let Matched {
            planar,
            kernel,
            mut endian_size,
        } = match_nv(packed)
            .or_else(|| match_misc(packed, pack, &options))
            .or_else(|| match_packed(packed))
            .or_else(|| match_fringe_rgb(packed, pack, &options))
            .or_else(|| match_fringe_yuv(packed))
            .unwrap_or_else(|| Matched::new(packed, Kernel::Copy));

        let layout = planar.regular()?;
        if layout.num_planes > 4 || !layout.is_planar() {
            return None;
        }

        if packed != user {
            endian_size = 1 << user.desc().endian_shift;
            if !packed.desc().is_big_endian() && !matches!(endian_size, 2 | 4) {
                return None;
            }
        }

        let mut steps = Vec::with_capacity(3);
        let mut float_int_bytes = None;
        if options.planar_f32 {
            let float_layout = RegularLayout {
                component_type: ComponentType::Float,
                component_size: 4,
                component_pad: 0,
                ..layout
            };
            let float_fmt = find_regular(&float_layout)?;
            if float_fmt != planar {
                if layout.component_type != ComponentType::Uint
                    || !matches!(layout.component_size, 1 | 2)
                {
                    return None;
                }
                float_int_bytes = Some(layout.component_size);
                steps.push(RepackStep {
                    kind: StepKind::Float,
                    input: float_fmt,
                    output: planar,
                });
            }
        }
        steps.push(RepackStep {
            kind: StepKind::Repack,
            input: planar,
            output: packed,
        });
        if endian_size != 0 {
            steps.push(RepackStep {
                kind: StepKind::Endian,
                input: packed,
                output: user,
            });
        }

        if !pack {
            steps.reverse();
            for step in &mut steps {
                core::mem::swap(&mut step.input, &mut step.output);
            }
        }
        debug_assert!(steps.windows(2).all(|s| s[0].output == s[1].input));

        Some(Self {
            pack,
            options,
            user,
            packed,
            planar,
            kernel,
            endian_size,
            float_int_bytes,
            steps,
        })
    }
}
