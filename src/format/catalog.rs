use super::{ColorFamily, CompDesc, FormatDesc, FormatFlags};

use ColorFamily::{Rgb, Yuv};

/// Pixel format id.
///
/// Discriminants are the integer ids; [`ImgFormat::from_id`] is the inverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
#[non_exhaustive]
pub enum ImgFormat {
    // Gray planar
    Gray,
    Gray10Le,
    Gray10Be,
    Gray16Le,
    Gray16Be,
    GrayF32,
    Y1,
    Yap8,
    Yap16Le,
    // YUV planar
    Yuv420p,
    Yuv422p,
    Yuv444p,
    Yuv411p,
    Yuv420p10Le,
    Yuv420p10Be,
    Yuv422p10Le,
    Yuv422p10Be,
    Yuv444p10Le,
    Yuv444p10Be,
    Yuv420p16Le,
    Yuv420p16Be,
    Yuv422p16Le,
    Yuv422p16Be,
    Yuv444p16Le,
    Yuv444p16Be,
    Yuva420p,
    Yuva444p,
    Yuva444p16Le,
    Yuv420pF32,
    Yuv422pF32,
    Yuv444pF32,
    // RGB planar
    Gbrp1,
    Gbrp2,
    Gbrp3,
    Gbrp4,
    Gbrp5,
    Gbrp6,
    Gbrp,
    Gbrp10Le,
    Gbrp10Be,
    Gbrp16Le,
    Gbrp16Be,
    Gbrap,
    Gbrap16Le,
    Gbrap16Be,
    GbrpF32,
    GbrapF32,
    // Packed RGB
    Rgb24,
    Bgr24,
    Rgba,
    Bgra,
    Argb,
    Abgr,
    Rgb0,
    Bgr0,
    Zrgb,
    Zbgr,
    Rgb48Le,
    Rgb48Be,
    Bgr48Le,
    Rgba64Le,
    Rgba64Be,
    Bgra64Le,
    X2Rgb10Le,
    X2Rgb10Be,
    X2Bgr10Le,
    // Packed gray/YUV
    Ya8,
    Ya16Le,
    Ya16Be,
    Vuya,
    Ayuv64Le,
    // Semi-planar
    Nv12,
    Nv21,
    Nv16,
    Nv24,
    P010Le,
    P010Be,
    P016Le,
    P016Be,
    // Special
    Pal8,
    MonoWhite,
    MonoBlack,
    // Fringe RGB
    Rgb565Le,
    Rgb565Be,
    Bgr565Le,
    Bgr565Be,
    Rgb555Le,
    Rgb555Be,
    Bgr555Le,
    Rgb444Le,
    Rgb444Be,
    Rgb8,
    Bgr8,
    Rgb4Byte,
    Bgr4Byte,
    // Packed subsampled YUV
    Yuyv422,
    Yvyu422,
    Uyvy422,
    Y210Le,
    Y210Be,
    Uyyvyy411,
}

// ===========================================================================
// Descriptor constructors
// ===========================================================================

const fn blank(id: ImgFormat, name: &'static str, family: ColorFamily) -> FormatDesc {
    FormatDesc {
        id,
        name,
        flags: FormatFlags::empty(),
        family,
        num_planes: 0,
        bpp: [0; 4],
        xs: [0; 4],
        ys: [0; 4],
        chroma_xs: 0,
        chroma_ys: 0,
        align_x: 1,
        align_y: 1,
        endian_shift: 0,
        comps: [CompDesc::NONE; 4],
        luma_offsets: [0; 4],
    }
}

const fn base_flags(float: bool, alpha: bool) -> FormatFlags {
    let mut f = FormatFlags::HAS_COMPONENTS;
    if float {
        f = f.union(FormatFlags::FLOAT);
    }
    if alpha {
        f = f.union(FormatFlags::ALPHA);
    }
    f
}

/// One component per plane. `planes` lists the component id stored in each
/// plane (0 ends the list); `bytes` is the sample container size.
#[allow(clippy::too_many_arguments)]
const fn planar(
    id: ImgFormat,
    name: &'static str,
    family: ColorFamily,
    float: bool,
    bytes: u8,
    pad: i8,
    planes: [u8; 4],
    (cxs, cys): (u8, u8),
    be: bool,
) -> FormatDesc {
    let mut d = blank(id, name, family);
    let mut has_chroma = false;
    let mut p = 0;
    while p < 4 {
        let c = planes[p];
        if c != 0 {
            let chroma = (c == 2 || c == 3) && matches!(family, Yuv);
            d.comps[(c - 1) as usize] = CompDesc {
                plane: p as u8,
                offset: 0,
                size: bytes * 8,
                pad,
            };
            d.bpp[p] = bytes * 8;
            if chroma {
                d.xs[p] = cxs;
                d.ys[p] = cys;
                has_chroma = true;
            }
            d.num_planes += 1;
        }
        p += 1;
    }
    if has_chroma {
        d.chroma_xs = cxs;
        d.chroma_ys = cys;
    }
    d.align_x = 1 << d.chroma_xs;
    d.align_y = 1 << d.chroma_ys;
    d.flags = base_flags(float, d.comps[3].size != 0);
    if be {
        d.endian_shift = bytes.trailing_zeros() as u8;
    }
    d
}

/// Single plane; `comps` holds (bit offset, bit size, pad) per component id,
/// size 0 for absent ones.
const fn packed(
    id: ImgFormat,
    name: &'static str,
    family: ColorFamily,
    bpp: u8,
    comps: [(u8, u8, i8); 4],
    endian_shift: u8,
) -> FormatDesc {
    let mut d = blank(id, name, family);
    let mut i = 0;
    while i < 4 {
        let (offset, size, pad) = comps[i];
        if size != 0 {
            d.comps[i] = CompDesc {
                plane: 0,
                offset,
                size,
                pad,
            };
        }
        i += 1;
    }
    d.num_planes = 1;
    d.bpp[0] = bpp;
    d.flags = base_flags(false, comps[3].1 != 0);
    d.endian_shift = endian_shift;
    d
}

/// Luma plane plus one interleaved Cb/Cr plane.
#[allow(clippy::too_many_arguments)]
const fn semi(
    id: ImgFormat,
    name: &'static str,
    bytes: u8,
    pad: i8,
    swapped: bool,
    (cxs, cys): (u8, u8),
    be: bool,
) -> FormatDesc {
    let mut d = blank(id, name, Yuv);
    let size = bytes * 8;
    let (cb, cr) = if swapped { (size, 0) } else { (0, size) };
    d.comps[0] = CompDesc {
        plane: 0,
        offset: 0,
        size,
        pad,
    };
    d.comps[1] = CompDesc {
        plane: 1,
        offset: cb,
        size,
        pad,
    };
    d.comps[2] = CompDesc {
        plane: 1,
        offset: cr,
        size,
        pad,
    };
    d.num_planes = 2;
    d.bpp = [size, size * 2, 0, 0];
    d.xs = [0, cxs, 0, 0];
    d.ys = [0, cys, 0, 0];
    d.chroma_xs = cxs;
    d.chroma_ys = cys;
    d.align_x = 1 << cxs;
    d.align_y = 1 << cys;
    d.flags = FormatFlags::HAS_COMPONENTS;
    if be {
        d.endian_shift = bytes.trailing_zeros() as u8;
    }
    d
}

/// Packed YUV with `group` luma samples sharing one Cb/Cr pair. Offsets are
/// in bits from the start of the group.
#[allow(clippy::too_many_arguments)]
const fn packed_yuv(
    id: ImgFormat,
    name: &'static str,
    bpp: u8,
    group: u8,
    (size, pad): (u8, i8),
    luma: [u8; 4],
    (cb, cr): (u8, u8),
    be: bool,
) -> FormatDesc {
    let mut d = blank(id, name, Yuv);
    d.comps[0] = CompDesc {
        plane: 0,
        offset: luma[0],
        size,
        pad,
    };
    d.comps[1] = CompDesc {
        plane: 0,
        offset: cb,
        size,
        pad,
    };
    d.comps[2] = CompDesc {
        plane: 0,
        offset: cr,
        size,
        pad,
    };
    d.luma_offsets = luma;
    d.num_planes = 1;
    d.bpp[0] = bpp;
    d.chroma_xs = group.trailing_zeros() as u8;
    d.align_x = group;
    d.flags = FormatFlags::HAS_COMPONENTS.union(FormatFlags::PACKED_SS_YUV);
    if be {
        d.endian_shift = 1;
    }
    d
}

const fn pal8() -> FormatDesc {
    let mut d = blank(ImgFormat::Pal8, "pal8", Rgb);
    d.num_planes = 1;
    d.bpp[0] = 8;
    d.flags = FormatFlags::PALETTE.union(FormatFlags::ALPHA);
    d
}

const fn mono(id: ImgFormat, name: &'static str) -> FormatDesc {
    let mut d = blank(id, name, Yuv);
    d.comps[0] = CompDesc {
        plane: 0,
        offset: 0,
        size: 1,
        pad: 0,
    };
    d.num_planes = 1;
    d.bpp[0] = 1;
    d.align_x = 8;
    d.flags = FormatFlags::BITSTREAM;
    d
}

const NO: (u8, u8, i8) = (0, 0, 0);

const fn c(offset: u8, size: u8) -> (u8, u8, i8) {
    (offset, size, 0)
}

const S420: (u8, u8) = (1, 1);
const S422: (u8, u8) = (1, 0);
const S444: (u8, u8) = (0, 0);
const S411: (u8, u8) = (2, 0);

const YUV: [u8; 4] = [1, 2, 3, 0];
const YUVA: [u8; 4] = [1, 2, 3, 4];
const GBR: [u8; 4] = [2, 3, 1, 0];
const GBRA: [u8; 4] = [2, 3, 1, 4];
const Y: [u8; 4] = [1, 0, 0, 0];
const YA: [u8; 4] = [1, 4, 0, 0];

// ===========================================================================
// The table (indexed by ImgFormat discriminant)
// ===========================================================================

use ImgFormat as F;

#[rustfmt::skip]
pub(super) static CATALOG: [FormatDesc; 101] = [
    planar(F::Gray, "gray", Yuv, false, 1, 0, Y, S444, false),
    planar(F::Gray10Le, "gray10le", Yuv, false, 2, -6, Y, S444, false),
    planar(F::Gray10Be, "gray10be", Yuv, false, 2, -6, Y, S444, true),
    planar(F::Gray16Le, "gray16le", Yuv, false, 2, 0, Y, S444, false),
    planar(F::Gray16Be, "gray16be", Yuv, false, 2, 0, Y, S444, true),
    planar(F::GrayF32, "grayf32", Yuv, true, 4, 0, Y, S444, false),
    planar(F::Y1, "y1", Yuv, false, 1, -7, Y, S444, false),
    planar(F::Yap8, "yap8", Yuv, false, 1, 0, YA, S444, false),
    planar(F::Yap16Le, "yap16le", Yuv, false, 2, 0, YA, S444, false),

    planar(F::Yuv420p, "yuv420p", Yuv, false, 1, 0, YUV, S420, false),
    planar(F::Yuv422p, "yuv422p", Yuv, false, 1, 0, YUV, S422, false),
    planar(F::Yuv444p, "yuv444p", Yuv, false, 1, 0, YUV, S444, false),
    planar(F::Yuv411p, "yuv411p", Yuv, false, 1, 0, YUV, S411, false),
    planar(F::Yuv420p10Le, "yuv420p10le", Yuv, false, 2, -6, YUV, S420, false),
    planar(F::Yuv420p10Be, "yuv420p10be", Yuv, false, 2, -6, YUV, S420, true),
    planar(F::Yuv422p10Le, "yuv422p10le", Yuv, false, 2, -6, YUV, S422, false),
    planar(F::Yuv422p10Be, "yuv422p10be", Yuv, false, 2, -6, YUV, S422, true),
    planar(F::Yuv444p10Le, "yuv444p10le", Yuv, false, 2, -6, YUV, S444, false),
    planar(F::Yuv444p10Be, "yuv444p10be", Yuv, false, 2, -6, YUV, S444, true),
    planar(F::Yuv420p16Le, "yuv420p16le", Yuv, false, 2, 0, YUV, S420, false),
    planar(F::Yuv420p16Be, "yuv420p16be", Yuv, false, 2, 0, YUV, S420, true),
    planar(F::Yuv422p16Le, "yuv422p16le", Yuv, false, 2, 0, YUV, S422, false),
    planar(F::Yuv422p16Be, "yuv422p16be", Yuv, false, 2, 0, YUV, S422, true),
    planar(F::Yuv444p16Le, "yuv444p16le", Yuv, false, 2, 0, YUV, S444, false),
    planar(F::Yuv444p16Be, "yuv444p16be", Yuv, false, 2, 0, YUV, S444, true),
    planar(F::Yuva420p, "yuva420p", Yuv, false, 1, 0, YUVA, S420, false),
    planar(F::Yuva444p, "yuva444p", Yuv, false, 1, 0, YUVA, S444, false),
    planar(F::Yuva444p16Le, "yuva444p16le", Yuv, false, 2, 0, YUVA, S444, false),
    planar(F::Yuv420pF32, "yuv420pf", Yuv, true, 4, 0, YUV, S420, false),
    planar(F::Yuv422pF32, "yuv422pf", Yuv, true, 4, 0, YUV, S422, false),
    planar(F::Yuv444pF32, "yuv444pf", Yuv, true, 4, 0, YUV, S444, false),

    planar(F::Gbrp1, "gbrp1", Rgb, false, 1, -7, GBR, S444, false),
    planar(F::Gbrp2, "gbrp2", Rgb, false, 1, -6, GBR, S444, false),
    planar(F::Gbrp3, "gbrp3", Rgb, false, 1, -5, GBR, S444, false),
    planar(F::Gbrp4, "gbrp4", Rgb, false, 1, -4, GBR, S444, false),
    planar(F::Gbrp5, "gbrp5", Rgb, false, 1, -3, GBR, S444, false),
    planar(F::Gbrp6, "gbrp6", Rgb, false, 1, -2, GBR, S444, false),
    planar(F::Gbrp, "gbrp", Rgb, false, 1, 0, GBR, S444, false),
    planar(F::Gbrp10Le, "gbrp10le", Rgb, false, 2, -6, GBR, S444, false),
    planar(F::Gbrp10Be, "gbrp10be", Rgb, false, 2, -6, GBR, S444, true),
    planar(F::Gbrp16Le, "gbrp16le", Rgb, false, 2, 0, GBR, S444, false),
    planar(F::Gbrp16Be, "gbrp16be", Rgb, false, 2, 0, GBR, S444, true),
    planar(F::Gbrap, "gbrap", Rgb, false, 1, 0, GBRA, S444, false),
    planar(F::Gbrap16Le, "gbrap16le", Rgb, false, 2, 0, GBRA, S444, false),
    planar(F::Gbrap16Be, "gbrap16be", Rgb, false, 2, 0, GBRA, S444, true),
    planar(F::GbrpF32, "gbrpf32", Rgb, true, 4, 0, GBR, S444, false),
    planar(F::GbrapF32, "gbrapf32", Rgb, true, 4, 0, GBRA, S444, false),

    packed(F::Rgb24, "rgb24", Rgb, 24, [c(0, 8), c(8, 8), c(16, 8), NO], 0),
    packed(F::Bgr24, "bgr24", Rgb, 24, [c(16, 8), c(8, 8), c(0, 8), NO], 0),
    packed(F::Rgba, "rgba", Rgb, 32, [c(0, 8), c(8, 8), c(16, 8), c(24, 8)], 0),
    packed(F::Bgra, "bgra", Rgb, 32, [c(16, 8), c(8, 8), c(0, 8), c(24, 8)], 0),
    packed(F::Argb, "argb", Rgb, 32, [c(8, 8), c(16, 8), c(24, 8), c(0, 8)], 0),
    packed(F::Abgr, "abgr", Rgb, 32, [c(24, 8), c(16, 8), c(8, 8), c(0, 8)], 0),
    packed(F::Rgb0, "rgb0", Rgb, 32, [c(0, 8), c(8, 8), c(16, 8), NO], 0),
    packed(F::Bgr0, "bgr0", Rgb, 32, [c(16, 8), c(8, 8), c(0, 8), NO], 0),
    packed(F::Zrgb, "0rgb", Rgb, 32, [c(8, 8), c(16, 8), c(24, 8), NO], 0),
    packed(F::Zbgr, "0bgr", Rgb, 32, [c(24, 8), c(16, 8), c(8, 8), NO], 0),
    packed(F::Rgb48Le, "rgb48le", Rgb, 48, [c(0, 16), c(16, 16), c(32, 16), NO], 0),
    packed(F::Rgb48Be, "rgb48be", Rgb, 48, [c(0, 16), c(16, 16), c(32, 16), NO], 1),
    packed(F::Bgr48Le, "bgr48le", Rgb, 48, [c(32, 16), c(16, 16), c(0, 16), NO], 0),
    packed(F::Rgba64Le, "rgba64le", Rgb, 64, [c(0, 16), c(16, 16), c(32, 16), c(48, 16)], 0),
    packed(F::Rgba64Be, "rgba64be", Rgb, 64, [c(0, 16), c(16, 16), c(32, 16), c(48, 16)], 1),
    packed(F::Bgra64Le, "bgra64le", Rgb, 64, [c(32, 16), c(16, 16), c(0, 16), c(48, 16)], 0),
    packed(F::X2Rgb10Le, "x2rgb10le", Rgb, 32, [c(20, 10), c(10, 10), c(0, 10), NO], 0),
    packed(F::X2Rgb10Be, "x2rgb10be", Rgb, 32, [c(20, 10), c(10, 10), c(0, 10), NO], 2),
    packed(F::X2Bgr10Le, "x2bgr10le", Rgb, 32, [c(0, 10), c(10, 10), c(20, 10), NO], 0),

    packed(F::Ya8, "ya8", Yuv, 16, [c(0, 8), NO, NO, c(8, 8)], 0),
    packed(F::Ya16Le, "ya16le", Yuv, 32, [c(0, 16), NO, NO, c(16, 16)], 0),
    packed(F::Ya16Be, "ya16be", Yuv, 32, [c(0, 16), NO, NO, c(16, 16)], 1),
    packed(F::Vuya, "vuya", Yuv, 32, [c(16, 8), c(8, 8), c(0, 8), c(24, 8)], 0),
    packed(F::Ayuv64Le, "ayuv64le", Yuv, 64, [c(16, 16), c(32, 16), c(48, 16), c(0, 16)], 0),

    semi(F::Nv12, "nv12", 1, 0, false, S420, false),
    semi(F::Nv21, "nv21", 1, 0, true, S420, false),
    semi(F::Nv16, "nv16", 1, 0, false, S422, false),
    semi(F::Nv24, "nv24", 1, 0, false, S444, false),
    semi(F::P010Le, "p010le", 2, 6, false, S420, false),
    semi(F::P010Be, "p010be", 2, 6, false, S420, true),
    semi(F::P016Le, "p016le", 2, 0, false, S420, false),
    semi(F::P016Be, "p016be", 2, 0, false, S420, true),

    pal8(),
    mono(F::MonoWhite, "monow"),
    mono(F::MonoBlack, "monob"),

    packed(F::Rgb565Le, "rgb565le", Rgb, 16, [c(11, 5), c(5, 6), c(0, 5), NO], 0),
    packed(F::Rgb565Be, "rgb565be", Rgb, 16, [c(11, 5), c(5, 6), c(0, 5), NO], 1),
    packed(F::Bgr565Le, "bgr565le", Rgb, 16, [c(0, 5), c(5, 6), c(11, 5), NO], 0),
    packed(F::Bgr565Be, "bgr565be", Rgb, 16, [c(0, 5), c(5, 6), c(11, 5), NO], 1),
    packed(F::Rgb555Le, "rgb555le", Rgb, 16, [c(10, 5), c(5, 5), c(0, 5), NO], 0),
    packed(F::Rgb555Be, "rgb555be", Rgb, 16, [c(10, 5), c(5, 5), c(0, 5), NO], 1),
    packed(F::Bgr555Le, "bgr555le", Rgb, 16, [c(0, 5), c(5, 5), c(10, 5), NO], 0),
    packed(F::Rgb444Le, "rgb444le", Rgb, 16, [c(8, 4), c(4, 4), c(0, 4), NO], 0),
    packed(F::Rgb444Be, "rgb444be", Rgb, 16, [c(8, 4), c(4, 4), c(0, 4), NO], 1),
    packed(F::Rgb8, "rgb8", Rgb, 8, [c(5, 3), c(2, 3), c(0, 2), NO], 0),
    packed(F::Bgr8, "bgr8", Rgb, 8, [c(0, 3), c(3, 3), c(6, 2), NO], 0),
    packed(F::Rgb4Byte, "rgb4_byte", Rgb, 8, [c(3, 1), c(1, 2), c(0, 1), NO], 0),
    packed(F::Bgr4Byte, "bgr4_byte", Rgb, 8, [c(0, 1), c(1, 2), c(3, 1), NO], 0),

    packed_yuv(F::Yuyv422, "yuyv422", 16, 2, (8, 0), [0, 16, 0, 0], (8, 24), false),
    packed_yuv(F::Yvyu422, "yvyu422", 16, 2, (8, 0), [0, 16, 0, 0], (24, 8), false),
    packed_yuv(F::Uyvy422, "uyvy422", 16, 2, (8, 0), [8, 24, 0, 0], (0, 16), false),
    packed_yuv(F::Y210Le, "y210le", 32, 2, (16, 6), [0, 32, 0, 0], (16, 48), false),
    packed_yuv(F::Y210Be, "y210be", 32, 2, (16, 6), [0, 32, 0, 0], (16, 48), true),
    packed_yuv(F::Uyyvyy411, "uyyvyy411", 12, 4, (8, 0), [8, 16, 32, 40], (0, 24), false),
];
