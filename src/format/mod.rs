//! Pixel-format catalog.
//!
//! Every [`ImgFormat`] id maps to a static [`FormatDesc`] describing where
//! each component lives (plane, bit offset, bit size, padding), how the
//! planes are subsampled, and which special handling the format needs
//! (palette, bitstream, packed subsampled YUV, big-endian words).
//!
//! Multi-byte samples are little-endian unless the descriptor carries a
//! non-zero [`endian_shift`](FormatDesc::endian_shift); component offsets of
//! packed formats always describe the little-endian word value.

mod catalog;

pub use catalog::ImgFormat;

use catalog::CATALOG;


// ===========================================================================
// Descriptor types
// ===========================================================================

/// Format property bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormatFlags(u16);

impl FormatFlags {
    /// `comps` describes the pixel layout.
    pub const HAS_COMPONENTS: Self = Self(1 << 0);
    /// Samples are IEEE floats.
    pub const FLOAT: Self = Self(1 << 1);
    /// 8-bit indices into a 256-entry palette.
    pub const PALETTE: Self = Self(1 << 2);
    /// Sub-byte pixels (1 bit per pixel, MSB first).
    pub const BITSTREAM: Self = Self(1 << 3);
    /// Packed YUV with horizontally subsampled chroma (YUYV and friends).
    pub const PACKED_SS_YUV: Self = Self(1 << 4);
    /// Has an alpha component.
    pub const ALPHA: Self = Self(1 << 5);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for FormatFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Color model of a format. Gray formats are [`ColorFamily::Yuv`] with only
/// a luma (and maybe alpha) component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    Rgb,
    Yuv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Uint,
    Float,
}

/// Location of one logical component.
///
/// Offsets and sizes are in bits. `pad` is the number of unused bits that
/// come with the component: negative means the value sits in the low bits of
/// a wider container (10-bit in 16), positive means it sits in the high bits
/// (P010).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompDesc {
    pub plane: u8,
    pub offset: u8,
    pub size: u8,
    pub pad: i8,
}

impl CompDesc {
    pub const NONE: Self = Self {
        plane: 0,
        offset: 0,
        size: 0,
        pad: 0,
    };

    #[inline]
    pub const fn is_present(&self) -> bool {
        self.size != 0
    }
}

/// Static description of a pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDesc {
    pub id: ImgFormat,
    pub name: &'static str,
    pub flags: FormatFlags,
    pub family: ColorFamily,
    pub num_planes: u8,
    /// Bits per pixel of each plane, counted in that plane's own resolution.
    pub bpp: [u8; 4],
    /// Horizontal subsampling shift of each plane.
    pub xs: [u8; 4],
    /// Vertical subsampling shift of each plane.
    pub ys: [u8; 4],
    pub chroma_xs: u8,
    pub chroma_ys: u8,
    /// Pixel x coordinates and widths handed to the repacker must be
    /// multiples of this.
    pub align_x: u8,
    /// Pixel y coordinates handed to the repacker must be multiples of this.
    pub align_y: u8,
    /// 0 for little-endian or byte-sized layouts, otherwise log2 of the
    /// big-endian word size in bytes.
    pub endian_shift: u8,
    /// Indexed by component id - 1 (R/Y, G/Cb, B/Cr, A).
    pub comps: [CompDesc; 4],
    /// Bit offsets of the luma samples inside one group of a packed
    /// subsampled YUV format.
    pub luma_offsets: [u8; 4],
}

impl FormatDesc {
    #[inline]
    pub const fn is_big_endian(&self) -> bool {
        self.endian_shift != 0
    }

    #[inline]
    pub const fn is_float(&self) -> bool {
        self.flags.contains(FormatFlags::FLOAT)
    }

    pub fn num_components(&self) -> usize {
        self.comps.iter().filter(|c| c.is_present()).count()
    }

    /// Bytes one row of plane `p` occupies for an image `width` pixels wide,
    /// after rounding the width up to the format's horizontal alignment.
    pub fn plane_row_bytes(&self, p: usize, width: usize) -> usize {
        let w = align_up(width, self.align_x as usize) >> self.xs[p];
        (w * self.bpp[p] as usize).div_ceil(8)
    }

    /// Rows of plane `p` for an image `height` pixels tall, after rounding
    /// the height up to the format's vertical alignment.
    pub fn plane_rows(&self, p: usize, height: usize) -> usize {
        align_up(height, self.align_y as usize) >> self.ys[p]
    }

    /// Byte offset of luma-coordinate pixel `(x, y)` inside plane `p`.
    #[inline]
    pub fn pixel_offset(&self, p: usize, x: usize, y: usize, stride: usize) -> usize {
        (y >> self.ys[p]) * stride + ((x >> self.xs[p]) * self.bpp[p] as usize) / 8
    }

    /// Bytes covered by `w` pixels of plane `p` (rounded up to whole bytes).
    #[inline]
    pub fn plane_bytes(&self, p: usize, w: usize) -> usize {
        let xs = self.xs[p];
        let n = (w + (1 << xs) - 1) >> xs;
        (n * self.bpp[p] as usize).div_ceil(8)
    }

    /// Lines of plane `p` touched by one repack call at an aligned y.
    #[inline]
    pub fn plane_lines(&self, p: usize) -> usize {
        (1usize << self.chroma_ys) - (1usize << self.ys[p]) + 1
    }

    /// Describe this format as uniformly sized whole components, if it is one.
    ///
    /// Palette, bitstream, packed subsampled YUV and big-endian formats never
    /// qualify, and neither do layouts whose components differ in size or
    /// padding.
    pub fn regular(&self) -> Option<RegularLayout> {
        if !self.flags.contains(FormatFlags::HAS_COMPONENTS)
            || self.flags.intersects(
                FormatFlags::PALETTE
                    .union(FormatFlags::BITSTREAM)
                    .union(FormatFlags::PACKED_SS_YUV),
            )
            || self.is_big_endian()
        {
            return None;
        }

        let mut present = self.comps.iter().filter(|c| c.is_present());
        let first = *present.next()?;
        if present.any(|c| c.size != first.size || c.pad != first.pad) {
            return None;
        }
        let size = first.size;
        if !matches!(size, 8 | 16 | 32) {
            return None;
        }
        let component_type = if self.is_float() {
            if size != 32 {
                return None;
            }
            ComponentType::Float
        } else {
            ComponentType::Uint
        };

        let mut planes = [PlaneLayout::default(); 4];
        for p in 0..self.num_planes as usize {
            let bits = self.bpp[p];
            if bits % size != 0 {
                return None;
            }
            let n = bits / size;
            if n == 0 || n > 4 {
                return None;
            }
            planes[p].num_components = n;
        }
        for (i, c) in self.comps.iter().enumerate() {
            if !c.is_present() {
                continue;
            }
            if c.offset % size != 0 {
                return None;
            }
            let slot = (c.offset / size) as usize;
            let plane = planes.get_mut(c.plane as usize)?;
            if slot >= plane.num_components as usize || plane.components[slot] != 0 {
                return None;
            }
            plane.components[slot] = i as u8 + 1;
        }

        Some(RegularLayout {
            family: self.family,
            component_type,
            component_size: size / 8,
            component_pad: first.pad,
            num_planes: self.num_planes,
            planes,
            chroma_xs: self.chroma_xs,
            chroma_ys: self.chroma_ys,
        })
    }
}

/// Components of one plane of a [`RegularLayout`], in memory order.
/// Id 0 marks a padding slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlaneLayout {
    pub num_components: u8,
    pub components: [u8; 4],
}

impl PlaneLayout {
    pub const fn single(id: u8) -> Self {
        Self {
            num_components: 1,
            components: [id, 0, 0, 0],
        }
    }
}

/// A format made of equally sized whole components (1, 2 or 4 bytes each).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegularLayout {
    pub family: ColorFamily,
    pub component_type: ComponentType,
    /// Bytes per component.
    pub component_size: u8,
    pub component_pad: i8,
    pub num_planes: u8,
    pub planes: [PlaneLayout; 4],
    pub chroma_xs: u8,
    pub chroma_ys: u8,
}

impl RegularLayout {
    /// Significant bits per component.
    pub const fn depth(&self) -> u8 {
        let bits = self.component_size as i16 * 8;
        let pad = if self.component_pad < 0 {
            self.component_pad as i16
        } else {
            0
        };
        (bits + pad) as u8
    }

    /// Every plane holds exactly one real component.
    pub fn is_planar(&self) -> bool {
        self.num_planes <= 4
            && self.planes[..self.num_planes as usize]
                .iter()
                .all(|p| p.num_components == 1 && (1..=4).contains(&p.components[0]))
    }

    /// Uint planar layout with `n` planes, G/B/R/A plane order.
    pub(crate) fn gbrp(depth: u8, n: u8) -> Self {
        let mut planes = [PlaneLayout::default(); 4];
        for (p, id) in [2, 3, 1, 4].into_iter().take(n as usize).enumerate() {
            planes[p] = PlaneLayout::single(id);
        }
        Self::uint_planar(ColorFamily::Rgb, depth, n, planes)
    }

    /// Uint planar layout with `n` planes, Y/U/V/A plane order (Y/A for two).
    pub(crate) fn yuvp(depth: u8, n: u8) -> Self {
        let mut planes = [PlaneLayout::default(); 4];
        for (p, id) in [1, 2, 3, 4].into_iter().take(n as usize).enumerate() {
            planes[p] = PlaneLayout::single(id);
        }
        if n == 2 {
            planes[1] = PlaneLayout::single(4);
        }
        Self::uint_planar(ColorFamily::Yuv, depth, n, planes)
    }

    fn uint_planar(family: ColorFamily, depth: u8, n: u8, planes: [PlaneLayout; 4]) -> Self {
        let size = if depth > 8 { 2 } else { 1 };
        Self {
            family,
            component_type: ComponentType::Uint,
            component_size: size,
            component_pad: depth as i8 - (size as i8 * 8),
            num_planes: n,
            planes,
            chroma_xs: 0,
            chroma_ys: 0,
        }
    }
}

// ===========================================================================
// Lookup
// ===========================================================================

impl ImgFormat {
    /// Static descriptor of this format.
    #[inline]
    pub fn desc(self) -> &'static FormatDesc {
        &CATALOG[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.desc().name
    }

    /// Integer id of this format.
    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        CATALOG.get(id as usize).map(|d| d.id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().find(|d| d.name == name).map(|d| d.id)
    }

    /// All catalogued formats, in id order.
    pub fn all() -> impl Iterator<Item = ImgFormat> {
        CATALOG.iter().map(|d| d.id)
    }

    /// The same layout stored with the other byte order, if catalogued.
    pub fn other_endian(self) -> Option<Self> {
        let name = self.name();
        let (stem, want) = if let Some(stem) = name.strip_suffix("le") {
            (stem, "be")
        } else if let Some(stem) = name.strip_suffix("be") {
            (stem, "le")
        } else {
            return None;
        };
        CATALOG
            .iter()
            .find(|d| d.name.strip_suffix(want) == Some(stem))
            .map(|d| d.id)
    }

    #[inline]
    pub fn regular(self) -> Option<RegularLayout> {
        self.desc().regular()
    }
}

impl core::fmt::Display for ImgFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the catalogued format described by `layout`.
pub fn find_regular(layout: &RegularLayout) -> Option<ImgFormat> {
    CATALOG
        .iter()
        .find(|d| d.regular().as_ref() == Some(layout))
        .map(|d| d.id)
}

#[inline]
pub(crate) const fn align_up(v: usize, a: usize) -> usize {
    v.div_ceil(a) * a
}
