//! Image buffers: an owned, 64-byte aligned [`Image`] and the borrowed
//! [`ImageRef`] / [`ImageMut`] views every conversion runs on.
//!
//! Planes must cover the format-aligned extent of the image: width rounded
//! up to the format's `align_x`, height rounded up to its `align_y`. The
//! repacker processes whole alignment groups and relies on those bytes
//! existing.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::csp::{ChromaLocation, ColorRepr};
use crate::error::{ConvertError, SizeError};
use crate::format::{FormatDesc, FormatFlags, ImgFormat, align_up};

/// Alignment of plane starts and strides in [`Image`].
pub const ALIGN: usize = 64;

/// Everything about an image except its memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageParams {
    pub format: ImgFormat,
    pub width: usize,
    pub height: usize,
    pub repr: ColorRepr,
    pub chroma_location: ChromaLocation,
}

impl ImageParams {
    pub fn new(format: ImgFormat, width: usize, height: usize) -> Self {
        Self {
            format,
            width,
            height,
            repr: ColorRepr::default_for(format),
            chroma_location: ChromaLocation::default(),
        }
    }

    pub fn with_repr(mut self, repr: ColorRepr) -> Self {
        self.repr = repr;
        self
    }

    #[inline]
    pub fn desc(&self) -> &'static FormatDesc {
        self.format.desc()
    }
}

// ===========================================================================
// Validation
// ===========================================================================

fn check_planes(params: &ImageParams, lens: &[usize], strides: &[usize]) -> Result<(), SizeError> {
    if params.width == 0 || params.height == 0 {
        return Err(SizeError::ZeroSize);
    }
    let desc = params.desc();
    let n = desc.num_planes as usize;
    if lens.len() < n || strides.len() < n {
        return Err(SizeError::InvalidStride {
            plane: lens.len().min(strides.len()),
        });
    }
    for p in 0..n {
        let row_bytes = desc.plane_row_bytes(p, params.width);
        let rows = desc.plane_rows(p, params.height);
        let stride = strides[p];
        if stride < row_bytes {
            return Err(SizeError::InvalidStride { plane: p });
        }
        let needed = (rows - 1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(row_bytes))
            .ok_or(SizeError::InvalidStride { plane: p })?;
        if lens[p] < needed {
            return Err(SizeError::PlaneTooSmall {
                plane: p,
                needed,
                len: lens[p],
            });
        }
    }
    Ok(())
}

#[inline]
fn is_aligned(plane: &[u8], stride: usize) -> bool {
    (plane.as_ptr() as usize).is_multiple_of(ALIGN) && stride.is_multiple_of(ALIGN)
}

/// Range of plane `p` holding pixel `(x, y)` up to the end of its row.
#[inline]
fn line_range(
    desc: &FormatDesc,
    len: usize,
    stride: usize,
    p: usize,
    x: usize,
    y: usize,
) -> core::ops::Range<usize> {
    let row_start = (y >> desc.ys[p]) * stride;
    let start = desc.pixel_offset(p, x, y, stride);
    start..(row_start + stride).min(len)
}

// ===========================================================================
// Borrowed views
// ===========================================================================

/// Read-only view of an image's planes.
#[derive(Clone, Copy)]
pub struct ImageRef<'a> {
    params: ImageParams,
    planes: [&'a [u8]; 4],
    strides: [usize; 4],
    palette: Option<&'a [u32; 256]>,
}

impl<'a> ImageRef<'a> {
    /// Wrap caller-owned planes. Palette formats need [`ImageRef::new_with_palette`].
    pub fn new(params: ImageParams, planes: &[&'a [u8]], strides: &[usize]) -> Result<Self, SizeError> {
        if params.desc().flags.contains(FormatFlags::PALETTE) {
            return Err(SizeError::MissingPalette);
        }
        Self::build(params, planes, strides, None)
    }

    /// Wrap caller-owned planes plus a palette of `0xAARRGGBB` entries.
    pub fn new_with_palette(
        params: ImageParams,
        planes: &[&'a [u8]],
        strides: &[usize],
        palette: &'a [u32; 256],
    ) -> Result<Self, SizeError> {
        Self::build(params, planes, strides, Some(palette))
    }

    fn build(
        params: ImageParams,
        planes: &[&'a [u8]],
        strides: &[usize],
        palette: Option<&'a [u32; 256]>,
    ) -> Result<Self, SizeError> {
        let lens: Vec<usize> = planes.iter().map(|p| p.len()).collect();
        check_planes(&params, &lens, strides)?;
        let mut ps: [&'a [u8]; 4] = [&[]; 4];
        let mut ss = [0usize; 4];
        let n = params.desc().num_planes as usize;
        ps[..n].copy_from_slice(&planes[..n]);
        ss[..n].copy_from_slice(&strides[..n]);
        Ok(Self {
            params,
            planes: ps,
            strides: ss,
            palette,
        })
    }

    #[inline]
    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    #[inline]
    pub fn format(&self) -> ImgFormat {
        self.params.format
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.params.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.params.height
    }

    #[inline]
    pub fn plane(&self, p: usize) -> &'a [u8] {
        self.planes[p]
    }

    #[inline]
    pub fn stride(&self, p: usize) -> usize {
        self.strides[p]
    }

    #[inline]
    pub fn palette(&self) -> Option<&'a [u32; 256]> {
        self.palette
    }

    /// Row `r` of plane `p` (plane coordinates), one aligned row long.
    pub fn row(&self, p: usize, r: usize) -> &'a [u8] {
        let start = r * self.strides[p];
        let len = self.params.desc().plane_row_bytes(p, self.params.width);
        &self.planes[p][start..start + len]
    }

    /// Plane `p` from pixel `(x, y)` to the end of that row.
    #[inline]
    pub(crate) fn line(&self, p: usize, x: usize, y: usize) -> &'a [u8] {
        let plane = self.planes[p];
        &plane[line_range(self.params.desc(), plane.len(), self.strides[p], p, x, y)]
    }

    /// Start and stride of plane `p` are both [`ALIGN`]-aligned.
    pub fn is_plane_aligned(&self, p: usize) -> bool {
        is_aligned(self.planes[p], self.strides[p])
    }

    /// Rows `y0..y1` as an image of their own. `y0` must be a multiple of
    /// the format's vertical alignment.
    pub fn crop_rows(&self, y0: usize, y1: usize) -> ImageRef<'a> {
        let desc = self.params.desc();
        assert!(y0 < y1 && y1 <= self.params.height);
        assert!(y0.is_multiple_of(desc.align_y as usize));
        let mut planes = self.planes;
        for (p, plane) in planes.iter_mut().enumerate().take(desc.num_planes as usize) {
            let full: &'a [u8] = *plane;
            *plane = &full[(y0 >> desc.ys[p]) * self.strides[p]..];
        }
        ImageRef {
            params: ImageParams {
                height: y1 - y0,
                ..self.params
            },
            planes,
            strides: self.strides,
            palette: self.palette,
        }
    }
}

impl core::fmt::Debug for ImageRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageRef")
            .field("params", &self.params)
            .field("strides", &self.strides)
            .finish_non_exhaustive()
    }
}

/// Mutable view of an image's planes.
pub struct ImageMut<'a> {
    params: ImageParams,
    planes: [&'a mut [u8]; 4],
    strides: [usize; 4],
}

impl<'a> ImageMut<'a> {
    pub fn new(
        params: ImageParams,
        planes: impl IntoIterator<Item = &'a mut [u8]>,
        strides: &[usize],
    ) -> Result<Self, SizeError> {
        let mut ps: [&'a mut [u8]; 4] = Default::default();
        let mut count = 0;
        for (slot, plane) in ps.iter_mut().zip(planes) {
            *slot = plane;
            count += 1;
        }
        let lens: Vec<usize> = ps[..count].iter().map(|p| p.len()).collect();
        check_planes(&params, &lens, strides)?;
        let mut ss = [0usize; 4];
        let n = params.desc().num_planes as usize;
        ss[..n].copy_from_slice(&strides[..n]);
        for plane in &mut ps[n..] {
            *plane = &mut [];
        }
        Ok(Self {
            params,
            planes: ps,
            strides: ss,
        })
    }

    #[inline]
    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    #[inline]
    pub fn format(&self) -> ImgFormat {
        self.params.format
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.params.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.params.height
    }

    #[inline]
    pub fn stride(&self, p: usize) -> usize {
        self.strides[p]
    }

    #[inline]
    pub fn plane(&self, p: usize) -> &[u8] {
        self.planes[p]
    }

    #[inline]
    pub fn plane_mut(&mut self, p: usize) -> &mut [u8] {
        self.planes[p]
    }

    /// Row `r` of plane `p` (plane coordinates), one aligned row long.
    pub fn row_mut(&mut self, p: usize, r: usize) -> &mut [u8] {
        let start = r * self.strides[p];
        let len = self.params.desc().plane_row_bytes(p, self.params.width);
        &mut self.planes[p][start..start + len]
    }

    #[inline]
    pub(crate) fn line_mut(&mut self, p: usize, x: usize, y: usize) -> &mut [u8] {
        let range = line_range(
            self.params.desc(),
            self.planes[p].len(),
            self.strides[p],
            p,
            x,
            y,
        );
        &mut self.planes[p][range]
    }

    /// One line per plane starting at pixel `(x, y)`; absent planes are empty.
    pub(crate) fn lines_mut(&mut self, x: usize, y: usize) -> [&mut [u8]; 4] {
        let desc = self.params.desc();
        let strides = self.strides;
        let mut p = 0;
        self.planes.each_mut().map(|plane| {
            let range = line_range(desc, plane.len(), strides[p], p, x, y);
            p += 1;
            &mut plane[range]
        })
    }

    pub fn is_plane_aligned(&self, p: usize) -> bool {
        is_aligned(self.planes[p], self.strides[p])
    }

    /// Shorter-lived mutable view of the same memory.
    pub fn reborrow(&mut self) -> ImageMut<'_> {
        ImageMut {
            params: self.params,
            planes: self.planes.each_mut().map(|p| &mut **p),
            strides: self.strides,
        }
    }

    pub fn as_ref(&self) -> ImageRef<'_> {
        ImageRef {
            params: self.params,
            planes: self.planes.each_ref().map(|p| &**p),
            strides: self.strides,
            palette: None,
        }
    }

    /// Split into disjoint horizontal bands ending at each of `cuts` and at
    /// the image height. Cuts must be increasing multiples of the format's
    /// vertical alignment.
    pub fn split_rows(self, cuts: &[usize]) -> Vec<ImageMut<'a>> {
        let desc = self.params.desc();
        let h = self.params.height;
        let mut rest = self.planes;
        let mut bands = Vec::with_capacity(cuts.len() + 1);
        let mut y = 0;
        for &cut in cuts.iter().chain(core::iter::once(&h)) {
            assert!(cut > y && cut <= h, "band {y}..{cut} out of order");
            assert!(cut == h || cut.is_multiple_of(desc.align_y as usize));
            let mut planes: [&'a mut [u8]; 4] = Default::default();
            for (p, slot) in planes.iter_mut().enumerate() {
                let plane = core::mem::take(&mut rest[p]);
                let at = if cut == h {
                    plane.len()
                } else {
                    (((cut - y) >> desc.ys[p]) * self.strides[p]).min(plane.len())
                };
                let (head, tail) = plane.split_at_mut(at);
                *slot = head;
                rest[p] = tail;
            }
            bands.push(ImageMut {
                params: ImageParams {
                    height: cut - y,
                    ..self.params
                },
                planes,
                strides: self.strides,
            });
            y = cut;
        }
        bands
    }
}

impl core::fmt::Debug for ImageMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageMut")
            .field("params", &self.params)
            .field("strides", &self.strides)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Owned image
// ===========================================================================

#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C, align(64))]
struct Block([u8; ALIGN]);

/// Image with its own zero-initialized planes. Plane starts and strides are
/// [`ALIGN`]-aligned.
#[derive(Clone)]
pub struct Image {
    params: ImageParams,
    planes: [Vec<Block>; 4],
    strides: [usize; 4],
    palette: Option<Box<[u32; 256]>>,
}

impl Image {
    /// Allocate zeroed planes for `params`; fails instead of aborting when
    /// memory runs out.
    pub fn try_new(params: ImageParams) -> Result<Self, ConvertError> {
        if params.width == 0 || params.height == 0 {
            return Err(SizeError::ZeroSize.into());
        }
        let desc = params.desc();
        let mut planes: [Vec<Block>; 4] = Default::default();
        let mut strides = [0usize; 4];
        for p in 0..desc.num_planes as usize {
            let stride = align_up(desc.plane_row_bytes(p, params.width), ALIGN);
            let blocks = stride / ALIGN * desc.plane_rows(p, params.height);
            let mut v = Vec::new();
            v.try_reserve_exact(blocks)
                .map_err(|_| ConvertError::Allocation)?;
            v.resize(blocks, Block([0; ALIGN]));
            planes[p] = v;
            strides[p] = stride;
        }
        let palette = desc
            .flags
            .contains(FormatFlags::PALETTE)
            .then(|| Box::new([0u32; 256]));
        Ok(Self {
            params,
            planes,
            strides,
            palette,
        })
    }

    #[inline]
    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    /// Change the color metadata without touching pixels.
    pub fn set_repr(&mut self, repr: ColorRepr) {
        self.params.repr = repr;
    }

    #[inline]
    pub fn stride(&self, p: usize) -> usize {
        self.strides[p]
    }

    #[inline]
    pub fn plane(&self, p: usize) -> &[u8] {
        bytemuck::cast_slice(&self.planes[p])
    }

    #[inline]
    pub fn plane_mut(&mut self, p: usize) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.planes[p])
    }

    pub fn palette_mut(&mut self) -> Option<&mut [u32; 256]> {
        self.palette.as_deref_mut()
    }

    pub fn view(&self) -> ImageRef<'_> {
        ImageRef {
            params: self.params,
            planes: self
                .planes
                .each_ref()
                .map(|p| bytemuck::cast_slice::<Block, u8>(p)),
            strides: self.strides,
            palette: self.palette.as_deref(),
        }
    }

    pub fn view_mut(&mut self) -> ImageMut<'_> {
        ImageMut {
            params: self.params,
            planes: self
                .planes
                .each_mut()
                .map(|p| bytemuck::cast_slice_mut::<Block, u8>(p)),
            strides: self.strides,
        }
    }
}

impl core::fmt::Debug for Image {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Image")
            .field("params", &self.params)
            .field("strides", &self.strides)
            .finish_non_exhaustive()
    }
}
