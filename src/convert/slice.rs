//! One horizontal band of a conversion: a filter graph fed by an unpacking
//! repacker and drained by a packing one.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::ops::Range;

use crate::error::{ConvertError, Direction};
use crate::format::{ColorFamily, ComponentType, align_up};
use crate::image::{Image, ImageMut, ImageParams, ImageRef};
use crate::repack::{RepackPlan, Repacker};
use crate::resample::{ActiveRegion, FilterGraph, GraphFamily, GraphSink, GraphSource, PixelType, PlanarFormat, Resampler};

/// Engine view of the planar side of `plan` for user images like `user`.
///
/// Returns the format plus, per engine plane, the planar plane holding it.
pub(crate) fn describe(plan: &RepackPlan, user: &ImageParams) -> Option<(PlanarFormat, [Option<usize>; 4])> {
    let layout = plan.planar_format().regular()?;
    if !layout.is_planar() {
        return None;
    }
    let pixel_type = match (layout.component_type, layout.component_size) {
        (ComponentType::Uint, 1) => PixelType::Byte,
        (ComponentType::Uint, 2) => PixelType::Word,
        (ComponentType::Float, 4) => PixelType::Float,
        _ => return None,
    };

    let mut z_planes = [None; 4];
    let mut planes = [false; 4];
    for n in 0..layout.num_planes as usize {
        let c = layout.planes[n].components[0] as usize - 1;
        z_planes[c] = Some(n);
        planes[c] = true;
    }
    let family = if !planes[1] && !planes[2] {
        GraphFamily::Gray
    } else if layout.family == ColorFamily::Rgb || user.repr.is_rgb() {
        GraphFamily::Rgb
    } else {
        GraphFamily::Yuv
    };

    let align_x = plan.align_x().max(1 << layout.chroma_xs);
    let align_y = plan.align_y().max(1 << layout.chroma_ys);
    let format = PlanarFormat {
        width: align_up(user.width, align_x),
        height: align_up(user.height, align_y),
        pixel_type,
        depth: layout.depth(),
        subsample_w: layout.chroma_xs,
        subsample_h: layout.chroma_ys,
        family,
        planes,
        repr: user.repr,
        chroma_location: user.chroma_location,
        active: ActiveRegion::full(user.width, user.height),
    };
    Some((format, z_planes))
}

/// Row mask and scratch height for a side the graph wants `lines` rows of
/// at once, out of `full`.
pub(crate) fn buffer_mask(lines: usize, full: usize) -> (usize, usize) {
    let rows = lines.max(1).next_power_of_two();
    if rows >= full {
        (usize::MAX, full)
    } else {
        (rows - 1, rows)
    }
}

/// Repacker plus the planar scratch rows the graph reads or writes.
#[derive(Debug)]
struct SliceSide {
    repacker: Repacker,
    user: ImageParams,
    z_planes: [Option<usize>; 4],
    ys: [u8; 4],
    mask: usize,
    tmp: Image,
    /// Planar planes the graph addresses in the user image itself.
    direct: [bool; 4],
}

impl SliceSide {
    fn new(
        plan: &Arc<RepackPlan>,
        format: &PlanarFormat,
        z_planes: [Option<usize>; 4],
        user: ImageParams,
        lines: usize,
    ) -> Result<Self, ConvertError> {
        let (mask, rows) = buffer_mask(lines.max(format.row_group()), format.height);
        let planar = plan.planar_format();
        let tmp = Image::try_new(ImageParams {
            format: planar,
            width: format.width,
            height: rows,
            ..user
        })?;
        Ok(Self {
            repacker: Repacker::new(Arc::clone(plan)),
            user,
            z_planes,
            ys: planar.desc().ys,
            mask,
            tmp,
            direct: [false; 4],
        })
    }

    /// Bind the repacker to this frame's user buffers. `aligned` lists the
    /// user planes eligible for passthrough.
    fn bind(&mut self, aligned: [bool; 4]) -> Result<(), ConvertError> {
        let mut granted = aligned;
        let tmp = *self.tmp.params();
        if self.repacker.plan().is_pack() {
            self.repacker.configure(&self.user, &tmp, Some(&mut granted))?;
        } else {
            self.repacker.configure(&tmp, &self.user, Some(&mut granted))?;
        }
        self.direct = granted;
        Ok(())
    }

    #[inline]
    fn tmp_row(&self, n: usize, row: usize) -> usize {
        row & (self.mask >> self.ys[n])
    }
}

/// Unpacks user rows into scratch on request.
struct Unpacker<'s, 'u> {
    side: &'s mut SliceSide,
    user: &'s ImageRef<'u>,
}

impl GraphSource for Unpacker<'_, '_> {
    fn request(&mut self, row: usize, x0: usize, x1: usize) {
        let side = &mut *self.side;
        let mut tmp = side.tmp.view_mut();
        side.repacker
            .repack_line(&mut tmp, self.user, x0, row & side.mask, x0, row, x1 - x0);
    }

    fn row(&self, plane: usize, row: usize) -> &[u8] {
        let Some(n) = self.side.z_planes[plane] else {
            return &[];
        };
        if self.side.direct[n] {
            self.user.row(n, row)
        } else {
            self.side.tmp.view().row(n, self.side.tmp_row(n, row))
        }
    }
}

/// Packs committed scratch rows into the user image.
struct Packer<'s, 'u> {
    side: &'s mut SliceSide,
    user: &'s mut ImageMut<'u>,
}

impl GraphSink for Packer<'_, '_> {
    fn row_mut(&mut self, plane: usize, row: usize) -> &mut [u8] {
        let Some(n) = self.side.z_planes[plane] else {
            return &mut [];
        };
        if self.side.direct[n] {
            return self.user.row_mut(n, row);
        }
        let r = self.side.tmp_row(n, row);
        let tmp = &mut self.side.tmp;
        let params = *tmp.params();
        let stride = tmp.stride(n);
        let len = params.desc().plane_row_bytes(n, params.width);
        &mut tmp.plane_mut(n)[r * stride..r * stride + len]
    }

    fn commit(&mut self, row: usize, x0: usize, x1: usize) {
        let side = &mut *self.side;
        let tmp = side.tmp.view();
        side.repacker
            .repack_line(self.user, &tmp, x0, row, x0, row & side.mask, x1 - x0);
    }
}

/// Converts rows `rows` of the destination from the whole source.
///
/// Owns everything it touches during a conversion (graph, repackers,
/// scratch), so independent slices can run on different threads.
pub struct SliceConverter {
    rows: Range<usize>,
    passthrough: bool,
    src: SliceSide,
    dst: SliceSide,
    graph: Box<dyn FilterGraph>,
}

impl SliceConverter {
    /// Build the graph for destination rows `rows` of a `dst` image made
    /// from a `src` image.
    pub fn new(
        resampler: &dyn Resampler,
        (dst_plan, src_plan): (&Arc<RepackPlan>, &Arc<RepackPlan>),
        dst: &ImageParams,
        src: &ImageParams,
        rows: Range<usize>,
        passthrough: bool,
    ) -> Result<Self, ConvertError> {
        assert!(!rows.is_empty() && rows.end <= dst.height);
        let band = ImageParams {
            height: rows.len(),
            ..*dst
        };
        let (dst_fmt, dst_z) = describe(dst_plan, &band).ok_or(ConvertError::UnsupportedFormat {
            format: dst.format,
            direction: Direction::Pack,
        })?;
        let (mut src_fmt, src_z) = describe(src_plan, src).ok_or(ConvertError::UnsupportedFormat {
            format: src.format,
            direction: Direction::Unpack,
        })?;

        let ratio = src.height as f64 / dst.height as f64;
        src_fmt.active = ActiveRegion {
            left: 0.0,
            top: rows.start as f64 * ratio,
            width: src.width as f64,
            height: rows.len() as f64 * ratio,
        };

        let graph = resampler.build_graph(&src_fmt, &dst_fmt)?;
        let src_side = SliceSide::new(src_plan, &src_fmt, src_z, *src, graph.input_buffering())?;
        let dst_side = SliceSide::new(dst_plan, &dst_fmt, dst_z, band, graph.output_buffering())?;

        Ok(Self {
            rows,
            passthrough,
            src: src_side,
            dst: dst_side,
            graph,
        })
    }

    /// Destination rows this slice produces.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Scratch rows of the source and destination side; `usize::MAX` row
    /// masks mean the whole image is buffered.
    pub fn buffer_masks(&self) -> (usize, usize) {
        (self.src.mask, self.dst.mask)
    }

    /// Fill `dst`, this slice's band of the destination, from `src`.
    pub fn convert(&mut self, dst: &mut ImageMut<'_>, src: &ImageRef<'_>) -> Result<(), ConvertError> {
        let pt = self.passthrough;
        let src_aligned = core::array::from_fn(|p| pt && p < src.params().desc().num_planes as usize && src.is_plane_aligned(p));
        let dst_aligned = core::array::from_fn(|p| pt && p < dst.params().desc().num_planes as usize && dst.is_plane_aligned(p));
        self.src.bind(src_aligned)?;
        self.dst.bind(dst_aligned)?;

        let mut source = Unpacker {
            side: &mut self.src,
            user: src,
        };
        let mut sink = Packer {
            side: &mut self.dst,
            user: dst,
        };
        self.graph.process(&mut source, &mut sink);
        Ok(())
    }

    /// Planes of the (source, destination) planar side read or written in
    /// the user images directly during the last conversion.
    pub fn direct_planes(&self) -> ([bool; 4], [bool; 4]) {
        (self.src.direct, self.dst.direct)
    }
}

impl core::fmt::Debug for SliceConverter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SliceConverter")
            .field("rows", &self.rows)
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish_non_exhaustive()
    }
}
