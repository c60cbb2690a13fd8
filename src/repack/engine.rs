//! The repack engine: binds a [`RepackPlan`] to buffers and runs its steps
//! one line group at a time.

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::trace;

use super::bswap::swap_words;
use super::kernels::{float_to_int, int_to_float, pack_line, unpack_line};
use super::{RepackPlan, StepKind};
use crate::csp::ColorRepr;
use crate::error::ConvertError;
use crate::format::{FormatDesc, ImgFormat, align_up};
use crate::image::{Image, ImageMut, ImageParams, ImageRef};

/// One of the two caller images handed to [`Repacker::repack_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Src,
    Dst,
}

/// Where a step reads or writes.
///
/// Caller buffers are addressed at the caller's coordinates; scratch buffers
/// are one line group tall and always addressed from (0, 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferRef {
    Caller(Side),
    Scratch(usize),
}

impl BufferRef {
    #[inline]
    fn is_caller(self) -> bool {
        matches!(self, BufferRef::Caller(_))
    }
}

/// Float range mapping per planar plane, valid for one color representation.
#[derive(Clone, Copy, Debug)]
struct CachedScale {
    repr: ColorRepr,
    m: [f32; 4],
    o: [f32; 4],
    pmax: [u32; 4],
}

impl CachedScale {
    fn new(plan: &RepackPlan, repr: ColorRepr) -> Option<Self> {
        let layout = plan.planar_int().regular()?;
        let bits = layout.depth() as u32;
        let mut scale = Self {
            repr,
            m: [0.0; 4],
            o: [0.0; 4],
            pmax: [0; 4],
        };
        for p in 0..layout.num_planes as usize {
            let (m, o) = repr.uint_mul(bits, layout.planes[p].components[0]);
            if plan.is_pack() {
                scale.m[p] = (1.0 / m) as f32;
                scale.o[p] = -o as f32;
            } else {
                scale.m[p] = m as f32;
                scale.o[p] = o as f32;
            }
            scale.pmax[p] = ((1u64 << bits) - 1) as u32;
        }
        Some(scale)
    }
}

/// Runs a [`RepackPlan`] against caller images.
///
/// Call [`configure`](Self::configure) with the parameters of the images
/// that will be passed to [`repack_line`](Self::repack_line); reconfigure
/// whenever they change.
#[derive(Debug)]
pub struct Repacker {
    plan: Arc<RepackPlan>,
    /// Input and output buffer of every step.
    bufs: Vec<[BufferRef; 2]>,
    scratch: Vec<Image>,
    /// Planes the repack step copies verbatim around its kernel.
    copy_plane: [bool; 4],
    scale: Option<CachedScale>,
    configured: bool,
}

impl Repacker {
    pub fn new(plan: Arc<RepackPlan>) -> Self {
        Self {
            plan,
            bufs: Vec::new(),
            scratch: Vec::new(),
            copy_plane: [false; 4],
            scale: None,
            configured: false,
        }
    }

    #[inline]
    pub fn plan(&self) -> &Arc<RepackPlan> {
        &self.plan
    }

    /// Buffer bindings of each step, valid after a successful
    /// [`configure`](Self::configure).
    #[inline]
    pub fn bindings(&self) -> &[[BufferRef; 2]] {
        &self.bufs
    }

    /// Bind the plan to images with parameters `dst` and `src`.
    ///
    /// `passthrough`, if given, lists the planar-side planes the caller would
    /// like to skip copying because it hands the caller's own plane to the
    /// other side directly. On return it holds the planes for which that was
    /// granted; [`repack_line`](Self::repack_line) leaves those planes alone.
    pub fn configure(
        &mut self,
        dst: &ImageParams,
        src: &ImageParams,
        passthrough: Option<&mut [bool; 4]>,
    ) -> Result<(), ConvertError> {
        self.configured = false;
        let plan = Arc::clone(&self.plan);

        for (expected, actual) in [
            (plan.dst_format(), dst.format),
            (plan.src_format(), src.format),
        ] {
            if expected != actual {
                return Err(ConvertError::FormatMismatch { expected, actual });
            }
        }

        let buf_w = dst.width.max(src.width);
        let steps = plan.steps();
        let last = steps.len() - 1;

        self.bufs.clear();
        let mut used = 0;
        let mut prev_out = BufferRef::Caller(Side::Src);
        for (n, step) in steps.iter().enumerate() {
            let input = prev_out;
            let output = if n == last {
                BufferRef::Caller(Side::Dst)
            } else if step.kind == StepKind::Endian && !input.is_caller() {
                input
            } else {
                let params = ImageParams::new(step.output, buf_w, step.output.desc().align_y as usize);
                let reusable = self.scratch.get(used).is_some_and(|img| {
                    let old = img.params();
                    (old.format, old.width, old.height) == (params.format, params.width, params.height)
                });
                if !reusable {
                    let img = Image::try_new(params)?;
                    if used < self.scratch.len() {
                        self.scratch[used] = img;
                    } else {
                        self.scratch.push(img);
                    }
                }
                used += 1;
                BufferRef::Scratch(used - 1)
            };
            self.bufs.push([input, output]);
            prev_out = output;
        }
        self.scratch.truncate(used);

        let may_passthrough = steps.len() == 1 && steps[0].kind == StepKind::Repack;
        let kernel = plan.kernel();
        let planar_planes = plan.planar_int().desc().num_planes as usize;
        let mut hint = passthrough;
        for p in 0..4 {
            if p < planar_planes {
                let copies = kernel.writes_plane(p);
                let wanted = hint.as_ref().is_some_and(|h| h[p]);
                let can_pt = may_passthrough && !copies && wanted;
                self.copy_plane[p] = !copies && !can_pt;
                if let Some(h) = hint.as_deref_mut() {
                    h[p] = can_pt;
                }
            } else {
                self.copy_plane[p] = false;
                if let Some(h) = hint.as_deref_mut() {
                    h[p] = false;
                }
            }
        }

        if plan.float_int_bytes().is_some() {
            let repr = if plan.is_pack() { dst.repr } else { src.repr };
            if self.scale.is_none_or(|s| s.repr != repr) {
                self.scale = CachedScale::new(&plan, repr);
            }
        }

        trace!(
            "repacker {} -> {}: bindings {:?}, copy planes {:?}",
            plan.src_format(),
            plan.dst_format(),
            self.bufs,
            self.copy_plane
        );
        self.configured = true;
        Ok(())
    }

    /// Convert `w` pixels of one line group: source pixel `(src_x, src_y)`
    /// onward into destination pixel `(dst_x, dst_y)` onward.
    ///
    /// Coordinates must be multiples of the plan's alignment, and `dst`/`src`
    /// must match the parameters given to [`configure`](Self::configure).
    /// Violations panic.
    #[allow(clippy::too_many_arguments)]
    pub fn repack_line(
        &mut self,
        dst: &mut ImageMut<'_>,
        src: &ImageRef<'_>,
        dst_x: usize,
        dst_y: usize,
        src_x: usize,
        src_y: usize,
        w: usize,
    ) {
        assert!(self.configured, "repack_line on an unconfigured repacker");
        let plan = Arc::clone(&self.plan);
        let first_in = plan.src_format().desc();
        let last_out = plan.dst_format().desc();
        assert!(dst_x + w <= align_up(dst.width(), last_out.align_x as usize));
        assert!(src_x + w <= align_up(src.width(), first_in.align_x as usize));
        assert!(dst_y < dst.height() && src_y < src.height());
        assert!(dst_x.is_multiple_of(last_out.align_x as usize));
        assert!(src_x.is_multiple_of(first_in.align_x as usize));
        assert!(w.is_multiple_of(1 << first_in.chroma_xs));
        assert!(dst_y.is_multiple_of(last_out.align_y as usize));
        assert!(src_y.is_multiple_of(first_in.align_y as usize));

        for (n, step) in plan.steps().iter().enumerate() {
            let [input, output] = self.bufs[n];
            let (sx, sy) = if input.is_caller() { (src_x, src_y) } else { (0, 0) };
            let (dx, dy) = if output.is_caller() { (dst_x, dst_y) } else { (0, 0) };
            let at = Coords { sx, sy, dx, dy, w };

            match output {
                BufferRef::Caller(_) => {
                    let mut out = dst.reborrow();
                    match input {
                        BufferRef::Caller(_) => {
                            run_step(&plan, &self.copy_plane, self.scale.as_ref(), step.kind, src, &mut out, at)
                        }
                        BufferRef::Scratch(i) => {
                            let inp = self.scratch[i].view();
                            run_step(&plan, &self.copy_plane, self.scale.as_ref(), step.kind, &inp, &mut out, at);
                        }
                    }
                }
                BufferRef::Scratch(j) => {
                    let (head, tail) = self.scratch.split_at_mut(j);
                    let mut out = tail[0].view_mut();
                    match input {
                        BufferRef::Caller(_) => {
                            run_step(&plan, &self.copy_plane, self.scale.as_ref(), step.kind, src, &mut out, at)
                        }
                        BufferRef::Scratch(i) if i == j => swap_in_place(&mut out, plan.endian_size(), at),
                        BufferRef::Scratch(i) => {
                            let inp = head[i].view();
                            run_step(&plan, &self.copy_plane, self.scale.as_ref(), step.kind, &inp, &mut out, at);
                        }
                    }
                }
            }
        }
    }

    /// Convert a whole image, one line group per call. Both images must have
    /// the same size.
    pub fn repack_image(&mut self, dst: &mut ImageMut<'_>, src: &ImageRef<'_>) {
        assert_eq!((dst.width(), dst.height()), (src.width(), src.height()));
        let align_y = self.plan.align_y();
        let xs = self.plan.src_format().desc().chroma_xs;
        let w = align_up(src.width(), 1 << xs);
        for y in (0..src.height()).step_by(align_y) {
            self.repack_line(dst, src, 0, y, 0, y, w);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Coords {
    sx: usize,
    sy: usize,
    dx: usize,
    dy: usize,
    w: usize,
}

// ===========================================================================
// Step execution
// ===========================================================================

fn run_step(
    plan: &RepackPlan,
    copy_plane: &[bool; 4],
    scale: Option<&CachedScale>,
    kind: StepKind,
    src: &ImageRef<'_>,
    dst: &mut ImageMut<'_>,
    at: Coords,
) {
    match kind {
        StepKind::Repack => {
            repack(plan, src, dst, at);
            let desc = dst.format().desc();
            for p in 0..src.format().desc().num_planes as usize {
                if copy_plane[p] {
                    copy_lines(desc, p, src, dst, at);
                }
            }
        }
        StepKind::Endian => {
            let desc = dst.format().desc();
            for p in 0..desc.num_planes as usize {
                copy_lines(desc, p, src, dst, at);
            }
            swap_in_place(dst, plan.endian_size(), Coords { sx: at.dx, sy: at.dy, ..at });
        }
        StepKind::Float => {
            let scale = scale.expect("float step without a range mapping");
            float(plan, scale, src, dst, at);
        }
    }
}

/// Run the repack kernel between the packed and the planar side of `src`/`dst`.
fn repack(plan: &RepackPlan, src: &ImageRef<'_>, dst: &mut ImageMut<'_>, at: Coords) {
    let kernel = plan.kernel();
    let pp = kernel.packed_plane();
    if plan.is_pack() {
        let chroma_xs = dst.format().desc().chroma_xs;
        let planar: [&[u8]; 4] = core::array::from_fn(|p| src.line(p, at.sx, at.sy));
        pack_line(kernel, planar, dst.line_mut(pp, at.dx, at.dy), at.w, chroma_xs);
    } else {
        let chroma_xs = src.format().desc().chroma_xs;
        unpack_line(
            kernel,
            src.line(pp, at.sx, at.sy),
            src.palette(),
            dst.lines_mut(at.dx, at.dy),
            at.w,
            chroma_xs,
        );
    }
}

/// Copy every line plane `p` has in one line group.
fn copy_lines(desc: &FormatDesc, p: usize, src: &ImageRef<'_>, dst: &mut ImageMut<'_>, at: Coords) {
    let bytes = desc.plane_bytes(p, at.w);
    let ys = desc.ys[p];
    for l in 0..desc.plane_lines(p) {
        let s = &src.line(p, at.sx, at.sy + (l << ys))[..bytes];
        dst.line_mut(p, at.dx, at.dy + (l << ys))[..bytes].copy_from_slice(s);
    }
}

/// Byte-swap one line group of `img` starting at `(at.sx, at.sy)`.
fn swap_in_place(img: &mut ImageMut<'_>, endian_size: usize, at: Coords) {
    let desc = img.format().desc();
    for p in 0..desc.num_planes as usize {
        let xs = desc.xs[p];
        let words = ((at.w + (1 << xs) - 1) >> xs) * (desc.bpp[p] as usize / 8) / endian_size;
        for l in 0..desc.plane_lines(p) {
            let line = img.line_mut(p, at.sx, at.sy + (l << desc.ys[p]));
            swap_words(&mut line[..words * endian_size], endian_size);
        }
    }
}

/// Map between integer and float planar samples. The integer side is the
/// plan's native planar format.
fn float(plan: &RepackPlan, scale: &CachedScale, src: &ImageRef<'_>, dst: &mut ImageMut<'_>, at: Coords) {
    let Some(int_bytes) = plan.float_int_bytes() else {
        return;
    };
    let int_bytes = int_bytes as usize;
    // The float side carries the geometry.
    let float_fmt: ImgFormat = if plan.is_pack() { src.format() } else { dst.format() };
    let desc = float_fmt.desc();
    for p in 0..desc.num_planes as usize {
        let n = at.w >> desc.xs[p];
        for l in 0..desc.plane_lines(p) {
            let sy = at.sy + (l << desc.ys[p]);
            let dy = at.dy + (l << desc.ys[p]);
            let s = src.line(p, at.sx, sy);
            let d = dst.line_mut(p, at.dx, dy);
            if plan.is_pack() {
                float_to_int(s, d, n, int_bytes, scale.m[p], scale.o[p], scale.pmax[p]);
            } else {
                int_to_float(s, d, n, int_bytes, scale.m[p], scale.o[p]);
            }
        }
    }
}
