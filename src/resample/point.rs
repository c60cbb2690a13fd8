//! Nearest-neighbor reference engine.
//!
//! No filtering, dithering or matrix math: every destination sample copies
//! the source sample whose area contains its center, rescaled to the
//! destination's sample range. Missing planes are synthesized (opaque alpha,
//! neutral chroma).

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use super::{FilterGraph, GraphFamily, GraphSink, GraphSource, PixelType, PlanarFormat, Resampler};
use crate::csp::ChromaLocation;
use crate::error::GraphError;

/// [`Resampler`] that point-samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointResampler;

impl PointResampler {
    pub fn new() -> Self {
        Self
    }
}

impl Resampler for PointResampler {
    fn build_graph(&self, src: &PlanarFormat, dst: &PlanarFormat) -> Result<Box<dyn FilterGraph>, GraphError> {
        for (what, f) in [("source", src), ("destination", dst)] {
            if f.width == 0 || f.height == 0 || f.active.width <= 0.0 || f.active.height <= 0.0 {
                return Err(GraphError(format!("empty {what} format")));
            }
            if !f.planes[0] {
                return Err(GraphError(format!("{what} has no luma plane")));
            }
        }
        if (src.family == GraphFamily::Rgb) != (dst.family == GraphFamily::Rgb) {
            return Err(GraphError(format!(
                "no color conversion from {:?} to {:?}",
                src.family, dst.family
            )));
        }

        let scale_x = src.active.width / dst.active.width;
        let mut planes = Vec::new();
        for plane in (0..4).filter(|&p| dst.planes[p]) {
            let dst_shift = dst.plane_shift(plane);
            let src_shift = src.plane_shift(plane);
            let source = src.planes[plane].then_some(plane);
            let cols = (0..dst.plane_width(plane))
                .map(|x| {
                    let center = sample_center(x, dst_shift.0, dst.chroma_location);
                    let u = src.active.left + (center - dst.active.left) * scale_x;
                    source_index(u, src_shift.0, src.chroma_location, src.plane_width(plane))
                })
                .collect();
            let from = SampleRange::new(src, plane);
            let to = SampleRange::new(dst, plane);
            let fill = to.encode(if plane == 3 { 1.0 } else { 0.5 });
            planes.push(PlanePlan {
                plane,
                source,
                dst_shift,
                src_shift,
                cols,
                from,
                to,
                fill,
            });
        }

        Ok(Box::new(PointGraph {
            src: *src,
            dst: *dst,
            scale_y: src.active.height / dst.active.height,
            planes,
        }))
    }
}

/// Luma-coordinate center of sample `x` of a plane subsampled by `shift`.
fn sample_center(x: usize, shift: u8, loc: ChromaLocation) -> f64 {
    let step = (1usize << shift) as f64;
    if shift > 0 && loc == ChromaLocation::Left {
        x as f64 * step + 0.5
    } else {
        (x as f64 + 0.5) * step
    }
}

/// Index of the sample of a plane subsampled by `shift` whose area contains
/// luma coordinate `u`, clamped to `0..len`.
fn source_index(u: f64, shift: u8, loc: ChromaLocation, len: usize) -> usize {
    let step = (1usize << shift) as f64;
    let i = if shift > 0 && loc == ChromaLocation::Left {
        ((u - 0.5) / step + 0.5).floor()
    } else {
        (u / step).floor()
    };
    clamp_index(i, len)
}

#[inline]
fn clamp_index(i: f64, len: usize) -> usize {
    if i <= 0.0 { 0 } else { (i as usize).min(len - 1) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Sample {
    Int(u32),
    Float(f32),
}

/// Value range of one plane's samples.
#[derive(Clone, Copy, Debug)]
struct SampleRange {
    ty: PixelType,
    max: u32,
    /// Float chroma is centered on zero; integer chroma on half range.
    bias: f64,
}

impl SampleRange {
    fn new(f: &PlanarFormat, plane: usize) -> Self {
        let chroma = f.family != GraphFamily::Rgb && (plane == 1 || plane == 2);
        Self {
            ty: f.pixel_type,
            max: match f.pixel_type {
                PixelType::Float => 1,
                _ => ((1u64 << f.depth) - 1) as u32,
            },
            bias: if chroma && f.pixel_type == PixelType::Float { 0.5 } else { 0.0 },
        }
    }

    fn decode(&self, s: Sample) -> f64 {
        match s {
            Sample::Int(v) => v as f64 / self.max as f64,
            Sample::Float(v) => v as f64 + self.bias,
        }
    }

    fn encode(&self, u: f64) -> Sample {
        match self.ty {
            PixelType::Float => Sample::Float((u - self.bias) as f32),
            _ => Sample::Int((u * self.max as f64).round_ties_even().clamp(0.0, self.max as f64) as u32),
        }
    }

    fn convert(&self, s: Sample, to: &SampleRange) -> Sample {
        match (s, to.ty) {
            (Sample::Int(v), PixelType::Byte | PixelType::Word) => {
                let (v, smax, dmax) = (v as u64, self.max as u64, to.max as u64);
                Sample::Int(((v * dmax * 2 + smax) / (2 * smax)) as u32)
            }
            (Sample::Float(_), PixelType::Float) if self.bias == to.bias => s,
            _ => to.encode(self.decode(s)),
        }
    }
}

#[inline]
fn load(row: &[u8], ty: PixelType, i: usize) -> Sample {
    match ty {
        PixelType::Byte => Sample::Int(row[i] as u32),
        PixelType::Word => Sample::Int(u16::from_le_bytes([row[2 * i], row[2 * i + 1]]) as u32),
        PixelType::Float => {
            let b = &row[4 * i..4 * i + 4];
            Sample::Float(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        }
    }
}

#[inline]
fn store(row: &mut [u8], ty: PixelType, i: usize, s: Sample) {
    match (ty, s) {
        (PixelType::Byte, Sample::Int(v)) => row[i] = v as u8,
        (PixelType::Word, Sample::Int(v)) => row[2 * i..2 * i + 2].copy_from_slice(&(v as u16).to_le_bytes()),
        (PixelType::Float, Sample::Float(v)) => row[4 * i..4 * i + 4].copy_from_slice(&v.to_le_bytes()),
        _ => unreachable!("sample kind follows the pixel type"),
    }
}

#[derive(Debug)]
struct PlanePlan {
    plane: usize,
    source: Option<usize>,
    dst_shift: (u8, u8),
    src_shift: (u8, u8),
    /// Source sample index of every destination sample of a row.
    cols: Vec<usize>,
    from: SampleRange,
    to: SampleRange,
    /// Written when the source lacks the plane.
    fill: Sample,
}

#[derive(Debug)]
struct PointGraph {
    src: PlanarFormat,
    dst: PlanarFormat,
    scale_y: f64,
    planes: Vec<PlanePlan>,
}

impl PointGraph {
    fn source_row(&self, plan: &PlanePlan, src_plane: usize, row: usize) -> usize {
        let center = (row as f64 + 0.5) * (1usize << plan.dst_shift.1) as f64;
        let u = self.src.active.top + (center - self.dst.active.top) * self.scale_y;
        let step = (1usize << plan.src_shift.1) as f64;
        clamp_index((u / step).floor(), self.src.plane_height(src_plane))
    }
}

impl FilterGraph for PointGraph {
    fn input_buffering(&self) -> usize {
        self.src.row_group()
    }

    fn output_buffering(&self) -> usize {
        self.dst.row_group()
    }

    fn process(&mut self, src: &mut dyn GraphSource, dst: &mut dyn GraphSink) {
        let group = self.dst.row_group();
        let src_group = self.src.row_group();
        let mut loaded = None;

        for y0 in (0..self.dst.height).step_by(group) {
            for plan in &self.planes {
                let dys = plan.dst_shift.1;
                for row in (y0 >> dys)..((y0 + group) >> dys) {
                    let out = dst.row_mut(plan.plane, row);
                    let Some(sp) = plan.source else {
                        for i in 0..plan.cols.len() {
                            store(out, plan.to.ty, i, plan.fill);
                        }
                        continue;
                    };
                    let sy = self.source_row(plan, sp, row);
                    let first = (sy << plan.src_shift.1) & !(src_group - 1);
                    if loaded != Some(first) {
                        src.request(first, 0, self.src.width);
                        loaded = Some(first);
                    }
                    let input = src.row(sp, sy);
                    for (i, &sx) in plan.cols.iter().enumerate() {
                        let s = plan.from.convert(load(input, plan.from.ty, sx), &plan.to);
                        store(out, plan.to.ty, i, s);
                    }
                }
            }
            dst.commit(y0, 0, self.dst.width);
        }
    }
}
