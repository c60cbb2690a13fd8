//! Boundary to the planar-only resampling engine.
//!
//! A [`Resampler`] builds a [`FilterGraph`] for a pair of [`PlanarFormat`]s.
//! The graph pulls source rows through a [`GraphSource`] and pushes finished
//! destination rows through a [`GraphSink`]; the conversion pipeline answers
//! both with the repacker, so the graph never sees a packed layout.
//!
//! Engine planes are numbered by component: 0 = R/Y, 1 = G/Cb, 2 = B/Cr,
//! 3 = alpha. Rows are addressed in plane coordinates (chroma rows at
//! chroma resolution); row groups passed to [`GraphSource::request`] and
//! [`GraphSink::commit`] are in luma rows and multiples of
//! `1 << subsample_h`.

use alloc::boxed::Box;

use crate::csp::{ChromaLocation, ColorRepr};
use crate::error::GraphError;

mod point;

pub use point::PointResampler;

#[cfg(test)]
mod tests;

/// Sample storage of every plane of a [`PlanarFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// `u8`.
    Byte,
    /// Little-endian `u16`.
    Word,
    /// Little-endian `f32`.
    Float,
}

impl PixelType {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            PixelType::Byte => 1,
            PixelType::Word => 2,
            PixelType::Float => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphFamily {
    Gray,
    Yuv,
    Rgb,
}

/// Sub-rectangle of the format the graph maps, in luma pixels.
///
/// Fractional offsets are allowed; slices use them to address the part of
/// the source that corresponds to their band of the destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ActiveRegion {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }
}

/// Planar format as the engine sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarFormat {
    /// Allocated width in luma pixels; multiple of `1 << subsample_w`.
    pub width: usize,
    /// Allocated height in luma rows; multiple of `1 << subsample_h`.
    pub height: usize,
    pub pixel_type: PixelType,
    /// Significant bits of integer samples.
    pub depth: u8,
    pub subsample_w: u8,
    pub subsample_h: u8,
    pub family: GraphFamily,
    /// Which engine planes exist.
    pub planes: [bool; 4],
    pub repr: ColorRepr,
    pub chroma_location: ChromaLocation,
    pub active: ActiveRegion,
}

impl PlanarFormat {
    /// Horizontal and vertical subsampling shift of engine plane `plane`.
    #[inline]
    pub fn plane_shift(&self, plane: usize) -> (u8, u8) {
        if self.family != GraphFamily::Rgb && (plane == 1 || plane == 2) {
            (self.subsample_w, self.subsample_h)
        } else {
            (0, 0)
        }
    }

    /// Samples per row of engine plane `plane`.
    #[inline]
    pub fn plane_width(&self, plane: usize) -> usize {
        self.width >> self.plane_shift(plane).0
    }

    /// Rows of engine plane `plane`.
    #[inline]
    pub fn plane_height(&self, plane: usize) -> usize {
        self.height >> self.plane_shift(plane).1
    }

    /// Luma rows per row group.
    #[inline]
    pub fn row_group(&self) -> usize {
        1 << self.subsample_h
    }
}

/// Supplier of source rows.
pub trait GraphSource {
    /// Make luma rows `row..row + row_group` (and the chroma rows they
    /// cover) readable for pixels `x0..x1`. May invalidate rows handed out
    /// by earlier requests that fall outside the buffering depth.
    fn request(&mut self, row: usize, x0: usize, x1: usize);

    /// Row `row` of engine plane `plane`, in plane coordinates.
    fn row(&self, plane: usize, row: usize) -> &[u8];
}

/// Consumer of destination rows.
pub trait GraphSink {
    /// Row `row` of engine plane `plane`, in plane coordinates, to be filled
    /// before the row group containing it is committed.
    fn row_mut(&mut self, plane: usize, row: usize) -> &mut [u8];

    /// Luma rows `row..row + row_group` are complete for pixels `x0..x1`.
    fn commit(&mut self, row: usize, x0: usize, x1: usize);
}

/// A built conversion between two planar formats.
pub trait FilterGraph: Send {
    /// Source rows the graph needs readable at once.
    fn input_buffering(&self) -> usize;

    /// Destination rows the graph writes before committing.
    fn output_buffering(&self) -> usize;

    /// Fill the whole destination, committing its row groups in increasing
    /// order and requesting whichever source row groups that needs.
    fn process(&mut self, src: &mut dyn GraphSource, dst: &mut dyn GraphSink);
}

/// Factory of filter graphs.
pub trait Resampler: Send + Sync {
    fn build_graph(&self, src: &PlanarFormat, dst: &PlanarFormat) -> Result<Box<dyn FilterGraph>, GraphError>;
}
