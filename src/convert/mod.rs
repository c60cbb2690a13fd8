//! Slice-parallel conversion through a planar [`Resampler`].
//!
//! [`ParallelConversionContext`] cuts the destination into horizontal bands
//! and gives each one a [`SliceConverter`]: a filter graph whose source rows
//! come from an unpacking [`Repacker`](crate::Repacker) and whose output rows
//! go to a packing one. Bands are independent; all but the first run on the
//! context's thread pool.

use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;

use log::{debug, error, warn};

use crate::error::{ConvertError, Direction};
use crate::format::{ImgFormat, align_up};
use crate::image::{ImageMut, ImageParams, ImageRef};
use crate::repack::{DepthRounding, RepackOptions, RepackPlan};
use crate::resample::{PointResampler, Resampler};

mod slice;

pub use slice::SliceConverter;

#[cfg(test)]
mod tests;

/// Minimum slice granularity in rows.
const SLICE_ALIGN: usize = 64;

/// Knobs of a [`ParallelConversionContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConvertOptions {
    /// Number of slices; 0 picks the available parallelism.
    pub threads: usize,
    /// Let the engine read and write aligned user planes directly when no
    /// repacking is needed for them.
    pub passthrough: bool,
    pub rounding: DepthRounding,
    pub expand_8bit: bool,
    pub planar_f32: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            passthrough: true,
            rounding: DepthRounding::Up,
            expand_8bit: false,
            planar_f32: false,
        }
    }
}

impl ConvertOptions {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    pub fn with_rounding(mut self, rounding: DepthRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_expand_8bit(mut self, expand_8bit: bool) -> Self {
        self.expand_8bit = expand_8bit;
        self
    }

    pub fn with_planar_f32(mut self, planar_f32: bool) -> Self {
        self.planar_f32 = planar_f32;
        self
    }

    pub fn repack_options(&self) -> RepackOptions {
        RepackOptions {
            rounding: self.rounding,
            expand_8bit: self.expand_8bit,
            planar_f32: self.planar_f32,
        }
    }

    /// Slices to cut a frame into.
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Destination row ranges for `n` slices of an image `h` rows tall whose
/// format needs y coordinates aligned to `align_y`. Empty slices are
/// dropped.
pub fn slice_rows(h: usize, n: usize, align_y: usize) -> Vec<Range<usize>> {
    let n = n.max(1);
    let slice_h = align_up(align_up(h.div_ceil(n), align_y), SLICE_ALIGN);
    (0..n)
        .map(|i| (i * slice_h).min(h))
        .filter(|&y| y < h)
        .map(|y| y..(y + slice_h).min(h))
        .collect()
}

/// Converts whole images between any two supported formats, slice by
/// slice, on a private thread pool.
///
/// Configuration happens lazily on the first [`convert`](Self::convert)
/// and again whenever image parameters change. A failed configuration
/// leaves the context unconfigured.
pub struct ParallelConversionContext {
    options: ConvertOptions,
    resampler: Arc<dyn Resampler>,
    pool: Option<rayon::ThreadPool>,
    slices: Vec<SliceConverter>,
    /// (dst, src) the slices were built for.
    configured: Option<(ImageParams, ImageParams)>,
}

impl ParallelConversionContext {
    /// Context backed by the nearest-neighbor [`PointResampler`].
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_resampler(options, Arc::new(PointResampler::new()))
    }

    pub fn with_resampler(options: ConvertOptions, resampler: Arc<dyn Resampler>) -> Self {
        Self {
            options,
            resampler,
            pool: None,
            slices: Vec::new(),
            configured: None,
        }
    }

    #[inline]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Replace the options; the next conversion reconfigures.
    pub fn set_options(&mut self, options: ConvertOptions) {
        if options != self.options {
            self.options = options;
            self.unconfigure();
        }
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    #[inline]
    pub fn slices(&self) -> &[SliceConverter] {
        &self.slices
    }

    /// Worker threads currently owned by the context.
    pub fn pool_threads(&self) -> usize {
        self.pool.as_ref().map_or(0, |p| p.current_num_threads())
    }

    pub fn supports_input_format(&self, format: ImgFormat) -> bool {
        self.supports(format, false)
    }

    pub fn supports_output_format(&self, format: ImgFormat) -> bool {
        self.supports(format, true)
    }

    fn supports(&self, format: ImgFormat, pack: bool) -> bool {
        RepackPlan::new(format, pack, self.options.repack_options())
            .is_some_and(|plan| slice::describe(&plan, &ImageParams::new(format, 1, 1)).is_some())
    }

    fn plan(&self, format: ImgFormat, direction: Direction) -> Result<Arc<RepackPlan>, ConvertError> {
        let pack = direction == Direction::Pack;
        RepackPlan::new(format, pack, self.options.repack_options())
            .map(Arc::new)
            .ok_or(ConvertError::UnsupportedFormat { format, direction })
    }

    fn unconfigure(&mut self) {
        self.slices.clear();
        self.configured = None;
    }

    /// Build the slices for converting `src`-like images into `dst`-like ones.
    pub fn configure(&mut self, dst: &ImageParams, src: &ImageParams) -> Result<(), ConvertError> {
        self.unconfigure();
        match self.build(dst, src) {
            Ok(()) => {
                self.configured = Some((*dst, *src));
                Ok(())
            }
            Err(e) => {
                match &e {
                    ConvertError::UnsupportedFormat { .. } => warn!("{e}"),
                    _ => error!("{} -> {}: {e}", src.format, dst.format),
                }
                self.unconfigure();
                Err(e)
            }
        }
    }

    fn build(&mut self, dst: &ImageParams, src: &ImageParams) -> Result<(), ConvertError> {
        let dst_plan = self.plan(dst.format, Direction::Pack)?;
        let src_plan = self.plan(src.format, Direction::Unpack)?;

        let rows = slice_rows(dst.height, self.options.thread_count(), dst.desc().align_y as usize);
        debug!(
            "{} {}x{} -> {} {}x{}: {} slices via {} / {}",
            src.format,
            src.width,
            src.height,
            dst.format,
            dst.width,
            dst.height,
            rows.len(),
            src_plan.planar_format(),
            dst_plan.planar_format(),
        );

        for r in rows {
            let slice = SliceConverter::new(
                &*self.resampler,
                (&dst_plan, &src_plan),
                dst,
                src,
                r,
                self.options.passthrough,
            )?;
            self.slices.push(slice);
        }
        self.ensure_pool(self.slices.len())
    }

    /// Keep a pool of `slices - 1` workers, rebuilding it only when that
    /// count changes.
    fn ensure_pool(&mut self, slices: usize) -> Result<(), ConvertError> {
        let threads = slices.saturating_sub(1);
        if threads == 0 {
            self.pool = None;
            return Ok(());
        }
        if self.pool.as_ref().is_some_and(|p| p.current_num_threads() == threads) {
            return Ok(());
        }
        self.pool = None;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("plait-slice-{i}"))
            .build()
            .map_err(|e| ConvertError::ThreadPool(e.to_string()))?;
        debug!("slice pool: {threads} threads");
        self.pool = Some(pool);
        Ok(())
    }

    /// Convert `src` into `dst`, reconfiguring first if their parameters
    /// differ from the last call.
    pub fn convert(&mut self, dst: &mut ImageMut<'_>, src: &ImageRef<'_>) -> Result<(), ConvertError> {
        let key = (*dst.params(), *src.params());
        if self.configured != Some(key) {
            self.configure(&key.0, &key.1)?;
        }

        let cuts: Vec<usize> = self.slices.iter().skip(1).map(|s| s.rows().start).collect();
        let bands = dst.reborrow().split_rows(&cuts);
        let mut results: Vec<Result<(), ConvertError>> = self.slices.iter().map(|_| Ok(())).collect();
        let mut jobs = self.slices.iter_mut().zip(bands).zip(results.iter_mut());

        match &self.pool {
            Some(pool) => pool.in_place_scope(|scope| {
                let first = jobs.next();
                for ((slice, mut band), out) in jobs {
                    scope.spawn(move |_| *out = slice.convert(&mut band, src));
                }
                if let Some(((slice, mut band), out)) = first {
                    *out = slice.convert(&mut band, src);
                }
            }),
            None => {
                for ((slice, mut band), out) in jobs {
                    *out = slice.convert(&mut band, src);
                }
            }
        }

        let result = results.into_iter().collect::<Result<(), _>>();
        if let Err(e) = &result {
            error!("conversion failed: {e}");
            self.unconfigure();
        }
        result
    }
}

impl core::fmt::Debug for ParallelConversionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParallelConversionContext")
            .field("options", &self.options)
            .field("slices", &self.slices.len())
            .field("pool_threads", &self.pool_threads())
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}
