//! # plait
//!
//! *Braid and unbraid your pixel planes.*
//!
//! Packed pixels keep their components interleaved: RGB24, 4:2:2 YUYV,
//! RGB565, palettes, one-bit bitmaps, NV12's shared chroma plane. Planar
//! engines want one component per plane at a uniform sample size. plait
//! works out how any catalog format decomposes into its natural planar
//! form, then moves the bits line by line, with the byte swaps
//! SIMD-accelerated on x86-64 AVX2, ARM NEON and WASM SIMD128.
//!
//! ## Layers
//!
//! - [`format`]: the pixel format catalog ([`ImgFormat`], [`FormatDesc`]).
//! - [`RepackPlan::new`] picks the planar format and the steps (float range
//!   mapping, component repack, endian swap) for a packed format.
//! - [`Repacker`] binds a plan to images and converts one line group per
//!   [`repack_line`](Repacker::repack_line) call.
//! - [`ParallelConversionContext`] splits a frame into row slices and runs
//!   each one through a planar [`Resampler`](resample::Resampler), unpacking
//!   source rows and packing destination rows on demand.
//!
//! ```rust
//! use plait::{ConvertOptions, Image, ImageParams, ImgFormat, ParallelConversionContext};
//!
//! let mut src = Image::try_new(ImageParams::new(ImgFormat::Nv12, 64, 64)).unwrap();
//! src.plane_mut(0).fill(200);
//! let mut dst = Image::try_new(ImageParams::new(ImgFormat::Yuyv422, 128, 128)).unwrap();
//!
//! let mut ctx = ParallelConversionContext::new(ConvertOptions::default());
//! ctx.convert(&mut dst.view_mut(), &src.view()).unwrap();
//! assert_eq!(dst.plane(0)[0], 200);
//! ```
//!
//! ## Feature flags
//!
//! - **`rgb`**: view slices of [`rgb`] pixels as images (see `typed`).
//! - **`imgref`**: borrow [`imgref`] buffers as conversion images (see
//!   `img`). Implies `rgb`.

#![forbid(unsafe_code)]

extern crate alloc;

pub mod convert;
pub mod csp;
mod error;
pub mod format;
mod image;
pub mod repack;
pub mod resample;

#[cfg(feature = "rgb")]
pub mod typed;

#[cfg(feature = "imgref")]
pub mod img;

pub use convert::{ConvertOptions, ParallelConversionContext, SliceConverter};
pub use csp::{ChromaLocation, ColorRepr};
pub use error::{ConvertError, Direction, GraphError, SizeError};
pub use format::{FormatDesc, ImgFormat};
pub use image::{ALIGN, Image, ImageMut, ImageParams, ImageRef};
pub use repack::{DepthRounding, RepackOptions, RepackPlan, Repacker};
