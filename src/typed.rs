//! [`rgb`] pixel slices as conversion images.
//!
//! ```rust
//! use rgb::{Rgb, Rgba};
//! use plait::{ConvertOptions, ParallelConversionContext, typed};
//!
//! let src = vec![Rgb::new(255u8, 0, 128); 16 * 8];
//! let mut dst = vec![Rgba::<u8>::default(); 16 * 8];
//!
//! let mut ctx = ParallelConversionContext::new(ConvertOptions::default());
//! let mut out = typed::image_mut(&mut dst, 16, 8).unwrap();
//! ctx.convert(&mut out, &typed::image_ref(&src, 16, 8).unwrap()).unwrap();
//! assert_eq!(dst[0], Rgba::new(255, 0, 128, 255));
//! ```

use rgb::{Bgr, Bgra, Gray, GrayAlpha, Rgb, Rgba};

use crate::error::SizeError;
use crate::format::ImgFormat;
use crate::image::{ImageMut, ImageParams, ImageRef};

/// Pixel types stored exactly like a packed [`ImgFormat`].
pub trait PackedPixel: bytemuck::Pod {
    const FORMAT: ImgFormat;
}

macro_rules! packed_pixel {
    ($($ty:ty => $fmt:expr),* $(,)?) => {
        $(impl PackedPixel for $ty {
            const FORMAT: ImgFormat = $fmt;
        })*
    };
}

const fn native16(le: ImgFormat, be: ImgFormat) -> ImgFormat {
    if cfg!(target_endian = "big") { be } else { le }
}

packed_pixel! {
    Rgb<u8> => ImgFormat::Rgb24,
    Bgr<u8> => ImgFormat::Bgr24,
    Rgba<u8> => ImgFormat::Rgba,
    Bgra<u8> => ImgFormat::Bgra,
    Gray<u8> => ImgFormat::Gray,
    GrayAlpha<u8> => ImgFormat::Ya8,
    Rgb<u16> => native16(ImgFormat::Rgb48Le, ImgFormat::Rgb48Be),
    Rgba<u16> => native16(ImgFormat::Rgba64Le, ImgFormat::Rgba64Be),
    Gray<u16> => native16(ImgFormat::Gray16Le, ImgFormat::Gray16Be),
    GrayAlpha<u16> => native16(ImgFormat::Ya16Le, ImgFormat::Ya16Be),
}

/// View `stride`-pixel rows of `pixels` as a `width` x `height` image.
pub fn image_ref_strided<P: PackedPixel>(
    pixels: &[P],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<ImageRef<'_>, SizeError> {
    let params = ImageParams::new(P::FORMAT, width, height);
    ImageRef::new(
        params,
        &[bytemuck::cast_slice(pixels)],
        &[stride * size_of::<P>()],
    )
}

/// Mutable counterpart of [`image_ref_strided`].
pub fn image_mut_strided<P: PackedPixel>(
    pixels: &mut [P],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<ImageMut<'_>, SizeError> {
    let params = ImageParams::new(P::FORMAT, width, height);
    ImageMut::new(
        params,
        [bytemuck::cast_slice_mut(pixels)],
        &[stride * size_of::<P>()],
    )
}

/// View tightly packed `pixels` as a `width` x `height` image.
pub fn image_ref<P: PackedPixel>(pixels: &[P], width: usize, height: usize) -> Result<ImageRef<'_>, SizeError> {
    image_ref_strided(pixels, width, height, width)
}

pub fn image_mut<P: PackedPixel>(pixels: &mut [P], width: usize, height: usize) -> Result<ImageMut<'_>, SizeError> {
    image_mut_strided(pixels, width, height, width)
}
