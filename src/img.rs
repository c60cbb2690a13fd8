//! Borrow [`imgref`] buffers of [`rgb`] pixels as conversion images.
//!
//! ```rust
//! use imgref::ImgVec;
//! use rgb::{Bgr, Rgba};
//! use plait::{ConvertOptions, ParallelConversionContext, img};
//!
//! let src = ImgVec::new(vec![Rgba::new(255u8, 0, 128, 200); 64 * 48], 64, 48);
//! let mut dst = ImgVec::new(vec![Bgr::<u8>::default(); 32 * 24], 32, 24);
//!
//! let mut ctx = ParallelConversionContext::new(ConvertOptions::default());
//! img::convert(&mut ctx, dst.as_mut(), src.as_ref()).unwrap();
//! assert_eq!(dst.buf()[0], Bgr { b: 128, g: 0, r: 255 });
//! ```

use imgref::{ImgRef, ImgRefMut};

use crate::ParallelConversionContext;
use crate::error::{ConvertError, SizeError};
use crate::image::{ImageMut, ImageRef};
use crate::typed::{PackedPixel, image_mut_strided, image_ref_strided};

/// View an `ImgRef` as a single-plane [`ImageRef`].
pub fn image_ref<P: PackedPixel>(img: ImgRef<'_, P>) -> Result<ImageRef<'_>, SizeError> {
    let (w, h, stride) = (img.width(), img.height(), img.stride());
    image_ref_strided(img.into_buf(), w, h, stride)
}

/// View an `ImgRefMut` as a single-plane [`ImageMut`].
pub fn image_mut<P: PackedPixel>(img: ImgRefMut<'_, P>) -> Result<ImageMut<'_>, SizeError> {
    let (w, h, stride) = (img.width(), img.height(), img.stride());
    image_mut_strided(img.into_buf(), w, h, stride)
}

/// Convert (and resize) `src` into `dst` with `ctx`.
pub fn convert<P: PackedPixel, Q: PackedPixel>(
    ctx: &mut ParallelConversionContext,
    dst: ImgRefMut<'_, Q>,
    src: ImgRef<'_, P>,
) -> Result<(), ConvertError> {
    let src = image_ref(src)?;
    let mut dst = image_mut(dst)?;
    ctx.convert(&mut dst, &src)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use imgref::{Img, ImgVec};
    use rgb::{Bgra, Gray, GrayAlpha, Rgb, Rgba};

    use super::*;
    use crate::ConvertOptions;
    use crate::format::ImgFormat;

    #[test]
    fn strided_views_keep_their_stride() {
        let buf: Vec<Rgb<u8>> = vec![Rgb::new(1, 2, 3); 10 * 4];
        let img = Img::new_stride(&buf[..], 7, 4, 10);
        let view = image_ref(img).unwrap();
        assert_eq!(view.format(), ImgFormat::Rgb24);
        assert_eq!(view.stride(0), 30);
        assert_eq!(view.row(0, 3), [1u8, 2, 3].repeat(7));
    }

    #[test]
    fn rgba_to_bgra_keeps_alpha() {
        let src = ImgVec::new(vec![Rgba::new(10u8, 20, 30, 40); 8 * 4], 8, 4);
        let mut dst = ImgVec::new(vec![Bgra::<u8>::default(); 8 * 4], 8, 4);
        let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
        convert(&mut ctx, dst.as_mut(), src.as_ref()).unwrap();
        assert!(dst.pixels().all(|p| p == Bgra { b: 30, g: 20, r: 10, a: 40 }));
    }

    #[test]
    fn wide_pixels_are_native_endian() {
        let px = Rgb::new(0x0102u16, 0x0304, 0x0506);
        let src = ImgVec::new(vec![px; 4], 2, 2);
        let mut dst = ImgVec::new(vec![Rgb::<u8>::default(); 4], 2, 2);
        let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
        convert(&mut ctx, dst.as_mut(), src.as_ref()).unwrap();
        assert_eq!(dst.buf()[3], Rgb::new(1, 3, 5));
    }

    #[test]
    fn gray_alpha_to_gray_drops_alpha() {
        let src = ImgVec::new(vec![GrayAlpha::new(77u8, 9); 6 * 2], 6, 2);
        let mut dst = ImgVec::new(vec![Gray::new(0u8); 3 * 2], 3, 2);
        let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
        convert(&mut ctx, dst.as_mut(), src.as_ref()).unwrap();
        assert!(dst.pixels().all(|p| p == Gray::new(77)));
    }
}
