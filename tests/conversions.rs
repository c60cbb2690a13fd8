//! Whole-image conversions through `ParallelConversionContext`, checked
//! against hand-computed pixels.

use plait::{ChromaLocation, ConvertOptions, Image, ImageParams, ImgFormat as F, ParallelConversionContext};

fn ctx() -> ParallelConversionContext {
    ParallelConversionContext::new(ConvertOptions::default().with_threads(1))
}

fn image(format: F, w: usize, h: usize) -> Image {
    Image::try_new(ImageParams::new(format, w, h)).unwrap()
}

fn convert(ctx: &mut ParallelConversionContext, src: &Image, dst_format: F) -> Image {
    let p = src.params();
    let mut dst = Image::try_new(ImageParams {
        format: dst_format,
        ..*p
    })
    .unwrap();
    ctx.convert(&mut dst.view_mut(), &src.view()).unwrap();
    dst
}

fn le_words(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn rgb565_primaries_expand_to_full_range() {
    let mut src = image(F::Rgb565Le, 4, 1);
    let words = le_words(&[0xF800, 0x07E0, 0x001F, 0xFFFF]);
    src.view_mut().row_mut(0, 0).copy_from_slice(&words);

    let mut ctx = ctx();
    let rgb = convert(&mut ctx, &src, F::Rgb24);
    assert_eq!(
        rgb.view().row(0, 0),
        [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]
    );

    let back = convert(&mut ctx, &rgb, F::Rgb565Le);
    assert_eq!(back.view().row(0, 0), &words[..]);
}

#[test]
fn rgb48_splits_into_gbr_planes() {
    let (w, h) = (5, 3);
    let mut src = image(F::Rgb48Le, w, h);
    for y in 0..h {
        for (i, b) in src.view_mut().row_mut(0, y).iter_mut().enumerate() {
            *b = ((i * 37 + y * 11) % 251) as u8;
        }
    }

    let mut ctx = ctx();
    let planar = convert(&mut ctx, &src, F::Gbrp16Le);
    let (s, p) = (src.view(), planar.view());
    for y in 0..h {
        for x in 0..w {
            let px = &s.row(0, y)[x * 6..x * 6 + 6];
            assert_eq!(p.row(0, y)[x * 2..x * 2 + 2], px[2..4], "G at {x},{y}");
            assert_eq!(p.row(1, y)[x * 2..x * 2 + 2], px[4..6], "B at {x},{y}");
            assert_eq!(p.row(2, y)[x * 2..x * 2 + 2], px[0..2], "R at {x},{y}");
        }
    }

    let back = convert(&mut ctx, &planar, F::Rgb48Le);
    for y in 0..h {
        assert_eq!(back.view().row(0, y), s.row(0, y));
    }
}

#[test]
fn block_constant_chroma_survives_420() {
    let (w, h) = (16, 16);
    let params = ImageParams {
        chroma_location: ChromaLocation::Center,
        ..ImageParams::new(F::Yuv444p, w, h)
    };
    let mut src = Image::try_new(params).unwrap();
    {
        let mut v = src.view_mut();
        for y in 0..h {
            for x in 0..w {
                v.row_mut(0, y)[x] = (x * 13 + y * 7) as u8;
                v.row_mut(1, y)[x] = (40 + (x / 2) * 9 + (y / 2) * 3) as u8;
                v.row_mut(2, y)[x] = (200 - (x / 2) * 5 - (y / 2) * 4) as u8;
            }
        }
    }

    let mut ctx = ctx();
    let nv12 = convert(&mut ctx, &src, F::Nv12);
    assert_eq!(nv12.params().chroma_location, ChromaLocation::Center);
    // Interleaved CbCr at half resolution.
    assert_eq!(nv12.view().row(1, 3)[..4], [49, 188, 58, 183]);

    let back = convert(&mut ctx, &nv12, F::Yuv444p);
    for p in 0..3 {
        for y in 0..h {
            assert_eq!(back.view().row(p, y), src.view().row(p, y), "plane {p} row {y}");
        }
    }
}

#[test]
fn one_bit_gray_expands_to_bytes() {
    let mut src = image(F::MonoBlack, 8, 2);
    src.view_mut().row_mut(0, 0)[0] = 0b1010_0000;
    src.view_mut().row_mut(0, 1)[0] = 0b0000_0001;

    let gray = convert(&mut ctx(), &src, F::Gray);
    assert_eq!(gray.view().row(0, 0), [255, 0, 255, 0, 0, 0, 0, 0]);
    assert_eq!(gray.view().row(0, 1), [0, 0, 0, 0, 0, 0, 0, 255]);
}

#[test]
fn palette_indices_resolve_to_rgba() {
    let mut src = image(F::Pal8, 3, 1);
    src.view_mut().row_mut(0, 0).copy_from_slice(&[2, 0, 1]);
    let pal = src.palette_mut().unwrap();
    pal[0] = 0x8011_2233;
    pal[1] = 0xFF00_00FF;
    pal[2] = 0x00FF_0000;

    let rgba = convert(&mut ctx(), &src, F::Rgba);
    assert_eq!(
        rgba.view().row(0, 0),
        [0xFF, 0x00, 0x00, 0x00, 0x11, 0x22, 0x33, 0x80, 0x00, 0x00, 0xFF, 0xFF]
    );
}

#[test]
fn big_endian_gray_is_swapped() {
    let mut src = image(F::Gray16Be, 2, 1);
    src.view_mut()
        .row_mut(0, 0)
        .copy_from_slice(&[0x01, 0x23, 0xAB, 0xCD]);
    let le = convert(&mut ctx(), &src, F::Gray16Le);
    assert_eq!(le.view().row(0, 0), [0x23, 0x01, 0xCD, 0xAB]);
}

#[test]
fn float_planes_preserve_packed_yuv() {
    let (w, h) = (32, 4);
    let mut src = image(F::Yuyv422, w, h);
    for y in 0..h {
        for (i, b) in src.view_mut().row_mut(0, y).iter_mut().enumerate() {
            *b = ((i + y * 2 * w) % 256) as u8;
        }
    }
    let mut ctx = ParallelConversionContext::new(
        ConvertOptions::default()
            .with_threads(1)
            .with_planar_f32(true),
    );
    let out = convert(&mut ctx, &src, F::Yuyv422);
    for y in 0..h {
        assert_eq!(out.view().row(0, y), src.view().row(0, y), "row {y}");
    }
}

#[test]
fn missing_alpha_becomes_opaque() {
    let mut src = image(F::Rgb24, 2, 1);
    src.view_mut()
        .row_mut(0, 0)
        .copy_from_slice(&[1, 2, 3, 4, 5, 6]);
    let bgra = convert(&mut ctx(), &src, F::Bgra);
    assert_eq!(bgra.view().row(0, 0), [3, 2, 1, 255, 6, 5, 4, 255]);
}

#[test]
fn gray_gets_neutral_chroma() {
    let mut src = image(F::Gray, 4, 2);
    src.plane_mut(0).fill(90);
    let yuv = convert(&mut ctx(), &src, F::Yuv420p);
    assert_eq!(yuv.view().row(0, 1), [90; 4]);
    assert_eq!(yuv.view().row(1, 0), [128; 2]);
    assert_eq!(yuv.view().row(2, 0), [128; 2]);
}

/// 2×2 on/off tiles on every plane, phase shifted per plane.
fn tiled(params: ImageParams) -> Image {
    let (w, h) = (params.width, params.height);
    let mut img = Image::try_new(params).unwrap();
    let mut v = img.view_mut();
    for p in 0..3 {
        for y in 0..h {
            for (x, b) in v.row_mut(p, y).iter_mut().enumerate().take(w) {
                let on = (x / 2 + y / 2 + p) % 2 == 0;
                *b = if on { 235 - p as u8 * 20 } else { 16 + p as u8 * 10 };
            }
        }
    }
    img
}

fn assert_same_planes(a: &Image, b: &Image, planes: usize) {
    for p in 0..planes {
        for y in 0..a.params().height {
            assert_eq!(a.view().row(p, y), b.view().row(p, y), "plane {p} row {y}");
        }
    }
}

#[test]
fn tiled_rgb_survives_16_bit_packing() {
    let src = tiled(ImageParams::new(F::Gbrp, 256, 128));
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(4));

    let rgb48 = convert(&mut ctx, &src, F::Rgb48Le);
    assert_eq!(ctx.slices().len(), 2);
    // R, G, B of pixel (0, 0) and (2, 0), widened by 257
    assert_eq!(rgb48.view().row(0, 0)[..6], le_words(&[195 * 257, 235 * 257, 26 * 257])[..]);
    assert_eq!(rgb48.view().row(0, 0)[12..18], le_words(&[36 * 257, 16 * 257, 215 * 257])[..]);

    let back = convert(&mut ctx, &rgb48, F::Gbrp);
    assert_same_planes(&back, &src, 3);
}

#[test]
fn tiled_yuv_survives_nv12() {
    let params = ImageParams {
        chroma_location: ChromaLocation::Center,
        ..ImageParams::new(F::Yuv444p, 256, 128)
    };
    let src = tiled(params);
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(4));

    let nv12 = convert(&mut ctx, &src, F::Nv12);
    assert_eq!(nv12.view().row(0, 0), src.view().row(0, 0));
    // one CbCr pair per 2×2 tile
    assert_eq!(nv12.view().row(1, 0)[..4], [16 + 10, 235 - 40, 235 - 20, 16 + 20]);

    let back = convert(&mut ctx, &nv12, F::Yuv444p);
    assert_same_planes(&back, &src, 3);
}
