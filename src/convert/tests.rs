use super::slice::{buffer_mask, describe};
use super::*;
use crate::image::Image;
use crate::resample::{GraphFamily, PixelType};

fn image(format: ImgFormat, w: usize, h: usize) -> Image {
    Image::try_new(ImageParams::new(format, w, h)).unwrap()
}

fn fill(img: &mut Image, seed: u8) {
    let planes = img.params().desc().num_planes as usize;
    for p in 0..planes {
        for (i, b) in img.plane_mut(p).iter_mut().enumerate() {
            *b = ((i + p * 31) % 251) as u8 ^ seed;
        }
    }
}

#[test]
fn slices_are_aligned_and_cover_the_image() {
    assert_eq!(slice_rows(256, 8, 2), [0..64, 64..128, 128..192, 192..256]);
    assert_eq!(slice_rows(100, 4, 1), [0..64, 64..100]);
    assert_eq!(slice_rows(10, 3, 2), [0..10]);
    assert_eq!(slice_rows(1000, 3, 4), [0..384, 384..768, 768..1000]);
    assert_eq!(slice_rows(7, 0, 1), [0..7]);
}

#[test]
fn buffer_masks_are_powers_of_two_or_everything() {
    assert_eq!(buffer_mask(1, 100), (0, 1));
    assert_eq!(buffer_mask(2, 100), (1, 2));
    assert_eq!(buffer_mask(3, 100), (3, 4));
    assert_eq!(buffer_mask(64, 64), (usize::MAX, 64));
    assert_eq!(buffer_mask(128, 100), (usize::MAX, 100));
}

#[test]
fn options_builders() {
    let o = ConvertOptions::default()
        .with_threads(3)
        .with_passthrough(false)
        .with_rounding(DepthRounding::Down)
        .with_expand_8bit(true)
        .with_planar_f32(true);
    assert_eq!(o.thread_count(), 3);
    assert!(!o.passthrough);
    assert_eq!(
        o.repack_options(),
        RepackOptions {
            rounding: DepthRounding::Down,
            expand_8bit: true,
            planar_f32: true,
        }
    );
    assert!(ConvertOptions::default().thread_count() >= 1);
}

#[test]
fn engine_formats() {
    let opts = RepackOptions::default();
    let plan = RepackPlan::new(ImgFormat::Nv12, false, opts).unwrap();
    let (f, z) = describe(&plan, &ImageParams::new(ImgFormat::Nv12, 31, 17)).unwrap();
    assert_eq!((f.width, f.height), (32, 18));
    assert_eq!(f.active.width, 31.0);
    assert_eq!((f.subsample_w, f.subsample_h), (1, 1));
    assert_eq!(f.family, GraphFamily::Yuv);
    assert_eq!(f.pixel_type, PixelType::Byte);
    assert_eq!(z, [Some(0), Some(1), Some(2), None]);

    // Planar RGB stores G first; the engine wants R first.
    let plan = RepackPlan::new(ImgFormat::Rgba, true, opts).unwrap();
    let (f, z) = describe(&plan, &ImageParams::new(ImgFormat::Rgba, 4, 4)).unwrap();
    assert_eq!(f.family, GraphFamily::Rgb);
    assert_eq!(z, [Some(2), Some(0), Some(1), Some(3)]);

    let plan = RepackPlan::new(ImgFormat::MonoWhite, false, opts).unwrap();
    let (f, _) = describe(&plan, &ImageParams::new(ImgFormat::MonoWhite, 3, 1)).unwrap();
    assert_eq!((f.width, f.depth, f.family), (8, 1, GraphFamily::Gray));

    let plan = RepackPlan::new(ImgFormat::P010Le, false, opts).unwrap();
    let (f, _) = describe(&plan, &ImageParams::new(ImgFormat::P010Le, 4, 4)).unwrap();
    assert_eq!((f.pixel_type, f.depth), (PixelType::Word, 16));

    let f32_opts = RepackOptions {
        planar_f32: true,
        ..opts
    };
    let plan = RepackPlan::new(ImgFormat::Yuyv422, false, f32_opts).unwrap();
    let (f, _) = describe(&plan, &ImageParams::new(ImgFormat::Yuyv422, 4, 4)).unwrap();
    assert_eq!(f.pixel_type, PixelType::Float);
}

#[test]
fn format_support_queries() {
    let ctx = ParallelConversionContext::new(ConvertOptions::default());
    for f in [ImgFormat::Nv12, ImgFormat::Yuyv422, ImgFormat::Rgb24, ImgFormat::Rgb565Le, ImgFormat::Gbrp] {
        assert!(ctx.supports_input_format(f), "{f}");
        assert!(ctx.supports_output_format(f), "{f}");
    }
    assert!(ctx.supports_input_format(ImgFormat::Pal8));
    assert!(!ctx.supports_output_format(ImgFormat::Pal8));
}

#[test]
fn unsupported_format_leaves_context_unconfigured() {
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
    let src = ImageParams::new(ImgFormat::Rgb24, 8, 8);
    ctx.configure(&ImageParams::new(ImgFormat::Gbrp, 8, 8), &src).unwrap();
    assert!(ctx.is_configured());

    let err = ctx
        .configure(&ImageParams::new(ImgFormat::Pal8, 8, 8), &src)
        .unwrap_err();
    assert_eq!(
        err,
        ConvertError::UnsupportedFormat {
            format: ImgFormat::Pal8,
            direction: Direction::Pack,
        }
    );
    assert!(!ctx.is_configured());
    assert!(ctx.slices().is_empty());
}

#[test]
fn engine_refusal_is_reported() {
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
    let err = ctx
        .configure(&ImageParams::new(ImgFormat::Nv12, 8, 8), &ImageParams::new(ImgFormat::Rgb24, 8, 8))
        .unwrap_err();
    assert!(matches!(err, ConvertError::Engine(_)), "{err}");
    assert!(err.to_string().starts_with("scaler initialization failed"));
    assert!(!ctx.is_configured());
}

#[test]
fn pool_follows_slice_count() {
    let src = ImageParams::new(ImgFormat::Gray, 16, 256);
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(8));
    ctx.configure(&src, &src).unwrap();
    assert_eq!(ctx.slices().len(), 4);
    assert_eq!(ctx.pool_threads(), 3);

    ctx.configure(&ImageParams::new(ImgFormat::Gray, 16, 64), &src).unwrap();
    assert_eq!(ctx.slices().len(), 1);
    assert_eq!(ctx.pool_threads(), 0);
}

#[test]
fn convert_configures_lazily() {
    let mut src = image(ImgFormat::Yuyv422, 20, 6);
    fill(&mut src, 0);
    let mut dst = image(ImgFormat::Yuv422p, 20, 6);
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(2));
    assert!(!ctx.is_configured());
    ctx.convert(&mut dst.view_mut(), &src.view()).unwrap();
    assert!(ctx.is_configured());

    let mut direct = image(ImgFormat::Yuv422p, 20, 6);
    let plan = alloc::sync::Arc::new(RepackPlan::new(ImgFormat::Yuyv422, false, RepackOptions::default()).unwrap());
    let mut r = crate::repack::Repacker::new(plan);
    r.configure(direct.params(), src.params(), None).unwrap();
    r.repack_image(&mut direct.view_mut(), &src.view());
    for p in 0..3 {
        assert_eq!(dst.plane(p), direct.plane(p), "plane {p}");
    }
}

#[test]
fn aligned_planes_are_used_directly() {
    let mut src = image(ImgFormat::Nv12, 64, 64);
    fill(&mut src, 1);
    let mut dst = image(ImgFormat::Yuv420p, 64, 64);
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(1));
    ctx.convert(&mut dst.view_mut(), &src.view()).unwrap();
    let (src_direct, dst_direct) = ctx.slices()[0].direct_planes();
    assert_eq!(src_direct, [true, false, false, false]);
    assert_eq!(dst_direct, [true, true, true, false]);
    assert_eq!(dst.plane(0), src.plane(0));

    ctx.set_options(ConvertOptions::default().with_threads(1).with_passthrough(false));
    let mut copy = image(ImgFormat::Yuv420p, 64, 64);
    ctx.convert(&mut copy.view_mut(), &src.view()).unwrap();
    assert_eq!(ctx.slices()[0].direct_planes(), ([false; 4], [false; 4]));
    for p in 0..3 {
        assert_eq!(dst.plane(p), copy.plane(p), "plane {p}");
    }
}

fn fill_floats(img: &mut Image) {
    let planes = img.params().desc().num_planes as usize;
    for p in 0..planes {
        for (i, s) in img.plane_mut(p).chunks_exact_mut(4).enumerate() {
            let f = ((i + p * 31) % 251) as f32 / 250.0;
            s.copy_from_slice(&f.to_le_bytes());
        }
    }
}

/// Convert `src` with and without passthrough; the results must agree and
/// the first run must have addressed at least one user plane directly.
fn assert_passthrough_is_invisible(src: &Image, dst_format: ImgFormat, options: ConvertOptions) {
    let (w, h) = (src.params().width, src.params().height);
    let what = alloc::format!("{} -> {dst_format}", src.params().format);

    let mut direct = image(dst_format, w, h);
    let mut ctx = ParallelConversionContext::new(options.with_threads(1));
    ctx.convert(&mut direct.view_mut(), &src.view()).unwrap();
    let (s, d) = ctx.slices()[0].direct_planes();
    assert!(s.iter().chain(&d).any(|&b| b), "{what}: no direct planes");

    let mut copied = image(dst_format, w, h);
    ctx.set_options(options.with_threads(1).with_passthrough(false));
    ctx.convert(&mut copied.view_mut(), &src.view()).unwrap();
    assert_eq!(ctx.slices()[0].direct_planes(), ([false; 4], [false; 4]), "{what}");

    let desc = dst_format.desc();
    for p in 0..desc.num_planes as usize {
        for r in 0..desc.plane_rows(p, h) {
            assert_eq!(direct.view().row(p, r), copied.view().row(p, r), "{what}: plane {p} row {r}");
        }
    }
}

#[test]
fn passthrough_matches_copying_for_planar_formats() {
    let opts = ConvertOptions::default();
    for (from, to) in [
        (ImgFormat::Yuv420p16Le, ImgFormat::Yuv420p16Le),
        (ImgFormat::Yuv422p, ImgFormat::Yuyv422),
        (ImgFormat::Gbrp, ImgFormat::Gbrap),
    ] {
        let mut src = image(from, 48, 70);
        fill(&mut src, 5);
        assert_passthrough_is_invisible(&src, to, opts);
    }
}

#[test]
fn passthrough_matches_copying_for_fringe_rgb() {
    let opts = ConvertOptions::default();
    let mut src = image(ImgFormat::Rgb565Le, 40, 66);
    fill(&mut src, 9);
    assert_passthrough_is_invisible(&src, ImgFormat::Gbrp, opts);

    let mut src = image(ImgFormat::Gbrp, 40, 66);
    fill(&mut src, 9);
    assert_passthrough_is_invisible(&src, ImgFormat::Rgb565Le, opts);
}

#[test]
fn passthrough_matches_copying_for_float_planes() {
    let opts = ConvertOptions::default().with_planar_f32(true);
    let mut src = image(ImgFormat::GbrpF32, 32, 68);
    fill_floats(&mut src);
    assert_passthrough_is_invisible(&src, ImgFormat::Rgb24, opts);
    assert_passthrough_is_invisible(&src, ImgFormat::GbrpF32, opts);

    let mut src = image(ImgFormat::Rgb24, 32, 68);
    fill(&mut src, 2);
    assert_passthrough_is_invisible(&src, ImgFormat::GbrpF32, opts);
}
