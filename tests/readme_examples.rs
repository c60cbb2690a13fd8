//! Validates the code examples from README.md compile and behave correctly.

#[test]
fn readme_convert() {
    use plait::{ConvertOptions, Image, ImageParams, ImgFormat, ParallelConversionContext};

    let mut src = Image::try_new(ImageParams::new(ImgFormat::Yuyv422, 320, 240)).unwrap();
    src.plane_mut(0).fill(0x80);

    let mut dst = Image::try_new(ImageParams::new(ImgFormat::Nv12, 320, 240)).unwrap();
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default().with_threads(4));
    ctx.convert(&mut dst.view_mut(), &src.view()).unwrap();
    assert!(ctx.is_configured());
    assert_eq!(ctx.slices().len(), 4);
    assert_eq!(dst.plane(0)[0], 0x80);
}

#[test]
fn readme_repacker() {
    use plait::{Image, ImageParams, ImgFormat, RepackOptions, RepackPlan, Repacker};
    use std::sync::Arc;

    let plan = RepackPlan::new(ImgFormat::Yuyv422, false, RepackOptions::default()).unwrap();
    assert_eq!(plan.planar_format(), ImgFormat::Yuv422p);

    let mut src = Image::try_new(ImageParams::new(ImgFormat::Yuyv422, 64, 2)).unwrap();
    let mut dst = Image::try_new(ImageParams::new(ImgFormat::Yuv422p, 64, 2)).unwrap();
    src.plane_mut(0).fill(100);

    let mut repacker = Repacker::new(Arc::new(plan));
    repacker.configure(dst.params(), src.params(), None).unwrap();
    repacker.repack_image(&mut dst.view_mut(), &src.view());
    assert_eq!(dst.view().row(0, 1), [100u8; 64]);
    assert_eq!(dst.view().row(1, 0), [100u8; 32]);
}

#[cfg(feature = "imgref")]
#[test]
fn readme_imgref() {
    use imgref::ImgVec;
    use plait::{ConvertOptions, ParallelConversionContext, img};
    use rgb::{Bgra, Rgb};

    let src = ImgVec::new(vec![Rgb::new(255u8, 0, 128); 640 * 480], 640, 480);
    let mut dst = ImgVec::new(vec![Bgra::<u8>::default(); 320 * 240], 320, 240);
    let mut ctx = ParallelConversionContext::new(ConvertOptions::default());
    img::convert(&mut ctx, dst.as_mut(), src.as_ref()).unwrap();
    assert_eq!(dst.buf()[0], Bgra { b: 128, g: 0, r: 255, a: 255 });
}
