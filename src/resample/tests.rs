use alloc::vec;
use alloc::vec::Vec;

use super::*;
use crate::csp::{ChromaLocation, ColorRepr};

fn format(family: GraphFamily, pixel_type: PixelType, depth: u8, (w, h): (usize, usize), ss: (u8, u8)) -> PlanarFormat {
    let planes = match family {
        GraphFamily::Gray => [true, false, false, false],
        _ => [true, true, true, false],
    };
    PlanarFormat {
        width: w,
        height: h,
        pixel_type,
        depth,
        subsample_w: ss.0,
        subsample_h: ss.1,
        family,
        planes,
        repr: if family == GraphFamily::Rgb {
            ColorRepr::RGB
        } else {
            ColorRepr::BT709_LIMITED
        },
        chroma_location: ChromaLocation::Center,
        active: ActiveRegion::full(w, h),
    }
}

/// Whole-image planes that record what the graph asked for.
struct Planes {
    fmt: PlanarFormat,
    data: Vec<Vec<u8>>,
    requests: Vec<usize>,
    commits: Vec<usize>,
}

impl Planes {
    fn new(fmt: PlanarFormat) -> Self {
        let bytes = fmt.pixel_type.bytes();
        let data = (0..4)
            .map(|p| {
                if fmt.planes[p] {
                    vec![0u8; fmt.plane_width(p) * fmt.plane_height(p) * bytes]
                } else {
                    Vec::new()
                }
            })
            .collect();
        Self {
            fmt,
            data,
            requests: Vec::new(),
            commits: Vec::new(),
        }
    }

    fn row_bytes(&self, plane: usize) -> usize {
        self.fmt.plane_width(plane) * self.fmt.pixel_type.bytes()
    }

    fn fill(&mut self, plane: usize, f: impl Fn(usize, usize) -> u8) {
        let w = self.row_bytes(plane);
        for (i, b) in self.data[plane].iter_mut().enumerate() {
            *b = f(i % w, i / w);
        }
    }
}

impl GraphSource for Planes {
    fn request(&mut self, row: usize, x0: usize, x1: usize) {
        assert!(row.is_multiple_of(self.fmt.row_group()));
        assert!(x0 < x1 && x1 <= self.fmt.width);
        self.requests.push(row);
    }

    fn row(&self, plane: usize, row: usize) -> &[u8] {
        let w = self.row_bytes(plane);
        &self.data[plane][row * w..(row + 1) * w]
    }
}

impl GraphSink for Planes {
    fn row_mut(&mut self, plane: usize, row: usize) -> &mut [u8] {
        let w = self.row_bytes(plane);
        &mut self.data[plane][row * w..(row + 1) * w]
    }

    fn commit(&mut self, row: usize, x0: usize, x1: usize) {
        assert_eq!((x0, x1), (0, self.fmt.width));
        self.commits.push(row);
    }
}

fn run(src: &mut Planes, dst: &mut Planes) {
    let mut graph = PointResampler::new().build_graph(&src.fmt, &dst.fmt).unwrap();
    graph.process(src, dst);
}

#[test]
fn same_format_is_copied() {
    let f = format(GraphFamily::Yuv, PixelType::Byte, 8, (16, 8), (1, 1));
    let mut src = Planes::new(f);
    for p in 0..3 {
        src.fill(p, |x, y| (x * 7 + y * 13 + p * 50) as u8);
    }
    let mut dst = Planes::new(f);
    run(&mut src, &mut dst);
    assert_eq!(src.data, dst.data);
    assert_eq!(dst.commits, vec![0, 2, 4, 6]);
}

#[test]
fn left_sited_chroma_is_copied() {
    let mut f = format(GraphFamily::Yuv, PixelType::Byte, 8, (16, 4), (1, 0));
    f.chroma_location = ChromaLocation::Left;
    let mut src = Planes::new(f);
    src.fill(1, |x, y| (x + y * 8) as u8);
    let mut dst = Planes::new(f);
    run(&mut src, &mut dst);
    assert_eq!(src.data[1], dst.data[1]);
}

#[test]
fn upscale_duplicates_samples() {
    let mut src = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (4, 2), (0, 0)));
    src.fill(0, |x, y| (y * 4 + x) as u8);
    let mut dst = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (8, 4), (0, 0)));
    run(&mut src, &mut dst);
    assert_eq!(dst.row(0, 0), &[0, 0, 1, 1, 2, 2, 3, 3]);
    assert_eq!(dst.row(0, 1), &[0, 0, 1, 1, 2, 2, 3, 3]);
    assert_eq!(dst.row(0, 3), &[4, 4, 5, 5, 6, 6, 7, 7]);
}

#[test]
fn requests_are_row_groups() {
    let mut src = Planes::new(format(GraphFamily::Yuv, PixelType::Byte, 8, (8, 8), (1, 1)));
    let mut dst = Planes::new(format(GraphFamily::Yuv, PixelType::Byte, 8, (8, 4), (1, 1)));
    run(&mut src, &mut dst);
    assert!(src.requests.iter().all(|r| r % 2 == 0));
    assert_eq!(dst.commits, vec![0, 2]);
}

#[test]
fn depth_is_rescaled() {
    let mut src = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (4, 1), (0, 0)));
    src.data[0].copy_from_slice(&[0, 1, 128, 255]);
    let mut dst = Planes::new(format(GraphFamily::Gray, PixelType::Word, 16, (4, 1), (0, 0)));
    run(&mut src, &mut dst);
    let words: Vec<u16> = dst.data[0]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    assert_eq!(words, [0, 257, 32896, 65535]);

    let mut back = Planes::new(src.fmt);
    run(&mut dst, &mut back);
    assert_eq!(back.data[0], src.data[0]);
}

#[test]
fn floats_are_normalized() {
    let mut src = Planes::new(format(GraphFamily::Yuv, PixelType::Byte, 8, (2, 1), (0, 0)));
    src.data[0].copy_from_slice(&[255, 0]);
    src.data[1].copy_from_slice(&[255, 0]);
    let mut dst = Planes::new(format(GraphFamily::Yuv, PixelType::Float, 32, (2, 1), (0, 0)));
    run(&mut src, &mut dst);
    let f = |p: usize, i: usize| {
        let b = &dst.data[p][4 * i..4 * i + 4];
        f32::from_le_bytes([b[0], b[1], b[2], b[3]])
    };
    assert_eq!((f(0, 0), f(0, 1)), (1.0, 0.0));
    assert_eq!((f(1, 0), f(1, 1)), (0.5, -0.5));

    let mut back = Planes::new(src.fmt);
    run(&mut dst, &mut back);
    assert_eq!(back.data[0], [255, 0]);
    assert_eq!(back.data[1], [255, 0]);
}

#[test]
fn missing_planes_are_synthesized() {
    let mut src = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (4, 2), (0, 0)));
    src.fill(0, |x, _| x as u8 * 10);
    let mut f = format(GraphFamily::Yuv, PixelType::Word, 10, (4, 2), (1, 1));
    f.planes[3] = true;
    let mut dst = Planes::new(f);
    run(&mut src, &mut dst);
    let word = |p: usize, i: usize| u16::from_le_bytes([dst.data[p][2 * i], dst.data[p][2 * i + 1]]);
    assert_eq!(word(1, 0), 512);
    assert_eq!(word(2, 1), 512);
    assert_eq!(word(3, 5), 1023);
    assert_eq!(word(0, 1), 40);
}

#[test]
fn rgb_and_yuv_do_not_mix() {
    let rgb = format(GraphFamily::Rgb, PixelType::Byte, 8, (4, 4), (0, 0));
    let yuv = format(GraphFamily::Yuv, PixelType::Byte, 8, (4, 4), (0, 0));
    assert!(PointResampler::new().build_graph(&rgb, &yuv).is_err());
    assert!(PointResampler::new().build_graph(&yuv, &rgb).is_err());
    assert!(PointResampler::new().build_graph(&rgb, &rgb).is_ok());
}

#[test]
fn active_region_offsets_rows() {
    let mut src = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (2, 8), (0, 0)));
    src.fill(0, |_, y| y as u8);
    let mut sf = src.fmt;
    sf.active = ActiveRegion {
        left: 0.0,
        top: 4.0,
        width: 2.0,
        height: 4.0,
    };
    src.fmt = sf;
    let mut dst = Planes::new(format(GraphFamily::Gray, PixelType::Byte, 8, (2, 4), (0, 0)));
    run(&mut src, &mut dst);
    assert_eq!(dst.data[0], [4, 4, 5, 5, 6, 6, 7, 7]);
}

#[test]
fn buffering_is_one_row_group() {
    let src = format(GraphFamily::Yuv, PixelType::Byte, 8, (8, 8), (1, 1));
    let dst = format(GraphFamily::Yuv, PixelType::Byte, 8, (8, 8), (1, 0));
    let graph = PointResampler::new().build_graph(&src, &dst).unwrap();
    assert_eq!(graph.input_buffering(), 2);
    assert_eq!(graph.output_buffering(), 1);
}
