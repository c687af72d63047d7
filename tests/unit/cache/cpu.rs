use super::*;
use crate::blend::Blender;
use crate::foundation::core::{PixelFormat, rect_xywh};
use crate::geometry::ImageScaleQuality;
use crate::mip::MipChain;
use crate::pixels::bitmap::DecodedBitmap;
use crate::pixels::source::StaticPixelSource;

fn level0(w: u32, h: u32, bgra: &[u8]) -> MipBuffer {
    let bmp = DecodedBitmap::new(w, h, PixelFormat::Bgra8, bgra.to_vec()).unwrap();
    let src = StaticPixelSource::new(bmp);
    let mut chain = MipChain::new();
    chain
        .ensure_level(&src, &Blender::scalar(), 0)
        .unwrap()
        .unwrap()
        .clone()
}

fn target(w: u16, h: u16) -> vello_cpu::Pixmap {
    vello_cpu::Pixmap::new(w, h)
}

fn px(p: &vello_cpu::Pixmap, x: usize, y: usize) -> [u8; 4] {
    let w = usize::from(p.width());
    let i = (y * w + x) * 4;
    let b = p.data_as_u8_slice();
    [b[i], b[i + 1], b[i + 2], b[i + 3]]
}

#[test]
fn upload_swizzles_bgra_to_rgba() {
    let mut backend = CpuPixmapBackend::default();
    let buf = level0(1, 1, &[10, 20, 30, 255]);
    let h = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();
    let pixmap = backend.pixmap(h).unwrap();
    assert_eq!(px(pixmap, 0, 0), [30, 20, 10, 255]);
}

#[test]
fn release_and_device_loss() {
    let mut backend = CpuPixmapBackend::default();
    let buf = level0(2, 2, &[0; 16]);
    let binding = backend.binding();
    let a = backend.create_bitmap(binding, 0, &buf).unwrap();
    let b = backend.create_bitmap(binding, 1, &buf).unwrap();
    assert_ne!(a, b);
    backend.release_bitmap(a);
    assert_eq!(backend.live_resources(), 1);

    backend.device_lost();
    assert_eq!(backend.live_resources(), 0);
    assert_eq!(backend.binding().generation, 1);
    // Releasing a handle lost with the device is harmless.
    backend.release_bitmap(b);

    let err = backend.create_bitmap(binding, 0, &buf).unwrap_err();
    assert!(matches!(err, PresentError::Backend(_)));
}

#[test]
fn oversized_levels_are_refused() {
    let mut backend = CpuPixmapBackend::new(CpuPixmapBackendOpts {
        max_dimension: 2,
        ..CpuPixmapBackendOpts::default()
    });
    let buf = level0(3, 1, &[0; 12]);
    let err = backend
        .create_bitmap(backend.binding(), 0, &buf)
        .unwrap_err();
    assert!(err.to_string().contains("limit"), "{err}");
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn draw_scales_with_nearest_sampling_and_clips() {
    let mut backend = CpuPixmapBackend::default();
    // 2x1: red, green (BGRA)
    let buf = level0(2, 1, &[0, 0, 255, 255, 0, 255, 0, 255]);
    let handle = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();

    let mut dst = target(6, 2);
    let draw = DrawImage {
        handle,
        mip_level: 0,
        dest: rect_xywh(2.0, 0.0, 8.0, 1.0),
        src: rect_xywh(0.0, 0.0, 2.0, 1.0),
        clip: rect_xywh(0.0, 0.0, 100.0, 100.0),
        quality: ImageScaleQuality::Fast,
    };
    backend.draw_image(&mut dst, &draw).unwrap();

    assert_eq!(px(&dst, 1, 0), [0, 0, 0, 0]);
    for x in 2..6 {
        assert_eq!(px(&dst, x, 0), [255, 0, 0, 255], "x={x}");
    }
    assert_eq!(px(&dst, 2, 1), [0, 0, 0, 0]);
}

#[test]
fn draw_composites_translucent_source_over() {
    let mut backend = CpuPixmapBackend::default();
    // white at 50% straight alpha -> premultiplied 128
    let buf = level0(1, 1, &[255, 255, 255, 128]);
    let handle = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();

    let mut dst = target(1, 1);
    dst.data_as_u8_slice_mut().copy_from_slice(&[0, 0, 255, 255]);
    let draw = DrawImage {
        handle,
        mip_level: 0,
        dest: rect_xywh(0.0, 0.0, 1.0, 1.0),
        src: rect_xywh(0.0, 0.0, 1.0, 1.0),
        clip: rect_xywh(0.0, 0.0, 1.0, 1.0),
        quality: ImageScaleQuality::Default,
    };
    backend.draw_image(&mut dst, &draw).unwrap();
    // 128 + 255 * 127 / 255 on blue, 128 on red/green.
    assert_eq!(px(&dst, 0, 0), [128, 128, 255, 255]);
}

#[test]
fn drawing_a_released_handle_fails() {
    let mut backend = CpuPixmapBackend::default();
    let buf = level0(1, 1, &[0, 0, 0, 255]);
    let handle = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();
    backend.release_bitmap(handle);
    let draw = DrawImage {
        handle,
        mip_level: 0,
        dest: rect_xywh(0.0, 0.0, 1.0, 1.0),
        src: rect_xywh(0.0, 0.0, 1.0, 1.0),
        clip: rect_xywh(0.0, 0.0, 1.0, 1.0),
        quality: ImageScaleQuality::Default,
    };
    assert!(backend.draw_image(&mut target(1, 1), &draw).is_err());
}

#[test]
fn draw_stays_inside_clip() {
    let mut backend = CpuPixmapBackend::default();
    let buf = level0(4, 4, &[10, 20, 30, 255].repeat(16));
    let handle = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();

    let mut dst = target(8, 8);
    let draw = DrawImage {
        handle,
        mip_level: 0,
        dest: rect_xywh(1.0, 1.0, 4.0, 4.0),
        src: rect_xywh(0.0, 0.0, 4.0, 4.0),
        clip: rect_xywh(2.0, 2.0, 2.0, 2.0),
        quality: ImageScaleQuality::Default,
    };
    backend.draw_image(&mut dst, &draw).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..4).contains(&x) && (2..4).contains(&y);
            let expected = if inside { [30, 20, 10, 255] } else { [0, 0, 0, 0] };
            assert_eq!(px(&dst, x, y), expected, "x={x} y={y}");
        }
    }
}

#[test]
fn disjoint_clip_paints_nothing() {
    let mut backend = CpuPixmapBackend::default();
    let buf = level0(1, 1, &[0, 0, 0, 255]);
    let handle = backend.create_bitmap(backend.binding(), 0, &buf).unwrap();
    let mut dst = target(4, 4);
    let draw = DrawImage {
        handle,
        mip_level: 0,
        dest: rect_xywh(0.0, 0.0, 2.0, 2.0),
        src: rect_xywh(0.0, 0.0, 1.0, 1.0),
        clip: rect_xywh(3.0, 3.0, 1.0, 1.0),
        quality: ImageScaleQuality::Default,
    };
    backend.draw_image(&mut dst, &draw).unwrap();
    assert!(dst.data_as_u8_slice().iter().all(|&b| b == 0));
}

#[test]
fn covered_span_uses_pixel_centers() {
    assert_eq!(covered_span(0.0, 2.0, 10), Some((0, 2)));
    assert_eq!(covered_span(0.6, 1.4, 10), None);
    assert_eq!(covered_span(0.4, 1.6, 10), Some((0, 2)));
    assert_eq!(covered_span(-5.0, 20.0, 3), Some((0, 3)));
    assert_eq!(covered_span(4.0, 8.0, 3), None);
}
