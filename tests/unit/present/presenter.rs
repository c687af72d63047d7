use super::*;
use crate::cache::{BackendIdentity, CpuPixmapBackend, PixmapHandle};
use crate::foundation::core::{PixelFormat, rect_xywh};
use crate::geometry::{AlignX, Stretch, ViewBox};

fn solid(w: u32, h: u32, bgra: [u8; 4]) -> DecodedBitmap {
    DecodedBitmap::new(w, h, PixelFormat::Bgra8, bgra.repeat((w * h) as usize)).unwrap()
}

fn draw(
    p: &mut ImagePresenter<PixmapHandle>,
    backend: &mut CpuPixmapBackend,
    bounds: Rect,
) -> PresentResult<Option<DrawImage<PixmapHandle>>> {
    let binding = backend.binding();
    p.prepare_draw(backend, binding, bounds)
}

#[test]
fn no_source_draws_nothing() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts::default());
    assert_eq!(p.natural_size(), Size::ZERO);
    let prepared = draw(&mut p, &mut backend, rect_xywh(0.0, 0.0, 10.0, 10.0))
        .unwrap();
    assert!(prepared.is_none());
    assert_eq!(p.try_peek_color(rect_xywh(0.0, 0.0, 10.0, 10.0), Point::new(1.0, 1.0)), None);
}

#[test]
fn natural_size_follows_viewbox() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts {
        viewbox: Some(ViewBox::pixels(1.0, 1.0, 2.0, 10.0)),
        ..PresentOpts::default()
    });
    p.set_source(&mut backend, Some(solid(4, 4, [0, 0, 255, 255]).into()))
        .unwrap();
    assert_eq!(p.natural_size(), Size::new(2.0, 3.0));

    p.set_opts(PresentOpts::default());
    assert_eq!(p.natural_size(), Size::new(4.0, 4.0));
    p.dispose(&mut backend);
}

#[test]
fn letterboxed_draw_and_hit_test() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts::default());
    p.set_source(&mut backend, Some(solid(4, 4, [0, 0, 255, 255]).into()))
        .unwrap();
    let bounds = rect_xywh(0.0, 0.0, 10.0, 2.0);
    let prepared = draw(&mut p, &mut backend, bounds)
        .unwrap()
        .unwrap();
    assert_eq!(prepared.dest, rect_xywh(3.0, 0.0, 2.0, 2.0));
    assert_eq!(prepared.src, rect_xywh(0.0, 0.0, 4.0, 4.0));
    assert_eq!(prepared.clip, bounds);
    assert_eq!(prepared.mip_level, 0);

    assert_eq!(
        p.try_peek_color(bounds, Point::new(4.0, 1.0)),
        Some(Color::rgb(255, 0, 0))
    );
    assert_eq!(p.try_peek_color(bounds, Point::new(1.0, 1.0)), None);
    p.dispose(&mut backend);
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn high_quality_selects_a_minified_level_and_rescales_src() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts {
        stretch: Stretch::Fill,
        quality: ImageScaleQuality::HighQuality,
        viewbox: Some(ViewBox::pixels(0.0, 0.0, 64.0, 32.0)),
        ..PresentOpts::default()
    });
    p.set_source(&mut backend, Some(solid(64, 64, [9, 9, 9, 255]).into()))
        .unwrap();
    let prepared = draw(&mut p, &mut backend, rect_xywh(0.0, 0.0, 16.0, 8.0))
        .unwrap()
        .unwrap();
    assert_eq!(prepared.mip_level, 2);
    assert_eq!(prepared.src, rect_xywh(0.0, 0.0, 16.0, 8.0));
    let pixmap = backend.pixmap(prepared.handle).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (16, 16));
    p.dispose(&mut backend);
}

#[test]
fn empty_viewbox_draws_and_hits_nothing() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts {
        viewbox: Some(ViewBox::pixels(10.0, 0.0, 2.0, 2.0)),
        ..PresentOpts::default()
    });
    p.set_source(&mut backend, Some(solid(4, 4, [1, 2, 3, 255]).into()))
        .unwrap();
    let bounds = rect_xywh(0.0, 0.0, 8.0, 8.0);
    assert_eq!(p.natural_size(), Size::ZERO);
    assert!(
        draw(&mut p, &mut backend, bounds)
            .unwrap()
            .is_none()
    );
    assert_eq!(p.try_peek_color(bounds, Point::new(4.0, 4.0)), None);
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn replacing_the_source_releases_old_handles() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts::default());
    let bounds = rect_xywh(0.0, 0.0, 4.0, 4.0);
    p.set_source(&mut backend, Some(solid(4, 4, [0, 0, 0, 255]).into()))
        .unwrap();
    draw(&mut p, &mut backend, bounds)
        .unwrap();
    assert_eq!(backend.live_resources(), 1);

    p.set_source(&mut backend, Some(solid(2, 2, [0, 0, 0, 255]).into()))
        .unwrap();
    assert_eq!(backend.live_resources(), 0);
    assert_eq!(p.cache_stats().unwrap().live_handles, 0);

    p.set_source(&mut backend, None).unwrap();
    assert!(p.source().is_none());
    assert!(p.cache_stats().is_none());
}

#[test]
fn rejected_format_leaves_presenter_empty() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts::default());
    let gray = DecodedBitmap::new(2, 2, PixelFormat::Gray8, vec![0u8; 4]).unwrap();
    assert!(p.set_source(&mut backend, Some(gray.into())).is_err());
    assert!(p.source().is_none());
}

#[test]
fn live_source_peeks_current_content_and_redraws_after_write() {
    let mut backend = CpuPixmapBackend::default();
    let live = Arc::new(LivePixelSource::new(2, 2).unwrap());
    live.write(|px| px.bytes.copy_from_slice(&[255, 0, 0, 255].repeat(4)));

    let mut p = ImagePresenter::new(PresentOpts {
        stretch: Stretch::None,
        align_x: AlignX::Start,
        ..PresentOpts::default()
    });
    p.set_source(&mut backend, Some(live.clone().into())).unwrap();
    let bounds = rect_xywh(0.0, 0.0, 2.0, 2.0);
    let first = draw(&mut p, &mut backend, bounds)
        .unwrap()
        .unwrap();
    assert_eq!(
        p.try_peek_color(bounds, Point::new(0.5, 0.5)),
        Some(Color::rgb(0, 0, 255))
    );

    live.write(|px| px.bytes.copy_from_slice(&[0, 255, 0, 255].repeat(4)));
    assert_eq!(
        p.try_peek_color(bounds, Point::new(0.5, 0.5)),
        Some(Color::rgb(0, 255, 0))
    );
    let second = draw(&mut p, &mut backend, bounds)
        .unwrap()
        .unwrap();
    assert_ne!(first.handle, second.handle);
    assert!(backend.pixmap(first.handle).is_none());
    assert_eq!(backend.live_resources(), 1);
    p.dispose(&mut backend);
}

#[test]
fn null_identity_is_ignored() {
    let mut backend = CpuPixmapBackend::default();
    let mut p = ImagePresenter::new(PresentOpts::default());
    p.set_source(&mut backend, Some(solid(2, 2, [0, 0, 0, 255]).into()))
        .unwrap();
    let binding = SurfaceBinding::new(BackendIdentity::NULL, 0);
    assert!(
        p.prepare_draw(&mut backend, binding, rect_xywh(0.0, 0.0, 2.0, 2.0))
            .unwrap()
            .is_none()
    );
}
