use super::*;
use crate::assets::bitmap::{Bitmap, FrameAsset};
use crate::foundation::config::FrameFit;

fn frame_with_holes(w: u32, h: u32, holes: &[(u32, u32, u32, u32)], hole_alpha: u8) -> FrameAsset {
    let mut img = image::RgbaImage::from_pixel(w, h, image::Rgba([20, 40, 60, 255]));
    for &(hx, hy, hw, hh) in holes {
        for y in hy..hy + hh {
            for x in hx..hx + hw {
                img.put_pixel(x, y, image::Rgba([0, 0, 0, hole_alpha]));
            }
        }
    }
    FrameAsset::new(Bitmap::from_rgba_image(img).unwrap())
}

fn layer(frame: &FrameAsset, w: u32, h: u32) -> FrameLayer {
    FrameLayer::rasterize(frame, Canvas::new(w, h).unwrap(), FrameFit::Contain).unwrap()
}

#[test]
fn opaque_frame_yields_exact_fallback() {
    let frame = frame_with_holes(50, 40, &[], 0);
    let report = detect_photo_area_report(&layer(&frame, 50, 40), 200, FallbackArea::default())
        .unwrap();
    assert_eq!(report.source, AreaSource::Fallback);
    assert_eq!(report.qualifying_pixels, 0);
    assert_eq!(
        report.area,
        PhotoArea {
            x: 0.1 * 50.0,
            y: 0.2 * 40.0,
            width: 0.8 * 50.0,
            height: 0.6 * 40.0,
        }
    );
}

#[test]
fn single_rectangular_slot_is_found_exactly() {
    let frame = frame_with_holes(100, 100, &[(30, 20, 40, 60)], 0);
    let report = detect_photo_area_report(&layer(&frame, 100, 100), 200, FallbackArea::default())
        .unwrap();
    assert_eq!(report.source, AreaSource::Transparency);
    assert_eq!(report.area, PhotoArea::new(30.0, 20.0, 40.0, 60.0).unwrap());
    assert_eq!(report.qualifying_pixels, 40 * 60);
    assert_eq!(report.fill_ratio, 1.0);
}

#[test]
fn single_pixel_slot_has_positive_size() {
    let frame = frame_with_holes(10, 10, &[(9, 9, 1, 1)], 0);
    let area = detect_photo_area(&layer(&frame, 10, 10), 200, FallbackArea::default()).unwrap();
    assert_eq!(area, PhotoArea::new(9.0, 9.0, 1.0, 1.0).unwrap());
    assert!(area.is_within(Canvas::new(10, 10).unwrap()));
}

#[test]
fn threshold_is_strictly_less_than() {
    let at = frame_with_holes(10, 10, &[(2, 2, 3, 3)], 200);
    let below = frame_with_holes(10, 10, &[(2, 2, 3, 3)], 199);

    let r_at = detect_photo_area_report(&layer(&at, 10, 10), 200, FallbackArea::default()).unwrap();
    assert_eq!(r_at.source, AreaSource::Fallback);

    let r_below =
        detect_photo_area_report(&layer(&below, 10, 10), 200, FallbackArea::default()).unwrap();
    assert_eq!(r_below.source, AreaSource::Transparency);
    assert_eq!(r_below.area, PhotoArea::new(2.0, 2.0, 3.0, 3.0).unwrap());
}

#[test]
fn disjoint_slots_merge_and_report_sparse_fill() {
    let frame = frame_with_holes(100, 100, &[(0, 0, 10, 10), (90, 90, 10, 10)], 0);
    let report = detect_photo_area_report(&layer(&frame, 100, 100), 200, FallbackArea::default())
        .unwrap();
    assert_eq!(report.area, PhotoArea::new(0.0, 0.0, 100.0, 100.0).unwrap());
    assert_eq!(report.qualifying_pixels, 200);
    assert!(report.fill_ratio < 0.05);
}

#[test]
fn detection_runs_in_output_space() {
    let frame = frame_with_holes(200, 200, &[(50, 50, 100, 100)], 0);
    let area = detect_photo_area(&layer(&frame, 100, 100), 200, FallbackArea::default()).unwrap();
    assert!(area.is_within(Canvas::new(100, 100).unwrap()));
    assert!((area.x - 25.0).abs() <= 2.0);
    assert!((area.y - 25.0).abs() <= 2.0);
    assert!((area.width - 50.0).abs() <= 4.0);
    assert!((area.height - 50.0).abs() <= 4.0);
}

#[test]
fn letterbox_bars_are_not_part_of_the_slot() {
    let frame = frame_with_holes(40, 20, &[], 0);
    let report = detect_photo_area_report(&layer(&frame, 20, 20), 200, FallbackArea::default())
        .unwrap();
    assert_eq!(report.source, AreaSource::Fallback);
}
