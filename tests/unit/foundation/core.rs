use super::*;

#[test]
fn frame_time_conversions() {
    assert_eq!(FrameTime::from_millis(16).0, 16_000);
    assert_eq!(FrameTime::from_secs_f64(0.5).as_millis(), 500);
    assert_eq!(FrameTime::from_secs_f64(-1.0), FrameTime::ZERO);
    assert_eq!(FrameTime::from_secs_f64(f64::NAN), FrameTime::ZERO);
    assert_eq!(FrameTime::for_frame(3, 30).0, 100_000);
    assert_eq!(FrameTime::for_frame(3, 0), FrameTime::ZERO);
    assert_eq!(FrameTime::from(Duration::from_millis(2)).as_millis(), 2);
}

#[test]
fn frame_time_orders_by_value() {
    assert!(FrameTime(1) < FrameTime(2));
    assert!(FrameTime::from_millis(33) > FrameTime::from_millis(16));
}

#[test]
fn canvas_validation() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.rgba_len(), 48);
    assert_eq!(c.size(), Size::new(4.0, 3.0));
}

#[test]
fn frame_from_premul_checks_length() {
    assert!(FrameRGBA::from_premul(2, 2, vec![0; 15]).is_err());
    let f = FrameRGBA::from_premul(2, 2, vec![0; 16]).unwrap();
    assert!(f.premultiplied);
    assert_eq!(f.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(2, 0), None);
}

#[test]
fn rgba_image_round_trip_through_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![200, 100, 50, 255]).unwrap();
    let f = FrameRGBA::from_rgba_image(img);
    assert_eq!(f.pixel(0, 0), Some([200, 100, 50, 255]));
    let back = f.to_rgba_image().unwrap();
    assert_eq!(back.get_pixel(0, 0).0, [200, 100, 50, 255]);
}
