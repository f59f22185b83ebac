use super::*;
use crate::foundation::core::Canvas;

#[test]
fn in_memory_sink_keeps_order() {
    let mut sink = InMemorySink::new();
    let f = FrameRGBA::blank(Canvas::new(1, 1).unwrap());
    sink.present(FrameTime::from_millis(0), &f).unwrap();
    sink.present(FrameTime::from_millis(33), &f).unwrap();
    let ts: Vec<_> = sink.frames().iter().map(|(t, _)| t.as_millis()).collect();
    assert_eq!(ts, vec![0, 33]);
}

#[test]
fn png_sink_writes_numbered_files() {
    let dir = std::env::temp_dir().join(format!("drape_png_sink_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut sink = PngSequenceSink::new(&dir).unwrap();

    let mut f = FrameRGBA::blank(Canvas::new(2, 1).unwrap());
    f.data.copy_from_slice(&[255, 0, 0, 255, 0, 0, 0, 0]);
    sink.present(FrameTime::ZERO, &f).unwrap();
    sink.present(FrameTime::from_millis(33), &f).unwrap();
    assert_eq!(sink.written(), 2);

    let img = image::open(dir.join("frame_000001.png")).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
    std::fs::remove_dir_all(&dir).ok();
}
