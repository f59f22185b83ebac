use super::*;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    let mut f = FrameRGBA::blank(Canvas::new(w, h).unwrap());
    fill(&mut f, px);
    f
}

fn red_garment(w: u32, h: u32) -> GarmentAsset {
    let px = solid(w, h, RED).data;
    GarmentAsset::new("red.png", w, h, Arc::new(px)).unwrap()
}

fn at(x: f64, y: f64, width: f64, height: f64) -> Placement {
    Placement {
        x,
        y,
        width,
        height,
    }
}

#[test]
fn without_overlay_output_equals_frame() {
    let frame = solid(8, 4, BLUE);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let out = c.compose(&frame, None).unwrap().clone();
    assert_eq!(out, frame);
    assert_eq!(c.stats().overlays_drawn, 0);
}

#[test]
fn overlay_lands_inside_placement_only() {
    let frame = solid(8, 4, BLUE);
    let g = red_garment(2, 1);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let out = c
        .compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(1.0, 1.0, 4.0, 2.0),
            }),
        )
        .unwrap();

    for y in 0..4 {
        for x in 0..8 {
            let inside = (1..5).contains(&x) && (1..3).contains(&y);
            let want = if inside { RED } else { BLUE };
            assert_eq!(out.pixel(x, y), Some(want), "pixel ({x},{y})");
        }
    }
    assert_eq!(c.stats().overlays_drawn, 1);
}

#[test]
fn overlay_past_surface_edges_is_clipped() {
    let frame = solid(4, 4, BLUE);
    let g = red_garment(1, 1);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let out = c
        .compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(-2.0, 2.0, 4.0, 4.0),
            }),
        )
        .unwrap();
    assert_eq!(out.pixel(0, 3), Some(RED));
    assert_eq!(out.pixel(1, 2), Some(RED));
    assert_eq!(out.pixel(2, 2), Some(BLUE));
    assert_eq!(out.pixel(0, 1), Some(BLUE));
}

#[test]
fn degenerate_overlay_is_skipped() {
    let frame = solid(4, 4, BLUE);
    let g = red_garment(1, 1);
    let mut c = Compositor::new([0, 0, 0, 0]);
    for p in [
        at(0.0, 0.0, 0.2, 3.0),
        at(f64::NAN, 0.0, 2.0, 2.0),
        at(0.0, 0.0, f64::INFINITY, 2.0),
        at(10.0, 10.0, 4.0, 4.0),
    ] {
        let out = c
            .compose(
                &frame,
                Some(Overlay {
                    garment: &g,
                    placement: p,
                }),
            )
            .unwrap();
        assert_eq!(out, &frame);
    }
    assert_eq!(c.stats().overlays_drawn, 0);
    assert_eq!(c.stats().frames_composed, 4);
}

#[test]
fn clear_color_shows_through_transparent_frame() {
    let frame = FrameRGBA::blank(Canvas::new(2, 2).unwrap());
    let mut c = Compositor::new([10, 20, 30, 255]);
    let out = c.compose(&frame, None).unwrap();
    assert_eq!(out.pixel(1, 1), Some([10, 20, 30, 255]));
}

#[test]
fn resampled_garment_is_reused_across_ticks() {
    let frame = solid(8, 8, BLUE);
    let g = red_garment(2, 2);
    let mut c = Compositor::new([0, 0, 0, 0]);
    for _ in 0..3 {
        c.compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(1.0, 1.0, 4.0, 4.0),
            }),
        )
        .unwrap();
    }
    assert_eq!(c.stats().garment_resamples, 1);

    c.compose(
        &frame,
        Some(Overlay {
            garment: &g,
            placement: at(1.0, 1.0, 5.0, 5.0),
        }),
    )
    .unwrap();
    assert_eq!(c.stats().garment_resamples, 2);
}

#[test]
fn failed_compose_leaves_front_untouched() {
    let frame = solid(2, 2, BLUE);
    let mut c = Compositor::new([0, 0, 0, 0]);
    c.compose(&frame, None).unwrap();

    let empty = FrameRGBA::blank(Canvas {
        width: 0,
        height: 0,
    });
    assert!(c.compose(&empty, None).is_err());
    assert_eq!(c.front(), &frame);
}

#[test]
fn surface_follows_frame_size() {
    let mut c = Compositor::new([0, 0, 0, 0]);
    c.compose(&solid(4, 2, BLUE), None).unwrap();
    c.compose(&solid(6, 3, BLUE), None).unwrap();
    assert_eq!(c.front().canvas(), Canvas::new(6, 3).unwrap());
}

#[test]
fn placement_larger_than_whole_resample_limit_is_drawn() {
    // A close-up with a tall garment: 2x5 garment, shoulders near the frame edges on 1080p.
    let frame = solid(1920, 1080, BLUE);
    let g = red_garment(2, 5);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let out = c
        .compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(-940.8, 259.2, 3801.6, 9504.0),
            }),
        )
        .unwrap();
    assert_eq!(out.pixel(960, 600), Some(RED));
    assert_eq!(out.pixel(0, 1079), Some(RED));
    assert_eq!(out.pixel(960, 100), Some(BLUE));
    assert_eq!(c.stats().overlays_drawn, 1);
}

#[test]
fn huge_placement_covers_surface() {
    let frame = solid(64, 48, BLUE);
    let g = red_garment(2, 5);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let out = c
        .compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(-100.0, -20_000.0, 300.0, 1e9),
            }),
        )
        .unwrap()
        .clone();
    assert_eq!(out, solid(64, 48, RED));
    assert_eq!(c.stats().garment_resamples, 1);
}

#[test]
fn huge_placement_samples_the_visible_part_of_the_garment() {
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    let mut px = Vec::new();
    px.extend_from_slice(&RED);
    px.extend_from_slice(&GREEN);
    let g = GarmentAsset::new("split.png", 2, 1, Arc::new(px)).unwrap();

    let frame = solid(64, 48, BLUE);
    let mut c = Compositor::new([0, 0, 0, 0]);
    let mut draw_at = |x: f64| {
        c.compose(
            &frame,
            Some(Overlay {
                garment: &g,
                placement: at(x, -10_000.0, 20_064.0, 20_000.0),
            }),
        )
        .unwrap()
        .clone()
    };

    // Only the far left of the stretched garment is visible.
    let left = draw_at(-100.0);
    assert_eq!(left.pixel(0, 0), Some(RED));
    assert_eq!(left.pixel(63, 47), Some(RED));

    // Only the far right.
    let right = draw_at(-19_900.0);
    assert_eq!(right.pixel(0, 0), Some(GREEN));
    assert_eq!(right.pixel(63, 47), Some(GREEN));
}
