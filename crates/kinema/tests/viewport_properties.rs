#![allow(clippy::uninlined_format_args)]

use kinema::{MotionSample, MotionTrack, Viewport};
use proptest::prelude::*;

fn samples() -> impl Strategy<Value = Vec<MotionSample>> {
    prop::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 1..32).prop_map(|points| {
        points
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| MotionSample::new(i as f64, x, y))
            .collect()
    })
}

/// Viewports that leave a drawing area after padding.
fn viewport() -> impl Strategy<Value = Viewport> {
    (50.0f64..2000.0, 50.0f64..2000.0, 0.0f64..0.45).prop_map(|(w, h, frac)| {
        Viewport::new(w, h, w.min(h) * frac)
    })
}

/// Positions drawn from the whole normal `f64` range, magnitudes up to `f64::MAX`.
fn extreme_samples() -> impl Strategy<Value = Vec<MotionSample>> {
    prop::collection::vec((prop::num::f64::NORMAL, prop::num::f64::NORMAL), 2..8).prop_map(
        |points| {
            points
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| MotionSample::new(i as f64, x, y))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn every_accepted_track_fits_with_positive_scale(samples in extreme_samples(), vp in viewport()) {
        if let Ok(track) = MotionTrack::new(samples) {
            let t = vp.fit(track.as_slice());
            prop_assert!(t.scale > 0.0, "scale = {}", t.scale);
            prop_assert!(t.scale.is_finite());
        }
    }

    #[test]
    fn scale_is_positive_and_finite(samples in samples(), vp in viewport()) {
        let t = vp.fit(&samples);
        prop_assert!(t.scale > 0.0, "scale = {}", t.scale);
        prop_assert!(t.scale.is_finite());
    }

    #[test]
    fn every_sample_lands_in_padded_area(samples in samples(), vp in viewport()) {
        let t = vp.fit(&samples);
        for s in &samples {
            let p = t.to_pixel(s);
            prop_assert!(vp.contains_inner(p), "{:?} -> {:?} outside {:?}", s, p, vp);
        }
    }

    #[test]
    fn aspect_ratio_is_preserved(samples in samples(), vp in viewport(), dx in 0.1f64..50.0) {
        let t = vp.fit(&samples);
        let a = MotionSample::new(0.0, 0.0, 0.0);
        let b = MotionSample::new(0.0, dx, dx);
        let pa = t.to_pixel(&a);
        let pb = t.to_pixel(&b);
        let horizontal = pb.x - pa.x;
        let vertical = pa.y - pb.y;
        prop_assert!((horizontal - vertical).abs() < 1e-6 * horizontal.abs().max(1.0));
    }

    #[test]
    fn higher_y_is_higher_on_screen(samples in samples(), vp in viewport(), y in -100.0f64..100.0) {
        let t = vp.fit(&samples);
        prop_assert!(t.to_pixel_y(y + 1.0) < t.to_pixel_y(y));
    }

    #[test]
    fn identical_coordinates_do_not_divide_by_zero(
        n in 1usize..10,
        x in -1e3f64..1e3,
        y in -1e3f64..1e3,
        vp in viewport(),
    ) {
        let samples: Vec<_> = (0..n).map(|i| MotionSample::new(i as f64, x, y)).collect();
        let t = vp.fit(&samples);
        prop_assert!(t.scale.is_finite() && t.scale > 0.0);
        let p = t.to_pixel(&samples[0]);
        prop_assert!(p.x.is_finite() && p.y.is_finite());
        prop_assert!(vp.contains_inner(p));
    }
}

#[test]
fn ball_fits_with_height_limited_scale() {
    let samples = [
        MotionSample::new(0.0, 0.0, 50.0),
        MotionSample::new(1.0, 0.0, 45.0),
        MotionSample::new(2.0, 0.0, 30.0),
        MotionSample::new(3.2, 0.0, 0.0),
    ];
    let t = Viewport::default().fit(&samples);
    // 480 px of height over 50 m
    assert!((t.scale - 9.6).abs() < 1e-9);
    assert!((t.to_pixel_y(0.0) - 540.0).abs() < 1e-9);
    assert!((t.to_pixel_y(50.0) - 60.0).abs() < 1e-9);
    assert!((t.to_pixel_x(0.0) - 60.0).abs() < 1e-9);
}

#[test]
fn degenerate_canvas_keeps_positive_scale() {
    let t = Viewport::new(100.0, 100.0, 80.0).fit(&[MotionSample::new(0.0, 5.0, 5.0)]);
    assert!(t.scale > 0.0);
}

#[test]
fn widest_accepted_track_still_fits() {
    let track = MotionTrack::new(vec![
        MotionSample::new(0.0, -1e307, -1e307),
        MotionSample::new(1.0, 1e307, 1e307),
    ])
    .unwrap();
    let vp = Viewport::default();
    let t = vp.fit(track.as_slice());
    assert!(t.scale > 0.0);

    let first = t.to_pixel(&track.sample(0));
    let last = t.to_pixel(&track.sample(1));
    assert!(vp.contains_inner(first), "{first:?}");
    assert!(vp.contains_inner(last), "{last:?}");
    assert!(last.x > first.x);
}

#[test]
fn overflowing_span_is_rejected_before_fitting() {
    let samples = vec![
        MotionSample::new(0.0, -1e308, 0.0),
        MotionSample::new(1.0, 1e308, 0.0),
    ];
    assert!(MotionTrack::new(samples).is_err());
}
