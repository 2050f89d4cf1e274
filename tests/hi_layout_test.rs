use std::path::Path;

use hi_cubes::{
    resources::load_mesh_data,
    scene::{Part, clip_projection},
};

/// Screen-space x range covered by a part's cube at `elapsed` seconds.
fn screen_x_span(positions: &[f32], part: Part, elapsed: f32) -> (f32, f32) {
    let mvp = clip_projection(640, 480) * part.model_view(elapsed);
    positions
        .chunks_exact(3)
        .map(|p| {
            let c = mvp.transform_point([p[0], p[1], p[2]]);
            c[0] / c[3]
        })
        .fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)))
}

#[tokio::test]
async fn letters_read_left_to_right_at_start() {
    let cube = load_mesh_data(&Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/cube.obj"))
        .await
        .unwrap();

    let h_left = screen_x_span(&cube.positions, Part::HLeft, 0.0);
    let h_cross = screen_x_span(&cube.positions, Part::HCross, 0.0);
    let h_right = screen_x_span(&cube.positions, Part::HRight, 0.0);
    let i = screen_x_span(&cube.positions, Part::I, 0.0);

    assert!(h_left.1 < h_right.0, "H bars overlap: {h_left:?} {h_right:?}");
    assert!(h_right.1 < i.0, "I overlaps the H: {h_right:?} {i:?}");
    // The tilted cross bar reaches into both H bars.
    assert!(h_cross.0 < h_left.1 && h_cross.1 > h_right.0);
    // Everything is on screen.
    for (lo, hi) in [h_left, h_cross, h_right, i] {
        assert!(lo >= -1.0 && hi <= 1.0);
    }
    // The 70 radian field of view is narrow: the front of the I at x = 3 lands
    // at about 0.32 and the outer edge of the H at about -0.74.
    assert!((i.1 - 0.317).abs() < 0.01, "{i:?}");
    assert!((h_left.0 + 0.739).abs() < 0.01, "{h_left:?}");
}

#[tokio::test]
async fn spinning_i_keeps_its_footprint_centred() {
    let cube = load_mesh_data(&Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/cube.obj"))
        .await
        .unwrap();

    let start = screen_x_span(&cube.positions, Part::I, 0.0);
    let later = screen_x_span(&cube.positions, Part::I, 0.7);
    let centre = |(lo, hi): (f32, f32)| (lo + hi) / 2.0;
    assert!((centre(start) - centre(later)).abs() < 0.05);
}
