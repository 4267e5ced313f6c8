use super::*;

fn lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line{i}")).collect()
}

#[test]
fn fit_caps_longest_edge_and_never_upscales() {
    assert_eq!(fit_canvas_to_image(4000, 3000, 1600), (1600, 1200));
    assert_eq!(fit_canvas_to_image(3000, 4000, 1600), (1200, 1600));
    assert_eq!(fit_canvas_to_image(800, 600, 1600), (800, 600));
    assert_eq!(fit_canvas_to_image(1, 5000, 1600), (1, 1600));
}

#[test]
fn no_lines_uses_default() {
    let m = estimate_font_size(&[], 1600, 1200, &LayoutPolicy::default());
    assert_eq!(m.size, 42);
    assert_eq!(m.line_height, 54.0);
}

#[test]
fn width_driven_size() {
    // usable = 1600 * 0.84 = 1344; 1344 / 7 = 192; 192 * 0.7 = 134.4
    let m = estimate_font_size(&lines(1), 1600, 1200, &LayoutPolicy::default());
    assert_eq!(m.size, 134);
    assert!((m.line_height - 174.2).abs() < 1e-3);
}

#[test]
fn height_driven_shrink() {
    // 7 lines of 174.2 overflow 936; shrink to floor(720 / 7) = 102.
    let m = estimate_font_size(&lines(7), 1600, 1200, &LayoutPolicy::default());
    assert_eq!(m.size, 102);
    assert!(m.block_height(7) <= 1200.0 * 0.78);
}

#[test]
fn narrow_canvas_hits_floors() {
    let policy = LayoutPolicy::default();
    // usable width / 7 < 24 -> 24, then 24 * 0.7 = 16.8 -> floor 18
    let m = estimate_font_size(&lines(1), 100, 1000, &policy);
    assert_eq!(m.size, 18);

    // tiny canvas: fitted floor of 20 wins over the height cap
    let m = estimate_font_size(&lines(10), 1600, 100, &policy);
    assert_eq!(m.size, 20);
    assert!(m.block_height(10) > 100.0 * 0.78);
}

#[test]
fn block_never_exceeds_height_share() {
    let policy = LayoutPolicy::default();
    for &(w, h) in &[(1600, 1200), (1200, 1600), (900, 900), (1600, 500), (640, 480)] {
        for n in 1..=8 {
            let m = estimate_font_size(&lines(n), w, h, &policy);
            assert!(
                m.block_height(n) <= h as f32 * policy.block_height_ratio + 1e-3,
                "{w}x{h} with {n} lines -> {m:?}"
            );
        }
    }
}
