use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedBitmap;

fn solid(w: u32, h: u32, px: [u8; 4]) -> Arc<DecodedBitmap> {
    Arc::new(DecodedBitmap {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    })
}

#[test]
fn plan_centers_block_vertically() {
    let policy = LayoutPolicy::default();
    let plan = CaptionLayout::plan("一二三四五六七八九十甲乙丙丁戊", 1600, 1200, &policy);
    assert_eq!(plan.lines.len(), 3);
    assert_eq!(plan.center_x, 800.0);

    let centers: Vec<f32> = plan.line_centers().collect();
    let lh = plan.metrics.line_height;
    assert!((centers[1] - 600.0).abs() < 1e-3);
    assert!((centers[0] - (600.0 - lh)).abs() < 1e-3);
    assert!((centers[2] - (600.0 + lh)).abs() < 1e-3);
}

#[test]
fn plan_single_line_sits_on_canvas_middle() {
    let plan = CaptionLayout::plan("hi", 300, 200, &LayoutPolicy::default());
    assert_eq!(plan.lines, vec!["hi".to_owned()]);
    assert_eq!(plan.first_center_y, 100.0);
}

fn with_test_font() -> PosterConfig {
    PosterConfig {
        fonts: vec![crate::foundation::config::FontFace {
            family: "Noto Sans SC".to_owned(),
            source: std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("tests/data/DejaVuSans-Bold.ttf"),
        }],
        ..PosterConfig::default()
    }
}

fn is_ink(px: [u8; 4]) -> bool {
    px[0] < 128 && px[1] < 128 && px[2] < 128
}

#[test]
fn render_without_faces_rejects_captions() {
    let mut renderer = PosterRenderer::new(&PosterConfig::default()).unwrap();
    let mut entry = Entry::new(
        "red.png",
        "你好世界",
        solid(40, 20, [200, 10, 10, 255]),
        "ZCOOL KuaiLe",
        1600,
    )
    .unwrap();

    let err = renderer.render(&mut entry).unwrap_err();
    assert!(
        matches!(err, PosterError::FontUnavailable { ref font } if font == "ZCOOL KuaiLe"),
        "{err}"
    );
}

#[test]
fn render_blank_caption_needs_no_font() {
    let mut renderer = PosterRenderer::new(&PosterConfig::default()).unwrap();
    let mut entry = Entry::new("red.png", "  ", solid(40, 20, [200, 10, 10, 255]), "x", 1600).unwrap();

    renderer.render(&mut entry).unwrap();
    let px = entry.canvas.pixel(20, 10).unwrap();
    assert!(px[0] >= 195 && px[1] <= 15 && px[3] == 255, "{px:?}");
}

#[test]
fn render_centers_each_line_on_its_planned_position() {
    let mut renderer = PosterRenderer::new(&with_test_font()).unwrap();
    let mut entry = Entry::new(
        "white.png",
        "Hello world again",
        solid(400, 300, [255, 255, 255, 255]),
        "ZCOOL KuaiLe",
        1600,
    )
    .unwrap();

    let plan = renderer.render(&mut entry).unwrap();
    assert_eq!(plan.lines, vec!["Hello", "world", "again"]);
    let size = plan.metrics.size as f32;
    let half = plan.metrics.line_height / 2.0;
    let stack = renderer
        .fonts
        .stack_source("ZCOOL KuaiLe", &renderer.fallbacks);

    for (line, center_y) in plan.lines.iter().zip(plan.line_centers()) {
        let layout = renderer
            .fonts
            .layout_line(line, &stack, size, renderer.weight, renderer.brush)
            .unwrap();
        let expected_w = layout.width();

        let (mut x0, mut x1, mut y0, mut y1) = (u32::MAX, 0, u32::MAX, 0);
        let top = (center_y - half).max(0.0) as u32;
        let bottom = ((center_y + half) as u32).min(entry.canvas.height());
        for y in top..bottom {
            for x in 0..entry.canvas.width() {
                if is_ink(entry.canvas.pixel(x, y).unwrap()) {
                    x0 = x0.min(x);
                    x1 = x1.max(x);
                    y0 = y0.min(y);
                    y1 = y1.max(y);
                }
            }
        }
        assert!(x0 <= x1, "no ink for line {line:?}");

        let ink_w = (x1 - x0 + 1) as f32;
        assert!(
            ink_w > expected_w * 0.75 && ink_w <= expected_w + 2.0,
            "{line:?}: ink {ink_w}px vs layout {expected_w}px"
        );
        let ink_cx = (x0 + x1 + 1) as f32 / 2.0;
        assert!(
            (ink_cx - plan.center_x).abs() <= expected_w * 0.1 + 2.0,
            "{line:?}: ink center x {ink_cx} vs {}",
            plan.center_x
        );
        let ink_cy = (y0 + y1 + 1) as f32 / 2.0;
        assert!(
            (ink_cy - center_y).abs() <= size * 0.25,
            "{line:?}: ink center y {ink_cy} vs {center_y}"
        );
    }
}

#[test]
fn render_scales_large_images_down_to_the_canvas() {
    let mut renderer = PosterRenderer::new(&PosterConfig::default()).unwrap();
    let mut entry = Entry::new("big", "", solid(3200, 800, [0, 0, 255, 255]), "x", 1600).unwrap();
    assert_eq!((entry.canvas.width(), entry.canvas.height()), (1600, 400));

    renderer.render(&mut entry).unwrap();
    assert_eq!(entry.canvas.pixel(1599, 399).unwrap()[2], 255);
}
