use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> DecodedBitmap {
    DecodedBitmap {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    }
}

#[test]
fn new_canvas_is_transparent_and_bounded() {
    let c = PosterCanvas::new(4, 3).unwrap();
    assert_eq!((c.width(), c.height()), (4, 3));
    assert_eq!(c.pixel(3, 2), Some([0, 0, 0, 0]));
    assert_eq!(c.pixel(4, 0), None);
    assert!(PosterCanvas::new(0, 3).is_err());
    assert!(PosterCanvas::new(70_000, 3).is_err());
}

#[test]
fn png_and_data_url_decode_back_to_canvas_size() {
    let c = PosterCanvas::new(5, 2).unwrap();
    let png = c.encode_png().unwrap();
    let back = image::load_from_memory(&png).unwrap();
    assert_eq!((back.width(), back.height()), (5, 2));

    let url = c.to_data_url().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}

#[test]
fn bitmap_paint_resamples_to_target() {
    let bmp = solid(8, 8, [10, 20, 30, 255]);
    assert!(bitmap_paint(&bmp, 4, 2).is_ok());
    assert!(bitmap_paint(&bmp, 8, 8).is_ok());

    let bad = DecodedBitmap {
        width: 3,
        height: 3,
        rgba8_premul: Arc::new(vec![0; 5]),
    };
    assert!(bitmap_paint(&bad, 3, 3).is_err());
}
