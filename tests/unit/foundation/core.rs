use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 4).is_err());
    assert!(Canvas::new(4, 0).is_err());
    assert_eq!(Canvas::new(3, 2).unwrap().pixel_count(), 6);
}

#[test]
fn rgba8_conversion_is_lossless_at_unorm_steps() {
    let data: Vec<u8> = vec![0, 64, 128, 255, 255, 1, 2, 3];
    let frame = Frame::from_rgba8(2, 1, &data).unwrap();
    assert_eq!(frame.pixel(0, 0).unwrap()[3], 1.0);
    assert_eq!(frame.to_rgba8(), data);
}

#[test]
fn rgba8_rejects_wrong_length() {
    assert!(Frame::from_rgba8(2, 2, &[0u8; 12]).is_err());
}

#[test]
fn to_rgba8_clamps_out_of_range_channels() {
    let canvas = Canvas::new(1, 1).unwrap();
    let frame = Frame::filled(canvas, [-0.5, 2.0, f32::NAN, 0.5]);
    assert_eq!(frame.to_rgba8(), vec![0, 255, 0, 128]);
}

#[test]
fn pixel_lookup_is_row_major_and_bounds_checked() {
    let canvas = Canvas::new(2, 2).unwrap();
    let frame = Frame::from_pixels(
        canvas,
        vec![
            [0.0, 0.0, 0.0, 1.0],
            [0.1, 0.0, 0.0, 1.0],
            [0.2, 0.0, 0.0, 1.0],
            [0.3, 0.0, 0.0, 1.0],
        ],
    )
    .unwrap();
    assert_eq!(frame.pixel(0, 1).unwrap()[0], 0.2);
    assert!(frame.pixel(2, 0).is_none());
    assert!(Frame::from_pixels(canvas, vec![]).is_err());
}

#[test]
fn try_filled_reports_unallocatable_sizes() {
    let frame = Frame::try_filled(Canvas::new(2, 1).unwrap(), [0.0, 0.0, 0.0, 1.0]).unwrap();
    assert_eq!(frame.pixels, vec![[0.0, 0.0, 0.0, 1.0]; 2]);

    let huge = Canvas::new(u32::MAX, u32::MAX).unwrap();
    assert!(matches!(
        Frame::try_filled(huge, [0.0; 4]),
        Err(AccumError::Resource(_))
    ));
}
