use super::*;

#[test]
fn new_uses_packed_stride() {
    let bmp = DecodedBitmap::new(3, 2, PixelFormat::Bgra8, vec![0u8; 24]).unwrap();
    assert_eq!(bmp.stride(), 12);
    assert_eq!(bmp.view().row(1).unwrap().len(), 12);
}

#[test]
fn short_data_is_rejected() {
    let err = DecodedBitmap::new(3, 2, PixelFormat::Bgra8, vec![0u8; 23]).unwrap_err();
    assert!(matches!(err, PresentError::Validation(_)));
}

#[test]
fn stride_smaller_than_row_is_rejected() {
    assert!(DecodedBitmap::with_stride(4, 1, PixelFormat::Bgra8, 8, vec![0u8; 16]).is_err());
}

#[test]
fn padded_stride_needs_no_padding_after_last_row() {
    let bmp = DecodedBitmap::with_stride(1, 2, PixelFormat::Bgra8, 8, vec![0u8; 12]).unwrap();
    assert_eq!(bmp.view().row(1).unwrap().len(), 4);
}

#[test]
fn zero_sized_bitmap_is_legal() {
    let bmp = DecodedBitmap::new(0, 0, PixelFormat::Bgra8, Vec::<u8>::new()).unwrap();
    assert!(bmp.view().is_empty());
    assert!(bmp.view().pixel(0, 0).is_none());
}

#[test]
fn pixel_reads_bgra_with_stride() {
    let mut data = vec![0u8; 16];
    data[8..12].copy_from_slice(&[10, 20, 30, 40]);
    let bmp = DecodedBitmap::with_stride(1, 2, PixelFormat::Bgra8, 8, data).unwrap();
    assert_eq!(bmp.view().pixel(0, 1), Some(Color::rgba(30, 20, 10, 40)));
    assert_eq!(bmp.view().pixel(1, 0), None);
}

#[test]
fn opaque_scan_ignores_stride_padding() {
    let data = vec![
        1u8, 2, 3, 255, 0, 0, 0, 0, //
        4, 5, 6, 255, 0, 0, 0, 0,
    ];
    let bmp = DecodedBitmap::with_stride(1, 2, PixelFormat::Bgra8, 8, data).unwrap();
    assert!(bmp.view().is_opaque());
}
