use std::io::Cursor;

use super::*;

#[test]
fn decode_png_keeps_straight_alpha() {
    let src = RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(src.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let img = decode_raster(&buf).unwrap();
    assert_eq!(img.dimensions(), (1, 1));
    assert_eq!(img, src);
}

#[test]
fn garbage_bytes_fail() {
    assert!(decode_raster(b"definitely not a png").is_err());
}

#[test]
fn missing_file_is_asset_error() {
    let err = read_raster(Path::new("target/does-not-exist/nothing.png")).unwrap_err();
    assert!(matches!(err, ComposeError::Asset(_)));
    assert!(err.to_string().starts_with("asset error:"));
}
