use std::io::Cursor;

use super::*;
use crate::foundation::error::FrameIdError;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    let dyn_img = image::DynamicImage::ImageRgba8(img);
    let dyn_img = if format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(dyn_img.to_rgb8())
    } else {
        dyn_img
    };
    dyn_img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let bytes = encode(img, image::ImageFormat::Png);

    let bitmap = decode_bitmap(&bytes, 1024 * 1024).unwrap();
    assert_eq!(bitmap.width(), 1);
    assert_eq!(bitmap.height(), 1);
    assert!(!bitmap.is_tainted());
    assert_eq!(
        bitmap.as_premul_bytes(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_jpeg_is_opaque() {
    let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 200, 30, 255]));
    let bytes = encode(img, image::ImageFormat::Jpeg);

    let bitmap = decode_bitmap(&bytes, 1024 * 1024).unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (4, 3));
    assert!(bitmap.as_premul_bytes().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn size_limit_is_checked_before_decoding() {
    // Not an image at all: the size check must fire first.
    let junk = vec![0u8; 64];
    let err = decode_bitmap(&junk, 32).unwrap_err();
    assert!(matches!(
        err,
        FrameIdError::Decode(DecodeError::TooLarge {
            size: 64,
            limit: 32
        })
    ));
}

#[test]
fn unsupported_and_broken_inputs_are_decode_errors() {
    let gif_magic = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
    assert!(matches!(
        decode_bitmap(gif_magic, 1024),
        Err(FrameIdError::Decode(DecodeError::UnsupportedFormat))
    ));

    assert!(matches!(
        decode_bitmap(b"hello world", 1024),
        Err(FrameIdError::Decode(DecodeError::UnsupportedFormat))
    ));

    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]));
    let mut png = encode(img, image::ImageFormat::Png);
    png.truncate(png.len() / 2);
    assert!(matches!(
        decode_bitmap(&png, 1024 * 1024),
        Err(FrameIdError::Decode(DecodeError::Malformed(_)))
    ));
}
