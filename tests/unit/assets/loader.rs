use std::io::Cursor;
use std::path::PathBuf;

use super::*;
use crate::assets::source::Fetched;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct CrossOrigin {
    bytes: Vec<u8>,
    allowed: bool,
}

impl AssetFetcher for CrossOrigin {
    fn fetch(&self, _url: &str) -> FrameIdResult<Fetched> {
        Ok(Fetched {
            bytes: self.bytes.clone(),
            cross_origin_ok: self.allowed,
        })
    }
}

#[tokio::test]
async fn loads_bytes_data_urls_and_files() {
    let png = png_bytes(3, 2, [255, 0, 0, 255]);
    let loader = ImageLoader::new(1024 * 1024);

    let a = loader.load(ImageSource::Bytes(png.clone())).await.unwrap();
    assert_eq!((a.width(), a.height()), (3, 2));

    let b = loader
        .load(ImageSource::DataUrl(source::png_data_url(&png)))
        .await
        .unwrap();
    assert_eq!(a, b);

    let dir = PathBuf::from("target").join("loader_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("photo.png");
    std::fs::write(&path, &png).unwrap();
    let c = loader.load(ImageSource::Path(path)).await.unwrap();
    assert_eq!(a, c);
}

#[tokio::test]
async fn file_size_limit_applies_before_reading() {
    let png = png_bytes(16, 16, [1, 2, 3, 255]);
    let dir = PathBuf::from("target").join("loader_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("big.png");
    std::fs::write(&path, &png).unwrap();

    let loader = ImageLoader::new(8);
    assert_eq!(loader.max_bytes(), 8);
    let err = loader.load(ImageSource::Path(path)).await.unwrap_err();
    assert!(matches!(
        err,
        FrameIdError::Decode(DecodeError::TooLarge { limit: 8, .. })
    ));
}

#[tokio::test]
async fn missing_file_and_missing_fetcher_are_io_errors() {
    let loader = ImageLoader::new(1024);
    assert!(matches!(
        loader
            .load(ImageSource::Path(PathBuf::from("target/does/not/exist.png")))
            .await,
        Err(FrameIdError::Decode(DecodeError::Io(_)))
    ));
    assert!(matches!(
        loader
            .load(ImageSource::Url("/uploads/frame.png".to_string()))
            .await,
        Err(FrameIdError::Decode(DecodeError::Io(_)))
    ));
}

#[tokio::test]
async fn url_sources_carry_cross_origin_taint() {
    let png = png_bytes(2, 2, [0, 0, 0, 255]);

    let denied = ImageLoader::new(1024 * 1024).with_fetcher(Arc::new(CrossOrigin {
        bytes: png.clone(),
        allowed: false,
    }));
    let bmp = denied
        .load(ImageSource::Url("https://cdn.example.com/f.png".to_string()))
        .await
        .unwrap();
    assert!(bmp.is_tainted());

    let allowed = ImageLoader::new(1024 * 1024).with_fetcher(Arc::new(CrossOrigin {
        bytes: png,
        allowed: true,
    }));
    let bmp = allowed
        .load(ImageSource::Url("https://cdn.example.com/f.png".to_string()))
        .await
        .unwrap();
    assert!(!bmp.is_tainted());
}
