// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! This module decodes still images (the landing page frame sequence)
//! into RGBA pixels suitable for uploading as egui textures.

use std::path::Path;
use thiserror::Error;

/// Why a frame could not be produced.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty image: {0}")]
    Empty(String),
}

/// A decoded image in straight (unmultiplied) RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    fn from_dynamic(img: image::DynamicImage, source: &str) -> Result<Self, MediaError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(MediaError::Empty(source.to_string()));
        }
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Decode an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage, MediaError> {
    let img = image::open(path)?;
    LoadedImage::from_dynamic(img, &path.display().to_string())
}

/// Decode an image held in memory, guessing the format from its header.
pub fn decode_image(bytes: &[u8], source: &str) -> Result<LoadedImage, MediaError> {
    let img = image::load_from_memory(bytes)?;
    LoadedImage::from_dynamic(img, source)
}

/// Fetch and decode an image over HTTP.
pub fn fetch_image(client: &reqwest::blocking::Client, url: &str) -> Result<LoadedImage, MediaError> {
    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
    decode_image(&bytes, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let loaded = decode_image(&png_bytes(4, 3), "test.png").unwrap();
        assert_eq!((loaded.width, loaded.height), (4, 3));
        assert_eq!(loaded.pixels.len(), 4 * 3 * 4);
        assert_eq!(&loaded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_image(Path::new("/definitely/not/here/001.jpg")).unwrap_err();
        assert!(matches!(err, MediaError::Io(_) | MediaError::Image(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(decode_image(b"not an image", "junk").is_err());
    }
}
