//! Frame type shared between frame sources, embedders, and sinks

use std::io::Cursor;
use std::path::Path;

use image::{ImageEncoder, RgbImage};

use crate::{VisionError, VisionResult};

/// Pixel channels per frame. Frames are always RGB8.
pub const FRAME_CHANNELS: usize = 3;

/// A single camera frame: contiguous RGB8 bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; everything past the
/// frame source treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * FRAME_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A uniformly colored frame. Used by mocks and rehearsal tooling.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * FRAME_CHANNELS);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height)
    }

    /// Decode an image file into a frame, converting to RGB8.
    pub fn from_path(path: &Path) -> VisionResult<Self> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self::new(img.into_raw(), width, height))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn to_rgb_image(&self) -> VisionResult<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            VisionError::SinkFailed("frame buffer does not match its dimensions".into())
        })
    }

    /// Encode the frame as PNG bytes (the wire format for external embedders).
    pub fn to_png_bytes(&self) -> VisionResult<Vec<u8>> {
        let img = self.to_rgb_image()?;
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(Cursor::new(&mut bytes)).write_image(
            img.as_raw(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(bytes)
    }

    /// Write the frame to disk; the format follows the file extension.
    pub fn save(&self, path: &Path) -> VisionResult<()> {
        let img = self.to_rgb_image()?;
        img.save(path)?;
        Ok(())
    }
}
