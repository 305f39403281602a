//! Frame sinks for presenting captures

use std::path::PathBuf;

use crate::{Frame, FrameSink, VisionResult};

/// Discards every frame. Used when no presentation surface is configured.
#[derive(Debug, Default)]
pub struct NullFrameSink;

impl NullFrameSink {
    pub fn new() -> Self {
        Self
    }
}

impl FrameSink for NullFrameSink {
    fn present(&mut self, _frame: &Frame) -> VisionResult<()> {
        Ok(())
    }
}

/// Writes the latest frame to a fixed PNG path for external viewers.
///
/// The write goes to a temporary sibling first and is renamed into place,
/// so a viewer polling the path never sees a half-written file.
pub struct PngFrameSink {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl PngFrameSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tmp_path = path.with_extension("png.tmp");
        Self { path, tmp_path }
    }
}

impl FrameSink for PngFrameSink {
    fn present(&mut self, frame: &Frame) -> VisionResult<()> {
        // Encode explicitly: the temp file's extension is not ".png".
        std::fs::write(&self.tmp_path, frame.to_png_bytes()?)?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }
}
