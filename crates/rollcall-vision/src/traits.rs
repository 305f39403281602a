//! Trait seams between the daemon and its vision capabilities

use crate::{Descriptor, Frame, VisionResult};

/// A camera-like source of frames.
///
/// Implementations may be stateful (device handles, file cursors),
/// hence `&mut self`.
pub trait FrameSource: Send {
    /// Grab the next frame. `Ok(None)` means no frame is available this
    /// tick; the caller should simply try again on the next one.
    fn grab(&mut self) -> VisionResult<Option<Frame>>;

    /// Human-readable description for logs and health output.
    fn describe(&self) -> String;
}

/// Computes face descriptors for a frame.
///
/// A frame may contain any number of faces, including none; one
/// descriptor is returned per face found.
pub trait FaceEmbedder: Send {
    fn embed(&mut self, frame: &Frame) -> VisionResult<Vec<Descriptor>>;
}

/// Receives captured frames for presentation.
///
/// The daemon presents every successfully grabbed frame, whether or not
/// anything was detected in it.
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame) -> VisionResult<()>;
}
