//! Mock vision implementations for testing

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{Descriptor, FaceEmbedder, Frame, FrameSink, FrameSource, VisionError, VisionResult};

/// Mock frame source for unit/integration testing.
///
/// All state is shared behind `Arc`, so tests can keep a clone while the
/// engine owns the boxed original and still script outcomes or read the
/// grab counter afterwards.
#[derive(Clone)]
pub struct MockFrameSource {
    queue: Arc<Mutex<VecDeque<Frame>>>,
    default_frame: Arc<Mutex<Option<Frame>>>,

    /// Configure grab to fail
    pub fail_grab: Arc<Mutex<bool>>,

    grab_count: Arc<AtomicUsize>,
}

impl MockFrameSource {
    /// A source with no frames: every grab returns `Ok(None)`.
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            default_frame: Arc::new(Mutex::new(None)),
            fail_grab: Arc::new(Mutex::new(false)),
            grab_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that yields a copy of `frame` on every grab.
    pub fn with_default_frame(frame: Frame) -> Self {
        let source = Self::new();
        *source.default_frame.lock().unwrap() = Some(frame);
        source
    }

    /// Queue a frame to be returned ahead of the default.
    pub fn push_frame(&self, frame: Frame) {
        self.queue.lock().unwrap().push_back(frame);
    }

    /// Number of grab attempts made so far (failures included).
    pub fn grab_count(&self) -> usize {
        self.grab_count.load(Ordering::SeqCst)
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockFrameSource {
    fn grab(&mut self) -> VisionResult<Option<Frame>> {
        self.grab_count.fetch_add(1, Ordering::SeqCst);

        if *self.fail_grab.lock().unwrap() {
            return Err(VisionError::SourceUnavailable("Mock grab failure".into()));
        }

        if let Some(frame) = self.queue.lock().unwrap().pop_front() {
            return Ok(Some(frame));
        }

        Ok(self.default_frame.lock().unwrap().clone())
    }

    fn describe(&self) -> String {
        "mock frame source".into()
    }
}

/// Mock embedder returning scripted descriptor sets.
#[derive(Clone)]
pub struct MockEmbedder {
    script: Arc<Mutex<VecDeque<Vec<Descriptor>>>>,
    default_result: Arc<Mutex<Vec<Descriptor>>>,

    /// Configure embed to fail
    pub fail_embed: Arc<Mutex<bool>>,

    embed_count: Arc<AtomicUsize>,
}

impl MockEmbedder {
    /// An embedder that finds no faces in any frame.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_result: Arc::new(Mutex::new(Vec::new())),
            fail_embed: Arc::new(Mutex::new(false)),
            embed_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// An embedder that returns `descriptors` for every frame.
    pub fn always(descriptors: Vec<Descriptor>) -> Self {
        let embedder = Self::new();
        *embedder.default_result.lock().unwrap() = descriptors;
        embedder
    }

    /// Queue a one-shot result returned ahead of the default.
    pub fn push_result(&self, descriptors: Vec<Descriptor>) {
        self.script.lock().unwrap().push_back(descriptors);
    }

    /// Replace the default result returned once the script runs out.
    pub fn set_default(&self, descriptors: Vec<Descriptor>) {
        *self.default_result.lock().unwrap() = descriptors;
    }

    /// Number of embed calls made so far (failures included).
    pub fn embed_count(&self) -> usize {
        self.embed_count.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceEmbedder for MockEmbedder {
    fn embed(&mut self, _frame: &Frame) -> VisionResult<Vec<Descriptor>> {
        self.embed_count.fetch_add(1, Ordering::SeqCst);

        if *self.fail_embed.lock().unwrap() {
            return Err(VisionError::EmbedFailed("Mock embed failure".into()));
        }

        if let Some(descriptors) = self.script.lock().unwrap().pop_front() {
            return Ok(descriptors);
        }

        Ok(self.default_result.lock().unwrap().clone())
    }
}

/// Frame sink that counts presentations, for asserting side effects.
#[derive(Clone, Default)]
pub struct CountingFrameSink {
    presented: Arc<AtomicUsize>,
}

impl CountingFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> usize {
        self.presented.load(Ordering::SeqCst)
    }
}

impl FrameSink for CountingFrameSink {
    fn present(&mut self, _frame: &Frame) -> VisionResult<()> {
        self.presented.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
