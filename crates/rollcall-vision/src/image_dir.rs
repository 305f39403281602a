//! Directory-backed frame source

use std::path::PathBuf;

use crate::{Frame, FrameSource, VisionError, VisionResult};

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Cycles through the image files of a directory, one per grab.
///
/// Stands in for a live camera: deployments point it at a directory a
/// capture job writes snapshots into, rehearsals at a folder of stills.
/// Files are ordered by name and re-read on every pass, so an external
/// writer can replace them between grabs.
pub struct ImageDirSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
}

impl ImageDirSource {
    /// Scan `dir` for supported images (png/jpg/jpeg), sorted by name.
    ///
    /// An unreadable or empty directory is an initialization failure: a
    /// camera that cannot produce frames at startup aborts the daemon.
    pub fn open(dir: impl Into<PathBuf>) -> VisionResult<Self> {
        let dir = dir.into();
        let mut files = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if supported {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(VisionError::SourceUnavailable(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        tracing::info!(dir = %dir.display(), files = files.len(), "Opened image directory source");

        Ok(Self {
            dir,
            files,
            next: 0,
        })
    }
}

impl FrameSource for ImageDirSource {
    fn grab(&mut self) -> VisionResult<Option<Frame>> {
        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();

        // A half-written file decodes next pass; treat it as transient.
        let frame = Frame::from_path(path)?;
        Ok(Some(frame))
    }

    fn describe(&self) -> String {
        format!("image directory {} ({} files)", self.dir.display(), self.files.len())
    }
}
