//! External-process face embedder

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::{Descriptor, FaceEmbedder, Frame, VisionError, VisionResult};

/// Runs an external embedding program once per frame.
///
/// The frame is piped to the program's stdin as PNG. The program must
/// consume all of stdin before writing, then print a JSON array of
/// descriptor arrays (`[[0.12, ...], ...]`, one inner array per face) on
/// stdout and exit zero. Keeping inference out of process means the
/// daemon carries no native model dependencies.
pub struct CommandEmbedder {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEmbedder {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl FaceEmbedder for CommandEmbedder {
    fn embed(&mut self, frame: &Frame) -> VisionResult<Vec<Descriptor>> {
        let png = frame.to_png_bytes()?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                VisionError::EmbedFailed(format!("spawn {}: {}", self.program.display(), e))
            })?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| VisionError::EmbedFailed("no stdin handle".into()))?;
            stdin.write_all(&png)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VisionError::EmbedFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let raw: Vec<Vec<f32>> = serde_json::from_slice(&output.stdout)
            .map_err(|e| VisionError::EmbedFailed(format!("invalid descriptor JSON: {}", e)))?;

        Ok(raw.into_iter().map(Descriptor::new).collect())
    }
}
