//! The student roster: identities paired with reference face descriptors

use rollcall_config::StudentSource;
use rollcall_util::StudentId;
use rollcall_vision::{Descriptor, FaceEmbedder, Frame, VisionError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Errors while building the roster at startup
#[derive(Debug, Error)]
pub enum RosterError {
    /// A configured reference photo could not be read or decoded.
    /// Configuration errors fail startup instead of surfacing later
    /// inside the embedding pipeline.
    #[error("Reference photo for '{student}' unavailable: {path}: {source}")]
    ImageUnavailable {
        student: StudentId,
        path: PathBuf,
        #[source]
        source: VisionError,
    },

    /// The embedder itself failed on a readable image.
    #[error("Embedding failed for '{student}': {source}")]
    EmbedFailed {
        student: StudentId,
        #[source]
        source: VisionError,
    },
}

/// The recognizable roster, immutable after startup.
///
/// `names[i]` aligns with `descriptors[i]` for all i; matching depends on
/// that alignment. Students whose photo produced no face descriptor are
/// excluded entirely (they can never be matched on camera, only marked
/// absent on the sheet).
#[derive(Debug, Clone)]
pub struct Roster {
    names: Vec<StudentId>,
    descriptors: Vec<Descriptor>,
}

impl Roster {
    /// Build the roster from configured (name, photo) pairs.
    ///
    /// For each student in configuration order, the photo is decoded and
    /// handed to the embedder. An unreadable photo fails the build; a
    /// readable photo with no detectable face logs a warning and skips
    /// the student. Only the first face in a reference photo is kept.
    pub fn build(
        sources: &[StudentSource],
        embedder: &mut dyn FaceEmbedder,
    ) -> Result<Self, RosterError> {
        let mut names = Vec::new();
        let mut descriptors = Vec::new();

        for source in sources {
            let frame =
                Frame::from_path(&source.image).map_err(|e| RosterError::ImageUnavailable {
                    student: source.name.clone(),
                    path: source.image.clone(),
                    source: e,
                })?;

            let found = embedder.embed(&frame).map_err(|e| RosterError::EmbedFailed {
                student: source.name.clone(),
                source: e,
            })?;

            match found.into_iter().next() {
                Some(descriptor) => {
                    names.push(source.name.clone());
                    descriptors.push(descriptor);
                }
                None => {
                    warn!(
                        student = %source.name,
                        image = %source.image.display(),
                        "No face found in reference photo; student will not be recognizable"
                    );
                }
            }
        }

        info!(
            recognizable = names.len(),
            configured = sources.len(),
            "Roster built"
        );

        Ok(Self { names, descriptors })
    }

    /// Roster from already-computed descriptors, aligned by index.
    pub fn from_parts(names: Vec<StudentId>, descriptors: Vec<Descriptor>) -> Self {
        assert_eq!(names.len(), descriptors.len());
        Self { names, descriptors }
    }

    /// Identify a detected face: the *first* roster entry (in enrollment
    /// order) within tolerance wins, or `None` for an unknown face.
    ///
    /// Deliberately first-match, not nearest-match: roster order is
    /// configuration order, so operators control the tie-break between
    /// near-duplicate reference photos.
    pub fn identify(&self, candidate: &Descriptor, tolerance: f32) -> Option<&StudentId> {
        let matches = rollcall_vision::compare_against(&self.descriptors, candidate, tolerance);
        matches
            .iter()
            .position(|m| *m)
            .map(|i| &self.names[i])
    }

    pub fn names(&self) -> &[StudentId] {
        &self.names
    }

    pub fn contains(&self, student: &StudentId) -> bool {
        self.names.contains(student)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
