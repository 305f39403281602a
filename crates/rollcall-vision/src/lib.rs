//! Camera and face-embedding seams for rollcalld
//!
//! Face detection and embedding are external capabilities: the daemon only
//! ever sees opaque [`Frame`]s and [`Descriptor`]s through the
//! [`FrameSource`] and [`FaceEmbedder`] traits. This crate provides:
//! - The `Frame` and `Descriptor` types with tolerance-based comparison
//! - The trait seams plus mock implementations for tests
//! - `ImageDirSource`, a directory-backed camera stand-in
//! - `CommandEmbedder`, which shells out to an external embedding program
//! - Frame sinks for presenting the latest capture

mod command_embedder;
mod descriptor;
mod error;
mod frame;
mod image_dir;
mod mock;
mod sink;
mod traits;

pub use command_embedder::*;
pub use descriptor::*;
pub use error::*;
pub use frame::*;
pub use image_dir::*;
pub use mock::*;
pub use sink::*;
pub use traits::*;
