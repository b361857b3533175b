pub mod document;
pub mod error;

pub use document::{Chunk, ChunkMetadata, Document, ScoredChunk};
pub use error::{BuddyError, Result};
