//! Chunk identity and external world contracts

pub mod chunk;
pub mod provider;

pub use chunk::{ChunkCoord, ChunkStatus, VerticalSlice, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
pub use provider::{ChunkProvider, Tessellator};
