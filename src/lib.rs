//! Chunkstream - chunk streaming and render queue management for voxel worlds

pub mod core;
pub mod math;
pub mod world;
pub mod mesh;
pub mod streaming;
pub mod render;
