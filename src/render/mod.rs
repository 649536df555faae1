//! Per-frame queue building and draw dispatch

pub mod visibility;
pub mod queues;
pub mod subscribers;
pub mod world;

pub use queues::{DrawLists, RenderQueues};
pub use subscribers::{ChunkDraw, DrawPass, DrawSink, RenderSubscriber};
pub use world::WorldRenderer;
