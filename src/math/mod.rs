//! Mathematical utilities for culling and region bookkeeping

pub mod aabb;
pub mod rect;
pub mod frustum;

pub use aabb::Aabb;
pub use rect::Rect2i;
pub use frustum::{Plane, Frustum};
