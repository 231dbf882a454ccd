//! Turning chunk faces into something a GPU can draw.

pub mod mesh;
pub mod texture;
