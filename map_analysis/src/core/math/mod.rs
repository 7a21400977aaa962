//! Core/common math functions for working with angles, 2D space and segments.
mod base_math;
mod vector2;

pub use base_math::*;
pub use vector2::{vec2, Vector2};
