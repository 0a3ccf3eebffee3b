//! Skyfall - interactive solar system with near-Earth asteroid impacts.
//!
//! A library crate providing the scene, loading, animation and collision
//! components for the binary and for integration tests.

pub mod animation;
pub mod asteroid;
pub mod camera;
pub mod collision;
pub mod input;
pub mod metadata;
pub mod orbit;
pub mod picking;
pub mod render;
pub mod time;
pub mod types;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
