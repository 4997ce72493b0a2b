//! Vitrine engine crate.
//!
//! This crate owns the window + GPU runtime, the scene graph, and the frame
//! loop that demos plug into.

pub mod camera;
pub mod core;
pub mod debug;
pub mod device;
pub mod frame;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

mod world;

pub use world::{initialize_world, World, WorldConfig};
