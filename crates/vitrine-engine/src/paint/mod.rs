//! Color model shared by materials, clear colors and procedural textures.

pub mod color;

pub use color::Color;
