//! Scene graph and GPU-backed resources.
//!
//! Responsibilities:
//! - own the node tree (children by value, resources by `Rc`)
//! - hold CPU data for geometry/material/texture and upload it lazily
//! - release GPU memory exactly once through `SceneTeardown`

mod geometry;
mod material;
mod node;
mod resource;
mod teardown;
mod texture;

pub mod helpers;
pub mod label;
pub mod shapes;

pub use geometry::{DrawGroup, Geometry, Topology, Vertex};
pub use label::MeshLabel;
pub use material::{Material, TextureSlot};
pub use node::{MaterialSlot, Mesh, Node, NodeId, Scene, Transform};
pub use resource::{Disposable, Resource, ResourceId, ResourceKind};
pub use teardown::{SceneTeardown, TeardownReport};
pub use texture::{Texture, TextureFilter};

pub(crate) use material::MaterialGpu;
