use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Quat, Vec3};

use super::{Geometry, Material};
use crate::paint::Color;

/// Process-unique node identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Local translation/rotation/scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One material, or one per geometry draw group.
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Single(Rc<Material>),
    Multi(Vec<Rc<Material>>),
}

impl MaterialSlot {
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Material>> {
        let items: &[Rc<Material>] = match self {
            MaterialSlot::Single(m) => std::slice::from_ref(m),
            MaterialSlot::Multi(list) => list,
        };
        items.iter()
    }

    /// Material for draw group `index`. A single material covers every group.
    pub fn get(&self, index: usize) -> Option<&Rc<Material>> {
        match self {
            MaterialSlot::Single(m) => Some(m),
            MaterialSlot::Multi(list) => list.get(index),
        }
    }
}

impl From<Rc<Material>> for MaterialSlot {
    fn from(value: Rc<Material>) -> Self {
        MaterialSlot::Single(value)
    }
}

impl From<Vec<Rc<Material>>> for MaterialSlot {
    fn from(value: Vec<Rc<Material>>) -> Self {
        MaterialSlot::Multi(value)
    }
}

/// Drawable payload of a node.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Rc<Geometry>,
    pub material: MaterialSlot,
}

/// Scene tree node.
///
/// Children are owned, so the graph is a tree by construction. Resources are
/// shared through `Rc` and may be referenced from several nodes.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    mesh: Option<Mesh>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(
        name: impl Into<String>,
        geometry: Rc<Geometry>,
        material: impl Into<MaterialSlot>,
    ) -> Self {
        let mut node = Self::new(name);
        node.mesh = Some(Mesh {
            geometry,
            material: material.into(),
        });
        node
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.translation = Vec3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, s: f32) -> Self {
        self.transform.scale = Vec3::splat(s);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn mesh_ref(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Option<Mesh>) -> Option<Mesh> {
        std::mem::replace(&mut self.mesh, mesh)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Appends a child and returns its id.
    pub fn add(&mut self, child: Node) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Detaches the descendant with `id`, anywhere below this node.
    ///
    /// The detached subtree is returned untouched; its resources are not released.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if let Some(i) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(i));
        }
        self.children.iter_mut().find_map(|c| c.remove(id))
    }

    /// Depth-first search by name, including this node.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    pub fn find_by_id_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Visits this node and every descendant, parents before children.
    pub fn traverse(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Visits visible nodes with their world matrix. Hidden nodes prune their subtree.
    pub fn walk_visible(&self, parent: Mat4, f: &mut impl FnMut(&Node, Mat4)) {
        if !self.visible {
            return;
        }
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.walk_visible(world, f);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

/// Root of a renderable scene plus its clear color.
#[derive(Debug)]
pub struct Scene {
    pub root: Node,
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            root: Node::new("scene"),
            background: Color::BLACK,
        }
    }

    #[inline]
    pub fn add(&mut self, node: Node) -> NodeId {
        self.root.add(node)
    }

    #[inline]
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.root.remove(id)
    }

    #[inline]
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.root.find_mut(name)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        Node::new("root")
            .with_child(Node::new("a").with_child(Node::new("a1")))
            .with_child(Node::new("b"))
    }

    #[test]
    fn traverse_is_preorder() {
        let mut names = Vec::new();
        tree().traverse(&mut |n| names.push(n.name.clone()));
        assert_eq!(names, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn remove_detaches_nested_subtree() {
        let mut root = tree();
        let id = root.find("a").unwrap().id();
        let removed = root.remove(id).unwrap();
        assert_eq!(removed.node_count(), 2);
        assert_eq!(root.node_count(), 2);
        assert!(root.find("a1").is_none());
    }

    #[test]
    fn remove_unknown_id_is_none() {
        let mut root = tree();
        let stranger = Node::new("x");
        assert!(root.remove(stranger.id()).is_none());
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn hidden_node_prunes_subtree() {
        let mut root = tree();
        root.find_mut("a").unwrap().visible = false;
        let mut seen = Vec::new();
        root.walk_visible(Mat4::IDENTITY, &mut |n, _| seen.push(n.name.clone()));
        assert_eq!(seen, ["root", "b"]);
    }

    #[test]
    fn world_matrix_composes_parent_transform() {
        let root = Node::new("root")
            .with_position(1.0, 0.0, 0.0)
            .with_child(Node::new("child").with_position(0.0, 2.0, 0.0));
        let mut child_world = Mat4::IDENTITY;
        root.walk_visible(Mat4::IDENTITY, &mut |n, m| {
            if n.name == "child" {
                child_world = m;
            }
        });
        assert_eq!(child_world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0));
    }
}
