use std::collections::HashSet;

use super::resource::{Disposable, Resource, ResourceId, ResourceKind};
use super::{Material, MaterialSlot, Node};

/// Counts of what a teardown actually released.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TeardownReport {
    pub nodes: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl TeardownReport {
    pub fn resources(&self) -> usize {
        self.geometries + self.materials + self.textures
    }

    fn count(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Geometry => self.geometries += 1,
            ResourceKind::Material => self.materials += 1,
            ResourceKind::Texture => self.textures += 1,
        }
    }
}

/// Releases the GPU side of every resource reachable from a scene tree.
///
/// Identities are tracked across calls, so a resource shared between nodes,
/// materials or separate subtrees is released once per teardown.
#[derive(Debug, Default)]
pub struct SceneTeardown {
    released: HashSet<ResourceId>,
    report: TeardownReport,
}

impl SceneTeardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `root` and everything below it.
    pub fn dispose_tree(&mut self, root: &Node) {
        root.traverse(&mut |node| {
            self.report.nodes += 1;
            let Some(mesh) = node.mesh_ref() else { return };

            self.dispose_resource(Resource::Geometry(mesh.geometry.clone()));
            match &mesh.material {
                MaterialSlot::Single(m) => self.dispose_material(m),
                MaterialSlot::Multi(list) => list.iter().for_each(|m| self.dispose_material(m)),
            }
        });
    }

    /// Releases a loose resource. Materials also release their textures.
    ///
    /// Returns `true` if this call released it.
    pub fn dispose_resource(&mut self, resource: Resource) -> bool {
        if let Resource::Material(m) = &resource {
            for texture in m.textures() {
                self.dispose_resource(Resource::Texture(texture));
            }
        }

        if !self.released.insert(resource.resource_id()) {
            return false;
        }
        if !resource.dispose() {
            // Released elsewhere before this teardown saw it.
            return false;
        }
        self.report.count(resource.kind());
        true
    }

    fn dispose_material(&mut self, material: &std::rc::Rc<Material>) {
        self.dispose_resource(Resource::Material(material.clone()));
    }

    pub fn report(&self) -> TeardownReport {
        self.report
    }

    pub fn finish(self) -> TeardownReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::paint::Color;
    use crate::scene::{Geometry, Texture, TextureSlot, Topology, Vertex};

    fn geometry(label: &str) -> Rc<Geometry> {
        Geometry::new(
            label,
            Topology::Triangles,
            vec![Vertex::new([0.0; 3], [0.0; 2]); 3],
            None,
        )
        .shared()
    }

    // ── shared resources ──────────────────────────────────────────────────

    #[test]
    fn depth_three_tree_with_shared_texture_releases_each_once() {
        let shared_tex = Texture::solid("shared", [255; 4]).shared();
        let own_tex = Texture::solid("own", [0; 4]).shared();

        let mat_a = Material::new("a", Color::WHITE)
            .with_texture(TextureSlot::Map, Rc::clone(&shared_tex))
            .shared();
        let mat_b = Material::new("b", Color::WHITE)
            .with_texture(TextureSlot::Map, Rc::clone(&shared_tex))
            .with_texture(TextureSlot::AlphaMap, Rc::clone(&own_tex))
            .shared();
        let shared_geo = geometry("shared");

        let root = Node::new("root")
            .with_child(
                Node::mesh("l1", Rc::clone(&shared_geo), Rc::clone(&mat_a)).with_child(
                    Node::mesh("l2", geometry("l2"), vec![Rc::clone(&mat_a), Rc::clone(&mat_b)])
                        .with_child(Node::mesh("l3", Rc::clone(&shared_geo), Rc::clone(&mat_b))),
                ),
            )
            .with_child(Node::new("empty"));

        let mut teardown = SceneTeardown::new();
        teardown.dispose_tree(&root);
        let report = teardown.finish();

        assert_eq!(
            report,
            TeardownReport {
                nodes: 5,
                geometries: 2,
                materials: 2,
                textures: 2,
            }
        );
        assert!(shared_tex.is_disposed());
        assert!(own_tex.is_disposed());
        assert!(mat_b.is_disposed());
        assert!(shared_geo.is_disposed());
    }

    #[test]
    fn second_walk_releases_nothing() {
        let root = Node::mesh("m", geometry("g"), Material::new("m", Color::WHITE).shared());

        let mut teardown = SceneTeardown::new();
        teardown.dispose_tree(&root);
        teardown.dispose_tree(&root);
        assert_eq!(teardown.report().resources(), 2);
        assert_eq!(teardown.report().nodes, 2);

        // A fresh walker sees already-released resources and skips them.
        let mut again = SceneTeardown::new();
        again.dispose_tree(&root);
        assert_eq!(again.finish().resources(), 0);
    }

    // ── loose resources ───────────────────────────────────────────────────

    #[test]
    fn loose_material_releases_its_textures() {
        let tex = Texture::solid("t", [1; 4]).shared();
        let mat = Material::new("m", Color::WHITE)
            .with_texture(TextureSlot::Map, Rc::clone(&tex))
            .shared();

        let mut teardown = SceneTeardown::new();
        assert!(teardown.dispose_resource(Resource::from(Rc::clone(&mat))));
        assert!(!teardown.dispose_resource(Resource::from(Rc::clone(&tex))));
        assert_eq!(teardown.report().materials, 1);
        assert_eq!(teardown.report().textures, 1);
    }
}
