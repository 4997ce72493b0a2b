//! Cube field: spinning cubes sharing one geometry and one texture.

use std::rc::Rc;

use anyhow::Result;
use glam::{EulerRot, Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Geometry, Material, MeshLabel, Node, Texture, TextureSlot};
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{World, WorldConfig};

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo003",
    description: "cube field",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const FIELD: i32 = 5;
const SPACING: f32 = 1.5;
const CUBE: f32 = 0.8;
const FACE_COLORS: [u32; 6] = [0xff5555, 0x55ff55, 0x5555ff, 0xffff55, 0xff55ff, 0x55ffff];

fn config() -> WorldConfig {
    WorldConfig {
        camera_position: Vec3::new(0.0, 6.0, 9.0),
        background: Color::from_hex(0x101018),
        ..WorldConfig::default()
    }
}

/// One material per box face, all sampling the same texture.
fn face_materials(texture: &Rc<Texture>) -> Vec<Rc<Material>> {
    FACE_COLORS
        .iter()
        .enumerate()
        .map(|(i, &hex)| {
            Material::new(format!("face {i}"), Color::from_hex(hex))
                .with_texture(TextureSlot::Map, Rc::clone(texture))
                .shared()
        })
        .collect()
}

fn field(geometry: &Rc<Geometry>, materials: &[Rc<Material>]) -> Node {
    let offset = (FIELD - 1) as f32 * SPACING * 0.5;
    let mut field = Node::new("field").with_position(0.0, CUBE * 0.5, 0.0);
    for x in 0..FIELD {
        for z in 0..FIELD {
            field.add(
                Node::mesh(format!("cube {x},{z}"), Rc::clone(geometry), materials.to_vec()).with_position(
                    x as f32 * SPACING - offset,
                    0.0,
                    z as f32 * SPACING - offset,
                ),
            );
        }
    }
    field
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let texture = Texture::checker("crate", 64, 4, [255, 255, 255, 255], [170, 170, 170, 255]).shared();
    let materials = face_materials(&texture);
    let geometry = shapes::box_geometry(CUBE, CUBE, CUBE).shared();
    let field_id = ctx.world.scene.add(field(&geometry, &materials));
    ctx.world.panel.set("cubes", FIELD * FIELD);

    let mut label = match &ctx.font {
        Some(font) => {
            let label = MeshLabel::new(Rc::clone(font), "0 s")?;
            ctx.world.scene.add(label.node("label", 2.0).with_position(0.0, 3.0, -4.0));
            Some(label)
        }
        None => {
            ctx.world.panel.set("label", "no font (pass --font)");
            None
        }
    };
    let mut label_gate = PeriodicGate::new(1.0);

    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        if let Some(field) = world.scene.root.find_by_id_mut(field_id) {
            let mut i = 0.0;
            field.traverse_mut(&mut |node| {
                if node.mesh_ref().is_some() {
                    node.transform.rotation = Quat::from_euler(EulerRot::YXZ, t + i * 0.3, t * 0.5, 0.0);
                    i += 1.0;
                }
            });
        }

        if let Some(label) = label.as_mut() {
            if label_gate.is_elapsed(t) {
                label.set_text(format!("{t:.0} s"))?;
            }
        }
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use vitrine_engine::scene::{Disposable, SceneTeardown};

    use super::*;
    use crate::demos::testing;

    #[test]
    fn cubes_share_geometry_and_texture() {
        let (world, _registry) = testing::setup(&DEMO);
        let field = world.scene.root.find("field").unwrap();
        assert_eq!(field.children().len(), (FIELD * FIELD) as usize);

        let first = field.children()[0].mesh_ref().unwrap();
        let last = field.children().last().unwrap().mesh_ref().unwrap();
        assert!(Rc::ptr_eq(&first.geometry, &last.geometry));
        assert_eq!(first.material.iter().count(), 6);
    }

    #[test]
    fn every_cube_spins() {
        let (mut world, registry) = testing::setup(&DEMO);
        testing::tick_at(&mut world, &registry, 1.0);
        let field = world.scene.root.find("field").unwrap();
        assert!(field.children().iter().all(|c| c.transform.rotation != Quat::IDENTITY));
    }

    #[test]
    fn shared_resources_release_once() {
        let (world, registry) = testing::setup(&DEMO);
        let texture = world.scene.root.find("field").unwrap().children()[0]
            .mesh_ref()
            .unwrap()
            .material
            .get(0)
            .unwrap()
            .map()
            .unwrap();

        registry.clear();
        let mut teardown = SceneTeardown::new();
        world.release(&mut teardown);
        let report = teardown.finish();

        assert!(texture.is_disposed());
        // grid + axes + one shared box
        assert_eq!(report.geometries, 3);
        // grid + axes + six faces
        assert_eq!(report.materials, 8);
        assert_eq!(report.textures, 1);
    }

    #[test]
    fn missing_font_is_reported_not_fatal() {
        let (world, _registry) = testing::setup(&DEMO);
        assert!(world.panel.get("label").is_some());
        assert!(world.scene.root.find("label").is_none());
    }
}
