//! Point cube: a random cloud rebuilt whenever its point count changes.
//!
//! The count steps through a fixed ladder every couple of seconds. A rebuild
//! detaches the old cloud and disposes its geometry and material directly.

use anyhow::Result;
use glam::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Disposable, Material, Node, NodeId};
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{World, WorldConfig};

use super::scatter::Scatter;
use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo011",
    description: "point cube",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const COUNTS: [usize; 4] = [1000, 2500, 5000, 10_000];
const STEP_PERIOD: f32 = 2.0;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 75.0,
        near: 0.1,
        camera_position: Vec3::new(0.0, 1.0, 5.0),
        grid: false,
        axes_size: None,
        background: Color::from_hex(0x111122),
        ..WorldConfig::default()
    }
}

fn cube_cloud(scatter: &mut Scatter, count: usize) -> Node {
    let positions: Vec<Vec3> = (0..count)
        .map(|_| Vec3::new(scatter.centered(), scatter.centered(), scatter.centered()) * 3.0)
        .collect();
    Node::mesh(
        format!("cloud {count}"),
        shapes::points("cloud", &positions, &[]).shared(),
        Material::new("cloud", Color::from_hex(0xff8822)).with_opacity(0.8).shared(),
    )
}

/// Detaches `id` and disposes what it drew with. Returns how many resources
/// were released.
fn discard(world: &mut World, id: NodeId) -> usize {
    let Some(old) = world.scene.remove(id) else {
        return 0;
    };
    let Some(mesh) = old.mesh_ref() else {
        return 0;
    };
    let geometry = usize::from(mesh.geometry.dispose());
    let materials = mesh.material.iter().filter(|m| m.dispose()).count();
    geometry + materials
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let mut scatter = Scatter::from_clock();
    let mut step = 0usize;
    let mut current = ctx.world.scene.add(cube_cloud(&mut scatter, COUNTS[step]));
    ctx.world.panel.set("count", COUNTS[step]);

    let mut gate = PeriodicGate::new(STEP_PERIOD);
    ctx.registry.subscribe(move |world: &mut World| {
        if !gate.is_elapsed(world.time.elapsed) {
            return Ok(());
        }
        let released = discard(world, current);
        step = (step + 1) % COUNTS.len();
        current = world.scene.add(cube_cloud(&mut scatter, COUNTS[step]));
        log::debug!("point cube rebuilt with {} points", COUNTS[step]);
        world.panel.set("count", COUNTS[step]);
        world.panel.set("released", released);
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use vitrine_engine::scene::Geometry;

    use super::*;
    use crate::demos::testing;

    fn cloud_geometry(world: &World) -> Rc<Geometry> {
        let node = world.scene.root.children().iter().find(|n| n.name.starts_with("cloud")).unwrap();
        Rc::clone(&node.mesh_ref().unwrap().geometry)
    }

    fn count(world: &World) -> u64 {
        world.panel.get("count").and_then(|v| v.as_u64()).unwrap()
    }

    #[test]
    fn count_steps_and_old_cloud_is_disposed() {
        let (mut world, registry) = testing::setup(&DEMO);
        let first = cloud_geometry(&world);
        assert_eq!(first.element_count(), 1000);

        testing::tick_at(&mut world, &registry, 2.0);

        assert!(first.is_disposed());
        assert_eq!(count(&world), 2500);
        assert_eq!(cloud_geometry(&world).element_count(), 2500);
        assert_eq!(world.panel.get("released").and_then(|v| v.as_u64()), Some(2));
    }

    #[test]
    fn ladder_wraps_around() {
        let (mut world, registry) = testing::setup(&DEMO);
        for t in [2.0, 4.0, 6.0, 8.0] {
            testing::tick_at(&mut world, &registry, t);
        }
        assert_eq!(count(&world), 1000);
        let clouds = world.scene.root.children().iter().filter(|n| n.name.starts_with("cloud")).count();
        assert_eq!(clouds, 1);
    }

    #[test]
    fn discarding_a_missing_node_releases_nothing() {
        let (mut world, _registry) = testing::setup(&DEMO);
        let stray = Node::new("stray").id();
        assert_eq!(discard(&mut world, stray), 0);
    }
}
