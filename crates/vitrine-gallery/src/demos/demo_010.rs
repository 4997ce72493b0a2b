//! Point wave: a colored cloud whose heights follow a travelling sine.
//!
//! Each point's height depends on its own x, so the vertices are rewritten in
//! place every tick and the renderer refreshes the buffer before drawing.

use std::rc::Rc;

use anyhow::Result;
use glam::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::{World, WorldConfig};

use super::scatter::Scatter;
use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo010",
    description: "point wave",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const POINT_COUNT: usize = 500;
const EXTENT: f32 = 3.0;
const WAVE_NUMBER: f32 = 3.0;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 75.0,
        near: 0.1,
        camera_position: Vec3::new(0.0, 1.0, 6.0),
        grid: false,
        axes_size: None,
        background: Color::from_hex(0x111122),
        ..WorldConfig::default()
    }
}

/// Height of a point at `x` after `elapsed` seconds.
fn wave_height(x: f32, elapsed: f32) -> f32 {
    (elapsed + x * WAVE_NUMBER).sin()
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let mut scatter = Scatter::from_clock();
    let (positions, colors): (Vec<Vec3>, Vec<[f32; 3]>) = (0..POINT_COUNT)
        .map(|_| {
            let p = Vec3::new(scatter.centered(), scatter.centered(), scatter.centered()) * EXTENT;
            (p, scatter.color())
        })
        .unzip();

    let geometry = shapes::points("wave", &positions, &colors).shared();
    ctx.world.scene.add(Node::mesh(
        "wave",
        Rc::clone(&geometry),
        Material::new("wave", Color::WHITE).shared(),
    ));
    ctx.world.panel.set("points", POINT_COUNT);

    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        geometry.update_vertices(|vertices| {
            for v in vertices {
                v.position[1] = wave_height(v.position[0], t);
            }
        });
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use vitrine_engine::scene::SceneTeardown;

    use super::*;
    use crate::demos::testing;

    #[test]
    fn heights_follow_the_wave() {
        let (mut world, registry) = testing::setup(&DEMO);
        testing::tick_at(&mut world, &registry, 1.5);

        let geometry = &world.scene.root.find("wave").unwrap().mesh_ref().unwrap().geometry;
        assert!(geometry.needs_refresh());
        let vertices = geometry.vertices();
        assert_eq!(vertices.len(), POINT_COUNT);
        for v in vertices.iter() {
            assert_eq!(v.position[1], wave_height(v.position[0], 1.5));
        }
    }

    #[test]
    fn wave_leaves_x_and_z_alone() {
        let (mut world, registry) = testing::setup(&DEMO);
        let geometry = Rc::clone(&world.scene.root.find("wave").unwrap().mesh_ref().unwrap().geometry);
        let before: Vec<[f32; 3]> = geometry.vertices().iter().map(|v| v.position).collect();

        testing::tick_at(&mut world, &registry, 0.7);

        for (v, old) in geometry.vertices().iter().zip(&before) {
            assert_eq!((v.position[0], v.position[2]), (old[0], old[2]));
        }
    }

    #[test]
    fn released_wave_stops_moving() {
        let (mut world, registry) = testing::setup(&DEMO);
        let geometry = Rc::clone(&world.scene.root.find("wave").unwrap().mesh_ref().unwrap().geometry);
        SceneTeardown::new().dispose_tree(&world.scene.root);

        let y = geometry.vertices()[0].position[1];
        testing::tick_at(&mut world, &registry, 2.0);
        assert_eq!(geometry.vertices()[0].position[1], y);
        assert!(!geometry.needs_refresh());
    }
}
