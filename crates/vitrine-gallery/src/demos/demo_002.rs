//! Particle sphere: a point cloud turned by its node transform.
//!
//! The vertex buffer is built once; animation only touches the transform.

use std::f32::consts::PI;

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::{World, WorldConfig};

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo002",
    description: "particle sphere",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const POINT_COUNT: usize = 2000;
const RADIUS: f32 = 1.5;
const SPIN: f32 = 0.2;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 70.0,
        camera_position: Vec3::new(3.0, 5.0, 8.0),
        grid: false,
        background: Color::from_hex(0x333333),
        ..WorldConfig::default()
    }
}

/// Evenly spread points on a sphere (golden-angle spiral), colored by height.
fn sphere_points(count: usize, radius: f32) -> (Vec<Vec3>, Vec<[f32; 3]>) {
    let golden = PI * (3.0 - 5f32.sqrt());
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let r = (1.0 - y * y).sqrt();
        let theta = golden * i as f32;
        positions.push(Vec3::new(theta.cos() * r, y, theta.sin() * r) * radius);

        let t = (y + 1.0) * 0.5;
        colors.push([1.0, 0.3 + 0.7 * t, 1.0 - t]);
    }
    (positions, colors)
}

fn cube(name: &str, hex: u32, x: f32) -> Node {
    Node::mesh(
        name,
        shapes::box_geometry(1.0, 1.0, 1.0).shared(),
        Material::new(name, Color::from_hex(hex)).shared(),
    )
    .with_position(x, 0.0, 0.0)
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let scene = &mut ctx.world.scene;

    scene.add(
        Node::mesh(
            "ground",
            shapes::box_geometry(8.0, 0.5, 8.0).shared(),
            Material::new("ground", Color::from_hex(0xfffffa)).shared(),
        )
        .with_position(0.0, -0.25, 0.0),
    );

    let cubes = Node::new("cubes")
        .with_position(0.0, 2.0, -3.0)
        .with_child(cube("cube red", 0xff0000, -2.0))
        .with_child(cube("cube green", 0x00ff00, 0.0))
        .with_child(cube("cube blue", 0x0000ff, 2.0));
    scene.add(cubes);

    let (positions, colors) = sphere_points(POINT_COUNT, RADIUS);
    let cloud = scene.add(
        Node::mesh(
            "cloud",
            shapes::points("cloud", &positions, &colors).shared(),
            Material::new("cloud", Color::WHITE).shared(),
        )
        .with_position(0.0, 2.0, 0.0),
    );
    ctx.world.panel.set("points", POINT_COUNT);

    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        if let Some(node) = world.scene.root.find_by_id_mut(cloud) {
            node.transform.rotation =
                Quat::from_rotation_y(t * SPIN) * Quat::from_rotation_x((t * 0.5).sin() * 0.3);
        }
        Ok(())
    });

    Ok(())
}
