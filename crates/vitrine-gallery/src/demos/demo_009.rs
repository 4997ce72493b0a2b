//! Particle trio: a sphere of points, a drifting colored cloud, and a
//! handful of bright sprites, all turning slowly together.
//!
//! Every point in the drifting cloud moves by the same offset, so the drift
//! is carried by the node transform instead of the vertex buffer.

use std::f32::consts::{PI, TAU};

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::{World, WorldConfig};

use super::scatter::Scatter;
use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo009",
    description: "particle trio",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const SPHERE_SEGMENTS: usize = 32;
const CLOUD_POINTS: usize = 500;
const SPRITE_POINTS: usize = 50;
const CLOUD_BASE: Vec3 = Vec3::new(0.0, -2.0, 0.0);
const SPRITE_BASE: Vec3 = Vec3::new(0.0, 2.0, 0.0);
const DRIFT_RATE: f32 = 0.5;
const SPIN: f32 = 0.1;

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

/// Vertices of a unit UV sphere: `segments + 1` rings of `segments + 1` points.
fn uv_sphere(segments: usize) -> Vec<Vec3> {
    let mut points = Vec::with_capacity((segments + 1) * (segments + 1));
    for iy in 0..=segments {
        let theta = iy as f32 / segments as f32 * PI;
        for ix in 0..=segments {
            let phi = ix as f32 / segments as f32 * TAU;
            points.push(Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()));
        }
    }
    points
}

/// Random points in a 3-unit cube around the origin, each with its own color.
fn random_cloud(scatter: &mut Scatter, count: usize) -> (Vec<Vec3>, Vec<[f32; 3]>) {
    (0..count)
        .map(|_| {
            let p = Vec3::new(scatter.centered(), scatter.centered(), scatter.centered()) * 3.0;
            (p, scatter.color())
        })
        .unzip()
}

/// Offset of the drifting cloud from its base at `elapsed` seconds.
fn drift(elapsed: f32) -> Vec3 {
    let t = elapsed * DRIFT_RATE;
    Vec3::new(t.cos(), t.sin(), t.sin())
}

fn points_node(name: &str, positions: &[Vec3], colors: &[[f32; 3]], tint: Color) -> Node {
    Node::mesh(
        name,
        shapes::points(name, positions, colors).shared(),
        Material::new(name, tint).shared(),
    )
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let mut scatter = Scatter::from_clock();

    let sphere = uv_sphere(SPHERE_SEGMENTS);
    let (cloud, cloud_colors) = random_cloud(&mut scatter, CLOUD_POINTS);
    let (sprites, sprite_colors) = random_cloud(&mut scatter, SPRITE_POINTS);
    ctx.world.panel.set("points", sphere.len() + cloud.len() + sprites.len());

    let cloud_node = points_node("cloud", &cloud, &cloud_colors, Color::WHITE)
        .with_position(CLOUD_BASE.x, CLOUD_BASE.y, CLOUD_BASE.z);
    let cloud_id = cloud_node.id();

    let group = Node::new("particles")
        .with_child(points_node("sphere", &sphere, &[], Color::from_hex(0x888888)))
        .with_child(cloud_node)
        .with_child(
            points_node("sprites", &sprites, &sprite_colors, Color::WHITE)
                .with_position(SPRITE_BASE.x, SPRITE_BASE.y, SPRITE_BASE.z),
        );
    let group_id = ctx.world.scene.add(group);

    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        if let Some(group) = world.scene.root.find_by_id_mut(group_id) {
            group.transform.rotation = Quat::from_rotation_y(t * SPIN);
        }
        if let Some(cloud) = world.scene.root.find_by_id_mut(cloud_id) {
            cloud.transform.translation = CLOUD_BASE + drift(t);
        }
        Ok(())
    });

    Ok(())
}
