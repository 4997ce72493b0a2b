//! Crater: a wireframe plane whose vertices are lifted by distance from center.

use std::f32::consts::FRAC_PI_2;

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::WorldConfig;

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo007",
    description: "crater",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const SIZE: f32 = 100.0;
const SEGMENTS: usize = 30;
const RIM_RADIUS: f32 = 20.0;
const RIM_HEIGHT: f32 = 20.0;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 75.0,
        near: 0.1,
        camera_position: Vec3::new(0.0, 30.0, 70.0),
        grid_size: 110.0,
        axes_size: Some(70.0),
        ..WorldConfig::default()
    }
}

fn smoothstep(min: f32, max: f32, value: f32) -> f32 {
    let x = ((value - min) / (max - min)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Grid vertices of an XY plane, row-major from +Y, lifted along +Z.
fn crater_vertices(size: f32, segments: usize) -> Vec<Vec3> {
    let half = size * 0.5;
    let step = size / segments as f32;
    let mut vertices = Vec::with_capacity((segments + 1) * (segments + 1));
    for iy in 0..=segments {
        for ix in 0..=segments {
            let flat = Vec3::new(-half + ix as f32 * step, half - iy as f32 * step, 0.0);
            let lift = smoothstep(0.0, RIM_RADIUS, flat.length()) * RIM_HEIGHT;
            vertices.push(flat + Vec3::Z * lift);
        }
    }
    vertices
}

/// Triangle edges of the grid: right, down, and the shared cell diagonal.
fn wireframe(vertices: &[Vec3], segments: usize) -> Vec<(Vec3, Vec3, [f32; 3])> {
    const WHITE: [f32; 3] = [1.0; 3];
    let row = segments + 1;
    let at = |ix: usize, iy: usize| vertices[ix + row * iy];

    let mut edges = Vec::new();
    for iy in 0..=segments {
        for ix in 0..=segments {
            if ix < segments {
                edges.push((at(ix, iy), at(ix + 1, iy), WHITE));
            }
            if iy < segments {
                edges.push((at(ix, iy), at(ix, iy + 1), WHITE));
            }
            if ix < segments && iy < segments {
                edges.push((at(ix, iy + 1), at(ix + 1, iy), WHITE));
            }
        }
    }
    edges
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let vertices = crater_vertices(SIZE, SEGMENTS);
    let edges = wireframe(&vertices, SEGMENTS);
    ctx.world.panel.set("edges", edges.len());

    ctx.world.scene.add(
        Node::mesh(
            "crater",
            shapes::lines("crater", &edges).shared(),
            Material::new("crater", Color::from_hex(0xffff00)).shared(),
        )
        .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
    );
    Ok(())
}
