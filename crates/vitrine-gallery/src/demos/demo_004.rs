//! Galaxy rebuild: a spiral point cloud regenerated every few seconds.
//!
//! Each rebuild detaches the previous galaxy and releases it through a
//! `SceneTeardown` before the new one is attached.

use std::f32::consts::TAU;

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Geometry, Material, Node, SceneTeardown};
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{World, WorldConfig};

use super::scatter::Scatter;
use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo004",
    description: "galaxy rebuild",
    pipeline: Pipeline::Composed,
    config,
    setup,
};

const REBUILD_PERIOD: f32 = 3.0;
const SPIN: f32 = 0.1;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 70.0,
        camera_position: Vec3::new(1.0, 4.0, 7.0),
        grid: false,
        ..WorldConfig::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GalaxyParams {
    count: usize,
    radius: f32,
    branches: u32,
    spin: f32,
    randomness: f32,
    inside: Color,
    outside: Color,
}

impl GalaxyParams {
    /// Parameters for the `generation`-th rebuild.
    fn generation(generation: u64) -> Self {
        Self {
            count: 6000,
            radius: 4.0,
            branches: 3 + (generation % 4) as u32,
            spin: if generation % 2 == 0 { 1.0 } else { -1.0 },
            randomness: 0.2,
            inside: Color::from_hex(0xff6030),
            outside: Color::from_hex(0x1b3984),
        }
    }
}

fn galaxy_geometry(params: &GalaxyParams, seed: u64) -> Geometry {
    let mut scatter = Scatter::new(seed);
    let mut positions = Vec::with_capacity(params.count);
    let mut colors = Vec::with_capacity(params.count);

    for i in 0..params.count {
        let radius = scatter.unit() * params.radius;
        let branch = (i as u32 % params.branches) as f32 / params.branches as f32 * TAU;
        let angle = branch + radius * params.spin;
        let jitter = Vec3::new(scatter.offset(), scatter.offset(), scatter.offset())
            * params.randomness
            * radius;
        positions.push(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius) + jitter);

        let t = radius / params.radius;
        colors.push([
            params.inside.r + (params.outside.r - params.inside.r) * t,
            params.inside.g + (params.outside.g - params.inside.g) * t,
            params.inside.b + (params.outside.b - params.inside.b) * t,
        ]);
    }

    shapes::points("galaxy", &positions, &colors)
}

fn galaxy(generation: u64) -> Node {
    let params = GalaxyParams::generation(generation);
    Node::mesh(
        format!("galaxy {generation}"),
        galaxy_geometry(&params, generation).shared(),
        Material::new("galaxy", Color::WHITE).shared(),
    )
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    ctx.world.scene.add(
        Node::mesh(
            "ground",
            shapes::box_geometry(8.0, 0.5, 8.0).shared(),
            Material::new("ground", Color::from_hex(0xfffffa)).shared(),
        )
        .with_position(0.0, -1.25, 0.0),
    );

    let mut current = ctx.world.scene.add(galaxy(0));
    let mut generation = 0u64;
    ctx.world.panel.set("generation", generation);

    let mut gate = PeriodicGate::new(REBUILD_PERIOD);
    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;

        if gate.is_elapsed(t) {
            if let Some(old) = world.scene.remove(current) {
                let mut teardown = SceneTeardown::new();
                teardown.dispose_tree(&old);
                let report = teardown.finish();
                log::debug!("galaxy {generation} released {} resource(s)", report.resources());
                world.panel.set("released", report.resources());
            }
            generation += 1;
            current = world.scene.add(galaxy(generation));
            world.panel.set("generation", generation);
            world.panel.set("branches", GalaxyParams::generation(generation).branches);
        }

        if let Some(node) = world.scene.root.find_by_id_mut(current) {
            node.transform.rotation = Quat::from_rotation_y(t * SPIN);
        }
        Ok(())
    });

    Ok(())
}
