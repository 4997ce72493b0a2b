//! Spiral: a conical helix of points tumbling about X.

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::{World, WorldConfig};

use super::scatter::Scatter;
use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo012",
    description: "spiral",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const POINT_COUNT: usize = 1000;
const AMPLITUDE: f32 = 0.001;
/// One tint is picked per launch.
const TINTS: [u32; 3] = [0xffffff, 0x88ccff, 0xffaa66];

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 75.0,
        near: 0.1,
        camera_position: Vec3::new(0.0, 1.0, 3.0),
        grid: false,
        axes_size: None,
        background: Color::from_hex(0x111122),
        ..WorldConfig::default()
    }
}

/// `(t, t cos t, t sin t)` sampled every 3 radians, scaled down to scene size.
fn spiral(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 3.0;
            Vec3::new(t, t * t.cos(), t * t.sin()) * AMPLITUDE
        })
        .collect()
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let tint = TINTS[Scatter::from_clock().index(TINTS.len())];
    let id = ctx.world.scene.add(Node::mesh(
        "spiral",
        shapes::points("spiral", &spiral(POINT_COUNT), &[]).shared(),
        Material::new("spiral", Color::from_hex(tint)).with_opacity(0.9).shared(),
    ));
    ctx.world.panel.set("tint", format!("#{tint:06x}"));

    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        if let Some(node) = world.scene.root.find_by_id_mut(id) {
            node.transform.rotation = Quat::from_rotation_x(t);
        }
        Ok(())
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;

    #[test]
    fn spiral_widens_along_x() {
        let points = spiral(POINT_COUNT);
        assert_eq!(points[0], Vec3::ZERO);
        for (i, p) in points.iter().enumerate() {
            let t = i as f32 * 3.0 * AMPLITUDE;
            assert!((p.x - t).abs() < 1e-6);
            // Distance from the X axis grows with x.
            assert!((Vec3::new(0.0, p.y, p.z).length() - t).abs() < 1e-4);
        }
    }

    #[test]
    fn spiral_tumbles_about_x() {
        let (mut world, registry) = testing::setup(&DEMO);
        testing::tick_at(&mut world, &registry, 1.2);
        let node = world.scene.root.find("spiral").unwrap();
        assert!(node.transform.rotation.abs_diff_eq(Quat::from_rotation_x(1.2), 1e-6));
    }

    #[test]
    fn tint_comes_from_the_palette() {
        let (world, _registry) = testing::setup(&DEMO);
        let tint = world.panel.get("tint").and_then(|v| v.as_str()).unwrap().to_string();
        assert!(TINTS.iter().any(|t| format!("#{t:06x}") == tint));
    }
}
