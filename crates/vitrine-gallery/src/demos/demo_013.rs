//! Power curve: points along `(s, s^5, s^10)` with `s` eased from 0 to 1.

use anyhow::Result;
use glam::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node};
use vitrine_engine::WorldConfig;

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo013",
    description: "power curve",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const POINT_COUNT: usize = 1000;

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

fn smoothstep(min: f32, max: f32, value: f32) -> f32 {
    let x = ((value - min) / (max - min)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

fn power_curve(count: usize) -> Vec<Vec3> {
    let span = count as f32 * 3.0;
    (0..count)
        .map(|i| {
            let s = smoothstep(0.0, span, i as f32 * 3.0);
            Vec3::new(s, s.powi(5), s.powi(10))
        })
        .collect()
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    ctx.world.scene.add(Node::mesh(
        "curve",
        shapes::points("curve", &power_curve(POINT_COUNT), &[]).shared(),
        Material::new("curve", Color::WHITE).with_opacity(0.9).shared(),
    ));
    ctx.world.panel.set("points", POINT_COUNT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::testing;

    #[test]
    fn curve_runs_from_origin_toward_one() {
        let points = power_curve(POINT_COUNT);
        assert_eq!(points[0], Vec3::ZERO);
        let last = points[POINT_COUNT - 1];
        assert!(last.x > 0.99 && last.x < 1.0);
        assert!(points.windows(2).all(|w| w[1].x > w[0].x));
        assert!(points.iter().all(|p| p.z <= p.y && p.y <= p.x));
    }

    #[test]
    fn curve_is_static() {
        let (mut world, registry) = testing::setup(&DEMO);
        assert!(registry.is_empty());
        testing::tick_at(&mut world, &registry, 1.0);
        let node = world.scene.root.find("curve").unwrap();
        assert_eq!(node.transform.rotation, glam::Quat::IDENTITY);
    }
}
