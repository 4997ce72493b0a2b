//! Gallery wall: a picture on a wall that changes every few seconds.

use std::rc::Rc;

use anyhow::Result;
use glam::Vec3;
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node, Texture, TextureSlot};
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{World, WorldConfig};

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo001",
    description: "gallery wall",
    pipeline: Pipeline::Direct,
    config,
    setup,
};

const PICTURE_PERIOD: f32 = 5.0;

fn config() -> WorldConfig {
    WorldConfig {
        camera_position: Vec3::new(1.0, 10.0, 8.0),
        background: Color::from_hex(0x333333),
        ..WorldConfig::default()
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Sky over a horizon, `top` fading into `bottom`, with a darker ground band.
fn panorama(label: &str, top: [u8; 3], bottom: [u8; 3]) -> Texture {
    const W: u32 = 160;
    const H: u32 = 120;
    Texture::filled(label, W, H, |_, y| {
        let t = y as f32 / (H - 1) as f32;
        if t > 0.7 {
            [lerp(bottom[0], 0, 0.5), lerp(bottom[1], 0, 0.5), lerp(bottom[2], 0, 0.5), 255]
        } else {
            let t = t / 0.7;
            [lerp(top[0], bottom[0], t), lerp(top[1], bottom[1], t), lerp(top[2], bottom[2], t), 255]
        }
    })
}

fn pictures() -> Vec<Rc<Texture>> {
    vec![
        panorama("panorama", [40, 90, 200], [250, 190, 120]).shared(),
        panorama("panorama snow", [170, 190, 210], [245, 245, 250]).shared(),
        Texture::checker("tiles", 128, 8, [230, 230, 230, 255], [40, 40, 40, 255]).shared(),
    ]
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

    scene.add(Node::mesh(
        "origin",
        shapes::box_geometry(0.1, 0.1, 0.1).shared(),
        Material::new("origin", Color::from_hex(0x00ff00)).shared(),
    ));

    scene.add(
        Node::mesh(
            "wall",
            shapes::box_geometry(6.0, 4.0, 0.1).shared(),
            Material::new("wall", Color::from_hex(0xffff00)).shared(),
        )
        .with_position(0.0, 2.0, -4.0),
    );

    // Only the picture on display is reachable from the scene; the others are tracked.
    let pictures = pictures();
    for picture in &pictures {
        ctx.world.track(Rc::clone(picture));
    }
    let picture = Material::new("picture", Color::WHITE)
        .with_texture(TextureSlot::Map, Rc::clone(&pictures[0]))
        .shared();
    ctx.world.scene.add(
        Node::mesh(
            "gallery",
            shapes::box_geometry(4.0, 3.0, 0.1).shared(),
            Rc::clone(&picture),
        )
        .with_position(0.0, 1.5, -2.0),
    );
    ctx.world.panel.set("picture", pictures[0].label());

    let mut gate = PeriodicGate::new(PICTURE_PERIOD);
    let mut current = 0;
    ctx.registry.subscribe(move |world: &mut World| {
        if gate.is_elapsed(world.time.elapsed) {
            current = (current + 1) % pictures.len();
            picture.set_map(Rc::clone(&pictures[current]));
            world.panel.set("picture", pictures[current].label());
        }
        world.panel.set("clock.elapsedTime", world.time.elapsed);
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use vitrine_engine::scene::{Disposable, SceneTeardown};

    use super::*;
    use crate::demos::testing;

    fn shown(world: &World) -> String {
        world.panel.get("picture").and_then(|v| v.as_str()).unwrap_or_default().to_string()
    }

    #[test]
    fn picture_changes_once_per_period() {
        let (mut world, registry) = testing::setup(&DEMO);
        assert_eq!(shown(&world), "panorama");

        testing::tick_at(&mut world, &registry, 4.9);
        assert_eq!(shown(&world), "panorama");

        testing::tick_at(&mut world, &registry, 5.0);
        assert_eq!(shown(&world), "panorama snow");

        testing::tick_at(&mut world, &registry, 6.0);
        assert_eq!(shown(&world), "panorama snow");

        testing::tick_at(&mut world, &registry, 10.0);
        assert_eq!(shown(&world), "tiles");

        let map = world.scene.root.find("gallery").unwrap().mesh_ref().unwrap().material.get(0).unwrap().map();
        assert_eq!(map.unwrap().label(), "tiles");
    }

    #[test]
    fn elapsed_time_is_published() {
        let (mut world, registry) = testing::setup(&DEMO);
        testing::tick_at(&mut world, &registry, 1.25);
        assert_eq!(world.panel.get("clock.elapsedTime").and_then(|v| v.as_f64()), Some(1.25));
    }

    #[test]
    fn teardown_releases_pictures_not_on_display() {
        let (world, registry) = testing::setup(&DEMO);
        let pictures: Vec<_> = world
            .scene
            .root
            .find("gallery")
            .unwrap()
            .mesh_ref()
            .unwrap()
            .material
            .iter()
            .flat_map(|m| m.textures())
            .collect();
        assert_eq!(pictures.len(), 1);

        registry.clear();
        let mut teardown = SceneTeardown::new();
        world.release(&mut teardown);
        assert!(pictures[0].is_disposed());
        assert_eq!(teardown.report().textures, 3);
    }
}
