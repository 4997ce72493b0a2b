//! Swinging screen: a large box playing a looped procedural clip.
//!
//! The clip is a ring of pre-built frames; the material's map is swapped at
//! the clip's frame rate while the box swings about Y.

use std::rc::Rc;

use anyhow::Result;
use glam::{Quat, Vec3};
use vitrine_engine::paint::Color;
use vitrine_engine::scene::{shapes, Material, Node, Texture, TextureSlot};
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{World, WorldConfig};

use super::{Demo, DemoCtx, Pipeline};

pub const DEMO: Demo = Demo {
    name: "Demo005",
    description: "swinging screen",
    pipeline: Pipeline::Composed,
    config,
    setup,
};

const CLIP_FRAMES: u32 = 8;
const FRAME_MILLIS: u32 = 125;

fn config() -> WorldConfig {
    WorldConfig {
        fov_degrees: 70.0,
        camera_position: Vec3::new(1.0, 0.0, 80.0),
        grid: false,
        axes_size: None,
        ..WorldConfig::default()
    }
}

/// One clip frame: a bright bar sweeping left to right over scanlines.
fn clip_frame(index: u32) -> Texture {
    const W: u32 = 128;
    const H: u32 = 64;
    let bar = index * W / CLIP_FRAMES;
    let bar_width = W / CLIP_FRAMES;
    Texture::filled(format!("clip {index}"), W, H, |x, y| {
        if x >= bar && x < bar + bar_width {
            [250, 240, 200, 255]
        } else if y % 4 == 0 {
            [20, 24, 40, 255]
        } else {
            [50, 70, 120, 255]
        }
    })
}

/// Swing angle about Y at `elapsed` seconds.
fn swing(elapsed: f32) -> f32 {
    (elapsed / 2.0).sin()
}

fn setup(ctx: &mut DemoCtx<'_>) -> Result<()> {
    let frames: Vec<Rc<Texture>> = (0..CLIP_FRAMES).map(|i| clip_frame(i).shared()).collect();
    for frame in &frames {
        ctx.world.track(Rc::clone(frame));
    }

    let screen = Material::new("screen", Color::WHITE)
        .with_texture(TextureSlot::Map, Rc::clone(&frames[0]))
        .shared();
    let node = ctx.world.scene.add(Node::mesh(
        "screen",
        shapes::box_geometry(100.0, 50.0, 50.0).shared(),
        Rc::clone(&screen),
    ));
    ctx.world.panel.set("frame", 0);

    let mut gate = PeriodicGate::from_millis(FRAME_MILLIS);
    let mut current = 0usize;
    ctx.registry.subscribe(move |world: &mut World| {
        let t = world.time.elapsed;
        if gate.is_elapsed(t) {
            current = (current + 1) % frames.len();
            screen.set_map(Rc::clone(&frames[current]));
            world.panel.set("frame", current);
        }
        if let Some(node) = world.scene.root.find_by_id_mut(node) {
            node.transform.rotation = Quat::from_rotation_y(swing(t));
        }
        Ok(())
    });

    Ok(())
}
