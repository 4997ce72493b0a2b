//! The demo table.
//!
//! A demo is a `setup` function that builds its scene into a fresh `World` and
//! subscribes whatever per-tick callbacks it needs. Everything a demo creates
//! is owned by the world or by its callbacks, so stopping the frame loop
//! releases all of it.

use std::rc::Rc;

use anyhow::Result;
use vitrine_engine::frame::FrameRegistry;
use vitrine_engine::scene::label::Font;
use vitrine_engine::{World, WorldConfig};

use crate::error::GalleryError;

mod demo_001;
mod demo_002;
mod demo_003;
mod demo_004;
mod demo_005;
mod demo_007;
mod demo_009;
mod demo_010;
mod demo_011;
mod demo_012;
mod demo_013;
mod scatter;

/// How a demo's frames reach the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Pipeline {
    /// Forward renderer straight to the swapchain.
    Direct,
    /// Forward renderer wrapped as the first pass of a composer.
    Composed,
}

/// Everything a demo's setup may touch.
pub struct DemoCtx<'a> {
    pub world: &'a mut World,
    pub registry: &'a FrameRegistry<World>,
    pub font: Option<Rc<Font>>,
}

pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    pub pipeline: Pipeline,
    pub config: fn() -> WorldConfig,
    pub setup: fn(&mut DemoCtx<'_>) -> Result<()>,
}

pub const DEMOS: &[Demo] = &[
    demo_001::DEMO,
    demo_002::DEMO,
    demo_003::DEMO,
    demo_004::DEMO,
    demo_005::DEMO,
    demo_007::DEMO,
    demo_009::DEMO,
    demo_010::DEMO,
    demo_011::DEMO,
    demo_012::DEMO,
    demo_013::DEMO,
];

/// Maps a command-line demo index onto the table.
pub fn resolve(index: i64) -> Result<usize, GalleryError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < DEMOS.len())
        .ok_or(GalleryError::UnknownDemo {
            index,
            count: DEMOS.len(),
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Instant;

    use vitrine_engine::debug::DebugPanel;
    use vitrine_engine::initialize_world;
    use vitrine_engine::time::FrameTime;

    use super::*;

    /// Builds a demo's world on the CPU side only.
    pub fn setup(demo: &Demo) -> (World, FrameRegistry<World>) {
        let mut world = initialize_world(&(demo.config)(), 16.0 / 9.0, DebugPanel::new(demo.name));
        let registry = FrameRegistry::new();
        let mut ctx = DemoCtx {
            world: &mut world,
            registry: &registry,
            font: None,
        };
        (demo.setup)(&mut ctx).unwrap();
        (world, registry)
    }

    /// Runs one tick's callbacks as if `elapsed` seconds had passed.
    pub fn tick_at(world: &mut World, registry: &FrameRegistry<World>, elapsed: f32) {
        let mut time = FrameTime::start(Instant::now());
        time.elapsed = elapsed;
        time.dt = 1.0 / 60.0;
        world.time = time;
        registry.run_all(world).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_only_table_indices() {
        assert_eq!(resolve(0).unwrap(), 0);
        assert_eq!(resolve(DEMOS.len() as i64 - 1).unwrap(), DEMOS.len() - 1);
        assert!(matches!(resolve(-1), Err(GalleryError::UnknownDemo { index: -1, .. })));
        assert!(resolve(DEMOS.len() as i64).is_err());
    }

    fn number(demo: &Demo) -> u32 {
        demo.name.strip_prefix("Demo").and_then(|n| n.parse().ok()).unwrap()
    }

    #[test]
    fn names_are_numbered_in_ascending_order() {
        assert_eq!(number(&DEMOS[0]), 1);
        for pair in DEMOS.windows(2) {
            assert!(number(&pair[0]) < number(&pair[1]), "{} before {}", pair[0].name, pair[1].name);
        }
        assert!(DEMOS.iter().all(|d| d.name.len() == "Demo000".len()));
    }

    #[test]
    fn every_demo_sets_up_without_a_gpu() {
        for demo in DEMOS {
            let (mut world, registry) = testing::setup(demo);
            assert!(world.scene.root.node_count() > 1, "{} built nothing", demo.name);
            testing::tick_at(&mut world, &registry, 0.5);
        }
    }
}
