use anyhow::Result;

use super::{FrameHandle, FrameRegistry, FrameScheduler};
use crate::camera::CameraController;
use crate::debug::DebugPanel;
use crate::render::{Renderer, SurfaceOf};
use crate::scene::{SceneTeardown, TeardownReport};
use crate::time::{FrameClock, FrameStats};
use crate::world::World;

/// Lifecycle of a frame loop. A loop is `Running` from construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Drives one world: per-tick callbacks, camera controls, render, reschedule.
///
/// Exactly one frame request is outstanding while running. `stop` (or drop)
/// cancels it and tears the world down; ticks delivered afterwards, or for any
/// handle other than the outstanding one, do nothing.
pub struct FrameLoop<S: FrameScheduler, R: Renderer> {
    state: LoopState,
    scheduler: S,
    pending: Option<FrameHandle>,
    registry: FrameRegistry<World>,
    clock: FrameClock,
    stats: FrameStats,
    world: Option<World>,
    renderer: R,
    report: Option<TeardownReport>,
}

impl<S: FrameScheduler, R: Renderer> FrameLoop<S, R> {
    /// Takes ownership of the world and renderer and requests the first frame.
    pub fn start(world: World, renderer: R, mut scheduler: S, registry: FrameRegistry<World>) -> Self {
        let pending = scheduler.request_frame();
        log::debug!(
            "frame loop started: '{}' with {} callback(s)",
            world.panel.title(),
            registry.len()
        );

        Self {
            state: LoopState::Running,
            scheduler,
            pending: Some(pending),
            registry,
            clock: FrameClock::new(),
            stats: FrameStats::default(),
            world: Some(world),
            renderer,
            report: None,
        }
    }

    /// Runs one tick for `handle`.
    ///
    /// On error the tick is abandoned and no further frame is requested; the
    /// loop stays `Running` until stopped.
    pub fn tick(&mut self, handle: FrameHandle, surface: &mut SurfaceOf<'_, R::Kind>) -> Result<()> {
        if self.state != LoopState::Running || self.pending != Some(handle) {
            log::trace!("ignoring frame {handle:?} (state {:?}, pending {:?})", self.state, self.pending);
            return Ok(());
        }
        self.pending = None;

        let Some(world) = self.world.as_mut() else {
            return Ok(());
        };

        world.time = self.clock.tick();
        self.registry.run_all(world)?;
        world.controls.update(&mut world.camera);
        self.renderer.render(surface, &world.scene, &world.camera)?;

        if let Some(fps) = self.stats.record(world.time.elapsed) {
            log::debug!("{:.1} fps ({} frames)", fps, self.clock.frame_count());
        }

        self.pending = Some(self.scheduler.request_frame());
        Ok(())
    }

    /// Stops the loop and releases everything it owns.
    ///
    /// Returns the debug panel on the first call and `None` afterwards.
    pub fn stop(&mut self) -> Option<DebugPanel> {
        if self.state == LoopState::Stopped {
            return None;
        }
        self.state = LoopState::Stopped;

        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.registry.clear();

        let mut teardown = SceneTeardown::new();
        let panel = self.world.take().map(|mut world| {
            world.controls.dispose();
            world.release(&mut teardown)
        });
        self.renderer.dispose();

        let report = teardown.finish();
        log::info!(
            "frame loop stopped after {} frame(s): released {} node(s), {} geometr{}, {} material(s), {} texture(s)",
            self.clock.frame_count(),
            report.nodes,
            report.geometries,
            if report.geometries == 1 { "y" } else { "ies" },
            report.materials,
            report.textures
        );
        self.report = Some(report);
        panel
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Handle of the outstanding frame request.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &FrameRegistry<World> {
        &self.registry
    }

    /// Ticks run so far.
    pub fn frame_index(&self) -> u64 {
        self.clock.frame_count()
    }

    /// What the teardown released, once stopped.
    pub fn teardown_report(&self) -> Option<TeardownReport> {
        self.report
    }
}

impl<S: FrameScheduler, R: Renderer> Drop for FrameLoop<S, R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::frame::FrameRequests;
    use crate::paint::Color;
    use crate::render::Headless;
    use crate::scene::{shapes, Disposable, Material, Node, Scene, Texture, TextureSlot};
    use crate::world::{initialize_world, WorldConfig};

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeRenderer {
        log: Log,
        fail: bool,
    }

    impl Renderer for FakeRenderer {
        type Kind = Headless;

        fn render(&mut self, _: &mut (), scene: &Scene, _: &PerspectiveCamera) -> Result<()> {
            anyhow::ensure!(!self.fail, "render failed");
            self.log
                .borrow_mut()
                .push(format!("render {}", scene.root.node_count()));
            Ok(())
        }

        fn dispose(&mut self) {
            self.log.borrow_mut().push("dispose renderer".into());
        }
    }

    fn world() -> World {
        let config = WorldConfig {
            grid: false,
            axes_size: None,
            ..WorldConfig::default()
        };
        initialize_world(&config, 1.0, DebugPanel::new("test"))
    }

    fn push(log: &Log, entry: &'static str) -> impl FnMut(&mut World) -> Result<()> + 'static {
        let log = Rc::clone(log);
        move |_| {
            log.borrow_mut().push(entry.into());
            Ok(())
        }
    }

    fn started(log: &Log) -> (FrameLoop<FrameRequests, FakeRenderer>, FrameRequests) {
        let requests = FrameRequests::new();
        let registry = FrameRegistry::new();
        registry.subscribe(push(log, "a"));
        registry.subscribe(push(log, "b"));
        registry.subscribe(push(log, "c"));
        let renderer = FakeRenderer {
            log: Rc::clone(log),
            fail: false,
        };
        let frame_loop = FrameLoop::start(world(), renderer, requests.clone(), registry);
        (frame_loop, requests)
    }

    // ── ticking ───────────────────────────────────────────────────────────

    #[test]
    fn start_requests_the_first_frame() {
        let log = Log::default();
        let (frame_loop, requests) = started(&log);
        assert!(frame_loop.is_running());
        assert!(requests.is_pending());
        assert_eq!(frame_loop.pending(), Some(requests.take_due().unwrap()));
    }

    #[test]
    fn tick_runs_callbacks_in_order_then_renders_and_reschedules() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);

        let handle = requests.take_due().unwrap();
        frame_loop.tick(handle, &mut ()).unwrap();

        assert_eq!(*log.borrow(), ["a", "b", "c", "render 1"]);
        assert_eq!(frame_loop.frame_index(), 1);
        let next = requests.take_due().unwrap();
        assert_ne!(next, handle);
        assert_eq!(frame_loop.pending(), Some(next));
    }

    #[test]
    fn tick_with_foreign_handle_does_nothing() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);
        let handle = requests.take_due().unwrap();

        let mut other = FrameRequests::new();
        let _ = other.request_frame();
        let foreign = other.request_frame();
        assert_ne!(foreign, handle);

        frame_loop.tick(foreign, &mut ()).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(frame_loop.pending(), Some(handle));
    }

    #[test]
    fn unsubscribed_callback_stops_running() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);
        let extra = frame_loop.registry().subscribe(push(&log, "extra"));

        frame_loop.tick(requests.take_due().unwrap(), &mut ()).unwrap();
        extra.unsubscribe();
        frame_loop.tick(requests.take_due().unwrap(), &mut ()).unwrap();

        let extras = log.borrow().iter().filter(|e| *e == "extra").count();
        assert_eq!(extras, 1);
    }

    #[test]
    fn callback_error_aborts_tick_without_rescheduling() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);
        frame_loop
            .registry()
            .subscribe(|_: &mut World| anyhow::bail!("callback broke"));

        let err = frame_loop.tick(requests.take_due().unwrap(), &mut ()).unwrap_err();
        assert!(err.to_string().contains("callback broke"));
        assert_eq!(*log.borrow(), ["a", "b", "c"]);
        assert!(!requests.is_pending());
        assert!(frame_loop.is_running());
    }

    #[test]
    fn render_error_aborts_tick() {
        let log = Log::default();
        let requests = FrameRequests::new();
        let renderer = FakeRenderer {
            log: Rc::clone(&log),
            fail: true,
        };
        let mut frame_loop = FrameLoop::start(world(), renderer, requests.clone(), FrameRegistry::new());

        assert!(frame_loop.tick(requests.take_due().unwrap(), &mut ()).is_err());
        assert!(frame_loop.pending().is_none());
    }

    #[test]
    fn callbacks_see_advancing_time() {
        let requests = FrameRequests::new();
        let registry = FrameRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.subscribe(move |world: &mut World| {
            sink.borrow_mut().push(world.time.frame_index);
            world.panel.set("frame", world.time.frame_index);
            Ok(())
        });
        let renderer = FakeRenderer {
            log: Log::default(),
            fail: false,
        };
        let mut frame_loop = FrameLoop::start(world(), renderer, requests.clone(), registry);

        for _ in 0..3 {
            frame_loop.tick(requests.take_due().unwrap(), &mut ()).unwrap();
        }
        assert_eq!(*seen.borrow(), [0, 1, 2]);
        let panel = frame_loop.stop().unwrap();
        assert_eq!(panel.get("frame"), Some(&serde_json::Value::from(2)));
    }

    // ── stopping ──────────────────────────────────────────────────────────

    #[test]
    fn stop_is_idempotent() {
        let log = Log::default();
        let (mut frame_loop, _requests) = started(&log);

        let panel = frame_loop.stop();
        assert_eq!(panel.map(|p| p.title().to_owned()).as_deref(), Some("test"));
        assert!(frame_loop.stop().is_none());
        assert_eq!(frame_loop.state(), LoopState::Stopped);

        let disposals = log.borrow().iter().filter(|e| *e == "dispose renderer").count();
        assert_eq!(disposals, 1);
        assert!(frame_loop.registry().is_empty());
        assert!(frame_loop.world().is_none());
    }

    #[test]
    fn stop_cancels_pending_request() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);
        frame_loop.stop();
        assert!(!requests.is_pending());
        assert!(requests.take_due().is_none());
    }

    #[test]
    fn already_delivered_handle_is_ignored_after_stop() {
        let log = Log::default();
        let (mut frame_loop, requests) = started(&log);

        // The runtime drained the handle, then the loop was stopped before the redraw ran.
        let stale = requests.take_due().unwrap();
        frame_loop.stop();
        frame_loop.tick(stale, &mut ()).unwrap();

        assert_eq!(*log.borrow(), ["dispose renderer"]);
        assert!(!requests.is_pending());
    }

    #[test]
    fn stop_before_first_tick_releases_scene() {
        let log = Log::default();
        let mut w = world();
        let texture = Texture::solid("t", [9; 4]).shared();
        let material = Material::new("m", Color::WHITE)
            .with_texture(TextureSlot::Map, Rc::clone(&texture))
            .shared();
        let geometry = shapes::box_geometry(1.0, 1.0, 1.0).shared();
        w.scene.add(Node::mesh("box", Rc::clone(&geometry), Rc::clone(&material)));

        let renderer = FakeRenderer {
            log: Rc::clone(&log),
            fail: false,
        };
        let mut frame_loop = FrameLoop::start(w, renderer, FrameRequests::new(), FrameRegistry::new());
        frame_loop.stop();

        assert!(texture.is_disposed());
        assert!(material.is_disposed());
        assert!(geometry.is_disposed());
        let report = frame_loop.teardown_report().unwrap();
        assert_eq!(report.resources(), 3);
        assert_eq!(frame_loop.frame_index(), 0);
    }

    #[test]
    fn drop_stops_the_loop() {
        let log = Log::default();
        let (frame_loop, requests) = started(&log);
        drop(frame_loop);
        assert!(!requests.is_pending());
        assert_eq!(*log.borrow(), ["dispose renderer"]);
    }
}
