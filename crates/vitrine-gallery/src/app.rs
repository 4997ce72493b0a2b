//! The gallery application: one demo per process, driven by the engine runtime.

use std::rc::Rc;

use vitrine_engine::core::{App, AppControl, FrameCtx, StartCtx, WindowCtx};
use vitrine_engine::debug::DebugPanel;
use vitrine_engine::frame::{FrameLoop, FrameRegistry, FrameRequests};
use vitrine_engine::render::{Composer, ForwardRenderer, RenderPass, Renderer, Windowed};
use vitrine_engine::scene::label::Font;
use vitrine_engine::scene::SceneTeardown;
use vitrine_engine::time::PeriodicGate;
use vitrine_engine::{initialize_world, World};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::demos::{Demo, DemoCtx, Pipeline, DEMOS};
use crate::switcher::{self, Direction};

type DemoRenderer = Box<dyn Renderer<Kind = Windowed>>;
type DemoLoop = FrameLoop<FrameRequests, DemoRenderer>;

const PANEL_LOG_PERIOD: f32 = 2.0;
const FALLBACK_ASPECT: f32 = 16.0 / 9.0;
const PIXELS_PER_WHEEL_STEP: f64 = 50.0;

fn build_renderer(pipeline: Pipeline) -> DemoRenderer {
    match pipeline {
        Pipeline::Direct => Box::new(ForwardRenderer::new()),
        Pipeline::Composed => {
            Box::new(Composer::<Windowed>::new().with_pass(RenderPass::new(ForwardRenderer::new())))
        }
    }
}

/// Parks the full error chain in the panel's status and returns it.
fn fail_panel(panel: &mut DebugPanel, err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    panel.set_status(message.clone());
    message
}

/// Shows the error in the title and logs the panel, which carries it as its status.
fn report_failure(window: &WindowCtx<'_>, title: &str, mut panel: DebugPanel, err: &anyhow::Error) {
    let message = fail_panel(&mut panel, err);
    window.set_title(&format!("{title} · error: {message}"));
    log::error!("{}", panel.to_json_string());
}

pub struct Gallery {
    index: usize,
    font: Option<Rc<Font>>,
    frame_loop: Option<DemoLoop>,

    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    helpers_visible: bool,
}

impl Gallery {
    /// `index` must be a valid entry of the demo table.
    pub fn new(index: usize, font: Option<Rc<Font>>) -> Self {
        Self {
            index,
            font,
            frame_loop: None,
            dragging: false,
            cursor: None,
            helpers_visible: true,
        }
    }

    fn demo(&self) -> &'static Demo {
        &DEMOS[self.index]
    }

    fn title(&self) -> String {
        let demo = self.demo();
        format!("vitrine · {} {}", demo.name, demo.description)
    }

    fn world_mut(&mut self) -> Option<&mut World> {
        self.frame_loop.as_mut().and_then(|l| l.world_mut())
    }

    fn switch(&mut self, window: &WindowCtx<'_>, direction: Direction) -> AppControl {
        let next = switcher::neighbor(self.index, direction, DEMOS.len());
        match switcher::relaunch(next) {
            Ok(()) => AppControl::Exit,
            Err(err) => {
                log::error!("{err}");
                window.set_title(&format!("{} · error: {err}", self.title()));
                if let Some(world) = self.world_mut() {
                    world.panel.set_status(err.to_string());
                }
                AppControl::Continue
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut frame_loop) = self.frame_loop.take() {
            let frames = frame_loop.frame_index();
            let Some(panel) = frame_loop.stop() else {
                return;
            };
            let released = frame_loop.teardown_report().map_or(0, |r| r.resources());
            log::info!(
                "{} closed after {frames} frame(s), {released} resource(s) released: {}",
                self.demo().name,
                panel.to_json_string()
            );
        }
    }
}

impl App for Gallery {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> AppControl {
        let demo = self.demo();
        let title = self.title();
        ctx.window.set_title(&title);
        log::info!("starting {} ({})", demo.name, demo.description);

        let aspect = ctx.window.aspect().unwrap_or(FALLBACK_ASPECT);
        let mut world = initialize_world(&(demo.config)(), aspect, DebugPanel::new(demo.name));
        let registry = FrameRegistry::new();

        let setup = (demo.setup)(&mut DemoCtx {
            world: &mut world,
            registry: &registry,
            font: self.font.clone(),
        });
        if let Err(err) = setup {
            registry.clear();
            let panel = world.release(&mut SceneTeardown::new());
            report_failure(&ctx.window, &title, panel, &err.context(format!("{} setup failed", demo.name)));
            return AppControl::Continue;
        }

        // Subscribed last so it sees what the demo wrote this tick.
        let mut gate = PeriodicGate::new(PANEL_LOG_PERIOD);
        registry.subscribe(move |world: &mut World| {
            if gate.is_elapsed(world.time.elapsed) {
                log::info!("{}", world.panel.to_json_string());
            }
            Ok(())
        });

        self.frame_loop = Some(FrameLoop::start(
            world,
            build_renderer(demo.pipeline),
            ctx.requests.clone(),
            registry,
        ));
        AppControl::Continue
    }

    fn on_window_event(&mut self, ctx: &mut WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match &event.logical_key {
                    Key::Named(NamedKey::ArrowLeft) => return self.switch(ctx, Direction::Prev),
                    Key::Named(NamedKey::ArrowRight) => return self.switch(ctx, Direction::Next),
                    Key::Named(NamedKey::Escape) => return AppControl::Exit,
                    Key::Character(c) if c.as_str() == "h" => {
                        self.helpers_visible = !self.helpers_visible;
                        let visible = self.helpers_visible;
                        if let Some(world) = self.world_mut() {
                            world.set_helpers_visible(visible);
                        }
                    }
                    _ => {}
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }

            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                let height = ctx.window.inner_size().height as f32;
                if let (true, Some(previous)) = (self.dragging, previous) {
                    let dx = (position.x - previous.x) as f32;
                    let dy = (position.y - previous.y) as f32;
                    if let Some(world) = self.world_mut() {
                        world.controls.rotate(dx, dy, height);
                    }
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_WHEEL_STEP) as f32,
                };
                if let Some(world) = self.world_mut() {
                    world.controls.zoom(steps);
                }
            }

            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                let aspect = size.width as f32 / size.height as f32;
                if let Some(world) = self.world_mut() {
                    world.camera.set_aspect(aspect);
                }
            }

            _ => {}
        }

        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let title = self.title();
        let Some(frame_loop) = self.frame_loop.as_mut().filter(|l| l.is_running()) else {
            return AppControl::Continue;
        };

        if let Err(err) = frame_loop.tick(ctx.handle, &mut *ctx.gpu) {
            let panel = frame_loop.stop().unwrap_or_default();
            report_failure(&ctx.window, &title, panel, &err.context("frame failed"));
        }
        AppControl::Continue
    }

    fn on_exit(&mut self) {
        self.shutdown();
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.shutdown();
    }
}
