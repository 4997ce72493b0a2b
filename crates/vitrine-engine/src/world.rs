//! The bundle a demo builds on: scene, camera, controls, debug panel.

use std::time::Instant;

use glam::Vec3;

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::debug::DebugPanel;
use crate::paint::Color;
use crate::scene::{helpers, NodeId, Resource, Scene, SceneTeardown};
use crate::time::FrameTime;

/// Camera and helper defaults for a new world.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: Vec3,
    pub grid: bool,
    /// Grid width in world units; it always has ten cells per side.
    pub grid_size: f32,
    pub axes_size: Option<f32>,
    pub background: Color,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 1.0,
            far: 1000.0,
            camera_position: Vec3::new(0.0, 1.5, 5.0),
            grid: true,
            grid_size: 10.0,
            axes_size: Some(8.0),
            background: Color::BLACK,
        }
    }
}

/// Per-tick context handed to frame callbacks.
#[derive(Debug)]
pub struct World {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub panel: DebugPanel,
    /// Timing of the tick being run. Written by the frame loop before callbacks.
    pub time: FrameTime,

    grid: Option<NodeId>,
    axes: Option<NodeId>,
    tracked: Vec<Resource>,
}

/// Builds a world with a camera, orbit controls, and the configured helpers.
///
/// `panel` is moved in; the frame loop hands it back on stop.
pub fn initialize_world(config: &WorldConfig, aspect: f32, panel: DebugPanel) -> World {
    let mut camera = PerspectiveCamera::new(config.fov_degrees, 1.0, config.near, config.far);
    camera.set_aspect(aspect);
    camera.position = config.camera_position;

    let mut scene = Scene::new();
    scene.background = config.background;

    let grid = config.grid.then(|| scene.add(helpers::grid(config.grid_size, 10)));
    let axes = config.axes_size.map(|size| scene.add(helpers::axes(size)));

    log::debug!(
        "world initialized: fov {} aspect {:.3} camera {:?}",
        config.fov_degrees,
        camera.aspect,
        camera.position
    );

    World {
        scene,
        camera,
        controls: OrbitControls::new(Vec3::ZERO),
        panel,
        time: FrameTime::start(Instant::now()),
        grid,
        axes,
        tracked: Vec::new(),
    }
}

impl World {
    pub fn grid(&self) -> Option<NodeId> {
        self.grid
    }

    pub fn axes(&self) -> Option<NodeId> {
        self.axes
    }

    /// Shows or hides the grid and axes helpers.
    pub fn set_helpers_visible(&mut self, visible: bool) {
        for id in [self.grid, self.axes].into_iter().flatten() {
            if let Some(node) = self.scene.root.find_by_id_mut(id) {
                node.visible = visible;
            }
        }
    }

    /// Registers a resource that is not (or not always) attached to the scene,
    /// so it is still released when the world is torn down.
    pub fn track(&mut self, resource: impl Into<Resource>) {
        self.tracked.push(resource.into());
    }

    /// Tears the world down and returns its debug panel.
    pub fn release(self, teardown: &mut SceneTeardown) -> DebugPanel {
        teardown.dispose_tree(&self.scene.root);
        for resource in self.tracked {
            teardown.dispose_resource(resource);
        }
        self.panel
    }
}
