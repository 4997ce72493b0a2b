//! Cameras and camera controllers.

mod orbit;
mod perspective;

pub use orbit::OrbitControls;
pub use perspective::PerspectiveCamera;

/// Something that moves a camera once per tick.
pub trait CameraController {
    fn update(&mut self, camera: &mut PerspectiveCamera);

    /// Detaches the controller. Later `update` calls leave the camera untouched.
    fn dispose(&mut self);
}
