use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{CameraController, PerspectiveCamera};

const MIN_POLAR: f32 = 1e-6;

/// Orbits the camera around `target` on a sphere.
///
/// Pointer and wheel input accumulate into pending deltas; `update` applies
/// them. With damping on, deltas decay geometrically instead of stopping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one revolution per 30 s at 60 updates per second.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    enabled: bool,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            enabled: true,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_auto_rotate(mut self, speed: f32) -> Self {
        self.auto_rotate = true;
        self.auto_rotate_speed = speed;
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues a rotation from a pointer drag of `(dx, dy)` pixels.
    ///
    /// A drag across the full viewport height turns a full circle.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        self.theta_delta -= TAU * dx / viewport_height * self.rotate_speed;
        self.phi_delta -= TAU * dy / viewport_height * self.rotate_speed;
    }

    /// Queues a dolly from wheel input. Positive steps move toward the target.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.scale *= 0.95f32.powf(steps * self.zoom_speed);
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) {
        if !self.enabled {
            return;
        }

        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        if self.auto_rotate {
            self.theta_delta -= TAU / 60.0 / 60.0 * self.auto_rotate_speed;
        }

        if self.enable_damping {
            theta += self.theta_delta * self.damping_factor;
            phi += self.phi_delta * self.damping_factor;
        } else {
            theta += self.theta_delta;
            phi += self.phi_delta;
        }

        let min_phi = self.min_polar_angle.max(MIN_POLAR);
        let max_phi = self.max_polar_angle.min(PI - MIN_POLAR);
        phi = phi.clamp(min_phi, max_phi.max(min_phi));

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }
        self.scale = 1.0;
    }

    fn dispose(&mut self) {
        self.enabled = false;
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(50.0, 1.0, 1.0, 1000.0);
        cam.position = position;
        cam
    }

    #[test]
    fn idle_update_keeps_position() {
        let mut cam = camera_at(Vec3::new(0.0, 1.5, 5.0));
        let mut controls = OrbitControls::default();
        controls.update(&mut cam);
        assert!(cam.position.distance(Vec3::new(0.0, 1.5, 5.0)) < 1e-4);
    }

    #[test]
    fn auto_rotate_preserves_distance() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::default().with_auto_rotate(2.0);
        for _ in 0..120 {
            controls.update(&mut cam);
        }
        assert!((cam.distance_to_target() - 5.0).abs() < 1e-3);
        assert!(cam.position.x.abs() > 0.1);
    }

    #[test]
    fn zoom_respects_distance_clamp() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::default();
        controls.min_distance = 4.0;
        controls.zoom(50.0);
        controls.update(&mut cam);
        assert!((cam.distance_to_target() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::default();
        controls.rotate(0.0, 10_000.0, 100.0);
        controls.update(&mut cam);
        assert!(cam.position.y > 4.99);
        assert!(cam.position.is_finite());
    }

    #[test]
    fn damping_decays_pending_rotation() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::default().with_damping(0.5);
        controls.rotate(10.0, 0.0, 100.0);
        controls.update(&mut cam);
        let first = cam.position;
        controls.update(&mut cam);
        assert_ne!(cam.position, first);
    }

    #[test]
    fn disposed_controls_ignore_input() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::default().with_auto_rotate(2.0);
        controls.dispose();
        controls.rotate(50.0, 0.0, 100.0);
        controls.update(&mut cam);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
    }
}
