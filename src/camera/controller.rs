use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::core::Camera;
use crate::input::{InputEvent, MouseButton};
use crate::options::ControlOptions;

/// Below this, pending motion is treated as settled.
const EPS: f32 = 1e-6;

/// Spherical coordinates of the eye around the target (Y up).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Damped orbit controls bound to one camera.
///
/// User input accumulates as pending motion. Each [`update`](Self::update)
/// applies a `damping_factor` fraction of it and decays the rest, so motion
/// eases out over subsequent ticks. The step is per tick, not per second.
#[derive(Debug, Clone)]
pub struct OrbitController {
    target: Vec3,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_scale: f32,

    damping_factor: f32,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    viewport_height: f32,

    rotate_held: bool,
    pan_held: bool,
    shift_pressed: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitController {
    /// Controller orbiting the camera's current target.
    #[must_use]
    pub fn new(
        camera: &Camera,
        viewport_height: u32,
        options: &ControlOptions,
    ) -> Self {
        Self {
            target: camera.target,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
            damping_factor: options.damping_factor.clamp(0.0, 1.0),
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            min_distance: options.min_distance,
            max_distance: options.max_distance,
            viewport_height: viewport_height.max(1) as f32,
            rotate_held: false,
            pan_held: false,
            shift_pressed: false,
            last_cursor: None,
        }
    }

    /// Point the camera orbits around.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Fraction of pending motion applied per update.
    #[must_use]
    pub fn damping_factor(&self) -> f32 {
        self.damping_factor
    }

    /// Whether any input is still being eased out.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending_theta.abs() < EPS
            && self.pending_phi.abs() < EPS
            && self.pending_pan.length_squared() < EPS * EPS
            && (self.pending_scale - 1.0).abs() < EPS
    }

    /// Track a new viewport height so drag sensitivity stays per-pixel.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Queue an orbit by a cursor drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        let per_pixel = TAU * self.rotate_speed / self.viewport_height;
        self.pending_theta -= delta.x * per_pixel;
        self.pending_phi -= delta.y * per_pixel;
    }

    /// Queue a pan by a cursor drag of `delta` pixels, in camera space.
    pub fn pan(&mut self, camera: &Camera, delta: Vec2) {
        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        // World units per pixel at the target depth.
        let half_fov = (camera.fovy.to_radians() * 0.5).tan();
        let scale = 2.0 * camera.distance() * half_fov / self.viewport_height
            * self.pan_speed;
        self.pending_pan += (-right * delta.x + up * delta.y) * scale;
    }

    /// Queue a zoom. Positive `delta` moves the camera closer.
    pub fn zoom(&mut self, delta: f32) {
        let step = 0.95_f32.powf(self.zoom_speed * delta.abs());
        if delta > 0.0 {
            self.pending_scale *= step;
        } else if delta < 0.0 {
            self.pending_scale /= step;
        }
    }

    /// Feed one platform-agnostic input event.
    ///
    /// Left-drag orbits, shift+left-drag or right-drag pans, scroll zooms.
    /// Returns `true` if the event was consumed.
    pub fn handle_input(
        &mut self,
        camera: &Camera,
        event: InputEvent,
    ) -> bool {
        match event {
            InputEvent::MouseButton { button, pressed } => {
                match button {
                    MouseButton::Left => self.rotate_held = pressed,
                    MouseButton::Right | MouseButton::Middle => {
                        self.pan_held = pressed;
                    }
                }
                true
            }
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                true
            }
            InputEvent::CursorMoved { x, y } => {
                let current = Vec2::new(x, y);
                let delta = self
                    .last_cursor
                    .map_or(Vec2::ZERO, |last| current - last);
                self.last_cursor = Some(current);
                if self.pan_held || (self.rotate_held && self.shift_pressed) {
                    self.pan(camera, delta);
                } else if self.rotate_held {
                    self.rotate(delta);
                }
                true
            }
            InputEvent::Scroll { delta } => {
                self.zoom(delta);
                true
            }
        }
    }

    /// Advance one damped step and write the result into `camera`.
    ///
    /// Returns `true` if the camera moved. A settled controller leaves the
    /// camera untouched.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if self.is_settled() {
            return false;
        }
        // A zero factor disables damping: apply everything at once.
        let df = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };
        let mut spherical = Spherical::from_offset(camera.eye - self.target);

        spherical.theta += self.pending_theta * df;
        spherical.phi =
            (spherical.phi + self.pending_phi * df).clamp(EPS, PI - EPS);
        // Partial zoom: interpolate the scale factor towards 1 by `df`.
        let scale = 1.0 + (self.pending_scale - 1.0) * df;
        spherical.radius = (spherical.radius * scale)
            .clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * df;

        let eye = self.target + spherical.to_offset();
        let moved = eye.distance_squared(camera.eye) > EPS * EPS
            || camera.target.distance_squared(self.target) > EPS * EPS;
        camera.eye = eye;
        camera.target = self.target;
        camera.up = Vec3::Y;

        let decay = 1.0 - df;
        self.pending_theta *= decay;
        self.pending_phi *= decay;
        self.pending_pan *= decay;
        self.pending_scale = 1.0 + (self.pending_scale - 1.0) * decay;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CameraOptions, ControlOptions};

    fn setup() -> (Camera, OrbitController) {
        let camera = Camera::framed(1.5, &CameraOptions::default());
        let controller =
            OrbitController::new(&camera, 600, &ControlOptions::default());
        (camera, controller)
    }

    #[test]
    fn idle_controller_keeps_framing() {
        let (mut camera, mut controller) = setup();
        let before = camera.eye;
        for _ in 0..10 {
            assert!(!controller.update(&mut camera));
        }
        assert_eq!(camera.eye, before);
        assert!((camera.distance() - 50.0).abs() < 1e-3);
        assert!(controller.is_settled());
    }

    #[test]
    fn rotation_eases_out() {
        let (mut camera, mut controller) = setup();
        controller.rotate(Vec2::new(120.0, 0.0));

        let mut steps = Vec::new();
        let mut last = camera.eye;
        for _ in 0..5 {
            assert!(controller.update(&mut camera));
            steps.push(camera.eye.distance(last));
            last = camera.eye;
        }
        for pair in steps.windows(2) {
            assert!(pair[1] < pair[0], "steps should shrink: {steps:?}");
        }
        // Orbiting keeps the distance to the target.
        assert!((camera.distance() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn damped_rotation_converges() {
        let (mut camera, mut controller) = setup();
        controller.rotate(Vec2::new(60.0, 0.0));
        for _ in 0..600 {
            let _ = controller.update(&mut camera);
        }
        assert!(controller.is_settled());
        assert!(!controller.update(&mut camera));
    }

    #[test]
    fn zoom_is_clamped() {
        let (mut camera, mut controller) = setup();
        for _ in 0..200 {
            controller.zoom(50.0);
            let _ = controller.update(&mut camera);
        }
        let min = ControlOptions::default().min_distance;
        assert!(camera.distance() >= min - 1e-3);
    }

    #[test]
    fn polar_angle_never_flips() {
        let (mut camera, mut controller) = setup();
        controller.rotate(Vec2::new(0.0, 100_000.0));
        for _ in 0..50 {
            let _ = controller.update(&mut camera);
        }
        assert!(camera.eye.is_finite());
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn drag_without_button_does_nothing() {
        let (mut camera, mut controller) = setup();
        let cam = camera.clone();
        let moved = |x| InputEvent::CursorMoved { x, y: 0.0 };
        assert!(controller.handle_input(&cam, moved(0.0)));
        assert!(controller.handle_input(&cam, moved(80.0)));
        assert!(controller.is_settled());

        let _ = controller.handle_input(
            &cam,
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
        );
        let _ = controller.handle_input(&cam, moved(120.0));
        assert!(!controller.is_settled());
        assert!(controller.update(&mut camera));
    }
}
