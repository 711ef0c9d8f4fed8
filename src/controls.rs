/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use log::debug;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{Dimensions, EventState, cameras::Camera};

/// Spherical coordinates with Y up: `theta` turns around the Y axis starting
/// from +Z, `phi` is the angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    const EPS: f32 = 1e-6;

    #[must_use]
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    #[must_use]
    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps `phi` away from the poles where the view up vector degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(Self::EPS, PI - Self::EPS);
    }
}

/// Orbits the camera around a target: drag with the primary button to
/// rotate, scroll to zoom. With damping enabled, every `update` only applies
/// a fraction of the pending motion, so the camera glides to a stop.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical_delta: Spherical,
    scale: f32,
    rotating: bool,
    last_cursor: Option<(f64, f64)>,
    client_height: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            enable_damping: false,
            damping_factor: Self::DEFAULT_DAMPING_FACTOR,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            scale: 1.0,
            rotating: false,
            last_cursor: None,
            client_height: 1.0,
        }
    }
}

impl OrbitControls {
    pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
    const ZOOM_STEP: f32 = 0.95;
    const PIXELS_PER_LINE: f32 = 100.0;

    #[must_use]
    pub fn with_damping() -> Self {
        Self {
            enable_damping: true,
            ..Self::default()
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn set_screen_size(&mut self, dimensions: Dimensions) {
        if !dimensions.is_empty() {
            self.client_height = dimensions.height as f32;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn zoom_scale(&self) -> f32 {
        Self::ZOOM_STEP.powf(self.zoom_speed)
    }

    pub fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    pub fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Converts a cursor displacement in pixels into a rotation; a drag over
    /// the full height of the canvas is a full turn.
    pub fn rotate_by_pixels(&mut self, delta_x: f32, delta_y: f32) {
        let factor = 2.0 * PI * self.rotate_speed / self.client_height;
        self.rotate_left(delta_x * factor);
        self.rotate_up(delta_y * factor);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.rotating = *state == ElementState::Pressed;
                EventState { processed: true }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.last_cursor.replace(current);
                if let (true, Some(previous)) = (self.rotating, previous) {
                    self.rotate_by_pixels(
                        (current.0 - previous.0) as f32,
                        (current.1 - previous.1) as f32,
                    );
                    return EventState { processed: true };
                }
                EventState::default()
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                self.rotating = false;
                EventState::default()
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / Self::PIXELS_PER_LINE
                    }
                };
                if scroll > 0.0 {
                    self.dolly_in();
                } else if scroll < 0.0 {
                    self.dolly_out();
                }
                EventState { processed: true }
            }
            _ => EventState::default(),
        }
    }

    /// Applies pending rotation and zoom to the camera. Must be called every
    /// frame when damping is enabled.
    pub fn update(&mut self, camera: &mut Camera) {
        let mut spherical = Spherical::from_offset(camera.eye_position() - self.target);
        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.set_position(self.target + spherical.to_offset());
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
        }
        self.scale = 1.0;
    }
}

/// Places the camera on a sphere of `radius` around the origin from a pointer
/// position relative to a canvas of `width` x `height`: a horizontal sweep
/// over the canvas is one full turn around Y, a vertical sweep goes from
/// above to below.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pointer_orbit_position(
    x: f32,
    y: f32,
    dimensions: Dimensions,
    radius: f32,
) -> Point3<f32> {
    let pos_x = x / dimensions.width.max(1) as f32 - 0.5;
    let pos_y = y / dimensions.height.max(1) as f32 - 0.5;
    Point3::new(
        (2.0 * PI * pos_x).sin() * radius,
        -((PI * pos_y).sin() * radius),
        (2.0 * PI * pos_x).cos() * radius,
    )
}

/// Moves the camera with [`pointer_orbit_position`] whenever the cursor moves,
/// always looking at `target`.
#[derive(Debug, Clone)]
pub struct PointerOrbit {
    pub radius: f32,
    pub target: Point3<f32>,
    canvas: Dimensions,
    pending: Option<Point3<f32>>,
}

impl PointerOrbit {
    #[must_use]
    pub fn new(radius: f32, target: Point3<f32>) -> Self {
        Self {
            radius,
            target,
            canvas: Dimensions {
                width: 1,
                height: 1,
            },
            pending: None,
        }
    }

    pub fn set_screen_size(&mut self, dimensions: Dimensions) {
        if !dimensions.is_empty() {
            self.canvas = dimensions;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
        if let WindowEvent::CursorMoved { position, .. } = event {
            let eye = pointer_orbit_position(
                position.x as f32,
                position.y as f32,
                self.canvas,
                self.radius,
            );
            debug!("Pointer moved camera to {eye:?}");
            self.pending = Some(eye);
            return EventState { processed: true };
        }
        EventState::default()
    }

    pub fn update(&mut self, camera: &mut Camera) {
        if let Some(eye) = self.pending.take() {
            camera.set_position(eye);
            camera.look_at(self.target);
        }
    }
}

/// How the camera of a scene reacts to input.
#[derive(Debug, Clone, Default)]
pub enum CameraControl {
    #[default]
    Fixed,
    Orbit(OrbitControls),
    Pointer(PointerOrbit),
}

impl CameraControl {
    pub fn set_screen_size(&mut self, dimensions: Dimensions) {
        match self {
            Self::Fixed => {}
            Self::Orbit(controls) => controls.set_screen_size(dimensions),
            Self::Pointer(pointer) => pointer.set_screen_size(dimensions),
        }
    }

    pub fn on_window_event(&mut self, event: &WindowEvent) -> EventState {
        match self {
            Self::Fixed => EventState::default(),
            Self::Orbit(controls) => controls.on_window_event(event),
            Self::Pointer(pointer) => pointer.on_window_event(event),
        }
    }

    pub fn update(&mut self, camera: &mut Camera) {
        match self {
            Self::Fixed => {}
            Self::Orbit(controls) => controls.update(camera),
            Self::Pointer(pointer) => pointer.update(camera),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::cameras::PerspectiveConfig;

    const CANVAS: Dimensions = Dimensions {
        width: 800,
        height: 600,
    };

    fn camera_at_z5() -> Camera {
        let mut camera: Camera = PerspectiveConfig::new(75.0, 1.0, 1.0, 1000.0).into();
        camera.set_position(Point3::new(0., 0., 5.));
        camera
    }

    #[test]
    fn spherical_round_trips_offsets() {
        let offset = Vector3::new(1.0, 2.0, -3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert_abs_diff_eq!(back, offset, epsilon = 1e-5);
    }

    #[test]
    fn spherical_of_zero_offset_is_degenerate_but_finite() {
        let spherical = Spherical::from_offset(Vector3::new(0., 0., 0.));
        assert_eq!(spherical.radius, 0.0);
        assert!(spherical.to_offset().x.is_finite());
    }

    #[test]
    fn update_without_input_keeps_camera_still() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls::with_damping();
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position(), Point3::new(0., 0., 5.), epsilon = 1e-5);
    }

    #[test]
    fn undamped_rotation_is_applied_at_once() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls::default();
        controls.rotate_left(-FRAC_PI_2);
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position(), Point3::new(5., 0., 0.), epsilon = 1e-4);
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position(), Point3::new(5., 0., 0.), epsilon = 1e-4);
    }

    #[test]
    fn damped_rotation_is_spread_over_frames() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls::with_damping();
        controls.rotate_left(-1.0);
        controls.update(&mut camera);
        let first_theta = Spherical::from_offset(camera.eye_position().to_vec()).theta;
        assert_abs_diff_eq!(first_theta, OrbitControls::DEFAULT_DAMPING_FACTOR, epsilon = 1e-5);
        for _ in 0..500 {
            controls.update(&mut camera);
        }
        let settled_theta = Spherical::from_offset(camera.eye_position().to_vec()).theta;
        assert_abs_diff_eq!(settled_theta, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(camera.eye_position().to_vec().magnitude(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls::default();
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        let eye = camera.eye_position();
        assert!(eye.y > 4.99);
        assert!(eye.x.is_finite() && eye.z.is_finite());
    }

    #[test]
    fn scrolling_up_moves_closer() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls::default();
        controls.on_window_event(&WindowEvent::MouseWheel {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: winit::event::TouchPhase::Moved,
        });
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position().z, 5.0 * 0.95, epsilon = 1e-5);
    }

    #[test]
    fn distance_is_clamped() {
        let mut camera = camera_at_z5();
        let mut controls = OrbitControls {
            max_distance: 5.5,
            ..OrbitControls::default()
        };
        for _ in 0..10 {
            controls.dolly_out();
        }
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position().z, 5.5, epsilon = 1e-5);
    }

    #[test]
    fn drag_over_full_height_is_a_full_turn() {
        let mut controls = OrbitControls::default();
        controls.set_screen_size(CANVAS);
        controls.rotate_by_pixels(600.0, 0.0);
        assert_abs_diff_eq!(controls.spherical_delta.theta, -2.0 * PI, epsilon = 1e-5);
    }

    #[test]
    fn pointer_at_canvas_center_looks_from_the_back() {
        // Center of the canvas: px = py = 0, camera stays on +Z
        let eye = pointer_orbit_position(400.0, 300.0, CANVAS, 5.0);
        assert_abs_diff_eq!(eye, Point3::new(0., 0., 5.), epsilon = 1e-5);
    }

    #[test]
    fn pointer_at_top_left_corner() {
        // px = py = -0.5: half a turn around Y, and the camera goes up
        let eye = pointer_orbit_position(0.0, 0.0, CANVAS, 5.0);
        assert_abs_diff_eq!(eye, Point3::new(0., 5., -5.), epsilon = 1e-5);
    }

    #[test]
    fn pointer_at_three_quarters_width() {
        let eye = pointer_orbit_position(600.0, 300.0, CANVAS, 5.0);
        assert_abs_diff_eq!(eye, Point3::new(5., 0., 0.), epsilon = 1e-5);
    }

    #[test]
    fn pointer_orbit_applies_on_update() {
        let mut camera = camera_at_z5();
        let mut pointer = PointerOrbit::new(5.0, Point3::origin());
        pointer.set_screen_size(CANVAS);
        pointer.on_window_event(&WindowEvent::CursorMoved {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            position: winit::dpi::PhysicalPosition::new(600.0, 300.0),
        });
        assert_abs_diff_eq!(camera.eye_position(), Point3::new(0., 0., 5.), epsilon = 1e-5);
        pointer.update(&mut camera);
        assert_abs_diff_eq!(camera.eye_position(), Point3::new(5., 0., 0.), epsilon = 1e-5);
        assert_abs_diff_eq!(camera.target(), Point3::origin());
    }
}
