use glam::{Mat4, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

use crate::config::{CameraConfig, ControlsConfig};

const DEFAULT_UP: Vec3 = Vec3::Y;
const POLAR_EPSILON: f32 = 1e-6;
const SETTLE_EPSILON: f32 = 1e-6;

/// Perspective camera looking at a target point.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            Vec3::from_array(config.position),
            Vec3::from_array(config.target),
            config.fov_y_degrees.to_radians(),
            config.near,
            config.far,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        self.projection_matrix(aspect_of(viewport)) * self.view_matrix()
    }

    /// World-space ray from the camera through a point in normalized device coordinates.
    pub fn ndc_ray(&self, ndc: Vec2, aspect: f32) -> Option<(Vec3, Vec3)> {
        let clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let inv_view_proj = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let dir = ((world.truncate() / world.w) - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        Some((self.position, dir))
    }

    /// Screen position (pixels, origin top-left) of a world point, if it lies in front of the camera.
    pub fn project_point(&self, point: Vec3, viewport: PhysicalSize<u32>) -> Option<Vec2> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let clip = self.view_projection(viewport) * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
        Some(Vec2::new(x, y))
    }
}

pub fn aspect_of(viewport: PhysicalSize<u32>) -> f32 {
    if viewport.height > 0 {
        viewport.width as f32 / viewport.height as f32
    } else {
        1.0
    }
}

/// Radius plus polar (from +Y) and azimuthal (about +Y, from +Z) angles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self { radius: 0.0, phi: 0.0, theta: 0.0 };
        }
        Self { radius, phi: (offset.y / radius).clamp(-1.0, 1.0).acos(), theta: offset.x.atan2(offset.z) }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(sin_phi_radius * self.theta.sin(), self.phi.cos() * self.radius, sin_phi_radius * self.theta.cos())
    }
}

/// Orbit controls around a target: drag to rotate, wheel to dolly, secondary drag to pan.
/// Input accumulates deltas; `update` applies them to the camera, easing them out over
/// following frames when damping is enabled.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: ControlsConfig,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    disposed: bool,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            disposed: false,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stops reacting to input and drops any pending motion.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    fn accepts_input(&self) -> bool {
        !self.disposed
    }

    /// Pointer drag in pixels. A drag across the full viewport height turns one full revolution.
    pub fn rotate(&mut self, drag: Vec2, viewport_height: f32) {
        if !self.accepts_input() || viewport_height <= 0.0 {
            return;
        }
        let turn = std::f32::consts::TAU * self.config.rotate_speed / viewport_height;
        self.delta_theta -= drag.x * turn;
        self.delta_phi -= drag.y * turn;
    }

    /// Positive steps move toward the target, negative steps away.
    pub fn dolly(&mut self, steps: f32) {
        if !self.accepts_input() || !self.config.enable_zoom || steps == 0.0 {
            return;
        }
        let zoom_scale = 0.95_f32.powf(self.config.zoom_speed);
        self.scale *= zoom_scale.powf(steps);
    }

    /// Screen-space pan: dragging moves the target so the scene follows the pointer.
    pub fn pan(&mut self, drag: Vec2, viewport_height: f32, camera: &Camera3D) {
        if !self.accepts_input() || !self.config.enable_pan || viewport_height <= 0.0 {
            return;
        }
        let target_distance = (camera.position - camera.target).length() * (camera.fov_y_radians * 0.5).tan();
        let view_to_world = camera.view_matrix().inverse();
        let right = view_to_world.x_axis.truncate();
        let up = view_to_world.y_axis.truncate();
        let drag = drag * self.config.pan_speed;
        self.pan_offset -= right * (2.0 * drag.x * target_distance / viewport_height);
        self.pan_offset += up * (2.0 * drag.y * target_distance / viewport_height);
    }

    /// Applies pending motion to `camera`, clamping polar angle and distance.
    /// Returns true when the camera moved.
    pub fn update(&mut self, camera: &mut Camera3D) -> bool {
        if self.disposed {
            return false;
        }
        let damping = self.config.enable_damping;
        let factor = if damping { self.config.damping_factor.clamp(0.0, 1.0) } else { 1.0 };

        let mut spherical = Spherical::from_offset(camera.position - camera.target);
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        let min_polar = self.config.min_polar_angle.max(0.0);
        let max_polar = self.config.max_polar_angle.min(std::f32::consts::PI);
        spherical.phi = spherical.phi.clamp(min_polar, max_polar.max(min_polar));
        spherical.phi = spherical.phi.clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance.max(self.config.min_distance));

        let target = camera.target + self.pan_offset * factor;
        let position = target + spherical.to_offset();
        let moved = position.distance_squared(camera.position) > SETTLE_EPSILON
            || target.distance_squared(camera.target) > SETTLE_EPSILON;
        camera.target = target;
        camera.position = position;

        if damping {
            let keep = 1.0 - factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        moved
    }

    #[cfg(test)]
    fn pending_rotation(&self) -> (f32, f32) {
        (self.delta_theta, self.delta_phi)
    }
}
