use glam::{Mat4, Vec3};

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 1e-4;

pub const FOV_Y_DEG: f32 = 75.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

/// Free orbit/pan/zoom camera around a target point. No distance limits.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - position);
        Self {
            position,
            target,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// Camera on +Z looking at the origin.
    pub fn looking_at_origin(distance: f32) -> Self {
        Self::new(Vec3::new(0.0, 0.0, distance), Vec3::ZERO)
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = wrap_angle(self.yaw + yaw_delta);
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let distance = self.distance().max(MIN_DISTANCE);
        let (forward, _, _) = self.basis();
        self.position = self.target - forward * distance;
    }

    /// Screen-space pan; deltas are fractions of the view height.
    pub fn pan(&mut self, right_delta: f32, up_delta: f32) {
        let (_, right, up) = self.basis();
        let half_height = self.distance() * (FOV_Y_DEG.to_radians() * 0.5).tan();
        let offset = (-right * right_delta + up * up_delta) * half_height * 2.0;
        self.position += offset;
        self.target += offset;
    }

    /// Scales the distance to the target; `< 1` moves closer.
    pub fn zoom(&mut self, scale: f32) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let distance = (self.distance() * scale).max(MIN_DISTANCE);
        let (forward, _, _) = self.basis();
        self.position = self.target - forward * distance;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (forward, _, up) = self.basis();
        Mat4::look_to_rh(self.position, forward, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-4), Z_NEAR, Z_FAR)
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        (angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitCamera;
    use glam::Vec3;

    #[test]
    fn default_view_looks_down_negative_z() {
        let camera = OrbitCamera::looking_at_origin(5.0);
        let (forward, right, up) = camera.basis();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((right - Vec3::X).length() < 1e-5);
        assert!((up - Vec3::Y).length() < 1e-5);
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = OrbitCamera::looking_at_origin(5.0);
        camera.orbit(0.7, 0.4);
        camera.orbit(-2.1, 5.0);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
        assert!(camera.position.is_finite());
        assert!(camera.pitch.abs() < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn pan_moves_target_and_position_together() {
        let mut camera = OrbitCamera::looking_at_origin(5.0);
        camera.pan(0.1, -0.2);
        assert!(camera.target.length() > 0.0);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_has_no_upper_limit() {
        let mut camera = OrbitCamera::looking_at_origin(5.0);
        for _ in 0..10 {
            camera.zoom(10.0);
        }
        assert!(camera.distance() > 1e9);
        camera.zoom(0.0);
        camera.zoom(f32::NAN);
        assert!(camera.distance() > 1e9);
    }
}
