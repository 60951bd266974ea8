use glam::{EulerRot, Mat4};
use std::f32::consts::TAU;

pub const DEFAULT_ROTATION_STEP: f32 = 0.01;

/// Sphere rotation angles in radians, kept in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
}

impl Orientation {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

/// Spins the sphere by a fixed step per rendered frame.
///
/// Tick based rather than wall-clock based, so the apparent speed follows the
/// achieved frame rate.
#[derive(Debug, Clone)]
pub struct RotationDriver {
    orientation: Orientation,
    step: f32,
}

impl RotationDriver {
    pub fn new(step: f32) -> Self {
        Self {
            orientation: Orientation::default(),
            step,
        }
    }

    pub fn tick(&mut self) -> Orientation {
        self.orientation.x = (self.orientation.x + self.step).rem_euclid(TAU);
        self.orientation.y = (self.orientation.y + self.step).rem_euclid(TAU);
        self.orientation
    }
}

impl Default for RotationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::{Orientation, RotationDriver, DEFAULT_ROTATION_STEP};
    use glam::Vec3;
    use std::f32::consts::TAU;

    #[test]
    fn each_tick_advances_both_axes_by_step() {
        let mut driver = RotationDriver::default();
        let mut previous = driver.orientation;
        for _ in 0..2_000 {
            let next = driver.tick();
            let dx = (next.x - previous.x).rem_euclid(TAU);
            let dy = (next.y - previous.y).rem_euclid(TAU);
            assert!((dx - DEFAULT_ROTATION_STEP).abs() < 1e-4);
            assert!((dy - DEFAULT_ROTATION_STEP).abs() < 1e-4);
            previous = next;
        }
        assert_eq!(driver.orientation, previous);
    }

    #[test]
    fn angles_stay_wrapped() {
        let mut driver = RotationDriver::new(1.0);
        for _ in 0..100 {
            let orientation = driver.tick();
            assert!((0.0..TAU).contains(&orientation.x));
            assert!((0.0..TAU).contains(&orientation.y));
        }
    }

    #[test]
    fn model_matrix_is_a_pure_rotation() {
        let orientation = Orientation { x: 0.4, y: 1.3 };
        let matrix = orientation.model_matrix();
        let moved = matrix.transform_vector3(Vec3::new(0.0, 0.0, 1.0));
        assert!((moved.length() - 1.0).abs() < 1e-5);
        assert!(matrix.w_axis.truncate().length() < 1e-6);
    }
}
