use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::SceneObject;

/// Perspective camera producing the view and projection matrices.
///
/// Uses Metal conventions: left-handed, depth in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, -15.0),
            rotation: Vec3::ZERO,
            fov: 70.0,
            near: 0.001,
            far: 100.0,
            aspect: 1.0,
        }
    }
}

impl Camera {
    /// Picks the first `camera` object, falling back to the default camera.
    pub fn from_objects(objects: &[SceneObject]) -> Self {
        objects
            .iter()
            .find(|o| o.object_type == "camera")
            .map(|camera| Self {
                position: camera.position,
                rotation: camera.rotation,
                fov: camera.fov,
                ..Self::default()
            })
            .unwrap_or_default()
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * self.rotation_matrix()).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(
            self.fov.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn view_moves_camera_to_origin() {
        let camera = Camera::default();
        let eye = camera.view_matrix() * camera.position.extend(1.0);
        assert!(eye.truncate().length() < 1e-5);
    }

    #[test]
    fn projection_maps_near_and_far_to_metal_depth() {
        let camera = Camera {
            near: 0.5,
            far: 50.0,
            ..Camera::default()
        };
        let projection = camera.projection_matrix();
        let near = projection * Vec4::new(0.0, 0.0, 0.5, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, 50.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn camera_object_overrides_defaults() {
        let object = SceneObject {
            name: "Camera".into(),
            object_type: "camera".into(),
            position: Vec3::new(1.0, 1.0, -5.0),
            fov: 45.0,
            ..SceneObject::default()
        };
        let camera = Camera::from_objects(&[object]).with_aspect(2.0);
        assert_eq!(camera.position, Vec3::new(1.0, 1.0, -5.0));
        assert_eq!(camera.fov, 45.0);
        assert_eq!(camera.far, 100.0);
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(Camera::from_objects(&[]), Camera::default());
    }
}
