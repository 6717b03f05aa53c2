use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::layout::Material;

/// Shading parameters of a surface as authored on the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    #[serde(default = "default_base_color")]
    pub base_color: Vec3,
    #[serde(default)]
    pub second_color: Vec3,
    #[serde(default)]
    pub specular_color: Vec3,
    #[serde(default)]
    pub roughness: f32,
    #[serde(default)]
    pub metallic: f32,
    #[serde(default)]
    pub ambient_occlusion: Vec3,
    #[serde(default)]
    pub shininess: f32,
    #[serde(default)]
    pub irradiated_color: Vec4,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            base_color: default_base_color(),
            second_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
            roughness: 0.0,
            metallic: 0.0,
            ambient_occlusion: Vec3::ZERO,
            shininess: 0.0,
            irradiated_color: Vec4::ZERO,
        }
    }
}

fn default_base_color() -> Vec3 {
    Vec3::ONE
}

impl SurfaceMaterial {
    /// Glossy red of the demo sphere.
    pub fn red_sphere() -> Self {
        Self {
            base_color: Vec3::new(1.0, 0.0, 0.0),
            second_color: Vec3::new(1.0, 1.0, 0.0),
            shininess: 0.4,
            ..Self::default()
        }
    }

    /// Metallic green of the demo cube.
    pub fn green_cube() -> Self {
        Self {
            base_color: Vec3::new(0.0, 0.5, 0.0),
            second_color: Vec3::new(1.0, 1.0, 0.0),
            specular_color: Vec3::new(0.0, 1.0, 0.0),
            metallic: 1.0,
            ambient_occlusion: Vec3::ONE,
            shininess: 0.1,
            ..Self::default()
        }
    }

    pub fn to_gpu(&self) -> Material {
        let mut material = Material::default();
        material.base_color = self.base_color.into();
        material.second_color = self.second_color.into();
        material.specular_color = self.specular_color.into();
        material.roughness = self.roughness;
        material.metallic = self.metallic;
        material.ambient_occlusion = self.ambient_occlusion.into();
        material.shininess = self.shininess;
        material.irradiated_color = self.irradiated_color.to_array();
        material
    }
}

impl From<&SurfaceMaterial> for Material {
    fn from(material: &SurfaceMaterial) -> Self {
        material.to_gpu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_material_packs_every_field() {
        let material = SurfaceMaterial::green_cube().to_gpu();
        assert_eq!(material.base_color.to_array(), [0.0, 0.5, 0.0]);
        assert_eq!(material.specular_color.to_array(), [0.0, 1.0, 0.0]);
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.0);
        assert_eq!(material.ambient_occlusion.to_array(), [1.0, 1.0, 1.0]);
        assert_eq!(material.shininess, 0.1);
        assert_eq!(material.irradiated(), Vec4::ZERO);
    }

    #[test]
    fn default_material_is_white_and_otherwise_zero() {
        let material = SurfaceMaterial::default().to_gpu();
        assert_eq!(material.base_color.to_array(), [1.0, 1.0, 1.0]);
        let mut expected = Material::default();
        expected.base_color = Vec3::ONE.into();
        assert_eq!(material, expected);
    }
}
