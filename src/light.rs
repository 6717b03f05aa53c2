//! Host-side light description.
//!
//! [`LightSource`] keeps only the parameters that matter for its variant.
//! It is flattened into the fixed [`Light`] record when a frame is encoded.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::{Light, LightType};

/// Spotlight cone. The angle is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub angle: f32,
    pub direction: Vec3,
    pub attenuation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Directional light; `position` gives the direction towards the light.
    Sun { position: Vec3 },
    Spot {
        position: Vec3,
        attenuation: Vec3,
        cone: Cone,
    },
    Point { position: Vec3, attenuation: Vec3 },
    Ambient,
}

impl LightKind {
    pub fn light_type(&self) -> LightType {
        match self {
            LightKind::Sun { .. } => LightType::Sunlight,
            LightKind::Spot { .. } => LightType::Spotlight,
            LightKind::Point { .. } => LightType::Pointlight,
            LightKind::Ambient => LightType::Ambientlight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub color: Vec3,
    pub specular_color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            specular_color: Vec3::splat(0.6),
            intensity: 1.0,
            kind: LightKind::Sun {
                position: Vec3::ZERO,
            },
        }
    }
}

impl LightSource {
    /// White key light above and in front of the scene.
    pub fn sunlight() -> Self {
        Self {
            kind: LightKind::Sun {
                position: Vec3::new(1.0, 2.0, -2.0),
            },
            ..Self::default()
        }
    }

    /// Dim green-tinted fill light.
    pub fn ambient() -> Self {
        Self {
            color: Vec3::new(0.5, 1.0, 0.0),
            intensity: 0.1,
            kind: LightKind::Ambient,
            ..Self::default()
        }
    }

    pub fn red_point() -> Self {
        Self {
            color: Vec3::new(1.0, 0.0, 0.0),
            kind: LightKind::Point {
                position: Vec3::new(0.0, 0.5, -0.5),
                attenuation: Vec3::new(1.0, 3.0, 4.0),
            },
            ..Self::default()
        }
    }

    pub fn magenta_spot() -> Self {
        Self {
            color: Vec3::new(1.0, 0.0, 1.0),
            kind: LightKind::Spot {
                position: Vec3::new(0.4, 0.8, 1.0),
                attenuation: Vec3::new(1.0, 0.5, 0.0),
                cone: Cone {
                    angle: 40f32.to_radians(),
                    direction: Vec3::new(-2.0, 0.0, -1.5),
                    attenuation: 12.0,
                },
            },
            ..Self::default()
        }
    }

    pub fn light_type(&self) -> LightType {
        self.kind.light_type()
    }

    /// Flattens into the fixed GPU record; fields the variant does not use
    /// are left zeroed.
    pub fn to_gpu(&self) -> Light {
        let mut light = Light::default();
        light.color = self.color.into();
        light.specular_color = self.specular_color.into();
        light.intensity = self.intensity;
        light.set_kind(self.light_type());
        match self.kind {
            LightKind::Sun { position } => {
                light.position = position.into();
            }
            LightKind::Spot {
                position,
                attenuation,
                cone,
            } => {
                light.position = position.into();
                light.attenuation = attenuation.into();
                light.cone_angle = cone.angle;
                light.cone_direction = cone.direction.into();
                light.cone_attenuation = cone.attenuation;
            }
            LightKind::Point {
                position,
                attenuation,
            } => {
                light.position = position.into();
                light.attenuation = attenuation.into();
            }
            LightKind::Ambient => {}
        }
        light
    }
}

impl From<&LightSource> for Light {
    fn from(source: &LightSource) -> Self {
        source.to_gpu()
    }
}

impl TryFrom<&Light> for LightSource {
    type Error = LayoutError;

    fn try_from(light: &Light) -> Result<Self, Self::Error> {
        let position = light.position.to_vec3();
        let attenuation = light.attenuation.to_vec3();
        let kind = match light.kind()? {
            LightType::Unused => return Err(LayoutError::UnusedLight),
            LightType::Sunlight => LightKind::Sun { position },
            LightType::Spotlight => LightKind::Spot {
                position,
                attenuation,
                cone: Cone {
                    angle: light.cone_angle,
                    direction: light.cone_direction.to_vec3(),
                    attenuation: light.cone_attenuation,
                },
            },
            LightType::Pointlight => LightKind::Point {
                position,
                attenuation,
            },
            LightType::Ambientlight => LightKind::Ambient,
        };
        Ok(Self {
            color: light.color.to_vec3(),
            specular_color: light.specular_color.to_vec3(),
            intensity: light.intensity,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GpuLayout;
    use crate::reader::{FieldValue, RecordReader};
    use crate::schema;

    #[test]
    fn point_light_keeps_cone_slots_in_the_record() {
        let source = LightSource {
            intensity: 1.0,
            kind: LightKind::Point {
                position: Vec3::ZERO,
                attenuation: Vec3::new(1.0, 0.0, 0.0),
            },
            ..LightSource::default()
        };
        let light = source.to_gpu();
        let bytes = light.as_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[80..84], &3u32.to_le_bytes());
        assert_eq!(&bytes[84..88], &0f32.to_le_bytes());
        assert!(bytes[96..112].iter().all(|b| *b == 0));
        assert_eq!(&bytes[112..116], &0f32.to_le_bytes());

        let reader = RecordReader::new(&schema::LIGHT, bytes).unwrap();
        assert_eq!(reader.read_f32("coneAngle").unwrap(), 0.0);
        assert_eq!(reader.read_float3("coneDirection").unwrap(), [0.0; 3]);
        assert_eq!(reader.read_f32("coneAttenuation").unwrap(), 0.0);
        assert_eq!(reader.read_f32("intensity").unwrap(), 1.0);
        assert_eq!(reader.read_float3("position").unwrap(), [0.0; 3]);
    }

    #[test]
    fn spotlight_flattens_its_cone() {
        let light = LightSource::magenta_spot().to_gpu();
        assert_eq!(light.kind().unwrap(), LightType::Spotlight);
        assert_eq!(light.cone_angle, 40f32.to_radians());
        assert_eq!(light.cone_direction.to_vec3(), Vec3::new(-2.0, 0.0, -1.5));
        assert_eq!(light.cone_attenuation, 12.0);
        assert_eq!(light.attenuation.to_vec3(), Vec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn ambient_light_only_carries_color() {
        let light = LightSource::ambient().to_gpu();
        let reader = RecordReader::new(&schema::LIGHT, light.as_bytes()).unwrap();
        assert_eq!(
            reader.read("type").unwrap(),
            FieldValue::LightType(LightType::Ambientlight)
        );
        assert_eq!(reader.read_float3("color").unwrap(), [0.5, 1.0, 0.0]);
        assert_eq!(reader.read_f32("intensity").unwrap(), 0.1);
        assert_eq!(reader.read_float3("position").unwrap(), [0.0; 3]);
    }

    #[test]
    fn presets_rebuild_from_their_records() {
        for source in [
            LightSource::sunlight(),
            LightSource::ambient(),
            LightSource::red_point(),
            LightSource::magenta_spot(),
        ] {
            let rebuilt = LightSource::try_from(&source.to_gpu()).unwrap();
            assert_eq!(rebuilt, source);
        }
    }

    #[test]
    fn unused_and_unknown_records_do_not_rebuild() {
        let unused = Light::default();
        assert_eq!(
            LightSource::try_from(&unused).unwrap_err(),
            LayoutError::UnusedLight
        );
        let mut garbage = Light::default();
        garbage.light_type = 42;
        assert_eq!(
            LightSource::try_from(&garbage).unwrap_err(),
            LayoutError::InvalidLightType(42)
        );
    }
}
