//! Schema-driven decoding of raw buffers.
//!
//! This path never casts bytes into the Rust structs. It walks the
//! [`StructSchema`] tables and reads little-endian scalars at the declared
//! offsets, the way a shader sees the buffer. Comparing its output with the
//! typed structs catches any drift between the two.

use std::fmt;

use crate::error::LayoutError;
use crate::layout::LightType;
use crate::schema::{FieldKind, FieldSchema, StructSchema};

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f32),
    UInt(u32),
    LightType(LightType),
    Float3([f32; 3]),
    Float4([f32; 4]),
    /// Column-major.
    Float3x3([[f32; 3]; 3]),
    /// Column-major.
    Float4x4([[f32; 4]; 4]),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v:.3}"),
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::LightType(ty) => write!(f, "{}", ty.shader_name()),
            FieldValue::Float3([x, y, z]) => write!(f, "({x:.3}, {y:.3}, {z:.3})"),
            FieldValue::Float4([x, y, z, w]) => write!(f, "({x:.3}, {y:.3}, {z:.3}, {w:.3})"),
            FieldValue::Float3x3(columns) => {
                let rendered: Vec<String> = columns
                    .iter()
                    .map(|[x, y, z]| format!("({x:.3}, {y:.3}, {z:.3})"))
                    .collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            FieldValue::Float4x4(columns) => {
                let rendered: Vec<String> = columns
                    .iter()
                    .map(|[x, y, z, w]| format!("({x:.3}, {y:.3}, {z:.3}, {w:.3})"))
                    .collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// View over one record of a shared struct.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    schema: &'static StructSchema,
    bytes: &'a [u8],
}

impl<'a> RecordReader<'a> {
    /// Wraps the first `schema.size` bytes of `bytes`.
    pub fn new(schema: &'static StructSchema, bytes: &'a [u8]) -> Result<Self, LayoutError> {
        let bytes = bytes.get(..schema.size).ok_or(LayoutError::Truncated {
            ty: schema.name,
            expected: schema.size,
            actual: bytes.len(),
        })?;
        Ok(Self { schema, bytes })
    }

    pub fn schema(&self) -> &'static StructSchema {
        self.schema
    }

    pub fn read(&self, name: &str) -> Result<FieldValue, LayoutError> {
        let field = self.schema.field(name)?;
        self.read_field(field)
    }

    pub fn read_f32(&self, name: &str) -> Result<f32, LayoutError> {
        match self.read(name)? {
            FieldValue::Float(value) => Ok(value),
            _ => Err(self.wrong_kind(name, "float")),
        }
    }

    pub fn read_u32(&self, name: &str) -> Result<u32, LayoutError> {
        match self.read(name)? {
            FieldValue::UInt(value) => Ok(value),
            _ => Err(self.wrong_kind(name, "uint")),
        }
    }

    pub fn read_float3(&self, name: &str) -> Result<[f32; 3], LayoutError> {
        match self.read(name)? {
            FieldValue::Float3(value) => Ok(value),
            _ => Err(self.wrong_kind(name, "vector_float3")),
        }
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> Result<Vec<(&'static str, FieldValue)>, LayoutError> {
        self.schema
            .fields
            .iter()
            .map(|field| Ok((field.name, self.read_field(field)?)))
            .collect()
    }

    fn read_field(&self, field: &FieldSchema) -> Result<FieldValue, LayoutError> {
        let at = field.offset;
        let value = match field.kind {
            FieldKind::Float => FieldValue::Float(self.f32_at(at)),
            FieldKind::UInt => FieldValue::UInt(self.u32_at(at)),
            FieldKind::LightType => FieldValue::LightType(LightType::try_from(self.u32_at(at))?),
            FieldKind::Float3 => FieldValue::Float3(self.float3_at(at)),
            FieldKind::Float4 => FieldValue::Float4(self.float4_at(at)),
            FieldKind::Float3x3 => FieldValue::Float3x3([
                self.float3_at(at),
                self.float3_at(at + 16),
                self.float3_at(at + 32),
            ]),
            FieldKind::Float4x4 => FieldValue::Float4x4([
                self.float4_at(at),
                self.float4_at(at + 16),
                self.float4_at(at + 32),
                self.float4_at(at + 48),
            ]),
        };
        Ok(value)
    }

    // Offsets come from a schema whose size was checked in `new`.
    fn u32_at(&self, at: usize) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[at..at + 4]);
        u32::from_le_bytes(word)
    }

    fn f32_at(&self, at: usize) -> f32 {
        f32::from_bits(self.u32_at(at))
    }

    fn float3_at(&self, at: usize) -> [f32; 3] {
        [self.f32_at(at), self.f32_at(at + 4), self.f32_at(at + 8)]
    }

    fn float4_at(&self, at: usize) -> [f32; 4] {
        [
            self.f32_at(at),
            self.f32_at(at + 4),
            self.f32_at(at + 8),
            self.f32_at(at + 12),
        ]
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> LayoutError {
        LayoutError::KindMismatch {
            ty: self.schema.name,
            field: name.to_string(),
            expected,
        }
    }
}

/// Splits `bytes` into `count` consecutive records of `schema`.
pub fn read_array<'a>(
    schema: &'static StructSchema,
    bytes: &'a [u8],
    count: usize,
) -> Result<Vec<RecordReader<'a>>, LayoutError> {
    // Saturates: no slice can hold usize::MAX bytes.
    let needed = schema.size.saturating_mul(count);
    if bytes.len() < needed {
        return Err(LayoutError::Truncated {
            ty: schema.name,
            expected: needed,
            actual: bytes.len(),
        });
    }
    bytes[..needed]
        .chunks_exact(schema.size)
        .map(|chunk| RecordReader::new(schema, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FragmentUniforms, GpuLayout, Light, Material, Uniforms};
    use crate::schema;
    use glam::{Mat3, Mat4, Quat, Vec3};

    #[test]
    fn uniforms_survive_a_trip_through_raw_bytes() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 2.0, 2.0),
            Quat::from_rotation_y(0.5),
            Vec3::new(1.0, -2.0, 3.0),
        );
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let uniforms = Uniforms {
            model_matrix: model.to_cols_array_2d(),
            view_matrix: Mat4::from_translation(Vec3::Z).to_cols_array_2d(),
            projection_matrix: Mat4::perspective_lh(1.2, 1.5, 0.1, 100.0).to_cols_array_2d(),
            normal_matrix: normal.into(),
        };

        let reader = RecordReader::new(&schema::UNIFORMS, uniforms.as_bytes()).unwrap();
        assert_eq!(
            reader.read("modelMatrix").unwrap(),
            FieldValue::Float4x4(model.to_cols_array_2d())
        );
        assert_eq!(
            reader.read("projectionMatrix").unwrap(),
            FieldValue::Float4x4(uniforms.projection_matrix)
        );
        let FieldValue::Float3x3(columns) = reader.read("normalMatrix").unwrap() else {
            panic!("normalMatrix decoded as the wrong kind");
        };
        assert_eq!(columns[0], normal.x_axis.to_array());
        assert_eq!(columns[1], normal.y_axis.to_array());
        assert_eq!(columns[2], normal.z_axis.to_array());
    }

    #[test]
    fn light_fields_read_back_unchanged() {
        let mut light = Light::default();
        light.position = Vec3::new(0.4, 0.8, 1.0).into();
        light.color = Vec3::new(1.0, 0.0, 1.0).into();
        light.specular_color = Vec3::splat(0.6).into();
        light.intensity = 1.0;
        light.attenuation = Vec3::new(1.0, 0.5, 0.0).into();
        light.set_kind(LightType::Spotlight);
        light.cone_angle = 40f32.to_radians();
        light.cone_direction = Vec3::new(-2.0, 0.0, -1.5).into();
        light.cone_attenuation = 12.0;

        let reader = RecordReader::new(&schema::LIGHT, light.as_bytes()).unwrap();
        assert_eq!(reader.read_float3("position").unwrap(), [0.4, 0.8, 1.0]);
        assert_eq!(reader.read_float3("specularColor").unwrap(), [0.6, 0.6, 0.6]);
        assert_eq!(
            reader.read("type").unwrap(),
            FieldValue::LightType(LightType::Spotlight)
        );
        assert_eq!(reader.read_f32("coneAngle").unwrap(), 40f32.to_radians());
        assert_eq!(reader.read_float3("coneDirection").unwrap(), [-2.0, 0.0, -1.5]);
        assert_eq!(reader.read_f32("coneAttenuation").unwrap(), 12.0);
    }

    #[test]
    fn fragment_uniforms_read_back_unchanged() {
        let uniforms = FragmentUniforms::new(2, Vec3::new(0.0, 2.0, -15.0));
        let reader = RecordReader::new(&schema::FRAGMENT_UNIFORMS, uniforms.as_bytes()).unwrap();
        assert_eq!(reader.read_u32("lightCount").unwrap(), 2);
        assert_eq!(reader.read_float3("cameraPosition").unwrap(), [0.0, 2.0, -15.0]);
    }

    #[test]
    fn material_fields_read_back_unchanged() {
        let mut material = Material::default();
        material.base_color = Vec3::new(0.0, 0.5, 0.0).into();
        material.second_color = Vec3::new(1.0, 1.0, 0.0).into();
        material.specular_color = Vec3::Y.into();
        material.roughness = 0.25;
        material.metallic = 1.0;
        material.ambient_occlusion = Vec3::ONE.into();
        material.shininess = 0.1;
        material.irradiated_color = [0.2, 0.3, 0.4, 0.5];

        let reader = RecordReader::new(&schema::MATERIAL, material.as_bytes()).unwrap();
        let fields = reader.fields().unwrap();
        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            [
                "baseColor",
                "secondColor",
                "specularColor",
                "roughness",
                "metallic",
                "ambientOcclusion",
                "shininess",
                "irradiatedColor"
            ]
        );
        assert_eq!(fields[3].1, FieldValue::Float(0.25));
        assert_eq!(fields[4].1, FieldValue::Float(1.0));
        assert_eq!(fields[6].1, FieldValue::Float(0.1));
        assert_eq!(fields[7].1, FieldValue::Float4([0.2, 0.3, 0.4, 0.5]));
    }

    #[test]
    fn short_record_is_rejected() {
        let bytes = [0u8; 100];
        let err = RecordReader::new(&schema::MATERIAL, &bytes).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Truncated {
                ty: "Material",
                expected: 112,
                actual: 100,
            }
        );
    }

    #[test]
    fn out_of_range_light_type_is_reported() {
        let mut light = Light::default();
        light.light_type = 9;
        let reader = RecordReader::new(&schema::LIGHT, light.as_bytes()).unwrap();
        assert_eq!(
            reader.read("type").unwrap_err(),
            LayoutError::InvalidLightType(9)
        );
        assert_eq!(reader.read_f32("intensity").unwrap(), 0.0);
        assert!(matches!(
            reader.read_f32("position"),
            Err(LayoutError::KindMismatch { expected: "float", .. })
        ));
    }

    #[test]
    fn read_array_splits_consecutive_records() {
        let mut first = Light::default();
        first.intensity = 1.0;
        let mut second = Light::default();
        second.intensity = 0.1;
        let pair = [first, second];
        let bytes: &[u8] = bytemuck::cast_slice(&pair);

        let records = read_array(&schema::LIGHT, bytes, 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].read_f32("intensity").unwrap(), 0.1);
        assert!(read_array(&schema::LIGHT, bytes, 3).is_err());
        assert!(read_array(&schema::LIGHT, bytes, 0).unwrap().is_empty());
    }

    #[test]
    fn huge_record_count_is_truncation() {
        let bytes = [0u8; 256];
        let err = read_array(&schema::LIGHT, &bytes, usize::MAX / 128 + 2).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Truncated {
                ty: "Light",
                expected: usize::MAX,
                actual: 256,
            }
        );
    }

    #[test]
    fn field_values_render_compactly() {
        assert_eq!(FieldValue::Float3([1.0, 0.5, 0.0]).to_string(), "(1.000, 0.500, 0.000)");
        assert_eq!(FieldValue::LightType(LightType::Pointlight).to_string(), "Pointlight");
    }
}
