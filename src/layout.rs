//! Memory layouts shared with the shader stage.
//!
//! Every type here mirrors a declaration in the generated `ShaderTypes.h`
//! byte for byte. Metal packs `vector_float3` into a 16-byte slot and a
//! `matrix_float3x3` into three such columns, so the structs below carry
//! explicit padding members instead of relying on implicit padding. That
//! keeps them `Pod`, which in turn lets the host upload them with
//! [`bytemuck::bytes_of`] and nothing else.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};
use memoffset::offset_of;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::schema::{self, StructSchema};

/// `vector_float3`: three floats stored in a 16-byte aligned slot.
///
/// Equality ignores the fourth lane.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    _pad: f32,
}

impl Float3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, _pad: 0.0 }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl PartialEq for Float3 {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl From<Vec3> for Float3 {
    fn from(value: Vec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Float3> for Vec3 {
    fn from(value: Float3) -> Self {
        value.to_vec3()
    }
}

/// `matrix_float3x3`: three `vector_float3` columns, 48 bytes.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Float3x3 {
    pub columns: [Float3; 3],
}

impl Float3x3 {
    pub const IDENTITY: Self = Self {
        columns: [
            Float3::new(1.0, 0.0, 0.0),
            Float3::new(0.0, 1.0, 0.0),
            Float3::new(0.0, 0.0, 1.0),
        ],
    };

    pub fn to_mat3(self) -> Mat3 {
        Mat3::from_cols(
            self.columns[0].to_vec3(),
            self.columns[1].to_vec3(),
            self.columns[2].to_vec3(),
        )
    }
}

impl From<Mat3> for Float3x3 {
    fn from(value: Mat3) -> Self {
        Self {
            columns: [value.x_axis.into(), value.y_axis.into(), value.z_axis.into()],
        }
    }
}

/// `matrix_float4x4`, column-major.
pub type Float4x4 = [[f32; 4]; 4];

/// Behavioral variant of a [`Light`]. Shaders branch on the literal values.
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightType {
    #[default]
    Unused = 0,
    Sunlight = 1,
    Spotlight = 2,
    Pointlight = 3,
    Ambientlight = 4,
}

impl LightType {
    pub const ALL: [LightType; 5] = [
        LightType::Unused,
        LightType::Sunlight,
        LightType::Spotlight,
        LightType::Pointlight,
        LightType::Ambientlight,
    ];

    /// Name used for the enumerator in the shader header.
    pub fn shader_name(self) -> &'static str {
        match self {
            LightType::Unused => "unused",
            LightType::Sunlight => "Sunlight",
            LightType::Spotlight => "Spotlight",
            LightType::Pointlight => "Pointlight",
            LightType::Ambientlight => "Ambientlight",
        }
    }
}

impl TryFrom<u32> for LightType {
    type Error = LayoutError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        LightType::ALL
            .into_iter()
            .find(|ty| *ty as u32 == value)
            .ok_or(LayoutError::InvalidLightType(value))
    }
}

impl From<LightType> for u32 {
    fn from(value: LightType) -> Self {
        value as u32
    }
}

/// Per-draw transform state read by the vertex stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub model_matrix: Float4x4,
    pub view_matrix: Float4x4,
    pub projection_matrix: Float4x4,
    pub normal_matrix: Float3x3,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            view_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            projection_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: Float3x3::IDENTITY,
        }
    }
}

impl Uniforms {
    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_matrix)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_matrix)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection_matrix)
    }
}

/// A single light as the fragment stage sees it.
///
/// Fields that do not apply to the active [`LightType`] still occupy their
/// slot. `cone_*` only mean something for spotlights.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub position: Float3,
    pub color: Float3,
    pub specular_color: Float3,
    pub intensity: f32,
    _pad0: [u32; 3],
    pub attenuation: Float3,
    /// Raw [`LightType`] discriminant.
    pub light_type: u32,
    pub cone_angle: f32,
    _pad1: [u32; 2],
    pub cone_direction: Float3,
    pub cone_attenuation: f32,
    _pad2: [u32; 3],
}

impl Light {
    pub fn kind(&self) -> Result<LightType, LayoutError> {
        LightType::try_from(self.light_type)
    }

    pub fn set_kind(&mut self, kind: LightType) {
        self.light_type = kind.into();
    }
}

/// Per-frame state read by the fragment stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FragmentUniforms {
    /// Number of valid entries in the light array bound next to this block.
    pub light_count: u32,
    _pad0: [u32; 3],
    pub camera_position: Float3,
}

impl FragmentUniforms {
    pub fn new(light_count: u32, camera_position: Vec3) -> Self {
        Self {
            light_count,
            camera_position: camera_position.into(),
            ..Self::default()
        }
    }
}

/// Per-surface shading parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub base_color: Float3,
    pub second_color: Float3,
    pub specular_color: Float3,
    pub roughness: f32,
    pub metallic: f32,
    _pad0: [u32; 2],
    pub ambient_occlusion: Float3,
    pub shininess: f32,
    _pad1: [u32; 3],
    /// Emissive color, alpha in `w`.
    pub irradiated_color: [f32; 4],
}

impl Material {
    pub fn irradiated(&self) -> Vec4 {
        Vec4::from_array(self.irradiated_color)
    }
}

const _: () = assert!(std::mem::size_of::<Float3>() == 16);
const _: () = assert!(std::mem::size_of::<Float3x3>() == 48);
const _: () = assert!(std::mem::size_of::<Uniforms>() == 240);
const _: () = assert!(std::mem::size_of::<Light>() == 128);
const _: () = assert!(std::mem::size_of::<FragmentUniforms>() == 32);
const _: () = assert!(std::mem::size_of::<Material>() == 112);
const _: () = assert!(std::mem::align_of::<Uniforms>() == 16);
const _: () = assert!(std::mem::align_of::<Light>() == 16);
const _: () = assert!(std::mem::align_of::<FragmentUniforms>() == 16);
const _: () = assert!(std::mem::align_of::<Material>() == 16);

/// A struct that crosses the host/shader boundary.
pub trait GpuLayout: Pod {
    /// Schema entry the shader header is generated from.
    const SCHEMA: &'static StructSchema;

    /// Field offsets as laid out by the Rust compiler, in declaration order.
    fn compiled_offsets() -> Vec<(&'static str, usize)>;

    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Reads a value from the start of `bytes`, which need not be aligned.
    fn read_from(bytes: &[u8]) -> Result<Self, LayoutError> {
        let size = std::mem::size_of::<Self>();
        let record = bytes.get(..size).ok_or(LayoutError::Truncated {
            ty: Self::SCHEMA.name,
            expected: size,
            actual: bytes.len(),
        })?;
        Ok(bytemuck::pod_read_unaligned(record))
    }
}

macro_rules! compiled_offsets {
    ($ty:ty { $($field:ident => $name:literal),* $(,)? }) => {
        vec![$(($name, offset_of!($ty, $field))),*]
    };
}

impl GpuLayout for Uniforms {
    const SCHEMA: &'static StructSchema = &schema::UNIFORMS;

    fn compiled_offsets() -> Vec<(&'static str, usize)> {
        compiled_offsets!(Uniforms {
            model_matrix => "modelMatrix",
            view_matrix => "viewMatrix",
            projection_matrix => "projectionMatrix",
            normal_matrix => "normalMatrix",
        })
    }
}

impl GpuLayout for Light {
    const SCHEMA: &'static StructSchema = &schema::LIGHT;

    fn compiled_offsets() -> Vec<(&'static str, usize)> {
        compiled_offsets!(Light {
            position => "position",
            color => "color",
            specular_color => "specularColor",
            intensity => "intensity",
            attenuation => "attenuation",
            light_type => "type",
            cone_angle => "coneAngle",
            cone_direction => "coneDirection",
            cone_attenuation => "coneAttenuation",
        })
    }
}

impl GpuLayout for FragmentUniforms {
    const SCHEMA: &'static StructSchema = &schema::FRAGMENT_UNIFORMS;

    fn compiled_offsets() -> Vec<(&'static str, usize)> {
        compiled_offsets!(FragmentUniforms {
            light_count => "lightCount",
            camera_position => "cameraPosition",
        })
    }
}

impl GpuLayout for Material {
    const SCHEMA: &'static StructSchema = &schema::MATERIAL;

    fn compiled_offsets() -> Vec<(&'static str, usize)> {
        compiled_offsets!(Material {
            base_color => "baseColor",
            second_color => "secondColor",
            specular_color => "specularColor",
            roughness => "roughness",
            metallic => "metallic",
            ambient_occlusion => "ambientOcclusion",
            shininess => "shininess",
            irradiated_color => "irradiatedColor",
        })
    }
}
