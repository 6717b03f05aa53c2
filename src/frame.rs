//! Packing a scene into the buffers the shaders read each frame.
//!
//! A frame blob is laid out as one [`FragmentUniforms`] block, followed by
//! `lightCount` [`Light`] records, followed by one [`Uniforms`] +
//! [`Material`] pair per draw.

use std::mem::size_of;

use glam::{Mat3, Mat4, Vec3};
use log::{debug, warn};

use crate::camera::Camera;
use crate::error::LayoutError;
use crate::layout::{FragmentUniforms, GpuLayout, Light, Material, Uniforms};
use crate::light::LightSource;
use crate::reader::{self, RecordReader};
use crate::scene::{Scene, SceneObject};
use crate::schema;

/// Light records that fit in one 4 KiB inline fragment buffer.
pub const MAX_LIGHTS: usize = 4096 / size_of::<Light>();

/// Bytes taken by one draw in a frame blob.
pub const DRAW_STRIDE: usize = size_of::<Uniforms>() + size_of::<Material>();

/// Ordered light records bound next to [`FragmentUniforms`].
#[derive(Debug, Clone, PartialEq)]
pub struct LightBuffer {
    lights: Vec<Light>,
    capacity: usize,
}

impl Default for LightBuffer {
    fn default() -> Self {
        Self::with_capacity(MAX_LIGHTS)
    }
}

impl LightBuffer {
    /// `capacity` is clamped to [`MAX_LIGHTS`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_LIGHTS);
        Self {
            lights: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, light: Light) -> Result<(), LayoutError> {
        if self.lights.len() >= self.capacity {
            return Err(LayoutError::LightCapacity {
                count: self.lights.len() + 1,
                capacity: self.capacity,
            });
        }
        self.lights.push(light);
        Ok(())
    }

    pub fn push_source(&mut self, source: &LightSource) -> Result<(), LayoutError> {
        self.push(source.to_gpu())
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lights)
    }
}

/// Per-frame fragment state together with the lights it counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    camera_position: Vec3,
    lights: LightBuffer,
}

impl FrameData {
    pub fn new(camera_position: Vec3) -> Self {
        Self {
            camera_position,
            lights: LightBuffer::default(),
        }
    }

    pub fn with_lights<'a>(
        camera_position: Vec3,
        sources: impl IntoIterator<Item = &'a LightSource>,
    ) -> Result<Self, LayoutError> {
        let mut frame = Self::new(camera_position);
        for source in sources {
            frame.lights.push_source(source)?;
        }
        Ok(frame)
    }

    pub fn lights(&self) -> &LightBuffer {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightBuffer {
        &mut self.lights
    }

    /// `light_count` always equals the number of pushed lights.
    pub fn fragment_uniforms(&self) -> FragmentUniforms {
        FragmentUniforms::new(self.lights.len() as u32, self.camera_position)
    }
}

/// Model matrix as translate * rotate(Z, Y, X) * scale, angles in degrees.
pub fn model_matrix(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    let translation = Mat4::from_translation(position);
    let rotation = Mat4::from_rotation_z(rotation.z.to_radians())
        * Mat4::from_rotation_y(rotation.y.to_radians())
        * Mat4::from_rotation_x(rotation.x.to_radians());
    translation * rotation * Mat4::from_scale(scale)
}

/// Inverse transpose of the upper-left 3x3 of `model`.
///
/// Singular models (a zero scale axis) fall back to the plain upper-left
/// block so the shader never sees NaNs.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(model);
    if upper.determinant().abs() <= f32::EPSILON {
        warn!("model matrix is singular; using its upper-left block as the normal matrix");
        return upper;
    }
    upper.inverse().transpose()
}

pub fn draw_uniforms(model: Mat4, camera: &Camera) -> Uniforms {
    Uniforms {
        model_matrix: model.to_cols_array_2d(),
        view_matrix: camera.view_matrix().to_cols_array_2d(),
        projection_matrix: camera.projection_matrix().to_cols_array_2d(),
        normal_matrix: normal_matrix(model).into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDraw {
    pub name: String,
    pub uniforms: Uniforms,
    pub material: Material,
}

impl EncodedDraw {
    pub fn for_object(object: &SceneObject, camera: &Camera) -> Self {
        let model = model_matrix(object.position, object.rotation, object.scale);
        Self {
            name: object.name.clone(),
            uniforms: draw_uniforms(model, camera),
            material: object.material.to_gpu(),
        }
    }
}

/// Everything the shaders need to draw one frame of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub fragment: FragmentUniforms,
    pub lights: Vec<Light>,
    pub draws: Vec<EncodedDraw>,
}

impl EncodedFrame {
    pub fn byte_len(&self) -> usize {
        size_of::<FragmentUniforms>()
            + self.lights.len() * size_of::<Light>()
            + self.draws.len() * DRAW_STRIDE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len());
        bytes.extend_from_slice(self.fragment.as_bytes());
        bytes.extend_from_slice(bytemuck::cast_slice(&self.lights));
        for draw in &self.draws {
            bytes.extend_from_slice(draw.uniforms.as_bytes());
            bytes.extend_from_slice(draw.material.as_bytes());
        }
        bytes
    }

    /// Decodes a blob written by [`EncodedFrame::to_bytes`]. Draw names are
    /// not stored, so decoded draws are named by index.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        let fragment = FragmentUniforms::read_from(bytes)?;
        let count = fragment.light_count as usize;
        if count > MAX_LIGHTS {
            return Err(LayoutError::LightCapacity {
                count,
                capacity: MAX_LIGHTS,
            });
        }

        let mut rest = &bytes[size_of::<FragmentUniforms>()..];
        let mut lights = Vec::with_capacity(count);
        for _ in 0..count {
            lights.push(Light::read_from(rest)?);
            rest = &rest[size_of::<Light>()..];
        }

        if rest.len() % DRAW_STRIDE != 0 {
            return Err(LayoutError::TrailingBytes {
                ty: "Uniforms + Material",
                remaining: rest.len() % DRAW_STRIDE,
                stride: DRAW_STRIDE,
            });
        }
        let draws = rest
            .chunks_exact(DRAW_STRIDE)
            .enumerate()
            .map(|(index, chunk)| {
                Ok(EncodedDraw {
                    name: format!("draw{index}"),
                    uniforms: Uniforms::read_from(chunk)?,
                    material: Material::read_from(&chunk[size_of::<Uniforms>()..])?,
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        Ok(Self {
            fragment,
            lights,
            draws,
        })
    }
}

/// Builds the frame for `scene` with the given viewport aspect ratio.
pub fn encode_frame(scene: &Scene, aspect: f32) -> Result<EncodedFrame, LayoutError> {
    let camera = scene.camera.with_aspect(aspect);
    let frame = FrameData::with_lights(camera.position, &scene.lights)?;
    let draws: Vec<_> = scene
        .meshes()
        .map(|object| EncodedDraw::for_object(object, &camera))
        .collect();
    debug!(
        "encoded frame with {} light(s) and {} draw(s)",
        frame.lights().len(),
        draws.len()
    );
    Ok(EncodedFrame {
        fragment: frame.fragment_uniforms(),
        lights: frame.lights().lights().to_vec(),
        draws,
    })
}

/// Schema-driven view of a frame blob, independent of the typed structs.
pub struct FrameView<'a> {
    pub fragment: RecordReader<'a>,
    pub lights: Vec<RecordReader<'a>>,
    pub draws: Vec<(RecordReader<'a>, RecordReader<'a>)>,
}

impl<'a> FrameView<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, LayoutError> {
        let fragment = RecordReader::new(&schema::FRAGMENT_UNIFORMS, bytes)?;
        let count = fragment.read_u32("lightCount")? as usize;
        if count > MAX_LIGHTS {
            return Err(LayoutError::LightCapacity {
                count,
                capacity: MAX_LIGHTS,
            });
        }
        let rest = &bytes[schema::FRAGMENT_UNIFORMS.size..];
        let lights = reader::read_array(&schema::LIGHT, rest, count)?;
        let rest = &rest[count * schema::LIGHT.size..];

        let stride = schema::UNIFORMS.size + schema::MATERIAL.size;
        if rest.len() % stride != 0 {
            return Err(LayoutError::TrailingBytes {
                ty: "Uniforms + Material",
                remaining: rest.len() % stride,
                stride,
            });
        }
        let draws = rest
            .chunks_exact(stride)
            .map(|chunk| {
                Ok((
                    RecordReader::new(&schema::UNIFORMS, chunk)?,
                    RecordReader::new(&schema::MATERIAL, &chunk[schema::UNIFORMS.size..])?,
                ))
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;
        Ok(Self {
            fragment,
            lights,
            draws,
        })
    }
}
