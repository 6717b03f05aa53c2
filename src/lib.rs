//! GPU data layouts for the hit-test demo renderer.
//!
//! The crate owns the memory layout of every structure the host shares with
//! the Metal shaders: per-draw transforms, lights, per-frame fragment state
//! and materials. On top of those definitions it offers a schema the shader
//! header is generated from, an independent byte reader used to check the
//! two sides agree, and a frame encoder that packs a scene description into
//! upload-ready buffers. Opening a device and submitting work are left to
//! the caller.

pub mod camera;
pub mod error;
pub mod frame;
pub mod layout;
pub mod light;
pub mod material;
pub mod reader;
pub mod scene;
pub mod schema;

pub use camera::Camera;
pub use error::LayoutError;
pub use frame::{
    encode_frame, EncodedDraw, EncodedFrame, FrameData, FrameView, LightBuffer, MAX_LIGHTS,
};
pub use layout::{
    Float3, Float3x3, FragmentUniforms, GpuLayout, Light, LightType, Material, Uniforms,
};
pub use light::{Cone, LightKind, LightSource};
pub use material::SurfaceMaterial;
pub use reader::{FieldValue, RecordReader};
pub use scene::{Scene, SceneObject};
