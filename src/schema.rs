//! Single description of every shared struct.
//!
//! The tables below are what the shader header is generated from, what the
//! independent reader walks, and what the compiled Rust structs are checked
//! against. Offsets follow Metal's `simd` alignment rules.

use std::fmt::Write as _;

use crate::error::LayoutError;
use crate::layout::{GpuLayout, LightType};

/// Storage class of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    UInt,
    LightType,
    Float3,
    Float4,
    Float3x3,
    Float4x4,
}

impl FieldKind {
    /// Bytes actually occupied, including the padding lane of 3-vectors.
    pub const fn size(self) -> usize {
        match self {
            FieldKind::Float | FieldKind::UInt | FieldKind::LightType => 4,
            FieldKind::Float3 | FieldKind::Float4 => 16,
            FieldKind::Float3x3 => 48,
            FieldKind::Float4x4 => 64,
        }
    }

    pub const fn alignment(self) -> usize {
        match self {
            FieldKind::Float | FieldKind::UInt | FieldKind::LightType => 4,
            _ => 16,
        }
    }

    pub const fn shader_type(self) -> &'static str {
        match self {
            FieldKind::Float => "float",
            FieldKind::UInt => "uint",
            FieldKind::LightType => "LightType",
            FieldKind::Float3 => "vector_float3",
            FieldKind::Float4 => "vector_float4",
            FieldKind::Float3x3 => "matrix_float3x3",
            FieldKind::Float4x4 => "matrix_float4x4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub offset: usize,
}

const fn field(name: &'static str, kind: FieldKind, offset: usize) -> FieldSchema {
    FieldSchema { name, kind, offset }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructSchema {
    pub name: &'static str,
    pub size: usize,
    pub fields: &'static [FieldSchema],
}

impl StructSchema {
    pub fn field(&self, name: &str) -> Result<&FieldSchema, LayoutError> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| LayoutError::UnknownField {
                ty: self.name,
                field: name.to_string(),
            })
    }

    /// Bytes between fields and at the tail that carry no data.
    pub fn padding(&self) -> usize {
        self.size - self.fields.iter().map(|f| f.kind.size()).sum::<usize>()
    }

    /// Checks that fields are aligned, ordered and non-overlapping.
    pub fn check_packing(&self) -> Result<(), LayoutError> {
        let mut cursor = 0;
        for field in self.fields {
            let expected = align_up(cursor, field.kind.alignment());
            if field.offset != expected {
                return Err(LayoutError::OffsetMismatch {
                    ty: self.name,
                    field: field.name,
                    expected,
                    actual: field.offset,
                });
            }
            cursor = field.offset + field.kind.size();
        }
        let expected = align_up(cursor, STRUCT_ALIGNMENT);
        if self.size != expected {
            return Err(LayoutError::SizeMismatch {
                ty: self.name,
                expected,
                actual: self.size,
            });
        }
        Ok(())
    }
}

/// Every shared struct contains at least one 16-aligned member.
pub const STRUCT_ALIGNMENT: usize = 16;

fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

pub const UNIFORMS: StructSchema = StructSchema {
    name: "Uniforms",
    size: 240,
    fields: &[
        field("modelMatrix", FieldKind::Float4x4, 0),
        field("viewMatrix", FieldKind::Float4x4, 64),
        field("projectionMatrix", FieldKind::Float4x4, 128),
        field("normalMatrix", FieldKind::Float3x3, 192),
    ],
};

pub const LIGHT: StructSchema = StructSchema {
    name: "Light",
    size: 128,
    fields: &[
        field("position", FieldKind::Float3, 0),
        field("color", FieldKind::Float3, 16),
        field("specularColor", FieldKind::Float3, 32),
        field("intensity", FieldKind::Float, 48),
        field("attenuation", FieldKind::Float3, 64),
        field("type", FieldKind::LightType, 80),
        field("coneAngle", FieldKind::Float, 84),
        field("coneDirection", FieldKind::Float3, 96),
        field("coneAttenuation", FieldKind::Float, 112),
    ],
};

pub const FRAGMENT_UNIFORMS: StructSchema = StructSchema {
    name: "FragmentUniforms",
    size: 32,
    fields: &[
        field("lightCount", FieldKind::UInt, 0),
        field("cameraPosition", FieldKind::Float3, 16),
    ],
};

pub const MATERIAL: StructSchema = StructSchema {
    name: "Material",
    size: 112,
    fields: &[
        field("baseColor", FieldKind::Float3, 0),
        field("secondColor", FieldKind::Float3, 16),
        field("specularColor", FieldKind::Float3, 32),
        field("roughness", FieldKind::Float, 48),
        field("metallic", FieldKind::Float, 52),
        field("ambientOcclusion", FieldKind::Float3, 64),
        field("shininess", FieldKind::Float, 80),
        field("irradiatedColor", FieldKind::Float4, 96),
    ],
};

/// All shared structs in header order.
pub const ALL: [&StructSchema; 4] = [&UNIFORMS, &LIGHT, &FRAGMENT_UNIFORMS, &MATERIAL];

/// Compares a compiled struct against its schema entry.
pub fn verify<T: GpuLayout>() -> Result<(), LayoutError> {
    let schema = T::SCHEMA;
    let actual = std::mem::size_of::<T>();
    if actual != schema.size {
        return Err(LayoutError::SizeMismatch {
            ty: schema.name,
            expected: schema.size,
            actual,
        });
    }
    let align = std::mem::align_of::<T>();
    if align != STRUCT_ALIGNMENT {
        return Err(LayoutError::AlignmentMismatch {
            ty: schema.name,
            expected: STRUCT_ALIGNMENT,
            actual: align,
        });
    }
    let compiled = T::compiled_offsets();
    for (index, field) in schema.fields.iter().enumerate() {
        let offset = compiled
            .get(index)
            .filter(|(name, _)| *name == field.name)
            .map(|(_, offset)| *offset)
            .ok_or_else(|| LayoutError::UnknownField {
                ty: schema.name,
                field: field.name.to_string(),
            })?;
        if offset != field.offset {
            return Err(LayoutError::OffsetMismatch {
                ty: schema.name,
                field: field.name,
                expected: field.offset,
                actual: offset,
            });
        }
    }
    Ok(())
}

pub fn verify_all() -> Result<(), LayoutError> {
    use crate::layout::{FragmentUniforms, Light, Material, Uniforms};

    for schema in ALL {
        schema.check_packing()?;
    }
    verify::<Uniforms>()?;
    verify::<Light>()?;
    verify::<FragmentUniforms>()?;
    verify::<Material>()?;
    Ok(())
}

/// Renders the C header consumed by the Metal shaders.
pub fn render_header() -> String {
    let mut out = String::new();
    out.push_str("// Generated by hittest-layout. Do not edit.\n");
    out.push_str("//\n");
    out.push_str("// Types and enum constants shared between Metal shaders and host code.\n");
    out.push_str("#ifndef ShaderTypes_h\n#define ShaderTypes_h\n\n");
    out.push_str("#import <simd/simd.h>\n\n");

    for schema in ALL {
        if schema.name == LIGHT.name {
            render_light_type(&mut out);
        }
        out.push_str("typedef struct {\n");
        for field in schema.fields {
            let _ = writeln!(out, "    {} {};", field.kind.shader_type(), field.name);
        }
        let _ = writeln!(out, "}} {};\n", schema.name);
    }

    out.push_str("#endif /* ShaderTypes_h */\n");
    out
}

fn render_light_type(out: &mut String) {
    out.push_str("typedef enum {\n");
    let last = LightType::ALL.len() - 1;
    for (index, ty) in LightType::ALL.into_iter().enumerate() {
        let separator = if index == last { "" } else { "," };
        let _ = writeln!(out, "    {} = {}{}", ty.shader_name(), ty as u32, separator);
    }
    out.push_str("} LightType;\n\n");
}

/// Human readable size and offset table.
pub fn render_report() -> String {
    let mut out = String::new();
    for schema in ALL {
        let _ = writeln!(
            out,
            "{} ({} bytes, {} padding)",
            schema.name,
            schema.size,
            schema.padding()
        );
        for field in schema.fields {
            let _ = writeln!(
                out,
                "  +{:<3} {:<16} {}",
                field.offset,
                field.name,
                field.kind.shader_type()
            );
        }
    }
    out
}
