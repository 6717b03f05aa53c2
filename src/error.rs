use thiserror::Error;

/// Errors raised while packing or decoding shared layouts on the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{ty} needs {expected} bytes but only {actual} are available")]
    Truncated {
        ty: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{ty} has no field named `{field}`")]
    UnknownField { ty: &'static str, field: String },
    #[error("{ty}.{field} is not a {expected}")]
    KindMismatch {
        ty: &'static str,
        field: String,
        expected: &'static str,
    },
    #[error("invalid light type discriminant {0}")]
    InvalidLightType(u32),
    #[error("light slot is unused")]
    UnusedLight,
    #[error("light count {count} exceeds the light array capacity of {capacity}")]
    LightCapacity { count: usize, capacity: usize },
    #[error("{remaining} trailing bytes do not form a whole {ty} record of {stride} bytes")]
    TrailingBytes {
        ty: &'static str,
        remaining: usize,
        stride: usize,
    },
    #[error("{ty}.{field} is at offset {actual} but the shader expects {expected}")]
    OffsetMismatch {
        ty: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{ty} is aligned to {actual} bytes but the shader expects {expected}")]
    AlignmentMismatch {
        ty: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{ty} is {actual} bytes but the shader expects {expected}")]
    SizeMismatch {
        ty: &'static str,
        expected: usize,
        actual: usize,
    },
}
