//! # Error Module
//!
//! Errors raised by the optional checking layers of the crate: the singular-transform
//! guard, the producer/consumer layout pairing and the interpolant variant check. The inverse routine itself has no
//! error path and never returns one of these.

use crate::fragment::InterpolantVariant;
use crate::layout::LayoutField;

/// Errors reported by [`NormalGuard`](crate::NormalGuard), by the checks in
/// [`layout`](crate::layout) and by [`VertexStage::run`](crate::VertexStage::run).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    /// The upper-left 3x3 block of a model matrix is singular or too close to it.
    #[error("transform is singular (determinant {determinant})")]
    SingularTransform { determinant: f32 },

    /// The transform contains an infinity or NaN before inversion.
    #[error("transform contains non-finite elements")]
    NonFiniteTransform,

    #[error("producer declares layout `{producer}`, consumer declares `{consumer}`")]
    NameMismatch { producer: String, consumer: String },

    #[error("layout `{layout}`: producer is {producer} bytes, consumer expects {consumer}")]
    SizeMismatch {
        layout: String,
        producer: usize,
        consumer: usize,
    },

    #[error("layout `{layout}`: producer declares {producer} fields, consumer {consumer}")]
    FieldCountMismatch {
        layout: String,
        producer: usize,
        consumer: usize,
    },

    /// A field differs in name, offset or width.
    #[error("layout `{layout}` field #{index}: producer {producer:?}, consumer {consumer:?}")]
    FieldMismatch {
        layout: String,
        index: usize,
        producer: LayoutField,
        consumer: LayoutField,
    },

    #[error("layout `{layout}` is {size} bytes, not a multiple of 16")]
    UnalignedSize { layout: String, size: usize },

    /// A field overlaps its predecessor or extends past the end of the record.
    #[error("layout `{layout}`: field {field:?} overlaps or is out of bounds")]
    MalformedField { layout: String, field: LayoutField },

    /// The vertex stage was asked to write an interpolant the pipeline is not configured for.
    #[error("pipeline is configured for the {configured:?} interpolant, not {written:?}")]
    VariantMismatch {
        configured: InterpolantVariant,
        written: InterpolantVariant,
    },
}

pub type Result<T> = std::result::Result<T, ContractError>;
