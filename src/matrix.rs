//! # Matrix Module
//!
//! Inverse and normal-matrix helpers for the upper-left 3x3 block of a model (or
//! model-view) transform.
//!
//! Normals and tangents must be transformed by the transpose of the inverse of the linear
//! part of a transform. For orthonormal matrices (pure rotations) the inverse equals the
//! transpose, so the block can be used as is. Any non-uniform scale or shear needs the
//! general inverse computed by [`mat_inverse`].
//!
//! ## Example
//!
//! ```rust
//! use nalgebra_glm as glm;
//! use shading_contracts::matrix;
//!
//! let model = glm::scale(&glm::Mat4::identity(), &glm::vec3(2.0, 3.0, 1.0));
//! let normal = matrix::transform_direction(
//!     &matrix::normal_matrix(&model),
//!     &glm::vec3(1.0, 0.0, 0.0),
//! );
//! assert_eq!(normal, glm::vec3(0.5, 0.0, 0.0));
//! ```

use nalgebra_glm as glm;

/// Computes the general inverse of a 3x3 matrix with the adjugate method.
///
/// Elements are labelled `m<row><column>` from the column-major storage, the determinant is
/// expanded by cofactors and the adjugate is scaled by `1 / det`. All arithmetic is `f32`.
///
/// The determinant is not checked. A singular matrix produces infinities and NaNs in the
/// result; reject or regularize degenerate transforms before calling this (see
/// [`NormalGuard`](crate::NormalGuard)).
pub fn mat_inverse(m: &glm::Mat3) -> glm::Mat3 {
    let m11 = m[(0, 0)];
    let m21 = m[(1, 0)];
    let m31 = m[(2, 0)];

    let m12 = m[(0, 1)];
    let m22 = m[(1, 1)];
    let m32 = m[(2, 1)];

    let m13 = m[(0, 2)];
    let m23 = m[(1, 2)];
    let m33 = m[(2, 2)];

    let det = m11 * m22 * m33 + m12 * m23 * m31 + m13 * m21 * m32
        - m11 * m23 * m32
        - m12 * m21 * m33
        - m13 * m22 * m31;

    // cofactors
    let c11 = m22 * m33 - m23 * m32;
    let c12 = m13 * m32 - m12 * m33;
    let c13 = m12 * m23 - m13 * m22;

    let c21 = m23 * m31 - m21 * m33;
    let c22 = m11 * m33 - m13 * m31;
    let c23 = m13 * m21 - m11 * m23;

    let c31 = m21 * m32 - m22 * m31;
    let c32 = m12 * m31 - m11 * m32;
    let c33 = m11 * m22 - m12 * m21;

    let adjugate = glm::Mat3::from_columns(&[
        glm::vec3(c11, c21, c31),
        glm::vec3(c12, c22, c32),
        glm::vec3(c13, c23, c33),
    ]);

    adjugate * (1.0 / det)
}

/// Determinant of a 3x3 matrix, expanded in the same order as [`mat_inverse`].
pub fn determinant(m: &glm::Mat3) -> f32 {
    let (m11, m21, m31) = (m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let (m12, m22, m32) = (m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let (m13, m23, m33) = (m[(0, 2)], m[(1, 2)], m[(2, 2)]);

    m11 * m22 * m33 + m12 * m23 * m31 + m13 * m21 * m32
        - m11 * m23 * m32
        - m12 * m21 * m33
        - m13 * m22 * m31
}

/// Linear part of an affine 4x4 transform: the first three components of its first three
/// columns.
pub fn upper_left_3x3(m: &glm::Mat4) -> glm::Mat3 {
    glm::mat4_to_mat3(m)
}

/// Transform for normals, tangents and bitangents under a model matrix that may contain
/// non-uniform scale or shear: `transpose(inverse(upper_left_3x3(model)))`.
pub fn normal_matrix(model: &glm::Mat4) -> glm::Mat3 {
    mat_inverse(&upper_left_3x3(model)).transpose()
}

/// Normal transform for a model matrix whose linear part is orthonormal.
///
/// The inverse of an orthonormal block is its transpose, so the inverse-transpose is the
/// block itself. Gives wrong normals if the model matrix scales or shears.
pub fn orthonormal_normal_matrix(model: &glm::Mat4) -> glm::Mat3 {
    upper_left_3x3(model)
}

/// Applies a 3x3 transform to a direction. The result is not renormalized; the consuming
/// stage does that after interpolation.
pub fn transform_direction(m: &glm::Mat3, direction: &glm::Vec3) -> glm::Vec3 {
    m * direction
}
