//! # Guard Module
//!
//! An optional check placed in front of [`mat_inverse`](crate::matrix::mat_inverse).
//!
//! The inverse itself divides by the determinant without looking at it. Callers that cannot
//! rule out degenerate object scales upstream run the model matrix through a
//! [`NormalGuard`] instead, which either rejects a near-singular block or stretches its
//! collapsed axes back to a minimum length before inverting.

use nalgebra_glm as glm;

use crate::config::{GuardConfig, GuardPolicy};
use crate::error::{ContractError, Result};
use crate::matrix::{determinant, mat_inverse, upper_left_3x3};

/// Checked front end to the normal-matrix inverse.
///
/// ```rust
/// use nalgebra_glm as glm;
/// use shading_contracts::{ContractError, NormalGuard};
///
/// let guard = NormalGuard::default();
/// let flat = glm::scale(&glm::Mat4::identity(), &glm::vec3(1.0, 0.0, 1.0));
/// assert!(matches!(
///     guard.normal_matrix(&flat),
///     Err(ContractError::SingularTransform { .. })
/// ));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NormalGuard {
    config: GuardConfig,
}

impl NormalGuard {
    /// Creates a guard with the given policy and thresholds.
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Current settings.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Checked version of [`normal_matrix`](crate::matrix::normal_matrix).
    pub fn normal_matrix(&self, model: &glm::Mat4) -> Result<glm::Mat3> {
        let block = self.checked_block(&upper_left_3x3(model))?;
        Ok(mat_inverse(&block).transpose())
    }

    /// Checked version of [`mat_inverse`].
    pub fn inverse(&self, m: &glm::Mat3) -> Result<glm::Mat3> {
        let block = self.checked_block(m)?;
        Ok(mat_inverse(&block))
    }

    /// Returns a block that is safe to invert, or an error if none can be produced under the
    /// configured policy.
    fn checked_block(&self, m: &glm::Mat3) -> Result<glm::Mat3> {
        if m.iter().any(|e| !e.is_finite()) {
            return Err(ContractError::NonFiniteTransform);
        }

        let det = determinant(m);
        if det.abs() >= self.config.min_determinant {
            return Ok(*m);
        }

        match self.config.policy {
            GuardPolicy::Reject => {
                log::warn!("rejecting singular transform (determinant {det})");
                Err(ContractError::SingularTransform { determinant: det })
            }
            GuardPolicy::Regularize => {
                let regularized = self.regularize(m);
                let det = determinant(&regularized);
                if det.abs() >= self.config.min_determinant {
                    log::warn!("regularized degenerate transform (determinant now {det})");
                    Ok(regularized)
                } else {
                    // collapsed by shear, not by scale
                    log::warn!("could not regularize transform (determinant {det})");
                    Err(ContractError::SingularTransform { determinant: det })
                }
            }
        }
    }

    /// Stretches every basis column shorter than `min_axis_scale` to that length. A zero
    /// column is replaced by its unit axis.
    fn regularize(&self, m: &glm::Mat3) -> glm::Mat3 {
        let min = self.config.min_axis_scale;
        let mut out = *m;
        for i in 0..3 {
            let column: glm::Vec3 = m.column(i).into_owned();
            let length = glm::length(&column);
            if length >= min {
                continue;
            }
            let direction = if length > 0.0 {
                column / length
            } else {
                let mut axis = glm::Vec3::zeros();
                axis[i] = 1.0;
                axis
            };
            out.set_column(i, &(direction * min));
        }
        out
    }
}
