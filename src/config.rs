//! # Config Module
//!
//! Pipeline-level choices that both sides of a stage boundary must agree on: which fragment
//! interpolant layout is used, which record supplies the routing scalars, and how the
//! optional [`NormalGuard`](crate::NormalGuard) treats near-singular transforms.

use crate::fragment::InterpolantVariant;

/// Which record supplies the shading-routing scalars when both carry them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoutingSource {
    /// Per-object values from [`ObjectConstants`](crate::ObjectConstants) win.
    #[default]
    Object,
    /// Per-material values from [`Material`](crate::Material) win.
    Material,
}

/// What the guard does with a transform whose determinant is too small.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GuardPolicy {
    /// Return [`ContractError::SingularTransform`](crate::ContractError::SingularTransform).
    #[default]
    Reject,
    /// Stretch degenerate basis vectors to a minimum length, then retry.
    Regularize,
}

/// Settings of the [`NormalGuard`](crate::NormalGuard).
///
/// The defaults reject any model matrix whose linear part has an absolute determinant below
/// `1e-6`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GuardConfig {
    pub policy: GuardPolicy,
    /// Smallest absolute determinant of the upper-left 3x3 block accepted as invertible.
    pub min_determinant: f32,
    /// Length degenerate basis vectors are stretched to under [`GuardPolicy::Regularize`].
    pub min_axis_scale: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            policy: GuardPolicy::Reject,
            min_determinant: 1e-6,
            min_axis_scale: 1e-2,
        }
    }
}

/// Choices fixed when a pipeline is built. Both stages of the pipeline must be compiled
/// against the same values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PipelineConfig {
    /// Interpolant layout written by the vertex stage and read by the fragment stage.
    pub interpolant: InterpolantVariant,
    pub routing_source: RoutingSource,
    pub guard: GuardConfig,
}

impl PipelineConfig {
    /// Selects the interpolant layout.
    pub fn with_interpolant(mut self, interpolant: InterpolantVariant) -> Self {
        self.interpolant = interpolant;
        self
    }

    /// Selects which record supplies the routing scalars.
    pub fn with_routing_source(mut self, routing_source: RoutingSource) -> Self {
        self.routing_source = routing_source;
        self
    }

    /// Replaces the guard settings used by
    /// [`VertexStage::prepare_guarded`](crate::VertexStage::prepare_guarded).
    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guard = guard;
        self
    }
}
