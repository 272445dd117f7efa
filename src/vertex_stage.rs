//! # Vertex Stage Module
//!
//! A CPU rendition of the vertex stage's data flow:
//! `VertexRecord + ObjectConstants + FrameConstants (+ Material) -> fragment interpolant`.
//!
//! The GPU vertex function in [`SHADER_SOURCE`](crate::SHADER_SOURCE) performs the same steps.
//! This module exists so hosts and tests can produce the exact records a vertex stage
//! writes, for either interpolant variant, without a device.
//!
//! Work is split in two steps. [`VertexStage::prepare`] runs once per draw: it composes the
//! camera matrices, inverts the model's linear part for the normal matrix and resolves the
//! routing scalars. [`VertexStage::run`] then runs once per vertex against the prepared draw.
//!
//! ```rust
//! use nalgebra_glm as glm;
//! use shading_contracts::{
//!     FragmentInterpolant, FrameConstants, Material, ObjectConstants, PipelineConfig,
//!     VertexRecord, VertexStage,
//! };
//!
//! let stage = VertexStage::new(PipelineConfig::default());
//! let object = ObjectConstants::new(glm::scale(&glm::Mat4::identity(), &glm::vec3(2.0, 3.0, 1.0)));
//! let draw = stage.prepare(&object, &FrameConstants::default(), &Material::default());
//!
//! let vertex = VertexRecord::new(glm::Vec3::zeros(), glm::vec3(1.0, 0.0, 0.0), glm::Vec2::zeros());
//! let out: FragmentInterpolant = stage.run(&draw, &vertex)?;
//! assert_eq!(out.normal, glm::vec3(0.5, 0.0, 0.0));
//! # Ok::<(), shading_contracts::ContractError>(())
//! ```

use nalgebra_glm as glm;

use crate::config::{PipelineConfig, RoutingSource};
use crate::error::{ContractError, Result};
use crate::fragment::{FragmentInterpolant, FragmentInterpolantExtended, InterpolantVariant};
use crate::guard::NormalGuard;
use crate::layout::StageLayout;
use crate::material::{Material, RoutingScalars};
use crate::matrix::{normal_matrix, transform_direction};
use crate::uniform_buffer::{FrameConstants, ObjectConstants};
use crate::vertex::VertexRecord;

/// Everything the vertex stage computes for one vertex, before it is packed into an
/// interpolant layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOutputs {
    pub position_clip: glm::Vec4,
    pub position_world: glm::Vec4,
    pub normal: glm::Vec3,
    pub color: glm::Vec4,
    pub uv: glm::Vec2,
    pub tangent: glm::Vec3,
    pub bitangent: glm::Vec3,
}

/// A fragment interpolant layout the vertex stage can write.
pub trait Interpolant: StageLayout {
    const VARIANT: InterpolantVariant;

    /// Packs the computed outputs into this layout. Layouts without a slot for a value
    /// drop it.
    fn assemble(outputs: &VertexOutputs, routing: &RoutingScalars) -> Self;
}

impl Interpolant for FragmentInterpolant {
    const VARIANT: InterpolantVariant = InterpolantVariant::Minimal;

    fn assemble(outputs: &VertexOutputs, _routing: &RoutingScalars) -> Self {
        Self {
            position_clip: outputs.position_clip,
            position_world: outputs.position_world,
            normal: outputs.normal,
            _pad0: 0.0,
            uv: outputs.uv,
            _pad1: [0.0; 2],
            tangent: outputs.tangent,
            _pad2: 0.0,
            bitangent: outputs.bitangent,
            _pad3: 0.0,
        }
    }
}

impl Interpolant for FragmentInterpolantExtended {
    const VARIANT: InterpolantVariant = InterpolantVariant::Extended;

    fn assemble(outputs: &VertexOutputs, routing: &RoutingScalars) -> Self {
        Self {
            position_clip: outputs.position_clip,
            position_world: outputs.position_world,
            normal: outputs.normal,
            _pad0: 0.0,
            color: outputs.color,
            uv: outputs.uv,
            _pad1: [0.0; 2],
            tangent: outputs.tangent,
            _pad2: 0.0,
            bitangent: outputs.bitangent,
            _pad3: 0.0,
            texture_amount: routing.texture_amount,
            texture_tiling: routing.texture_tiling,
            normal_map_tiling: routing.normal_map_tiling,
            env_map_reflected_amount: routing.env_map_reflected_amount,
            env_map_refracted_amount: routing.env_map_refracted_amount,
            specular_exponent: routing.specular_exponent,
            _pad4: [0.0; 2],
        }
    }
}

/// Per-draw state computed once by [`VertexStage::prepare`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreparedDraw {
    pub model_matrix: glm::Mat4,
    /// `projection * view` of the frame.
    pub view_projection: glm::Mat4,
    /// Inverse-transpose of the model matrix's upper-left 3x3 block.
    pub normal_matrix: glm::Mat3,
    pub routing: RoutingScalars,
}

/// The vertex stage of one pipeline, bound to its [`PipelineConfig`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VertexStage {
    config: PipelineConfig,
    guard: NormalGuard,
}

impl VertexStage {
    /// Creates the stage, with a [`NormalGuard`] built from `config.guard`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            guard: NormalGuard::new(config.guard),
        }
    }

    /// Configuration the stage was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Picks the routing scalars from the configured source.
    pub fn routing(&self, object: &ObjectConstants, material: &Material) -> RoutingScalars {
        match self.config.routing_source {
            RoutingSource::Object => object.routing(),
            RoutingSource::Material => material.routing(),
        }
    }

    /// Prepares a draw without checking the model matrix. A singular model matrix yields a
    /// non-finite normal matrix.
    pub fn prepare(
        &self,
        object: &ObjectConstants,
        frame: &FrameConstants,
        material: &Material,
    ) -> PreparedDraw {
        self.prepare_with(object, frame, material, normal_matrix(&object.model_matrix))
    }

    /// Prepares a draw, passing the model matrix through the configured [`NormalGuard`].
    pub fn prepare_guarded(
        &self,
        object: &ObjectConstants,
        frame: &FrameConstants,
        material: &Material,
    ) -> Result<PreparedDraw> {
        let normal_matrix = self.guard.normal_matrix(&object.model_matrix)?;
        Ok(self.prepare_with(object, frame, material, normal_matrix))
    }

    fn prepare_with(
        &self,
        object: &ObjectConstants,
        frame: &FrameConstants,
        material: &Material,
        normal_matrix: glm::Mat3,
    ) -> PreparedDraw {
        PreparedDraw {
            model_matrix: object.model_matrix,
            view_projection: frame.projection_matrix * frame.view_matrix,
            normal_matrix,
            routing: self.routing(object, material),
        }
    }

    /// Computes the outputs for one vertex. Directions are not renormalized; the fragment
    /// stage does that after interpolation.
    pub fn outputs(&self, draw: &PreparedDraw, vertex: &VertexRecord) -> VertexOutputs {
        let p = vertex.position;
        let position_world = draw.model_matrix * glm::vec4(p.x, p.y, p.z, 1.0);

        VertexOutputs {
            position_clip: draw.view_projection * position_world,
            position_world,
            normal: transform_direction(&draw.normal_matrix, &vertex.normal),
            color: vertex.color,
            uv: vertex.uv,
            tangent: transform_direction(&draw.normal_matrix, &vertex.tangent),
            bitangent: transform_direction(&draw.normal_matrix, &vertex.bitangent),
        }
    }

    /// Runs the vertex stage for one vertex and packs the result into layout `I`.
    ///
    /// Fails with [`ContractError::VariantMismatch`] if `I` is not the layout selected in the
    /// pipeline configuration.
    pub fn run<I: Interpolant>(&self, draw: &PreparedDraw, vertex: &VertexRecord) -> Result<I> {
        if I::VARIANT != self.config.interpolant {
            return Err(ContractError::VariantMismatch {
                configured: self.config.interpolant,
                written: I::VARIANT,
            });
        }
        Ok(I::assemble(&self.outputs(draw, vertex), &draw.routing))
    }
}
