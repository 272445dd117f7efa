//! # Shading Contracts Library
//!
//! This library holds the contract shared by the stages of a real-time shading pipeline: the
//! inverse transform used to keep surface normals correct under non-uniform scale and shear,
//! and the fixed memory layouts of every record passed from one stage to the next.
//!
//! Stages are compiled independently and exchange raw buffers. Nothing describes a buffer's
//! shape at run time, so a vertex stage and a fragment stage agree on a record only because
//! both were built from the same declaration. This crate is that declaration on the host side,
//! and [`SHADER_SOURCE`] is the same declaration on the GPU side.
//!
//! ## Modules
//!
//! - [`matrix`]: general 3x3 inverse by cofactors, and the normal matrix built from it.
//! - [`layout`]: field tables for every record and the producer/consumer pairing check.
//! - `vertex`: [`VertexRecord`], the per-vertex input and its wgpu attribute layout.
//! - `uniform_buffer`: [`ObjectConstants`] and [`FrameConstants`].
//! - `material`: [`Material`] and the [`RoutingScalars`] it shares with the object constants.
//! - `light`: [`SpotLight`], embedded in the frame constants.
//! - `fragment`: the two interpolant layouts, [`FragmentInterpolant`] and
//!   [`FragmentInterpolantExtended`].
//! - `guard`: [`NormalGuard`], an optional reject-or-regularize check in front of the inverse.
//! - `vertex_stage`: [`VertexStage`], the vertex stage data flow evaluated on the CPU.
//! - `config`: [`PipelineConfig`] and its parts.
//!
//! ## Data Flow
//!
//! ```text
//! VertexRecord + ObjectConstants + FrameConstants --(vertex stage)--> FragmentInterpolant[Extended]
//! FragmentInterpolant[Extended] + Material + SpotLight --(fragment stage)--> color
//! ```
//!
//! The normal matrix is `transpose(mat_inverse(upper_left_3x3(model)))`. For pure rotations
//! the upper-left block can be used directly; any non-uniform scale needs the inverse.
//!
//! ## Example
//!
//! ```rust
//! use nalgebra_glm as glm;
//! use shading_contracts::{matrix, ObjectConstants, StageLayout};
//!
//! let object = ObjectConstants::new(glm::scale(&glm::Mat4::identity(), &glm::vec3(2.0, 3.0, 1.0)));
//! let normal = matrix::normal_matrix(&object.model_matrix) * glm::vec3(1.0, 0.0, 0.0);
//! assert_eq!(normal, glm::vec3(0.5, 0.0, 0.0));
//!
//! // ready for upload
//! assert_eq!(object.as_bytes().len(), ObjectConstants::SIZE);
//! ```
//!
//! ## Dependencies
//!
//! - `nalgebra-glm`: matrix and vector types, with `bytemuck` conversions.
//! - `bytemuck`: plain-old-data derives for the records.
//! - `wgpu`: vertex formats and buffer layouts.
//! - `log`: warnings from the guard and debug output from layout pairing.
//! - `thiserror`: the [`ContractError`] type.
//!
//! ## Notes
//!
//! - Records are never mutated by this crate after they are built. The host owns the GPU
//!   memory and must not overwrite a record while a stage may still read it.
//! - Changing a record's fields is a breaking change for every stage that reads or writes it.
//!   Add a new named layout instead.

pub mod layout;
pub mod matrix;

mod config;
mod error;
mod fragment;
mod guard;
mod light;
mod material;
mod uniform_buffer;
mod vertex;
mod vertex_stage;

pub use crate::config::{GuardConfig, GuardPolicy, PipelineConfig, RoutingSource};
pub use crate::error::{ContractError, Result};
pub use crate::fragment::{FragmentInterpolant, FragmentInterpolantExtended, InterpolantVariant};
pub use crate::guard::NormalGuard;
pub use crate::layout::{DeclaredLayout, LayoutField, StageLayout};
pub use crate::light::SpotLight;
pub use crate::material::{Material, RoutingScalars};
pub use crate::matrix::{mat_inverse, normal_matrix};
pub use crate::uniform_buffer::{FrameConstants, ObjectConstants};
pub use crate::vertex::{VertexRecord, JOINT_WEIGHT_EPSILON};
pub use crate::vertex_stage::{Interpolant, PreparedDraw, VertexOutputs, VertexStage};

/// The source code for the shader written in WGSL (WebGPU Shading Language).
///
/// It declares every record of this crate with the same field order and the same explicit
/// padding, so a buffer filled from the host structs is read correctly by the shader.
///
/// ### Bindings
///
/// - `@group(0) @binding(0)`: `FrameConstants`
/// - `@group(1) @binding(0)`: `ObjectConstants`
/// - `@group(1) @binding(1)`: `Material`
///
/// ### Entry Points
///
/// - `vertex_main` / `fragment_main`: the minimal `FragmentData` interpolant.
/// - `vertex_main_extended` / `fragment_main_extended`: the `FragmentDataExtended`
///   interpolant.
///
/// Pair the vertex and fragment entry points of the same variant. The vertex input is
/// described by [`VertexRecord::description`].
pub const SHADER_SOURCE: &str = include_str!("shader_source.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> naga::Module {
        naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)))
    }

    /// Total span and data members of a WGSL struct as laid out by the shader compiler,
    /// padding members skipped.
    fn wgsl_layout(module: &naga::Module, name: &str) -> (usize, Vec<LayoutField>) {
        let (_, ty) = module
            .types
            .iter()
            .find(|(_, ty)| ty.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("`{name}` not declared in shader"));

        let naga::TypeInner::Struct { members, span } = &ty.inner else {
            panic!("`{name}` is not a struct");
        };
        let fields = members
            .iter()
            .filter_map(|member| {
                let name = member.name.as_deref()?;
                if name.starts_with('_') {
                    return None;
                }
                let size = module.types[member.ty].inner.size(module.to_ctx());
                let name = Box::leak(name.to_owned().into_boxed_str());
                Some(LayoutField::new(name, member.offset as usize, size as usize))
            })
            .collect();
        (*span as usize, fields)
    }

    fn field_names(fields: &[LayoutField]) -> Vec<&str> {
        fields.iter().map(|f| f.name).collect()
    }

    fn assert_same_order<L: StageLayout>(module: &naga::Module) {
        let (_, fields) = wgsl_layout(module, L::NAME);
        assert_eq!(field_names(&fields), field_names(L::FIELDS), "{}", L::NAME);
    }

    /// Buffer-backed records must also agree byte for byte.
    fn assert_same_memory_layout<L: StageLayout>(module: &naga::Module) {
        let (span, fields) = wgsl_layout(module, L::NAME);
        let shader = DeclaredLayout::new(L::NAME, span, &fields);
        assert_eq!(layout::check_compatible(&DeclaredLayout::of::<L>(), &shader), Ok(()));
    }

    #[test]
    fn shader_declares_every_record_in_field_order() {
        let module = parse(SHADER_SOURCE);
        assert_same_order::<VertexRecord>(&module);
        assert_same_order::<FragmentInterpolant>(&module);
        assert_same_order::<FragmentInterpolantExtended>(&module);
    }

    #[test]
    fn shader_uniforms_match_host_offsets() {
        let module = parse(SHADER_SOURCE);
        assert_same_memory_layout::<ObjectConstants>(&module);
        assert_same_memory_layout::<FrameConstants>(&module);
        assert_same_memory_layout::<Material>(&module);
        assert_same_memory_layout::<SpotLight>(&module);
    }

    #[test]
    fn dropped_shader_pad_shifts_uniform_offsets() {
        let emissive = "    emissive_color: vec3<f32>,\n    _pad0: f32,\n";
        assert!(SHADER_SOURCE.contains(emissive));
        let source = SHADER_SOURCE.replace(emissive, "    emissive_color: vec3<f32>,\n");

        let module = parse(&source);
        let (span, fields) = wgsl_layout(&module, Material::NAME);
        let metalness = fields.iter().find(|f| f.name == "metalness").map(|f| f.offset);
        assert_eq!(metalness, Some(28));

        let result = layout::check_compatible(
            &DeclaredLayout::of::<Material>(),
            &DeclaredLayout::new(Material::NAME, span, &fields),
        );
        assert!(matches!(
            result,
            Err(ContractError::FieldMismatch { index: 2, .. } | ContractError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn shader_declares_both_variant_pipelines() {
        let module = parse(SHADER_SOURCE);
        let entry_points: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        for entry in [
            "vertex_main",
            "fragment_main",
            "vertex_main_extended",
            "fragment_main_extended",
        ] {
            assert!(entry_points.contains(&entry), "missing `{entry}`");
        }
        assert!(module
            .functions
            .iter()
            .any(|(_, f)| f.name.as_deref() == Some("mat_inverse")));
    }
}
