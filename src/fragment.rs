//! # Fragment Module
//!
//! The records the vertex stage writes and the fragment stage reads after interpolation.
//!
//! Two feature levels exist and each has its own named layout:
//!
//! - [`FragmentInterpolant`] (`FragmentData`): clip and world position, the transformed
//!   normal/tangent/bitangent basis and the texture coordinate.
//! - [`FragmentInterpolantExtended`] (`FragmentDataExtended`): additionally the vertex color
//!   and six routing scalars copied through so the fragment stage does not re-read the
//!   object constants.
//!
//! A pipeline picks one of them for both its vertex and fragment stage. They are distinct
//! types, not one layout with optional tail fields, so a vertex stage producing one cannot
//! be paired with a fragment stage expecting the other without the declarations disagreeing
//! (see [`layout::check_compatible`](crate::layout::check_compatible)).

use nalgebra_glm as glm;

use crate::layout::{layout_field, LayoutField, StageLayout};

/// Which interpolant layout a pipeline uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpolantVariant {
    #[default]
    Minimal,
    Extended,
}

/// Minimal fragment interpolant.
///
/// # Memory Layout
///
/// - Offset 0: clip-space position (16 bytes), the rasterizer's position input
/// - Offset 16: world-space position (16 bytes)
/// - Offset 32: normal (12 bytes + 4 padding)
/// - Offset 48: uv (8 bytes + 8 padding)
/// - Offset 64: tangent (12 bytes + 4 padding)
/// - Offset 80: bitangent (12 bytes + 4 padding)
/// - Total size: 96 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FragmentInterpolant {
    pub position_clip: glm::Vec4,
    pub position_world: glm::Vec4,
    pub normal: glm::Vec3,
    pub _pad0: f32,
    pub uv: glm::Vec2,
    pub _pad1: [f32; 2],
    pub tangent: glm::Vec3,
    pub _pad2: f32,
    pub bitangent: glm::Vec3,
    pub _pad3: f32,
}

const _: () = assert!(std::mem::size_of::<FragmentInterpolant>() == 96);

impl StageLayout for FragmentInterpolant {
    const NAME: &'static str = "FragmentData";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(FragmentInterpolant, position_clip, glm::Vec4),
        layout_field!(FragmentInterpolant, position_world, glm::Vec4),
        layout_field!(FragmentInterpolant, normal, glm::Vec3),
        layout_field!(FragmentInterpolant, uv, glm::Vec2),
        layout_field!(FragmentInterpolant, tangent, glm::Vec3),
        layout_field!(FragmentInterpolant, bitangent, glm::Vec3),
    ];
}

/// Extended fragment interpolant, carrying vertex color and routing scalars.
///
/// # Memory Layout
///
/// - Offset 0: clip-space position (16 bytes)
/// - Offset 16: world-space position (16 bytes)
/// - Offset 32: normal (12 bytes + 4 padding)
/// - Offset 48: color (16 bytes)
/// - Offset 64: uv (8 bytes + 8 padding)
/// - Offset 80: tangent (12 bytes + 4 padding)
/// - Offset 96: bitangent (12 bytes + 4 padding)
/// - Offset 112..136: six routing scalars (4 bytes each)
/// - Offset 136: padding (8 bytes)
/// - Total size: 144 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FragmentInterpolantExtended {
    pub position_clip: glm::Vec4,
    pub position_world: glm::Vec4,
    pub normal: glm::Vec3,
    pub _pad0: f32,
    pub color: glm::Vec4,
    pub uv: glm::Vec2,
    pub _pad1: [f32; 2],
    pub tangent: glm::Vec3,
    pub _pad2: f32,
    pub bitangent: glm::Vec3,
    pub _pad3: f32,
    pub texture_amount: f32,
    pub texture_tiling: f32,
    pub normal_map_tiling: f32,
    pub env_map_reflected_amount: f32,
    pub env_map_refracted_amount: f32,
    pub specular_exponent: f32,
    pub _pad4: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<FragmentInterpolantExtended>() == 144);

impl StageLayout for FragmentInterpolantExtended {
    const NAME: &'static str = "FragmentDataExtended";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(FragmentInterpolantExtended, position_clip, glm::Vec4),
        layout_field!(FragmentInterpolantExtended, position_world, glm::Vec4),
        layout_field!(FragmentInterpolantExtended, normal, glm::Vec3),
        layout_field!(FragmentInterpolantExtended, color, glm::Vec4),
        layout_field!(FragmentInterpolantExtended, uv, glm::Vec2),
        layout_field!(FragmentInterpolantExtended, tangent, glm::Vec3),
        layout_field!(FragmentInterpolantExtended, bitangent, glm::Vec3),
        layout_field!(FragmentInterpolantExtended, texture_amount, f32),
        layout_field!(FragmentInterpolantExtended, texture_tiling, f32),
        layout_field!(FragmentInterpolantExtended, normal_map_tiling, f32),
        layout_field!(FragmentInterpolantExtended, env_map_reflected_amount, f32),
        layout_field!(FragmentInterpolantExtended, env_map_refracted_amount, f32),
        layout_field!(FragmentInterpolantExtended, specular_exponent, f32),
    ];
}
