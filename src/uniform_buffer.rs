//! # Uniform Buffer
//!
//! This module defines the constants records the host application writes into uniform
//! buffers: [`ObjectConstants`], one per drawable object per frame, and [`FrameConstants`],
//! one per frame and shared read-only by every draw in it.
//!
//! ## Overview
//!
//! The vertex stage combines both records to move a vertex from object space to clip space:
//!
//! - **Model Transformation** (`ObjectConstants::model_matrix`): object space to world space.
//! - **View Transformation** (`FrameConstants::view_matrix`): world space to camera space.
//! - **Projection Transformation** (`FrameConstants::projection_matrix`): camera space to
//!   clip space.
//!
//! `FrameConstants` also carries the combined view-projection matrix, the directional light
//! direction, the light-space projection used for shadowing and the frame's
//! [`SpotLight`].
//!
//! ### Memory Layout and Traits
//!
//! - `#[repr(C)]`: fields are laid out in declaration order with no reordering.
//! - `bytemuck::Pod` and `bytemuck::Zeroable`: the records can be reinterpreted as raw bytes
//!   for upload. Every padding byte is an explicit field, so no uninitialized bytes exist.
//!
//! ## Notes
//!
//! 1. A record must not be rewritten while any in-flight draw may still read it. Double
//!    buffer per-frame and per-object constants on the host side.
//! 2. Build `FrameConstants` with [`FrameConstants::new`] so `view_projection_matrix` stays
//!    equal to `projection * view`.

use nalgebra_glm as glm;

use crate::layout::{layout_field, LayoutField, StageLayout};
use crate::light::SpotLight;
use crate::material::RoutingScalars;

/// Per-object constants: model transform and the object-level routing scalars.
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64..92: seven routing scalars (4 bytes each)
/// - Offset 92: padding (4 bytes)
/// - Total size: 96 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectConstants {
    /// Object space to world space.
    pub model_matrix: glm::Mat4,
    /// How much of the texture color to blend over the vertex color.
    pub texture_amount: f32,
    pub texture_tiling: f32,
    pub normal_map_tiling: f32,
    pub env_map_reflected_amount: f32,
    pub env_map_refracted_amount: f32,
    pub specular_exponent: f32,
    pub displacement_factor: f32,
    pub _pad0: f32,
}

const _: () = assert!(std::mem::size_of::<ObjectConstants>() == 96);

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::new(glm::Mat4::identity())
    }
}

impl ObjectConstants {
    /// Creates object constants with default routing scalars.
    pub fn new(model_matrix: glm::Mat4) -> Self {
        Self::with_routing(model_matrix, RoutingScalars::default())
    }

    /// Creates object constants whose routing scalars override the material's.
    pub fn with_routing(model_matrix: glm::Mat4, routing: RoutingScalars) -> Self {
        Self {
            model_matrix,
            texture_amount: routing.texture_amount,
            texture_tiling: routing.texture_tiling,
            normal_map_tiling: routing.normal_map_tiling,
            env_map_reflected_amount: routing.env_map_reflected_amount,
            env_map_refracted_amount: routing.env_map_refracted_amount,
            specular_exponent: routing.specular_exponent,
            displacement_factor: routing.displacement_factor,
            _pad0: 0.0,
        }
    }

    /// Routing scalars carried by this object.
    pub fn routing(&self) -> RoutingScalars {
        RoutingScalars {
            texture_amount: self.texture_amount,
            texture_tiling: self.texture_tiling,
            normal_map_tiling: self.normal_map_tiling,
            env_map_reflected_amount: self.env_map_reflected_amount,
            env_map_refracted_amount: self.env_map_refracted_amount,
            specular_exponent: self.specular_exponent,
            displacement_factor: self.displacement_factor,
        }
    }
}

impl StageLayout for ObjectConstants {
    const NAME: &'static str = "ObjectConstants";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(ObjectConstants, model_matrix, glm::Mat4),
        layout_field!(ObjectConstants, texture_amount, f32),
        layout_field!(ObjectConstants, texture_tiling, f32),
        layout_field!(ObjectConstants, normal_map_tiling, f32),
        layout_field!(ObjectConstants, env_map_reflected_amount, f32),
        layout_field!(ObjectConstants, env_map_refracted_amount, f32),
        layout_field!(ObjectConstants, specular_exponent, f32),
        layout_field!(ObjectConstants, displacement_factor, f32),
    ];
}

/// Per-frame globals shared by every draw of the frame.
///
/// # Memory Layout
///
/// - Offset 0: view matrix (64 bytes)
/// - Offset 64: projection matrix (64 bytes)
/// - Offset 128: view-projection matrix (64 bytes)
/// - Offset 192: directional light direction (12 bytes + 4 padding)
/// - Offset 208: light projection matrix (64 bytes)
/// - Offset 272: spot light (64 bytes)
/// - Total size: 336 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameConstants {
    /// World space to camera space.
    pub view_matrix: glm::Mat4,
    /// Camera space to clip space.
    pub projection_matrix: glm::Mat4,
    /// `projection_matrix * view_matrix`. Kept even by shaders that do not read it, the
    /// fields after it depend on its slot.
    pub view_projection_matrix: glm::Mat4,
    pub directional_light_dir: glm::Vec3,
    pub _pad0: f32,
    /// World space to the shadow-casting light's clip space.
    pub light_projection_matrix: glm::Mat4,
    pub spot_light: SpotLight,
}

const _: () = assert!(std::mem::size_of::<FrameConstants>() == 336);

impl Default for FrameConstants {
    fn default() -> Self {
        Self::new(glm::Mat4::identity(), glm::Mat4::identity())
    }
}

impl FrameConstants {
    /// Creates frame constants for a camera, deriving the view-projection matrix.
    pub fn new(view_matrix: glm::Mat4, projection_matrix: glm::Mat4) -> Self {
        Self {
            view_matrix,
            projection_matrix,
            view_projection_matrix: projection_matrix * view_matrix,
            directional_light_dir: glm::vec3(0.0, -1.0, 0.0),
            _pad0: 0.0,
            light_projection_matrix: glm::Mat4::identity(),
            spot_light: SpotLight::default(),
        }
    }

    /// Sets the direction the directional light travels in, in world space.
    pub fn with_directional_light(mut self, direction: glm::Vec3) -> Self {
        self.directional_light_dir = direction;
        self
    }

    /// Sets the light-space projection used for shadow lookups.
    pub fn with_light_projection(mut self, light_projection_matrix: glm::Mat4) -> Self {
        self.light_projection_matrix = light_projection_matrix;
        self
    }

    /// Sets the spot light uploaded with the frame.
    pub fn with_spot_light(mut self, spot_light: SpotLight) -> Self {
        self.spot_light = spot_light;
        self
    }

    /// Replaces the camera matrices and re-derives the view-projection matrix.
    pub fn set_camera(&mut self, view_matrix: glm::Mat4, projection_matrix: glm::Mat4) {
        self.view_matrix = view_matrix;
        self.projection_matrix = projection_matrix;
        self.view_projection_matrix = projection_matrix * view_matrix;
    }

    /// Checks `view_projection_matrix == projection_matrix * view_matrix` within `epsilon`
    /// per element.
    pub fn has_consistent_view_projection(&self, epsilon: f32) -> bool {
        let expected = self.projection_matrix * self.view_matrix;
        expected
            .iter()
            .zip(self.view_projection_matrix.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl StageLayout for FrameConstants {
    const NAME: &'static str = "FrameConstants";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(FrameConstants, view_matrix, glm::Mat4),
        layout_field!(FrameConstants, projection_matrix, glm::Mat4),
        layout_field!(FrameConstants, view_projection_matrix, glm::Mat4),
        layout_field!(FrameConstants, directional_light_dir, glm::Vec3),
        layout_field!(FrameConstants, light_projection_matrix, glm::Mat4),
        layout_field!(FrameConstants, spot_light, SpotLight),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, read_field, DeclaredLayout};

    #[test]
    fn test_object_constants_layout() {
        let offsets: Vec<_> = ObjectConstants::FIELDS.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 64, 68, 72, 76, 80, 84, 88]);
        assert_eq!(ObjectConstants::SIZE, 96);
        assert_eq!(layout::validate(&DeclaredLayout::of::<ObjectConstants>()), Ok(()));
    }

    #[test]
    fn test_object_constants_bytes() {
        let model = glm::translate(&glm::Mat4::identity(), &glm::vec3(1.0, 2.0, 3.0));
        let object = ObjectConstants::with_routing(
            model,
            RoutingScalars {
                texture_amount: 1.5,
                texture_tiling: 2.5,
                normal_map_tiling: 3.5,
                env_map_reflected_amount: 4.5,
                env_map_refracted_amount: 5.5,
                specular_exponent: 6.5,
                displacement_factor: 7.5,
            },
        );
        let bytes = object.as_bytes();

        // column-major: translation is the fourth column
        let matrix = read_field::<[f32; 16]>(bytes, &ObjectConstants::FIELDS[0]).unwrap();
        assert_eq!(&matrix[12..], &[1.0, 2.0, 3.0, 1.0]);

        let scalars: Vec<_> = ObjectConstants::FIELDS[1..]
            .iter()
            .map(|field| read_field::<f32>(bytes, field).unwrap())
            .collect();
        assert_eq!(scalars, [1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5]);
    }

    #[test]
    fn test_frame_constants_layout() {
        let offsets: Vec<_> = FrameConstants::FIELDS.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 64, 128, 192, 208, 272]);
        assert_eq!(FrameConstants::SIZE, 336);
        assert_eq!(layout::validate(&DeclaredLayout::of::<FrameConstants>()), Ok(()));
    }

    #[test]
    fn test_frame_constants_bytes() {
        let frame = FrameConstants::new(glm::Mat4::identity() * 2.0, glm::Mat4::identity() * 3.0)
            .with_directional_light(glm::vec3(0.25, -0.5, 0.75))
            .with_light_projection(glm::Mat4::identity() * 4.0)
            .with_spot_light(
                SpotLight::new(glm::vec3(9.0, 8.0, 7.0), glm::vec3(0.0, -1.0, 0.0))
                    .with_color(glm::vec3(0.5, 0.5, 0.5), 42.0),
            );
        let bytes = frame.as_bytes();
        let field = |name| FrameConstants::field(name).unwrap();

        let diagonal = |name| {
            let m = read_field::<[f32; 16]>(bytes, field(name)).unwrap();
            [m[0], m[5], m[10], m[15]]
        };
        assert_eq!(diagonal("view_matrix"), [2.0; 4]);
        assert_eq!(diagonal("projection_matrix"), [3.0; 4]);
        assert_eq!(diagonal("view_projection_matrix"), [6.0; 4]);
        assert_eq!(diagonal("light_projection_matrix"), [4.0; 4]);
        assert_eq!(
            read_field::<[f32; 3]>(bytes, field("directional_light_dir")),
            Some([0.25, -0.5, 0.75])
        );

        let spot = read_field::<SpotLight>(bytes, field("spot_light")).unwrap();
        assert_eq!(spot.position, glm::vec3(9.0, 8.0, 7.0));
        assert_eq!(spot.intensity, 42.0);
    }

    #[test]
    fn test_view_projection_invariant() {
        let view = glm::look_at_lh(
            &glm::vec3(0.0, 2.0, 5.0),
            &glm::vec3(0.0, 0.0, 0.0),
            &glm::Vec3::y(),
        );
        let projection = glm::perspective_lh_zo(16.0 / 9.0, 60_f32.to_radians(), 0.1, 100.0);

        let mut frame = FrameConstants::new(view, projection);
        assert_eq!(frame.view_projection_matrix, projection * view);
        assert!(frame.has_consistent_view_projection(0.0));

        frame.view_matrix = glm::Mat4::identity();
        assert!(!frame.has_consistent_view_projection(1e-6));

        frame.set_camera(view, projection);
        assert!(frame.has_consistent_view_projection(0.0));
    }
}
