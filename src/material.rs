//! # Material Module
//!
//! Surface appearance parameters read by the fragment stage, and the shading-routing
//! scalars shared with [`ObjectConstants`](crate::ObjectConstants).
//!
//! The routing scalars (texture blend amount, tilings, environment-map amounts, specular
//! exponent, displacement factor) exist on both the material and the object constants.
//! Depending on the pipeline, either side supplies them; which one wins is decided by
//! [`RoutingSource`](crate::RoutingSource) in the pipeline configuration, never by merging.
//!
//! # Memory Layout
//!
//! | field                      | offset |
//! |----------------------------|--------|
//! | `color`                    | 0      |
//! | `emissive_color`           | 16     |
//! | `metalness`                | 32     |
//! | `roughness`                | 36     |
//! | `ambient_occlusion`        | 40     |
//! | `opacity`                  | 44     |
//! | `texture_amount`           | 48     |
//! | `texture_tiling`           | 52     |
//! | `normal_map_tiling`        | 56     |
//! | `env_map_reflected_amount` | 60     |
//! | `env_map_refracted_amount` | 64     |
//! | `specular_exponent`        | 68     |
//! | `displacement_factor`      | 72     |
//!
//! Total size: 80 bytes.

use nalgebra_glm as glm;

use crate::layout::{layout_field, LayoutField, StageLayout};

/// The shading-routing scalars as a plain value, independent of where they came from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoutingScalars {
    /// How much of the texture color to blend over the vertex color.
    pub texture_amount: f32,
    pub texture_tiling: f32,
    pub normal_map_tiling: f32,
    pub env_map_reflected_amount: f32,
    pub env_map_refracted_amount: f32,
    pub specular_exponent: f32,
    /// Displacement applied to tessellated geometry.
    pub displacement_factor: f32,
}

impl Default for RoutingScalars {
    fn default() -> Self {
        Self {
            texture_amount: 0.0,
            texture_tiling: 1.0,
            normal_map_tiling: 1.0,
            env_map_reflected_amount: 0.0,
            env_map_refracted_amount: 0.0,
            specular_exponent: 150.0,
            displacement_factor: 0.15,
        }
    }
}

/// Surface appearance parameters for one draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Material {
    /// Base color, alpha in `w`.
    pub color: glm::Vec4,
    pub emissive_color: glm::Vec3,
    pub _pad0: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub ambient_occlusion: f32,
    pub opacity: f32,

    pub texture_amount: f32,
    pub texture_tiling: f32,
    pub normal_map_tiling: f32,
    pub env_map_reflected_amount: f32,
    pub env_map_refracted_amount: f32,
    pub specular_exponent: f32,
    pub displacement_factor: f32,
    pub _pad1: f32,
}

const _: () = assert!(std::mem::size_of::<Material>() == 80);

impl Default for Material {
    fn default() -> Self {
        Self {
            color: glm::vec4(1.0, 1.0, 1.0, 1.0),
            emissive_color: glm::Vec3::zeros(),
            _pad0: 0.0,
            metalness: 0.0,
            roughness: 0.0,
            ambient_occlusion: 1.0,
            opacity: 1.0,
            texture_amount: 0.0,
            texture_tiling: 1.0,
            normal_map_tiling: 1.0,
            env_map_reflected_amount: 0.0,
            env_map_refracted_amount: 0.0,
            specular_exponent: 150.0,
            displacement_factor: 0.15,
            _pad1: 0.0,
        }
    }
}

impl Material {
    /// Routing scalars carried by this material.
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

    /// Replaces all seven routing scalars.
    pub fn with_routing(mut self, routing: RoutingScalars) -> Self {
        self.texture_amount = routing.texture_amount;
        self.texture_tiling = routing.texture_tiling;
        self.normal_map_tiling = routing.normal_map_tiling;
        self.env_map_reflected_amount = routing.env_map_reflected_amount;
        self.env_map_refracted_amount = routing.env_map_refracted_amount;
        self.specular_exponent = routing.specular_exponent;
        self.displacement_factor = routing.displacement_factor;
        self
    }
}

impl StageLayout for Material {
    const NAME: &'static str = "Material";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(Material, color, glm::Vec4),
        layout_field!(Material, emissive_color, glm::Vec3),
        layout_field!(Material, metalness, f32),
        layout_field!(Material, roughness, f32),
        layout_field!(Material, ambient_occlusion, f32),
        layout_field!(Material, opacity, f32),
        layout_field!(Material, texture_amount, f32),
        layout_field!(Material, texture_tiling, f32),
        layout_field!(Material, normal_map_tiling, f32),
        layout_field!(Material, env_map_reflected_amount, f32),
        layout_field!(Material, env_map_refracted_amount, f32),
        layout_field!(Material, specular_exponent, f32),
        layout_field!(Material, displacement_factor, f32),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, read_field, DeclaredLayout};

    #[test]
    fn test_material_layout() {
        let offsets: Vec<_> = Material::FIELDS.iter().map(|f| f.offset).collect();
        assert_eq!(
            offsets,
            [0, 16, 32, 36, 40, 44, 48, 52, 56, 60, 64, 68, 72]
        );
        assert_eq!(Material::SIZE, 80);
        assert_eq!(layout::validate(&DeclaredLayout::of::<Material>()), Ok(()));
    }

    #[test]
    fn test_material_bytes() {
        let mut material = Material {
            color: glm::vec4(1.0, 2.0, 3.0, 4.0),
            emissive_color: glm::vec3(5.0, 6.0, 7.0),
            metalness: 8.0,
            roughness: 9.0,
            ambient_occlusion: 10.0,
            opacity: 11.0,
            ..Default::default()
        };
        material = material.with_routing(RoutingScalars {
            texture_amount: 12.0,
            texture_tiling: 13.0,
            normal_map_tiling: 14.0,
            env_map_reflected_amount: 15.0,
            env_map_refracted_amount: 16.0,
            specular_exponent: 17.0,
            displacement_factor: 18.0,
        });
        let bytes = material.as_bytes();

        assert_eq!(
            read_field::<[f32; 4]>(bytes, Material::field("color").unwrap()),
            Some([1.0, 2.0, 3.0, 4.0])
        );
        assert_eq!(
            read_field::<[f32; 3]>(bytes, Material::field("emissive_color").unwrap()),
            Some([5.0, 6.0, 7.0])
        );
        for (expected, field) in (8..=18).zip(&Material::FIELDS[2..]) {
            assert_eq!(read_field::<f32>(bytes, field), Some(expected as f32), "{}", field.name);
        }
    }

    #[test]
    fn test_material_defaults_match_routing_defaults() {
        assert_eq!(Material::default().routing(), RoutingScalars::default());
    }
}
