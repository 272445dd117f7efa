//! # Light Module
//!
//! `SpotLight` is the light descriptor embedded by value in
//! [`FrameConstants`](crate::FrameConstants). It has no lifecycle of its own; the scene
//! lighting subsystem fills it in once per frame together with the rest of the frame
//! constants, and the fragment stage reads it while shading.
//!
//! # Memory Layout
//!
//! - Offset 0: position (12 bytes + 4 padding)
//! - Offset 16: direction (12 bytes + 4 padding)
//! - Offset 32: color (12 bytes + 4 padding)
//! - Offset 48: intensity (4 bytes + 12 padding)
//! - Total size: 64 bytes

use nalgebra_glm as glm;

use crate::layout::{layout_field, LayoutField, StageLayout};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLight {
    /// World-space position of the light.
    pub position: glm::Vec3,
    pub _pad0: f32,
    /// World-space direction the cone points at.
    pub direction: glm::Vec3,
    pub _pad1: f32,
    /// Linear RGB color.
    pub color: glm::Vec3,
    pub _pad2: f32,
    pub intensity: f32,
    pub _pad3: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<SpotLight>() == 64);

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(glm::Vec3::zeros(), glm::vec3(0.0, 0.0, -1.0))
    }
}

impl SpotLight {
    /// Creates a white light of intensity `10.0` at `position`, pointing along `direction`.
    pub fn new(position: glm::Vec3, direction: glm::Vec3) -> Self {
        Self {
            position,
            _pad0: 0.0,
            direction,
            _pad1: 0.0,
            color: glm::vec3(1.0, 1.0, 1.0),
            _pad2: 0.0,
            intensity: 10.0,
            _pad3: [0.0; 3],
        }
    }

    /// Sets the light color and its intensity multiplier.
    pub fn with_color(mut self, color: glm::Vec3, intensity: f32) -> Self {
        self.color = color;
        self.intensity = intensity;
        self
    }
}

impl StageLayout for SpotLight {
    const NAME: &'static str = "SpotLight";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(SpotLight, position, glm::Vec3),
        layout_field!(SpotLight, direction, glm::Vec3),
        layout_field!(SpotLight, color, glm::Vec3),
        layout_field!(SpotLight, intensity, f32),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::read_field;

    #[test]
    fn test_spot_light_layout() {
        let offsets: Vec<_> = SpotLight::FIELDS.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 16, 32, 48]);
        assert_eq!(SpotLight::SIZE, 64);
    }

    #[test]
    fn test_spot_light_bytes() {
        let light = SpotLight::new(glm::vec3(1.0, 2.0, 3.0), glm::vec3(4.0, 5.0, 6.0))
            .with_color(glm::vec3(7.0, 8.0, 9.0), 10.5);
        let bytes = light.as_bytes();

        let field = |name| SpotLight::field(name).unwrap();
        assert_eq!(read_field::<[f32; 3]>(bytes, field("position")), Some([1.0, 2.0, 3.0]));
        assert_eq!(read_field::<[f32; 3]>(bytes, field("direction")), Some([4.0, 5.0, 6.0]));
        assert_eq!(read_field::<[f32; 3]>(bytes, field("color")), Some([7.0, 8.0, 9.0]));
        assert_eq!(read_field::<f32>(bytes, field("intensity")), Some(10.5));
    }

    #[test]
    fn test_spot_light_default() {
        let light = SpotLight::default();
        assert_eq!(light.color, glm::vec3(1.0, 1.0, 1.0));
        assert_eq!(light.intensity, 10.0);
    }
}
