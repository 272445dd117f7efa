//! # Vertex Module
//!
//! This module provides the `VertexRecord` struct, the per-vertex input of the vertex stage.
//! A record carries the position, the normal/tangent/bitangent basis, a color, a texture
//! coordinate and up to four skinning joints with their weights.
//!
//! Records are authored offline by the asset pipeline and stay immutable for the lifetime of
//! a draw call. The GPU reads them through the attribute layout returned by
//! [`VertexRecord::vertex_attributes`] and [`VertexRecord::description`], so the attribute
//! offsets are taken from the struct itself and cannot drift from it.
//!
//! # Memory Layout
//!
//! Three-component vectors sit in 16-byte slots followed by an explicit padding field, the
//! same slot a `float3` occupies in a GPU-side struct.
//!
//! | field           | type      | offset |
//! |-----------------|-----------|--------|
//! | `position`      | `f32 x 3` | 0      |
//! | `normal`        | `f32 x 3` | 16     |
//! | `color`         | `f32 x 4` | 32     |
//! | `uv`            | `f32 x 2` | 48     |
//! | `tangent`       | `f32 x 3` | 64     |
//! | `bitangent`     | `f32 x 3` | 80     |
//! | `joint_indices` | `u16 x 4` | 96     |
//! | `joint_weights` | `f32 x 4` | 112    |
//!
//! Total size: 128 bytes.
//!
//! ## Usage
//!
//! ```rust
//! use nalgebra_glm as glm;
//! use shading_contracts::VertexRecord;
//!
//! let vertex = VertexRecord::new(
//!     glm::vec3(0.0, 1.0, 0.0),
//!     glm::vec3(0.0, 0.0, 1.0),
//!     glm::vec2(0.5, 0.0),
//! );
//! let attributes = VertexRecord::vertex_attributes();
//! let layout = VertexRecord::description(&attributes);
//! assert_eq!(layout.array_stride, 128);
//! # let _ = vertex;
//! ```

use nalgebra_glm as glm;

use crate::layout::{layout_field, LayoutField, StageLayout};

/// Tolerance used when checking that joint weights sum to one.
pub const JOINT_WEIGHT_EPSILON: f32 = 1e-4;

/// Represents a single vertex as read by the vertex stage.
///
/// The normal, tangent and bitangent are expected, but not required, to be mutually
/// orthonormal in object space. When skinning is used, `joint_weights` must sum to `1.0`;
/// see [`VertexRecord::has_normalized_weights`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexRecord {
    /// Object-space position.
    pub position: glm::Vec3,
    pub _pad0: f32,

    /// Object-space normal.
    pub normal: glm::Vec3,
    pub _pad1: f32,

    /// RGBA vertex color, each channel normalized to `0.0..=1.0`.
    pub color: glm::Vec4,

    /// Texture coordinate.
    pub uv: glm::Vec2,
    pub _pad2: [f32; 2],

    /// Object-space tangent, aligned with increasing `u`.
    pub tangent: glm::Vec3,
    pub _pad3: f32,

    /// Object-space bitangent, aligned with increasing `v`.
    pub bitangent: glm::Vec3,
    pub _pad4: f32,

    /// Indices into the skeleton's joint palette.
    pub joint_indices: glm::U16Vec4,
    pub _pad5: [u32; 2],

    /// Influence of each joint in `joint_indices`.
    pub joint_weights: glm::Vec4,
}

const _: () = assert!(std::mem::size_of::<VertexRecord>() == 128);

impl Default for VertexRecord {
    fn default() -> Self {
        Self {
            position: glm::Vec3::zeros(),
            _pad0: 0.0,
            normal: glm::vec3(0.0, 0.0, 1.0),
            _pad1: 0.0,
            color: glm::vec4(1.0, 1.0, 1.0, 1.0),
            uv: glm::Vec2::zeros(),
            _pad2: [0.0; 2],
            tangent: glm::vec3(1.0, 0.0, 0.0),
            _pad3: 0.0,
            bitangent: glm::vec3(0.0, 1.0, 0.0),
            _pad4: 0.0,
            joint_indices: glm::U16Vec4::zeros(),
            _pad5: [0; 2],
            joint_weights: glm::vec4(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl VertexRecord {
    /// Creates an unskinned white vertex with the default tangent frame.
    pub fn new(position: glm::Vec3, normal: glm::Vec3, uv: glm::Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            ..Default::default()
        }
    }

    /// Sets the per-vertex color, multiplied into the material color by the extended variant.
    pub fn with_color(mut self, color: glm::Vec4) -> Self {
        self.color = color;
        self
    }

    /// Sets the tangent and bitangent that complete the shading basis with the normal.
    pub fn with_tangent_frame(mut self, tangent: glm::Vec3, bitangent: glm::Vec3) -> Self {
        self.tangent = tangent;
        self.bitangent = bitangent;
        self
    }

    /// Sets up to four skinning influences. Weights are stored as given; see
    /// [`VertexRecord::normalize_joint_weights`].
    pub fn with_joints(mut self, indices: glm::U16Vec4, weights: glm::Vec4) -> Self {
        self.joint_indices = indices;
        self.joint_weights = weights;
        self
    }

    /// Returns `true` if the joint weights sum to `1.0` within [`JOINT_WEIGHT_EPSILON`].
    pub fn has_normalized_weights(&self) -> bool {
        (self.joint_weights.sum() - 1.0).abs() <= JOINT_WEIGHT_EPSILON
    }

    /// Rescales the joint weights so they sum to `1.0`.
    ///
    /// All-zero weights are left untouched; a vertex without influences is not skinned.
    pub fn normalize_joint_weights(&mut self) {
        let sum = self.joint_weights.sum();
        if sum > 0.0 {
            self.joint_weights /= sum;
        }
    }

    /// Generates the vertex attributes layout for the `VertexRecord` struct.
    ///
    /// Shader locations follow field order, `0` for `position` through `7` for
    /// `joint_weights`. Offsets are read from the struct, padding fields are skipped.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        [
            (wgpu::VertexFormat::Float32x3, std::mem::offset_of!(Self, position)),
            (wgpu::VertexFormat::Float32x3, std::mem::offset_of!(Self, normal)),
            (wgpu::VertexFormat::Float32x4, std::mem::offset_of!(Self, color)),
            (wgpu::VertexFormat::Float32x2, std::mem::offset_of!(Self, uv)),
            (wgpu::VertexFormat::Float32x3, std::mem::offset_of!(Self, tangent)),
            (wgpu::VertexFormat::Float32x3, std::mem::offset_of!(Self, bitangent)),
            (wgpu::VertexFormat::Uint16x4, std::mem::offset_of!(Self, joint_indices)),
            (wgpu::VertexFormat::Float32x4, std::mem::offset_of!(Self, joint_weights)),
        ]
        .into_iter()
        .enumerate()
        .map(|(location, (format, offset))| wgpu::VertexAttribute {
            format,
            offset: offset as wgpu::BufferAddress,
            shader_location: location as u32,
        })
        .collect()
    }

    /// Returns the vertex buffer layout for the `VertexRecord` struct.
    ///
    /// `array_stride` is the full record size including padding, and vertices are stepped
    /// per vertex.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexRecord>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

impl StageLayout for VertexRecord {
    const NAME: &'static str = "VertexData";
    const FIELDS: &'static [LayoutField] = &[
        layout_field!(VertexRecord, position, glm::Vec3),
        layout_field!(VertexRecord, normal, glm::Vec3),
        layout_field!(VertexRecord, color, glm::Vec4),
        layout_field!(VertexRecord, uv, glm::Vec2),
        layout_field!(VertexRecord, tangent, glm::Vec3),
        layout_field!(VertexRecord, bitangent, glm::Vec3),
        layout_field!(VertexRecord, joint_indices, glm::U16Vec4),
        layout_field!(VertexRecord, joint_weights, glm::Vec4),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, read_field, DeclaredLayout};

    #[test]
    fn field_offsets_match_gpu_layout() {
        let offsets: Vec<_> = VertexRecord::FIELDS.iter().map(|f| (f.name, f.offset)).collect();
        assert_eq!(
            offsets,
            [
                ("position", 0),
                ("normal", 16),
                ("color", 32),
                ("uv", 48),
                ("tangent", 64),
                ("bitangent", 80),
                ("joint_indices", 96),
                ("joint_weights", 112),
            ]
        );
        assert_eq!(VertexRecord::SIZE, 128);
        assert_eq!(layout::validate(&DeclaredLayout::of::<VertexRecord>()), Ok(()));
    }

    #[test]
    fn bytes_read_back_at_declared_offsets() {
        let vertex = VertexRecord::new(
            glm::vec3(1.0, 2.0, 3.0),
            glm::vec3(4.0, 5.0, 6.0),
            glm::vec2(11.0, 12.0),
        )
        .with_color(glm::vec4(7.0, 8.0, 9.0, 10.0))
        .with_tangent_frame(glm::vec3(13.0, 14.0, 15.0), glm::vec3(16.0, 17.0, 18.0))
        .with_joints(glm::U16Vec4::new(19, 20, 21, 22), glm::vec4(23.0, 24.0, 25.0, 26.0));
        let bytes = vertex.as_bytes();

        let field = |name| VertexRecord::field(name).unwrap();
        assert_eq!(read_field::<[f32; 3]>(bytes, field("position")), Some([1.0, 2.0, 3.0]));
        assert_eq!(read_field::<[f32; 3]>(bytes, field("normal")), Some([4.0, 5.0, 6.0]));
        assert_eq!(read_field::<[f32; 4]>(bytes, field("color")), Some([7.0, 8.0, 9.0, 10.0]));
        assert_eq!(read_field::<[f32; 2]>(bytes, field("uv")), Some([11.0, 12.0]));
        assert_eq!(read_field::<[f32; 3]>(bytes, field("tangent")), Some([13.0, 14.0, 15.0]));
        assert_eq!(read_field::<[f32; 3]>(bytes, field("bitangent")), Some([16.0, 17.0, 18.0]));
        assert_eq!(read_field::<[u16; 4]>(bytes, field("joint_indices")), Some([19, 20, 21, 22]));
        assert_eq!(
            read_field::<[f32; 4]>(bytes, field("joint_weights")),
            Some([23.0, 24.0, 25.0, 26.0])
        );
    }

    #[test]
    fn attributes_follow_struct_offsets() {
        let attributes = VertexRecord::vertex_attributes();
        assert_eq!(attributes.len(), VertexRecord::FIELDS.len());

        for (attribute, field) in attributes.iter().zip(VertexRecord::FIELDS) {
            assert_eq!(attribute.offset as usize, field.offset, "{}", field.name);
            assert_eq!(attribute.format.size() as usize, field.size, "{}", field.name);
        }

        let layout = VertexRecord::description(&attributes);
        assert_eq!(layout.array_stride, 128);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn joint_weights_normalize_to_one() {
        let mut vertex = VertexRecord::default().with_joints(
            glm::U16Vec4::new(0, 1, 2, 3),
            glm::vec4(2.0, 1.0, 1.0, 0.0),
        );
        assert!(!vertex.has_normalized_weights());

        vertex.normalize_joint_weights();
        assert!(vertex.has_normalized_weights());
        assert_eq!(vertex.joint_weights, glm::vec4(0.5, 0.25, 0.25, 0.0));
    }

    #[test]
    fn zero_weights_stay_zero() {
        let mut vertex =
            VertexRecord::default().with_joints(glm::U16Vec4::zeros(), glm::Vec4::zeros());
        vertex.normalize_joint_weights();
        assert_eq!(vertex.joint_weights, glm::Vec4::zeros());
    }
}
