// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plain-data descriptions exchanged with a [`GraphicsContext`](super::GraphicsContext).

use crate::math::Mat4;
use std::fmt;

/// An opaque handle to a GPU buffer, valid only for the context that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBufferHandle(pub u64);

/// An opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// An opaque handle to an offscreen frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferHandle(pub u64);

/// An opaque handle to a sampled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// An opaque handle to a GPU fence used to observe command completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FenceHandle(pub u64);

/// Content hash identifying a compiled program variant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramKey(pub [u8; 32]);

impl ProgramKey {
    /// Lowercase hex form, suitable for file names.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for ProgramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgramKey({}..)", &self.to_hex()[..12])
    }
}

/// Which binding point a buffer feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices.
    Index,
}

/// How often a buffer's contents are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    #[default]
    Static,
    /// Updated occasionally.
    Dynamic,
    /// Updated every frame.
    Stream,
}

/// The format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// Four normalized unsigned bytes.
    Unorm8x4,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Unorm8x4 => 4,
        }
    }
}

/// A named attribute within an interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    /// Attribute name as declared in the shader.
    pub name: String,
    /// Data format.
    pub format: VertexFormat,
    /// Byte offset within one vertex.
    pub offset: u32,
}

/// The layout of one vertex buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexLayout {
    /// Attributes in declaration order.
    pub attributes: Vec<VertexAttribute>,
    /// Distance in bytes between consecutive vertices.
    pub stride: u32,
}

impl VertexLayout {
    /// Builds a tightly packed layout from `(name, format)` pairs.
    pub fn packed<N: Into<String>>(attributes: impl IntoIterator<Item = (N, VertexFormat)>) -> Self {
        let mut offset = 0;
        let attributes = attributes
            .into_iter()
            .map(|(name, format)| {
                let attribute = VertexAttribute {
                    name: name.into(),
                    format,
                    offset,
                };
                offset += format.size();
                attribute
            })
            .collect();
        Self {
            attributes,
            stride: offset,
        }
    }
}

/// The element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices.
    Uint16,
    /// 32-bit indices.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The texel format of a sampled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// One 8-bit normalized channel.
    R8Unorm,
    /// Four 8-bit normalized channels.
    #[default]
    Rgba8Unorm,
    /// Four 8-bit normalized channels in sRGB space.
    Rgba8UnormSrgb,
    /// Four 32-bit float channels.
    Rgba32Float,
}

impl TextureFormat {
    /// Size of one texel in bytes.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => 4,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Texel filtering used when a texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Linear,
}

/// Everything needed to allocate a two-dimensional texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Sampling filter.
    pub filter: FilterMode,
}

impl TextureDescriptor {
    /// An RGBA8 texture with linear filtering.
    pub const fn rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            filter: FilterMode::Linear,
        }
    }

    /// Number of bytes a full upload must contain.
    pub const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Each pair of vertices is a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Each triple of vertices is a triangle.
    #[default]
    TriangleList,
    /// Consecutive vertices form a triangle strip.
    TriangleStrip,
}

/// Color blending applied when a renderer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    Disabled,
    /// Classic `src * a + dst * (1 - a)`.
    Alpha,
    /// Source is premultiplied by its alpha.
    Premultiplied,
    /// Source is added onto destination.
    Additive,
}

/// Which faces are discarded during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Draw both faces.
    #[default]
    None,
    /// Discard front faces.
    Front,
    /// Discard back faces.
    Back,
}

/// Fixed-function state for one renderer. Pure data, applied per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderState {
    /// Blending mode.
    pub blend: BlendMode,
    /// Whether fragments are depth tested.
    pub depth_test: bool,
    /// Whether fragments write depth.
    pub depth_write: bool,
    /// Face culling.
    pub cull: CullFace,
}

/// A value assigned to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A single integer.
    Int(i32),
    /// A single float.
    Float(f32),
    /// A two-component vector.
    Vec2([f32; 2]),
    /// A four-component vector.
    Vec4([f32; 4]),
    /// A 4x4 matrix.
    Mat4(Mat4),
}

/// The two stages of a shader program, in backend source form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderSource {
    /// Human-readable label used in diagnostics.
    pub label: String,
    /// Vertex stage source.
    pub vertex: String,
    /// Fragment stage source.
    pub fragment: String,
}

/// The result of a successful program compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    /// Handle to the linked program.
    pub handle: ProgramHandle,
    /// The driver's binary representation, if the backend can retrieve it.
    pub binary: Option<Vec<u8>>,
}

/// One draw command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// Non-indexed draw of `count` vertices.
    Arrays {
        /// Primitive assembly.
        topology: PrimitiveTopology,
        /// Number of vertices.
        count: u32,
    },
    /// Indexed draw of `count` indices from the bound index buffer.
    Indexed {
        /// Primitive assembly.
        topology: PrimitiveTopology,
        /// Index element type.
        format: IndexFormat,
        /// Number of indices.
        count: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_key_hex_is_full_width() {
        let key = ProgramKey([0xab; 32]);
        assert_eq!(key.to_hex().len(), 64);
        assert!(key.to_hex().starts_with("abab"));
        assert_eq!(format!("{key:?}"), "ProgramKey(abababababab..)");
    }

    #[test]
    fn texture_byte_len_follows_format() {
        let rgba = TextureDescriptor::rgba8(4, 2);
        assert_eq!(rgba.byte_len(), 32);
        let mask = TextureDescriptor {
            format: TextureFormat::R8Unorm,
            ..rgba
        };
        assert_eq!(mask.byte_len(), 8);
    }

    #[test]
    fn packed_layout_accumulates_offsets() {
        let layout = VertexLayout::packed([
            ("aPosition", VertexFormat::Float32x3),
            ("aColor", VertexFormat::Unorm8x4),
            ("aTexCoord", VertexFormat::Float32x2),
        ]);
        let offsets: Vec<u32> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 16]);
        assert_eq!(layout.stride, 24);
    }
}
