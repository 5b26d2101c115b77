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

use vellum_core::renderer::{
    BufferTarget, BufferUsage, DrawCall, FenceHandle, FrameBufferHandle, GpuBufferHandle,
    IndexFormat, ProgramHandle, RenderState, TextureFormat, TextureHandle, UniformValue,
};
use vellum_core::{LinearRgba, Rect};

/// One call received by a [`HeadlessContext`](super::HeadlessContext).
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    /// A program was compiled.
    CompileProgram {
        /// The new program.
        handle: ProgramHandle,
        /// Label of its source.
        label: String,
    },
    /// A program was destroyed.
    DestroyProgram(ProgramHandle),
    /// A program was made current.
    UseProgram(ProgramHandle),
    /// A uniform of the current program was set.
    SetUniform {
        /// Uniform name.
        name: String,
        /// Assigned value.
        value: UniformValue,
    },
    /// A buffer was created.
    CreateBuffer {
        /// The new buffer.
        handle: GpuBufferHandle,
        /// Binding target.
        target: BufferTarget,
        /// Update frequency hint.
        usage: BufferUsage,
        /// Size in bytes.
        size: usize,
    },
    /// A buffer's contents were replaced.
    UpdateBuffer {
        /// The buffer.
        handle: GpuBufferHandle,
        /// New size in bytes.
        size: usize,
    },
    /// A buffer was destroyed.
    DestroyBuffer(GpuBufferHandle),
    /// A vertex buffer was bound.
    BindVertexBuffer(GpuBufferHandle),
    /// An index buffer was bound.
    BindIndexBuffer {
        /// The buffer.
        handle: GpuBufferHandle,
        /// Index width.
        format: IndexFormat,
    },
    /// A texture was created.
    CreateTexture {
        /// The new texture.
        handle: TextureHandle,
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// Texel format.
        format: TextureFormat,
    },
    /// A texture's texels were replaced.
    UpdateTexture(TextureHandle),
    /// A texture was destroyed.
    DestroyTexture(TextureHandle),
    /// A texture was bound to a sampler unit.
    BindTexture {
        /// Sampler unit.
        unit: u32,
        /// The texture.
        handle: TextureHandle,
    },
    /// A frame buffer was created.
    CreateFrameBuffer {
        /// The new frame buffer.
        handle: FrameBufferHandle,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// A frame buffer was destroyed.
    DestroyFrameBuffer(FrameBufferHandle),
    /// A frame buffer, or the surface for `None`, was bound.
    BindFrameBuffer(Option<FrameBufferHandle>),
    /// The viewport changed.
    SetViewport(Rect),
    /// The scissor changed.
    SetScissor(Option<Rect>),
    /// The bound target was cleared.
    Clear(LinearRgba),
    /// Fixed-function state changed.
    SetRenderState(RenderState),
    /// Geometry was drawn.
    Draw(DrawCall),
    /// A fence was inserted.
    InsertFence(FenceHandle),
    /// A fence was destroyed.
    DestroyFence(FenceHandle),
    /// Recorded work was submitted.
    Flush,
}

impl GpuCommand {
    /// Returns `true` for [`GpuCommand::Draw`].
    pub fn is_draw(&self) -> bool {
        matches!(self, GpuCommand::Draw(_))
    }
}
