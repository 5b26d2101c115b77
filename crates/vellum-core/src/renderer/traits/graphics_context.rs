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

use crate::math::{LinearRgba, Rect};
use crate::renderer::api::*;
use crate::renderer::error::{ResourceError, ShaderError};
use std::fmt::Debug;

/// The capability surface of a GPU driver context.
///
/// The render engine owns exactly one implementation and calls it from the
/// render thread only. Whether calls are allowed at all is decided by the
/// engine (see `ContextCreated`/`ContextDestroyed`); an implementation never
/// has to defend against being called while its context is gone.
///
/// Handles returned by a context are only meaningful for that context
/// instance. After the driver context is recreated every previous handle is
/// garbage.
pub trait GraphicsContext: Send + Sync + Debug + 'static {
    /// Compiles and links a program from source.
    /// ## Arguments
    /// * `source` - The vertex and fragment stages to compile.
    /// ## Returns
    /// The linked program and, when available, its driver binary.
    /// ## Errors
    /// * `ShaderError` - If either stage fails to compile or the program fails to link.
    fn compile_program(&self, source: &ShaderSource) -> Result<CompiledProgram, ShaderError>;

    /// Deletes a linked program.
    fn destroy_program(&self, program: ProgramHandle);

    /// Makes `program` current for subsequent uniform updates and draws.
    fn use_program(&self, program: ProgramHandle);

    /// Assigns a uniform on the current program. Unknown names are ignored.
    fn set_uniform(&self, name: &str, value: &UniformValue);

    /// Creates a GPU buffer initialized with `data`.
    /// ## Arguments
    /// * `target` - The binding point the buffer will feed.
    /// * `usage` - The expected update frequency.
    /// * `data` - Initial contents.
    /// ## Errors
    /// * `ResourceError` - If the allocation fails.
    fn create_buffer(
        &self,
        target: BufferTarget,
        usage: BufferUsage,
        data: &[u8],
    ) -> Result<GpuBufferHandle, ResourceError>;

    /// Replaces the contents of an existing buffer.
    /// ## Errors
    /// * `ResourceError` - If the handle is unknown or the allocation fails.
    fn update_buffer(&self, buffer: GpuBufferHandle, data: &[u8]) -> Result<(), ResourceError>;

    /// Deletes a GPU buffer.
    fn destroy_buffer(&self, buffer: GpuBufferHandle);

    /// Binds a vertex buffer and enables its attributes.
    fn bind_vertex_buffer(&self, buffer: GpuBufferHandle, layout: &VertexLayout);

    /// Binds an index buffer for the next indexed draw.
    fn bind_index_buffer(&self, buffer: GpuBufferHandle, format: IndexFormat);

    /// Creates an offscreen color target.
    /// ## Errors
    /// * `ResourceError` - If the allocation fails.
    fn create_frame_buffer(&self, width: u32, height: u32)
        -> Result<FrameBufferHandle, ResourceError>;

    /// Deletes an offscreen color target.
    fn destroy_frame_buffer(&self, frame_buffer: FrameBufferHandle);

    /// Binds an offscreen target, or the default surface when `None`.
    fn bind_frame_buffer(&self, frame_buffer: Option<FrameBufferHandle>);

    /// Sets the viewport rectangle of the bound target.
    fn set_viewport(&self, viewport: Rect);

    /// Enables scissoring to `clip`, or disables it when `None`.
    fn set_scissor(&self, clip: Option<Rect>);

    /// Clears the color buffer of the bound target.
    fn clear(&self, color: LinearRgba);

    /// Applies blending, depth and culling state.
    fn set_render_state(&self, state: &RenderState);

    /// Issues a draw using the currently bound program and buffers.
    fn draw(&self, call: &DrawCall);

    /// Creates a sampled texture initialized with `pixels`.
    /// ## Arguments
    /// * `descriptor` - Size, format and filtering of the texture.
    /// * `pixels` - Tightly packed texel rows, `descriptor.byte_len()` bytes.
    /// ## Errors
    /// * `ResourceError` - If the allocation fails or `pixels` has the wrong size.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<TextureHandle, ResourceError>;

    /// Replaces every texel of an existing texture.
    /// ## Errors
    /// * `ResourceError` - If the handle is unknown or `pixels` has the wrong size.
    fn update_texture(&self, texture: TextureHandle, pixels: &[u8]) -> Result<(), ResourceError>;

    /// Deletes a texture.
    fn destroy_texture(&self, texture: TextureHandle);

    /// Binds a texture to a sampler unit for the next draw.
    fn bind_texture(&self, unit: u32, texture: TextureHandle);

    /// Inserts a fence after all previously issued commands.
    /// ## Errors
    /// * `ResourceError` - If the backend cannot create fences.
    fn insert_fence(&self) -> Result<FenceHandle, ResourceError>;

    /// Returns `true` once every command issued before the fence has completed.
    /// Never blocks.
    fn is_fence_signaled(&self, fence: FenceHandle) -> bool;

    /// Deletes a fence.
    fn destroy_fence(&self, fence: FenceHandle);

    /// Flushes recorded commands to the driver.
    fn flush(&self);
}
