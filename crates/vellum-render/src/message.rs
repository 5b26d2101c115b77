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

//! Lifecycle and state messages sent from the logic thread.

use crate::frame_buffer::FrameBuffer;
use crate::geometry::{AttributeBuffer, BufferBinding, Geometry};
use crate::renderer::Renderer;
use crate::shader::Shader;
use crate::texture::Texture;
use crate::tracker::RenderTracker;
use vellum_core::renderer::{BufferUsage, RenderState, UniformValue};
use vellum_core::{
    AttributeBufferId, FrameBufferId, GeometryId, LinearRgba, Rect, RendererId, TextureId,
    TrackerId,
};

/// A single command for the render thread. Objects carried by `Add*`
/// variants are moved into the registry or texture cache when the message is
/// applied.
#[derive(Debug)]
pub enum RenderMessage {
    /// Registers a renderer.
    AddRenderer(Renderer),
    /// Destroys a renderer.
    RemoveRenderer(RendererId),
    /// Registers a geometry.
    AddGeometry(Geometry),
    /// Destroys a geometry and its buffers.
    RemoveGeometry(GeometryId),
    /// Attaches a buffer to a registered geometry.
    AddAttributeBuffer {
        /// Parent geometry.
        geometry: GeometryId,
        /// The buffer contents.
        buffer: AttributeBuffer,
        /// Binding target and layout.
        target: BufferBinding,
        /// Expected update frequency.
        usage: BufferUsage,
    },
    /// Detaches and destroys a buffer.
    RemoveAttributeBuffer {
        /// Parent geometry.
        geometry: GeometryId,
        /// The buffer to remove.
        buffer: AttributeBufferId,
    },
    /// Replaces a buffer's contents.
    UpdateAttributeBuffer {
        /// Parent geometry.
        geometry: GeometryId,
        /// The buffer to update.
        buffer: AttributeBufferId,
        /// New contents.
        data: Vec<u8>,
    },
    /// Registers a completion tracker.
    AddRenderTracker(RenderTracker),
    /// Destroys a completion tracker.
    RemoveRenderTracker(TrackerId),
    /// Registers an offscreen frame buffer.
    AddFrameBuffer(FrameBuffer),
    /// Destroys an offscreen frame buffer.
    RemoveFrameBuffer(FrameBufferId),
    /// Registers a texture.
    AddTexture(Texture),
    /// Destroys a texture.
    RemoveTexture(TextureId),
    /// Replaces a texture's texels.
    UpdateTexture {
        /// The texture to update.
        texture: TextureId,
        /// New texels, same size and format as before.
        pixels: Vec<u8>,
    },
    /// Binds or unbinds a texture on one of a renderer's samplers.
    SetRendererTexture {
        /// Target renderer.
        renderer: RendererId,
        /// Sampler uniform name.
        sampler: String,
        /// Texture to sample, or `None` to unbind the sampler.
        texture: Option<TextureId>,
    },
    /// Changes a renderer's fixed-function state.
    SetRenderState {
        /// Target renderer.
        renderer: RendererId,
        /// New state.
        state: RenderState,
    },
    /// Replaces or clears a renderer's custom shader.
    SetRendererShader {
        /// Target renderer.
        renderer: RendererId,
        /// New shader, or `None` to use the default one.
        shader: Option<Shader>,
    },
    /// Sets a custom uniform on a renderer.
    SetUniform {
        /// Target renderer.
        renderer: RendererId,
        /// Uniform name.
        name: String,
        /// Uniform value.
        value: UniformValue,
    },
    /// Color the default target is cleared to.
    SetBackgroundColor(LinearRgba),
    /// Seconds elapsed since the previous frame.
    SetFrameDeltaTime(f32),
    /// Default viewport of the surface.
    SetDefaultSurfaceRect(Rect),
    /// Shader used by renderers without a custom one.
    SetDefaultShader(Shader),
}

impl RenderMessage {
    /// Short variant name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            RenderMessage::AddRenderer(_) => "AddRenderer",
            RenderMessage::RemoveRenderer(_) => "RemoveRenderer",
            RenderMessage::AddGeometry(_) => "AddGeometry",
            RenderMessage::RemoveGeometry(_) => "RemoveGeometry",
            RenderMessage::AddAttributeBuffer { .. } => "AddAttributeBuffer",
            RenderMessage::RemoveAttributeBuffer { .. } => "RemoveAttributeBuffer",
            RenderMessage::UpdateAttributeBuffer { .. } => "UpdateAttributeBuffer",
            RenderMessage::AddRenderTracker(_) => "AddRenderTracker",
            RenderMessage::RemoveRenderTracker(_) => "RemoveRenderTracker",
            RenderMessage::AddFrameBuffer(_) => "AddFrameBuffer",
            RenderMessage::RemoveFrameBuffer(_) => "RemoveFrameBuffer",
            RenderMessage::AddTexture(_) => "AddTexture",
            RenderMessage::RemoveTexture(_) => "RemoveTexture",
            RenderMessage::UpdateTexture { .. } => "UpdateTexture",
            RenderMessage::SetRendererTexture { .. } => "SetRendererTexture",
            RenderMessage::SetRenderState { .. } => "SetRenderState",
            RenderMessage::SetRendererShader { .. } => "SetRendererShader",
            RenderMessage::SetUniform { .. } => "SetUniform",
            RenderMessage::SetBackgroundColor(_) => "SetBackgroundColor",
            RenderMessage::SetFrameDeltaTime(_) => "SetFrameDeltaTime",
            RenderMessage::SetDefaultSurfaceRect(_) => "SetDefaultSurfaceRect",
            RenderMessage::SetDefaultShader(_) => "SetDefaultShader",
        }
    }
}

/// All messages produced during one logic frame, applied atomically.
#[derive(Debug, Default)]
pub struct MessageBatch {
    /// Logic frame sequence number.
    pub frame: u64,
    /// Messages in submission order.
    pub messages: Vec<RenderMessage>,
}
