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

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use std::sync::Arc;
use vellum_core::renderer::{BufferUsage, VertexFormat, VertexLayout};
use vellum_core::{AttributeBufferId, GeometryId, Rect, RendererId};
use vellum_infra::{GpuCommand, HeadlessContext};
use vellum_render::{
    frame_channel, AttributeBuffer, BufferBinding, FrameSender, Geometry, Instruction,
    PostProcessDispatcher, PostProcessEvent, ProgramCache, RenderConfig, RenderManager,
    RenderMessage, Renderer, Shader,
};

pub const SURFACE: Rect = Rect::from_size(800, 600);

/// A manager wired to a headless context, with the logic-side endpoints.
pub struct Harness {
    pub context: Arc<HeadlessContext>,
    pub sender: FrameSender,
    pub events: Receiver<PostProcessEvent>,
    pub manager: RenderManager,
}

impl Harness {
    /// A harness whose context is already created.
    pub fn new() -> Self {
        Self::with(HeadlessContext::new(), RenderConfig::default())
    }

    pub fn with(context: HeadlessContext, config: RenderConfig) -> Self {
        let mut harness = Self::pending(context, config);
        harness.manager.context_created();
        harness
    }

    /// A harness that has not received `context_created` yet.
    pub fn pending(context: HeadlessContext, config: RenderConfig) -> Self {
        let context = Arc::new(context);
        let (sender, receiver) = frame_channel();
        let (dispatcher, events) = PostProcessDispatcher::new(config.post_process_capacity);
        let manager = RenderManager::new(
            context.clone(),
            receiver,
            ProgramCache::new(),
            dispatcher,
            &config,
        );
        Self {
            context,
            sender,
            events,
            manager,
        }
    }

    /// Submits the queued messages with `instructions` and renders once.
    pub fn frame(&mut self, instructions: Vec<Instruction>) -> vellum_render::RenderStatus {
        self.sender.end_frame(instructions).unwrap();
        self.manager.render()
    }

    pub fn draws(&self) -> usize {
        self.context.draw_calls().len()
    }
}

pub fn flat_shader() -> Shader {
    Shader::new(
        "flat",
        "void main() { gl_Position = vec4(0.0); }",
        "void main() { gl_FragColor = vec4(1.0); }",
    )
}

pub fn broken_shader() -> Shader {
    Shader::new("broken", "void main() {}", "#error missing output\nvoid main() {}")
}

pub fn positions() -> BufferBinding {
    BufferBinding::Vertex(VertexLayout::packed([("aPosition", VertexFormat::Float32x2)]))
}

pub fn triangle(id: u64) -> AttributeBuffer {
    AttributeBuffer::from_pod(AttributeBufferId(id), &[0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0])
}

/// Messages creating a geometry with one triangle buffer and a renderer on it.
pub fn drawable(renderer: u64, geometry: u64, buffer: u64) -> Vec<RenderMessage> {
    vec![
        RenderMessage::AddGeometry(Geometry::new(GeometryId(geometry))),
        RenderMessage::AddAttributeBuffer {
            geometry: GeometryId(geometry),
            buffer: triangle(buffer),
            target: positions(),
            usage: BufferUsage::Static,
        },
        RenderMessage::AddRenderer(Renderer::new(RendererId(renderer), GeometryId(geometry))),
    ]
}

pub fn draw(renderers: &[u64]) -> Instruction {
    Instruction::new(SURFACE).with_renderers(renderers.iter().map(|&r| RendererId(r)))
}

pub fn position_of(commands: &[GpuCommand], pred: impl Fn(&GpuCommand) -> bool) -> Option<usize> {
    commands.iter().position(pred)
}
