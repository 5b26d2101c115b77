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

//! The render-thread facade.

use crate::config::RenderConfig;
use crate::context_state::ContextState;
use crate::dispatcher::{PostProcessDispatcher, PostProcessEvent};
use crate::executor::{poll_trackers, DrawPass, FrameState};
use crate::instruction::InstructionStream;
use crate::message::RenderMessage;
use crate::program_cache::ProgramCache;
use crate::queue::FrameReceiver;
use crate::registry::ResourceRegistry;
use crate::shader::Shader;
use crate::texture::TextureCache;
use std::sync::Arc;
use std::time::Instant;
use vellum_core::renderer::{GraphicsContext, RenderStats, ShaderExporter};

/// Outcome of one [`RenderManager::render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStatus {
    /// Instructions were replayed against a valid context.
    pub executed: bool,
    /// The current instruction stream is non-empty.
    pub has_instructions: bool,
    /// Another frame should be rendered even without new input.
    pub needs_update: bool,
}

/// Owns every render-side resource and turns instruction streams into GPU
/// calls.
///
/// The manager is driven from the render thread: the host forwards context
/// notifications through [`context_created`](Self::context_created) and
/// [`context_destroyed`](Self::context_destroyed) and calls
/// [`render`](Self::render) once per frame.
#[derive(Debug)]
pub struct RenderManager {
    context: Arc<dyn GraphicsContext>,
    state: ContextState,
    frames: FrameReceiver,
    registry: ResourceRegistry,
    textures: TextureCache,
    programs: ProgramCache,
    dispatcher: PostProcessDispatcher,
    default_shader: Option<Shader>,
    frame_state: FrameState,
    stream: Option<InstructionStream>,
    frame_number: u64,
    last_stats: RenderStats,
}

impl RenderManager {
    /// Assembles a manager from its collaborators.
    ///
    /// ## Arguments
    /// * `context` - The graphics context. No call is made before
    ///   [`context_created`](Self::context_created).
    /// * `frames` - Render end of the frame queue.
    /// * `programs` - Program cache, possibly with an exporter attached.
    /// * `dispatcher` - Outbound post-process channel.
    /// * `config` - Initial frame state and queue limits.
    pub fn new(
        context: Arc<dyn GraphicsContext>,
        mut frames: FrameReceiver,
        programs: ProgramCache,
        dispatcher: PostProcessDispatcher,
        config: &RenderConfig,
    ) -> Self {
        frames.set_max_pending(config.max_pending_streams);
        log::info!("[RenderManager] Created, waiting for a graphics context");
        Self {
            context,
            state: ContextState::new(),
            frames,
            registry: ResourceRegistry::new(),
            textures: TextureCache::new(),
            programs,
            dispatcher,
            default_shader: None,
            frame_state: FrameState {
                background_color: config.background_color,
                surface_rect: config.surface_rect,
                delta: config.frame_delta,
            },
            stream: None,
            frame_number: 0,
            last_stats: RenderStats::default(),
        }
    }

    /// A new graphics context is current. Resources are re-uploaded lazily.
    pub fn context_created(&mut self) {
        let generation = self.state.created();
        log::info!("[RenderManager] Graphics context created (generation {generation})");
    }

    /// The graphics context is gone. Caches are dropped without GPU calls.
    pub fn context_destroyed(&mut self) {
        self.state.destroyed();
        self.programs.invalidate();
        self.textures.invalidate();
        self.registry.invalidate();
        log::info!(
            "[RenderManager] Graphics context destroyed (generation {})",
            self.state.generation()
        );
    }

    /// Renders one frame.
    pub fn render(&mut self) -> RenderStatus {
        let started = Instant::now();
        self.frame_number += 1;
        let mut stats = RenderStats {
            frame_number: self.frame_number,
            ..Default::default()
        };

        stats.messages_applied = self.drain_messages();
        if let Some(stream) = self.frames.take_stream() {
            self.stream = Some(stream);
        }
        let has_instructions = self.stream.as_ref().is_some_and(|s| !s.is_empty());

        if !self.state.is_valid() {
            log::trace!("[RenderManager] No valid context, skipping frame {}", self.frame_number);
            stats.cpu_time_ms = started.elapsed().as_secs_f32() * 1000.0;
            self.last_stats = stats;
            return RenderStatus {
                executed: false,
                has_instructions,
                needs_update: has_instructions,
            };
        }

        let context = self.context.as_ref();
        stats.tracker_events =
            poll_trackers(context, &self.state, &mut self.registry, &self.dispatcher);

        let instructions = self
            .stream
            .as_ref()
            .map(InstructionStream::instructions)
            .unwrap_or_default();
        DrawPass {
            context,
            state: &self.state,
            registry: &mut self.registry,
            textures: &mut self.textures,
            programs: &mut self.programs,
            default_shader: self.default_shader.as_ref(),
            frame: &self.frame_state,
            stats: &mut stats,
        }
        .execute(instructions);
        context.flush();

        stats.cpu_time_ms = started.elapsed().as_secs_f32() * 1000.0;
        self.last_stats = stats;
        RenderStatus {
            executed: has_instructions,
            has_instructions,
            needs_update: has_instructions,
        }
    }

    /// Sends a post-process event from another render-side producer.
    pub fn dispatch_post_process(&self, event: PostProcessEvent) -> bool {
        self.dispatcher.dispatch(event)
    }

    /// Replaces the sink compiled program binaries are forwarded to.
    pub fn set_shader_exporter(&mut self, exporter: Option<Arc<dyn ShaderExporter>>) {
        self.programs.set_exporter(exporter);
    }

    /// The program cache.
    pub fn program_cache(&self) -> &ProgramCache {
        &self.programs
    }

    /// The texture cache.
    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    /// The resource registry.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Statistics of the most recent frame.
    pub fn last_stats(&self) -> &RenderStats {
        &self.last_stats
    }

    /// Context lifecycle state.
    pub fn context_state(&self) -> &ContextState {
        &self.state
    }

    /// Scalar frame state.
    pub fn frame_state(&self) -> &FrameState {
        &self.frame_state
    }

    /// The shader used by renderers without one of their own.
    pub fn default_shader(&self) -> Option<&Shader> {
        self.default_shader.as_ref()
    }

    /// The post-process dispatcher.
    pub fn dispatcher(&self) -> &PostProcessDispatcher {
        &self.dispatcher
    }

    fn drain_messages(&mut self) -> u32 {
        let mut applied = 0;
        for batch in self.frames.drain() {
            log::trace!(
                "[RenderManager] Applying {} messages of frame {}",
                batch.messages.len(),
                batch.frame
            );
            for message in batch.messages {
                self.apply(message);
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, message: RenderMessage) {
        log::trace!("[RenderManager] {}", message.name());
        let context = self.context.as_ref();
        match message {
            RenderMessage::AddRenderer(renderer) => self.registry.add_renderer(renderer),
            RenderMessage::RemoveRenderer(id) => {
                self.registry.remove_renderer(id);
            }
            RenderMessage::AddGeometry(geometry) => self.registry.add_geometry(geometry),
            RenderMessage::RemoveGeometry(id) => {
                if let Some(mut geometry) = self.registry.remove_geometry(id) {
                    geometry.release(context, &self.state);
                }
            }
            RenderMessage::AddAttributeBuffer {
                geometry,
                buffer,
                target,
                usage,
            } => self
                .registry
                .add_attribute_buffer(geometry, buffer, target, usage),
            RenderMessage::RemoveAttributeBuffer { geometry, buffer } => {
                if let Some(mut bound) = self.registry.remove_attribute_buffer(geometry, buffer) {
                    bound.release(context, &self.state);
                }
            }
            RenderMessage::UpdateAttributeBuffer {
                geometry,
                buffer,
                data,
            } => self
                .registry
                .update_attribute_buffer(geometry, buffer, data),
            RenderMessage::AddRenderTracker(tracker) => self.registry.add_tracker(tracker),
            RenderMessage::RemoveRenderTracker(id) => {
                if let Some(mut tracker) = self.registry.remove_tracker(id) {
                    tracker.release(context, &self.state);
                }
            }
            RenderMessage::AddFrameBuffer(frame_buffer) => {
                self.registry.add_frame_buffer(frame_buffer)
            }
            RenderMessage::RemoveFrameBuffer(id) => {
                if let Some(mut frame_buffer) = self.registry.remove_frame_buffer(id) {
                    frame_buffer.release(context, &self.state);
                }
            }
            RenderMessage::AddTexture(texture) => self.textures.add(texture),
            RenderMessage::RemoveTexture(id) => {
                if let Some(mut texture) = self.textures.remove(id) {
                    texture.release(context, &self.state);
                }
            }
            RenderMessage::UpdateTexture { texture, pixels } => self.textures.update(texture, pixels),
            RenderMessage::SetRendererTexture {
                renderer,
                sampler,
                texture,
            } => {
                if let Some(renderer) = self.registry.renderer_mut(renderer) {
                    renderer.set_texture(sampler, texture);
                }
            }
            RenderMessage::SetRenderState { renderer, state } => {
                if let Some(renderer) = self.registry.renderer_mut(renderer) {
                    renderer.set_render_state(state);
                }
            }
            RenderMessage::SetRendererShader { renderer, shader } => {
                if let Some(renderer) = self.registry.renderer_mut(renderer) {
                    renderer.set_shader(shader);
                }
            }
            RenderMessage::SetUniform {
                renderer,
                name,
                value,
            } => {
                if let Some(renderer) = self.registry.renderer_mut(renderer) {
                    renderer.set_uniform(name, value);
                }
            }
            RenderMessage::SetBackgroundColor(color) => self.frame_state.background_color = color,
            RenderMessage::SetFrameDeltaTime(delta) => self.frame_state.delta = delta,
            RenderMessage::SetDefaultSurfaceRect(rect) => self.frame_state.surface_rect = rect,
            RenderMessage::SetDefaultShader(shader) => {
                log::debug!("[RenderManager] Default shader is now '{}'", shader.label());
                self.default_shader = Some(shader);
            }
        }
    }
}

impl Drop for RenderManager {
    fn drop(&mut self) {
        if self.state.is_valid() {
            let context = self.context.as_ref();
            self.registry.release_all(context, &self.state);
            self.textures.release_all(context, &self.state);
            self.programs.release_all(context, &self.state);
            context.flush();
        }
        log::info!("[RenderManager] Shut down after {} frames", self.frame_number);
    }
}
