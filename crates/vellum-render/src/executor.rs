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

//! Instruction replay against the graphics context.

use crate::context_state::ContextState;
use crate::dispatcher::{PostProcessDispatcher, PostProcessEvent};
use crate::geometry::Drawable;
use crate::instruction::{Camera, Instruction, RenderTarget};
use crate::program_cache::ProgramCache;
use crate::registry::ResourceRegistry;
use crate::shader::{
    Shader, UNIFORM_ELAPSED_TIME, UNIFORM_PROJECTION_MATRIX, UNIFORM_VIEW_MATRIX,
};
use crate::texture::TextureCache;
use vellum_core::renderer::{
    GraphicsContext, ProgramHandle, RenderStats, TextureHandle, UniformValue,
};
use vellum_core::{LinearRgba, Rect, RendererId};

/// Scalar per-frame state set by messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Clear color of the default target.
    pub background_color: LinearRgba,
    /// Default viewport.
    pub surface_rect: Rect,
    /// Seconds since the previous frame.
    pub delta: f32,
}

/// Polls every armed tracker and dispatches one event per satisfied
/// transition. Finished one-shot trackers are retired afterwards.
pub(crate) fn poll_trackers(
    context: &dyn GraphicsContext,
    state: &ContextState,
    registry: &mut ResourceRegistry,
    dispatcher: &PostProcessDispatcher,
) -> u32 {
    let mut events = 0;
    for tracker in registry.trackers_mut() {
        if let Some(status) = tracker.poll(context, state) {
            log::debug!(
                "[FrameExecutor] {} reported {:?} for {}",
                tracker.id(),
                status,
                tracker.resource()
            );
            dispatcher.dispatch(PostProcessEvent {
                resource: tracker.resource(),
                status,
            });
            events += 1;
        }
    }
    registry.retire_finished_trackers();
    events
}

/// One replay of an instruction list.
///
/// Borrows exactly the pieces of the manager that drawing touches so the
/// instruction stream itself can stay borrowed alongside.
pub(crate) struct DrawPass<'a> {
    pub context: &'a dyn GraphicsContext,
    pub state: &'a ContextState,
    pub registry: &'a mut ResourceRegistry,
    pub textures: &'a mut TextureCache,
    pub programs: &'a mut ProgramCache,
    pub default_shader: Option<&'a Shader>,
    pub frame: &'a FrameState,
    pub stats: &'a mut RenderStats,
}

impl DrawPass<'_> {
    /// Clears the default target, then replays `instructions` in order.
    pub fn execute(&mut self, instructions: &[Instruction]) {
        let compiled_before = self.programs.compiled();

        self.context.bind_frame_buffer(None);
        self.context.set_viewport(self.frame.surface_rect);
        self.context.set_scissor(None);
        self.context.clear(self.frame.background_color);

        for instruction in instructions {
            self.run_instruction(instruction);
        }

        self.stats.programs_compiled = (self.programs.compiled() - compiled_before) as u32;
    }

    fn run_instruction(&mut self, instruction: &Instruction) {
        let offscreen = match instruction.target {
            RenderTarget::Default => false,
            RenderTarget::Offscreen(id) => {
                let Some(frame_buffer) = self.registry.frame_buffer_mut(id) else {
                    log::debug!("[FrameExecutor] Skipping instruction: {id} is not registered");
                    return;
                };
                match frame_buffer.ensure(self.context, self.state) {
                    Ok(handle) => self.context.bind_frame_buffer(Some(handle)),
                    Err(err) => {
                        log::warn!("[FrameExecutor] Cannot create {id}: {err}");
                        return;
                    }
                }
                true
            }
        };

        self.context.set_viewport(instruction.viewport);
        self.context.set_scissor(instruction.clip);
        if offscreen {
            if let Some(color) = instruction.clear_color {
                self.context.clear(color);
            }
        }

        for renderer in &instruction.renderers {
            self.draw_renderer(*renderer, &instruction.camera);
        }

        if let Some(id) = instruction.tracker {
            match self.registry.tracker_mut(id) {
                Some(tracker) => {
                    if let Err(err) = tracker.arm(self.context, self.state) {
                        log::warn!("[FrameExecutor] Cannot arm {id}: {err}");
                    }
                }
                None => log::debug!("[FrameExecutor] {id} is not registered, nothing to arm"),
            }
        }

        if offscreen {
            self.context.bind_frame_buffer(None);
            self.context.set_viewport(self.frame.surface_rect);
            self.context.set_scissor(None);
        }
        self.stats.instructions += 1;
    }

    fn draw_renderer(&mut self, id: RendererId, camera: &Camera) {
        let Some((renderer, geometry)) = self.registry.renderer_and_geometry(id) else {
            log::trace!("[FrameExecutor] {id} is not registered");
            self.stats.skipped_draws += 1;
            return;
        };
        let Some(geometry) = geometry.filter(|g| g.is_complete()) else {
            log::debug!(
                "[FrameExecutor] Skipping {id}: {} is missing or incomplete",
                renderer.geometry()
            );
            self.stats.skipped_draws += 1;
            return;
        };

        let Some(program) = resolve_program(
            self.programs,
            self.context,
            self.state,
            renderer.shader(),
            self.default_shader,
        ) else {
            log::debug!("[FrameExecutor] Skipping {id}: no usable shader");
            self.stats.skipped_draws += 1;
            return;
        };

        if let Err(err) = geometry.upload(self.context, self.state) {
            log::warn!("[FrameExecutor] Skipping {id}: buffer upload failed: {err}");
            self.stats.skipped_draws += 1;
            return;
        }
        let Some(call) = geometry.draw_call() else {
            log::trace!("[FrameExecutor] Skipping {id}: nothing to draw");
            self.stats.skipped_draws += 1;
            return;
        };

        let mut samplers = Vec::with_capacity(renderer.textures().len());
        for (sampler, texture_id) in renderer.textures() {
            let Some(texture) = self.textures.get_mut(*texture_id) else {
                log::debug!("[FrameExecutor] Skipping {id}: {texture_id} is not registered");
                self.stats.skipped_draws += 1;
                return;
            };
            match texture.ensure(self.context, self.state) {
                Ok(handle) => samplers.push((sampler.as_str(), handle)),
                Err(err) => {
                    log::warn!("[FrameExecutor] Skipping {id}: upload of {texture_id} failed: {err}");
                    self.stats.skipped_draws += 1;
                    return;
                }
            }
        }

        self.context.use_program(program);
        if !geometry.bind(self.context, self.state) {
            self.stats.skipped_draws += 1;
            return;
        }
        self.context.set_render_state(renderer.render_state());
        bind_samplers(self.context, &samplers);

        let elapsed = renderer.advance(self.stats.frame_number, self.frame.delta);
        self.context
            .set_uniform(UNIFORM_VIEW_MATRIX, &UniformValue::Mat4(camera.view));
        self.context.set_uniform(
            UNIFORM_PROJECTION_MATRIX,
            &UniformValue::Mat4(camera.projection),
        );
        self.context
            .set_uniform(UNIFORM_ELAPSED_TIME, &UniformValue::Float(elapsed));
        for (name, value) in renderer.uniforms() {
            self.context.set_uniform(name, value);
        }

        self.context.draw(&call);
        self.stats.draw_calls += 1;
    }
}

/// Binds each texture to the unit matching its position and points the
/// sampler uniform at that unit.
fn bind_samplers(context: &dyn GraphicsContext, samplers: &[(&str, TextureHandle)]) {
    for (unit, (sampler, handle)) in samplers.iter().enumerate() {
        context.bind_texture(unit as u32, *handle);
        context.set_uniform(sampler, &UniformValue::Int(unit as i32));
    }
}

/// Picks the renderer's own program, falling back to the default shader when
/// there is none or it failed to compile.
fn resolve_program(
    programs: &mut ProgramCache,
    context: &dyn GraphicsContext,
    state: &ContextState,
    custom: Option<&Shader>,
    default: Option<&Shader>,
) -> Option<ProgramHandle> {
    if let Some(shader) = custom {
        match programs.get_or_compile(context, state, shader) {
            Ok(handle) => return Some(handle),
            Err(_) => log::trace!(
                "[FrameExecutor] '{}' unavailable, using the default shader",
                shader.label()
            ),
        }
    }
    programs.get_or_compile(context, state, default?).ok()
}
