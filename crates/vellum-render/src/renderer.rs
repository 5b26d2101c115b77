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

//! The drawable unit owned by the registry.

use crate::shader::Shader;
use vellum_core::renderer::{RenderState, UniformValue};
use vellum_core::{GeometryId, RendererId, TextureId};

/// Binds one geometry to a shader, render state, custom uniforms and sampled
/// textures.
#[derive(Debug, Clone)]
pub struct Renderer {
    id: RendererId,
    geometry: GeometryId,
    shader: Option<Shader>,
    render_state: RenderState,
    uniforms: Vec<(String, UniformValue)>,
    textures: Vec<(String, TextureId)>,
    elapsed: f32,
    advanced_on: Option<u64>,
}

impl Renderer {
    /// Creates a renderer drawing `geometry` with the default shader.
    pub fn new(id: RendererId, geometry: GeometryId) -> Self {
        Self {
            id,
            geometry,
            shader: None,
            render_state: RenderState::default(),
            uniforms: Vec::new(),
            textures: Vec::new(),
            elapsed: 0.0,
            advanced_on: None,
        }
    }

    /// Uses a custom shader instead of the default one.
    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Sets the fixed-function state.
    pub fn with_render_state(mut self, state: RenderState) -> Self {
        self.render_state = state;
        self
    }

    /// Adds a custom uniform.
    pub fn with_uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.set_uniform(name.into(), value);
        self
    }

    /// Samples `texture` through the sampler uniform `sampler`.
    pub fn with_texture(mut self, sampler: impl Into<String>, texture: TextureId) -> Self {
        self.set_texture(sampler.into(), Some(texture));
        self
    }

    /// The renderer's identifier.
    pub fn id(&self) -> RendererId {
        self.id
    }

    /// The geometry this renderer draws.
    pub fn geometry(&self) -> GeometryId {
        self.geometry
    }

    /// The custom shader, if any.
    pub fn shader(&self) -> Option<&Shader> {
        self.shader.as_ref()
    }

    /// Fixed-function state applied before drawing.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    /// Custom uniforms in the order they were first set.
    pub fn uniforms(&self) -> &[(String, UniformValue)] {
        &self.uniforms
    }

    /// Sampler bindings. A binding's position is its texture unit.
    pub fn textures(&self) -> &[(String, TextureId)] {
        &self.textures
    }

    /// Seconds accumulated over the frames this renderer was drawn in.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Replaces or clears the custom shader.
    pub fn set_shader(&mut self, shader: Option<Shader>) {
        self.shader = shader;
    }

    /// Replaces the fixed-function state.
    pub fn set_render_state(&mut self, state: RenderState) {
        self.render_state = state;
    }

    /// Sets a custom uniform, overwriting a previous value with the same name.
    pub fn set_uniform(&mut self, name: String, value: UniformValue) {
        match self.uniforms.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.uniforms.push((name, value)),
        }
    }

    /// Binds `texture` to `sampler`, or unbinds the sampler when `None`.
    pub fn set_texture(&mut self, sampler: String, texture: Option<TextureId>) {
        let slot = self.textures.iter().position(|(n, _)| *n == sampler);
        match (slot, texture) {
            (Some(index), Some(texture)) => self.textures[index].1 = texture,
            (Some(index), None) => {
                self.textures.remove(index);
            }
            (None, Some(texture)) => self.textures.push((sampler, texture)),
            (None, None) => {}
        }
    }

    /// Adds `delta` once per frame, however many instructions draw the
    /// renderer in that frame.
    pub(crate) fn advance(&mut self, frame: u64, delta: f32) -> f32 {
        if self.advanced_on != Some(frame) {
            self.advanced_on = Some(frame);
            self.elapsed += delta;
        }
        self.elapsed
    }
}
