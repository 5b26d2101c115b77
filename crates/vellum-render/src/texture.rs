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
//! Sampled textures and the cache that owns them.
//!
//! Texels stay on the CPU side until a renderer that samples the texture is
//! first drawn. The GPU copy is tagged with the context generation, dropped
//! without GPU calls when the context goes away and uploaded again on the
//! next draw.

use crate::context_state::{ContextState, Generational};
use ahash::AHashMap;
use vellum_core::renderer::{GraphicsContext, ResourceError, TextureDescriptor, TextureHandle};
use vellum_core::TextureId;

/// A two-dimensional texture with its CPU texels and GPU mirror.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    descriptor: TextureDescriptor,
    pixels: Vec<u8>,
    gpu: Option<Generational<TextureHandle>>,
    dirty: bool,
}

impl Texture {
    /// Describes a texture. `pixels` holds tightly packed rows.
    pub fn new(id: TextureId, descriptor: TextureDescriptor, pixels: Vec<u8>) -> Self {
        Self {
            id,
            descriptor,
            pixels,
            gpu: None,
            dirty: true,
        }
    }

    /// The texture's identifier.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Size, format and filtering.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// CPU-side texels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns `true` once the texels changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns `true` if the GPU copy exists in the live context.
    pub fn is_resident(&self, state: &ContextState) -> bool {
        state.resolve(self.gpu.as_ref()).is_some()
    }

    /// Replaces the texels. They are uploaded at the next draw.
    pub fn set_pixels(&mut self, pixels: Vec<u8>) {
        self.pixels = pixels;
        self.dirty = true;
    }

    /// Returns the live handle, creating or refreshing the GPU copy if needed.
    pub fn ensure(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<TextureHandle, ResourceError> {
        match state.resolve(self.gpu.as_ref()) {
            Some(handle) if !self.dirty => Ok(handle),
            Some(handle) => {
                context.update_texture(handle, &self.pixels)?;
                self.dirty = false;
                Ok(handle)
            }
            None => {
                let handle = context.create_texture(&self.descriptor, &self.pixels)?;
                self.gpu = Some(state.stamp(handle));
                self.dirty = false;
                Ok(handle)
            }
        }
    }

    /// Destroys the GPU copy if it belongs to the live context.
    pub fn release(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        if let Some(handle) = state.resolve(self.gpu.take().as_ref()) {
            context.destroy_texture(handle);
        }
    }

    /// Forgets the GPU handle without touching the context.
    pub fn invalidate(&mut self) {
        self.gpu = None;
    }
}

/// Owns every texture renderers may sample.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: AHashMap<TextureId, Texture>,
}

impl TextureCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a texture.
    pub fn add(&mut self, texture: Texture) {
        let id = texture.id();
        if self.textures.contains_key(&id) {
            contract_violation!("{id} is already registered");
            return;
        }
        self.textures.insert(id, texture);
    }

    /// Removes and returns a texture so its GPU copy can be released.
    pub fn remove(&mut self, id: TextureId) -> Option<Texture> {
        let removed = self.textures.remove(&id);
        if removed.is_none() {
            contract_violation!("cannot remove {id}: not registered");
        }
        removed
    }

    /// Replaces the texels of a registered texture.
    pub fn update(&mut self, id: TextureId, pixels: Vec<u8>) {
        match self.textures.get_mut(&id) {
            Some(texture) => texture.set_pixels(pixels),
            None => contract_violation!("cannot update {id}: not registered"),
        }
    }

    /// Looks up a texture.
    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(&id)
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns `true` if no texture is registered.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Number of textures with a GPU copy in the live context.
    pub fn resident_count(&self, state: &ContextState) -> usize {
        self.textures
            .values()
            .filter(|t| t.is_resident(state))
            .count()
    }

    /// Forgets every GPU handle without touching the context.
    pub fn invalidate(&mut self) {
        for texture in self.textures.values_mut() {
            texture.invalidate();
        }
    }

    /// Destroys every GPU copy that belongs to the live context.
    pub fn release_all(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        for texture in self.textures.values_mut() {
            texture.release(context, state);
        }
    }
}
