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

//! Compiled program cache.

use crate::context_state::{ContextState, Generational};
use crate::shader::Shader;
use ahash::AHashMap;
use std::sync::Arc;
use vellum_core::renderer::{
    GraphicsContext, ProgramHandle, ProgramKey, ShaderBinary, ShaderError, ShaderExporter,
};

/// Deduplicates compiled programs by [`ProgramKey`].
///
/// Entries are stamped with the context generation that produced them; after
/// a context loss the cache is invalidated and refilled lazily. Compilation
/// failures are remembered for the lifetime of the current context so a
/// broken shader is not recompiled every frame.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: AHashMap<ProgramKey, Generational<ProgramHandle>>,
    failures: AHashMap<ProgramKey, ShaderError>,
    exporter: Option<Arc<dyn ShaderExporter>>,
    hits: u64,
    compiled: u64,
}

impl ProgramCache {
    /// Creates an empty cache without an exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache that forwards compiled binaries to `exporter`.
    pub fn with_exporter(exporter: Arc<dyn ShaderExporter>) -> Self {
        Self {
            exporter: Some(exporter),
            ..Self::default()
        }
    }

    /// Replaces the binary sink.
    pub fn set_exporter(&mut self, exporter: Option<Arc<dyn ShaderExporter>>) {
        self.exporter = exporter;
    }

    /// Returns `true` if a binary sink is registered.
    pub fn has_exporter(&self) -> bool {
        self.exporter.is_some()
    }

    /// Returns the program for `shader`, compiling it on a miss.
    pub fn get_or_compile(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
        shader: &Shader,
    ) -> Result<ProgramHandle, ShaderError> {
        if !state.is_valid() {
            return Err(ShaderError::ContextUnavailable);
        }
        let key = shader.key();
        if let Some(handle) = state.resolve(self.programs.get(&key)) {
            self.hits += 1;
            return Ok(handle);
        }
        if let Some(err) = self.failures.get(&key) {
            return Err(err.clone());
        }

        let source = shader.expanded_source();
        match context.compile_program(&source) {
            Ok(compiled) => {
                self.compiled += 1;
                log::debug!("[ProgramCache] Compiled '{}' as {:?}", shader.label(), key);
                self.programs.insert(key, state.stamp(compiled.handle));
                if let (Some(exporter), Some(data)) = (&self.exporter, compiled.binary) {
                    let binary = ShaderBinary {
                        key,
                        label: shader.label().to_string(),
                        data,
                    };
                    if let Err(err) = exporter.export(binary) {
                        log::warn!("[ProgramCache] Export of '{}' failed: {err}", shader.label());
                    }
                }
                Ok(compiled.handle)
            }
            Err(err) => {
                log::warn!("[ProgramCache] {err}");
                self.failures.insert(key, err.clone());
                Err(err)
            }
        }
    }

    /// Returns `true` if a live program exists for `key`.
    pub fn contains(&self, state: &ContextState, key: &ProgramKey) -> bool {
        state.resolve(self.programs.get(key)).is_some()
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of successful compilations.
    pub fn compiled(&self) -> u64 {
        self.compiled
    }

    /// Number of remembered compilation failures.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Forgets everything without touching the context. Called when the
    /// context is destroyed.
    pub fn invalidate(&mut self) {
        log::debug!(
            "[ProgramCache] Invalidating {} programs and {} failures",
            self.programs.len(),
            self.failures.len()
        );
        self.programs.clear();
        self.failures.clear();
    }

    /// Destroys every program that belongs to the live context and empties
    /// the cache.
    pub fn release_all(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        for cached in self.programs.values() {
            if let Some(handle) = state.resolve(Some(cached)) {
                context.destroy_program(handle);
            }
        }
        self.invalidate();
    }
}
