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

use std::sync::Arc;
use vellum_core::renderer::{GraphicsContext, ShaderError};
use vellum_infra::{ChannelShaderExporter, HeadlessContext};
use vellum_render::{ContextState, ProgramCache, Shader};

fn flat() -> Shader {
    Shader::new("flat", "void main() {}", "void main() { gl_FragColor = vec4(1.0); }")
}

fn live_state() -> ContextState {
    let mut state = ContextState::new();
    state.created();
    state
}

#[test]
fn identical_sources_compile_once() {
    let context = HeadlessContext::new();
    let state = live_state();
    let mut cache = ProgramCache::new();

    let first = cache.get_or_compile(&context, &state, &flat()).unwrap();
    let relabeled = Shader::new("other", "void main() {}", "void main() { gl_FragColor = vec4(1.0); }");
    let second = cache.get_or_compile(&context, &state, &relabeled).unwrap();

    assert_eq!(first, second);
    assert_eq!(context.compile_attempts(), 1);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn defines_compile_a_separate_variant() {
    let context = HeadlessContext::new();
    let state = live_state();
    let mut cache = ProgramCache::new();

    let base = cache.get_or_compile(&context, &state, &flat()).unwrap();
    let variant = cache
        .get_or_compile(&context, &state, &flat().with_define("TEXTURED"))
        .unwrap();

    assert_ne!(base, variant);
    assert_eq!(cache.compiled(), 2);
}

#[test]
fn nothing_compiles_without_a_context() {
    let context = HeadlessContext::new();
    let mut cache = ProgramCache::new();

    let result = cache.get_or_compile(&context, &ContextState::new(), &flat());

    assert_eq!(result, Err(ShaderError::ContextUnavailable));
    assert_eq!(context.compile_attempts(), 0);
}

#[test]
fn failures_are_remembered_until_the_context_changes() {
    let context = HeadlessContext::new();
    let mut state = live_state();
    let mut cache = ProgramCache::new();
    let empty = Shader::new("empty", "void main() {}", "");

    let first = cache.get_or_compile(&context, &state, &empty).unwrap_err();
    let second = cache.get_or_compile(&context, &state, &empty).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(context.compile_attempts(), 1);

    state.destroyed();
    cache.invalidate();
    state.created();
    assert!(cache.get_or_compile(&context, &state, &empty).is_err());
    assert_eq!(context.compile_attempts(), 2);
}

#[test]
fn compiled_binaries_are_exported_with_their_key() {
    let context = HeadlessContext::new();
    let state = live_state();
    let (exporter, binaries) = ChannelShaderExporter::new();
    let mut cache = ProgramCache::with_exporter(Arc::new(exporter));

    let shader = flat();
    cache.get_or_compile(&context, &state, &shader).unwrap();
    cache.get_or_compile(&context, &state, &shader).unwrap();

    let exported: Vec<_> = binaries.try_iter().collect();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].key, shader.key());
    assert_eq!(exported[0].label, "flat");
    assert!(exported[0].data.starts_with(b"VLMB"));
}

#[test]
fn export_failure_does_not_fail_compilation() {
    let context = HeadlessContext::new();
    let state = live_state();
    let (exporter, binaries) = ChannelShaderExporter::new();
    drop(binaries);
    let mut cache = ProgramCache::with_exporter(Arc::new(exporter));

    assert!(cache.get_or_compile(&context, &state, &flat()).is_ok());
}

#[test]
fn stale_programs_are_recompiled_without_destroying_them() {
    let context = HeadlessContext::new();
    let mut state = live_state();
    let mut cache = ProgramCache::new();
    let before = cache.get_or_compile(&context, &state, &flat()).unwrap();

    state.destroyed();
    cache.invalidate();
    context.reset();
    state.created();

    let after = cache.get_or_compile(&context, &state, &flat()).unwrap();
    assert_ne!(before, after);
    assert_eq!(context.invalid_handle_uses(), 0);
}

#[test]
fn release_all_destroys_live_programs() {
    let context = HeadlessContext::new();
    let state = live_state();
    let mut cache = ProgramCache::new();
    cache.get_or_compile(&context, &state, &flat()).unwrap();
    cache
        .get_or_compile(&context, &state, &flat().with_define("FOG"))
        .unwrap();

    cache.release_all(&context, &state);

    assert!(cache.is_empty());
    assert_eq!(context.live_programs(), 0);
}

#[test]
fn cache_accepts_any_context_implementation() {
    let context: Arc<dyn GraphicsContext> = Arc::new(HeadlessContext::new());
    let state = live_state();
    let mut cache = ProgramCache::new();
    let shader = flat();
    cache.get_or_compile(context.as_ref(), &state, &shader).unwrap();
    assert!(cache.contains(&state, &shader.key()));
}
