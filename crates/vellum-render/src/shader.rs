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

//! Shader descriptions and the content key used to deduplicate programs.

use vellum_core::renderer::{ProgramKey, ShaderSource};

/// Uniform receiving the instruction's view matrix.
pub const UNIFORM_VIEW_MATRIX: &str = "uViewMatrix";
/// Uniform receiving the instruction's projection matrix.
pub const UNIFORM_PROJECTION_MATRIX: &str = "uProjection";
/// Uniform receiving the renderer's accumulated elapsed time in seconds.
pub const UNIFORM_ELAPSED_TIME: &str = "uElapsedTime";

/// A shader as sent by the logic thread: sources plus variant defines.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    source: ShaderSource,
    defines: Vec<String>,
    key: ProgramKey,
}

impl Shader {
    /// Creates a shader without variant defines.
    pub fn new(
        label: impl Into<String>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        let source = ShaderSource {
            label: label.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        };
        let key = compute_key(&source, &[]);
        Self {
            source,
            defines: Vec::new(),
            key,
        }
    }

    /// Adds a `#define` prepended to both stages. Changes the program key.
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.push(define.into());
        self.key = compute_key(&self.source, &self.defines);
        self
    }

    /// The program key.
    pub fn key(&self) -> ProgramKey {
        self.key
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.source.label
    }

    /// Variant defines in insertion order.
    pub fn defines(&self) -> &[String] {
        &self.defines
    }

    /// Sources with the variant defines expanded, as handed to the backend.
    pub fn expanded_source(&self) -> ShaderSource {
        if self.defines.is_empty() {
            return self.source.clone();
        }
        let prelude: String = self
            .defines
            .iter()
            .map(|d| format!("#define {d}\n"))
            .collect();
        ShaderSource {
            label: self.source.label.clone(),
            vertex: format!("{prelude}{}", self.source.vertex),
            fragment: format!("{prelude}{}", self.source.fragment),
        }
    }
}

fn compute_key(source: &ShaderSource, defines: &[String]) -> ProgramKey {
    let mut hasher = blake3::Hasher::new();
    // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
    for part in [source.vertex.as_str(), source.fragment.as_str()]
        .into_iter()
        .chain(defines.iter().map(String::as_str))
    {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    ProgramKey(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sources_share_a_key_regardless_of_label() {
        let a = Shader::new("a", "void main(){}", "void main(){}");
        let b = Shader::new("b", "void main(){}", "void main(){}");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn defines_produce_a_distinct_variant() {
        let base = Shader::new("flat", "vs", "fs");
        let textured = base.clone().with_define("TEXTURED");
        assert_ne!(base.key(), textured.key());
        assert!(textured.expanded_source().vertex.starts_with("#define TEXTURED\n"));
        assert_eq!(base.expanded_source().vertex, "vs");
    }

    #[test]
    fn stage_boundaries_are_part_of_the_key() {
        let a = Shader::new("x", "ab", "c");
        let b = Shader::new("x", "a", "bc");
        assert_ne!(a.key(), b.key());
    }
}
