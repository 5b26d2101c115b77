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

use crate::renderer::api::ProgramKey;
use crate::renderer::error::ExportError;
use std::fmt::Debug;

/// A compiled program binary handed to an external persistence sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBinary {
    /// The program variant the binary belongs to.
    pub key: ProgramKey,
    /// Label of the originating shader.
    pub label: String,
    /// Driver-specific binary blob.
    pub data: Vec<u8>,
}

/// Receives compiled program binaries for optional persistence.
///
/// Export is fire-and-forget from the render thread's point of view: an
/// implementation must not block, and a returned error is only logged.
pub trait ShaderExporter: Send + Sync + Debug {
    /// Forwards one binary to the sink.
    fn export(&self, binary: ShaderBinary) -> Result<(), ExportError>;
}
