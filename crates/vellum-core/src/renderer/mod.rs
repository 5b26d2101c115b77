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

//! Provides the backend-agnostic rendering contracts for Vellum.
//!
//! This module defines the "common language" between the render engine and a
//! concrete graphics backend: the [`GraphicsContext`] trait, the opaque GPU
//! handle types it hands out, the plain-data descriptions of buffers, render
//! state and draw calls, and the error types a backend may report.
//!
//! The engine in `vellum-render` only ever talks to the GPU through these
//! types; backends such as the headless recorder in `vellum-infra` implement
//! them.

pub mod api;
pub mod error;
pub mod stats;
pub mod traits;

pub use self::api::*;
pub use self::error::{ExportError, ResourceError, ShaderError};
pub use self::stats::RenderStats;
pub use self::traits::{GraphicsContext, ShaderBinary, ShaderExporter};
