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

//! # Vellum Infra
//!
//! Concrete implementations of the contracts defined in `vellum-core`.
//!
//! - [`graphics::headless::HeadlessContext`] is a [`GraphicsContext`] that
//!   records every call instead of talking to a driver. It backs the sandbox
//!   and the integration tests.
//! - [`shader_cache`] holds [`ShaderExporter`] sinks that persist or forward
//!   compiled program binaries.
//!
//! [`GraphicsContext`]: vellum_core::renderer::GraphicsContext
//! [`ShaderExporter`]: vellum_core::renderer::ShaderExporter

#![warn(missing_docs)]

pub mod graphics;
pub mod shader_cache;

pub use graphics::headless::{FenceMode, GpuCommand, HeadlessContext};
pub use shader_cache::{ChannelShaderExporter, DirectoryShaderExporter};
