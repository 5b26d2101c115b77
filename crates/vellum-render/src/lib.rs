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

//! # Vellum Render
//!
//! The render-thread half of a double-buffered rendering pipeline.
//!
//! A logic thread describes the scene through [`RenderMessage`]s and a
//! per-frame [`InstructionStream`], both submitted through a [`FrameSender`].
//! On the render thread, a [`RenderManager`] drains those messages into its
//! [`ResourceRegistry`] and [`TextureCache`], replays the instructions against a
//! [`GraphicsContext`](vellum_core::renderer::GraphicsContext), and reports
//! completed GPU work through the [`PostProcessDispatcher`].
//!
//! The graphics context may disappear at any time. GPU handles are tagged
//! with the context generation that created them and are recreated lazily
//! after the context comes back.

#![warn(missing_docs)]

/// Reports misuse of the message protocol by the logic thread.
///
/// Fatal in debug builds. In release builds the offending message is logged
/// and ignored.
macro_rules! contract_violation {
    ($($arg:tt)+) => {{
        debug_assert!(false, $($arg)+);
        log::error!("[ContractViolation] {}", format_args!($($arg)+));
    }};
}

pub mod config;
pub mod context_state;
pub mod dispatcher;
pub mod executor;
pub mod frame_buffer;
pub mod geometry;
pub mod instruction;
pub mod manager;
pub mod message;
pub mod program_cache;
pub mod queue;
pub mod registry;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod tracker;

pub use config::{ConfigError, RenderConfig};
pub use context_state::{ContextPhase, ContextState, Generational};
pub use dispatcher::{CompletionStatus, PostProcessDispatcher, PostProcessEvent};
pub use executor::FrameState;
pub use frame_buffer::FrameBuffer;
pub use geometry::{AttributeBuffer, BoundBuffer, BufferBinding, Drawable, Geometry};
pub use instruction::{Camera, Instruction, InstructionStream, RenderTarget};
pub use manager::{RenderManager, RenderStatus};
pub use message::{MessageBatch, RenderMessage};
pub use program_cache::ProgramCache;
pub use queue::{frame_channel, FrameQueueClosed, FrameReceiver, FrameSender};
pub use registry::ResourceRegistry;
pub use renderer::Renderer;
pub use shader::Shader;
pub use texture::{Texture, TextureCache};
pub use tracker::{RenderTracker, TrackerMode, TrackerState};
