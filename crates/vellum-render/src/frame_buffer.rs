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

//! Offscreen render targets.

use crate::context_state::{ContextState, Generational};
use vellum_core::renderer::{FrameBufferHandle, GraphicsContext, ResourceError};
use vellum_core::FrameBufferId;

/// An offscreen color target, created on the GPU the first time an
/// instruction renders into it.
#[derive(Debug)]
pub struct FrameBuffer {
    id: FrameBufferId,
    width: u32,
    height: u32,
    gpu: Option<Generational<FrameBufferHandle>>,
}

impl FrameBuffer {
    /// Describes a frame buffer of the given size.
    pub fn new(id: FrameBufferId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            gpu: None,
        }
    }

    /// The frame buffer's identifier.
    pub fn id(&self) -> FrameBufferId {
        self.id
    }

    /// Size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the live handle, creating the GPU object if needed.
    pub fn ensure(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<FrameBufferHandle, ResourceError> {
        if let Some(handle) = state.resolve(self.gpu.as_ref()) {
            return Ok(handle);
        }
        let handle = context.create_frame_buffer(self.width, self.height)?;
        self.gpu = Some(state.stamp(handle));
        Ok(handle)
    }

    /// Returns `true` if the GPU object exists in the live context.
    pub fn is_resident(&self, state: &ContextState) -> bool {
        state.resolve(self.gpu.as_ref()).is_some()
    }

    /// Destroys the GPU object if it belongs to the live context.
    pub fn release(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        if let Some(handle) = state.resolve(self.gpu.take().as_ref()) {
            context.destroy_frame_buffer(handle);
        }
    }

    /// Forgets the GPU handle without touching the context.
    pub fn invalidate(&mut self) {
        self.gpu = None;
    }
}
