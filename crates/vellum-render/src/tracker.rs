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

//! GPU completion trackers.
//!
//! A tracker is armed when an instruction that references it has been
//! recorded: a fence is inserted behind that instruction's draws. Every frame
//! the executor polls armed trackers, and each satisfied transition produces
//! exactly one post-process event.

use crate::context_state::{ContextState, Generational};
use crate::dispatcher::CompletionStatus;
use vellum_core::renderer::{FenceHandle, GraphicsContext, ResourceError};
use vellum_core::{ResourceId, TrackerId};

/// What happens to a tracker once it has reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerMode {
    /// Reports once, then is released by the engine.
    #[default]
    OneShot,
    /// Stays registered and reports again every time it is re-armed.
    Repeating,
}

/// Where a tracker is in its arm/signal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not armed.
    Idle,
    /// A fence is in flight.
    Pending,
    /// The fence completed and the event was emitted.
    Signaled,
}

/// Associates a GPU fence with an external resource.
#[derive(Debug)]
pub struct RenderTracker {
    id: TrackerId,
    resource: ResourceId,
    mode: TrackerMode,
    state: TrackerState,
    fence: Option<Generational<FenceHandle>>,
}

impl RenderTracker {
    /// Creates an idle tracker reporting on `resource`.
    pub fn new(id: TrackerId, resource: ResourceId, mode: TrackerMode) -> Self {
        Self {
            id,
            resource,
            mode,
            state: TrackerState::Idle,
            fence: None,
        }
    }

    /// The tracker's identifier.
    pub fn id(&self) -> TrackerId {
        self.id
    }

    /// The resource reported upstream.
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Retention policy.
    pub fn mode(&self) -> TrackerMode {
        self.mode
    }

    /// Current state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// A one-shot tracker that already reported is done for good.
    pub fn is_finished(&self) -> bool {
        self.mode == TrackerMode::OneShot && self.state == TrackerState::Signaled
    }

    /// Inserts a fence behind the commands recorded so far.
    ///
    /// Re-arming a pending tracker replaces its fence. Arming a finished
    /// one-shot tracker does nothing.
    pub fn arm(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<(), ResourceError> {
        if self.is_finished() {
            log::debug!("[RenderTracker] {} already reported, not re-arming", self.id);
            return Ok(());
        }
        self.release(context, state);
        let fence = context.insert_fence()?;
        self.fence = Some(state.stamp(fence));
        self.state = TrackerState::Pending;
        Ok(())
    }

    /// Checks the fence. Returns the status to report when this call observed
    /// the transition out of `Pending`.
    ///
    /// A fence from an older context generation can never signal, so it is
    /// reported as failed.
    pub fn poll(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Option<CompletionStatus> {
        if self.state != TrackerState::Pending {
            return None;
        }
        let status = match state.resolve(self.fence.as_ref()) {
            Some(fence) if context.is_fence_signaled(fence) => {
                context.destroy_fence(fence);
                CompletionStatus::Completed
            }
            Some(_) => return None,
            None => CompletionStatus::Failed,
        };
        self.fence = None;
        self.state = TrackerState::Signaled;
        Some(status)
    }

    /// Destroys the fence if it belongs to the live context.
    pub fn release(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        if let Some(fence) = state.resolve(self.fence.take().as_ref()) {
            context.destroy_fence(fence);
        }
    }
}
