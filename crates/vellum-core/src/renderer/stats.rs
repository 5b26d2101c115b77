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

//! Per-frame statistics produced by the render engine.

/// A collection of statistics for a single `render()` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// A sequential counter for render calls.
    pub frame_number: u64,
    /// Number of lifecycle messages applied during the drain step.
    pub messages_applied: u32,
    /// Number of instructions replayed.
    pub instructions: u32,
    /// Number of draw calls issued.
    pub draw_calls: u32,
    /// Number of renderer draws skipped because a resource was incomplete.
    pub skipped_draws: u32,
    /// Number of programs compiled this frame (cache misses).
    pub programs_compiled: u32,
    /// Number of post-process events emitted by trackers.
    pub tracker_events: u32,
    /// CPU time spent inside `render()`, in milliseconds.
    pub cpu_time_ms: f32,
}
