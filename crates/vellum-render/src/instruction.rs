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

//! Per-frame draw instructions produced by the logic thread.

use vellum_core::{FrameBufferId, LinearRgba, Mat4, Rect, RendererId, TrackerId};

/// View and projection matrices for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    /// World to view transform.
    pub view: Mat4,
    /// View to clip transform.
    pub projection: Mat4,
}

/// Where an instruction's draws land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderTarget {
    /// The surface.
    #[default]
    Default,
    /// A registered offscreen frame buffer.
    Offscreen(FrameBufferId),
}

/// One immutable unit of work: a list of renderers drawn with shared
/// viewport, clip and camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Viewport rectangle.
    pub viewport: Rect,
    /// Scissor rectangle, if clipping is enabled.
    pub clip: Option<Rect>,
    /// Camera matrices.
    pub camera: Camera,
    /// Render target.
    pub target: RenderTarget,
    /// Clear color for an offscreen target. Ignored for the default target,
    /// which is cleared once per frame with the background color.
    pub clear_color: Option<LinearRgba>,
    /// Renderers drawn in order.
    pub renderers: Vec<RendererId>,
    /// Tracker armed after the renderers are drawn.
    pub tracker: Option<TrackerId>,
}

impl Instruction {
    /// An instruction drawing nothing into `viewport` on the default target.
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            clip: None,
            camera: Camera::default(),
            target: RenderTarget::Default,
            clear_color: None,
            renderers: Vec::new(),
            tracker: None,
        }
    }

    /// Enables clipping.
    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Sets the camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Renders into an offscreen frame buffer, optionally clearing it first.
    pub fn with_offscreen(mut self, target: FrameBufferId, clear: Option<LinearRgba>) -> Self {
        self.target = RenderTarget::Offscreen(target);
        self.clear_color = clear;
        self
    }

    /// Appends a renderer.
    pub fn with_renderer(mut self, renderer: RendererId) -> Self {
        self.renderers.push(renderer);
        self
    }

    /// Appends several renderers.
    pub fn with_renderers(mut self, renderers: impl IntoIterator<Item = RendererId>) -> Self {
        self.renderers.extend(renderers);
        self
    }

    /// Arms `tracker` once this instruction has been recorded.
    pub fn with_tracker(mut self, tracker: TrackerId) -> Self {
        self.tracker = Some(tracker);
        self
    }
}

/// The instructions of one logic frame. Replaced wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstructionStream {
    frame: u64,
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    /// Wraps the instructions produced for logic frame `frame`.
    pub fn new(frame: u64, instructions: Vec<Instruction>) -> Self {
        Self {
            frame,
            instructions,
        }
    }

    /// The logic frame that produced this stream.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Instructions in replay order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if there is nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
