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

//! # Vellum Core
//!
//! Foundational crate containing the math types, resource identifiers and the
//! graphics-context contract shared by the render engine and its backends.

#![warn(missing_docs)]

pub mod ids;
pub mod math;
pub mod renderer;

pub use ids::{
    AttributeBufferId, FrameBufferId, GeometryId, IdGenerator, RendererId, ResourceId, TextureId,
    TrackerId,
};
pub use math::{LinearRgba, Mat4, Rect};
