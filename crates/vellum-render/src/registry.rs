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

//! Ownership of every render-side object.
//!
//! The registry is plain bookkeeping: it never talks to the GPU. Removals hand
//! the object back so the caller can release its GPU mirror.

use crate::context_state::ContextState;
use crate::frame_buffer::FrameBuffer;
use crate::geometry::{AttributeBuffer, BoundBuffer, BufferBinding, Geometry};
use crate::renderer::Renderer;
use crate::tracker::RenderTracker;
use ahash::AHashMap;
use vellum_core::renderer::{BufferUsage, GraphicsContext};
use vellum_core::{AttributeBufferId, FrameBufferId, GeometryId, RendererId, TrackerId};

/// Owns renderers, geometries, trackers and offscreen frame buffers.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    renderers: AHashMap<RendererId, Renderer>,
    geometries: AHashMap<GeometryId, Geometry>,
    frame_buffers: AHashMap<FrameBufferId, FrameBuffer>,
    trackers: Vec<RenderTracker>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Renderers ---

    /// Takes ownership of a renderer.
    pub fn add_renderer(&mut self, renderer: Renderer) {
        let id = renderer.id();
        if self.renderers.contains_key(&id) {
            contract_violation!("{id} is already registered");
            return;
        }
        self.renderers.insert(id, renderer);
    }

    /// Removes and returns a renderer.
    pub fn remove_renderer(&mut self, id: RendererId) -> Option<Renderer> {
        let removed = self.renderers.remove(&id);
        if removed.is_none() {
            contract_violation!("cannot remove {id}: not registered");
        }
        removed
    }

    /// Looks up a renderer.
    pub fn renderer(&self, id: RendererId) -> Option<&Renderer> {
        self.renderers.get(&id)
    }

    /// Looks up a renderer for modification. A missing id is a contract
    /// violation.
    pub fn renderer_mut(&mut self, id: RendererId) -> Option<&mut Renderer> {
        let renderer = self.renderers.get_mut(&id);
        if renderer.is_none() {
            contract_violation!("{id} is not registered");
        }
        renderer
    }

    /// Number of registered renderers.
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    // --- Geometries ---

    /// Takes ownership of a geometry.
    pub fn add_geometry(&mut self, geometry: Geometry) {
        let id = geometry.id();
        if self.geometries.contains_key(&id) {
            contract_violation!("{id} is already registered");
            return;
        }
        self.geometries.insert(id, geometry);
    }

    /// Removes and returns a geometry.
    pub fn remove_geometry(&mut self, id: GeometryId) -> Option<Geometry> {
        let removed = self.geometries.remove(&id);
        if removed.is_none() {
            contract_violation!("cannot remove {id}: not registered");
        }
        removed
    }

    /// Looks up a geometry.
    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    /// Number of registered geometries.
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Attaches a buffer to a registered geometry.
    pub fn add_attribute_buffer(
        &mut self,
        geometry: GeometryId,
        buffer: AttributeBuffer,
        binding: BufferBinding,
        usage: BufferUsage,
    ) {
        let Some(target) = self.geometries.get_mut(&geometry) else {
            contract_violation!("cannot attach {} to {geometry}: not registered", buffer.id);
            return;
        };
        let id = buffer.id;
        if !target.add_buffer(buffer, binding, usage) {
            contract_violation!(
                "cannot attach {id} to {geometry}: id already attached or second index buffer"
            );
        }
    }

    /// Detaches a buffer and returns it.
    pub fn remove_attribute_buffer(
        &mut self,
        geometry: GeometryId,
        buffer: AttributeBufferId,
    ) -> Option<BoundBuffer> {
        let removed = self
            .geometries
            .get_mut(&geometry)
            .and_then(|g| g.remove_buffer(buffer));
        if removed.is_none() {
            contract_violation!("cannot remove {buffer} from {geometry}: not attached");
        }
        removed
    }

    /// Replaces the contents of an attached buffer.
    pub fn update_attribute_buffer(
        &mut self,
        geometry: GeometryId,
        buffer: AttributeBufferId,
        data: Vec<u8>,
    ) {
        let updated = self
            .geometries
            .get_mut(&geometry)
            .is_some_and(|g| g.update_buffer(buffer, data));
        if !updated {
            contract_violation!("cannot update {buffer} on {geometry}: not attached");
        }
    }

    /// Borrows a renderer together with the geometry it draws.
    pub(crate) fn renderer_and_geometry(
        &mut self,
        id: RendererId,
    ) -> Option<(&mut Renderer, Option<&mut Geometry>)> {
        let renderer = self.renderers.get_mut(&id)?;
        let geometry = self.geometries.get_mut(&renderer.geometry());
        Some((renderer, geometry))
    }

    // --- Frame buffers ---

    /// Takes ownership of an offscreen frame buffer.
    pub fn add_frame_buffer(&mut self, frame_buffer: FrameBuffer) {
        let id = frame_buffer.id();
        if self.frame_buffers.contains_key(&id) {
            contract_violation!("{id} is already registered");
            return;
        }
        self.frame_buffers.insert(id, frame_buffer);
    }

    /// Removes and returns a frame buffer.
    pub fn remove_frame_buffer(&mut self, id: FrameBufferId) -> Option<FrameBuffer> {
        let removed = self.frame_buffers.remove(&id);
        if removed.is_none() {
            contract_violation!("cannot remove {id}: not registered");
        }
        removed
    }

    /// Looks up a frame buffer.
    pub fn frame_buffer(&self, id: FrameBufferId) -> Option<&FrameBuffer> {
        self.frame_buffers.get(&id)
    }

    pub(crate) fn frame_buffer_mut(&mut self, id: FrameBufferId) -> Option<&mut FrameBuffer> {
        self.frame_buffers.get_mut(&id)
    }

    // --- Trackers ---

    /// Takes ownership of a tracker.
    pub fn add_tracker(&mut self, tracker: RenderTracker) {
        let id = tracker.id();
        if self.tracker(id).is_some() {
            contract_violation!("{id} is already registered");
            return;
        }
        self.trackers.push(tracker);
    }

    /// Removes and returns a tracker.
    ///
    /// One-shot trackers are dropped by the engine once they report, so an
    /// unknown id is not a protocol error here and simply returns `None`.
    pub fn remove_tracker(&mut self, id: TrackerId) -> Option<RenderTracker> {
        let Some(index) = self.trackers.iter().position(|t| t.id() == id) else {
            log::debug!("[ResourceRegistry] {id} already retired or never registered");
            return None;
        };
        Some(self.trackers.remove(index))
    }

    /// Looks up a tracker.
    pub fn tracker(&self, id: TrackerId) -> Option<&RenderTracker> {
        self.trackers.iter().find(|t| t.id() == id)
    }

    /// Number of live trackers.
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    pub(crate) fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut RenderTracker> {
        self.trackers.iter_mut().find(|t| t.id() == id)
    }

    pub(crate) fn trackers_mut(&mut self) -> &mut [RenderTracker] {
        &mut self.trackers
    }

    /// Drops finished one-shot trackers. Nothing about them is kept.
    pub(crate) fn retire_finished_trackers(&mut self) {
        self.trackers.retain(|t| !t.is_finished());
    }

    // --- GPU lifetime ---

    /// Forgets every cached GPU handle without touching the context.
    pub fn invalidate(&mut self) {
        for geometry in self.geometries.values_mut() {
            geometry.invalidate();
        }
        for frame_buffer in self.frame_buffers.values_mut() {
            frame_buffer.invalidate();
        }
    }

    /// Destroys every GPU object that belongs to the live context.
    pub fn release_all(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        for geometry in self.geometries.values_mut() {
            geometry.release(context, state);
        }
        for frame_buffer in self.frame_buffers.values_mut() {
            frame_buffer.release(context, state);
        }
        for tracker in &mut self.trackers {
            tracker.release(context, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerMode;
    use vellum_core::renderer::{IndexFormat, VertexFormat, VertexLayout};
    use vellum_core::ResourceId;

    fn vertex_binding() -> BufferBinding {
        BufferBinding::Vertex(VertexLayout::packed([("aPosition", VertexFormat::Float32x2)]))
    }

    #[test]
    fn renderer_count_tracks_adds_and_removes() {
        let mut registry = ResourceRegistry::new();
        for i in 1..=3 {
            registry.add_renderer(Renderer::new(RendererId(i), GeometryId(1)));
        }
        assert!(registry.remove_renderer(RendererId(2)).is_some());
        assert_eq!(registry.renderer_count(), 2);
        assert!(registry.renderer(RendererId(2)).is_none());
    }

    #[test]
    fn buffers_attach_to_registered_geometry() {
        let mut registry = ResourceRegistry::new();
        registry.add_geometry(Geometry::new(GeometryId(1)));
        registry.add_attribute_buffer(
            GeometryId(1),
            AttributeBuffer::new(AttributeBufferId(5), vec![0; 16]),
            vertex_binding(),
            BufferUsage::Static,
        );
        let geometry = registry.geometry(GeometryId(1)).unwrap();
        assert!(geometry.is_complete());

        let removed = registry.remove_attribute_buffer(GeometryId(1), AttributeBufferId(5));
        assert_eq!(removed.map(|b| b.id()), Some(AttributeBufferId(5)));
        assert!(!registry.geometry(GeometryId(1)).unwrap().is_complete());
    }

    #[test]
    fn renderer_borrows_its_geometry() {
        let mut registry = ResourceRegistry::new();
        registry.add_geometry(Geometry::new(GeometryId(7)));
        registry.add_renderer(Renderer::new(RendererId(1), GeometryId(7)));
        registry.add_renderer(Renderer::new(RendererId(2), GeometryId(8)));

        let (_, geometry) = registry.renderer_and_geometry(RendererId(1)).unwrap();
        assert_eq!(geometry.map(|g| g.id()), Some(GeometryId(7)));
        let (_, missing) = registry.renderer_and_geometry(RendererId(2)).unwrap();
        assert!(missing.is_none());
        assert!(registry.renderer_and_geometry(RendererId(3)).is_none());
    }

    #[test]
    fn removing_an_unknown_tracker_is_accepted() {
        let mut registry = ResourceRegistry::new();
        registry.add_tracker(RenderTracker::new(
            TrackerId(1),
            ResourceId(10),
            TrackerMode::Repeating,
        ));

        assert!(registry.remove_tracker(TrackerId(1)).is_some());
        assert!(registry.remove_tracker(TrackerId(2)).is_none());
        assert_eq!(registry.tracker_count(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not registered")]
    fn removing_unknown_renderer_panics_in_debug() {
        let mut registry = ResourceRegistry::new();
        registry.remove_renderer(RendererId(42));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn removing_unknown_renderer_is_a_no_op_in_release() {
        let mut registry = ResourceRegistry::new();
        registry.add_renderer(Renderer::new(RendererId(1), GeometryId(1)));
        assert!(registry.remove_renderer(RendererId(42)).is_none());
        assert_eq!(registry.renderer_count(), 1);
    }

    fn geometry_with_indices(registry: &mut ResourceRegistry) {
        registry.add_geometry(Geometry::new(GeometryId(1)));
        registry.add_attribute_buffer(
            GeometryId(1),
            AttributeBuffer::new(AttributeBufferId(1), vec![0; 6]),
            BufferBinding::Index(IndexFormat::Uint16),
            BufferUsage::Static,
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "second index buffer")]
    fn second_index_buffer_panics_in_debug() {
        let mut registry = ResourceRegistry::new();
        geometry_with_indices(&mut registry);
        registry.add_attribute_buffer(
            GeometryId(1),
            AttributeBuffer::new(AttributeBufferId(2), vec![0; 8]),
            BufferBinding::Index(IndexFormat::Uint32),
            BufferUsage::Static,
        );
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn second_index_buffer_is_ignored_in_release() {
        let mut registry = ResourceRegistry::new();
        geometry_with_indices(&mut registry);
        registry.add_attribute_buffer(
            GeometryId(1),
            AttributeBuffer::new(AttributeBufferId(2), vec![0; 8]),
            BufferBinding::Index(IndexFormat::Uint32),
            BufferUsage::Static,
        );
        assert_eq!(registry.geometry(GeometryId(1)).unwrap().buffers().len(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_geometry_panics_in_debug() {
        let mut registry = ResourceRegistry::new();
        registry.add_geometry(Geometry::new(GeometryId(1)));
        registry.add_geometry(Geometry::new(GeometryId(1)));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn duplicate_geometry_keeps_the_original_in_release() {
        let mut registry = ResourceRegistry::new();
        let mut original = Geometry::new(GeometryId(1));
        original.add_buffer(
            AttributeBuffer::new(AttributeBufferId(1), vec![0; 8]),
            vertex_binding(),
            BufferUsage::Static,
        );
        registry.add_geometry(original);
        registry.add_geometry(Geometry::new(GeometryId(1)));
        assert!(registry.geometry(GeometryId(1)).unwrap().is_complete());
    }
}
