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

//! Geometries and the attribute buffers they own.
//!
//! A [`Geometry`] is pure CPU-side data until it is first drawn. The executor
//! drives it through the [`Drawable`] capability: `upload` lazily creates or
//! refreshes GPU buffers, `bind` attaches them, and `draw_call` derives the
//! command to issue.

use crate::context_state::{ContextState, Generational};
use vellum_core::renderer::{
    BufferTarget, BufferUsage, DrawCall, GpuBufferHandle, GraphicsContext, IndexFormat,
    PrimitiveTopology, ResourceError, VertexLayout,
};
use vellum_core::{AttributeBufferId, GeometryId};

/// Raw buffer contents as sent by the logic thread.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffer {
    /// Identifier, unique within the parent geometry.
    pub id: AttributeBufferId,
    /// Bytes to upload.
    pub data: Vec<u8>,
}

impl AttributeBuffer {
    /// Creates a buffer from raw bytes.
    pub fn new(id: AttributeBufferId, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    /// Creates a buffer from a slice of plain-old-data values.
    pub fn from_pod<T: bytemuck::Pod>(id: AttributeBufferId, values: &[T]) -> Self {
        Self::new(id, bytemuck::cast_slice(values).to_vec())
    }
}

/// How a buffer is bound when its geometry is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferBinding {
    /// Vertex attributes laid out as described.
    Vertex(VertexLayout),
    /// Element indices of the given width.
    Index(IndexFormat),
}

impl BufferBinding {
    /// The GPU binding point.
    pub fn target(&self) -> BufferTarget {
        match self {
            BufferBinding::Vertex(_) => BufferTarget::Vertex,
            BufferBinding::Index(_) => BufferTarget::Index,
        }
    }
}

/// An attribute buffer attached to a geometry, with its GPU mirror.
#[derive(Debug)]
pub struct BoundBuffer {
    buffer: AttributeBuffer,
    binding: BufferBinding,
    usage: BufferUsage,
    gpu: Option<Generational<GpuBufferHandle>>,
    dirty: bool,
}

impl BoundBuffer {
    /// The buffer's identifier.
    pub fn id(&self) -> AttributeBufferId {
        self.buffer.id
    }

    /// How the buffer is bound.
    pub fn binding(&self) -> &BufferBinding {
        &self.binding
    }

    /// Declared update frequency.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// CPU-side contents.
    pub fn data(&self) -> &[u8] {
        &self.buffer.data
    }

    /// Returns `true` once the contents changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of vertices or indices the contents describe.
    pub fn element_count(&self) -> u32 {
        let stride = match &self.binding {
            BufferBinding::Vertex(layout) => layout.stride,
            BufferBinding::Index(format) => format.size(),
        };
        if stride == 0 {
            return 0;
        }
        (self.buffer.data.len() / stride as usize) as u32
    }

    fn upload(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<(), ResourceError> {
        match state.resolve(self.gpu.as_ref()) {
            Some(_) if !self.dirty => {}
            Some(handle) => {
                context.update_buffer(handle, &self.buffer.data)?;
                self.dirty = false;
            }
            None => {
                let handle =
                    context.create_buffer(self.binding.target(), self.usage, &self.buffer.data)?;
                self.gpu = Some(state.stamp(handle));
                self.dirty = false;
            }
        }
        Ok(())
    }

    /// Destroys the GPU buffer if it belongs to the live context.
    pub fn release(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        if let Some(handle) = state.resolve(self.gpu.take().as_ref()) {
            context.destroy_buffer(handle);
        }
    }

    fn invalidate(&mut self) {
        self.gpu = None;
    }
}

/// Render-side capability of anything that can be bound and drawn.
pub trait Drawable {
    /// Creates missing GPU objects and refreshes stale ones.
    fn upload(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<(), ResourceError>;

    /// Binds every GPU object. Returns `false` if one is not resident.
    fn bind(&self, context: &dyn GraphicsContext, state: &ContextState) -> bool;

    /// The draw command for the current contents, if there is anything to draw.
    fn draw_call(&self) -> Option<DrawCall>;
}

/// A set of attribute buffers drawn together.
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    topology: PrimitiveTopology,
    buffers: Vec<BoundBuffer>,
}

impl Geometry {
    /// Creates an empty triangle-list geometry.
    pub fn new(id: GeometryId) -> Self {
        Self {
            id,
            topology: PrimitiveTopology::default(),
            buffers: Vec::new(),
        }
    }

    /// Sets the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// The geometry's identifier.
    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// Primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Attached buffers in attachment order.
    pub fn buffers(&self) -> &[BoundBuffer] {
        &self.buffers
    }

    /// Returns the attached buffer with `id`.
    pub fn buffer(&self, id: AttributeBufferId) -> Option<&BoundBuffer> {
        self.buffers.iter().find(|b| b.id() == id)
    }

    /// A geometry can only be drawn once at least one vertex buffer is attached.
    pub fn is_complete(&self) -> bool {
        self.buffers
            .iter()
            .any(|b| b.binding.target() == BufferTarget::Vertex)
    }

    /// Attaches a buffer. Returns `false` and leaves the geometry untouched if
    /// the id is already attached or if it would be a second index buffer.
    pub fn add_buffer(
        &mut self,
        buffer: AttributeBuffer,
        binding: BufferBinding,
        usage: BufferUsage,
    ) -> bool {
        if self.buffer(buffer.id).is_some() {
            return false;
        }
        if binding.target() == BufferTarget::Index && self.index_buffer().is_some() {
            return false;
        }
        self.buffers.push(BoundBuffer {
            buffer,
            binding,
            usage,
            gpu: None,
            dirty: true,
        });
        true
    }

    /// Detaches a buffer and hands it back so its GPU mirror can be released.
    pub fn remove_buffer(&mut self, id: AttributeBufferId) -> Option<BoundBuffer> {
        let index = self.buffers.iter().position(|b| b.id() == id)?;
        Some(self.buffers.remove(index))
    }

    /// Replaces a buffer's contents. The new data is uploaded at the next draw.
    pub fn update_buffer(&mut self, id: AttributeBufferId, data: Vec<u8>) -> bool {
        match self.buffers.iter_mut().find(|b| b.id() == id) {
            Some(bound) => {
                bound.buffer.data = data;
                bound.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Destroys every GPU buffer that belongs to the live context.
    pub fn release(&mut self, context: &dyn GraphicsContext, state: &ContextState) {
        for bound in &mut self.buffers {
            bound.release(context, state);
        }
    }

    /// Forgets GPU handles without touching the context.
    pub fn invalidate(&mut self) {
        for bound in &mut self.buffers {
            bound.invalidate();
        }
    }

    /// Number of buffers with a GPU mirror in the live context.
    pub fn resident_buffers(&self, state: &ContextState) -> usize {
        self.buffers
            .iter()
            .filter(|b| state.resolve(b.gpu.as_ref()).is_some())
            .count()
    }

    fn index_buffer(&self) -> Option<&BoundBuffer> {
        self.buffers
            .iter()
            .find(|b| b.binding.target() == BufferTarget::Index)
    }
}

impl Drawable for Geometry {
    fn upload(
        &mut self,
        context: &dyn GraphicsContext,
        state: &ContextState,
    ) -> Result<(), ResourceError> {
        for bound in &mut self.buffers {
            bound.upload(context, state)?;
        }
        Ok(())
    }

    fn bind(&self, context: &dyn GraphicsContext, state: &ContextState) -> bool {
        for bound in &self.buffers {
            let Some(handle) = state.resolve(bound.gpu.as_ref()) else {
                return false;
            };
            match &bound.binding {
                BufferBinding::Vertex(layout) => context.bind_vertex_buffer(handle, layout),
                BufferBinding::Index(format) => context.bind_index_buffer(handle, *format),
            }
        }
        true
    }

    fn draw_call(&self) -> Option<DrawCall> {
        let call = match self.index_buffer() {
            Some(indices) => {
                let BufferBinding::Index(format) = &indices.binding else {
                    return None;
                };
                DrawCall::Indexed {
                    topology: self.topology,
                    format: *format,
                    count: indices.element_count(),
                }
            }
            None => {
                let count = self
                    .buffers
                    .iter()
                    .filter(|b| b.binding.target() == BufferTarget::Vertex)
                    .map(BoundBuffer::element_count)
                    .min()?;
                DrawCall::Arrays {
                    topology: self.topology,
                    count,
                }
            }
        };
        match call {
            DrawCall::Arrays { count: 0, .. } | DrawCall::Indexed { count: 0, .. } => None,
            call => Some(call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::renderer::VertexFormat;

    fn positions() -> BufferBinding {
        BufferBinding::Vertex(VertexLayout::packed([("aPosition", VertexFormat::Float32x2)]))
    }

    fn triangle(id: u64) -> AttributeBuffer {
        AttributeBuffer::from_pod(AttributeBufferId(id), &[0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0])
    }

    #[test]
    fn geometry_without_vertex_buffer_is_incomplete() {
        let mut geometry = Geometry::new(GeometryId(1));
        assert!(!geometry.is_complete());
        assert_eq!(geometry.draw_call(), None);

        let indices = AttributeBuffer::from_pod(AttributeBufferId(2), &[0u16, 1, 2]);
        let binding = BufferBinding::Index(IndexFormat::Uint16);
        geometry.add_buffer(indices, binding, BufferUsage::Static);
        assert!(!geometry.is_complete());

        geometry.add_buffer(triangle(1), positions(), BufferUsage::Static);
        assert!(geometry.is_complete());
    }

    #[test]
    fn draw_call_counts_vertices_by_stride() {
        let mut geometry = Geometry::new(GeometryId(1));
        geometry.add_buffer(triangle(1), positions(), BufferUsage::Static);
        assert_eq!(
            geometry.draw_call(),
            Some(DrawCall::Arrays {
                topology: PrimitiveTopology::TriangleList,
                count: 3
            })
        );
    }

    #[test]
    fn index_buffer_switches_to_indexed_draw() {
        let mut geometry =
            Geometry::new(GeometryId(1)).with_topology(PrimitiveTopology::TriangleStrip);
        geometry.add_buffer(triangle(1), positions(), BufferUsage::Static);
        let indices = AttributeBuffer::from_pod(AttributeBufferId(2), &[0u32, 1, 2, 2]);
        let binding = BufferBinding::Index(IndexFormat::Uint32);
        geometry.add_buffer(indices, binding, BufferUsage::Static);

        assert_eq!(
            geometry.draw_call(),
            Some(DrawCall::Indexed {
                topology: PrimitiveTopology::TriangleStrip,
                format: IndexFormat::Uint32,
                count: 4
            })
        );
    }

    #[test]
    fn duplicate_buffer_ids_are_rejected() {
        let mut geometry = Geometry::new(GeometryId(1));
        assert!(geometry.add_buffer(triangle(1), positions(), BufferUsage::Static));
        assert!(!geometry.add_buffer(triangle(1), positions(), BufferUsage::Dynamic));
        assert_eq!(geometry.buffers().len(), 1);
        assert_eq!(geometry.buffers()[0].usage(), BufferUsage::Static);
    }

    #[test]
    fn second_index_buffer_is_rejected() {
        let mut geometry = Geometry::new(GeometryId(1));
        geometry.add_buffer(triangle(1), positions(), BufferUsage::Static);
        let short = AttributeBuffer::from_pod(AttributeBufferId(2), &[0u16, 1, 2]);
        let long = AttributeBuffer::from_pod(AttributeBufferId(3), &[0u32, 1, 2, 2, 1, 0]);
        assert!(geometry.add_buffer(
            short,
            BufferBinding::Index(IndexFormat::Uint16),
            BufferUsage::Static
        ));
        assert!(!geometry.add_buffer(
            long,
            BufferBinding::Index(IndexFormat::Uint32),
            BufferUsage::Static
        ));

        assert_eq!(geometry.buffers().len(), 2);
        assert_eq!(
            geometry.draw_call(),
            Some(DrawCall::Indexed {
                topology: PrimitiveTopology::TriangleList,
                format: IndexFormat::Uint16,
                count: 3
            })
        );
    }

    #[test]
    fn update_marks_the_buffer_dirty() {
        let mut geometry = Geometry::new(GeometryId(1));
        geometry.add_buffer(triangle(1), positions(), BufferUsage::Dynamic);
        assert!(geometry.update_buffer(AttributeBufferId(1), vec![0; 8]));
        assert!(!geometry.update_buffer(AttributeBufferId(9), vec![0; 8]));

        let bound = geometry.buffer(AttributeBufferId(1)).unwrap();
        assert!(bound.is_dirty());
        assert_eq!(bound.element_count(), 1);
    }

    #[test]
    fn empty_contents_produce_no_draw() {
        let mut geometry = Geometry::new(GeometryId(1));
        let empty = AttributeBuffer::new(AttributeBufferId(1), Vec::new());
        geometry.add_buffer(empty, positions(), BufferUsage::Static);
        assert!(geometry.is_complete());
        assert_eq!(geometry.draw_call(), None);
    }
}
