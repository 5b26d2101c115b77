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

use super::command::GpuCommand;
use ahash::{AHashMap, AHashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use vellum_core::renderer::{
    BufferTarget, BufferUsage, CompiledProgram, DrawCall, FenceHandle, FrameBufferHandle,
    GpuBufferHandle, GraphicsContext, IndexFormat, ProgramHandle, RenderState, ResourceError,
    ShaderError, ShaderSource, TextureDescriptor, TextureHandle, UniformValue, VertexLayout,
};
use vellum_core::{LinearRgba, Rect};

/// Magic prefix of the program binaries produced by [`HeadlessContext`].
const BINARY_MAGIC: &[u8; 4] = b"VLMB";

/// When fences inserted into a [`HeadlessContext`] become signaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceMode {
    /// Every fence is signaled by the next `flush`.
    #[default]
    SignalOnFlush,
    /// Fences stay pending until signaled explicitly.
    Manual,
}

#[derive(Debug, Default)]
struct DeviceState {
    commands: Vec<GpuCommand>,
    next_handle: u64,
    programs: AHashSet<u64>,
    buffers: AHashMap<u64, usize>,
    textures: AHashMap<u64, TextureDescriptor>,
    frame_buffers: AHashSet<u64>,
    fences: AHashMap<u64, bool>,
    invalid_uses: u64,
    compile_attempts: u64,
    compiled: u64,
    resets: u64,
}

impl DeviceState {
    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn allocated_bytes(&self) -> usize {
        let buffers: usize = self.buffers.values().sum();
        let textures: usize = self.textures.values().map(TextureDescriptor::byte_len).sum();
        buffers + textures
    }

    fn reserve(
        &self,
        budget: Option<usize>,
        freed: usize,
        requested: usize,
    ) -> Result<(), ResourceError> {
        match budget {
            Some(budget) if self.allocated_bytes() - freed + requested > budget => {
                Err(ResourceError::OutOfMemory {
                    requested: requested as u64,
                })
            }
            _ => Ok(()),
        }
    }

    fn check(&mut self, known: bool, what: &str, handle: u64) -> bool {
        if !known {
            self.invalid_uses += 1;
            log::warn!("[HeadlessContext] Use of unknown {what} handle {handle}");
        }
        known
    }
}

/// A [`GraphicsContext`] that records calls instead of rendering.
///
/// Handles are never reused, including across [`reset`](Self::reset), so
/// using a handle from before a reset is detected and counted by
/// [`invalid_handle_uses`](Self::invalid_handle_uses).
#[derive(Debug)]
pub struct HeadlessContext {
    device: Mutex<DeviceState>,
    fence_mode: FenceMode,
    memory_budget: Option<usize>,
    program_binaries: bool,
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessContext {
    /// A context that signals fences on flush and has unlimited memory.
    pub fn new() -> Self {
        Self {
            device: Mutex::new(DeviceState::default()),
            fence_mode: FenceMode::default(),
            memory_budget: None,
            program_binaries: true,
        }
    }

    /// Sets when fences become signaled.
    pub fn with_fence_mode(mut self, mode: FenceMode) -> Self {
        self.fence_mode = mode;
        self
    }

    /// Fails buffer and texture allocations that would exceed `bytes` in total.
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = Some(bytes);
        self
    }

    /// Compiles programs without producing a retrievable binary.
    pub fn without_program_binaries(mut self) -> Self {
        self.program_binaries = false;
        self
    }

    fn device(&self) -> MutexGuard<'_, DeviceState> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of every recorded command.
    pub fn commands(&self) -> Vec<GpuCommand> {
        self.device().commands.clone()
    }

    /// Returns and clears the recorded commands.
    pub fn take_commands(&self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.device().commands)
    }

    /// Every draw recorded so far.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.device()
            .commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::Draw(call) => Some(*call),
                _ => None,
            })
            .collect()
    }

    /// Number of live programs.
    pub fn live_programs(&self) -> usize {
        self.device().programs.len()
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.device().buffers.len()
    }

    /// Number of live textures.
    pub fn live_textures(&self) -> usize {
        self.device().textures.len()
    }

    /// Number of live frame buffers.
    pub fn live_frame_buffers(&self) -> usize {
        self.device().frame_buffers.len()
    }

    /// Number of live fences.
    pub fn live_fences(&self) -> usize {
        self.device().fences.len()
    }

    /// Total size of live buffers and textures in bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.device().allocated_bytes()
    }

    /// Number of `compile_program` calls, successful or not.
    pub fn compile_attempts(&self) -> u64 {
        self.device().compile_attempts
    }

    /// Number of successful program compilations.
    pub fn compile_count(&self) -> u64 {
        self.device().compiled
    }

    /// Number of calls that referenced a handle this context does not know.
    pub fn invalid_handle_uses(&self) -> u64 {
        self.device().invalid_uses
    }

    /// Number of simulated driver losses.
    pub fn reset_count(&self) -> u64 {
        self.device().resets
    }

    /// Signals one fence. Returns `false` if it does not exist.
    pub fn signal_fence(&self, fence: FenceHandle) -> bool {
        match self.device().fences.get_mut(&fence.0) {
            Some(signaled) => {
                *signaled = true;
                true
            }
            None => false,
        }
    }

    /// Signals every pending fence.
    pub fn signal_all_fences(&self) {
        for signaled in self.device().fences.values_mut() {
            *signaled = true;
        }
    }

    /// Simulates losing the driver context: every live object is gone.
    pub fn reset(&self) {
        let mut device = self.device();
        device.programs.clear();
        device.buffers.clear();
        device.textures.clear();
        device.frame_buffers.clear();
        device.fences.clear();
        device.resets += 1;
        log::info!("[HeadlessContext] Simulated context loss #{}", device.resets);
    }

    fn program_binary(source: &ShaderSource) -> Vec<u8> {
        let mut binary = BINARY_MAGIC.to_vec();
        binary.extend_from_slice(source.vertex.as_bytes());
        binary.push(0);
        binary.extend_from_slice(source.fragment.as_bytes());
        binary
    }
}

fn check_texels(descriptor: &TextureDescriptor, pixels: &[u8]) -> Result<(), ResourceError> {
    if pixels.len() == descriptor.byte_len() {
        return Ok(());
    }
    Err(ResourceError::BackendError(format!(
        "{}x{} {:?} texture needs {} bytes, got {}",
        descriptor.width,
        descriptor.height,
        descriptor.format,
        descriptor.byte_len(),
        pixels.len()
    )))
}

impl GraphicsContext for HeadlessContext {
    fn compile_program(&self, source: &ShaderSource) -> Result<CompiledProgram, ShaderError> {
        self.device().compile_attempts += 1;
        for (stage, text) in [("vertex", &source.vertex), ("fragment", &source.fragment)] {
            if text.trim().is_empty() {
                return Err(ShaderError::EmptyStage {
                    label: source.label.clone(),
                    stage,
                });
            }
        }
        if let Some(line) = source
            .vertex
            .lines()
            .chain(source.fragment.lines())
            .find(|l| l.trim_start().starts_with("#error"))
        {
            return Err(ShaderError::CompilationError {
                label: source.label.clone(),
                details: line.trim().to_string(),
            });
        }

        let mut device = self.device();
        let handle = ProgramHandle(device.allocate());
        device.programs.insert(handle.0);
        device.compiled += 1;
        device.commands.push(GpuCommand::CompileProgram {
            handle,
            label: source.label.clone(),
        });
        Ok(CompiledProgram {
            handle,
            binary: self.program_binaries.then(|| Self::program_binary(source)),
        })
    }

    fn destroy_program(&self, program: ProgramHandle) {
        let mut device = self.device();
        let known = device.programs.remove(&program.0);
        if device.check(known, "program", program.0) {
            device.commands.push(GpuCommand::DestroyProgram(program));
        }
    }

    fn use_program(&self, program: ProgramHandle) {
        let mut device = self.device();
        let known = device.programs.contains(&program.0);
        device.check(known, "program", program.0);
        device.commands.push(GpuCommand::UseProgram(program));
    }

    fn set_uniform(&self, name: &str, value: &UniformValue) {
        self.device().commands.push(GpuCommand::SetUniform {
            name: name.to_string(),
            value: *value,
        });
    }

    fn create_buffer(
        &self,
        target: BufferTarget,
        usage: BufferUsage,
        data: &[u8],
    ) -> Result<GpuBufferHandle, ResourceError> {
        let mut device = self.device();
        device.reserve(self.memory_budget, 0, data.len())?;
        let handle = GpuBufferHandle(device.allocate());
        device.buffers.insert(handle.0, data.len());
        device.commands.push(GpuCommand::CreateBuffer {
            handle,
            target,
            usage,
            size: data.len(),
        });
        Ok(handle)
    }

    fn update_buffer(&self, buffer: GpuBufferHandle, data: &[u8]) -> Result<(), ResourceError> {
        let mut device = self.device();
        let Some(&old_size) = device.buffers.get(&buffer.0) else {
            device.check(false, "buffer", buffer.0);
            return Err(ResourceError::InvalidHandle);
        };
        device.reserve(self.memory_budget, old_size, data.len())?;
        device.buffers.insert(buffer.0, data.len());
        device.commands.push(GpuCommand::UpdateBuffer {
            handle: buffer,
            size: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&self, buffer: GpuBufferHandle) {
        let mut device = self.device();
        let known = device.buffers.remove(&buffer.0).is_some();
        if device.check(known, "buffer", buffer.0) {
            device.commands.push(GpuCommand::DestroyBuffer(buffer));
        }
    }

    fn bind_vertex_buffer(&self, buffer: GpuBufferHandle, _layout: &VertexLayout) {
        let mut device = self.device();
        let known = device.buffers.contains_key(&buffer.0);
        device.check(known, "buffer", buffer.0);
        device.commands.push(GpuCommand::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(&self, buffer: GpuBufferHandle, format: IndexFormat) {
        let mut device = self.device();
        let known = device.buffers.contains_key(&buffer.0);
        device.check(known, "buffer", buffer.0);
        device.commands.push(GpuCommand::BindIndexBuffer {
            handle: buffer,
            format,
        });
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<TextureHandle, ResourceError> {
        check_texels(descriptor, pixels)?;
        let mut device = self.device();
        device.reserve(self.memory_budget, 0, descriptor.byte_len())?;
        let handle = TextureHandle(device.allocate());
        device.textures.insert(handle.0, *descriptor);
        device.commands.push(GpuCommand::CreateTexture {
            handle,
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format,
        });
        Ok(handle)
    }

    fn update_texture(&self, texture: TextureHandle, pixels: &[u8]) -> Result<(), ResourceError> {
        let mut device = self.device();
        let Some(descriptor) = device.textures.get(&texture.0).copied() else {
            device.check(false, "texture", texture.0);
            return Err(ResourceError::InvalidHandle);
        };
        check_texels(&descriptor, pixels)?;
        device.commands.push(GpuCommand::UpdateTexture(texture));
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        let mut device = self.device();
        let known = device.textures.remove(&texture.0).is_some();
        if device.check(known, "texture", texture.0) {
            device.commands.push(GpuCommand::DestroyTexture(texture));
        }
    }

    fn bind_texture(&self, unit: u32, texture: TextureHandle) {
        let mut device = self.device();
        let known = device.textures.contains_key(&texture.0);
        device.check(known, "texture", texture.0);
        device.commands.push(GpuCommand::BindTexture {
            unit,
            handle: texture,
        });
    }

    fn create_frame_buffer(
        &self,
        width: u32,
        height: u32,
    ) -> Result<FrameBufferHandle, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::BackendError(format!(
                "frame buffer size {width}x{height} is empty"
            )));
        }
        let mut device = self.device();
        let handle = FrameBufferHandle(device.allocate());
        device.frame_buffers.insert(handle.0);
        device.commands.push(GpuCommand::CreateFrameBuffer {
            handle,
            width,
            height,
        });
        Ok(handle)
    }

    fn destroy_frame_buffer(&self, frame_buffer: FrameBufferHandle) {
        let mut device = self.device();
        let known = device.frame_buffers.remove(&frame_buffer.0);
        if device.check(known, "frame buffer", frame_buffer.0) {
            device
                .commands
                .push(GpuCommand::DestroyFrameBuffer(frame_buffer));
        }
    }

    fn bind_frame_buffer(&self, frame_buffer: Option<FrameBufferHandle>) {
        let mut device = self.device();
        if let Some(handle) = frame_buffer {
            let known = device.frame_buffers.contains(&handle.0);
            device.check(known, "frame buffer", handle.0);
        }
        device
            .commands
            .push(GpuCommand::BindFrameBuffer(frame_buffer));
    }

    fn set_viewport(&self, viewport: Rect) {
        self.device().commands.push(GpuCommand::SetViewport(viewport));
    }

    fn set_scissor(&self, clip: Option<Rect>) {
        self.device().commands.push(GpuCommand::SetScissor(clip));
    }

    fn clear(&self, color: LinearRgba) {
        self.device().commands.push(GpuCommand::Clear(color));
    }

    fn set_render_state(&self, state: &RenderState) {
        self.device()
            .commands
            .push(GpuCommand::SetRenderState(*state));
    }

    fn draw(&self, call: &DrawCall) {
        self.device().commands.push(GpuCommand::Draw(*call));
    }

    fn insert_fence(&self) -> Result<FenceHandle, ResourceError> {
        let mut device = self.device();
        let handle = FenceHandle(device.allocate());
        device.fences.insert(handle.0, false);
        device.commands.push(GpuCommand::InsertFence(handle));
        Ok(handle)
    }

    fn is_fence_signaled(&self, fence: FenceHandle) -> bool {
        let mut device = self.device();
        match device.fences.get(&fence.0).copied() {
            Some(signaled) => signaled,
            None => {
                device.check(false, "fence", fence.0);
                false
            }
        }
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        let mut device = self.device();
        let known = device.fences.remove(&fence.0).is_some();
        if device.check(known, "fence", fence.0) {
            device.commands.push(GpuCommand::DestroyFence(fence));
        }
    }

    fn flush(&self) {
        let mut device = self.device();
        device.commands.push(GpuCommand::Flush);
        if self.fence_mode == FenceMode::SignalOnFlush {
            for signaled in device.fences.values_mut() {
                *signaled = true;
            }
        }
    }
}
