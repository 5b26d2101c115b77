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

// Vellum Sandbox
// Runs a logic thread and the render loop against the headless backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use vellum_core::renderer::{BlendMode, BufferUsage, IndexFormat, RenderState, UniformValue};
use vellum_core::renderer::{TextureDescriptor, VertexFormat, VertexLayout};
use vellum_core::{
    AttributeBufferId, FrameBufferId, GeometryId, IdGenerator, LinearRgba, Mat4, Rect,
    RendererId, ResourceId, TextureId, TrackerId,
};
use vellum_infra::{DirectoryShaderExporter, HeadlessContext};
use vellum_render::{
    frame_channel, AttributeBuffer, BufferBinding, Camera, FrameBuffer, FrameQueueClosed,
    FrameSender, Geometry, Instruction, PostProcessDispatcher, ProgramCache, RenderConfig,
    RenderManager, RenderMessage, RenderTracker, Renderer, Shader, Texture, TrackerMode,
};
use vellum_telemetry::{init_logging, FrameStatsCollector, LoggingConfig};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    fn layout() -> VertexLayout {
        VertexLayout::packed([
            ("aPosition", VertexFormat::Float32x3),
            ("aColor", VertexFormat::Float32x3),
        ])
    }
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2];

const VERTEX_SHADER: &str = "\
attribute vec3 aPosition;
attribute vec3 aColor;
uniform mat4 uViewMatrix;
uniform mat4 uProjection;
varying vec3 vColor;
void main() {
    vColor = aColor;
    gl_Position = uProjection * uViewMatrix * vec4(aPosition, 1.0);
}";

const FRAGMENT_SHADER: &str = "\
varying vec3 vColor;
uniform vec4 uTint;
uniform sampler2D uTexture;
void main() {
    gl_FragColor = texture2D(uTexture, vColor.xy) * vec4(vColor, 1.0) * uTint;
}";

/// A 2x2 black and white checker.
const CHECKER: [u8; 16] = [
    255, 255, 255, 255, 0, 0, 0, 255, //
    0, 0, 0, 255, 255, 255, 255, 255,
];

/// Everything the sandbox can be configured with from a RON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SandboxConfig {
    render: RenderConfig,
    logging: LoggingConfig,
    frames: u32,
    lose_context_at: Option<u32>,
    shader_cache_dir: Option<PathBuf>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
            frames: 180,
            lose_context_at: Some(90),
            shader_cache_dir: None,
        }
    }
}

fn load_config() -> Result<SandboxConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading sandbox config '{path}'"))?;
            ron::from_str(&text).with_context(|| format!("parsing sandbox config '{path}'"))
        }
        None => Ok(SandboxConfig::default()),
    }
}

/// Resources the logic thread created once and keeps referring to.
struct Scene {
    triangle: RendererId,
    overlay: RendererId,
    offscreen: FrameBufferId,
}

fn build_scene(ids: &IdGenerator, sender: &mut FrameSender) -> Scene {
    let geometry: GeometryId = ids.next();
    let vertices: AttributeBufferId = ids.next();
    let indices: AttributeBufferId = ids.next();
    let triangle: RendererId = ids.next();
    let overlay: RendererId = ids.next();
    let offscreen: FrameBufferId = ids.next();
    let checker: TextureId = ids.next();

    sender.push(RenderMessage::SetDefaultShader(Shader::new(
        "Unlit",
        VERTEX_SHADER,
        FRAGMENT_SHADER,
    )));
    sender.push(RenderMessage::SetBackgroundColor(LinearRgba::from_srgba_u8(
        30, 30, 46, 255,
    )));
    sender.push(RenderMessage::AddGeometry(Geometry::new(geometry)));
    sender.push(RenderMessage::AddAttributeBuffer {
        geometry,
        buffer: AttributeBuffer::from_pod(vertices, VERTICES),
        target: BufferBinding::Vertex(Vertex::layout()),
        usage: BufferUsage::Static,
    });
    sender.push(RenderMessage::AddAttributeBuffer {
        geometry,
        buffer: AttributeBuffer::from_pod(indices, INDICES),
        target: BufferBinding::Index(IndexFormat::Uint16),
        usage: BufferUsage::Static,
    });
    sender.push(RenderMessage::AddTexture(Texture::new(
        checker,
        TextureDescriptor::rgba8(2, 2),
        CHECKER.to_vec(),
    )));
    sender.push(RenderMessage::AddRenderer(
        Renderer::new(triangle, geometry)
            .with_uniform("uTint", UniformValue::Vec4([1.0; 4]))
            .with_texture("uTexture", checker),
    ));
    sender.push(RenderMessage::AddRenderer(
        Renderer::new(overlay, geometry)
            .with_shader(Shader::new("Unlit", VERTEX_SHADER, FRAGMENT_SHADER).with_define("OVERLAY"))
            .with_render_state(RenderState {
                blend: BlendMode::Alpha,
                ..Default::default()
            })
            .with_uniform("uTint", UniformValue::Vec4([1.0, 1.0, 1.0, 0.5])),
    ));
    sender.push(RenderMessage::AddFrameBuffer(FrameBuffer::new(offscreen, 256, 256)));

    Scene {
        triangle,
        overlay,
        offscreen,
    }
}

/// Produces one frame per tick until the render loop stops ticking.
fn run_logic(
    mut sender: FrameSender,
    ticks: flume::Receiver<()>,
    surface: Rect,
) -> Result<u64, FrameQueueClosed> {
    let ids = IdGenerator::new();
    let scene = build_scene(&ids, &mut sender);
    let projection = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
    let mut submitted = 0;

    for (frame, ()) in ticks.iter().enumerate() {
        let t = frame as f32 / 60.0;
        let camera = Camera {
            view: Mat4::from_translation(t.sin() * 0.25, 0.0, -1.0),
            projection,
        };
        sender.push(RenderMessage::SetUniform {
            renderer: scene.triangle,
            name: "uTint".to_string(),
            value: UniformValue::Vec4([1.0, 0.5 + 0.5 * t.cos(), 1.0, 1.0]),
        });

        let mut offscreen = Instruction::new(Rect::from_size(256, 256))
            .with_offscreen(scene.offscreen, Some(LinearRgba::TRANSPARENT))
            .with_camera(camera)
            .with_renderer(scene.triangle);
        if frame % 30 == 0 {
            let tracker: TrackerId = ids.next();
            let resource: ResourceId = ids.next();
            sender.push(RenderMessage::AddRenderTracker(RenderTracker::new(
                tracker,
                resource,
                TrackerMode::OneShot,
            )));
            offscreen = offscreen.with_tracker(tracker);
        }
        let onscreen = Instruction::new(surface)
            .with_camera(camera)
            .with_renderers([scene.triangle, scene.overlay]);

        submitted = sender.end_frame(vec![offscreen, onscreen])?;
    }
    Ok(submitted)
}

fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging);
    log::info!("Vellum sandbox starting ({} frames)", config.frames);

    let context = Arc::new(HeadlessContext::new());
    let (sender, receiver) = frame_channel();
    let (dispatcher, post_process) = PostProcessDispatcher::new(config.render.post_process_capacity);
    let programs = match &config.shader_cache_dir {
        Some(dir) => {
            let exporter = DirectoryShaderExporter::new(dir)
                .with_context(|| format!("creating shader cache '{}'", dir.display()))?;
            ProgramCache::with_exporter(Arc::new(exporter))
        }
        None => ProgramCache::new(),
    };
    let mut manager = RenderManager::new(
        context.clone(),
        receiver,
        programs,
        dispatcher,
        &config.render,
    );

    let (tick_tx, tick_rx) = flume::bounded(1);
    let surface = config.render.surface_rect;
    let logic = thread::Builder::new()
        .name("logic".to_string())
        .spawn(move || run_logic(sender, tick_rx, surface))
        .context("spawning the logic thread")?;

    manager.context_created();
    let mut stats = FrameStatsCollector::new(60);
    for frame in 0..config.frames {
        if config.lose_context_at == Some(frame) {
            log::warn!("Simulating context loss at frame {frame}");
            manager.context_destroyed();
            context.reset();
            let status = manager.render();
            log::info!("Frame without context: {status:?}");
            manager.context_created();
        }

        if tick_tx.send(()).is_err() {
            log::warn!("Logic thread stopped early");
            break;
        }
        let status = manager.render();
        stats.record(manager.last_stats());
        log::trace!("Frame {frame}: {status:?}");

        for event in post_process.try_iter() {
            log::info!("Post-process: {} -> {:?}", event.resource, event.status);
        }
        if (frame + 1) % 60 == 0 {
            log::info!("{}", stats.report());
        }
    }
    drop(tick_tx);

    let submitted = logic
        .join()
        .map_err(|_| anyhow!("logic thread panicked"))??;
    log::info!(
        "Logic thread submitted {submitted} frames; {} programs compiled, {} draw calls recorded",
        manager.program_cache().compiled(),
        context.draw_calls().len()
    );
    log::info!("{}", stats.report());
    Ok(())
}
