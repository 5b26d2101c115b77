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

mod common;

use common::*;
use vellum_core::renderer::{TextureDescriptor, UniformValue};
use vellum_core::{RendererId, TextureId};
use vellum_infra::GpuCommand;
use vellum_render::{RenderMessage, Texture};

fn albedo(id: u64) -> Texture {
    Texture::new(TextureId(id), TextureDescriptor::rgba8(2, 2), vec![255; 16])
}

fn textured_scene(h: &mut Harness) {
    h.sender.push(RenderMessage::SetDefaultShader(flat_shader()));
    h.sender.extend(drawable(1, 1, 1));
    h.sender.push(RenderMessage::AddTexture(albedo(7)));
    h.sender.push(RenderMessage::SetRendererTexture {
        renderer: RendererId(1),
        sampler: "uAlbedo".to_string(),
        texture: Some(TextureId(7)),
    });
}

fn texture_creations(commands: &[GpuCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, GpuCommand::CreateTexture { .. }))
        .count()
}

#[test]
fn texture_is_uploaded_only_when_first_sampled() {
    let mut h = Harness::new();
    h.sender.push(RenderMessage::AddTexture(albedo(7)));
    h.frame(Vec::new());
    assert_eq!(h.manager.texture_cache().len(), 1);
    assert_eq!(h.context.live_textures(), 0);

    h.sender.push(RenderMessage::SetDefaultShader(flat_shader()));
    h.sender.extend(drawable(1, 1, 1));
    h.sender.push(RenderMessage::SetRendererTexture {
        renderer: RendererId(1),
        sampler: "uAlbedo".to_string(),
        texture: Some(TextureId(7)),
    });
    h.frame(vec![draw(&[1])]);
    h.manager.render();

    assert_eq!(h.context.live_textures(), 1);
    assert_eq!(texture_creations(&h.context.commands()), 1);
}

#[test]
fn sampled_texture_is_bound_before_the_draw() {
    let mut h = Harness::new();
    textured_scene(&mut h);

    h.frame(vec![draw(&[1])]);

    let commands = h.context.commands();
    let handle = commands
        .iter()
        .find_map(|c| match c {
            GpuCommand::CreateTexture { handle, .. } => Some(*handle),
            _ => None,
        })
        .unwrap();
    let bound = position_of(&commands, |c| {
        *c == GpuCommand::BindTexture { unit: 0, handle }
    })
    .unwrap();
    let sampler = position_of(&commands, |c| {
        *c == GpuCommand::SetUniform {
            name: "uAlbedo".to_string(),
            value: UniformValue::Int(0),
        }
    })
    .unwrap();
    let drawn = position_of(&commands, GpuCommand::is_draw).unwrap();
    assert!(bound < drawn);
    assert!(sampler < drawn);
}

#[test]
fn textures_are_reuploaded_after_context_recreation() {
    let mut h = Harness::new();
    textured_scene(&mut h);
    h.frame(vec![draw(&[1])]);

    h.manager.context_destroyed();
    h.context.reset();
    h.context.take_commands();
    h.manager.render();
    assert!(h.context.commands().is_empty());
    assert_eq!(
        h.manager.texture_cache().resident_count(h.manager.context_state()),
        0
    );

    h.manager.context_created();
    h.manager.render();

    assert_eq!(texture_creations(&h.context.commands()), 1);
    assert_eq!(h.context.live_textures(), 1);
    assert_eq!(h.context.invalid_handle_uses(), 0);
    assert_eq!(
        h.manager.texture_cache().resident_count(h.manager.context_state()),
        1
    );
    assert_eq!(h.draws(), 1);
}

#[test]
fn updated_texels_are_uploaded_on_the_next_draw() {
    let mut h = Harness::new();
    textured_scene(&mut h);
    h.frame(vec![draw(&[1])]);

    h.sender.push(RenderMessage::UpdateTexture {
        texture: TextureId(7),
        pixels: vec![0; 16],
    });
    h.frame(vec![draw(&[1])]);

    let commands = h.context.commands();
    assert_eq!(texture_creations(&commands), 1);
    assert_eq!(
        commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::UpdateTexture(_)))
            .count(),
        1
    );
}

#[test]
fn removing_a_texture_releases_it_and_skips_its_renderers() {
    let mut h = Harness::new();
    textured_scene(&mut h);
    h.frame(vec![draw(&[1])]);
    assert_eq!(h.draws(), 1);

    h.sender.push(RenderMessage::RemoveTexture(TextureId(7)));
    h.frame(vec![draw(&[1])]);

    assert_eq!(h.context.live_textures(), 0);
    assert_eq!(h.draws(), 1);
    assert_eq!(h.manager.last_stats().skipped_draws, 1);

    h.sender.push(RenderMessage::SetRendererTexture {
        renderer: RendererId(1),
        sampler: "uAlbedo".to_string(),
        texture: None,
    });
    h.frame(vec![draw(&[1])]);
    assert_eq!(h.draws(), 2);
}

#[test]
fn dropping_the_manager_releases_textures() {
    let mut h = Harness::new();
    textured_scene(&mut h);
    h.frame(vec![draw(&[1])]);
    let context = h.context.clone();

    drop(h);

    assert_eq!(context.live_textures(), 0);
    assert_eq!(context.invalid_handle_uses(), 0);
}
