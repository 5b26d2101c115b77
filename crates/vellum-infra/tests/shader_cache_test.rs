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

use vellum_core::renderer::{ExportError, ProgramKey, ShaderBinary, ShaderExporter};
use vellum_infra::{ChannelShaderExporter, DirectoryShaderExporter};

fn binary(byte: u8) -> ShaderBinary {
    ShaderBinary {
        key: ProgramKey([byte; 32]),
        label: format!("shader-{byte}"),
        data: vec![byte; 8],
    }
}

#[test]
fn channel_exporter_forwards_binaries_in_order() {
    let (exporter, receiver) = ChannelShaderExporter::new();
    exporter.export(binary(1)).unwrap();
    exporter.export(binary(2)).unwrap();

    let labels: Vec<String> = receiver.try_iter().map(|b| b.label).collect();
    assert_eq!(labels, vec!["shader-1", "shader-2"]);
}

#[test]
fn channel_exporter_reports_a_missing_receiver() {
    let (exporter, receiver) = ChannelShaderExporter::new();
    drop(receiver);
    assert!(matches!(exporter.export(binary(1)), Err(ExportError::Disconnected)));
}

#[test]
fn directory_exporter_persists_by_key() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = DirectoryShaderExporter::new(dir.path().join("shaders")).unwrap();

    exporter.export(binary(7)).unwrap();

    let key = ProgramKey([7; 32]);
    assert!(exporter.path_for(&key).ends_with(format!("{}.bin", key.to_hex())));
    assert_eq!(exporter.load(&key).unwrap(), Some(vec![7; 8]));
    assert_eq!(exporter.load(&ProgramKey([8; 32])).unwrap(), None);
}

#[test]
fn directory_exporter_surfaces_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = DirectoryShaderExporter::new(dir.path()).unwrap();
    std::fs::remove_dir(dir.path()).unwrap();

    assert!(matches!(exporter.export(binary(3)), Err(ExportError::Io(_))));
}
