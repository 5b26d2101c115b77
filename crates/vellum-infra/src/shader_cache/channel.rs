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

use crossbeam_channel::{Receiver, Sender};
use vellum_core::renderer::{ExportError, ShaderBinary, ShaderExporter};

/// Forwards binaries to another thread over a channel.
#[derive(Debug, Clone)]
pub struct ChannelShaderExporter {
    sender: Sender<ShaderBinary>,
}

impl ChannelShaderExporter {
    /// Creates the exporter and the receiver binaries arrive on.
    pub fn new() -> (Self, Receiver<ShaderBinary>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl ShaderExporter for ChannelShaderExporter {
    fn export(&self, binary: ShaderBinary) -> Result<(), ExportError> {
        self.sender
            .send(binary)
            .map_err(|_| ExportError::Disconnected)
    }
}
