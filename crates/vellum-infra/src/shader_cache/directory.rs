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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use vellum_core::renderer::{ExportError, ProgramKey, ShaderBinary, ShaderExporter};

/// Writes each binary to `<dir>/<key>.bin`.
#[derive(Debug, Clone)]
pub struct DirectoryShaderExporter {
    dir: PathBuf,
}

impl DirectoryShaderExporter {
    /// Uses `dir` as the cache directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("[DirectoryShaderExporter] Caching binaries in {}", dir.display());
        Ok(Self { dir })
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a binary for `key` is stored in.
    pub fn path_for(&self, key: &ProgramKey) -> PathBuf {
        self.dir.join(format!("{}.bin", key.to_hex()))
    }

    /// Reads back a previously exported binary.
    pub fn load(&self, key: &ProgramKey) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl ShaderExporter for DirectoryShaderExporter {
    fn export(&self, binary: ShaderBinary) -> Result<(), ExportError> {
        let path = self.path_for(&binary.key);
        fs::write(&path, &binary.data)?;
        log::debug!(
            "[DirectoryShaderExporter] Stored '{}' ({} bytes)",
            binary.label,
            binary.data.len()
        );
        Ok(())
    }
}
