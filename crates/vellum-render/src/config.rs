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

//! Render configuration loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vellum_core::{LinearRgba, Rect};

/// Errors raised while loading or saving a [`RenderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read render config '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The RON text is malformed or does not match the schema.
    #[error("invalid render config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The config could not be serialized.
    #[error("failed to serialize render config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Startup values for the render thread.
///
/// Every field has a default, so a RON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Color the default target is cleared to until `SetBackgroundColor` arrives.
    pub background_color: LinearRgba,
    /// Default surface rectangle until `SetDefaultSurfaceRect` arrives.
    pub surface_rect: Rect,
    /// Frame delta in seconds until `SetFrameDeltaTime` arrives.
    pub frame_delta: f32,
    /// Post-process queue capacity. `None` means unbounded; zero is treated
    /// as one.
    pub post_process_capacity: Option<usize>,
    /// How many instruction streams may wait for their message batch.
    pub max_pending_streams: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: LinearRgba::BLACK,
            surface_rect: Rect::from_size(800, 600),
            frame_delta: 1.0 / 60.0,
            post_process_capacity: Some(256),
            max_pending_streams: 4,
        }
    }
}

impl RenderConfig {
    /// Parses a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Serializes the config as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = RenderConfig::from_ron_str("(post_process_capacity: None)").unwrap();
        assert_eq!(config.post_process_capacity, None);
        assert_eq!(config.max_pending_streams, 4);
        assert_eq!(config.surface_rect, Rect::from_size(800, 600));
    }

    #[test]
    fn saved_config_loads_back() {
        let config = RenderConfig {
            background_color: LinearRgba::RED,
            surface_rect: Rect::new(0, 0, 320, 240),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.ron");
        std::fs::write(&path, config.to_ron_string().unwrap()).unwrap();

        assert_eq!(RenderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = RenderConfig::from_ron_str("(frame_delta: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = RenderConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(format!("{err}").contains("/definitely/not/here.ron"));
    }
}
