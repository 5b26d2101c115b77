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

//! Global logger setup.

use env_logger::Env;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Once;

/// Logger configuration.
///
/// `default_filter` uses the `env_logger` filter syntax and only applies when
/// `RUST_LOG` is unset. `modules` maps module paths to level overrides applied
/// on top of it, e.g. `{"vellum_render::executor": "trace"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
    /// Per-module level overrides.
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// The module overrides as an `env_logger` filter string.
    pub fn module_filters(&self) -> String {
        self.modules
            .iter()
            .map(|(module, level)| format!("{module}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger.
///
/// Idempotent: only the first call has an effect. Intended to be called
/// early in `main`.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder =
            env_logger::Builder::from_env(Env::default().default_filter_or(&config.default_filter));
        let overrides = config.module_filters();
        if !overrides.is_empty() {
            builder.parse_filters(&overrides);
        }
        match builder.try_init() {
            Ok(()) => log::debug!("Logging initialized"),
            Err(err) => eprintln!("Logger already installed: {err}"),
        }
    });
}
