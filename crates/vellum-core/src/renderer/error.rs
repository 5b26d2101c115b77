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

//! Defines the hierarchy of error types a graphics backend can report.

use std::fmt;

/// An error related to the compilation or linking of a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The program source failed to compile or link.
    CompilationError {
        /// A descriptive label for the shader.
        label: String,
        /// Detailed messages from the shader compiler.
        details: String,
    },
    /// A required stage had no source at all.
    EmptyStage {
        /// A descriptive label for the shader.
        label: String,
        /// The stage that was empty (`"vertex"` or `"fragment"`).
        stage: &'static str,
    },
    /// The program was not compiled because the context is not current.
    ContextUnavailable,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::EmptyStage { label, stage } => {
                write!(f, "Shader '{label}' has an empty {stage} stage")
            }
            ShaderError::ContextUnavailable => {
                write!(f, "No graphics context is available to compile shaders")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// The handle used to reference a resource is unknown to the backend.
    InvalidHandle,
    /// The backend refused an allocation.
    OutOfMemory {
        /// Size of the rejected request in bytes.
        requested: u64,
    },
    /// The graphics context was lost while the operation was in flight.
    ContextLost,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle."),
            ResourceError::OutOfMemory { requested } => {
                write!(f, "Out of GPU memory allocating {requested} bytes")
            }
            ResourceError::ContextLost => write!(f, "The graphics context was lost."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// An error reported by a [`ShaderExporter`](crate::renderer::traits::ShaderExporter) sink.
#[derive(Debug)]
pub enum ExportError {
    /// The receiving end of the sink is gone.
    Disconnected,
    /// Writing the binary to persistent storage failed.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Disconnected => write!(f, "Shader export sink is disconnected"),
            ExportError::Io(err) => write!(f, "Failed to persist shader binary: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Disconnected => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::CompilationError {
            label: "Flat".to_string(),
            details: "Syntax error at line 5".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Shader compilation failed for 'Flat': Syntax error at line 5"
        );

        let empty = ShaderError::EmptyStage {
            label: "Flat".to_string(),
            stage: "fragment",
        };
        assert_eq!(format!("{empty}"), "Shader 'Flat' has an empty fragment stage");
    }

    #[test]
    fn resource_error_wraps_shader_error() {
        let res_err: ResourceError = ShaderError::ContextUnavailable.into();
        assert_eq!(
            format!("{res_err}"),
            "Shader resource error: No graphics context is available to compile shaders"
        );
        assert!(res_err.source().is_some());
        assert!(ResourceError::ContextLost.source().is_none());
    }

    #[test]
    fn export_error_exposes_io_source() {
        let err: ExportError = std::io::Error::other("disk full").into();
        assert_eq!(format!("{err}"), "Failed to persist shader binary: disk full");
        assert!(err.source().is_some());
        assert!(ExportError::Disconnected.source().is_none());
    }
}
