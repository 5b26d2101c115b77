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

//! Stable identifiers for render-side resources.
//!
//! Identifiers are minted by the logic thread (usually through an
//! [`IdGenerator`]) and travel inside lifecycle messages. The render thread
//! never invents them; it only uses them as registry keys.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Wraps a raw identifier value.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            #[inline]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a renderer owned by the resource registry.
    RendererId
);
define_id!(
    /// Identifies a geometry owned by the resource registry.
    GeometryId
);
define_id!(
    /// Identifies an attribute buffer within its parent geometry.
    AttributeBufferId
);
define_id!(
    /// Identifies a render tracker owned by the resource registry.
    TrackerId
);
define_id!(
    /// Identifies an offscreen frame buffer owned by the resource registry.
    FrameBufferId
);
define_id!(
    /// Identifies a texture owned by the texture cache.
    TextureId
);
define_id!(
    /// Identifies an external resource whose completion is reported upstream.
    ResourceId
);

/// A thread-safe, monotonically increasing source of raw identifiers.
///
/// Zero is never handed out so it can be used as a sentinel by callers.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first value is `1`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next raw identifier.
    pub fn next_raw(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Mints a new typed identifier.
    pub fn next<T: From<u64>>(&self) -> T {
        T::from(self.next_raw())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_from_raw {
    ($($name:ident),*) => {
        $(
            impl From<u64> for $name {
                fn from(raw: u64) -> Self {
                    Self(raw)
                }
            }
        )*
    };
}

impl_from_raw!(
    RendererId,
    GeometryId,
    AttributeBufferId,
    TrackerId,
    FrameBufferId,
    TextureId,
    ResourceId
);
