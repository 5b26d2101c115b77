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

//! Tracks whether the graphics context may be called and which context
//! incarnation a cached GPU handle belongs to.

/// Lifecycle phase of the graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    /// No `context_created` notification has arrived yet.
    Pending,
    /// The context accepts calls.
    Active,
    /// The context was destroyed; every handle is meaningless.
    Destroyed,
}

/// Validity flag plus a generation counter bumped on every context creation.
#[derive(Debug, Clone)]
pub struct ContextState {
    phase: ContextPhase,
    generation: u64,
}

impl ContextState {
    /// Creates a state that waits for the first `context_created`.
    pub fn new() -> Self {
        Self {
            phase: ContextPhase::Pending,
            generation: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// Returns `true` if GPU calls may be issued.
    pub fn is_valid(&self) -> bool {
        self.phase == ContextPhase::Active
    }

    /// Generation of the current (or last) context.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a new context as live and starts a new generation.
    pub fn created(&mut self) -> u64 {
        self.generation += 1;
        self.phase = ContextPhase::Active;
        self.generation
    }

    /// Marks the context as gone.
    pub fn destroyed(&mut self) {
        self.phase = ContextPhase::Destroyed;
    }

    /// Stamps a freshly created handle with the current generation.
    pub fn stamp<H: Copy>(&self, handle: H) -> Generational<H> {
        Generational {
            handle,
            generation: self.generation,
        }
    }

    /// Returns the handle if it is usable right now.
    pub fn resolve<H: Copy>(&self, cached: Option<&Generational<H>>) -> Option<H> {
        cached
            .filter(|c| self.is_valid() && c.generation == self.generation)
            .map(|c| c.handle)
    }
}

impl Default for ContextState {
    fn default() -> Self {
        Self::new()
    }
}

/// A GPU handle tagged with the context generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generational<H> {
    /// The raw backend handle.
    pub handle: H,
    /// The context generation it belongs to.
    pub generation: u64,
}
