// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-pulse`.
//
// `shader-pulse` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-pulse` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-pulse`. If not, see <https://www.gnu.org/licenses/>.

//! The program's state machine.

use crate::frame::{render_frame, DisplaySurface};
use crate::gpu_backend::GpuContext;
use crate::{initialize, Config, Error, RenderContext};

use std::fmt;

/// Where the program is in its life.
///
/// It starts out `Uninitialized`, moves to `Running` once initialization succeeds and stays
/// there, drawing a frame per tick. A failed initialization moves it to `Terminated` for
/// good.
pub enum Lifecycle<C: GpuContext + ?Sized> {
    /// Waiting for a graphics context.
    Uninitialized,

    /// Initialized and drawing.
    Running(RenderContext<C>),

    /// Initialization failed.
    Terminated,
}

impl<C: GpuContext + ?Sized> Default for Lifecycle<C> {
    fn default() -> Self {
        Lifecycle::Uninitialized
    }
}

impl<C: GpuContext + ?Sized> fmt::Debug for Lifecycle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Uninitialized => f.write_str("Uninitialized"),
            Lifecycle::Running(render) => f.debug_tuple("Running").field(render).finish(),
            Lifecycle::Terminated => f.write_str("Terminated"),
        }
    }
}

impl<C: GpuContext + ?Sized> Lifecycle<C> {
    /// Create a new, uninitialized lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize against `context`.
    ///
    /// Only does anything while `Uninitialized`, and returns `Ok(false)` otherwise. The error
    /// is handed back so the caller can report it; the state is already `Terminated` by then.
    pub fn start(&mut self, context: &C, config: &Config) -> Result<bool, Error> {
        if !matches!(self, Lifecycle::Uninitialized) {
            return Ok(false);
        }

        tracing::info!("GL version: {}", context.version_string());

        match initialize(context, config) {
            Ok(render) => {
                tracing::info!("initialized, entering the frame loop");
                *self = Lifecycle::Running(render);
                Ok(true)
            }
            Err(err) => {
                tracing::error!("initialization failed: {err}");
                *self = Lifecycle::Terminated;
                Err(err)
            }
        }
    }

    /// Draw a frame if running. Returns whether anything was drawn.
    pub fn tick<S: DisplaySurface + ?Sized>(&self, context: &C, surface: &mut S) -> bool {
        match self {
            Lifecycle::Running(render) => {
                render_frame(context, render, surface);
                true
            }
            _ => false,
        }
    }

    /// Whether initialization has succeeded.
    pub fn is_running(&self) -> bool {
        matches!(self, Lifecycle::Running(_))
    }

    /// Whether initialization has failed.
    pub fn is_terminated(&self) -> bool {
        matches!(self, Lifecycle::Terminated)
    }
}
