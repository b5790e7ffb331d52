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

//! A triangle pair animated entirely by its shaders.
//!
//! This crate holds everything about the demo that does not depend on a particular graphics
//! binding: reading the shader sources, compiling and linking them, uploading the vertex
//! data once, and the per-frame draw. The graphics API itself sits behind the
//! [`GpuContext`] trait; the `shader-pulse-glow` crate implements it for [`glow`].
//!
//! Initialization happens once through [`initialize`], which either returns a
//! [`RenderContext`] or an [`Error`] describing why the program cannot run. The
//! [`RenderContext`] is then handed to [`render_frame`] on every tick of the windowing
//! system's event loop. [`Lifecycle`] wraps both steps into the program's state machine.
//!
//! Everything here assumes it is called on the one thread that owns the graphics context.
//!
//! [`glow`]: https://crates.io/crates/glow

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod config;
mod error;
mod frame;
mod geometry;
mod gpu_backend;
mod lifecycle;
mod program;
mod shader;
mod source;

#[cfg(test)]
mod mock;

pub use self::config::{Config, ConfigError, ShaderPaths, UniformConfig, WindowConfig};
pub use self::error::Error;
pub use self::frame::{render_frame, DisplaySurface};
pub use self::geometry::{
    AttributeSpan, GeometryBuffer, COLORS, COLOR_OFFSET, COMPONENTS, FLOAT_COUNT, POSITIONS,
    VERTEX_COUNT, VERTICES,
};
pub use self::gpu_backend::{GpuContext, ShaderStage};
pub use self::lifecycle::Lifecycle;
pub use self::program::{link_program, Program, LOOP_DURATION, LOOP_DURATION_FRAG, TIME, UNIFORMS};
pub use self::shader::{compile_shader, CompiledShader};
pub use self::source::ShaderSource;

use arrayvec::ArrayVec;

use std::fmt;

/// At most one shader per stage.
const MAX_STAGES: usize = ShaderStage::ALL.len();

/// Everything the frame step needs, built once by [`initialize`].
pub struct RenderContext<C: GpuContext + ?Sized> {
    /// The linked program, with its uniforms resolved.
    program: Program<C>,

    /// The static vertex data.
    geometry: GeometryBuffer<C>,

    /// The color each frame starts from.
    clear_color: [f32; 4],
}

impl<C: GpuContext + ?Sized> fmt::Debug for RenderContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("program", &self.program)
            .field("geometry", &self.geometry)
            .field("clear_color", &self.clear_color)
            .finish()
    }
}

impl<C: GpuContext + ?Sized> RenderContext<C> {
    /// The linked program.
    pub fn program(&self) -> &Program<C> {
        &self.program
    }

    /// The vertex buffer.
    pub fn geometry(&self) -> &GeometryBuffer<C> {
        &self.geometry
    }

    /// The color each frame is cleared to.
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }
}

/// Read the configured shader sources and build the [`RenderContext`].
///
/// Every source file is read before anything is allocated on the GPU, so a missing file
/// leaves the context untouched.
pub fn initialize<C: GpuContext + ?Sized>(
    context: &C,
    config: &Config,
) -> Result<RenderContext<C>, Error> {
    let sources = config
        .shaders
        .stages()
        .into_iter()
        .map(|(stage, path)| ShaderSource::read(path).map(|source| (stage, source)))
        .collect::<Result<ArrayVec<_, MAX_STAGES>, _>>()?;

    initialize_from_sources(context, config, &sources)
}

/// Build the [`RenderContext`] from sources that are already in memory.
///
/// The shaders are compiled and attached in the order given, then released once the program
/// has linked. Afterwards the uniforms are resolved, the loop durations are written and the
/// vertex data is uploaded.
pub fn initialize_from_sources<C: GpuContext + ?Sized>(
    context: &C,
    config: &Config,
    sources: &[(ShaderStage, ShaderSource)],
) -> Result<RenderContext<C>, Error> {
    let mut shaders = Vec::with_capacity(sources.len());
    for (stage, source) in sources {
        match compile_shader(context, *stage, source.text()) {
            Ok(shader) => shaders.push(shader),
            Err(err) => {
                tracing::error!("failed to compile {}", source.path().display());
                shaders.into_iter().for_each(|shader| shader.release(context));
                return Err(err);
            }
        }
    }

    let program = link_program(context, &shaders);
    shaders.into_iter().for_each(|shader| shader.release(context));
    let mut program = program?;

    program.resolve_uniforms(context, &UNIFORMS);
    program.write_constants(context, &config.uniforms);

    let geometry = GeometryBuffer::new(context, &VERTICES)?;

    Ok(RenderContext {
        program,
        geometry,
        clear_color: config.clear_color,
    })
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
