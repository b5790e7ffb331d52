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

//! Linking compiled shaders into a program.

use crate::config::UniformConfig;
use crate::gpu_backend::GpuContext;
use crate::shader::CompiledShader;
use crate::{CallOnDrop, Error};

use ahash::RandomState;
use hashbrown::HashMap;

use std::fmt;
use std::mem;

/// Seconds since the renderer started. Written every frame.
pub const TIME: &str = "time";

/// Period of the vertex animation, in seconds. Written once.
pub const LOOP_DURATION: &str = "loopDuration";

/// Period of the fragment color cycle, in seconds. Written once.
pub const LOOP_DURATION_FRAG: &str = "loopDurationFrag";

/// The uniforms that are resolved once the program links.
pub const UNIFORMS: [&str; 3] = [TIME, LOOP_DURATION, LOOP_DURATION_FRAG];

/// A linked program and the locations of its uniforms.
pub struct Program<C: GpuContext + ?Sized> {
    /// The program object.
    program: C::Program,

    /// Uniform name to location. `None` is the "not found" location.
    uniforms: HashMap<String, Option<C::UniformLocation>, RandomState>,
}

impl<C: GpuContext + ?Sized> fmt::Debug for Program<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("program", &self.program)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

impl<C: GpuContext + ?Sized> Program<C> {
    /// The underlying program object.
    pub fn handle(&self) -> C::Program {
        self.program
    }

    /// Ask the driver where a uniform lives.
    ///
    /// A name that is not an active uniform gives `None`. That is not an error: writes to
    /// `None` are dropped by the driver.
    pub fn locate_uniform(&self, context: &C, name: &str) -> Option<C::UniformLocation> {
        context.uniform_location(self.program, name)
    }

    /// Resolve and remember the locations of `names`.
    pub fn resolve_uniforms(&mut self, context: &C, names: &[&str]) {
        for &name in names {
            let location = self.locate_uniform(context, name);
            if location.is_none() {
                tracing::debug!("uniform {name} is not active in program {:?}", self.program);
            }

            self.uniforms.insert(name.to_owned(), location);
        }
    }

    /// The remembered location of a uniform.
    ///
    /// Names that were never resolved, or that resolved to nothing, give `None`.
    pub fn uniform(&self, name: &str) -> Option<&C::UniformLocation> {
        self.uniforms.get(name).and_then(Option::as_ref)
    }

    /// Write a float uniform. The program must be bound.
    pub fn set_f32(&self, context: &C, name: &str, value: f32) {
        context.uniform_1_f32(self.uniform(name), value);
    }

    /// Write the loop durations, which never change afterwards.
    pub fn write_constants(&self, context: &C, uniforms: &UniformConfig) {
        context.use_program(Some(self.program));
        let _unbind_program = CallOnDrop(|| context.use_program(None));

        self.set_f32(context, LOOP_DURATION, uniforms.loop_duration);
        self.set_f32(context, LOOP_DURATION_FRAG, uniforms.loop_duration_frag);
    }
}

/// Attach `shaders` to a new program in order and link it.
///
/// On failure the program object is deleted and the driver log is returned in
/// [`Error::Link`]. The shaders themselves are left alone either way; the caller releases
/// them once this returns.
pub fn link_program<C: GpuContext + ?Sized>(
    context: &C,
    shaders: &[CompiledShader<C>],
) -> Result<Program<C>, Error> {
    let program = context.create_program().map_err(|err| {
        Error::Backend(format!("failed to create shader program: {err}").into())
    })?;
    let _delete_program = CallOnDrop(|| context.delete_program(program));

    for shader in shaders {
        context.attach_shader(program, shader.handle());
    }
    context.link_program(program);

    if !context.program_link_status(program) {
        let log = context.program_info_log(program);
        return Err(Error::Link { log });
    }

    mem::forget(_delete_program);
    tracing::debug!("linked program {program:?} from {} shaders", shaders.len());

    Ok(Program {
        program,
        uniforms: HashMap::with_hasher(RandomState::new()),
    })
}
