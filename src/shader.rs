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

//! Compiling shader source into shader objects.

use crate::gpu_backend::{GpuContext, ShaderStage};
use crate::{CallOnDrop, Error};

use std::fmt;
use std::mem;

/// A shader object that compiled successfully.
///
/// It stays alive until [`CompiledShader::release`] is called, which is safe to do as soon as
/// every program it is attached to has been linked.
pub struct CompiledShader<C: GpuContext + ?Sized> {
    shader: C::Shader,
    stage: ShaderStage,
}

impl<C: GpuContext + ?Sized> fmt::Debug for CompiledShader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("shader", &self.shader)
            .field("stage", &self.stage)
            .finish()
    }
}

impl<C: GpuContext + ?Sized> CompiledShader<C> {
    /// The underlying shader object.
    pub fn handle(&self) -> C::Shader {
        self.shader
    }

    /// The stage this shader was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Delete the shader object.
    pub fn release(self, context: &C) {
        tracing::debug!("releasing {} shader {:?}", self.stage, self.shader);
        context.delete_shader(self.shader);
    }
}

/// Compile `source` as a shader of the given stage.
///
/// `stage` is either a [`ShaderStage`] or a raw OpenGL shader type. A raw type that names
/// none of the supported stages fails with [`Error::UnsupportedStage`] before anything is
/// allocated. On a compile failure the shader object is deleted and the driver log is
/// returned unchanged in [`Error::Compile`].
pub fn compile_shader<C, S>(context: &C, stage: S, source: &str) -> Result<CompiledShader<C>, Error>
where
    C: GpuContext + ?Sized,
    S: TryInto<ShaderStage>,
    Error: From<S::Error>,
{
    let stage = stage.try_into()?;

    let shader = context.create_shader(stage).map_err(|err| {
        Error::Backend(format!("error creating shader of type {stage}: {err}").into())
    })?;
    let _delete_shader = CallOnDrop(|| context.delete_shader(shader));

    context.compile_shader(shader, source);

    if !context.shader_compile_status(shader) {
        let log = context.shader_info_log(shader);
        return Err(Error::Compile { stage, log });
    }

    mem::forget(_delete_shader);
    tracing::debug!("compiled {stage} shader {shader:?}");

    Ok(CompiledShader { shader, stage })
}
