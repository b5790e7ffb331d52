// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-pulse-glow`.
//
// `shader-pulse-glow` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-pulse-glow` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-pulse-glow`. If not, see <https://www.gnu.org/licenses/>.

//! A [`glow`] backend for `shader-pulse`.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;

use shader_pulse::{AttributeSpan, Error, GpuContext, ShaderStage};

use std::fmt;

/// A wrapper around a `glow` context.
pub struct GlowContext<H: HasContext + ?Sized> {
    /// Vertex array that stays bound for the lifetime of the context.
    ///
    /// Core profiles refuse attribute pointers without one.
    vao: H::VertexArray,

    /// The underlying context.
    context: H,
}

impl<H: HasContext> GlowContext<H> {
    /// Create a new [`GlowContext`] from a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and must be current whenever any of
    /// the [`GpuContext`] methods are called.
    pub unsafe fn new(context: H) -> Result<Self, Error> {
        // Check that the version is supported.
        let version = context.version();
        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major >= 3 && version.minor >= 3)
        };
        if !has_supported_version {
            return Err(Error::ContextInit(format!(
                "OpenGL version 3.3 (or 3.0 ES) or higher is required, got {}.{}",
                version.major, version.minor
            )));
        }

        let vao = context
            .create_vertex_array()
            .map_err(|err| Error::ContextInit(format!("failed to create vertex array: {err}")))?;
        context.bind_vertex_array(Some(vao));

        gl_error(&context);

        Ok(Self { vao, context })
    }
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }
}

/// An object allocation failure reported by [`glow`].
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

impl<H: HasContext + ?Sized> GpuContext for GlowContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Buffer = H::Buffer;
    type UniformLocation = H::UniformLocation;
    type Error = GlError;

    fn version_string(&self) -> String {
        unsafe { self.context.get_parameter_string(glow::VERSION) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        debug_assert_eq!(shader_type, stage.as_gl_enum());

        unsafe { self.context.create_shader(shader_type).gl_err() }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) {
        unsafe {
            self.context.shader_source(shader, source);
            self.context.compile_shader(shader);
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe {
            self.context.delete_shader(shader);
        }
    }

    fn create_program(&self) -> Result<Self::Program, Self::Error> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe {
            self.context.attach_shader(program, shader);
        }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe {
            self.context.link_program(program);
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe {
            self.context.delete_program(program);
        }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe {
            self.context.use_program(program);
        }
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32) {
        unsafe {
            self.context.uniform_1_f32(location, value);
        }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, Self::Error> {
        unsafe { self.context.create_buffer().gl_err() }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe {
            self.context.bind_buffer(glow::ARRAY_BUFFER, buffer);
        }
    }

    fn buffer_static_data(&self, data: &[u8]) {
        unsafe {
            self.context
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }

        gl_error(&self.context);
    }

    fn read_buffer(&self, dst: &mut [u8]) {
        unsafe {
            self.context
                .get_buffer_sub_data(glow::ARRAY_BUFFER, 0, dst);
        }

        gl_error(&self.context);
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.context.clear_color(r, g, b, a);
            self.context.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe {
            self.context.enable_vertex_attrib_array(index);
        }
    }

    fn disable_vertex_attrib(&self, index: u32) {
        unsafe {
            self.context.disable_vertex_attrib_array(index);
        }
    }

    fn vertex_attrib_pointer(&self, span: &AttributeSpan) {
        unsafe {
            // Pointers are recorded into whichever vertex array is bound.
            self.context.bind_vertex_array(Some(self.vao));
            self.context.vertex_attrib_pointer_f32(
                span.index,
                span.components as i32,
                glow::FLOAT,
                false,
                0,
                span.offset as i32,
            );
        }

        gl_error(&self.context);
    }

    fn draw_triangles(&self, first: usize, count: usize) {
        unsafe {
            self.context
                .draw_arrays(glow::TRIANGLES, first as i32, count as i32);
        }

        gl_error(&self.context);
    }
}

fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        let error_str = match err {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => "Unknown GL error",
        };

        tracing::error!("GL error: {}", error_str)
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_failures_become_gl_errors() {
        let result: Result<u32, String> = Err("no more names".into());
        let err = result.gl_err().unwrap_err();
        assert_eq!(err.to_string(), "gl error: no more names");
    }

    #[test]
    fn wraps_into_backend_error() {
        let err = Error::Backend(Box::new(GlError::from(String::from("out of memory"))));
        assert_eq!(err.to_string(), "backend error: gl error: out of memory");
    }
}
