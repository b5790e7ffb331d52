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

//! Defines the GPU backend for shader-pulse.

use crate::geometry::AttributeSpan;
use crate::Error;

use std::error::Error as StdError;
use std::fmt;

/// Raw value of `GL_VERTEX_SHADER`.
const GL_VERTEX_SHADER: u32 = 0x8B31;

/// Raw value of `GL_GEOMETRY_SHADER`.
const GL_GEOMETRY_SHADER: u32 = 0x8DD9;

/// Raw value of `GL_FRAGMENT_SHADER`.
const GL_FRAGMENT_SHADER: u32 = 0x8B30;

/// A programmable stage of the pipeline that a shader can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,

    /// The geometry stage.
    Geometry,

    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Every stage, in the order they are attached to a program.
    pub const ALL: [ShaderStage; 3] = [
        ShaderStage::Vertex,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    /// The human readable name of the stage.
    pub fn as_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// The OpenGL enum value for this stage.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => GL_VERTEX_SHADER,
            ShaderStage::Geometry => GL_GEOMETRY_SHADER,
            ShaderStage::Fragment => GL_FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

impl TryFrom<u32> for ShaderStage {
    type Error = Error;

    fn try_from(kind: u32) -> Result<Self, Self::Error> {
        match kind {
            GL_VERTEX_SHADER => Ok(ShaderStage::Vertex),
            GL_GEOMETRY_SHADER => Ok(ShaderStage::Geometry),
            GL_FRAGMENT_SHADER => Ok(ShaderStage::Fragment),
            other => Err(Error::UnsupportedStage(format!("{other:#06x}"))),
        }
    }
}

/// The backend for the renderer.
///
/// This mirrors the small slice of OpenGL that the demo touches. Every method is expected to
/// be called on the thread that owns the current context.
pub trait GpuContext {
    /// The type associated with a shader object.
    type Shader: Copy + fmt::Debug;

    /// The type associated with a linked program object.
    type Program: Copy + fmt::Debug;

    /// The type associated with a buffer object.
    type Buffer: Copy + fmt::Debug;

    /// The location of a uniform inside of a program.
    type UniformLocation: fmt::Debug;

    /// The error type associated with this GPU context.
    type Error: StdError + 'static;

    /// Get the version string reported by the driver.
    fn version_string(&self) -> String;

    /// Allocate a new shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error>;

    /// Set the source of a shader and compile it.
    fn compile_shader(&self, shader: Self::Shader, source: &str);

    /// Whether the last compile of this shader succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// The diagnostic log of this shader, at exactly the length the driver reports.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Release a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Allocate a new program object.
    fn create_program(&self) -> Result<Self::Program, Self::Error>;

    /// Attach a shader to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// The diagnostic log of this program.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Release a program object.
    fn delete_program(&self, program: Self::Program);

    /// Look up a uniform by name.
    ///
    /// Returns `None` if the program has no active uniform with that name.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Bind a program, or unbind with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Write a float uniform of the currently bound program.
    ///
    /// Writes to `None` must be silently discarded.
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32);

    /// Allocate a new buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, Self::Error>;

    /// Bind a buffer to the array buffer target, or unbind with `None`.
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);

    /// Fill the bound array buffer with `data` as static draw data.
    fn buffer_static_data(&self, data: &[u8]);

    /// Read the start of the bound array buffer into `dst`.
    fn read_buffer(&self, dst: &mut [u8]);

    /// Clear the color buffer with the given RGBA color.
    fn clear(&self, color: [f32; 4]);

    /// Enable a vertex attribute array.
    fn enable_vertex_attrib(&self, index: u32);

    /// Disable a vertex attribute array.
    fn disable_vertex_attrib(&self, index: u32);

    /// Point a vertex attribute at a tightly packed float span of the bound array buffer.
    fn vertex_attrib_pointer(&self, span: &AttributeSpan);

    /// Draw non-indexed triangles from the enabled attributes.
    fn draw_triangles(&self, first: usize, count: usize);
}
