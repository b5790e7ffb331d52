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

//! The static vertex data and its layout.

use crate::gpu_backend::GpuContext;
use crate::Error;

use std::fmt;
use std::mem;

/// Floats per vertex attribute vector.
pub const COMPONENTS: usize = 3;

/// Number of vertices drawn each frame, which is also the number of vectors in each span.
pub const VERTEX_COUNT: usize = 6;

/// Total number of floats in the buffer: one span of positions, one span of colors.
pub const FLOAT_COUNT: usize = 2 * VERTEX_COUNT * COMPONENTS;

/// Byte offset of the color span.
pub const COLOR_OFFSET: usize = VERTEX_COUNT * COMPONENTS * mem::size_of::<f32>();

/// Two triangles worth of positions, followed by one color per vertex.
#[rustfmt::skip]
pub const VERTICES: [f32; FLOAT_COUNT] = [
    // Positions.
    -1.0, -1.0, 0.0,
     1.0, -1.0, 0.0,
     0.0,  1.0, 0.0,
    -1.0,  1.0, 0.0,
    -0.5,  1.0, 0.0,
    -1.0,  0.0, 0.0,

    // Colors.
     1.0,  0.0, 0.0,
     0.0,  1.0, 0.0,
     0.0,  0.0, 1.0,
     1.0,  1.0, 0.0,
     1.0,  0.0, 1.0,
     0.0,  1.0, 1.1,
];

/// A run of tightly packed float vectors inside the vertex buffer, bound to one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpan {
    /// The vertex attribute index.
    pub index: u32,

    /// Floats per vector.
    pub components: u32,

    /// Byte offset of the first vector.
    pub offset: usize,
}

/// Attribute 0: positions, from the start of the buffer.
pub const POSITIONS: AttributeSpan = AttributeSpan {
    index: 0,
    components: COMPONENTS as u32,
    offset: 0,
};

/// Attribute 1: colors, right after the positions.
pub const COLORS: AttributeSpan = AttributeSpan {
    index: 1,
    components: COMPONENTS as u32,
    offset: COLOR_OFFSET,
};

/// A write-once vertex buffer.
pub struct GeometryBuffer<C: GpuContext + ?Sized> {
    /// The buffer object.
    buffer: C::Buffer,

    /// Number of floats uploaded.
    len: usize,
}

impl<C: GpuContext + ?Sized> fmt::Debug for GeometryBuffer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("buffer", &self.buffer)
            .field("len", &self.len)
            .finish()
    }
}

impl<C: GpuContext + ?Sized> GeometryBuffer<C> {
    /// Upload `data` into a new static buffer.
    ///
    /// There is no way to change the contents afterwards.
    pub fn new(context: &C, data: &[f32; FLOAT_COUNT]) -> Result<Self, Error> {
        let buffer = context.create_buffer().map_err(|err| {
            Error::Backend(format!("failed to create vertex buffer: {err}").into())
        })?;

        context.bind_array_buffer(Some(buffer));
        context.buffer_static_data(bytemuck::cast_slice(data));
        context.bind_array_buffer(None);

        tracing::debug!("uploaded {} floats into buffer {buffer:?}", data.len());

        Ok(Self {
            buffer,
            len: data.len(),
        })
    }

    /// The underlying buffer object.
    pub fn handle(&self) -> C::Buffer {
        self.buffer
    }

    /// Number of floats in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no floats.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the buffer contents back through the backend.
    pub fn read_back(&self, context: &C) -> Vec<f32> {
        let mut floats = vec![0.0f32; self.len];

        context.bind_array_buffer(Some(self.buffer));
        context.read_buffer(bytemuck::cast_slice_mut(&mut floats));
        context.bind_array_buffer(None);

        floats
    }
}
