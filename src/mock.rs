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

//! An in-memory `GpuContext` that records what it is asked to do.

use crate::frame::DisplaySurface;
use crate::geometry::AttributeSpan;
use crate::gpu_backend::{GpuContext, ShaderStage};
use crate::source::ShaderSource;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

pub(crate) const VERTEX: &str = "#version 330
layout(location = 0) in vec4 position;
layout(location = 1) in vec4 color;
uniform float loopDuration;
uniform float time;
void main() {}
";

pub(crate) const FRAGMENT: &str = "#version 330
uniform float loopDurationFrag;
uniform float time;
void main() {}
";

/// Any source containing "syntax error" fails to compile with [`COMPILE_LOG`].
pub(crate) const BAD_SOURCE: &str = "#version 330\nvoid main() { syntax error }\n";

pub(crate) const COMPILE_LOG: &str = "0:2(15): error: syntax error, unexpected IDENTIFIER\n";

/// Programs without a vertex shader fail to link with this log.
pub(crate) const LINK_LOG: &str = "error: program lacks a vertex shader\n";

pub(crate) fn demo_sources() -> Vec<(ShaderStage, ShaderSource)> {
    vec![
        (ShaderStage::Vertex, ShaderSource::from_text("shader.vs", VERTEX)),
        (ShaderStage::Fragment, ShaderSource::from_text("shader.fs", FRAGMENT)),
    ]
}

/// A state-changing call, in the order it was made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Call {
    Clear([f32; 4]),
    UseProgram(Option<u32>),
    Uniform(Option<u32>, f32),
    BindBuffer(Option<u32>),
    EnableAttrib(u32),
    DisableAttrib(u32),
    AttribPointer(AttributeSpan),
    Draw { first: usize, count: usize },
}

#[derive(Debug)]
pub(crate) struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("out of handles")
    }
}

impl StdError for MockError {}

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    deleted: bool,
}

struct ProgramRecord {
    attached: Vec<u32>,
    linked: bool,
    deleted: bool,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct State {
    next_handle: u32,
    shaders: BTreeMap<u32, ShaderRecord>,
    programs: BTreeMap<u32, ProgramRecord>,
    buffers: BTreeMap<u32, Vec<u8>>,
    bound_buffer: Option<u32>,
    calls: Vec<Call>,
    fail_allocations: bool,
}

impl State {
    fn allocate(&mut self) -> Result<u32, MockError> {
        if self.fail_allocations {
            return Err(MockError);
        }

        self.next_handle += 1;
        Ok(self.next_handle)
    }
}

#[derive(Default)]
pub(crate) struct RecordingContext {
    state: RefCell<State>,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_allocations(&self) {
        self.state.borrow_mut().fail_allocations = true;
    }

    pub(crate) fn shaders_created(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state
            .borrow()
            .shaders
            .values()
            .filter(|shader| !shader.deleted)
            .count()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state
            .borrow()
            .programs
            .values()
            .filter(|program| !program.deleted)
            .count()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub(crate) fn shader_stage(&self, shader: u32) -> Option<ShaderStage> {
        self.state.borrow().shaders.get(&shader).map(|s| s.stage)
    }

    pub(crate) fn attached(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub(crate) fn buffer_bytes(&self, buffer: u32) -> Vec<u8> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub(crate) fn uniform_writes(&self) -> Vec<(Option<u32>, f32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match *call {
                Call::Uniform(location, value) => Some((location, value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn draws(&self) -> Vec<(usize, usize)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match *call {
                Call::Draw { first, count } => Some((first, count)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Names declared as `uniform float <name>;` in `source`.
fn declared_uniforms(source: &str) -> impl Iterator<Item = &str> {
    source.lines().filter_map(|line| {
        line.trim()
            .strip_prefix("uniform float ")
            .and_then(|rest| rest.strip_suffix(';'))
            .map(str::trim)
    })
}

impl GpuContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;
    type Error = MockError;

    fn version_string(&self) -> String {
        "3.3 (recording)".into()
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, MockError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate()?;
        state.shaders.insert(
            handle,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
                deleted: false,
            },
        );
        Ok(handle)
    }

    fn compile_shader(&self, shader: u32, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_owned();
            record.compiled = !source.contains("syntax error");
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            COMPILE_LOG.into()
        }
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.deleted = true;
        }
    }

    fn create_program(&self) -> Result<u32, MockError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate()?;
        state.programs.insert(
            handle,
            ProgramRecord {
                attached: Vec::new(),
                linked: false,
                deleted: false,
                uniforms: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.attached.push(shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let State {
            shaders, programs, ..
        } = &mut *state;

        if let Some(record) = programs.get_mut(&program) {
            let attached: Vec<&ShaderRecord> = record
                .attached
                .iter()
                .filter_map(|handle| shaders.get(handle))
                .collect();

            record.linked = attached
                .iter()
                .any(|shader| shader.stage == ShaderStage::Vertex && shader.compiled);

            let mut uniforms: Vec<String> = attached
                .iter()
                .copied()
                .flat_map(|shader| declared_uniforms(&shader.source))
                .map(str::to_owned)
                .collect();
            uniforms.sort();
            uniforms.dedup();
            record.uniforms = uniforms;
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            LINK_LOG.into()
        }
    }

    fn delete_program(&self, program: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.deleted = true;
        }
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let record = state.programs.get(&program).filter(|p| p.linked)?;
        record
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| index as u32)
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_1_f32(&self, location: Option<&u32>, value: f32) {
        self.record(Call::Uniform(location.copied(), value));
    }

    fn create_buffer(&self) -> Result<u32, MockError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate()?;
        state.buffers.insert(handle, Vec::new());
        Ok(handle)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().bound_buffer = buffer;
        self.record(Call::BindBuffer(buffer));
    }

    fn buffer_static_data(&self, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(bound) = state.bound_buffer {
            state.buffers.insert(bound, data.to_vec());
        }
    }

    fn read_buffer(&self, dst: &mut [u8]) {
        let state = self.state.borrow();
        if let Some(data) = state.bound_buffer.and_then(|b| state.buffers.get(&b)) {
            let len = dst.len().min(data.len());
            dst[..len].copy_from_slice(&data[..len]);
        }
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn disable_vertex_attrib(&self, index: u32) {
        self.record(Call::DisableAttrib(index));
    }

    fn vertex_attrib_pointer(&self, span: &AttributeSpan) {
        self.record(Call::AttribPointer(*span));
    }

    fn draw_triangles(&self, first: usize, count: usize) {
        self.record(Call::Draw { first, count });
    }
}

/// A surface with a frozen clock.
pub(crate) struct RecordingSurface {
    elapsed: Duration,
    presented: usize,
    redraws: Cell<usize>,
}

impl RecordingSurface {
    pub(crate) fn at(elapsed: Duration) -> Self {
        Self {
            elapsed,
            presented: 0,
            redraws: Cell::new(0),
        }
    }

    pub(crate) fn presented(&self) -> usize {
        self.presented
    }

    pub(crate) fn redraws_requested(&self) -> usize {
        self.redraws.get()
    }
}

impl DisplaySurface for RecordingSurface {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn present(&mut self) {
        self.presented += 1;
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}
