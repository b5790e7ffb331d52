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

//! The per-frame draw.

use crate::geometry::{COLORS, POSITIONS, VERTEX_COUNT};
use crate::gpu_backend::GpuContext;
use crate::program::TIME;
use crate::RenderContext;

use std::time::Duration;

/// The surface a frame is drawn onto, provided by the windowing system.
pub trait DisplaySurface {
    /// Monotonic time since the window was started.
    fn elapsed(&self) -> Duration;

    /// Present the frame that was just drawn.
    fn present(&mut self);

    /// Ask for another frame as soon as possible.
    fn request_redraw(&self);
}

/// Draw one frame.
///
/// Clears, writes the elapsed time into `time`, draws the first [`VERTEX_COUNT`] vertices as
/// triangles, then presents and asks for the next frame. Nothing here can fail.
pub fn render_frame<C, S>(context: &C, render: &RenderContext<C>, surface: &mut S)
where
    C: GpuContext + ?Sized,
    S: DisplaySurface + ?Sized,
{
    context.clear(render.clear_color);

    let program = render.program();
    context.use_program(Some(program.handle()));
    program.set_f32(context, TIME, surface.elapsed().as_secs_f32());

    context.bind_array_buffer(Some(render.geometry().handle()));
    for span in [&POSITIONS, &COLORS] {
        context.enable_vertex_attrib(span.index);
        context.vertex_attrib_pointer(span);
    }

    context.draw_triangles(0, VERTEX_COUNT);

    context.disable_vertex_attrib(POSITIONS.index);
    context.disable_vertex_attrib(COLORS.index);
    context.use_program(None);

    surface.present();
    surface.request_redraw();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::COLOR_OFFSET;
    use crate::mock::{demo_sources, Call, RecordingContext, RecordingSurface};
    use crate::{initialize_from_sources, Config};

    fn running(context: &RecordingContext) -> RenderContext<RecordingContext> {
        initialize_from_sources(context, &Config::default(), &demo_sources()).unwrap()
    }

    #[test]
    fn one_second_writes_one() {
        let context = RecordingContext::new();
        let render = running(&context);
        let mut surface = RecordingSurface::at(Duration::from_millis(1000));

        context.clear_calls();
        render_frame(&context, &render, &mut surface);

        let time = render.program().uniform(TIME).copied();
        assert!(time.is_some());
        assert!(context.calls().contains(&Call::Uniform(time, 1.0)));
        assert_eq!(context.draws(), vec![(0, 6)]);
    }

    #[test]
    fn frame_steps_in_order() {
        let context = RecordingContext::new();
        let render = running(&context);
        let mut surface = RecordingSurface::at(Duration::from_millis(2500));

        context.clear_calls();
        render_frame(&context, &render, &mut surface);

        let program = render.program().handle();
        let time = render.program().uniform(TIME).copied();
        let buffer = render.geometry().handle();
        assert_eq!(
            context.calls(),
            vec![
                Call::Clear([0.0, 0.0, 1.0, 0.0]),
                Call::UseProgram(Some(program)),
                Call::Uniform(time, 2.5),
                Call::BindBuffer(Some(buffer)),
                Call::EnableAttrib(0),
                Call::AttribPointer(POSITIONS),
                Call::EnableAttrib(1),
                Call::AttribPointer(COLORS),
                Call::Draw { first: 0, count: 6 },
                Call::DisableAttrib(0),
                Call::DisableAttrib(1),
                Call::UseProgram(None),
            ]
        );
        assert_eq!(surface.presented(), 1);
        assert_eq!(surface.redraws_requested(), 1);
    }

    #[test]
    fn color_attribute_reads_the_second_span() {
        assert_eq!(COLORS.offset, COLOR_OFFSET);
        assert_eq!(COLORS.offset, 72);
        assert_eq!(POSITIONS.offset, 0);
    }

    #[test]
    fn every_tick_draws_again() {
        let context = RecordingContext::new();
        let render = running(&context);
        let mut surface = RecordingSurface::at(Duration::ZERO);

        for _ in 0..3 {
            render_frame(&context, &render, &mut surface);
        }

        assert_eq!(context.draws().len(), 3);
        assert_eq!(surface.presented(), 3);
        assert_eq!(surface.redraws_requested(), 3);
    }
}
