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

//! Opens a window and draws the shader-animated triangles until it is closed.
//!
//! Takes an optional path to a TOML configuration file as its only argument.

mod window;

use shader_pulse::Config;

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use winit::event_loop::EventLoop;

fn main() -> ExitCode {
    let start = Instant::now();
    tracing_subscriber::fmt::init();

    let config = match env::args_os().nth(1) {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let event_loop = EventLoop::new();
    let setup = match window::GlutinSetup::new(&event_loop, &config.window) {
        Ok(setup) => setup,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    setup.run(event_loop, config, start)
}
