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

//! Window and context setup.
//!
//! Uses glutin to put an OpenGL context on a winit window, then drives the renderer's
//! lifecycle from the event loop.

use shader_pulse::{Config, DisplaySurface, Error, Lifecycle, WindowConfig};
use shader_pulse_glow::GlowContext;

use glow::HasContext;

use glutin::config::{Config as GlutinConfig, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;

use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawWindowHandle};

use std::mem;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

type Renderer = GlowContext<glow::Context>;

pub(crate) struct GlutinSetup {
    display: Display,
    config: GlutinConfig,
    context: ContextType,
    window: Option<Window>,
    window_config: WindowConfig,
}

enum ContextType {
    NotCurrent(NotCurrentContext),
    Current {
        context: PossiblyCurrentContext,
        window: Window,
        surface: Surface<WindowSurface>,
    },
    Hole,
}

impl Default for ContextType {
    fn default() -> Self {
        Self::Hole
    }
}

fn make_window_builder(config: &WindowConfig) -> WindowBuilder {
    WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_position(PhysicalPosition::new(config.x, config.y))
}

fn context_error(what: &str, err: impl std::fmt::Display) -> Error {
    Error::ContextInit(format!("{what}: {err}"))
}

fn create_display<T>(
    event_loop: &EventLoopWindowTarget<T>,
    _window_handle: Option<RawWindowHandle>,
) -> Result<Display, Error> {
    #[cfg(windows)]
    let preference = DisplayApiPreference::WglThenEgl(_window_handle);

    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;

    #[cfg(target_os = "android")]
    let preference = DisplayApiPreference::Egl;

    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    let preference = DisplayApiPreference::GlxThenEgl(Box::new(
        winit::platform::x11::register_xlib_error_hook,
    ));

    unsafe { Display::new(event_loop.raw_display_handle(), preference) }
        .map_err(|err| context_error("failed to open the GL display", err))
}

/// The first accelerated config, or the first config at all.
fn pick_config<T>(
    configs: impl Iterator<Item = T>,
    accelerated: impl Fn(&T) -> bool,
) -> Option<T> {
    configs.reduce(|accum, config| {
        if accelerated(&config) && !accelerated(&accum) {
            config
        } else {
            accum
        }
    })
}

impl GlutinSetup {
    pub(crate) fn new<T>(
        event_loop: &EventLoopWindowTarget<T>,
        window_config: &WindowConfig,
    ) -> Result<Self, Error> {
        // WGL needs the window before the display.
        let window = if cfg!(windows) {
            let window = make_window_builder(window_config)
                .build(event_loop)
                .map_err(|err| context_error("failed to create the window", err))?;
            Some(window)
        } else {
            None
        };
        let window_handle = window.as_ref().map(|w| w.raw_window_handle());

        let display = create_display(event_loop, window_handle)?;

        let mut template = ConfigTemplateBuilder::new().with_alpha_size(8);
        if let Some(handle) = window_handle {
            template = template.compatible_with_native_window(handle);
        }

        // Double-buffered RGBA; prefer hardware acceleration.
        let configs = unsafe { display.find_configs(template.build()) }
            .map_err(|err| context_error("failed to find a GL config", err))?;
        let gl_config = pick_config(configs, |config| config.hardware_accelerated())
            .ok_or_else(|| Error::ContextInit("no GL config fits an RGBA window".into()))?;

        tracing::debug!("picked GL config {:?}", &gl_config);

        // Try a few different contexts, newest first.
        let contexts = [
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
                .build(window_handle),
            ContextAttributesBuilder::new().build(window_handle),
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
                .build(window_handle),
        ];

        let context = contexts
            .iter()
            .find_map(|attributes| unsafe { display.create_context(&gl_config, attributes) }.ok())
            .ok_or_else(|| Error::ContextInit("could not create an OpenGL context".into()))?;

        Ok(Self {
            display,
            config: gl_config,
            context: ContextType::NotCurrent(context),
            window,
            window_config: window_config.clone(),
        })
    }

    fn make_current<T>(
        &mut self,
        window_target: &EventLoopWindowTarget<T>,
    ) -> Result<glow::Context, Error> {
        let window = match self.window.take() {
            Some(window) => window,
            None => glutin_winit::finalize_window(
                window_target,
                make_window_builder(&self.window_config),
                &self.config,
            )
            .map_err(|err| context_error("failed to create the window", err))?,
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { self.display.create_window_surface(&self.config, &attrs) }
            .map_err(|err| context_error("failed to create the window surface", err))?;

        // Make it current.
        let gl_context = match mem::take(&mut self.context) {
            ContextType::NotCurrent(context) => context
                .make_current(&gl_surface)
                .map_err(|err| context_error("failed to make the context current", err))?,
            _ => return Err(Error::ContextInit("the context is already current".into())),
        };

        // Try setting vsync.
        if let Some(interval) = NonZeroU32::new(1) {
            if let Err(err) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(interval))
            {
                tracing::warn!("error setting vsync: {err}");
            }
        }

        self.context = ContextType::Current {
            context: gl_context,
            window,
            surface: gl_surface,
        };

        // Set up the glow context.
        let display = &self.display;
        let glow_context = unsafe {
            glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s) as *const _)
        };

        #[cfg(not(target_vendor = "apple"))]
        unsafe {
            if glow_context.supported_extensions().contains("GL_KHR_debug") {
                glow_context.enable(glow::DEBUG_OUTPUT);
                glow_context.debug_message_callback(debug_message_callback);
            }
        }

        Ok(glow_context)
    }

    /// Bring up the context and run initialization against it.
    fn resume<T>(
        &mut self,
        window_target: &EventLoopWindowTarget<T>,
        config: &Config,
        lifecycle: &mut Lifecycle<Renderer>,
    ) -> Result<Renderer, Error> {
        let glow_context = self.make_current(window_target)?;

        // SAFETY: make_current just made the context current on this thread.
        let renderer = unsafe { GlowContext::new(glow_context)? };
        lifecycle.start(&renderer, config)?;

        if let ContextType::Current { window, .. } = &self.context {
            window.request_redraw();
        }

        Ok(renderer)
    }

    pub(crate) fn run(mut self, event_loop: EventLoop<()>, config: Config, start: Instant) -> ! {
        let mut renderer = None;
        let mut lifecycle = Lifecycle::new();

        event_loop.run(move |event, window_target, control_flow| {
            control_flow.set_wait();

            match event {
                Event::Resumed => {
                    if renderer.is_some() || lifecycle.is_terminated() {
                        return;
                    }

                    match self.resume(window_target, &config, &mut lifecycle) {
                        Ok(resumed) => renderer = Some(resumed),
                        Err(err) => {
                            eprintln!("error: {err}");
                            control_flow.set_exit_with_code(1);
                        }
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            // Some platforms like EGL require resizing GL surface to update the size.
                            if let ContextType::Current {
                                context, surface, ..
                            } = &self.context
                            {
                                surface.resize(context, width, height);
                            }

                            if let Some(renderer) = &renderer {
                                unsafe {
                                    renderer.context().viewport(
                                        0,
                                        0,
                                        size.width as i32,
                                        size.height as i32,
                                    );
                                }
                            }
                        }
                    }
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    _ => (),
                },
                Event::RedrawRequested(_) => {
                    if let (
                        Some(renderer),
                        ContextType::Current {
                            context,
                            window,
                            surface,
                        },
                    ) = (&renderer, &self.context)
                    {
                        let mut frame = GlutinFrame {
                            start,
                            window,
                            context,
                            surface,
                        };
                        lifecycle.tick(renderer, &mut frame);
                    }
                }
                _ => (),
            }
        })
    }
}

/// One frame's view of the window.
struct GlutinFrame<'a> {
    start: Instant,
    window: &'a Window,
    context: &'a PossiblyCurrentContext,
    surface: &'a Surface<WindowSurface>,
}

impl DisplaySurface for GlutinFrame<'_> {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn present(&mut self) {
        if let Err(err) = self.surface.swap_buffers(self.context) {
            tracing::warn!("failed to swap buffers: {err}");
        }
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let source = match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        glow::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    };

    let ty = match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        glow::DEBUG_TYPE_OTHER => "Other",
        _ => "Unknown",
    };

    match severity {
        glow::DEBUG_SEVERITY_HIGH => {
            tracing::error!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_LOW => {
            tracing::info!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_NOTIFICATION => {
            tracing::debug!("{ty}-{id} ({source}): {message}");
        }
        _ => (),
    };
}
