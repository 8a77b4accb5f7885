use std::{sync::Arc, time::Instant};

use anyhow::Context;
use imgui::{Condition, FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{Event, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    window::Window,
};

use crate::{config::ExperienceConfig, experience::ExperienceState, rendering::renderer::Renderer};

/// Page pixels per scroll-wheel line.
const SCROLL_LINE_HEIGHT: f32 = 40.0;

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    experience: ExperienceState,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn from_experience(experience: ExperienceState) -> Self {
        Self {
            renderer: None,
            experience,
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(&mut self, window: &Window) {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        self.imgui = Some(ImguiState { context, platform });
    }

    /// One frame: advance the experience, draw the tuning panel,
    /// render, present.
    fn redraw(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let imgui = self.imgui.as_mut().unwrap();

        let delta_time = self.last_frame.elapsed();
        let now = Instant::now();
        imgui.context.io_mut().update_delta_time(delta_time);
        self.last_frame = now;

        let renderer = self.renderer.as_mut().unwrap();
        renderer.window.request_redraw();

        imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
            .expect("Failed to prepare Imgui frame");

        let ui = imgui.context.new_frame();

        self.experience.update(now);
        draw_tuning_panel(ui, &mut self.experience);

        match renderer.render(&mut self.experience) {
            Ok(frame) => {
                renderer.finish_frame(frame, &mut imgui.context);
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }
    }
}

fn draw_tuning_panel(ui: &mut imgui::Ui, experience: &mut ExperienceState) {
    if experience.params.is_empty() {
        return;
    }

    ui.window("Tuning")
        .position([16.0, 16.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            for param in experience.params.params_mut() {
                if ui.slider(param.name, param.min, param.max, &mut param.value) {
                    param.mark_changed();
                }
            }
        });
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title("vitrine")
            .with_transparent(true)
            .with_inner_size(LogicalSize::new(
                self.experience.width,
                self.experience.height,
            ));
        let window = event_loop.create_window(window_attributes).unwrap();
        self.setup_imgui(&window);
        let state = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.experience,
            &mut self.imgui.as_mut().unwrap().context,
        ))
        .unwrap();
        self.renderer = Some(state);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let renderer = self.renderer.as_mut().unwrap();
                let scale_factor = renderer.window.scale_factor();
                renderer.resize(*new_size, scale_factor);

                let logical = new_size.to_logical::<u32>(scale_factor);
                self.experience
                    .resize(logical.width, logical.height, Instant::now());

                // One immediate frame so the resized surface is not
                // presented stale.
                self.redraw(event_loop);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scale_factor = self
                    .renderer
                    .as_ref()
                    .map_or(1.0, |renderer| renderer.window.scale_factor());

                // Wheel-down scrolls the page down.
                let page_delta = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => -*lines * SCROLL_LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(position) => -(position.y / scale_factor) as f32,
                };

                self.experience.scroll_by(page_delta, Instant::now());
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }

        {
            let imgui = self.imgui.as_mut().unwrap();
            let window = self.renderer.as_mut().unwrap().window.as_ref();
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                window,
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let config = ExperienceConfig::showcase(1280, 720)?;
    let experience = ExperienceState::new(config).context("Failed to create experience")?;
    let mut app = App::from_experience(experience);
    event_loop.run_app(&mut app)?;

    Ok(())
}
