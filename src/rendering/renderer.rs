use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::CameraUniform,
    experience::ExperienceState,
    rendering::{
        imgui_renderer::PanelRenderer,
        instance::gather_instances,
        light_uniform::LightUniform,
        passes::{
            forward_pass::{ForwardPass, ForwardPassTextureViews},
            shadow_pass::{ShadowPass, ShadowPassTextureViews},
            ScenePass,
        },
        render_common::RenderCommon,
        render_model::{render_model_instances, render_model_shadow_instances, RenderModel},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
};

/// Cap on the device pixel ratio, bounding GPU cost on high-density
/// displays.
const MAX_PIXEL_RATIO: f64 = 2.0;

pub fn clamped_pixel_ratio(scale_factor: f64) -> f64 {
    scale_factor.max(0.0).min(MAX_PIXEL_RATIO)
}

/// Render resolution for a window: its logical size times the clamped
/// pixel ratio. Below the cap this is the window's own pixel size.
pub fn render_target_size(size: PhysicalSize<u32>, scale_factor: f64) -> PhysicalSize<u32> {
    if scale_factor <= 0.0 {
        return size;
    }

    let ratio = clamped_pixel_ratio(scale_factor) / scale_factor;
    PhysicalSize::new(
        ((size.width as f64 * ratio).round() as u32).max(1),
        ((size.height as f64 * ratio).round() as u32).max(1),
    )
}

/// A frame with the scene already encoded, waiting for the debug
/// panel overlay and presentation.
pub struct FrameOutput {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,
    scale_factor: f64,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    camera_uniform: CameraUniform,
    light_uniform: LightUniform,
    render_models: Arena<RenderModel>,

    shader_loader: ShaderLoader,

    shadow_pass: ShadowPass,
    forward_pass: ForwardPass,
    panel_renderer: PanelRenderer,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        state: &ExperienceState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create graphics device")?;

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(&state.camera);
        let camera_buffer = camera_uniform.create_buffer(&device);

        let mut light_uniform = LightUniform::default();
        light_uniform.update(&state.ambient, &state.sun);
        let light_buffer = light_uniform.create_buffer(&device);

        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            render_target_size(size, scale_factor),
            camera_buffer,
            light_buffer,
        ));

        let (depth_texture, surface_format) = {
            let config = common
                .output_surface_config
                .read()
                .expect("Surface config lock poisoned");
            (DepthTexture::new(&device, &config, "Depth Texture"), config.format)
        };

        let mut cache_builder = PipelineCacheBuilder::new();
        let shadow_pass = ShadowPass::create(&device, common.clone(), &mut cache_builder)?;
        let forward_pass = ForwardPass::create(&device, common.clone(), &mut cache_builder)?;
        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let panel_renderer = PanelRenderer::new(&device, &queue, surface_format, imgui_context);

        Ok(Self {
            window,
            size,
            scale_factor,
            surface,
            device,
            queue,
            common,
            depth_texture,
            camera_uniform,
            light_uniform,
            render_models: Arena::new(),
            shader_loader,
            shadow_pass,
            forward_pass,
            panel_renderer,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.scale_factor = scale_factor;

        let target = render_target_size(new_size, scale_factor);

        {
            let mut config = self
                .common
                .output_surface_config
                .write()
                .expect("Surface config lock poisoned");
            config.width = target.width;
            config.height = target.height;
            self.surface.configure(&self.device, &config);
            self.depth_texture.resize(&self.device, &config);
        }
    }

    /// Reconfigure at the current size, for lost/outdated surfaces.
    pub fn reconfigure(&mut self) {
        self.resize(self.size, self.scale_factor);
    }

    /// Models attached after startup (the asynchronously loaded asset)
    /// get their GPU buffers on the first frame they exist.
    fn upload_new_models(&mut self, state: &mut ExperienceState) {
        for (_, scene_model) in &mut state.scene.models {
            if scene_model.render_model.is_none() {
                let render_model = RenderModel::from_model(&self.device, &scene_model.model);
                scene_model.render_model = Some(self.render_models.alloc(render_model));
                log::info!(
                    "Uploaded model {} with {} primitives",
                    scene_model.name,
                    scene_model.model.primitives.len()
                );
            }
        }
    }

    pub fn render(
        &mut self,
        state: &mut ExperienceState,
    ) -> Result<FrameOutput, wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();
        self.upload_new_models(state);

        self.camera_uniform.update(&state.camera);
        self.camera_uniform
            .update_buffer(&self.queue, &self.common.camera_uniform_buffer);
        self.light_uniform.update(&state.ambient, &state.sun);
        self.light_uniform
            .update_buffer(&self.queue, &self.common.light_uniform_buffer);

        gather_instances(&state.scene, &mut self.render_models);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;

        self.shadow_pass.render(
            &ShadowPassTextureViews {
                depth: self.common.shadow_map.view.clone(),
            },
            &mut encoder,
            pipeline_cache,
            |render_pass| {
                if !state.sun.cast_shadow {
                    return;
                }

                for (_id, render_model) in self.render_models.iter() {
                    if !render_model.shadow_instances.should_render() {
                        continue;
                    }

                    render_model_shadow_instances(render_pass, &self.queue, render_model);
                }
            },
        );

        self.forward_pass.render(
            &ForwardPassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            pipeline_cache,
            |render_pass| {
                for (_id, render_model) in self.render_models.iter() {
                    if !render_model.instances.should_render() {
                        continue;
                    }

                    render_model_instances(render_pass, &self.queue, render_model);
                }
            },
        );

        Ok(FrameOutput {
            output,
            view,
            encoder,
        })
    }

    /// Draws the debug panel over the frame and presents it.
    pub fn finish_frame(&mut self, frame: FrameOutput, context: &mut imgui::Context) {
        let FrameOutput {
            output,
            view,
            mut encoder,
        } = frame;

        self.panel_renderer
            .render(&view, context, &self.device, &self.queue, &mut encoder);

        self.queue.submit([encoder.finish()]);
        output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_is_capped_at_two() {
        assert_eq!(clamped_pixel_ratio(1.0), 1.0);
        assert_eq!(clamped_pixel_ratio(1.5), 1.5);
        assert_eq!(clamped_pixel_ratio(2.0), 2.0);
        assert_eq!(clamped_pixel_ratio(3.0), 2.0);
        assert_eq!(clamped_pixel_ratio(0.0), 0.0);
    }

    #[test]
    fn test_render_target_matches_window_below_the_cap() {
        let size = PhysicalSize::new(2560, 1440);
        assert_eq!(render_target_size(size, 2.0), size);
        assert_eq!(render_target_size(size, 1.0), size);
    }

    #[test]
    fn test_render_target_shrinks_above_the_cap() {
        // A 3x display renders at 2x: two thirds of the window pixels.
        let size = PhysicalSize::new(3840, 2160);
        let target = render_target_size(size, 3.0);

        assert_eq!(target, PhysicalSize::new(2560, 1440));
    }

    #[test]
    fn test_render_target_survives_degenerate_scale() {
        let size = PhysicalSize::new(1280, 720);
        assert_eq!(render_target_size(size, 0.0), size);
    }
}
