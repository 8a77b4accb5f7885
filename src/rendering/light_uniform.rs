use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::lighting::{AmbientLight, DirectionalLight};

/// GPU-side lighting state. Layout must match the WGSL `Lighting`
/// struct in `assets/shaders/shared/lighting.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, Default)]
pub struct LightUniform {
    light_view_proj: Mat4,
    /// xyz: normalized light direction, w: shadow normal bias.
    direction: Vec4,
    /// rgb: light color, w: intensity.
    color: Vec4,
    /// rgb: ambient color, w: ambient intensity.
    ambient: Vec4,
}

impl LightUniform {
    pub fn update(&mut self, ambient: &AmbientLight, sun: &DirectionalLight) {
        self.light_view_proj = sun.view_projection();
        self.direction = sun.direction().extend(sun.shadow_normal_bias);
        self.color = sun.color.extend(sun.intensity);
        self.ambient = ambient.color.extend(ambient.intensity);
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}
