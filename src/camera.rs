use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Vertical field of view: 45 degrees.
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Perspective camera looking down -Z from a point on the view axis.
/// `position.z` is the field section tweens drive.
pub struct Camera {
    pub fov_y: f32,
    pub aspect: f32,
    pub position: Vec3,
}

impl Camera {
    pub fn new(width: u32, height: u32, distance: f32) -> Self {
        Self {
            fov_y: FOV_Y,
            aspect: width as f32 / height as f32,
            position: Vec3::new(0.0, 0.0, distance),
        }
    }

    /// Recompute the aspect ratio for a new viewport. The projection is
    /// rebuilt from it on the next [`Self::view_projection`] call.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.position, -Vec3::Z, Vec3::Y);
        let projection = Mat4::perspective_rh(self.fov_y, self.aspect, NEAR, FAR);
        projection * view
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection();
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_tracks_viewport_exactly() {
        let mut camera = Camera::new(1280, 720, 8.0);
        assert_eq!(camera.aspect, 1280.0 / 720.0);

        camera.set_aspect(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);

        camera.set_aspect(333, 777);
        assert_eq!(camera.aspect, 333.0 / 777.0);
    }

    #[test]
    fn test_view_projection_is_finite() {
        let camera = Camera::new(1280, 720, 8.0);
        let vp = camera.view_projection();

        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_camera_distance_moves_the_origin_deeper() {
        // The origin sits further down the view axis as z grows.
        let near = Camera::new(1280, 720, 4.0);
        let far = Camera::new(1280, 720, 8.0);

        let origin = glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let near_clip = near.view_projection() * origin;
        let far_clip = far.view_projection() * origin;

        assert!(far_clip.z / far_clip.w > near_clip.z / near_clip.w);
    }
}
