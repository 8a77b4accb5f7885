//! Scene lighting: a flat ambient term plus one shadow-casting
//! directional light.

use glam::{Mat4, Vec3};

/// Half-extent of the directional light's orthographic shadow frustum.
const SHADOW_EXTENT: f32 = 6.0;

const SHADOW_NEAR: f32 = 0.1;

pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.8,
        }
    }
}

/// Off-axis key light. Its x position is live-editable through the
/// debug-parameter registry.
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    /// Far plane of the shadow camera, bounding the depth range the
    /// map has to cover.
    pub shadow_far: f32,
    /// Offset applied along the surface normal before the shadow
    /// lookup, to reduce acne on curved meshes.
    pub shadow_normal_bias: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 4.0,
            position: Vec3::new(1.0, 2.0, 5.0),
            cast_shadow: true,
            shadow_far: 10.0,
            shadow_normal_bias: 0.027,
        }
    }
}

impl DirectionalLight {
    /// Direction the light shines in (toward the origin), normalized.
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize()
    }

    /// View-projection of the shadow camera: an orthographic frustum
    /// from the light's position toward the origin.
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::orthographic_rh(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            SHADOW_NEAR,
            self.shadow_far,
        );
        projection * view
    }
}
