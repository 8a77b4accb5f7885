//! CPU-side state of the showcase: scene, camera, lights, scroll
//! position, tween channels and the debug-parameter registry. The
//! renderer consumes this state; it never mutates it.

use std::f32::consts::TAU;
use std::time::Instant;

use anyhow::Context;
use glam::Vec3;

use crate::animation::channels::TweenChannels;
use crate::camera::Camera;
use crate::config::ExperienceConfig;
use crate::lighting::{AmbientLight, DirectionalLight};
use crate::loader::{AssetLoader, GltfAsset};
use crate::params::{ParamRegistry, ParamTarget};
use crate::scene_graph::{Object3D, ObjectId, Scene};
use crate::sections::SectionObserver;

/// Uniform scale applied to the loaded model.
const MODEL_SCALE: f32 = 0.005;
/// Initial model pitch, radians.
const MODEL_INITIAL_PITCH: f32 = 1.5;
/// Yaw rate of the placeholder cube, radians per second.
const CUBE_YAW_RATE: f32 = 0.5;

pub struct ExperienceState {
    pub config: ExperienceConfig,
    pub width: u32,
    pub height: u32,
    pub scroll: f32,
    pub camera: Camera,
    pub start_time: Instant,
    pub scene: Scene,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    /// Reference cube. Never attached to the scene; the frame update
    /// spins it as a liveness marker.
    pub cube: Object3D,
    pub params: ParamRegistry,
    loader: Option<AssetLoader>,
    model: Option<ObjectId>,
    observer: SectionObserver,
    tweens: TweenChannels,
}

impl ExperienceState {
    pub fn new(config: ExperienceConfig) -> anyhow::Result<Self> {
        let (width, height) = (config.width, config.height);

        // The load starts now; the result is picked up by update().
        let loader = AssetLoader::spawn(config.model_path.clone());
        let scene = Scene::new();
        let start_time = Instant::now();

        let observer = SectionObserver::new(config.sections.clone());
        let camera = Camera::new(width, height, config.default_camera_z);

        let ambient = AmbientLight::default();
        let sun = DirectionalLight::default();

        let mut params = ParamRegistry::new();
        params.register(
            "light x",
            -10.0,
            10.0,
            sun.position.x,
            ParamTarget::DirectionalLightX,
        );

        let mut cube = Object3D::named("placeholder-cube");
        cube.transform.set_translation(Vec3::new(2.0, 0.0, 0.0));

        let mut state = Self {
            config,
            width,
            height,
            scroll: 0.0,
            camera,
            start_time,
            scene,
            ambient,
            sun,
            cube,
            params,
            loader: Some(loader),
            model: None,
            observer,
            tweens: TweenChannels::new(),
        };

        // Baseline pass: sections already inside the band must not
        // fire an entry later without leaving first.
        state.evaluate_sections(start_time);

        Ok(state)
    }

    #[allow(dead_code)]
    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// New viewport size. The band depends on the viewport height, so
    /// visibility is re-evaluated as well.
    pub fn resize(&mut self, width: u32, height: u32, now: Instant) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.camera.set_aspect(width, height);
        self.evaluate_sections(now);
    }

    /// Scroll the page by `delta` pixels, clamped to the page range.
    pub fn scroll_by(&mut self, delta: f32, now: Instant) {
        let max_scroll = self.config.max_scroll(self.height as f32);
        self.scroll = (self.scroll + delta).clamp(0.0, max_scroll);
        self.evaluate_sections(now);
    }

    fn evaluate_sections(&mut self, now: Instant) {
        let entered = self.observer.observe(self.scroll, self.height as f32);
        for index in entered {
            self.enter_section(index, now);
        }
    }

    /// A section crossed into the visibility band. Starts the three
    /// keyed tweens; a start on a busy channel supersedes the tween
    /// already running there.
    fn enter_section(&mut self, index: usize, now: Instant) {
        // Nothing to animate until the model has arrived.
        let Some(model_id) = self.model else {
            return;
        };

        let descriptor = *self.observer.section(index);

        let Some(transform) = self.scene.get_object_transform(model_id) else {
            return;
        };
        let current_x = transform.translation().x;
        let current_rotation = transform.rotation();

        self.tweens
            .begin_model_x(current_x, descriptor.target_x, now);
        self.tweens
            .begin_model_rotation(current_rotation, descriptor.target_rotation, now);

        let camera_target = descriptor
            .target_camera_z
            .unwrap_or(self.config.default_camera_z);
        self.tweens
            .begin_camera_z(self.camera.position.z, camera_target, now);
    }

    /// Once per frame: pick up a finished load, advance the cube and
    /// the tween channels, apply debug-parameter edits, refresh world
    /// matrices.
    pub fn update(&mut self, now: Instant) {
        self.poll_loader();

        let elapsed = now.saturating_duration_since(self.start_time).as_secs_f32();
        let yaw = (CUBE_YAW_RATE * elapsed).rem_euclid(TAU);
        self.cube.transform.set_rotation(Vec3::new(0.0, yaw, 0.0));

        let samples = self.tweens.sample(now);
        if let Some(model_id) = self.model {
            if let Some(x) = samples.model_x {
                if let Some(transform) = self.scene.get_object_transform(model_id) {
                    let mut translation = transform.translation();
                    translation.x = x;
                    self.scene.set_object_translation(model_id, translation);
                }
            }
            if let Some(rotation) = samples.model_rotation {
                self.scene.set_object_rotation(model_id, rotation);
            }
        }
        if let Some(z) = samples.camera_z {
            self.camera.position.z = z;
        }

        self.apply_params();

        self.scene.late_update();
    }

    fn poll_loader(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let Some(result) = loader.poll() else {
            return;
        };
        self.loader = None;

        // Best effort: a failed load leaves the scene without a model.
        match result.and_then(|asset| self.attach_model(&asset)) {
            Ok(_) => log::info!("Model attached"),
            Err(e) => log::error!("Model load failed: {e:#}"),
        }
    }

    fn attach_model(&mut self, asset: &GltfAsset) -> anyhow::Result<ObjectId> {
        let gltf_scene = asset
            .document
            .scenes()
            .next()
            .context("No scenes in glTF document")?;

        let root = self.scene.add_object(Object3D::named("model"));
        self.scene
            .spawn_gltf_scene(&asset.buffers, &gltf_scene, Some(root))?;

        self.scene.set_object_transform(
            root,
            Vec3::ZERO,
            Vec3::new(MODEL_INITIAL_PITCH, 0.0, 0.0),
            MODEL_SCALE,
        );
        self.scene.mark_shadow_flags(root);

        self.params.register(
            "model rot y",
            -10.0,
            10.0,
            0.0,
            ParamTarget::ModelRotationY,
        );
        self.params.register(
            "model rot x",
            -1.0,
            1.0,
            MODEL_INITIAL_PITCH,
            ParamTarget::ModelRotationX,
        );

        self.model = Some(root);
        Ok(root)
    }

    fn apply_params(&mut self) {
        let mut params = std::mem::take(&mut self.params);
        params.drain_changes(|target, value| self.write_param(target, value));
        params.refresh(|target| self.read_param(target));
        self.params = params;
    }

    fn read_param(&self, target: ParamTarget) -> Option<f32> {
        match target {
            ParamTarget::DirectionalLightX => Some(self.sun.position.x),
            ParamTarget::ModelRotationX => self.model_rotation().map(|r| r.x),
            ParamTarget::ModelRotationY => self.model_rotation().map(|r| r.y),
        }
    }

    fn write_param(&mut self, target: ParamTarget, value: f32) {
        match target {
            ParamTarget::DirectionalLightX => self.sun.position.x = value,
            ParamTarget::ModelRotationX => self.set_model_rotation_component(0, value),
            ParamTarget::ModelRotationY => self.set_model_rotation_component(1, value),
        }
    }

    fn model_rotation(&self) -> Option<Vec3> {
        let model_id = self.model?;
        self.scene
            .get_object_transform(model_id)
            .map(|transform| transform.rotation())
    }

    fn set_model_rotation_component(&mut self, axis: usize, value: f32) {
        let Some(model_id) = self.model else {
            return;
        };
        let Some(mut rotation) = self.model_rotation() else {
            return;
        };
        rotation[axis] = value;
        self.scene.set_object_rotation(model_id, rotation);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::channels::SECTION_TWEEN_DURATION;

    fn test_state() -> ExperienceState {
        let config = ExperienceConfig::showcase(1280, 720).unwrap();
        let mut state = ExperienceState::new(config).unwrap();
        // Unit tests drive the clock explicitly; the real loader is
        // irrelevant here (and its asset is absent anyway).
        state.loader = None;
        state
    }

    fn attach_test_model(state: &mut ExperienceState) -> ObjectId {
        let root = state.scene.add_object(Object3D::named("model"));
        state.scene.set_object_transform(
            root,
            Vec3::ZERO,
            Vec3::new(MODEL_INITIAL_PITCH, 0.0, 0.0),
            MODEL_SCALE,
        );
        state.model = Some(root);
        root
    }

    fn model_state(state: &ExperienceState) -> (Vec3, Vec3) {
        let transform = state
            .scene
            .get_object_transform(state.model.unwrap())
            .unwrap();
        (transform.translation(), transform.rotation())
    }

    #[test]
    fn test_cube_yaw_is_half_elapsed_time() {
        let mut state = test_state();
        let start = state.start_time;

        state.update(start + Duration::from_secs_f32(3.0));
        assert!((state.cube.transform.rotation().y - 1.5).abs() < 1e-4);

        // Frame-rate independent: jumping straight to a later time
        // gives the same angle as stepping there.
        let mut other = test_state();
        other.start_time = start;
        for step in 1..=30 {
            other.update(start + Duration::from_secs_f32(step as f32 * 0.1));
        }
        assert!(
            (other.cube.transform.rotation().y - state.cube.transform.rotation().y).abs() < 1e-4
        );
    }

    #[test]
    fn test_cube_yaw_wraps_at_tau() {
        let mut state = test_state();
        let start = state.start_time;

        // 0.5 * 4π seconds = one full turn.
        state.update(start + Duration::from_secs_f32(4.0 * std::f32::consts::PI));

        let yaw = state.cube.transform.rotation().y;
        assert!(yaw >= 0.0 && yaw < TAU);
        // Within rounding of a whole turn, i.e. back near zero.
        assert!(yaw.min(TAU - yaw) < 1e-3);
    }

    #[test]
    fn test_resize_updates_camera_aspect_exactly() {
        let mut state = test_state();
        state.resize(1920, 1080, state.start_time);

        assert_eq!(state.width, 1920);
        assert_eq!(state.height, 1080);
        assert_eq!(state.camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_entry_before_load_starts_nothing() {
        let mut state = test_state();
        assert!(!state.model_loaded());

        state.scroll_by(500.0, state.start_time);
        state.update(state.start_time + Duration::from_millis(16));

        assert!(state.tweens.is_idle());
        assert_eq!(state.camera.position.z, 8.0);
    }

    #[test]
    fn test_entry_tweens_model_and_camera_to_section_targets() {
        let mut state = test_state();
        attach_test_model(&mut state);

        // Section 1 carries p=3, rotation (0, 1.2, 0), no camera
        // override.
        let entry = state.start_time + Duration::from_secs(5);
        state.scroll_by(500.0, entry);

        state.update(entry + SECTION_TWEEN_DURATION);

        let (translation, rotation) = model_state(&state);
        assert!((translation.x - 3.0).abs() < 1e-5);
        assert!((rotation - Vec3::new(0.0, 1.2, 0.0)).length() < 1e-5);
        assert!((state.camera.position.z - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_entry_with_camera_override_drives_camera_to_it() {
        let mut state = test_state();
        attach_test_model(&mut state);

        // Section 2 carries c-z=4.
        let entry = state.start_time + Duration::from_secs(5);
        state.scroll_by(1300.0, entry);

        state.update(entry + SECTION_TWEEN_DURATION);

        assert!((state.camera.position.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_tween_is_partway_before_the_window_closes() {
        let mut state = test_state();
        attach_test_model(&mut state);

        let entry = state.start_time + Duration::from_secs(5);
        state.scroll_by(500.0, entry);
        state.update(entry + SECTION_TWEEN_DURATION / 2);

        let (translation, _) = model_state(&state);
        assert!(translation.x > 0.0 && translation.x < 3.0);
        assert!(!state.tweens.is_idle());
    }

    #[test]
    fn test_reentering_a_section_converges_to_the_same_values() {
        let mut state = test_state();
        attach_test_model(&mut state);

        let mut now = state.start_time + Duration::from_secs(5);

        state.scroll_by(500.0, now);
        state.update(now + SECTION_TWEEN_DURATION);
        let first = model_state(&state);
        let first_camera = state.camera.position.z;

        // Leave (back to section 0) and settle there.
        now += Duration::from_secs(2);
        state.scroll_by(-500.0, now);
        state.update(now + SECTION_TWEEN_DURATION);

        // Re-enter section 1 and settle again.
        now += Duration::from_secs(2);
        state.scroll_by(500.0, now);
        state.update(now + SECTION_TWEEN_DURATION);

        let second = model_state(&state);
        assert!((first.0 - second.0).length() < 1e-5);
        assert!((first.1 - second.1).length() < 1e-5);
        assert!((state.camera.position.z - first_camera).abs() < 1e-5);
    }

    #[test]
    fn test_scroll_is_clamped_to_the_page() {
        let mut state = test_state();

        state.scroll_by(-100.0, state.start_time);
        assert_eq!(state.scroll, 0.0);

        state.scroll_by(1e6, state.start_time);
        assert_eq!(state.scroll, state.config.max_scroll(720.0));
    }

    #[test]
    fn test_param_edit_moves_the_light() {
        let mut state = test_state();

        for param in state.params.params_mut() {
            if param.target == ParamTarget::DirectionalLightX {
                param.value = -4.0;
                param.mark_changed();
            }
        }

        state.update(state.start_time + Duration::from_millis(16));
        assert_eq!(state.sun.position.x, -4.0);
    }
}
