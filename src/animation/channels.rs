//! Keyed tween channels for section-driven animation.
//!
//! Each animated field has exactly one channel. Starting a tween on a
//! channel supersedes the in-flight one, so two sections entering in
//! quick succession never race writes on the same field.

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::animation::{easing::Easing, tween::Tween};

/// All section tweens share one time window and one curve.
pub const SECTION_TWEEN_DURATION: Duration = Duration::from_secs(1);
pub const SECTION_TWEEN_EASING: Easing = Easing::CubicInOut;

#[derive(Default)]
pub struct TweenChannels {
    model_x: Option<Tween<f32>>,
    model_rotation: Option<Tween<Vec3>>,
    camera_z: Option<Tween<f32>>,
}

/// Interpolated values for one frame. `None` means the channel is idle
/// and the field should be left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChannelSamples {
    pub model_x: Option<f32>,
    pub model_rotation: Option<Vec3>,
    pub camera_z: Option<f32>,
}

impl TweenChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_model_x(&mut self, from: f32, to: f32, now: Instant) {
        self.model_x = Some(Tween::new(
            from,
            to,
            now,
            SECTION_TWEEN_DURATION,
            SECTION_TWEEN_EASING,
        ));
    }

    pub fn begin_model_rotation(&mut self, from: Vec3, to: Vec3, now: Instant) {
        self.model_rotation = Some(Tween::new(
            from,
            to,
            now,
            SECTION_TWEEN_DURATION,
            SECTION_TWEEN_EASING,
        ));
    }

    pub fn begin_camera_z(&mut self, from: f32, to: f32, now: Instant) {
        self.camera_z = Some(Tween::new(
            from,
            to,
            now,
            SECTION_TWEEN_DURATION,
            SECTION_TWEEN_EASING,
        ));
    }

    /// Sample every active channel at `now`. A finished channel emits
    /// its final value one last time and is then dropped.
    pub fn sample(&mut self, now: Instant) -> ChannelSamples {
        ChannelSamples {
            model_x: sample_channel(&mut self.model_x, now),
            model_rotation: sample_channel(&mut self.model_rotation, now),
            camera_z: sample_channel(&mut self.camera_z, now),
        }
    }

    #[allow(dead_code)]
    pub fn is_idle(&self) -> bool {
        self.model_x.is_none() && self.model_rotation.is_none() && self.camera_z.is_none()
    }
}

fn sample_channel<V: crate::animation::tween::Animatable>(
    channel: &mut Option<Tween<V>>,
    now: Instant,
) -> Option<V> {
    let tween = channel.as_ref()?;
    let value = tween.sample(now);

    if tween.is_finished(now) {
        *channel = None;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_channels_sample_nothing() {
        let mut channels = TweenChannels::new();
        let samples = channels.sample(Instant::now());

        assert!(samples.model_x.is_none());
        assert!(samples.model_rotation.is_none());
        assert!(samples.camera_z.is_none());
        assert!(channels.is_idle());
    }

    #[test]
    fn test_channels_run_over_the_same_window() {
        let start = Instant::now();
        let mut channels = TweenChannels::new();
        channels.begin_model_x(0.0, 3.0, start);
        channels.begin_model_rotation(Vec3::ZERO, Vec3::new(0.0, 1.2, 0.0), start);
        channels.begin_camera_z(8.0, 4.0, start);

        let end = start + SECTION_TWEEN_DURATION;
        let samples = channels.sample(end);

        assert_eq!(samples.model_x, Some(3.0));
        assert_eq!(samples.model_rotation, Some(Vec3::new(0.0, 1.2, 0.0)));
        assert_eq!(samples.camera_z, Some(4.0));

        // All three finished together.
        assert!(channels.is_idle());
    }

    #[test]
    fn test_finished_channel_emits_final_value_once() {
        let start = Instant::now();
        let mut channels = TweenChannels::new();
        channels.begin_camera_z(8.0, 4.0, start);

        let end = start + SECTION_TWEEN_DURATION;
        assert_eq!(channels.sample(end).camera_z, Some(4.0));
        assert_eq!(channels.sample(end).camera_z, None);
    }

    #[test]
    fn test_restart_supersedes_in_flight_tween() {
        let start = Instant::now();
        let mut channels = TweenChannels::new();
        channels.begin_model_x(0.0, 3.0, start);

        // A second section enters halfway through; its tween replaces
        // the first outright.
        let halfway = start + SECTION_TWEEN_DURATION / 2;
        let current = channels.sample(halfway).model_x.unwrap();
        channels.begin_model_x(current, -3.0, halfway);

        let first_end = start + SECTION_TWEEN_DURATION;
        let sampled = channels.sample(first_end).model_x.unwrap();
        assert_ne!(sampled, 3.0, "superseded tween must not land");

        let second_end = halfway + SECTION_TWEEN_DURATION;
        assert_eq!(channels.sample(second_end).model_x, Some(-3.0));
    }

    #[test]
    fn test_unrelated_channels_survive_a_restart() {
        let start = Instant::now();
        let mut channels = TweenChannels::new();
        channels.begin_model_x(0.0, 3.0, start);
        channels.begin_camera_z(8.0, 4.0, start);

        channels.begin_model_x(1.0, -3.0, start + Duration::from_millis(10));

        let end = start + SECTION_TWEEN_DURATION;
        assert_eq!(channels.sample(end).camera_z, Some(4.0));
    }
}
