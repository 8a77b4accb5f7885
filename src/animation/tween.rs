//! A tween interpolates one value from its current state to a target
//! over a fixed duration.

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::animation::easing::Easing;

/// Values a [`Tween`] knows how to interpolate.
pub trait Animatable: Copy {
    fn lerp(from: Self, to: Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for Vec3 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

/// A single in-flight interpolation. The start time is explicit so the
/// caller owns the clock.
#[derive(Debug, Clone, Copy)]
pub struct Tween<V: Animatable> {
    from: V,
    to: V,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl<V: Animatable> Tween<V> {
    pub fn new(from: V, to: V, started: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            started,
            duration,
            easing,
        }
    }

    /// Normalized progress in [0, 1]. A zero-duration tween is complete
    /// immediately.
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started);

        if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// The interpolated value at `now`.
    pub fn sample(&self, now: Instant) -> V {
        let t = self.easing.evaluate(self.progress(now));
        V::lerp(self.from, self.to, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let start = Instant::now();
        let tween = Tween::new(
            0.0f32,
            10.0,
            start,
            Duration::from_millis(100),
            Easing::Linear,
        );

        assert!((tween.progress(start) - 0.0).abs() < 0.01);
        assert!((tween.progress(start + Duration::from_millis(50)) - 0.5).abs() < 0.01);
        assert!((tween.progress(start + Duration::from_millis(100)) - 1.0).abs() < 0.01);
        assert!((tween.progress(start + Duration::from_millis(250)) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_sample_linear() {
        let start = Instant::now();
        let tween = Tween::new(
            2.0f32,
            6.0,
            start,
            Duration::from_millis(100),
            Easing::Linear,
        );

        let mid = tween.sample(start + Duration::from_millis(50));
        assert!((mid - 4.0).abs() < 0.05);

        let end = tween.sample(start + Duration::from_millis(100));
        assert_eq!(end, 6.0);
    }

    #[test]
    fn test_sample_vec3() {
        let start = Instant::now();
        let tween = Tween::new(
            Vec3::ZERO,
            Vec3::new(0.0, 1.2, 0.0),
            start,
            Duration::from_secs(1),
            Easing::CubicInOut,
        );

        let end = tween.sample(start + Duration::from_secs(1));
        assert!((end - Vec3::new(0.0, 1.2, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let start = Instant::now();
        let tween = Tween::new(0.0f32, 5.0, start, Duration::ZERO, Easing::CubicInOut);

        assert!(tween.is_finished(start));
        assert_eq!(tween.sample(start), 5.0);
    }

    #[test]
    fn test_is_finished() {
        let start = Instant::now();
        let tween = Tween::new(
            0.0f32,
            1.0,
            start,
            Duration::from_millis(100),
            Easing::CubicInOut,
        );

        assert!(!tween.is_finished(start));
        assert!(!tween.is_finished(start + Duration::from_millis(99)));
        assert!(tween.is_finished(start + Duration::from_millis(100)));
    }
}
