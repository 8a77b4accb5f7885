//! Easing curves for timed interpolation.

/// How progress maps to interpolation weight.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadInOut,
    /// Slow start and end, fast middle. The curve used for all
    /// section-driven tweens.
    CubicInOut,
}

impl Easing {
    /// Evaluate the curve at `t`. Input is clamped to [0, 1].
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::QuadInOut, Easing::CubicInOut] {
            assert_eq!(easing.evaluate(0.0), 0.0);
            assert_eq!(easing.evaluate(1.0), 1.0);
        }
    }

    #[test]
    fn test_midpoint() {
        assert!((Easing::Linear.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::QuadInOut.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::CubicInOut.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic() {
        for easing in [Easing::Linear, Easing::QuadInOut, Easing::CubicInOut] {
            let mut previous = 0.0;
            for step in 1..=100 {
                let value = easing.evaluate(step as f32 / 100.0);
                assert!(value >= previous, "{:?} not monotonic", easing);
                previous = value;
            }
        }
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(Easing::CubicInOut.evaluate(-1.0), 0.0);
        assert_eq!(Easing::CubicInOut.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_cubic_symmetry() {
        // In/out halves mirror each other around the midpoint.
        for step in 0..=50 {
            let t = step as f32 / 100.0;
            let a = Easing::CubicInOut.evaluate(t);
            let b = Easing::CubicInOut.evaluate(1.0 - t);
            assert!((a + b - 1.0).abs() < 1e-5);
        }
    }
}
