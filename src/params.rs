//! Live-tuning parameter registry.
//!
//! The debug panel is a pure consumer of this registry: it draws one
//! slider per entry and writes changes back through the typed target,
//! never through direct field access. Entries are registered where the
//! owning object is built (the light at startup, the model rotation on
//! load completion).

/// The live fields a parameter can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTarget {
    DirectionalLightX,
    ModelRotationX,
    ModelRotationY,
}

pub struct Param {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub target: ParamTarget,
    changed: bool,
}

impl Param {
    /// The panel calls this after the user moves the slider.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }
}

#[derive(Default)]
pub struct ParamRegistry {
    params: Vec<Param>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        min: f32,
        max: f32,
        initial: f32,
        target: ParamTarget,
    ) {
        self.params.push(Param {
            name,
            min,
            max,
            value: initial,
            target,
            changed: false,
        });
    }

    #[allow(dead_code)]
    pub fn contains(&self, target: ParamTarget) -> bool {
        self.params.iter().any(|param| param.target == target)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params_mut(&mut self) -> &mut [Param] {
        &mut self.params
    }

    /// Pull current live values into entries the user is not editing,
    /// so sliders track tween-driven motion.
    pub fn refresh(&mut self, read: impl Fn(ParamTarget) -> Option<f32>) {
        for param in &mut self.params {
            if !param.changed {
                if let Some(value) = read(param.target) {
                    param.value = value;
                }
            }
        }
    }

    /// Apply and clear every user edit.
    pub fn drain_changes(&mut self, mut write: impl FnMut(ParamTarget, f32)) {
        for param in &mut self.params {
            if param.changed {
                write(param.target, param.value);
                param.changed = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_applies_only_changed_entries() {
        let mut registry = ParamRegistry::new();
        registry.register("light x", -10.0, 10.0, 1.0, ParamTarget::DirectionalLightX);
        registry.register("rotation y", -10.0, 10.0, 0.0, ParamTarget::ModelRotationY);

        registry.params_mut()[1].value = 2.5;
        registry.params_mut()[1].mark_changed();

        let mut writes = Vec::new();
        registry.drain_changes(|target, value| writes.push((target, value)));

        assert_eq!(writes, vec![(ParamTarget::ModelRotationY, 2.5)]);

        // Flags clear after draining.
        writes.clear();
        registry.drain_changes(|target, value| writes.push((target, value)));
        assert!(writes.is_empty());
    }

    #[test]
    fn test_refresh_skips_entries_being_edited() {
        let mut registry = ParamRegistry::new();
        registry.register("light x", -10.0, 10.0, 1.0, ParamTarget::DirectionalLightX);
        registry.register("rotation y", -10.0, 10.0, 0.0, ParamTarget::ModelRotationY);

        registry.params_mut()[0].value = 7.0;
        registry.params_mut()[0].mark_changed();

        registry.refresh(|_| Some(-4.0));

        assert_eq!(registry.params_mut()[0].value, 7.0);
        assert_eq!(registry.params_mut()[1].value, -4.0);
    }

    #[test]
    fn test_contains() {
        let mut registry = ParamRegistry::new();
        assert!(!registry.contains(ParamTarget::ModelRotationX));

        registry.register("rotation x", -1.0, 1.0, 0.0, ParamTarget::ModelRotationX);
        assert!(registry.contains(ParamTarget::ModelRotationX));
    }
}
