//! Static configuration for one experience, passed at construction
//! instead of read from ambient state.

use std::path::PathBuf;

use anyhow::ensure;

use crate::sections::SectionDescriptor;

/// Camera distance used when a section carries no `c-z` attribute.
pub const DEFAULT_CAMERA_Z: f32 = 8.0;

pub struct ExperienceConfig {
    /// Initial viewport size, logical pixels.
    pub width: u32,
    pub height: u32,
    /// The glTF asset to load at startup.
    pub model_path: PathBuf,
    pub default_camera_z: f32,
    /// Total scrollable page length, pixels.
    pub page_height: f32,
    pub sections: Vec<SectionDescriptor>,
}

impl ExperienceConfig {
    /// The built-in showcase page: four full-height sections swinging
    /// the model side to side, one of them pulling the camera in.
    pub fn showcase(width: u32, height: u32) -> anyhow::Result<Self> {
        ensure!(width > 0 && height > 0, "viewport must be non-empty");

        const SECTION_HEIGHT: f32 = 800.0;

        let attrs: &[&[(&str, &str)]] = &[
            &[("p", "0"), ("r-x", "1.5"), ("r-y", "0"), ("r-z", "0")],
            &[("p", "3"), ("r-x", "0"), ("r-y", "1.2"), ("r-z", "0")],
            &[
                ("p", "-3"),
                ("r-x", "0.4"),
                ("r-y", "-1.2"),
                ("r-z", "0"),
                ("c-z", "4"),
            ],
            &[("p", "0"), ("r-x", "1.5"), ("r-y", "3.1"), ("r-z", "0")],
        ];

        let sections = attrs
            .iter()
            .enumerate()
            .map(|(index, attrs)| {
                SectionDescriptor::from_attrs(index as f32 * SECTION_HEIGHT, SECTION_HEIGHT, attrs)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            width,
            height,
            model_path: PathBuf::from("assets/models/ac/scene.gltf"),
            default_camera_z: DEFAULT_CAMERA_Z,
            page_height: attrs.len() as f32 * SECTION_HEIGHT,
            sections,
        })
    }

    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.page_height - viewport_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_showcase_config_is_valid() {
        let config = ExperienceConfig::showcase(1280, 720).unwrap();

        assert_eq!(config.sections.len(), 4);
        assert_eq!(config.default_camera_z, 8.0);
        assert_eq!(config.sections[2].target_camera_z, Some(4.0));
        assert_eq!(config.page_height, 3200.0);
    }

    #[test]
    fn test_empty_viewport_is_rejected() {
        assert!(ExperienceConfig::showcase(1280, 0).is_err());
        assert!(ExperienceConfig::showcase(0, 720).is_err());
    }

    #[test]
    fn test_max_scroll_clamps_at_zero() {
        let config = ExperienceConfig::showcase(1280, 720).unwrap();

        assert_eq!(config.max_scroll(720.0), 3200.0 - 720.0);
        assert_eq!(config.max_scroll(4000.0), 0.0);
    }
}
