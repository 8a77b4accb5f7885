//! Page sections and the visibility band that decides when one is "in
//! view".
//!
//! Sections are fixed vertical spans of a scrollable page. A section
//! counts as in view while it overlaps the viewport shrunk by 45% of
//! its height at the top and bottom, and only the transition *into*
//! view is reported; exits are ignored.

use anyhow::{anyhow, Context};
use glam::Vec3;

/// Fraction of the viewport height removed from each vertical edge to
/// form the visibility band.
pub const BAND_MARGIN: f32 = 0.45;

/// A page section with its attached positioning targets, validated
/// once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionDescriptor {
    /// Page-space top of the section, in pixels.
    pub top: f32,
    /// Section height, in pixels.
    pub height: f32,
    /// Target x position for the model.
    pub target_x: f32,
    /// Target model rotation, Euler XYZ radians.
    pub target_rotation: Vec3,
    /// Target camera z. `None` falls back to the configured default.
    pub target_camera_z: Option<f32>,
}

impl SectionDescriptor {
    /// Parse a descriptor from the host page's key/value attributes.
    ///
    /// Required keys: `p` (target x), `r-x`, `r-y`, `r-z` (target
    /// rotation). Optional: `c-z` (camera z). Unrecognized keys are
    /// ignored; malformed numbers are startup errors.
    pub fn from_attrs(top: f32, height: f32, attrs: &[(&str, &str)]) -> anyhow::Result<Self> {
        let lookup = |key: &str| attrs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

        let required = |key: &str| -> anyhow::Result<f32> {
            let raw = lookup(key).ok_or_else(|| anyhow!("section is missing attribute '{key}'"))?;
            raw.parse::<f32>()
                .with_context(|| format!("section attribute '{key}' is not a number: {raw:?}"))
        };

        let target_camera_z = lookup("c-z")
            .map(|raw| {
                raw.parse::<f32>()
                    .with_context(|| format!("section attribute 'c-z' is not a number: {raw:?}"))
            })
            .transpose()?;

        Ok(Self {
            top,
            height,
            target_x: required("p")?,
            target_rotation: Vec3::new(required("r-x")?, required("r-y")?, required("r-z")?),
            target_camera_z,
        })
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Tracks which sections currently overlap the visibility band and
/// reports entry transitions.
pub struct SectionObserver {
    sections: Vec<SectionDescriptor>,
    in_view: Vec<bool>,
}

impl SectionObserver {
    pub fn new(sections: Vec<SectionDescriptor>) -> Self {
        let in_view = vec![false; sections.len()];
        Self { sections, in_view }
    }

    pub fn section(&self, index: usize) -> &SectionDescriptor {
        &self.sections[index]
    }

    /// Re-evaluate every section against the band for the given scroll
    /// offset and viewport height. Returns the indices of sections
    /// that just entered the band, in section order.
    pub fn observe(&mut self, scroll_y: f32, viewport_height: f32) -> Vec<usize> {
        let band_top = scroll_y + viewport_height * BAND_MARGIN;
        let band_bottom = scroll_y + viewport_height * (1.0 - BAND_MARGIN);

        let mut entered = Vec::new();

        for (index, section) in self.sections.iter().enumerate() {
            let intersecting = section.top < band_bottom && section.bottom() > band_top;

            if intersecting && !self.in_view[index] {
                entered.push(index);
            }
            self.in_view[index] = intersecting;
        }

        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(top: f32, height: f32) -> SectionDescriptor {
        SectionDescriptor {
            top,
            height,
            target_x: 0.0,
            target_rotation: Vec3::ZERO,
            target_camera_z: None,
        }
    }

    #[test]
    fn test_from_attrs() {
        let descriptor = SectionDescriptor::from_attrs(
            0.0,
            800.0,
            &[("p", "3"), ("r-x", "0"), ("r-y", "1.2"), ("r-z", "0")],
        )
        .unwrap();

        assert_eq!(descriptor.target_x, 3.0);
        assert_eq!(descriptor.target_rotation, Vec3::new(0.0, 1.2, 0.0));
        assert_eq!(descriptor.target_camera_z, None);
    }

    #[test]
    fn test_from_attrs_camera_override() {
        let descriptor = SectionDescriptor::from_attrs(
            0.0,
            800.0,
            &[
                ("p", "-3"),
                ("r-x", "0.5"),
                ("r-y", "0"),
                ("r-z", "0"),
                ("c-z", "4"),
            ],
        )
        .unwrap();

        assert_eq!(descriptor.target_camera_z, Some(4.0));
    }

    #[test]
    fn test_from_attrs_missing_required_key() {
        let result =
            SectionDescriptor::from_attrs(0.0, 800.0, &[("p", "3"), ("r-x", "0"), ("r-y", "0")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_attrs_malformed_number() {
        let result = SectionDescriptor::from_attrs(
            0.0,
            800.0,
            &[("p", "three"), ("r-x", "0"), ("r-y", "0"), ("r-z", "0")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_attrs_ignores_unknown_keys() {
        let descriptor = SectionDescriptor::from_attrs(
            0.0,
            800.0,
            &[
                ("p", "3"),
                ("r-x", "0"),
                ("r-y", "0"),
                ("r-z", "0"),
                ("class", "hero"),
            ],
        )
        .unwrap();

        assert_eq!(descriptor.target_x, 3.0);
    }

    #[test]
    fn test_band_is_shrunk_viewport() {
        // Viewport 1000px: band covers page-space [450, 550) at scroll 0.
        let mut observer = SectionObserver::new(vec![
            section(0.0, 440.0),    // above the band
            section(400.0, 200.0),  // overlaps it
            section(560.0, 400.0),  // below it
        ]);

        let entered = observer.observe(0.0, 1000.0);
        assert_eq!(entered, vec![1]);
    }

    #[test]
    fn test_scrolling_enters_later_sections() {
        let mut observer =
            SectionObserver::new(vec![section(0.0, 800.0), section(800.0, 800.0)]);

        assert_eq!(observer.observe(0.0, 1000.0), vec![0]);
        assert_eq!(observer.observe(600.0, 1000.0), vec![1]);
    }

    #[test]
    fn test_no_event_while_section_stays_in_view() {
        let mut observer = SectionObserver::new(vec![section(0.0, 800.0)]);

        assert_eq!(observer.observe(0.0, 1000.0), vec![0]);
        assert_eq!(observer.observe(50.0, 1000.0), Vec::<usize>::new());
    }

    #[test]
    fn test_exit_produces_no_event_and_rearms_entry() {
        let mut observer = SectionObserver::new(vec![section(0.0, 800.0)]);

        assert_eq!(observer.observe(0.0, 1000.0), vec![0]);
        // Scroll far past; the section leaves the band silently.
        assert_eq!(observer.observe(2000.0, 1000.0), Vec::<usize>::new());
        // Scrolling back re-enters.
        assert_eq!(observer.observe(0.0, 1000.0), vec![0]);
    }

    #[test]
    fn test_batched_entries_keep_section_order() {
        let mut observer =
            SectionObserver::new(vec![section(440.0, 60.0), section(500.0, 60.0)]);

        assert_eq!(observer.observe(0.0, 1000.0), vec![0, 1]);
    }
}
