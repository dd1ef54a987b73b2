use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{data::PanelError, kind::PanelId, position::Region};

/// Minimum share of a panel inside its list when none is configured.
pub const DEFAULT_PANEL_MIN_SIZE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PanelDescriptor {
    pub id: PanelId,
    pub title: String,
    pub region: Region,
    /// Share inside the region's panel list; an even split when absent.
    #[serde(default)]
    pub default_size: Option<f64>,
    #[serde(default)]
    pub min_size: Option<f64>,
    /// Content slot resolved by the renderer, never read here.
    #[serde(default)]
    pub content: String,
}

impl PanelDescriptor {
    pub fn new(
        id: impl Into<PanelId>,
        title: impl Into<String>,
        region: Region,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            region,
            default_size: None,
            min_size: None,
            content: String::new(),
        }
    }

    pub fn with_sizes(mut self, default_size: f64, min_size: f64) -> Self {
        self.default_size = Some(default_size);
        self.min_size = Some(min_size);
        self
    }

    pub fn min_size(&self) -> f64 {
        self.min_size.unwrap_or(DEFAULT_PANEL_MIN_SIZE)
    }
}

/// Size limits of one docking region, in percent of the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegionConfig {
    pub default_size: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub maximized_size: f64,
}

impl RegionConfig {
    pub fn clamp(&self, size: f64) -> f64 {
        size.clamp(self.min_size, self.max_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegionLayout {
    pub center_min_size: f64,
    pub left: RegionConfig,
    pub right: RegionConfig,
    pub bottom: RegionConfig,
}

impl RegionLayout {
    pub fn get(&self, region: Region) -> &RegionConfig {
        match region {
            Region::Left => &self.left,
            Region::Right => &self.right,
            Region::Bottom => &self.bottom,
        }
    }
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            center_min_size: 30.0,
            left: RegionConfig {
                default_size: 20.0,
                min_size: 15.0,
                max_size: 40.0,
                maximized_size: 40.0,
            },
            right: RegionConfig {
                default_size: 20.0,
                min_size: 15.0,
                max_size: 40.0,
                maximized_size: 40.0,
            },
            bottom: RegionConfig {
                default_size: 15.0,
                min_size: 10.0,
                max_size: 50.0,
                maximized_size: 30.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutConfigError {
    #[error("panel id must not be empty")]
    EmptyPanelId,
    #[error("panel `{0}` is registered twice")]
    DuplicatePanel(PanelId),
    #[error("panel `{id}`: {reason}")]
    InvalidPanel { id: PanelId, reason: String },
    #[error("region `{region}`: {reason}")]
    InvalidRegion { region: Region, reason: String },
    #[error("center minimum size {0} is outside 0..=100")]
    InvalidCenter(f64),
}

/// The ahead-of-time list of panels and the limits of the regions they dock in.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRegistry {
    panels: Vec<PanelDescriptor>,
    layout: RegionLayout,
}

impl PanelRegistry {
    pub fn new(
        panels: Vec<PanelDescriptor>,
        layout: RegionLayout,
    ) -> Result<Self, LayoutConfigError> {
        validate_layout(&layout)?;

        let mut seen = HashSet::new();
        for panel in &panels {
            if panel.id.as_str().is_empty() {
                return Err(LayoutConfigError::EmptyPanelId);
            }
            if !seen.insert(panel.id.clone()) {
                return Err(LayoutConfigError::DuplicatePanel(panel.id.clone()));
            }
            validate_panel(panel)?;
        }

        Ok(Self { panels, layout })
    }

    pub fn panels(&self) -> &[PanelDescriptor] {
        &self.panels
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn region(&self, region: Region) -> &RegionConfig {
        self.layout.get(region)
    }

    pub fn get(&self, id: &str) -> Option<&PanelDescriptor> {
        self.panels.iter().find(|p| p.id.as_str() == id)
    }

    pub fn descriptor(&self, id: &str) -> Result<&PanelDescriptor, PanelError> {
        self.get(id)
            .ok_or_else(|| PanelError::UnknownPanel(PanelId::from(id)))
    }

    pub fn in_region(
        &self,
        region: Region,
    ) -> impl Iterator<Item = &PanelDescriptor> + '_ {
        self.panels.iter().filter(move |p| p.region == region)
    }
}

fn is_percent(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

fn validate_layout(layout: &RegionLayout) -> Result<(), LayoutConfigError> {
    if !is_percent(layout.center_min_size) {
        return Err(LayoutConfigError::InvalidCenter(layout.center_min_size));
    }

    use strum::IntoEnumIterator;
    for region in Region::iter() {
        let config = layout.get(region);
        let invalid = |reason: String| LayoutConfigError::InvalidRegion {
            region,
            reason,
        };
        for (name, value) in [
            ("default-size", config.default_size),
            ("min-size", config.min_size),
            ("max-size", config.max_size),
            ("maximized-size", config.maximized_size),
        ] {
            if !is_percent(value) {
                return Err(invalid(format!("{name} {value} is outside 0..=100")));
            }
        }
        if config.min_size > config.default_size
            || config.default_size > config.max_size
        {
            return Err(invalid(format!(
                "expected min-size <= default-size <= max-size, got {} / {} / {}",
                config.min_size, config.default_size, config.max_size
            )));
        }
        if config.maximized_size <= config.default_size
            || config.maximized_size > config.max_size
        {
            return Err(invalid(format!(
                "expected default-size < maximized-size <= max-size, got {} / {} / {}",
                config.default_size, config.maximized_size, config.max_size
            )));
        }
    }

    Ok(())
}

fn validate_panel(panel: &PanelDescriptor) -> Result<(), LayoutConfigError> {
    let invalid = |reason: String| LayoutConfigError::InvalidPanel {
        id: panel.id.clone(),
        reason,
    };

    if let Some(size) = panel.default_size {
        if !is_percent(size) {
            return Err(invalid(format!("default-size {size} is outside 0..=100")));
        }
    }
    if let Some(size) = panel.min_size {
        if !is_percent(size) {
            return Err(invalid(format!("min-size {size} is outside 0..=100")));
        }
    }
    if let (Some(default_size), Some(min_size)) = (panel.default_size, panel.min_size)
    {
        if min_size > default_size {
            return Err(invalid(format!(
                "min-size {min_size} is larger than default-size {default_size}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panels() -> Vec<PanelDescriptor> {
        vec![
            PanelDescriptor::new("scene-info", "Scene Info", Region::Left),
            PanelDescriptor::new("properties", "Properties", Region::Left),
            PanelDescriptor::new("tools", "Tools", Region::Right),
        ]
    }

    #[test]
    fn test_registry_lookup() {
        let registry = PanelRegistry::new(panels(), RegionLayout::default()).unwrap();
        assert_eq!(registry.get("tools").unwrap().title, "Tools");
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.descriptor("missing"),
            Err(PanelError::UnknownPanel(PanelId::from("missing")))
        );
        let left: Vec<_> = registry
            .in_region(Region::Left)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(left, vec!["scene-info", "properties"]);
        assert_eq!(registry.in_region(Region::Bottom).count(), 0);
    }

    #[test]
    fn test_duplicate_panel() {
        let mut panels = panels();
        panels.push(PanelDescriptor::new("tools", "Tools again", Region::Bottom));
        assert_eq!(
            PanelRegistry::new(panels, RegionLayout::default()),
            Err(LayoutConfigError::DuplicatePanel(PanelId::from("tools")))
        );
    }

    #[test]
    fn test_panel_min_above_default() {
        let panels = vec![
            PanelDescriptor::new("tools", "Tools", Region::Right).with_sizes(20.0, 30.0),
        ];
        assert!(matches!(
            PanelRegistry::new(panels, RegionLayout::default()),
            Err(LayoutConfigError::InvalidPanel { .. })
        ));
    }

    #[test]
    fn test_inverted_region_range() {
        let mut layout = RegionLayout::default();
        layout.bottom.min_size = 60.0;
        assert!(matches!(
            PanelRegistry::new(panels(), layout),
            Err(LayoutConfigError::InvalidRegion {
                region: Region::Bottom,
                ..
            })
        ));
    }

    #[test]
    fn test_maximized_not_larger() {
        let mut layout = RegionLayout::default();
        layout.left.maximized_size = layout.left.default_size;
        assert!(PanelRegistry::new(panels(), layout).is_err());
    }

    #[test]
    fn test_maximized_above_max() {
        let mut layout = RegionLayout::default();
        layout.bottom.maximized_size = 60.0;
        assert!(PanelRegistry::new(panels(), layout).is_err());
    }

    #[test]
    fn test_region_clamp() {
        let layout = RegionLayout::default();
        assert_eq!(layout.bottom.clamp(5.0), 10.0);
        assert_eq!(layout.bottom.clamp(70.0), 50.0);
        assert_eq!(layout.bottom.clamp(22.5), 22.5);
    }
}
