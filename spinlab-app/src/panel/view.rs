use serde::Serialize;
use strum::IntoEnumIterator;

use super::{
    data::PanelState, kind::PanelId, list::visible_panels, position::Region,
    registry::PanelRegistry,
};

/// A panel the renderer has to mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelFrame {
    pub id: PanelId,
    pub title: String,
    pub content: String,
    pub maximized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFrame {
    pub region: Region,
    /// Percent of the window the region occupies; zero when collapsed.
    pub share: f64,
    /// Whether the drag handle between the region and the viewport is shown.
    pub handle: bool,
    pub panels: Vec<PanelFrame>,
}

impl RegionFrame {
    pub fn is_collapsed(&self) -> bool {
        self.panels.is_empty()
    }
}

/// Everything the renderer needs to lay out one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutFrame {
    pub left: RegionFrame,
    pub right: RegionFrame,
    pub bottom: RegionFrame,
    /// Horizontal share left to the viewport between the side regions.
    pub center: f64,
    /// Vertical share of the row holding the side regions and the viewport.
    pub main: f64,
    /// The viewport got less than its configured minimum.
    pub cramped: bool,
}

impl LayoutFrame {
    pub fn compute(registry: &PanelRegistry, state: &PanelState) -> Self {
        let region = |region: Region| {
            let panels: Vec<PanelFrame> = visible_panels(registry, state, region)
                .into_iter()
                .map(|p| PanelFrame {
                    id: p.id.clone(),
                    title: p.title.clone(),
                    content: p.content.clone(),
                    maximized: state.is_maximized(p.id.as_str()),
                })
                .collect();
            let shown = !panels.is_empty();
            RegionFrame {
                region,
                share: if shown { state.size(region) } else { 0.0 },
                handle: shown,
                panels,
            }
        };

        let left = region(Region::Left);
        let right = region(Region::Right);
        let bottom = region(Region::Bottom);

        let center = (100.0 - left.share - right.share).max(0.0);
        let main = 100.0 - bottom.share;

        Self {
            cramped: center < registry.layout().center_min_size,
            left,
            right,
            bottom,
            center,
            main,
        }
    }

    pub fn region(&self, region: Region) -> &RegionFrame {
        match region {
            Region::Left => &self.left,
            Region::Right => &self.right,
            Region::Bottom => &self.bottom,
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionFrame> {
        Region::iter().map(|r| self.region(r))
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.regions()
            .any(|r| r.panels.iter().any(|p| p.id.as_str() == id))
    }
}
