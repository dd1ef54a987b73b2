use super::{
    data::PanelState,
    position::Region,
    registry::{PanelDescriptor, PanelRegistry},
};
use crate::db::LayoutDb;

/// Storage key of a panel list's sizes, e.g. `left-sidebar-sizes`.
pub fn list_storage_key(key: &str) -> String {
    format!("{key}-sizes")
}

/// Shares of the panels stacked inside one list, persisted under their own key.
///
/// A stored layout only applies to a list of the same length; anything else
/// falls back to the defaults computed from the descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelListSizes {
    storage_key: String,
    defaults: Vec<f64>,
    min_sizes: Vec<f64>,
    sizes: Vec<f64>,
}

impl PanelListSizes {
    pub fn load(db: &LayoutDb, storage_key: &str, panels: &[&PanelDescriptor]) -> Self {
        let defaults = default_sizes(panels);
        let min_sizes: Vec<f64> = panels.iter().map(|p| p.min_size()).collect();
        let sizes = if panels.is_empty() {
            Vec::new()
        } else {
            match db.get_list_sizes(storage_key) {
                Ok(Some(sizes)) if sizes.len() == panels.len() => {
                    if within_limits(&sizes, &min_sizes) {
                        sizes
                    } else {
                        tracing::debug!(
                            "discarding {storage_key}: {sizes:?} outside the panel limits"
                        );
                        defaults.clone()
                    }
                }
                Ok(Some(sizes)) => {
                    tracing::debug!(
                        "discarding {storage_key}: {} sizes for {} panels",
                        sizes.len(),
                        panels.len()
                    );
                    defaults.clone()
                }
                Ok(None) => defaults.clone(),
                Err(err) => {
                    tracing::error!("failed to load panel sizes: {err:?}");
                    defaults.clone()
                }
            }
        };

        Self {
            storage_key: storage_key.to_string(),
            min_sizes,
            defaults,
            sizes,
        }
    }

    /// The list of panels currently visible in `region`.
    pub fn for_region(
        db: &LayoutDb,
        registry: &PanelRegistry,
        state: &PanelState,
        region: Region,
    ) -> Self {
        let panels = visible_panels(registry, state, region);
        Self::load(db, &list_storage_key(region.list_key()), &panels)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    pub fn min_sizes(&self) -> &[f64] {
        &self.min_sizes
    }

    pub fn defaults(&self) -> &[f64] {
        &self.defaults
    }

    /// Takes the sizes reported by the renderer after a drag and persists them.
    /// Each size must lie between its panel's minimum and 100.
    pub fn set_layout(&mut self, db: &LayoutDb, sizes: Vec<f64>) -> bool {
        if sizes.len() != self.sizes.len() {
            tracing::debug!(
                "ignoring layout of {} sizes for {} panels in {}",
                sizes.len(),
                self.sizes.len(),
                self.storage_key
            );
            return false;
        }
        if sizes.iter().any(|s| !s.is_finite()) {
            tracing::debug!("ignoring non-finite layout for {}", self.storage_key);
            return false;
        }
        if !within_limits(&sizes, &self.min_sizes) {
            tracing::debug!(
                "ignoring layout {sizes:?} outside the panel limits of {}",
                self.storage_key
            );
            return false;
        }
        self.sizes = sizes;
        self.persist(db);
        true
    }

    /// Resets to the defaults when the list gained or lost panels.
    pub fn sync(&mut self, db: &LayoutDb, panels: &[&PanelDescriptor]) -> bool {
        if panels.len() == self.sizes.len() {
            return false;
        }
        self.defaults = default_sizes(panels);
        self.min_sizes = panels.iter().map(|p| p.min_size()).collect();
        self.sizes = self.defaults.clone();
        self.persist(db);
        true
    }

    fn persist(&self, db: &LayoutDb) {
        if !self.sizes.is_empty() {
            db.save_list_sizes(&self.storage_key, &self.sizes);
        }
    }
}

pub fn visible_panels<'a>(
    registry: &'a PanelRegistry,
    state: &PanelState,
    region: Region,
) -> Vec<&'a PanelDescriptor> {
    registry
        .in_region(region)
        .filter(|p| state.is_visible(p.id.as_str()))
        .collect()
}

fn within_limits(sizes: &[f64], min_sizes: &[f64]) -> bool {
    sizes
        .iter()
        .zip(min_sizes)
        .all(|(size, min)| (*min..=100.0).contains(size))
}

fn default_sizes(panels: &[&PanelDescriptor]) -> Vec<f64> {
    let even = 100.0 / panels.len().max(1) as f64;
    panels
        .iter()
        .map(|p| p.default_size.unwrap_or(even))
        .collect()
}
