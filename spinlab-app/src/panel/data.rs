use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::{
    kind::PanelId,
    position::Region,
    registry::{PanelDescriptor, PanelRegistry},
};
use crate::command::PanelCommand;

pub type PanelVisibility = im::HashMap<PanelId, bool>;
pub type PanelMaximized = im::HashMap<PanelId, bool>;
pub type PanelSizes = im::HashMap<Region, f64>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("unknown panel `{0}`")]
    UnknownPanel(PanelId),
}

/// Visibility, maximized flags and region sizes of the whole layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub visibility: PanelVisibility,
    pub maximized: PanelMaximized,
    pub sizes: PanelSizes,
}

impl PanelState {
    /// All panels shown, nothing maximized, every region at its default size.
    pub fn new(registry: &PanelRegistry) -> Self {
        Self {
            visibility: registry
                .panels()
                .iter()
                .map(|p| (p.id.clone(), true))
                .collect(),
            maximized: registry
                .panels()
                .iter()
                .map(|p| (p.id.clone(), false))
                .collect(),
            sizes: Region::iter()
                .map(|r| (r, registry.region(r).default_size))
                .collect(),
        }
    }

    /// Keeps exactly one entry per registered panel and region, filling gaps
    /// with defaults and pulling sizes back into their region's range.
    pub fn normalize(&self, registry: &PanelRegistry) -> Self {
        let flag = |map: &im::HashMap<PanelId, bool>, p: &PanelDescriptor, default| {
            (p.id.clone(), map.get(p.id.as_str()).copied().unwrap_or(default))
        };
        Self {
            visibility: registry
                .panels()
                .iter()
                .map(|p| flag(&self.visibility, p, true))
                .collect(),
            maximized: registry
                .panels()
                .iter()
                .map(|p| flag(&self.maximized, p, false))
                .collect(),
            sizes: Region::iter()
                .map(|r| {
                    let config = registry.region(r);
                    let size = self
                        .sizes
                        .get(&r)
                        .copied()
                        .filter(|s| s.is_finite())
                        .unwrap_or(config.default_size);
                    (r, config.clamp(size))
                })
                .collect(),
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visibility.get(id).copied().unwrap_or(false)
    }

    pub fn is_maximized(&self, id: &str) -> bool {
        self.maximized.get(id).copied().unwrap_or(false)
    }

    pub fn size(&self, region: Region) -> f64 {
        self.sizes.get(&region).copied().unwrap_or(0.0)
    }

    /// A region is shown while at least one of its panels is visible.
    pub fn is_region_shown(&self, registry: &PanelRegistry, region: Region) -> bool {
        registry
            .in_region(region)
            .any(|p| self.is_visible(p.id.as_str()))
    }
}

/// Notified with the full new state after every transition that changed it.
pub trait PanelObserver: Send {
    fn state_changed(&mut self, state: &PanelState);
}

impl<F> PanelObserver for F
where
    F: FnMut(&PanelState) + Send,
{
    fn state_changed(&mut self, state: &PanelState) {
        self(state)
    }
}

/// Owns the panel state and applies every transition to it.
pub struct PanelData {
    registry: Arc<PanelRegistry>,
    state: PanelState,
    observers: Vec<Box<dyn PanelObserver>>,
}

impl PanelData {
    pub fn new(registry: Arc<PanelRegistry>, state: PanelState) -> Self {
        let state = state.normalize(&registry);
        Self {
            registry,
            state,
            observers: Vec::new(),
        }
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn observe(&mut self, observer: impl PanelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn descriptor(&self, id: &str) -> Result<&PanelDescriptor, PanelError> {
        self.registry.descriptor(id)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        self.update_panel(id, |state, panel, _| {
            state.visibility.insert(panel.id.clone(), visible);
        })
    }

    pub fn toggle_minimize(&mut self, id: &str) -> bool {
        self.update_panel(id, |state, panel, _| {
            let visible = state.is_visible(panel.id.as_str());
            state.visibility.insert(panel.id.clone(), !visible);
        })
    }

    pub fn reopen(&mut self, id: &str) -> bool {
        self.set_visible(id, true)
    }

    /// Hides the panel and drops its maximized flag. A maximized panel gives
    /// its region back the default size.
    pub fn close(&mut self, id: &str) -> bool {
        self.update_panel(id, |state, panel, registry| {
            if state.is_maximized(panel.id.as_str()) {
                state
                    .sizes
                    .insert(panel.region, registry.region(panel.region).default_size);
            }
            state.visibility.insert(panel.id.clone(), false);
            state.maximized.insert(panel.id.clone(), false);
        })
    }

    pub fn toggle_maximize(&mut self, id: &str) -> bool {
        self.update_panel(id, |state, panel, registry| {
            let config = registry.region(panel.region);
            let maximized = !state.is_maximized(panel.id.as_str());
            state.maximized.insert(panel.id.clone(), maximized);
            let size = if maximized {
                config.maximized_size
            } else {
                config.default_size
            };
            state.sizes.insert(panel.region, size);
        })
    }

    pub fn resize(&mut self, region: Region, size: f64) -> bool {
        if !size.is_finite() {
            tracing::debug!("ignoring non-finite size {size} for {region}");
            return false;
        }
        self.update(|state, registry| {
            state.sizes.insert(region, registry.region(region).clamp(size));
        })
    }

    pub fn reset(&mut self) -> bool {
        self.update(|state, registry| {
            *state = PanelState::new(registry);
        })
    }

    pub fn run(&mut self, command: &PanelCommand) -> bool {
        match command {
            PanelCommand::SetVisible { id, visible } => {
                self.set_visible(id.as_str(), *visible)
            }
            PanelCommand::Minimize { id } => self.toggle_minimize(id.as_str()),
            PanelCommand::Maximize { id } => self.toggle_maximize(id.as_str()),
            PanelCommand::Close { id } => self.close(id.as_str()),
            PanelCommand::Reopen { id } => self.reopen(id.as_str()),
            PanelCommand::Resize { region, size } => self.resize(*region, *size),
        }
    }

    fn update_panel(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut PanelState, &PanelDescriptor, &PanelRegistry),
    ) -> bool {
        let registry = self.registry.clone();
        let Some(panel) = registry.get(id) else {
            tracing::debug!("ignoring command for unknown panel {id}");
            return false;
        };
        self.update(|state, registry| f(state, panel, registry))
    }

    fn update(&mut self, f: impl FnOnce(&mut PanelState, &PanelRegistry)) -> bool {
        let mut state = self.state.clone();
        f(&mut state, self.registry.as_ref());
        if state == self.state {
            return false;
        }
        self.state = state;
        for observer in self.observers.iter_mut() {
            observer.state_changed(&self.state);
        }
        true
    }
}

/// Shared handle for hosts that drive the layout from more than one thread.
/// Every mutation goes through the same lock.
#[derive(Clone)]
pub struct PanelHandle {
    data: Arc<Mutex<PanelData>>,
}

impl PanelHandle {
    pub fn new(data: PanelData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub fn run(&self, command: &PanelCommand) -> bool {
        self.data.lock().run(command)
    }

    pub fn snapshot(&self) -> PanelState {
        self.data.lock().state().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::registry::{PanelDescriptor, RegionLayout};

    /// One panel per region, named after the region it docks in.
    fn region_panels() -> Arc<PanelRegistry> {
        let panels = vec![
            PanelDescriptor::new("left", "Left", Region::Left),
            PanelDescriptor::new("right", "Right", Region::Right),
            PanelDescriptor::new("bottom", "Bottom", Region::Bottom),
        ];
        Arc::new(PanelRegistry::new(panels, RegionLayout::default()).unwrap())
    }

    fn data() -> PanelData {
        let registry = region_panels();
        let state = PanelState::new(&registry);
        PanelData::new(registry, state)
    }

    #[test]
    fn test_default_state() {
        let data = data();
        let state = data.state();
        assert!(state.is_visible("left"));
        assert!(state.is_visible("right"));
        assert!(state.is_visible("bottom"));
        assert!(!state.is_maximized("bottom"));
        assert_eq!(state.size(Region::Left), 20.0);
        assert_eq!(state.size(Region::Right), 20.0);
        assert_eq!(state.size(Region::Bottom), 15.0);
    }

    #[test]
    fn test_close_left() {
        let mut data = data();
        assert!(data.close("left"));
        let state = data.state();
        assert!(!state.is_visible("left"));
        assert!(state.is_visible("right"));
        assert!(state.is_visible("bottom"));
        assert!(!state.is_region_shown(data.registry(), Region::Left));
    }

    #[test]
    fn test_close_clears_maximized() {
        let mut data = data();
        data.toggle_maximize("bottom");
        assert!(data.state().is_maximized("bottom"));
        assert_eq!(data.state().size(Region::Bottom), 30.0);

        data.close("bottom");
        assert!(!data.state().is_visible("bottom"));
        assert!(!data.state().is_maximized("bottom"));
        assert_eq!(data.state().size(Region::Bottom), 15.0);
    }

    #[test]
    fn test_maximize_and_restore() {
        let mut data = data();
        assert!(data.toggle_maximize("bottom"));
        assert_eq!(data.state().size(Region::Bottom), 30.0);
        assert!(data.state().is_maximized("bottom"));

        assert!(data.toggle_maximize("bottom"));
        assert_eq!(data.state().size(Region::Bottom), 15.0);
        assert!(!data.state().is_maximized("bottom"));
    }

    #[test]
    fn test_restore_goes_to_default_not_previous() {
        let mut data = data();
        data.resize(Region::Left, 33.0);
        data.toggle_maximize("left");
        data.toggle_maximize("left");
        assert_eq!(data.state().size(Region::Left), 20.0);
    }

    #[test]
    fn test_minimize_twice() {
        let mut data = data();
        data.toggle_minimize("right");
        assert!(!data.state().is_visible("right"));
        data.toggle_minimize("right");
        assert!(data.state().is_visible("right"));
    }

    #[test]
    fn test_minimize_keeps_maximized() {
        let mut data = data();
        data.toggle_maximize("bottom");
        data.toggle_minimize("bottom");
        assert!(!data.state().is_visible("bottom"));
        assert!(data.state().is_maximized("bottom"));
    }

    #[test]
    fn test_reopen() {
        let mut data = data();
        data.close("left");
        assert!(data.reopen("left"));
        assert!(data.state().is_visible("left"));
        assert!(!data.reopen("left"));
    }

    #[test]
    fn test_resize_clamps() {
        let mut data = data();
        data.resize(Region::Left, 5.0);
        assert_eq!(data.state().size(Region::Left), 15.0);
        data.resize(Region::Left, 95.0);
        assert_eq!(data.state().size(Region::Left), 40.0);
        data.resize(Region::Bottom, 22.5);
        assert_eq!(data.state().size(Region::Bottom), 22.5);
    }

    #[test]
    fn test_resize_non_finite() {
        let mut data = data();
        assert!(!data.resize(Region::Left, f64::NAN));
        assert!(!data.resize(Region::Left, f64::INFINITY));
        assert_eq!(data.state().size(Region::Left), 20.0);
    }

    #[test]
    fn test_unknown_panel_ignored() {
        let mut data = data();
        let before = data.state().clone();
        assert!(!data.close("center"));
        assert!(!data.toggle_maximize("center"));
        assert!(!data.set_visible("center", false));
        assert_eq!(data.state(), &before);
        assert!(!data.state().visibility.contains_key("center"));
        assert!(data.descriptor("center").is_err());
    }

    #[test]
    fn test_observer_sees_changes_only() {
        let mut data = data();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        data.observe(move |state: &PanelState| {
            sink.lock().push(state.clone());
        });

        data.close("left");
        data.close("left");
        data.close("center");
        data.resize(Region::Bottom, 20.0);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].is_visible("left"));
        assert_eq!(seen[1].size(Region::Bottom), 20.0);
    }

    #[test]
    fn test_run_commands() {
        let mut data = data();
        data.run(&PanelCommand::Maximize {
            id: PanelId::from("bottom"),
        });
        data.run(&PanelCommand::Resize {
            region: Region::Right,
            size: 25.0,
        });
        data.run(&PanelCommand::SetVisible {
            id: PanelId::from("left"),
            visible: false,
        });
        let state = data.state();
        assert!(state.is_maximized("bottom"));
        assert_eq!(state.size(Region::Right), 25.0);
        assert!(!state.is_visible("left"));

        assert!(data.reset());
        assert_eq!(data.state(), &PanelState::new(data.registry()));
    }

    #[test]
    fn test_normalize_fills_and_drops() {
        let registry = region_panels();
        let mut state = PanelState::new(&registry);
        state.visibility.remove("right");
        state.visibility.insert(PanelId::from("stale"), false);
        state.sizes.insert(Region::Bottom, 90.0);
        state.sizes.remove(&Region::Left);

        let state = state.normalize(&registry);
        assert!(state.is_visible("right"));
        assert!(!state.visibility.contains_key("stale"));
        assert_eq!(state.size(Region::Bottom), 50.0);
        assert_eq!(state.size(Region::Left), 20.0);
    }

    #[test]
    fn test_handle_serializes_threads() {
        let handle = PanelHandle::new(data());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        handle.run(&PanelCommand::Minimize {
                            id: PanelId::from("right"),
                        });
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        // 800 toggles, an even number, land back where they started
        assert!(handle.snapshot().is_visible("right"));
    }
}
