use std::path::Path;

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use spinlab_core::directory::Directory;

use crate::panel::registry::{
    LayoutConfigError, PanelDescriptor, PanelRegistry, RegionLayout,
};

const DEFAULT_SETTINGS: &str = include_str!("../../defaults/settings.toml");

static DEFAULT_CONFIG: Lazy<config::Config> = Lazy::new(SpinlabConfig::base_config);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpinlabConfig {
    #[serde(default)]
    pub layout: RegionLayout,
    #[serde(default)]
    pub panels: Vec<PanelDescriptor>,
}

impl SpinlabConfig {
    /// Shipped defaults, overridden by the user settings file and then by
    /// `extra` when given. Settings that fail to parse or validate are
    /// logged and the shipped defaults are used instead.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let user = Directory::settings_file();
        let merged = Self::merge_config(user.as_deref(), extra)
            .and_then(|config| Ok(config.try_deserialize::<SpinlabConfig>()?))
            .and_then(|config| {
                config.registry()?;
                Ok(config)
            });
        match merged {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::error!(
                    "Failed to load settings, using the defaults: {err:#}"
                );
                Self::default_config()
            }
        }
    }

    pub fn default_config() -> Result<Self> {
        Ok(DEFAULT_CONFIG.clone().try_deserialize()?)
    }

    pub fn registry(&self) -> Result<PanelRegistry, LayoutConfigError> {
        PanelRegistry::new(self.panels.clone(), self.layout.clone())
    }

    fn merge_config(
        user: Option<&Path>,
        extra: Option<&Path>,
    ) -> Result<config::Config> {
        let mut builder =
            config::Config::builder().add_source(DEFAULT_CONFIG.clone());
        for path in [user, extra].into_iter().flatten() {
            tracing::debug!("reading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }
        Ok(builder.build()?)
    }

    fn base_config() -> config::Config {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_SETTINGS,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
    }
}
