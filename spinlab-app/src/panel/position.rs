use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A docking area around the viewport.
#[derive(
    Eq,
    PartialEq,
    Hash,
    Clone,
    Copy,
    Debug,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Left,
    Right,
    Bottom,
}

impl Region {
    /// Storage key prefix of the region's panel list.
    pub fn list_key(&self) -> &'static str {
        match self {
            Region::Left => "left-sidebar",
            Region::Right => "right-sidebar",
            Region::Bottom => "bottom-sidebar",
        }
    }
}
