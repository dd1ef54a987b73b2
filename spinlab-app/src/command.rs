use serde::{Deserialize, Serialize};
use strum::EnumMessage;
use strum_macros::{EnumMessage, IntoStaticStr};

use crate::panel::{kind::PanelId, position::Region};

/// What the renderer sends back to the panel store: header buttons and
/// drag-resize frames.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, EnumMessage, IntoStaticStr,
)]
#[serde(tag = "kind", rename_all = "kebab-case")]
#[strum(serialize_all = "snake_case")]
pub enum PanelCommand {
    #[strum(message = "Show or hide a panel")]
    SetVisible { id: PanelId, visible: bool },
    #[strum(message = "Toggle Panel Minimized")]
    Minimize { id: PanelId },
    #[strum(message = "Toggle Panel Maximized")]
    Maximize { id: PanelId },
    #[strum(message = "Close Panel")]
    Close { id: PanelId },
    #[strum(message = "Reopen Panel")]
    Reopen { id: PanelId },
    #[strum(message = "Resize Region")]
    Resize { region: Region, size: f64 },
}

impl PanelCommand {
    pub fn desc(&self) -> Option<&'static str> {
        self.get_message()
    }

    pub fn str(&self) -> &'static str {
        self.into()
    }

    /// The panel the command targets, if any.
    pub fn panel(&self) -> Option<&PanelId> {
        match self {
            PanelCommand::SetVisible { id, .. }
            | PanelCommand::Minimize { id }
            | PanelCommand::Maximize { id }
            | PanelCommand::Close { id }
            | PanelCommand::Reopen { id } => Some(id),
            PanelCommand::Resize { .. } => None,
        }
    }
}
