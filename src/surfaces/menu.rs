//! Application menu model rebuilt from lock state

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    OpenSettings,
    LockScreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuEntry {
    /// Handled natively by the menu shim (reload, zoom, ...)
    Role { role: String },
    Separator,
    Action {
        action: MenuAction,
        label: String,
        accelerator: Option<String>,
    },
}

impl MenuEntry {
    fn role(role: &str) -> Self {
        Self::Role { role: role.to_string() }
    }

    fn action(action: MenuAction, label: &str, accelerator: &str) -> Self {
        Self::Action {
            action,
            label: label.to_string(),
            accelerator: Some(accelerator.to_string()),
        }
    }
}

/// The View submenu; the rest of the menu bar is static
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuModel {
    pub view: Vec<MenuEntry>,
}

impl MenuModel {
    /// Settings is offered while unlocked; Lock Screen additionally needs the
    /// content to have loaded
    pub fn build(unlocked: bool, content_loaded: bool, development: bool) -> Self {
        let mut view = vec![MenuEntry::role("reload"), MenuEntry::role("forceReload")];

        if development {
            view.push(MenuEntry::role("toggleDevTools"));
        }
        view.push(MenuEntry::Separator);

        if unlocked {
            view.push(MenuEntry::action(MenuAction::OpenSettings, "Settings", "CmdOrCtrl+,"));
            if content_loaded {
                view.push(MenuEntry::action(
                    MenuAction::LockScreen,
                    "Lock Screen",
                    "CommandOrControl+Escape",
                ));
            }
        }

        view.extend([
            MenuEntry::Separator,
            MenuEntry::role("resetZoom"),
            MenuEntry::role("zoomIn"),
            MenuEntry::role("zoomOut"),
            MenuEntry::Separator,
            MenuEntry::role("togglefullscreen"),
        ]);

        Self { view }
    }

    pub fn has_action(&self, action: MenuAction) -> bool {
        self.view
            .iter()
            .any(|entry| matches!(entry, MenuEntry::Action { action: a, .. } if *a == action))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.view
            .iter()
            .any(|entry| matches!(entry, MenuEntry::Role { role: r } if r == role))
    }
}

impl Default for MenuModel {
    fn default() -> Self {
        Self::build(false, false, false)
    }
}
