//! Application menu bar

use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem, Submenu};

/// Menu item IDs
pub mod menu_ids {
    pub const ALWAYS_ON_TOP: &str = "always_on_top";
    pub const RELOAD: &str = "reload";
    pub const QUIT: &str = "quit";
}

/// What a menu click asks the shell to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    ToggleAlwaysOnTop,
    Reload,
    Quit,
}

impl MenuCommand {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            menu_ids::ALWAYS_ON_TOP => Some(MenuCommand::ToggleAlwaysOnTop),
            menu_ids::RELOAD => Some(MenuCommand::Reload),
            menu_ids::QUIT => Some(MenuCommand::Quit),
            _ => None,
        }
    }
}

/// The menu bar plus the items whose state the shell updates later
pub struct AppMenu {
    pub menu: Menu,
    pub always_on_top: CheckMenuItem,
}

impl AppMenu {
    pub fn new(always_on_top: bool) -> muda::Result<Self> {
        let always_on_top_item = CheckMenuItem::with_id(
            menu_ids::ALWAYS_ON_TOP,
            "Always on Top",
            true,
            always_on_top,
            None,
        );
        let reload = MenuItem::with_id(
            menu_ids::RELOAD,
            "Reload",
            true,
            "CmdOrCtrl+R".parse::<Accelerator>().ok(),
        );
        let quit = MenuItem::with_id(
            menu_ids::QUIT,
            "Quit",
            true,
            "CmdOrCtrl+Q".parse::<Accelerator>().ok(),
        );

        let edit_menu = Submenu::with_items(
            "Edit",
            true,
            &[
                &PredefinedMenuItem::undo(None),
                &PredefinedMenuItem::redo(None),
                &PredefinedMenuItem::separator(),
                &PredefinedMenuItem::cut(None),
                &PredefinedMenuItem::copy(None),
                &PredefinedMenuItem::paste(None),
                &PredefinedMenuItem::select_all(None),
            ],
        )?;

        let view_menu = Submenu::with_items(
            "View",
            true,
            &[
                &always_on_top_item,
                &reload,
                &PredefinedMenuItem::separator(),
                &quit,
            ],
        )?;

        let menu = Menu::with_items(&[&edit_menu, &view_menu])?;

        Ok(Self {
            menu,
            always_on_top: always_on_top_item,
        })
    }

    /// Keep the check mark in step with the window registry
    pub fn sync_always_on_top(&self, always_on_top: bool) {
        self.always_on_top.set_checked(always_on_top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ids_map_to_commands() {
        assert_eq!(
            MenuCommand::from_id(menu_ids::ALWAYS_ON_TOP),
            Some(MenuCommand::ToggleAlwaysOnTop)
        );
        assert_eq!(MenuCommand::from_id(menu_ids::RELOAD), Some(MenuCommand::Reload));
        assert_eq!(MenuCommand::from_id(menu_ids::QUIT), Some(MenuCommand::Quit));
        assert_eq!(MenuCommand::from_id("copy"), None);
    }
}
