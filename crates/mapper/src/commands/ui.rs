//! Console preference handlers. These never touch the network.

use mapper_core::{Studio, Theme, UiAction, UiState};

use crate::cli::{GlobalOpts, SidebarArg, ThemeArg, UiArgs, UiCommand};
use crate::error::CliError;
use crate::output;

fn detail(state: &UiState) -> String {
    [
        format!("Title:   {}", state.window_title()),
        format!("Theme:   {}", state.theme),
        format!(
            "Sidebar: {}",
            if state.sidebar_collapsed {
                "collapsed"
            } else {
                "expanded"
            }
        ),
    ]
    .join("\n")
}

pub fn handle(studio: &Studio, args: UiArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ui = studio.ui();

    match args.command {
        UiCommand::Show => {}
        UiCommand::Theme { theme } => ui.dispatch(UiAction::SetTheme(match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        })),
        UiCommand::Sidebar { state } => ui.dispatch(match state {
            SidebarArg::Toggle => UiAction::ToggleSidebar,
            SidebarArg::Collapse => UiAction::SetSidebarCollapsed(true),
            SidebarArg::Expand => UiAction::SetSidebarCollapsed(false),
        }),
    }

    output::show(global, &ui.state(), detail, |s| s.theme.to_string())
}
