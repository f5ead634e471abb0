//! Command dispatch: bridges CLI args -> Studio operations -> output formatting.

pub mod api_schemas;
pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod devices;
pub mod mappings;
pub mod notifications;
pub mod services;
pub mod templates;
pub mod ui;
pub mod util;
pub mod yang_models;

use mapper_core::Studio;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, studio: &Studio, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(studio, args, global).await,
        Command::Register(args) => auth::register(studio, args, global).await,
        Command::Logout => auth::logout(studio, global).await,
        Command::Refresh => auth::refresh(studio, global).await,
        Command::Password(args) => auth::password(studio, args, global).await,
        Command::Profile(args) => auth::profile(studio, args, global).await,
        Command::Dashboard => dashboard::handle(studio, global).await,
        Command::Devices(args) => devices::handle(studio, args, global).await,
        Command::YangModels(args) => yang_models::handle(studio, args, global).await,
        Command::ApiSchemas(args) => api_schemas::handle(studio, args, global).await,
        Command::Mappings(args) => mappings::handle(studio, args, global).await,
        Command::Templates(args) => templates::handle(studio, args, global).await,
        Command::Services(args) => services::handle(studio, args, global).await,
        Command::Notifications(args) => notifications::handle(studio, args, global).await,
        Command::Ui(args) => ui::handle(studio, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
