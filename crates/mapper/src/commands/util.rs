//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde::de::DeserializeOwned;

use mapper_api::types::ListQuery;
use mapper_core::{GuardDecision, Route, Studio};

use crate::cli::ListArgs;
use crate::error::CliError;

/// Restore the stored session and enter `route` through the route guard.
///
/// A protected page without a valid session fails with `NotSignedIn`; the
/// backend is only asked to confirm a stored token, never for anything else.
pub async fn enter(studio: &Studio, route: Route) -> Result<(), CliError> {
    studio.bootstrap().await;
    match studio.navigate(route.path()) {
        GuardDecision::Allow | GuardDecision::Redirect(Route::Dashboard) => Ok(()),
        GuardDecision::Redirect(_) | GuardDecision::Loading => Err(CliError::NotSignedIn),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    read_json_as(path)
}

/// Read a JSON file straight into a typed request body.
pub fn read_json_as<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn list_query(args: &ListArgs) -> ListQuery {
    ListQuery::new(args.page, args.limit).with_search(args.search.clone())
}

/// Password from the terminal, without echo.
pub fn prompt_password(prompt: &str) -> Result<String, CliError> {
    Ok(rpassword::prompt_password(prompt)?)
}
