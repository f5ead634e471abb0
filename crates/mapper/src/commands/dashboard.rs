//! Dashboard summary handler.

use mapper_core::{DashboardSummary, Route, Studio};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(summary: &DashboardSummary) -> String {
    [
        format!("Devices:       {}", summary.devices),
        format!("YANG models:   {}", summary.yang_models),
        format!("Services:      {}", summary.services),
        format!("Unread alerts: {}", summary.unread_notifications),
    ]
    .join("\n")
}

pub async fn handle(studio: &Studio, global: &GlobalOpts) -> Result<(), CliError> {
    util::enter(studio, Route::Dashboard).await?;
    let summary = studio.dashboard().await?;
    output::show(global, &summary, detail, |s| {
        format!(
            "{} {} {} {}",
            s.devices, s.yang_models, s.services, s.unread_notifications
        )
    })
}
