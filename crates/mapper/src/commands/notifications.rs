//! Notification command handlers, including the live stream.

use std::sync::Arc;

use tabled::Tabled;

use mapper_api::types::{
    Notification, NotificationFilter, NotificationSettings, NotificationSeverity, NotificationType,
};
use mapper_core::{Route, Studio};

use crate::cli::{
    GlobalOpts, NotificationTypeArg, NotificationsArgs, NotificationsCommand, OutputFormat,
    SeverityArg,
};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "")]
    unread: &'static str,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl NotificationRow {
    fn new(n: &Notification, color: bool) -> Self {
        Self {
            id: n.id.clone(),
            unread: if n.is_read { "" } else { "*" },
            severity: output::paint(&n.severity.to_string(), color),
            kind: n.kind.to_string(),
            title: n.title.clone(),
            created: output::timestamp(&n.created_at),
        }
    }
}

fn detail(n: &Notification) -> String {
    let mut lines = vec![
        format!("ID:       {}", n.id),
        format!("Title:    {}", n.title),
        format!("Type:     {}", n.kind),
        format!("Severity: {}", n.severity),
        format!("Category: {}", n.category),
        format!("Read:     {}", n.is_read),
        format!("Created:  {}", output::timestamp(&n.created_at)),
        String::new(),
        n.message.clone(),
    ];
    if let Some(ref actions) = n.actions {
        lines.push(String::new());
        lines.extend(
            actions
                .iter()
                .map(|a| format!("Action {}: {} ({})", a.id, a.label, a.action)),
        );
    }
    lines.join("\n")
}

fn settings_detail(s: &NotificationSettings) -> String {
    let mut lines = vec![
        format!("Email: {}", s.email_enabled),
        format!("Push:  {}", s.push_enabled),
    ];
    lines.extend(s.categories.iter().map(|c| {
        format!(
            "  {:<20} enabled={} email={} push={}",
            c.name, c.enabled, c.email_enabled, c.push_enabled
        )
    }));
    lines.join("\n")
}

/// One streamed notification as a single line.
fn stream_line(n: &Notification, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            serde_json::to_string(n).unwrap_or_default()
        }
        OutputFormat::Plain => n.id.clone(),
        OutputFormat::Table => format!(
            "{} {:<8} {}: {}",
            output::timestamp(&n.created_at),
            output::paint(&n.severity.to_string(), color),
            n.title,
            n.message
        ),
    }
}

fn kind(arg: NotificationTypeArg) -> NotificationType {
    match arg {
        NotificationTypeArg::Info => NotificationType::Info,
        NotificationTypeArg::Success => NotificationType::Success,
        NotificationTypeArg::Warning => NotificationType::Warning,
        NotificationTypeArg::Error => NotificationType::Error,
        NotificationTypeArg::System => NotificationType::System,
    }
}

fn severity(arg: SeverityArg) -> NotificationSeverity {
    match arg {
        SeverityArg::Low => NotificationSeverity::Low,
        SeverityArg::Medium => NotificationSeverity::Medium,
        SeverityArg::High => NotificationSeverity::High,
        SeverityArg::Critical => NotificationSeverity::Critical,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    studio: &Studio,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Notifications live in the console header, on every protected page.
    util::enter(studio, Route::Dashboard).await?;
    let client = studio.client();
    let color = output::should_color(&global.color);

    match args.command {
        NotificationsCommand::List {
            page,
            limit,
            kind: type_filter,
            severity: severity_filter,
            unread,
            read,
            category,
        } => {
            let is_read = match (unread, read) {
                (true, _) => Some(false),
                (_, true) => Some(true),
                _ => None,
            };
            let filter = NotificationFilter {
                page,
                limit,
                kind: type_filter.map(kind),
                severity: severity_filter.map(severity),
                is_read,
                category,
            };
            let state = studio.fetch_notifications(&filter).await?;
            output::show_list(
                global,
                &state.items,
                |n| NotificationRow::new(n, color),
                |n| n.id.clone(),
            )?;
            let unread = studio.ui().state().notifications.unread_count;
            if matches!(global.output, OutputFormat::Table) {
                output::notice(global, &format!("{unread} unread"));
            }
            Ok(())
        }

        NotificationsCommand::Get { notification } => {
            let n = client.get_notification(&notification).await?;
            output::show(global, &n, detail, |n| n.id.clone())
        }

        NotificationsCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let n = client.create_notification(&payload).await?;
            output::show(global, &n, detail, |n| n.id.clone())
        }

        NotificationsCommand::Delete { notification } => {
            if !util::confirm(&format!("Delete notification {notification}?"), global.yes)? {
                return Ok(());
            }
            client.delete_notification(&notification).await?;
            output::notice(global, "Notification deleted");
            Ok(())
        }

        NotificationsCommand::Read { notification } => {
            client.mark_notification_read(&notification).await?;
            output::notice(global, "Marked as read");
            Ok(())
        }

        NotificationsCommand::Unread { notification } => {
            client.mark_notification_unread(&notification).await?;
            output::notice(global, "Marked as unread");
            Ok(())
        }

        NotificationsCommand::ReadAll => {
            client.mark_all_notifications_read().await?;
            output::notice(global, "All notifications marked as read");
            Ok(())
        }

        NotificationsCommand::ClearRead => {
            if !util::confirm("Delete every read notification?", global.yes)? {
                return Ok(());
            }
            client.delete_read_notifications().await?;
            output::notice(global, "Read notifications deleted");
            Ok(())
        }

        NotificationsCommand::Count => {
            let unread = client.unread_notification_count().await?;
            output::show(global, &unread, |u| u.count.to_string(), |u| u.count.to_string())
        }

        NotificationsCommand::Settings => {
            let settings = client.notification_settings().await?;
            output::show(global, &settings, settings_detail, |s| {
                s.categories
                    .iter()
                    .filter(|c| c.enabled)
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        NotificationsCommand::SetSettings(body) => {
            let settings: NotificationSettings = util::read_json_as(&body.from_file)?;
            client.update_notification_settings(&settings).await?;
            output::notice(global, "Notification settings updated");
            Ok(())
        }

        NotificationsCommand::Action {
            notification,
            action,
        } => {
            client
                .execute_notification_action(&notification, &action)
                .await?;
            output::notice(global, &format!("Action '{action}' executed"));
            Ok(())
        }

        NotificationsCommand::Watch => watch(studio, global, color).await,
    }
}

/// Print live notifications until Ctrl-C or the socket closes.
async fn watch(studio: &Studio, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let format = global.output.clone();
    let quiet = global.quiet;
    let mut task = studio.subscribe_to_updates(move |n: Arc<Notification>| {
        output::print_output(&stream_line(&n, &format, color), quiet);
    })?;
    output::notice(global, "Watching for notifications (Ctrl-C to stop)");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            studio.shutdown();
            let _ = (&mut task).await;
        }
        _ = &mut task => {
            output::notice(global, "Notification stream closed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Notification {
        serde_json::from_value(json!({
            "id": "n1",
            "type": "warning",
            "title": "Disk",
            "message": "Disk almost full",
            "severity": "high",
            "category": "system",
            "isRead": false,
            "isGlobal": false,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn stream_line_without_color_is_plain_text() {
        let line = stream_line(&sample(), &OutputFormat::Table, false);
        assert_eq!(line, "2024-05-01 10:00 high     Disk: Disk almost full");
    }

    #[test]
    fn stream_line_for_json_is_one_object() {
        let line = stream_line(&sample(), &OutputFormat::Json, false);
        assert!(!line.contains('\n'));
        assert!(line.contains(r#""id":"n1""#));
    }
}
