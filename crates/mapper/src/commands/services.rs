//! Service command handlers.

use tabled::Tabled;

use mapper_api::types::{
    DeploymentPreview, DeploymentRecord, DeploymentResult, LogEntry, LogQuery, Service,
    ServiceConfiguration, ServiceMetrics, ServiceStatus,
};
use mapper_core::{Route, Studio};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

use super::{api_schemas::validation_detail, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Type")]
    service_type: String,
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "Health")]
    health: String,
}

impl ServiceRow {
    fn new(s: &Service, color: bool) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
            service_type: s.service_type.clone(),
            deployment: output::paint(&s.deployment_status.to_string(), color),
            health: output::paint(&s.health_status.to_string(), color),
        }
    }
}

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "Deployment")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl DeploymentRow {
    fn new(d: &DeploymentRecord, color: bool) -> Self {
        Self {
            id: d.deployment_id.clone(),
            status: output::paint(&d.status, color),
            started: output::timestamp(&d.started_at),
            duration: d.duration.map(|s| format!("{s:.1}s")).unwrap_or_default(),
            error: d.error.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn detail(s: &Service) -> String {
    let cfg = &s.configuration;
    let mut lines = vec![
        format!("ID:           {}", s.id),
        format!("Name:         {}", s.name),
        format!("Version:      {}", s.version),
        format!("Type:         {}", s.service_type),
        format!("Deployment:   {}", s.deployment_status),
        format!("Health:       {}", s.health_status),
        format!("Endpoints:    {}", s.endpoints.len()),
        format!("Devices:      {}", cfg.devices.len()),
        format!("Templates:    {}", cfg.templates.len()),
        format!("Mappings:     {}", cfg.mappings.len()),
        format!(
            "Resources:    cpu {} / memory {} / storage {}",
            cfg.resources.cpu, cfg.resources.memory, cfg.resources.storage
        ),
    ];
    if !s.dependencies.is_empty() {
        lines.push(format!("Depends on:   {}", s.dependencies.join(", ")));
    }
    if let Some(ref m) = s.metrics {
        lines.push(metrics_detail(m));
    }
    lines.join("\n")
}

fn metrics_detail(m: &ServiceMetrics) -> String {
    [
        format!("Uptime:       {:.2}%", m.uptime),
        format!("Response:     {:.1} ms", m.response_time),
        format!("Error rate:   {:.2}%", m.error_rate),
        format!("Throughput:   {:.1} req/s", m.throughput),
        format!("Checked:      {}", output::timestamp(&m.last_checked)),
    ]
    .join("\n")
}

fn result_detail(r: &DeploymentResult) -> String {
    let mut out = format!("Deployment {}: {}", r.deployment_id, r.status);
    if !r.message.is_empty() {
        out.push_str(&format!("\n{}", r.message));
    }
    out
}

fn preview_detail(p: &DeploymentPreview) -> String {
    let mut lines: Vec<String> = p
        .commands
        .iter()
        .map(|c| format!("[{}] ({}) {}", c.device, c.template, c.command))
        .collect();
    lines.push(format!("Estimated duration: {:.0}s", p.estimated_duration));
    lines.join("\n")
}

fn status_detail(s: &ServiceStatus) -> String {
    [
        format!("Deployment: {}", s.deployment_status),
        format!("Health:     {}", s.health_status),
        format!("Checked:    {}", output::timestamp(&s.last_checked)),
    ]
    .join("\n")
}

fn show_result(global: &GlobalOpts, result: &DeploymentResult) -> Result<(), CliError> {
    output::show(global, result, result_detail, |r| r.deployment_id.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(studio: &Studio, args: ServicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::enter(studio, Route::Services).await?;
    let client = studio.client();
    let color = output::should_color(&global.color);

    match args.command {
        ServicesCommand::List(list) => {
            let state = studio.fetch_services(&util::list_query(&list)).await?;
            output::show_list(
                global,
                &state.items,
                |s| ServiceRow::new(s, color),
                |s| s.id.clone(),
            )
        }

        ServicesCommand::Get { service } => {
            let s = client.get_service(&service).await?;
            studio.slices().services.select(Some(s.clone()));
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ServicesCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let s = client.create_service(&payload).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ServicesCommand::Update { service, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let s = client.update_service(&service, &payload).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ServicesCommand::Delete { service } => {
            if !util::confirm(&format!("Delete service {service}?"), global.yes)? {
                return Ok(());
            }
            client.delete_service(&service).await?;
            output::notice(global, "Service deleted");
            Ok(())
        }

        ServicesCommand::Deploy { service } => {
            show_result(global, &client.deploy_service(&service).await?)
        }

        ServicesCommand::Undeploy { service } => {
            if !util::confirm(&format!("Undeploy service {service}?"), global.yes)? {
                return Ok(());
            }
            show_result(global, &client.undeploy_service(&service).await?)
        }

        ServicesCommand::Restart { service } => {
            show_result(global, &client.restart_service(&service).await?)
        }

        ServicesCommand::Rollback {
            service,
            deployment,
        } => {
            let prompt = format!("Roll service {service} back to deployment {deployment}?");
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            show_result(global, &client.rollback_service(&service, &deployment).await?)
        }

        ServicesCommand::Preview { service } => {
            let preview = client.preview_service_deployment(&service).await?;
            output::show(global, &preview, preview_detail, |p| {
                p.commands
                    .iter()
                    .map(|c| c.command.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        ServicesCommand::Deployments { service } => {
            let records = client.service_deployments(&service).await?;
            output::show_list(
                global,
                &records,
                |d| DeploymentRow::new(d, color),
                |d| d.deployment_id.clone(),
            )
        }

        ServicesCommand::Status { service } => {
            let status = client.service_status(&service).await?;
            output::show(global, &status, status_detail, |s| s.health_status.clone())
        }

        ServicesCommand::Metrics { service, range } => {
            let metrics = client.service_metrics(&service, range.as_deref()).await?;
            output::show(global, &metrics, metrics_detail, |m| m.uptime.to_string())
        }

        ServicesCommand::Logs {
            service,
            limit,
            level,
        } => {
            let entries = client
                .service_logs(&service, &LogQuery { limit, level })
                .await?;
            output::show_list(
                global,
                &entries,
                |e: &LogEntry| LogRow {
                    time: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    level: output::paint(&e.level, color),
                    message: e.message.clone(),
                },
                |e| e.message.clone(),
            )
        }

        ServicesCommand::ValidateConfig(body) => {
            let configuration: ServiceConfiguration = util::read_json_as(&body.from_file)?;
            let report = client.validate_service_configuration(&configuration).await?;
            output::show(global, &report, validation_detail, |r| r.is_valid.to_string())
        }

        ServicesCommand::Clone { service, name } => {
            let s = client.clone_service(&service, &name).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ServicesCommand::Export { service, out } => {
            let bytes = client.export_service(&service).await?;
            output::write_download(&out, &bytes, global)
        }

        ServicesCommand::Import { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let result = client
                .import_service(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &result?, detail, |s| s.id.clone())
        }
    }
}
