//! YANG model command handlers.

use tabled::Tabled;

use mapper_api::types::{
    DocumentationFormat, ModelComparison, ModelHistory, ParseReport, YangExportFormat,
    YangImportReport, YangModel, YangSearch,
};
use mapper_core::{Route, Studio};

use crate::cli::{DocFormatArg, GlobalOpts, YangFormatArg, YangModelsArgs, YangModelsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Revision")]
    revision: String,
    #[tabled(rename = "Device")]
    device: String,
}

impl From<&YangModel> for ModelRow {
    fn from(m: &YangModel) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            namespace: m.namespace.clone(),
            version: m.version.clone(),
            revision: m.revision.clone(),
            device: m.device_id.clone().unwrap_or_default(),
        }
    }
}

fn detail(m: &YangModel) -> String {
    let mut lines = vec![
        format!("ID:           {}", m.id),
        format!("Name:         {}", m.name),
        format!("Namespace:    {}", m.namespace),
        format!("Version:      {}", m.version),
        format!("Revision:     {}", m.revision),
        format!("Organization: {}", output::or_dash(m.organization.as_deref())),
        format!("Imported:     {}", m.is_imported),
        format!("Modules:      {}", m.modules.len()),
    ];
    if let Some(ref desc) = m.description {
        lines.push(format!("Description:  {desc}"));
    }
    if !m.dependencies.is_empty() {
        lines.push(format!("Depends on:   {}", m.dependencies.join(", ")));
    }
    lines.join("\n")
}

pub(super) fn report_lines(is_valid: bool, errors: &[String], warnings: &[String]) -> String {
    let mut lines = vec![format!("Valid: {is_valid}")];
    lines.extend(errors.iter().map(|e| format!("  error:   {e}")));
    lines.extend(warnings.iter().map(|w| format!("  warning: {w}")));
    lines.join("\n")
}

fn parse_detail(r: &ParseReport) -> String {
    let mut out = report_lines(r.is_valid, &r.errors, &r.warnings);
    for module in &r.modules {
        out.push_str(&format!("\nModule {} ({})", module.name, module.namespace));
    }
    out
}

fn comparison_detail(c: &ModelComparison) -> String {
    [
        format!("Differences:   {}", c.differences.len()),
        format!("Additions:     {}", c.additions.len()),
        format!("Deletions:     {}", c.deletions.len()),
        format!("Modifications: {}", c.modifications.len()),
    ]
    .join("\n")
}

fn history_detail(h: &ModelHistory) -> String {
    h.versions
        .iter()
        .map(|v| {
            let mut line = format!(
                "{}  {} ({})",
                output::timestamp(&v.timestamp),
                v.version,
                v.revision
            );
            for change in &v.changes {
                line.push_str(&format!("\n    {change}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn import_detail(r: &YangImportReport) -> String {
    let mut lines = vec![format!("Imported: {}", r.imported.len())];
    lines.extend(r.imported.iter().map(|m| format!("  {} {}", m.id, m.name)));
    lines.push(format!("Failed:   {}", r.failed.len()));
    lines.extend(r.failed.iter().map(|f| format!("  {}: {}", f.filename, f.error)));
    lines.join("\n")
}

pub(super) fn show_models(models: &[YangModel], global: &GlobalOpts) -> Result<(), CliError> {
    output::show_list(global, models, |m| ModelRow::from(m), |m| m.id.clone())
}

fn doc_format(arg: DocFormatArg) -> DocumentationFormat {
    match arg {
        DocFormatArg::Html => DocumentationFormat::Html,
        DocFormatArg::Pdf => DocumentationFormat::Pdf,
        DocFormatArg::Markdown => DocumentationFormat::Markdown,
    }
}

fn export_format(arg: YangFormatArg) -> YangExportFormat {
    match arg {
        YangFormatArg::Yang => YangExportFormat::Yang,
        YangFormatArg::Json => YangExportFormat::Json,
        YangFormatArg::Xml => YangExportFormat::Xml,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    studio: &Studio,
    args: YangModelsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::enter(studio, Route::YangModels).await?;
    let client = studio.client();

    match args.command {
        YangModelsCommand::List(list) => {
            let state = studio.fetch_yang_models(&util::list_query(&list)).await?;
            show_models(&state.items, global)
        }

        YangModelsCommand::Get { model } => {
            let m = client.get_yang_model(&model).await?;
            studio.slices().yang_models.select(Some(m.clone()));
            output::show(global, &m, detail, |m| m.id.clone())
        }

        YangModelsCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let m = client.create_yang_model(&payload).await?;
            output::show(global, &m, detail, |m| m.id.clone())
        }

        YangModelsCommand::Update { model, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let m = client.update_yang_model(&model, &payload).await?;
            output::show(global, &m, detail, |m| m.id.clone())
        }

        YangModelsCommand::Delete { model } => {
            if !util::confirm(&format!("Delete YANG model {model}?"), global.yes)? {
                return Ok(());
            }
            client.delete_yang_model(&model).await?;
            output::notice(global, "YANG model deleted");
            Ok(())
        }

        YangModelsCommand::Upload { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let result = client
                .upload_yang_model(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &result?, detail, |m| m.id.clone())
        }

        YangModelsCommand::Import { files } => {
            let report = client.import_yang_models(&files).await?;
            output::show(global, &report, import_detail, |r| {
                r.imported
                    .iter()
                    .map(|m| m.id.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        YangModelsCommand::Parse { file } => {
            let content = std::fs::read_to_string(&file).map_err(|source| CliError::ReadFile {
                path: file.display().to_string(),
                source,
            })?;
            let report = client.parse_yang(&content).await?;
            output::show(global, &report, parse_detail, |r| r.is_valid.to_string())
        }

        YangModelsCommand::Validate { model } => {
            let report = client.validate_yang_model(&model).await?;
            output::show(global, &report, parse_detail, |r| r.is_valid.to_string())
        }

        YangModelsCommand::Compare { model1, model2 } => {
            let cmp = client.compare_yang_models(&model1, &model2).await?;
            output::show(global, &cmp, comparison_detail, |c| {
                c.differences.len().to_string()
            })
        }

        YangModelsCommand::Deps { model } => {
            show_models(&client.yang_model_dependencies(&model).await?, global)
        }

        YangModelsCommand::Namespace { namespace } => {
            show_models(&client.yang_models_by_namespace(&namespace).await?, global)
        }

        YangModelsCommand::ByDevice { device } => {
            show_models(&client.yang_models_by_device(&device).await?, global)
        }

        YangModelsCommand::Search {
            query,
            namespace,
            vendor,
            version,
            device,
        } => {
            let search = YangSearch {
                namespace,
                vendor,
                version,
                device_id: device,
                ..YangSearch::new(query)
            };
            show_models(&client.search_yang_models(&search).await?, global)
        }

        YangModelsCommand::Tree { model } => {
            let tree = client.yang_model_tree(&model).await?;
            let out = output::render_document(&global.output, &tree)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        YangModelsCommand::Schema { model } => {
            let schema = client.yang_model_schema(&model).await?;
            let out = output::render_document(&global.output, &schema)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        YangModelsCommand::History { model } => {
            let history = client.yang_model_history(&model).await?;
            output::show(global, &history, history_detail, |h| {
                h.versions
                    .iter()
                    .map(|v| v.version.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }

        YangModelsCommand::Docs { model, format, out } => {
            let bytes = client
                .yang_model_documentation(&model, doc_format(format))
                .await?;
            output::write_download(&out, &bytes, global)
        }

        YangModelsCommand::Export { model, format, out } => {
            let bytes = client.export_yang_model(&model, export_format(format)).await?;
            output::write_download(&out, &bytes, global)
        }
    }
}
