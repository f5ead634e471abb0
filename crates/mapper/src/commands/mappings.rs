//! Mapping command handlers, including rules and transformations.

use tabled::Tabled;

use mapper_api::types::{
    Mapping, MappingExportFormat, MappingRule, MappingTestResult, Transformation,
};
use mapper_core::{Route, Studio};

use crate::cli::{
    ChildCommand, GlobalOpts, MappingChildArgs, MappingFormatArg, MappingsArgs, MappingsCommand,
};
use crate::error::CliError;
use crate::output;

use super::{api_schemas::validation_detail, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Rules")]
    rules: usize,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&Mapping> for MappingRow {
    fn from(m: &Mapping) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            source: m
                .source_schema
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            target: m
                .target_schema
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            rules: m.mapping_rules.len(),
            active: m.is_active,
        }
    }
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Source path")]
    source: String,
    #[tabled(rename = "Target path")]
    target: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&MappingRule> for RuleRow {
    fn from(r: &MappingRule) -> Self {
        Self {
            id: r.id.clone(),
            source: r.source_path.clone(),
            target: r.target_path.clone(),
            priority: r.priority,
            active: r.is_active,
        }
    }
}

#[derive(Tabled)]
struct TransformationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Expression")]
    expression: String,
}

impl From<&Transformation> for TransformationRow {
    fn from(t: &Transformation) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            kind: t.kind.to_string(),
            expression: t.expression.clone(),
        }
    }
}

fn detail(m: &Mapping) -> String {
    let mut lines = vec![
        format!("ID:              {}", m.id),
        format!("Name:            {}", m.name),
        format!("Description:     {}", output::or_dash(m.description.as_deref())),
        format!(
            "Source model:    {}",
            m.source_schema.as_ref().map_or("-", |s| s.name.as_str())
        ),
        format!(
            "Target schema:   {}",
            m.target_schema.as_ref().map_or("-", |s| s.name.as_str())
        ),
        format!("Rules:           {}", m.mapping_rules.len()),
        format!("Transformations: {}", m.transformations.len()),
        format!("Validations:     {}", m.validation_rules.len()),
        format!("Active:          {}", m.is_active),
    ];
    for rule in &m.mapping_rules {
        lines.push(format!("  {} -> {}", rule.source_path, rule.target_path));
    }
    lines.join("\n")
}

fn test_detail(r: &MappingTestResult) -> String {
    let mut lines = vec![format!("Success: {}", r.success)];
    lines.extend(r.errors.iter().map(|e| format!("  error:   {e}")));
    lines.extend(r.warnings.iter().map(|w| format!("  warning: {w}")));
    lines.push(serde_json::to_string_pretty(&r.result).unwrap_or_default());
    lines.join("\n")
}

fn export_format(arg: MappingFormatArg) -> MappingExportFormat {
    match arg {
        MappingFormatArg::Json => MappingExportFormat::Json,
        MappingFormatArg::Yaml => MappingExportFormat::Yaml,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(studio: &Studio, args: MappingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::enter(studio, Route::Mappings).await?;
    let client = studio.client();

    match args.command {
        MappingsCommand::List(list) => {
            let state = studio.fetch_mappings(&util::list_query(&list)).await?;
            output::show_list(global, &state.items, |m| MappingRow::from(m), |m| m.id.clone())
        }

        MappingsCommand::Get { mapping } => {
            let m = client.get_mapping(&mapping).await?;
            studio.slices().mappings.select(Some(m.clone()));
            output::show(global, &m, detail, |m| m.id.clone())
        }

        MappingsCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let m = client.create_mapping(&payload).await?;
            output::show(global, &m, detail, |m| m.id.clone())
        }

        MappingsCommand::Update { mapping, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let m = client.update_mapping(&mapping, &payload).await?;
            output::show(global, &m, detail, |m| m.id.clone())
        }

        MappingsCommand::Delete { mapping } => {
            if !util::confirm(&format!("Delete mapping {mapping}?"), global.yes)? {
                return Ok(());
            }
            client.delete_mapping(&mapping).await?;
            output::notice(global, "Mapping deleted");
            Ok(())
        }

        MappingsCommand::Test { mapping, data } => {
            let test_data = util::read_json_file(&data.from_file)?;
            let result = client.test_mapping(&mapping, &test_data).await?;
            output::show(global, &result, test_detail, |r| r.success.to_string())
        }

        MappingsCommand::Validate { mapping } => {
            let report = client.validate_mapping(&mapping).await?;
            output::show(global, &report, validation_detail, |r| r.is_valid.to_string())
        }

        MappingsCommand::Generate { source, target } => {
            let m = client.generate_mapping(&source, &target).await?;
            output::notice(global, &format!("Generated mapping '{}'", m.name));
            output::show(global, &m, detail, |m| m.id.clone())
        }

        MappingsCommand::Rules(child) => rules(studio, child, global).await,

        MappingsCommand::Transformations(child) => transformations(studio, child, global).await,

        MappingsCommand::Export {
            mapping,
            format,
            out,
        } => {
            let bytes = client.export_mapping(&mapping, export_format(format)).await?;
            output::write_download(&out, &bytes, global)
        }

        MappingsCommand::Import { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let result = client
                .import_mapping(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &result?, detail, |m| m.id.clone())
        }
    }
}

async fn rules(studio: &Studio, args: MappingChildArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = studio.client();
    let mapping = args.mapping;

    match args.command {
        ChildCommand::List => {
            let rules = client.mapping_rules(&mapping).await?;
            output::show_list(global, &rules, |r| RuleRow::from(r), |r| r.id.clone())
        }
        ChildCommand::Add(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let rule = client.add_mapping_rule(&mapping, &payload).await?;
            output::show_list(global, &[rule], |r| RuleRow::from(r), |r| r.id.clone())
        }
        ChildCommand::Update { id, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let rule = client.update_mapping_rule(&mapping, &id, &payload).await?;
            output::show_list(global, &[rule], |r| RuleRow::from(r), |r| r.id.clone())
        }
        ChildCommand::Delete { id } => {
            if !util::confirm(&format!("Delete rule {id}?"), global.yes)? {
                return Ok(());
            }
            client.delete_mapping_rule(&mapping, &id).await?;
            output::notice(global, "Mapping rule deleted");
            Ok(())
        }
    }
}

async fn transformations(
    studio: &Studio,
    args: MappingChildArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = studio.client();
    let mapping = args.mapping;

    match args.command {
        ChildCommand::List => {
            let items = client.mapping_transformations(&mapping).await?;
            output::show_list(global, &items, |t| TransformationRow::from(t), |t| t.id.clone())
        }
        ChildCommand::Add(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let t = client.add_transformation(&mapping, &payload).await?;
            output::show_list(global, &[t], |t| TransformationRow::from(t), |t| t.id.clone())
        }
        ChildCommand::Update { id, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let t = client.update_transformation(&mapping, &id, &payload).await?;
            output::show_list(global, &[t], |t| TransformationRow::from(t), |t| t.id.clone())
        }
        ChildCommand::Delete { id } => {
            if !util::confirm(&format!("Delete transformation {id}?"), global.yes)? {
                return Ok(());
            }
            client.delete_transformation(&mapping, &id).await?;
            output::notice(global, "Transformation deleted");
            Ok(())
        }
    }
}
