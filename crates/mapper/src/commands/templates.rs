//! Template command handlers.

use std::collections::BTreeMap;

use tabled::Tabled;

use mapper_api::types::{RenderResult, Template, TemplateTestCase, TemplateVariable, TestRun};
use mapper_core::{Route, Studio};

use crate::cli::{ChildCommand, GlobalOpts, TemplatesArgs, TemplatesCommand};
use crate::error::CliError;
use crate::output;

use super::{api_schemas::validation_detail, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Device type")]
    device_type: String,
    #[tabled(rename = "Engine")]
    engine: String,
    #[tabled(rename = "Variables")]
    variables: usize,
}

impl From<&Template> for TemplateRow {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            vendor: t.vendor.clone(),
            device_type: t.device_type.clone(),
            engine: t.template_type.to_string(),
            variables: t.variables.len(),
        }
    }
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Required")]
    required: bool,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&TemplateVariable> for VariableRow {
    fn from(v: &TemplateVariable) -> Self {
        Self {
            name: v.name.clone(),
            kind: v.kind.clone(),
            required: v.required,
            default: v
                .default_value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CaseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Inputs")]
    inputs: usize,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&TemplateTestCase> for CaseRow {
    fn from(c: &TemplateTestCase) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            inputs: c.input_data.len(),
            active: c.is_active,
        }
    }
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "Test case")]
    case: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Errors")]
    errors: usize,
}

fn detail(t: &Template) -> String {
    let mut lines = vec![
        format!("ID:          {}", t.id),
        format!("Name:        {}", t.name),
        format!("Vendor:      {}", t.vendor),
        format!("Device type: {}", t.device_type),
        format!("Engine:      {}", t.template_type),
        format!("Variables:   {}", t.variables.len()),
        format!("Test cases:  {}", t.test_cases.len()),
        format!(
            "Mapping:     {}",
            t.mapping.as_ref().map_or("-", |m| m.name.as_str())
        ),
        format!("Active:      {}", t.is_active),
    ];
    if let Some(ref desc) = t.description {
        lines.push(format!("Description: {desc}"));
    }
    lines.join("\n")
}

fn render_detail(r: &RenderResult) -> String {
    let mut lines = vec![];
    lines.extend(r.errors.iter().map(|e| format!("error:   {e}")));
    lines.extend(r.warnings.iter().map(|w| format!("warning: {w}")));
    lines.push(r.output.clone());
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    studio: &Studio,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::enter(studio, Route::Templates).await?;
    let client = studio.client();

    match args.command {
        TemplatesCommand::List(list) => {
            let state = studio.fetch_templates(&util::list_query(&list)).await?;
            output::show_list(global, &state.items, |t| TemplateRow::from(t), |t| t.id.clone())
        }

        TemplatesCommand::Get { template } => {
            let t = client.get_template(&template).await?;
            studio.slices().templates.select(Some(t.clone()));
            output::show(global, &t, detail, |t| t.id.clone())
        }

        TemplatesCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let t = client.create_template(&payload).await?;
            output::show(global, &t, detail, |t| t.id.clone())
        }

        TemplatesCommand::Update { template, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let t = client.update_template(&template, &payload).await?;
            output::show(global, &t, detail, |t| t.id.clone())
        }

        TemplatesCommand::Delete { template } => {
            if !util::confirm(&format!("Delete template {template}?"), global.yes)? {
                return Ok(());
            }
            client.delete_template(&template).await?;
            output::notice(global, "Template deleted");
            Ok(())
        }

        TemplatesCommand::Render { template, vars } => {
            let variables: BTreeMap<String, serde_json::Value> =
                util::read_json_as(&vars.from_file)?;
            let result = client.render_template(&template, &variables).await?;
            output::show(global, &result, render_detail, |r| r.output.clone())
        }

        TemplatesCommand::Validate { template } => {
            let report = client.validate_template(&template).await?;
            output::show(global, &report, validation_detail, |r| r.is_valid.to_string())
        }

        TemplatesCommand::Test {
            template,
            case: Some(case),
        } => {
            let result = client.run_template_test(&template, &case).await?;
            output::show(global, &result, render_detail, |r| r.success.to_string())
        }

        TemplatesCommand::Test { template, case: None } => {
            let runs = client.run_all_template_tests(&template).await?;
            let color = output::should_color(&global.color);
            output::show_list(
                global,
                &runs,
                |run: &TestRun| RunRow {
                    case: run.test_case_id.clone(),
                    result: output::paint(
                        if run.result.success { "success" } else { "failed" },
                        color,
                    ),
                    errors: run.result.errors.len(),
                },
                |run| format!("{} {}", run.test_case_id, run.result.success),
            )
        }

        TemplatesCommand::Vendor { vendor } => {
            let templates = client.templates_by_vendor(&vendor).await?;
            output::show_list(global, &templates, |t| TemplateRow::from(t), |t| t.id.clone())
        }

        TemplatesCommand::DeviceType { device_type } => {
            let templates = client.templates_by_device_type(&device_type).await?;
            output::show_list(global, &templates, |t| TemplateRow::from(t), |t| t.id.clone())
        }

        TemplatesCommand::Variables { template } => {
            let vars = client.template_variables(&template).await?;
            output::show_list(global, &vars, |v| VariableRow::from(v), |v| v.name.clone())
        }

        TemplatesCommand::SetVariables { template, body } => {
            let vars: Vec<TemplateVariable> = util::read_json_as(&body.from_file)?;
            let t = client.update_template_variables(&template, &vars).await?;
            output::show_list(global, &t.variables, |v| VariableRow::from(v), |v| v.name.clone())
        }

        TemplatesCommand::Cases { template, command } => {
            test_cases(studio, &template, command, global).await
        }

        TemplatesCommand::Clone { template, name } => {
            let t = client.clone_template(&template, &name).await?;
            output::show(global, &t, detail, |t| t.id.clone())
        }

        TemplatesCommand::Export { template, out } => {
            let bytes = client.export_template(&template).await?;
            output::write_download(&out, &bytes, global)
        }

        TemplatesCommand::Import { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let result = client
                .import_template(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &result?, detail, |t| t.id.clone())
        }
    }
}

async fn test_cases(
    studio: &Studio,
    template: &str,
    command: ChildCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = studio.client();

    match command {
        ChildCommand::List => {
            let t = client.get_template(template).await?;
            output::show_list(global, &t.test_cases, |c| CaseRow::from(c), |c| c.id.clone())
        }
        ChildCommand::Add(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let case = client.add_template_test_case(template, &payload).await?;
            output::show_list(global, &[case], |c| CaseRow::from(c), |c| c.id.clone())
        }
        ChildCommand::Update { id, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let case = client
                .update_template_test_case(template, &id, &payload)
                .await?;
            output::show_list(global, &[case], |c| CaseRow::from(c), |c| c.id.clone())
        }
        ChildCommand::Delete { id } => {
            if !util::confirm(&format!("Delete test case {id}?"), global.yes)? {
                return Ok(());
            }
            client.delete_template_test_case(template, &id).await?;
            output::notice(global, "Test case deleted");
            Ok(())
        }
    }
}
