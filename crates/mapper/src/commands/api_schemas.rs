//! API schema command handlers.

use tabled::Tabled;

use mapper_api::types::{ApiSchema, SchemaExportFormat, SchemaVersion, ValidationReport};
use mapper_core::{Route, Studio};

use crate::cli::{ApiSchemasArgs, ApiSchemasCommand, GlobalOpts, SchemaFormatArg};
use crate::error::CliError;
use crate::output;

use super::{util, yang_models::report_lines};

#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Base URL")]
    base_url: String,
    #[tabled(rename = "Paths")]
    paths: usize,
    #[tabled(rename = "Published")]
    published: String,
}

impl SchemaRow {
    fn new(s: &ApiSchema, color: bool) -> Self {
        let published = if s.is_published { "published" } else { "draft" };
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
            base_url: s.base_url.clone(),
            paths: s.paths.len(),
            published: output::paint(published, color),
        }
    }
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Published")]
    published: bool,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&SchemaVersion> for VersionRow {
    fn from(v: &SchemaVersion) -> Self {
        Self {
            version: v.version.clone(),
            published: v.is_published,
            created: output::timestamp(&v.created_at),
            description: v.description.clone(),
        }
    }
}

fn detail(s: &ApiSchema) -> String {
    let mut lines = vec![
        format!("ID:        {}", s.id),
        format!("Name:      {}", s.name),
        format!("Version:   {}", s.version),
        format!("Base URL:  {}", s.base_url),
        format!("Published: {}", s.is_published),
        format!("Models:    {}", s.models.len()),
        format!("Owner:     {}", s.created_by),
    ];
    if let Some(ref desc) = s.description {
        lines.push(format!("Description: {desc}"));
    }
    for path in &s.paths {
        lines.push(format!("  {:<7} {}", path.method, path.path));
    }
    lines.join("\n")
}

pub(super) fn validation_detail(r: &ValidationReport) -> String {
    report_lines(r.is_valid, &r.errors, &r.warnings)
}

fn export_format(arg: SchemaFormatArg) -> SchemaExportFormat {
    match arg {
        SchemaFormatArg::Json => SchemaExportFormat::Json,
        SchemaFormatArg::Yaml => SchemaExportFormat::Yaml,
        SchemaFormatArg::Openapi => SchemaExportFormat::OpenApi,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    studio: &Studio,
    args: ApiSchemasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::enter(studio, Route::ApiSchemas).await?;
    let client = studio.client();
    let color = output::should_color(&global.color);

    match args.command {
        ApiSchemasCommand::List(list) => {
            let state = studio.fetch_api_schemas(&util::list_query(&list)).await?;
            output::show_list(
                global,
                &state.items,
                |s| SchemaRow::new(s, color),
                |s| s.id.clone(),
            )
        }

        ApiSchemasCommand::Get { schema } => {
            let s = client.get_api_schema(&schema).await?;
            studio.slices().api_schemas.select(Some(s.clone()));
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ApiSchemasCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let s = client.create_api_schema(&payload).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ApiSchemasCommand::Update { schema, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let s = client.update_api_schema(&schema, &payload).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ApiSchemasCommand::Delete { schema } => {
            if !util::confirm(&format!("Delete API schema {schema}?"), global.yes)? {
                return Ok(());
            }
            client.delete_api_schema(&schema).await?;
            output::notice(global, "API schema deleted");
            Ok(())
        }

        ApiSchemasCommand::Validate { schema } => {
            let report = client.validate_api_schema(&schema).await?;
            output::show(global, &report, validation_detail, |r| r.is_valid.to_string())
        }

        ApiSchemasCommand::Publish { schema } => {
            let s = client.publish_api_schema(&schema).await?;
            output::notice(global, &format!("Published '{}' {}", s.name, s.version));
            Ok(())
        }

        ApiSchemasCommand::Unpublish { schema } => {
            let s = client.unpublish_api_schema(&schema).await?;
            output::notice(global, &format!("Withdrew '{}' {}", s.name, s.version));
            Ok(())
        }

        ApiSchemasCommand::Versions { schema } => {
            let versions = client.api_schema_versions(&schema).await?;
            output::show_list(global, &versions, |v| VersionRow::from(v), |v| v.version.clone())
        }

        ApiSchemasCommand::Openapi { schema } => {
            let doc = client.api_schema_openapi(&schema).await?;
            let out = output::render_document(&global.output, &doc)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ApiSchemasCommand::Clone { schema, name } => {
            let s = client.clone_api_schema(&schema, &name).await?;
            output::show(global, &s, detail, |s| s.id.clone())
        }

        ApiSchemasCommand::Export {
            schema,
            format,
            out,
        } => {
            let bytes = client.export_api_schema(&schema, export_format(format)).await?;
            output::write_download(&out, &bytes, global)
        }

        ApiSchemasCommand::Import { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let result = client
                .import_api_schema(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &result?, detail, |s| s.id.clone())
        }
    }
}
