//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// How a status word should read at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Neutral,
}

/// Classify the status words the backend uses (connection, deployment,
/// health, notification severity).
pub fn tone_of(status: &str) -> Tone {
    match status {
        "connected" | "deployed" | "healthy" | "success" | "valid" | "published" | "low" => {
            Tone::Good
        }
        "connecting" | "deploying" | "pending" | "degraded" | "warning" | "medium" => Tone::Warn,
        "error" | "failed" | "unhealthy" | "invalid" | "high" | "critical" => Tone::Bad,
        _ => Tone::Neutral,
    }
}

/// Color a status word when color output is on.
pub fn paint(status: &str, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match tone_of(status) {
        Tone::Good => status.green().to_string(),
        Tone::Warn => status.yellow().to_string(),
        Tone::Bad => status.red().to_string(),
        Tone::Neutral => status.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render an untyped document (schema trees, OpenAPI output). Table and
/// plain fall back to pretty JSON.
pub fn render_document(format: &OutputFormat, doc: &serde_json::Value) -> Result<String, CliError> {
    match format {
        OutputFormat::JsonCompact => render_json(doc, true),
        OutputFormat::Yaml => render_yaml(doc),
        OutputFormat::Table | OutputFormat::Json | OutputFormat::Plain => render_json(doc, false),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Render with [`render_single`] and print.
pub fn show<T>(
    global: &GlobalOpts,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<(), CliError>
where
    T: serde::Serialize + ?Sized,
{
    let out = render_single(&global.output, data, detail_fn, id_fn)?;
    print_output(&out, global.quiet);
    Ok(())
}

/// Render with [`render_list`] and print.
pub fn show_list<T, R>(
    global: &GlobalOpts,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<(), CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    let out = render_list(&global.output, data, to_row, id_fn)?;
    print_output(&out, global.quiet);
    Ok(())
}

/// One-line confirmation of a completed action, on stderr.
pub fn notice(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

// ── Transfers ────────────────────────────────────────────────────────

/// Progress bar for a multipart upload; hidden in quiet mode or when
/// stderr is not a terminal.
pub fn upload_progress(file: &Path, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(
        file.file_name()
            .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned()),
    );
    bar
}

/// Write a downloaded export to disk.
pub fn write_download(path: &Path, bytes: &[u8], global: &GlobalOpts) -> Result<(), CliError> {
    std::fs::write(path, bytes)?;
    notice(global, &format!("Wrote {} bytes to {}", bytes.len(), path.display()));
    Ok(())
}

// ── Field helpers ────────────────────────────────────────────────────

pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: "a" }, Item { id: "b" }]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        )
        .unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"id":"a"},{"id":"b"}]"#);
    }

    #[test]
    fn table_has_header() {
        let out = render_list(
            &OutputFormat::Table,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        )
        .unwrap();
        assert!(out.contains("ID"));
        assert!(out.contains('b'));
    }

    #[test]
    fn statuses_are_classified() {
        assert_eq!(tone_of("connected"), Tone::Good);
        assert_eq!(tone_of("deploying"), Tone::Warn);
        assert_eq!(tone_of("failed"), Tone::Bad);
        assert_eq!(tone_of("stopped"), Tone::Neutral);
        assert_eq!(paint("failed", false), "failed");
    }
}
