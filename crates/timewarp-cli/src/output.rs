//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for pipes, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use timewarp_core::StatusCounts;
use timewarp_core::error::ErrorCode;
use timewarp_core::view::StatusBucket;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Width of the textual status bar in pretty output.
const BAR_WIDTH: usize = 40;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// Three-segment status bar, e.g. `[####====....]`.
///
/// `#` is done, `=` in progress, `.` todo; other statuses are left blank.
/// An empty snapshot renders an empty bar.
pub fn status_bar(counts: &StatusCounts) -> String {
    let width_of = |bucket: StatusBucket| {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let cells = (counts.fraction(bucket) * BAR_WIDTH as f64).round() as usize;
        cells
    };

    let done = width_of(StatusBucket::Done);
    let doing = width_of(StatusBucket::InProgress).min(BAR_WIDTH - done);
    let todo = width_of(StatusBucket::Todo).min(BAR_WIDTH - done - doing);
    let blank = BAR_WIDTH - done - doing - todo;
    format!(
        "[{}{}{}{}]",
        "#".repeat(done),
        "=".repeat(doing),
        ".".repeat(todo),
        " ".repeat(blank)
    )
}

/// Share of `bucket` as a whole percentage.
pub fn percent(counts: &StatusCounts, bucket: StatusBucket) -> String {
    format!("{:.0}%", counts.fraction(bucket) * 100.0)
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, status bar, grouped lists).
    Pretty,
    /// Tab-separated plain text for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {}
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Result types that render themselves in every mode.
///
/// Used for streamed output (one item per playback frame) where JSON mode
/// emits one compact object per line.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single compact JSON object, no trailing newline.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single tab-separated text row.
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Render one [`Renderable`] item to `out` using the given output mode.
pub fn render_item_to<R: Renderable>(
    out: &mut dyn Write,
    item: &R,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => item.render_human(out),
        OutputMode::Text => item.render_table(out),
        OutputMode::Json => {
            item.render_json(out)?;
            writeln!(out)
        }
    }
}

/// Render one [`Renderable`] item to stdout and flush, so streamed frames
/// show up immediately.
pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_item_to(&mut out, item, mode)?;
    out.flush()
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_mode_to(&mut out, mode, value, text_fn, pretty_fn)
}

/// [`render_mode`] against an arbitrary writer.
pub fn render_mode_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Error carrying the code, its hint and a detailed message.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    render_error_to(&mut out, mode, error)
}

fn render_error_to(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── resolve_output_mode_inner ───────────────────────────────────────────

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("JSON"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_unknown_falls_through_to_tty() {
        let mode_tty = resolve_output_mode_inner(None, false, Some("fancy"), true);
        assert_eq!(mode_tty, OutputMode::Pretty);
        let mode_pipe = resolve_output_mode_inner(None, false, Some("fancy"), false);
        assert_eq!(mode_pipe, OutputMode::Text);
    }

    #[test]
    fn resolve_default_no_tty_is_text() {
        let mode = resolve_output_mode_inner(None, false, None, false);
        assert_eq!(mode, OutputMode::Text);
    }

    // ── status bar ──────────────────────────────────────────────────────────

    #[test]
    fn status_bar_splits_by_bucket() {
        let counts = StatusCounts {
            todo: 1,
            in_progress: 1,
            done: 2,
            other: 0,
        };
        let bar = status_bar(&counts);
        assert_eq!(bar.len(), BAR_WIDTH + 2);
        assert_eq!(bar.matches('#').count(), 20);
        assert_eq!(bar.matches('=').count(), 10);
        assert_eq!(bar.matches('.').count(), 10);
        assert_eq!(percent(&counts, StatusBucket::Done), "50%");
    }

    #[test]
    fn empty_counts_render_blank_bar() {
        let bar = status_bar(&StatusCounts::default());
        assert_eq!(bar.trim_matches(|c| c == '[' || c == ']').trim(), "");
        assert_eq!(percent(&StatusCounts::default(), StatusBucket::Todo), "0%");
    }

    // ── Renderable ──────────────────────────────────────────────────────────

    struct Row {
        name: &'static str,
    }

    impl Renderable for Row {
        fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "row {}", self.name)
        }

        fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
            write!(w, "{{\"name\":\"{}\"}}", self.name)
        }

        fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}", self.name)
        }
    }

    #[test]
    fn render_item_json_is_one_line() {
        let mut buf = Vec::new();
        render_item_to(&mut buf, &Row { name: "a" }, OutputMode::Json).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "{\"name\":\"a\"}\n");
    }

    #[test]
    fn render_item_text_uses_table_row() {
        let mut buf = Vec::new();
        render_item_to(&mut buf, &Row { name: "a" }, OutputMode::Text).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "a\n");
    }

    // ── errors ──────────────────────────────────────────────────────────────

    #[test]
    fn coded_error_carries_hint() {
        let err = CliError::coded(ErrorCode::FeedParseError, "bad events");
        assert_eq!(err.error_code.as_deref(), Some("E1002"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn render_error_json_wraps_error() {
        let err = CliError::coded(ErrorCode::InvalidArgument, "bad offset");
        let mut buf = Vec::new();
        render_error_to(&mut buf, OutputMode::Json, &err).expect("render");
        let parsed: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(parsed["error"]["error_code"], "E3001");
        assert_eq!(parsed["error"]["message"], "bad offset");
    }

    #[test]
    fn render_error_human_shows_code_and_suggestion() {
        let err = CliError::coded(ErrorCode::FeedReadFailed, "missing.json");
        let mut buf = Vec::new();
        render_error_to(&mut buf, OutputMode::Pretty, &err).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error[E1001]: missing.json"));
        assert!(text.contains("suggestion:"));
    }
}
