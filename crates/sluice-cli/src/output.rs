//! Output modes and rendering helpers shared by every command.
//!
//! A command's result goes to stdout as `pretty` (people at a terminal),
//! `text` (tab- or double-space separated rows for scripts) or `json`.
//! Errors always go to stderr, in JSON when JSON was requested.
//!
//! The mode comes from `--format` or the hidden `--json` flag, then the
//! `FORMAT` env var, and otherwise from whether stdout is a terminal.

use clap::ValueEnum;
use serde::Serialize;
use sluice_core::error::ErrorCode;
use sluice_core::store::{LookupError, StoreError};
use std::io::{self, IsTerminal, Write};

const RULE_WIDTH: usize = 72;
const FIELD_WIDTH: usize = 12;

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// Heading line with a rule underneath.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

/// `Key:` padded to a fixed column, then the value.
pub fn field(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<FIELD_WIDTH$} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and labels for reading at a terminal.
    Pretty,
    /// Plain rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn pick(flag: Option<Self>, json: bool, env: Option<&str>, tty: bool) -> Self {
        flag.or_else(|| json.then_some(Self::Json))
            .or_else(|| env.and_then(|value| <Self as ValueEnum>::from_str(value.trim(), true).ok()))
            .unwrap_or(if tty { Self::Pretty } else { Self::Text })
    }
}

/// Resolve the output mode from flags, `FORMAT` and the terminal.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    OutputMode::pick(
        format_flag,
        json_flag,
        env.as_deref(),
        io::stdout().is_terminal(),
    )
}

/// A list entry that knows its pretty and text forms. JSON comes from
/// `Serialize`.
pub trait Row: Serialize {
    /// Column names for text mode, matching [`Row::text`].
    const HEADERS: &'static [&'static str];

    fn pretty(&self, w: &mut dyn Write) -> io::Result<()>;

    fn text(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Render rows to stdout. JSON mode always prints an array, even when
/// empty; text mode prints a header only when there are rows.
pub fn render_rows<R: Row>(rows: &[R], mode: OutputMode) -> anyhow::Result<()> {
    let stdout = io::stdout();
    write_rows(rows, mode, &mut stdout.lock())
}

fn write_rows<R: Row>(rows: &[R], mode: OutputMode, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            if !rows.is_empty() {
                writeln!(out, "{}", R::HEADERS.join("  "))?;
            }
            for row in rows {
                row.text(out)?;
            }
        }
        OutputMode::Pretty => {
            for row in rows {
                row.pretty(out)?;
            }
        }
    }
    Ok(())
}

/// Render one result: serialized in JSON mode, otherwise through the
/// matching writer.
pub fn emit<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(value, &mut out)?,
        OutputMode::Pretty => pretty(value, &mut out)?,
    }
    Ok(())
}

/// An error as shown to the user. `error_code` is either a core `E####`
/// code or a validation code such as `invalid_email`.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// An error tagged with a core code; the code's hint becomes the
    /// suggestion.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }
}

impl From<&LookupError> for CliError {
    fn from(err: &LookupError) -> Self {
        Self::coded(err.code(), err.to_string())
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self::coded(err.code(), err.to_string())
    }
}

/// Write `error` to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    write_error(mode, error, &mut stderr.lock())
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> io::Result<()> {
    if mode.is_json() {
        serde_json::to_writer(&mut *out, &serde_json::json!({ "error": error }))?;
        return writeln!(out);
    }
    writeln!(out, "error: {}", error.message)?;
    match &error.suggestion {
        Some(hint) => writeln!(out, "  hint: {hint}"),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_beats_everything() {
        let mode = OutputMode::pick(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_beats_env() {
        assert_eq!(
            OutputMode::pick(None, true, Some("pretty"), true),
            OutputMode::Json
        );
    }

    #[test]
    fn env_is_case_insensitive() {
        assert_eq!(
            OutputMode::pick(None, false, Some(" JSON "), true),
            OutputMode::Json
        );
    }

    #[test]
    fn unknown_env_falls_back_to_terminal_check() {
        assert_eq!(
            OutputMode::pick(None, false, Some("fancy"), true),
            OutputMode::Pretty
        );
        assert_eq!(
            OutputMode::pick(None, false, Some("fancy"), false),
            OutputMode::Text
        );
    }

    #[derive(Serialize)]
    struct Pipe {
        name: &'static str,
        bar: u32,
    }

    impl Row for Pipe {
        const HEADERS: &'static [&'static str] = &["NAME", "BAR"];

        fn pretty(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{} at {} bar", self.name, self.bar)
        }

        fn text(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}  {}", self.name, self.bar)
        }
    }

    fn pipes() -> Vec<Pipe> {
        vec![
            Pipe {
                name: "main",
                bar: 4,
            },
            Pipe {
                name: "spur",
                bar: 2,
            },
        ]
    }

    fn rows_as(mode: OutputMode, rows: &[Pipe]) -> String {
        let mut buf = Vec::new();
        write_rows(rows, mode, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_rows_start_with_headers() {
        assert_eq!(
            rows_as(OutputMode::Text, &pipes()),
            "NAME  BAR\nmain  4\nspur  2\n"
        );
        assert_eq!(rows_as(OutputMode::Text, &[]), "");
    }

    #[test]
    fn json_rows_are_an_array() {
        let parsed: serde_json::Value =
            serde_json::from_str(&rows_as(OutputMode::Json, &pipes())).unwrap();
        assert_eq!(parsed[1]["name"], "spur");

        let empty: serde_json::Value =
            serde_json::from_str(&rows_as(OutputMode::Json, &[])).unwrap();
        assert_eq!(empty, serde_json::json!([]));
    }

    #[test]
    fn lookup_error_carries_code_and_hint() {
        let err = CliError::from(&LookupError::NotFound("abc".to_string()));
        assert_eq!(err.error_code.as_deref(), Some("E2001"));
        assert!(err.suggestion.is_some());
        assert!(err.message.contains("abc"));
    }

    #[test]
    fn text_error_shows_hint() {
        let err = CliError::new("disk full").with_suggestion("free some space");
        let mut buf = Vec::new();
        write_error(OutputMode::Text, &err, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "error: disk full\n  hint: free some space\n"
        );
    }

    #[test]
    fn json_error_is_wrapped_on_one_line() {
        let err = CliError::new("disk full").with_code("E5002");
        let mut buf = Vec::new();
        write_error(OutputMode::Json, &err, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["error"]["error_code"], "E5002");
        assert!(parsed["error"].get("suggestion").is_none());
    }
}
