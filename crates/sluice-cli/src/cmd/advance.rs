//! `sluice advance`: move complaints one lifecycle step forward.
//!
//! Each id is handled independently; one failure does not stop the rest.
//! A resolved complaint cannot advance and is reported as a failure.

use crate::context::{Reported, Store, Workspace, fail};
use crate::output::{CliError, OutputMode, emit};
use clap::Args;
use serde::Serialize;
use sluice_core::error::ErrorCode;
use sluice_core::lifecycle::{self, TransitionOutcome};
use sluice_core::model::{Status, reference};
use std::io::Write;

#[derive(Args, Debug)]
pub struct AdvanceArgs {
    /// Complaint IDs or unique prefixes.
    #[arg(required = true, value_name = "ID")]
    pub ids: Vec<String>,
}

/// Per-complaint result of a transition command.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub id: String,
    pub ok: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "error_code",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_code"
    )]
    pub code: Option<ErrorCode>,
}

fn serialize_code<S: serde::Serializer>(
    code: &Option<ErrorCode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match code {
        Some(code) => serializer.serialize_str(code.code()),
        None => serializer.serialize_none(),
    }
}

impl TransitionResult {
    /// Map a lifecycle outcome onto a reportable result for `id`.
    pub fn from_outcome(id: &str, outcome: TransitionOutcome) -> Self {
        let base = Self {
            id: id.to_string(),
            ok: true,
            outcome: "",
            from: None,
            to: None,
            error: None,
            code: None,
        };
        match outcome {
            TransitionOutcome::Advanced { from, to } => Self {
                outcome: "advanced",
                from: Some(from),
                to: Some(to),
                ..base
            },
            TransitionOutcome::Unchanged(status) => Self {
                outcome: "unchanged",
                from: Some(status),
                to: Some(status),
                ..base
            },
            TransitionOutcome::Terminal => Self::failed(
                id,
                "terminal",
                "complaint is already resolved".to_string(),
                ErrorCode::InvalidStatusTransition,
            ),
            TransitionOutcome::NotFound => Self::failed(
                id,
                "not-found",
                format!("complaint not found: '{id}'"),
                ErrorCode::ComplaintNotFound,
            ),
            TransitionOutcome::Rejected(invalid) => Self {
                from: Some(invalid.from),
                to: Some(invalid.to),
                ..Self::failed(
                    id,
                    "rejected",
                    invalid.to_string(),
                    ErrorCode::InvalidStatusTransition,
                )
            },
        }
    }

    pub fn failed(id: &str, outcome: &'static str, error: String, code: ErrorCode) -> Self {
        Self {
            id: id.to_string(),
            ok: false,
            outcome,
            from: None,
            to: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionBatch {
    pub results: Vec<TransitionResult>,
}

/// Resolve `raw` and apply `step` to the resolved id.
pub fn transition_one(
    store: &mut Store,
    raw: &str,
    step: impl FnOnce(&mut Store, &str) -> anyhow::Result<TransitionOutcome>,
) -> TransitionResult {
    let id = match store.resolve(raw) {
        Ok(complaint) => complaint.id.clone(),
        Err(err) => return TransitionResult::failed(raw, "not-found", err.to_string(), err.code()),
    };
    match step(store, &id) {
        Ok(outcome) => TransitionResult::from_outcome(&id, outcome),
        Err(err) => TransitionResult::failed(
            &id,
            "error",
            format!("{err:#}"),
            ErrorCode::StorageWriteFailed,
        ),
    }
}

/// Render a batch and turn any failure into the command's exit status.
///
/// Outside JSON mode a lone failed id is rendered as a plain error.
pub fn finish(batch: &TransitionBatch, output: OutputMode) -> anyhow::Result<()> {
    let lone_failure = match batch.results.as_slice() {
        [only] if !only.ok && !output.is_json() => Some(only),
        _ => None,
    };
    if let Some(only) = lone_failure {
        let error = CliError::coded(
            only.code.unwrap_or(ErrorCode::InternalUnexpected),
            only.error.clone().unwrap_or_default(),
        );
        return Err(fail(output, &error));
    }

    emit(
        output,
        batch,
        |b, w| {
            for r in &b.results {
                match (&r.error, r.from, r.to) {
                    (Some(error), _, _) => writeln!(w, "err  {}  {error}", r.id)?,
                    (None, Some(from), Some(to)) => {
                        writeln!(w, "ok  {}  {from} -> {to}", r.id)?;
                    }
                    _ => writeln!(w, "ok  {}", r.id)?,
                }
            }
            Ok(())
        },
        |b, w| {
            for r in &b.results {
                let short = reference(&r.id);
                match (&r.error, r.from, r.to) {
                    (Some(error), _, _) => writeln!(w, "✗ #{short}  {error}")?,
                    (None, Some(from), Some(to)) if from == to => {
                        writeln!(w, "✓ #{short}  already {}", to.label())?;
                    }
                    (None, Some(from), Some(to)) => {
                        writeln!(w, "✓ #{short}  {} → {}", from.label(), to.label())?;
                    }
                    _ => writeln!(w, "✓ #{short}")?,
                }
            }
            Ok(())
        },
    )?;

    let failed = batch.results.iter().filter(|r| !r.ok).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(anyhow::Error::new(Reported(format!(
            "{failed} complaint(s) failed"
        ))))
    }
}

pub fn run_advance(args: &AdvanceArgs, ws: &Workspace, output: OutputMode) -> anyhow::Result<()> {
    let mut store = ws.open_store()?;
    let results = args
        .ids
        .iter()
        .map(|raw| transition_one(&mut store, raw, |store, id| Ok(lifecycle::advance(store, id)?)))
        .collect();

    finish(&TransitionBatch { results }, output)
}
