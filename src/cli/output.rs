//! Command output.
//!
//! Every command produces a value implementing [`Report`]. In robot mode it
//! is wrapped in an [`Envelope`] and printed as JSON on stdout; otherwise it
//! renders itself onto a [`Sheet`] for the terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{Result, SuggestError};
use crate::search::MatchSource;

/// Output of one command.
pub trait Report: Serialize {
    fn render(&self, sheet: &mut Sheet);

    /// Non-fatal problems reported alongside the data.
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Print `report` in the mode the user asked for.
pub fn emit<R: Report>(robot: bool, report: &R) -> Result<()> {
    if robot {
        let envelope = Envelope::ok(report, report.warnings());
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        let mut sheet = Sheet::default();
        report.render(&mut sheet);
        println!("{sheet}");
    }
    Ok(())
}

/// Report a failed command; robot mode gets an error envelope on stdout.
pub fn emit_failure(robot: bool, err: &SuggestError) {
    if robot {
        match serde_json::to_string_pretty(&Envelope::failed(err)) {
            Ok(payload) => {
                println!("{payload}");
                return;
            }
            Err(ser_err) => eprintln!("Error: could not encode error envelope: {ser_err}"),
        }
    }
    eprintln!("Error: {err}");
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Outcome,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Error {
        code: &'static str,
        message: String,
        transient: bool,
    },
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, warnings: Vec<String>) -> Self {
        Self {
            status: Outcome::Ok,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            data,
            warnings,
        }
    }
}

impl Envelope<()> {
    pub fn failed(err: &SuggestError) -> Self {
        Self {
            status: Outcome::Error {
                code: err.code(),
                message: err.to_string(),
                transient: err.is_transient(),
            },
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            data: (),
            warnings: Vec::new(),
        }
    }
}

const LABEL_WIDTH: usize = 16;
const NAME_WIDTH: usize = 32;
const METER_WIDTH: usize = 10;

/// Terminal rendering target for a [`Report`].
#[derive(Debug, Default)]
pub struct Sheet {
    lines: Vec<String>,
}

impl Sheet {
    pub fn heading(&mut self, text: &str) -> &mut Self {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(style(text).bold().to_string());
        self
    }

    pub fn field(&mut self, label: &str, value: impl fmt::Display) -> &mut Self {
        // Pad before styling so escape codes do not eat the width.
        let padded = format!("{label:LABEL_WIDTH$}");
        self.lines.push(format!("  {} {value}", style(padded).dim()));
        self
    }

    pub fn flag(&mut self, label: &str, on: bool) -> &mut Self {
        self.field(label, if on { "yes" } else { "no" })
    }

    /// One ranked suggestion: confidence, meter, skill name, source.
    pub fn suggestion(&mut self, confidence: f32, skill_name: &str, source: MatchSource) -> &mut Self {
        let source = match source {
            MatchSource::Mapped => style("mapped").green(),
            MatchSource::Semantic => style("semantic").cyan(),
        };
        self.lines.push(format!(
            "  {confidence:>4.2} {} {skill_name:<NAME_WIDTH$} {source}",
            meter(confidence)
        ));
        self
    }

    /// A role and its curated skills.
    pub fn mapping(&mut self, role: &str, skills: &[String]) -> &mut Self {
        self.lines.push(format!("  {} {}", style(role).bold(), style(skills.join(", ")).dim()));
        self
    }

    pub fn note(&mut self, text: impl fmt::Display) -> &mut Self {
        self.lines.push(format!("  {}", style(text).italic()));
        self
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Fixed-width bar for a confidence in `[0, 1]`.
fn meter(confidence: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((confidence.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize).min(METER_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(METER_WIDTH - filled))
}
