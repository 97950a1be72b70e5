use crate::models::Score;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Width of the plain-text progress bar
const PROGRESS_WIDTH: usize = 20;

/// One model's answer with its score control
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    /// 1-based, used to address the panel when scoring
    pub number: usize,
    pub llm: String,
    pub response: String,
    pub score: Score,
}

/// State of the export action
#[derive(Debug, Clone, Serialize)]
pub struct ExportStatus {
    /// Entries currently in the export list
    pub entries: usize,
    pub path: String,
}

/// Everything shown for the current question
#[derive(Debug, Clone, Serialize)]
pub struct View {
    /// 1-based position of the question
    pub position: usize,
    pub total: usize,
    /// Fraction of questions before this one, 0.0 to 1.0
    pub progress: f64,
    pub question_id: String,
    pub question_text: String,
    pub panels: Vec<Panel>,
    pub committed: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub export: ExportStatus,
}

impl View {
    pub fn save_label(&self) -> &'static str {
        if self.committed {
            "Update Scores"
        } else {
            "Save Scores"
        }
    }
}

/// Feedback for the action just performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Info(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Event<'a> {
    View(&'a View),
    Notice(&'a Notice),
    Text(&'a str),
}

/// Render the current question in the specified format
pub fn write_view<W: Write>(out: &mut W, view: &View, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => write_view_plain(out, view),
        OutputFormat::Json => write_json(out, &Event::View(view)),
    }
}

pub fn write_notice<W: Write>(out: &mut W, notice: &Notice, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            let marker = match notice {
                Notice::Success(_) => "✅",
                Notice::Info(_) => "ℹ️ ",
                Notice::Warning(_) => "⚠️ ",
                Notice::Error(_) => "❌",
            };
            writeln!(out, "{} {}", marker, notice.message())?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &Event::Notice(notice)),
    }
}

/// Free-form text such as the help listing
pub fn write_text<W: Write>(out: &mut W, text: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            writeln!(out, "{}", text)?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &Event::Text(text)),
    }
}

fn write_json<W: Write>(out: &mut W, event: &Event<'_>) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)?;
    Ok(())
}

fn write_view_plain<W: Write>(out: &mut W, view: &View) -> Result<()> {
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(
        out,
        "Question {} of {}  {}",
        view.position,
        view.total,
        progress_bar(view.progress)
    )?;
    writeln!(out, "Question ID: {}", view.question_id)?;
    writeln!(out, "Question: {}", view.question_text)?;
    writeln!(out, "{}", "-".repeat(50))?;

    for panel in &view.panels {
        writeln!(
            out,
            "[{}] {}  (rate 1=Poor, 5=Excellent: {})",
            panel.number, panel.llm, panel.score
        )?;
        writeln!(out, "{}", panel.response)?;
        writeln!(out)?;
    }

    writeln!(out, "{}", "-".repeat(50))?;

    let mut actions = Vec::new();
    if view.can_go_previous {
        actions.push("⬅️  prev".to_string());
    }
    actions.push(format!("💾 save ({})", view.save_label()));
    if view.can_go_next {
        actions.push("➡️  next".to_string());
    }
    actions.push("💾 save-all".to_string());
    writeln!(out, "{}", actions.join("   "))?;

    if view.export.entries > 0 {
        writeln!(
            out,
            "📥 {} saved scores: 'export' writes {}",
            view.export.entries, view.export.path
        )?;
    } else {
        writeln!(out, "📥 Score some responses to enable downloads")?;
    }

    Ok(())
}

fn progress_bar(progress: f64) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let filled = (progress * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        progress * 100.0
    )
}
