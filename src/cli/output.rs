//! CLI output formatting

use crate::{
    core::{ExecutionStatus, Source, Stage},
    execution::ExecutionEvent,
    persistence::{ArticleRecord, ArticleVersion},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner shown while a run is in flight
pub fn create_spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        progress.set_style(template);
    }
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Spinner message for a stage in progress
pub fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Research => "Researching sources...",
        Stage::Write => "Writing article...",
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted { run_id, topic } => format!(
            "{} Starting run {} ({})",
            ROCKET,
            style(topic).bold(),
            style(short_id(run_id)).dim()
        ),
        ExecutionEvent::StageStarted { stage, .. } => {
            format!("{} {}", SPINNER, style(stage).cyan())
        }
        ExecutionEvent::StageCompleted { stage, .. } => {
            format!("{} {}", CHECK, style(stage).green())
        }
        ExecutionEvent::StageFailed { stage, error, .. } => {
            format!("{} {}: {}", CROSS, style(stage).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted { run_id, status } => format!(
            "{} Run ({}) {}",
            INFO,
            style(short_id(run_id)).dim(),
            format_status(*status)
        ),
    }
}

/// Numbered source list matching the article's citation markers
pub fn format_sources(sources: &[Source]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "  [{}] {} {}",
                i + 1,
                style(&source.title).bold(),
                style(&source.url).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of a saved article
pub fn format_article_summary(article: &ArticleRecord) -> String {
    format!(
        "{} {} - {} - {} sources - {}",
        INFO,
        style(article.id).dim(),
        style(&article.title).bold(),
        article.sources.len(),
        style(&article.status).cyan()
    )
}

/// One-line summary of a version snapshot
pub fn format_version(version: &ArticleVersion) -> String {
    let author = version.user_id.as_deref().unwrap_or("-");
    format!(
        "  {} {} - {} - {} ({})",
        style(short_id(&version.id)).dim(),
        style(version.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
        style(&version.title).bold(),
        style(&version.status).cyan(),
        author
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_numbered_from_one() {
        console::set_colors_enabled(false);
        let sources = vec![
            Source {
                title: "A".to_string(),
                url: "https://a".to_string(),
            },
            Source {
                title: "B".to_string(),
                url: "https://b".to_string(),
            },
        ];

        let text = format_sources(&sources);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["  [1] A https://a", "  [2] B https://b"]);
    }

    #[test]
    fn test_stage_failed_event_mentions_error() {
        console::set_colors_enabled(false);
        let text = format_execution_event(&ExecutionEvent::StageFailed {
            run_id: uuid::Uuid::nil(),
            stage: Stage::Research,
            error: "no results".to_string(),
        });
        assert!(text.contains("research: no results"));
    }
}
