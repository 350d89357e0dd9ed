//! Terminal rendering for pipeline results.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use crate::application::AnalysisOutcome;
use crate::domain::models::{Strategy, StrategySummary};

/// Render the human-facing success summary for one pipeline run.
pub fn print_analysis(outcome: &AnalysisOutcome) {
    let strategy = &outcome.strategy;

    println!(
        "{} strategy {} ({})",
        style("saved").green().bold(),
        style(&strategy.id).cyan(),
        outcome.file_path.display()
    );
    println!(
        "  tone: {}  fingerprint: {}  source: {}  confidence: {:.2}",
        strategy.brief.tone,
        strategy.input_fingerprint,
        strategy.candidates.source,
        strategy.candidates.confidence
    );

    if !strategy.pipeline.degraded_steps.is_empty() {
        println!(
            "  {} {}",
            style("degraded:").yellow(),
            strategy.pipeline.degraded_steps.join(", ")
        );
    }
    for warning in &outcome.warnings {
        println!("  {} {warning}", style("warning:").yellow());
    }

    println!("\n{}", titles_table(strategy));

    if !strategy.candidates.thumbnail_lines.is_empty() {
        println!(
            "thumbnail lines: {}",
            strategy.candidates.thumbnail_lines.join(" | ")
        );
    }
    if !strategy.candidates.tags.is_empty() {
        let tags: Vec<&str> = strategy.candidates.tags.iter().map(String::as_str).collect();
        println!("tags: {}", tags.join(", "));
    }

    if let Some(gaps) = &strategy.gaps {
        if !gaps.gaps.is_empty() {
            println!("\ntop gaps vs competitors:");
            for gap in gaps.gaps.iter().take(5) {
                println!(
                    "  {:.2}  {}  ({})",
                    gap.opportunity_score,
                    style(&gap.topic).bold(),
                    gap.rationale
                );
            }
        }
    }
}

fn titles_table(strategy: &Strategy) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "optimized title"]);
    for (i, title) in strategy.candidates.titles.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), title.clone()]);
    }
    table
}

/// Render strategy summaries as a table.
pub fn print_summaries(summaries: &[StrategySummary]) {
    if summaries.is_empty() {
        println!("no strategies stored yet");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["id", "created", "tone", "goal", "top keywords"]);
    for summary in summaries {
        table.add_row(vec![
            summary.id.clone(),
            summary.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            summary.tone.to_string(),
            truncate(&summary.goal, 40),
            truncate(&summary.top_keywords.join(", "), 40),
        ]);
    }
    println!("{table}");
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
