/// Report rendering for the command line
use crate::analysis::AnalysisReport;
use crate::config::OutputFormat;
use anyhow::Result;
use std::fmt::Write;

/// Render a report in the requested format
pub fn render(report: &AnalysisReport, format: OutputFormat, max_comment_chars: usize) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(report, max_comment_chars),
        OutputFormat::JSON => Ok(serde_json::to_string_pretty(report)?),
    }
}

pub fn render_text(report: &AnalysisReport, max_comment_chars: usize) -> Result<String> {
    let mut out = String::new();
    let summary = &report.summary;

    writeln!(out, "Video: {}", report.video_id)?;
    match &report.thumbnail_url {
        Some(url) => writeln!(out, "Thumbnail: {}", url)?,
        None => writeln!(out, "Thumbnail: unavailable")?,
    }
    writeln!(out)?;

    writeln!(out, "Total Comments: {}", summary.total)?;
    writeln!(out, "Positive Comments: {} ({:.2}%)", summary.positive, summary.positive_percent)?;
    writeln!(out, "Negative Comments: {} ({:.2}%)", summary.negative, summary.negative_percent)?;

    if report.is_degraded() {
        writeln!(
            out,
            "Skipped: {} of {} fetched comments could not be classified",
            report.skipped, report.fetched
        )?;
    }
    if report.has_more_comments {
        writeln!(out, "Note: only the first page of comments was retrieved")?;
    }

    writeln!(out)?;
    writeln!(out, "Filter: {} ({} shown)", report.filter, report.comments.len())?;

    for (idx, comment) in report.comments.iter().enumerate() {
        writeln!(out, "Comment {}: {}", idx + 1, truncate(&comment.text, max_comment_chars))?;
        writeln!(out, "Classification: {}", comment.classification)?;
    }

    Ok(out)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
