//! Terminal and JSON rendering of runs and history.

use analysis_engine::{display_text, AnalysisRequest, AnalysisRun};
use database::HistoryEntry;
use mindscan_core::{AggregateReport, CommunitySnapshot, SentimentLabel};
use serde::Serialize;

#[derive(Serialize)]
pub struct JsonRun<'a> {
    pub request: &'a AnalysisRequest,
    pub community: Option<&'a CommunitySnapshot>,
    pub report: &'a AggregateReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub posts: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
pub struct JsonEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    pub url: &'a str,
    pub label: SentimentLabel,
    pub failed: bool,
    pub analysis: String,
}

impl<'a> JsonRun<'a> {
    pub fn new(run: &'a AnalysisRun, filter: Option<&'a str>) -> Self {
        let posts = run
            .entries()
            .filter(|(post, _)| filter.map_or(true, |keyword| post.matches_keyword(keyword)))
            .map(|(post, outcome)| JsonEntry {
                id: &post.id,
                title: &post.title,
                author: &post.author,
                url: &post.external_url,
                label: outcome.label,
                failed: outcome.failed,
                analysis: display_text(outcome),
            })
            .collect();

        Self {
            request: &run.request,
            community: run.snapshot.as_ref(),
            report: &run.report,
            filter,
            posts,
        }
    }
}

pub fn summary_lines(report: &AggregateReport) -> Vec<String> {
    let mut lines = vec![format!("{:<22} {:>5} {:>6}", "Label", "Count", "Share")];
    for label in SentimentLabel::ALL {
        lines.push(format!(
            "{:<22} {:>5} {:>5}%",
            label.display_name(),
            report.count(label),
            report.percentage(label)
        ));
    }
    lines.push(format!("{:<22} {:>5}", "Total", report.total_analyzed));
    lines
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

pub fn print_run(run: &AnalysisRun, filter: Option<&str>) {
    match &run.snapshot {
        Some(snapshot) => println!(
            "r/{} ({} subscribers)",
            snapshot.name, snapshot.subscriber_count
        ),
        None => println!("r/{}", run.request.community),
    }
    println!();

    let mut shown = 0;
    let entries: Box<dyn Iterator<Item = _> + '_> = match filter {
        Some(keyword) => Box::new(run.filtered(keyword)),
        None => Box::new(run.entries()),
    };
    for (post, outcome) in entries {
        let title = if post.title.is_empty() { "No title" } else { &post.title };
        let marker = if outcome.failed { " (analysis failed)" } else { "" };
        println!(
            "[{:<20}] {} - u/{}{}",
            outcome.label.display_name(),
            truncate(title, 60),
            post.author,
            marker
        );
        shown += 1;
    }
    if let Some(keyword) = filter {
        println!(
            "{} of {} posts match \"{}\"",
            shown,
            run.posts.len(),
            keyword
        );
    }

    println!();
    for line in summary_lines(&run.report) {
        println!("{}", line);
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No saved runs.");
        return;
    }

    for entry in entries {
        let top = entry
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .max_by_key(|(_, count)| **count)
            .map(|(label, count)| format!("{} ({})", label, count))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  r/{} [{}, {} posts]  most common: {}",
            entry.id,
            entry.analyzed_at.format("%Y-%m-%d %H:%M"),
            entry.community,
            entry.sort,
            entry.total_posts,
            top
        );
    }
}
