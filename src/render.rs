//! Plain-text rendering of technologies for the terminal.

use chrono::NaiveDate;

use crate::models::{Stats, Status, Technology};

const NOT_STARTED: char = '○';
const IN_PROGRESS: char = '◐';
const COMPLETED: char = '●';

const BAR_WIDTH: usize = 20;

fn status_symbol(status: Status) -> char {
    match status {
        Status::NotStarted => NOT_STARTED,
        Status::InProgress => IN_PROGRESS,
        Status::Completed => COMPLETED,
    }
}

/// Render a progress bar such as `[#####...............] 25%`.
pub fn progress_bar(progress: u8) -> String {
    let filled = (progress.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress
    )
}

/// Render one line per technology.
///
/// Example output:
/// ```text
/// ○ #1 React Components [frontend]
/// ◐ #4 Node.js Basics [backend] due 2026-01-31 (overdue)
/// ● #6 MongoDB [database]
/// ```
pub fn render_list(technologies: &[&Technology], today: NaiveDate) -> String {
    let mut output = String::new();
    for tech in technologies {
        output.push(status_symbol(tech.status));
        output.push_str(&format!(" #{} {}", tech.id, tech.title));
        if let Some(category) = &tech.category {
            output.push_str(&format!(" [{}]", category));
        }
        if let Some(deadline) = tech.deadline {
            output.push_str(&format!(" due {}", deadline));
            if tech.is_overdue(today) {
                output.push_str(" (overdue)");
            }
        }
        output.push('\n');
    }
    output
}

pub fn render_detail(tech: &Technology, today: NaiveDate) -> String {
    let mut output = format!(
        "#{} {}\n{}\nStatus: {} {}\n",
        tech.id,
        tech.title,
        tech.description,
        status_symbol(tech.status),
        tech.status
    );
    if let Some(category) = &tech.category {
        output.push_str(&format!("Category: {}\n", category));
    }
    match tech.deadline {
        Some(deadline) if tech.is_overdue(today) => {
            output.push_str(&format!("Deadline: {} (overdue)\n", deadline))
        }
        Some(deadline) => output.push_str(&format!("Deadline: {}\n", deadline)),
        None => {}
    }
    if !tech.notes.is_empty() {
        output.push_str(&format!("Notes:\n{}\n", tech.notes));
    }
    if !tech.resources.is_empty() {
        output.push_str("Resources:\n");
        for url in &tech.resources {
            output.push_str(&format!("  - {}\n", url));
        }
    }
    output
}

/// Encouragement shown under the progress bar: one line for nothing done,
/// one for everything done, one for anything in between.
pub fn progress_message(progress: u8) -> &'static str {
    match progress {
        0 => "Start learning your first technology!",
        100 => "Congratulations! You have learned every technology!",
        _ => "You are on the right track. Keep going!",
    }
}

pub fn render_stats(stats: &Stats, progress: u8) -> String {
    format!(
        "{}\n{}\nTotal: {}  Completed: {}  In progress: {}  Not started: {}  Overdue: {}\n",
        progress_bar(progress),
        progress_message(progress),
        stats.total,
        stats.completed,
        stats.in_progress,
        stats.not_started,
        stats.overdue
    )
}
