//! CLI output formatting utilities.

use crate::transcript::TranscriptQuestion;
use crate::youtube::{watch_url, Video};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print one video of a search listing.
    pub fn video(video: &Video) {
        println!(
            "\n{} {} ({}, {}, {} views)",
            style(">>").green(),
            style(&video.title).bold(),
            video.channel,
            format_duration(&video.duration),
            video.view_count
        );
        if !video.description.trim().is_empty() {
            println!("   {}", content_preview(&video.description, 160));
        }
        println!("   {}", style(watch_url(&video.id)).dim());
    }

    /// Print a transcript search hit.
    pub fn search_hit(rank: usize, score: usize, text: &str) {
        println!(
            "\n{} #{} (matches: {})",
            style(">>").green(),
            rank,
            style(score).cyan()
        );
        println!("   {}", content_preview(text, 300));
    }

    /// Print a multiple-choice question with its answer marked.
    pub fn question(number: usize, question: &TranscriptQuestion) {
        let mut tags: Vec<&str> = Vec::new();
        if !question.difficulty.is_empty() {
            tags.push(&question.difficulty);
        }
        if !question.question_type.is_empty() {
            tags.push(&question.question_type);
        }

        if tags.is_empty() {
            println!("\n{}. {}", number, style(&question.question).bold());
        } else {
            println!(
                "\n{}. {} {}",
                number,
                style(&question.question).bold(),
                style(format!("[{}]", tags.join(", "))).dim()
            );
        }

        for (i, option) in question.options.iter().enumerate() {
            let letter = (b'A' + (i % 26) as u8) as char;
            if i == question.correct_answer {
                println!("   {} {}) {}", style("*").green(), letter, option);
            } else {
                println!("     {}) {}", letter, option);
            }
        }
        if !question.explanation.is_empty() {
            println!("   {}", style(&question.explanation).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format an ISO-8601 video duration (`PT1H2M3S`) for humans.
fn format_duration(iso: &str) -> String {
    let Some(rest) = iso.strip_prefix("PT") else {
        return iso.to_string();
    };

    let mut parts = Vec::new();
    let mut number = String::new();
    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'H' | 'M' | 'S' => {
                let value: u32 = number.parse().unwrap_or(0);
                number.clear();
                if value > 0 {
                    parts.push(format!("{}{}", value, c.to_ascii_lowercase()));
                }
            }
            _ => return iso.to_string(),
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
