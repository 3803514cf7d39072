//! CLI subcommands.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdrill_client::{load_config_from, ClientConfig};
use quizdrill_core::model::ScoredAttempt;
use quizdrill_core::results::{review, summarize, OptionTag};

pub mod results;
pub mod take;
pub mod validate_config;

/// Load the config file and apply command-line overrides.
pub fn effective_config(
    path: Option<&Path>,
    base_url: Option<String>,
    token: Option<String>,
) -> Result<ClientConfig> {
    let mut config = load_config_from(path)?;
    if let Some(url) = base_url {
        config.base_url = url;
    }
    if let Some(token) = token {
        config.api_token = Some(token);
    }
    Ok(config)
}

/// Print the summary header and the per-question breakdown table.
pub fn print_attempt(attempt: &ScoredAttempt, pass_threshold: f64) {
    let summary = summarize(attempt, pass_threshold);
    let label = if summary.passed { "PASSED" } else { "FAILED" };

    println!(
        "\nScore: {:.1}% ({}/{} correct) — {label}",
        summary.percent, summary.correct_answers, summary.total_questions
    );
    print!("Time: {}", summary.duration);
    if summary.timed_out {
        print!(" (time expired)");
    }
    println!("\n");

    let mut table = Table::new();
    table.set_header(vec!["#", "Your answer", "Correct answer", "Result", "Points"]);
    let mut highlights = Vec::new();

    for (i, row) in review(attempt).iter().enumerate() {
        let verdict = if row.correct { "correct" } else { "wrong" };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(if row.user_answer.is_empty() {
                "(skipped)"
            } else {
                &row.user_answer
            }),
            Cell::new(&row.correct_answer),
            Cell::new(verdict),
            Cell::new(format!("{:.0}/{:.0}", row.points_earned, row.max_points)),
        ]);

        for option in &row.options {
            match option.tag {
                OptionTag::CorrectAnswer => {
                    highlights.push(format!("  q{}: [correct] {}", i + 1, option.text));
                }
                OptionTag::WrongPick => {
                    highlights.push(format!("  q{}: [your pick] {}", i + 1, option.text));
                }
                OptionTag::Plain => {}
            }
        }
    }

    println!("{table}");
    for line in highlights {
        println!("{line}");
    }
}
