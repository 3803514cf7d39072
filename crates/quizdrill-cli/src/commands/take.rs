//! The `quizdrill take` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;

use quizdrill_client::{ClientConfig, HttpQuizService};
use quizdrill_core::attempt::Phase;
use quizdrill_core::model::QuestionKind;
use quizdrill_core::session::{AttemptView, QuizSession};
use quizdrill_core::traits::Session;

pub async fn execute(
    config: ClientConfig,
    quiz_id: String,
    answers: Option<String>,
    out: Option<PathBuf>,
    pass_threshold: Option<f64>,
    user: String,
) -> Result<()> {
    let service = Arc::new(HttpQuizService::new(
        &config.base_url,
        config.api_token.clone(),
        config.timeout_secs,
    ));
    let session = QuizSession::start(service, Session::new(user), &quiz_id).await?;
    let quiz = session.quiz();

    eprintln!("{} — {} questions", quiz.title, quiz.questions.len());
    if let Some(remaining) = session.view().remaining {
        eprintln!("Time limit: {remaining}");
    }

    let scored = match answers {
        Some(answers) => {
            // Scripted mode: answers are positional, empty segment = skip.
            for (i, answer) in answers.split(',').enumerate() {
                let answer = answer.trim();
                if !answer.is_empty() {
                    session.record_answer(i, answer)?;
                }
            }
            session.submit().await?
        }
        None => interactive(&session).await?,
    };

    // The quiz's own bar unless the caller picked one.
    let threshold = pass_threshold.unwrap_or(quiz.passing_score_percent);
    super::print_attempt(&scored, threshold);

    if let Some(path) = out {
        scored.save_json(&path)?;
        eprintln!("Attempt saved to: {}", path.display());
    }

    Ok(())
}

fn render(view: &AttemptView) {
    println!();
    if let Some(remaining) = &view.remaining {
        println!("[{remaining} left] answered {}/{}", view.answered, view.total);
    } else {
        println!("answered {}/{}", view.answered, view.total);
    }
    println!("Q{}/{}: {}", view.index + 1, view.total, view.question.text);
    for (i, option) in view.question.options().iter().enumerate() {
        let letter = (b'a' + i as u8) as char;
        println!("  {letter}) {option}");
    }
    if let Some(answer) = &view.answer {
        println!("  current answer: {answer}");
    }
    println!("(answer, or :n :p :goto N :submit :quit)");
}

/// Walk the quiz on stdin. The one-second poll notices a timeout
/// auto-submit even while waiting for input.
async fn interactive(session: &QuizSession) -> Result<quizdrill_core::model::ScoredAttempt> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut poll = tokio::time::interval(Duration::from_secs(1));
    poll.tick().await;

    render(&session.view());

    loop {
        // Failed stays in the loop so :submit can retry.
        match session.phase() {
            Phase::InProgress | Phase::Submitting | Phase::Failed => {}
            Phase::Completed => break,
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // EOF: submit whatever has been answered.
                    let _ = session.submit().await;
                    break;
                };
                if handle_input(session, line.trim()).await? {
                    break;
                }
                if session.phase() == Phase::InProgress {
                    render(&session.view());
                }
            }
            _ = poll.tick() => {}
        }
    }

    match session.phase() {
        Phase::Completed => Ok(session
            .result()
            .expect("completed attempt always has a result")),
        phase => anyhow::bail!("attempt ended without a score (phase: {phase})"),
    }
}

/// Apply one line of input. Returns `true` when the loop should stop.
async fn handle_input(session: &QuizSession, input: &str) -> Result<bool> {
    match input {
        "" => {}
        ":q" | ":quit" => {
            session.close();
            anyhow::bail!("attempt abandoned");
        }
        ":n" | ":next" => session.next(),
        ":p" | ":prev" => session.previous(),
        ":submit" => {
            if let Err(e) = session.submit().await {
                eprintln!("Submit failed: {e:#}");
                eprintln!("Your answers are kept; :submit retries.");
            }
            return Ok(session.phase() == Phase::Completed);
        }
        goto if goto.starts_with(":goto ") => {
            match goto[6..].trim().parse::<usize>() {
                // 1-based on the prompt, 0-based inside.
                Ok(n) if n >= 1 => session.go_to(n - 1),
                _ => eprintln!("usage: :goto N"),
            }
        }
        answer => {
            let view = session.view();
            let value = resolve_option(&view, answer);
            // Answers cannot be recorded outside InProgress (e.g. after a
            // failed submit); tell the learner instead of tearing down.
            if let Err(e) = session.record_answer(view.index, value) {
                eprintln!("{e}; use :submit to retry or :quit to leave");
            } else {
                session.next();
            }
        }
    }
    Ok(false)
}

/// Map a single option letter to the option text for choice questions;
/// anything else is recorded verbatim.
fn resolve_option(view: &AttemptView, input: &str) -> String {
    if let QuestionKind::MultipleChoice { options } = &view.question.kind {
        if input.len() == 1 {
            let c = input.as_bytes()[0].to_ascii_lowercase();
            if c.is_ascii_lowercase() {
                let index = (c - b'a') as usize;
                if let Some(option) = options.get(index) {
                    return option.clone();
                }
            }
        }
    }
    input.to_string()
}
