//! The `quizdrill results` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdrill_client::{ClientConfig, HttpQuizService};
use quizdrill_core::model::ScoredAttempt;
use quizdrill_core::traits::QuizService;

pub async fn execute(
    config: ClientConfig,
    quiz_id: Option<String>,
    attempt_id: Option<String>,
    file: Option<PathBuf>,
    pass_threshold: Option<f64>,
) -> Result<()> {
    let attempt = match (file, quiz_id, attempt_id) {
        (Some(path), _, _) => ScoredAttempt::load_json(&path)?,
        (None, Some(quiz_id), Some(attempt_id)) => {
            let service = HttpQuizService::new(
                &config.base_url,
                config.api_token.clone(),
                config.timeout_secs,
            );
            service.fetch_attempt(&quiz_id, &attempt_id).await?
        }
        _ => anyhow::bail!("pass either --file, or both --quiz and --attempt"),
    };

    let threshold = pass_threshold.unwrap_or(config.pass_threshold);
    super::print_attempt(&attempt, threshold);
    Ok(())
}
