//! CLI integration tests using assert_cmd and a wiremock platform.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quizdrill() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizdrill").unwrap()
}

fn quiz_json() -> serde_json::Value {
    serde_json::json!({
        "id": "quiz-1",
        "title": "Dental Materials",
        "questions": [
            {"id": "q0", "text": "Pick a", "type": "multiple-choice", "options": ["a", "b", "c"]},
            {"id": "q1", "text": "Pick b", "type": "multiple-choice", "options": ["a", "b", "c"]},
            {"id": "q2", "text": "Pick c", "type": "multiple-choice", "options": ["a", "b", "c"]}
        ],
        "time_limit_minutes": 10,
        "passing_score_percent": 70.0
    })
}

fn scored_json() -> serde_json::Value {
    serde_json::json!({
        "id": "attempt-1",
        "quiz_id": "quiz-1",
        "total_score": 1.0,
        "max_score": 3.0,
        "duration_sec": 95,
        "timed_out": false,
        "answers": [
            {"question_id": "q0", "user_answer": "a", "correct_answer": "a", "correct": true,
             "points_earned": 1.0, "max_points": 1.0, "options": ["a", "b", "c"]},
            {"question_id": "q1", "user_answer": "", "correct_answer": "b", "correct": false,
             "points_earned": 0.0, "max_points": 1.0, "options": ["a", "b", "c"]},
            {"question_id": "q2", "user_answer": "a", "correct_answer": "c", "correct": false,
             "points_earned": 0.0, "max_points": 1.0, "options": ["a", "b", "c"]}
        ],
        "created_at": "2025-06-01T10:00:00Z"
    })
}

/// Start a wiremock platform on a private runtime that outlives the command.
fn platform(mocks: Vec<Mock>) -> (tokio::runtime::Runtime, MockServer) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    });
    (rt, server)
}

#[test]
fn take_scripted_answers() {
    let (_rt, server) = platform(vec![
        Mock::given(method("GET"))
            .and(path("/api/quizzes/quiz-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quiz_json())),
        Mock::given(method("POST"))
            .and(path("/api/quizzes/quiz-1/attempts"))
            .and(body_partial_json(serde_json::json!({
                "user_id": "student-7",
                "answers": ["a", "", "a"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(scored_json())),
    ]);

    quizdrill()
        .arg("take")
        .arg("--quiz")
        .arg("quiz-1")
        .arg("--base-url")
        .arg(server.uri())
        .arg("--answers")
        .arg("a,,a")
        .arg("--user")
        .arg("student-7")
        .assert()
        .success()
        .stderr(predicate::str::contains("Dental Materials"))
        .stderr(predicate::str::contains("Time limit: 10:00"))
        .stdout(predicate::str::contains("33.3%"))
        .stdout(predicate::str::contains("1/3 correct"))
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("(skipped)"));
}

#[test]
fn take_interactive_over_stdin() {
    let (_rt, server) = platform(vec![
        Mock::given(method("GET"))
            .and(path("/api/quizzes/quiz-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quiz_json())),
        Mock::given(method("POST"))
            .and(path("/api/quizzes/quiz-1/attempts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(scored_json())),
    ]);

    // Answer the first question by letter, skip ahead, submit explicitly.
    quizdrill()
        .arg("take")
        .arg("--quiz")
        .arg("quiz-1")
        .arg("--base-url")
        .arg(server.uri())
        .write_stdin("a\n:n\n:submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score:"));
}

#[test]
fn take_saves_attempt_json() {
    let (_rt, server) = platform(vec![
        Mock::given(method("GET"))
            .and(path("/api/quizzes/quiz-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quiz_json())),
        Mock::given(method("POST"))
            .and(path("/api/quizzes/quiz-1/attempts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(scored_json())),
    ]);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("attempt.json");

    quizdrill()
        .arg("take")
        .arg("--quiz")
        .arg("quiz-1")
        .arg("--base-url")
        .arg(server.uri())
        .arg("--answers")
        .arg("a,b,c")
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    assert!(out.exists());
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["id"], "attempt-1");
}

#[test]
fn take_missing_quiz_fails() {
    let (_rt, server) = platform(vec![Mock::given(method("GET"))
        .and(path("/api/quizzes/nope"))
        .respond_with(ResponseTemplate::new(404))]);

    quizdrill()
        .arg("take")
        .arg("--quiz")
        .arg("nope")
        .arg("--base-url")
        .arg(server.uri())
        .arg("--answers")
        .arg("a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn results_from_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("attempt.json");
    std::fs::write(&file, scored_json().to_string()).unwrap();

    quizdrill()
        .arg("results")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("33.3%"))
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("1m 35s"));

    // A lower bar flips the label.
    quizdrill()
        .arg("results")
        .arg("--file")
        .arg(&file)
        .arg("--pass-threshold")
        .arg("30")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn results_fetches_remote_attempt() {
    let (_rt, server) = platform(vec![Mock::given(method("GET"))
        .and(path("/api/quizzes/quiz-1/attempts/attempt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scored_json()))]);

    quizdrill()
        .arg("results")
        .arg("--quiz")
        .arg("quiz-1")
        .arg("--attempt")
        .arg("attempt-1")
        .arg("--base-url")
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 correct"));
}

#[test]
fn results_requires_a_source() {
    quizdrill()
        .arg("results")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn validate_config_echoes_effective_values() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("quizdrill.toml");
    std::fs::write(
        &config,
        "base_url = \"https://campus.example.edu\"\npass_threshold = 75.0\n",
    )
    .unwrap();

    quizdrill()
        .arg("validate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("https://campus.example.edu"))
        .stdout(predicate::str::contains("75"));
}

#[test]
fn help_output() {
    quizdrill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dental-education quiz runner"));
}

#[test]
fn version_output() {
    quizdrill()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizdrill"));
}
