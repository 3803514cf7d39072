//! quizdrill-client — Remote quiz-platform backends.
//!
//! Implements the `QuizService` trait over the platform's HTTP API, plus a
//! scripted in-memory mock for tests and offline demos.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, ClientConfig};
pub use http::HttpQuizService;
pub use mock::MockQuizService;
