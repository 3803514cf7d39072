//! quizdrill-core — The quiz-attempt engine.
//!
//! This crate defines the quiz data model, the attempt state machine, the
//! countdown timer, the session orchestrator, and the result shaping that
//! the rest of quizdrill builds on.

pub mod attempt;
pub mod error;
pub mod model;
pub mod results;
pub mod session;
pub mod timer;
pub mod traits;
