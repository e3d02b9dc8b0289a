//! Homework Notifier
//!
//! Polls the homework status API for the latest review verdict and relays
//! every change to a Telegram chat.
//!
//! # Design Principles
//! - One tracked item, one loop, one sink
//! - Transient failures never stop the loop; they are reported once
//! - Identical consecutive messages are sent only once

pub mod client;
pub mod engine;
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export contracts
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{NotifierError, Result, SinkError};
