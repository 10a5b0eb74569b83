#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Model providers implementing the core [`ChatModel`] seam.
//!
//! [`ChatModel`]: tourdesk_core::ChatModel

mod openai;
mod retry;

pub use openai::OpenAiProvider;
pub use retry::retry_with_backoff;
