//! # defgen
//!
//! Question answering backend scoped to Indian defence. One `POST /chat`
//! request flows through a fixed sequence of stages:
//!
//! ```text
//! message -> RelevanceFilter -> SearchBackend -> SnippetSelector -> Summarizer -> response
//!            (optional)                          (strategy)         (optional)
//! ```
//!
//! Every failure is a [`error::PipelineError`]; the HTTP layer turns it back
//! into a plain `response` string and still answers 200.

pub mod analyzer;
pub mod api;
pub mod config;
pub mod data_models;
pub mod embed;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod search;
pub mod selector;
pub mod state;
pub mod summarize;
