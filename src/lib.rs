//! caflow — rule-based template recommendation and email generation for
//! career advisor support.
//!
//! The pipeline has three deterministic stages (status graph, template
//! catalog, recommender) and two model-backed ones (generation, parsing).
//! The model-backed stages degrade to deterministic fallbacks when the
//! backend misbehaves, so the pipeline as a whole never fails.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod ollama;
pub mod parser;
pub mod recommend;
pub mod ui;
pub mod workflow;
