//! Rubric authoring assistant: a prompt proxy with a usage notifier, and the
//! three-step rubric workflow that drives it.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod services;
pub mod workflow;
