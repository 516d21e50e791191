//! The three-step rubric authoring workflow.
//!
//! [`Workflow`] is an IO-free state machine. Network calls happen between
//! `begin_*` and [`Workflow::complete_generation`], either driven by the
//! caller or through the `*_with` helpers and a [`RubricGenerator`].

mod export;
mod parse;
mod state;

pub use export::{level_label, render_rubric, RubricExport, LEVEL_LETTERS};
pub use parse::{extract_json_object, parse_rubric, PARSE_FAILURE_MESSAGE};
pub use state::{GenerationKind, Step, Workflow, CLIENT_MAX_TOKENS};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GeneratedContent, GenerationRequest};

/// Anything that can answer a generation request with the canonical envelope.
///
/// Implemented by [`crate::client::ProxyClient`] for a running prompt proxy.
#[async_trait]
pub trait RubricGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent>;
}
