mod anthropic;
mod openai;
pub mod prompts;
mod provider;
mod reply;

pub use anthropic::{AnthropicContent, AnthropicMessage, ANTHROPIC_VERSION};
pub use openai::{ChatChoice, ChatCompletion, ChatMessage};
pub use provider::LlmProvider;
pub use reply::ProviderReply;
