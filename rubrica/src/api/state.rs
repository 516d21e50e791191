use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::llm::LlmProvider;
use crate::services::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: LlmProvider,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let llm = LlmProvider::new(&config.provider)?;
        let notifier = Notifier::new(&config.notify)?;

        Ok(Self {
            config: Arc::new(config),
            llm,
            notifier,
        })
    }
}
