use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;

use learnfi_core::traits::ContentStore;

use crate::settings::Settings;

/// Properties shared across all agents
#[derive(Debug, Clone)]
pub struct AgentCore {
    /// A handle to the content store the agent publishes into
    pub store: Arc<dyn ContentStore>,
}

/// A trait for applications that publish to a content store
#[async_trait]
pub trait LearnFiAgent: AsRef<AgentCore> + Send + Sync + std::fmt::Debug {
    /// The settings object for this agent
    type Settings: AsRef<Settings>;

    /// Instantiate the agent from the standard settings object
    async fn from_settings(settings: Self::Settings) -> Result<Self>
    where
        Self: Sized;

    /// Return a handle to the content store
    fn store(&self) -> Arc<dyn ContentStore> {
        self.as_ref().store.clone()
    }

    /// Run the agent to completion
    async fn run(&self) -> Result<()>;
}
