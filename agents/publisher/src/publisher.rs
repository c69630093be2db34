use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use tracing::{error, info, instrument};

use learnfi_base::{
    agent::{AgentCore, LearnFiAgent},
    decl_agent,
};
use learnfi_core::{ContentPayload, ContentType, PublishError, Stage, TopicOutcome, TopicReport};

use crate::settings::PublisherSettings as Settings;

decl_agent!(
    /// A publisher that walks an ordered topic list and registers generated
    /// content on chain, one topic at a time
    Publisher {
        topics: Vec<String>,
        generator: ContentGenerator,
    }
);

impl Publisher {
    /// Instantiate a new publisher
    pub fn new(topics: Vec<String>, generator: ContentGenerator, core: AgentCore) -> Self {
        Self {
            topics,
            generator,
            core,
        }
    }

    /// Drive one topic through generate, build, sign, submit
    async fn process(&self, topic: &str) -> TopicOutcome {
        let payload = match self.generator.generate(topic) {
            Ok(payload) => payload,
            Err(e) => return TopicOutcome::Failed(e.at(Stage::Generate)),
        };
        info!(topic, content_hash = %payload.content_hash, "Generated content");

        match self.store().publish(&payload).await {
            Ok(outcome) => TopicOutcome::Published(outcome),
            Err(e) => TopicOutcome::Failed(e),
        }
    }

    /// Process every topic in order, producing exactly one report per topic.
    ///
    /// A failed topic is recorded and never blocks the topics after it,
    /// with one exception: a signing failure means the key is misconfigured
    /// and every later signature would fail too, so the run aborts.
    pub async fn run_queue(&self) -> Result<Vec<TopicReport>> {
        let mut reports = Vec::with_capacity(self.topics.len());

        for topic in &self.topics {
            let outcome = self.process(topic).await;

            match &outcome {
                TopicOutcome::Published(tx) => {
                    info!(
                        topic = topic.as_str(),
                        txid = ?tx.txid,
                        block = ?tx.block_number,
                        "Published content"
                    );
                }
                TopicOutcome::Failed(e) => {
                    error!(
                        topic = topic.as_str(),
                        stage = ?e.stage,
                        "Failed to publish: {}",
                        e.source
                    );
                    if e.source.is_fatal() {
                        return Err(eyre!("Aborting run: {}", e));
                    }
                }
            }

            reports.push(TopicReport {
                topic: topic.clone(),
                outcome,
            });
        }

        Ok(reports)
    }
}

#[async_trait]
impl LearnFiAgent for Publisher {
    type Settings = Settings;

    async fn from_settings(settings: Settings) -> Result<Self> {
        let core = settings.as_ref().try_into_core().await?;
        Ok(Self::new(
            settings.topics,
            settings.content_gen.into(),
            core,
        ))
    }

    #[instrument]
    async fn run(&self) -> Result<()> {
        let reports = self.run_queue().await?;

        let failed = reports
            .iter()
            .filter(|r| matches!(r.outcome, TopicOutcome::Failed(_)))
            .count();
        if failed > 0 {
            return Err(eyre!(
                "{} of {} topics failed to publish",
                failed,
                reports.len()
            ));
        }
        Ok(())
    }
}

/// Generators for content payloads
#[derive(Debug)]
pub enum ContentGenerator {
    /// The same payload for every topic
    Static {
        /// Storage reference to reuse
        content_hash: String,
        /// Media format to claim
        content_type: ContentType,
        /// Tags to attach
        tags: Vec<String>,
    },
    /// One content hash per topic, consumed in order. Running out of
    /// entries is a generation failure for the remaining topics.
    OrderedList {
        /// The prepared hashes
        hashes: Vec<String>,
        /// Next entry to hand out
        counter: AtomicUsize,
    },
    /// Placeholder filler until a real generation backend is wired in
    Default,
}

impl Default for ContentGenerator {
    fn default() -> Self {
        Self::Default
    }
}

impl ContentGenerator {
    /// Produce a payload for a topic
    pub fn generate(&self, topic: &str) -> Result<ContentPayload, PublishError> {
        match self {
            ContentGenerator::Static {
                content_hash,
                content_type,
                tags,
            } => Ok(ContentPayload {
                content_hash: content_hash.clone(),
                content_type: *content_type,
                tags: tags.clone(),
            }),
            ContentGenerator::OrderedList { hashes, counter } => {
                let index = counter.fetch_add(1, Ordering::Relaxed);
                let content_hash = hashes.get(index).cloned().ok_or_else(|| {
                    PublishError::GenerationFailed(format!("no content prepared for {}", topic))
                })?;
                Ok(ContentPayload {
                    content_hash,
                    content_type: ContentType::Video,
                    tags: default_tags(topic),
                })
            }
            // A real backend would upload the content body somewhere
            // addressable and return its hash
            ContentGenerator::Default => Ok(ContentPayload {
                content_hash: format!("learnfi-placeholder:{}", slug(topic)),
                content_type: ContentType::Video,
                tags: default_tags(topic),
            }),
        }
    }
}

fn default_tags(topic: &str) -> Vec<String> {
    vec!["education".to_owned(), topic.to_lowercase()]
}

fn slug(topic: &str) -> String {
    topic.to_lowercase().replace(' ', "-")
}
