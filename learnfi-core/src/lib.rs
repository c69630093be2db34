//! LearnFi. On-chain educational content publishing.
//!
//! This crate contains the core primitives, traits, and types for LearnFi
//! agents: the content payload model, the typed error taxonomy for the
//! publish pipeline, and the `ContentStore` trait implemented per chain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Async traits for content stores, for use in applications
pub mod traits;

use ethers::core::types::H256;
use ethers::providers::ProviderError;
use serde::{Deserialize, Serialize};

use crate::traits::TxOutcome;

/// Media format of a piece of content. Stored on chain as a `uint8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// Short-form video
    Video,
    /// Written article
    Article,
    /// Interactive quiz
    Quiz,
}

impl ContentType {
    /// The on-chain encoding of this content type
    pub fn as_u8(self) -> u8 {
        match self {
            ContentType::Video => 0,
            ContentType::Article => 1,
            ContentType::Quiz => 2,
        }
    }
}

/// A content payload bound for the on-chain registry. Produced fresh per
/// topic, immutable once built, discarded after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    /// Storage reference for the content body (an IPFS hash in production)
    pub content_hash: String,
    /// Media format
    pub content_type: ContentType,
    /// Discovery tags, in submission order
    pub tags: Vec<String>,
}

impl ContentPayload {
    /// Check the registry's preconditions. The builder calls this before
    /// touching the chain, so a bad payload never reaches the signer.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.content_hash.is_empty() {
            return Err(PublishError::InvalidPayload(
                "empty content hash".to_owned(),
            ));
        }
        if self.tags.is_empty() {
            return Err(PublishError::InvalidPayload("no tags".to_owned()));
        }
        Ok(())
    }
}

/// PublishError contains the errors a payload can hit on its way from
/// generation to a confirmed receipt
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The payload violates a registry precondition. Not retried.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// The content generator could not produce a payload for the topic
    #[error("Content generation failed: {0}")]
    GenerationFailed(String),
    /// The key could not sign, or does not match the transaction sender.
    /// Fatal for the whole run: every later signature would fail the same way.
    #[error("Signing failed: {0}")]
    SigningError(String),
    /// The network rejected the transaction at broadcast (nonce too low,
    /// insufficient funds, ...). Not automatically retried.
    #[error("Transaction rejected by the network: {0}")]
    SubmissionRejected(String),
    /// No receipt appeared within the confirmation window. The transaction
    /// may still land later; re-query with `ContentStore::status` rather
    /// than resubmitting, which would risk a double-send.
    #[error("No receipt for transaction {0:?} within the confirmation window")]
    ConfirmationTimeout(H256),
    /// Provider Error
    #[error("{0}")]
    ProviderError(#[from] ProviderError),
    /// ABI Error
    #[error("{0}")]
    AbiError(#[from] ethers::core::abi::Error),
}

impl PublishError {
    /// True if the error indicates a misconfiguration that dooms every
    /// remaining topic
    pub fn is_fatal(&self) -> bool {
        matches!(self, PublishError::SigningError(_))
    }

    /// Tag this error with the pipeline stage where it arose
    pub fn at(self, stage: Stage) -> StagedError {
        StagedError {
            stage,
            source: self,
        }
    }
}

/// A stage of the publish pipeline. Each topic moves through the stages in
/// order; failure at any stage is terminal for that topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Producing a payload from a topic
    Generate,
    /// Building the unsigned registry call
    Build,
    /// Signing the transaction
    Sign,
    /// Broadcasting and waiting for a receipt
    Submit,
}

/// A `PublishError` tagged with the stage where it arose
#[derive(Debug, thiserror::Error)]
#[error("{stage:?} stage failed: {source}")]
pub struct StagedError {
    /// The pipeline stage
    pub stage: Stage,
    /// The underlying error
    #[source]
    pub source: PublishError,
}

/// Terminal state of one topic's trip through the pipeline
#[derive(Debug)]
pub enum TopicOutcome {
    /// The registry call was confirmed on chain
    Published(TxOutcome),
    /// The topic failed at some stage and was not retried
    Failed(StagedError),
}

/// The per-topic record produced by the run loop, in input order
#[derive(Debug)]
pub struct TopicReport {
    /// The topic this report is for
    pub topic: String,
    /// What happened to it
    pub outcome: TopicOutcome,
}
