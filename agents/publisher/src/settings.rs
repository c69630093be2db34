//! Configuration

use std::sync::atomic::AtomicUsize;

use learnfi_core::ContentType;

use crate::publisher::ContentGenerator;

use learnfi_base::decl_settings;

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentGenConfig {
    Static {
        content_hash: String,
        content_type: ContentType,
        tags: Vec<String>,
    },
    OrderedList {
        hashes: Vec<String>,
    },
    #[serde(other)]
    Default,
}

impl Default for ContentGenConfig {
    fn default() -> Self {
        Self::Default
    }
}

#[allow(clippy::from_over_into)]
impl Into<ContentGenerator> for ContentGenConfig {
    fn into(self) -> ContentGenerator {
        match self {
            Self::Static {
                content_hash,
                content_type,
                tags,
            } => ContentGenerator::Static {
                content_hash,
                content_type,
                tags,
            },
            Self::OrderedList { hashes } => ContentGenerator::OrderedList {
                hashes,
                counter: AtomicUsize::new(0),
            },
            Self::Default => ContentGenerator::Default,
        }
    }
}

decl_settings!(
    Publisher {
        topics: Vec<String>,
        #[serde(default)] content_gen: ContentGenConfig,
    }
);
