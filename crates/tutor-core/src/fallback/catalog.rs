use std::collections::BTreeMap;

use crate::quiz::{ItemError, QuizItem};

/// Catalog definitions that break the item invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog topic name is empty")]
    EmptyTopicName,
    #[error("catalog topic {0:?} has no items")]
    EmptyTopic(String),
    #[error("catalog topic {topic:?} item {index}: {source}")]
    InvalidItem {
        topic: String,
        index: usize,
        #[source]
        source: ItemError,
    },
}

/// No curated content exists for the topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no fallback content for topic {topic:?}")]
pub struct FallbackUnavailable {
    pub topic: String,
}

/// Curated, pre-validated practice items keyed by topic.
///
/// Validated once at construction and never mutated afterwards, so a shared
/// `Arc<FallbackCatalog>` can be read from any number of tasks.
#[derive(Debug, Clone, Default)]
pub struct FallbackCatalog {
    topics: BTreeMap<String, Vec<QuizItem>>,
}

impl FallbackCatalog {
    /// Builds a catalog, checking every item. Each item's `topic` is set to its key.
    pub fn new<I>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (String, Vec<QuizItem>)>,
    {
        let mut topics = BTreeMap::new();
        for (topic, mut items) in entries {
            if topic.trim().is_empty() {
                return Err(CatalogError::EmptyTopicName);
            }
            if items.is_empty() {
                return Err(CatalogError::EmptyTopic(topic));
            }
            for (index, item) in items.iter_mut().enumerate() {
                item.validate().map_err(|source| CatalogError::InvalidItem {
                    topic: topic.clone(),
                    index,
                    source,
                })?;
                item.topic = topic.clone();
            }
            topics.insert(topic, items);
        }
        Ok(Self { topics })
    }

    /// The curated algebra catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(super::builtin::entries())
    }

    /// Topics in `other` replace same-named topics in `self`.
    pub fn merged(mut self, other: FallbackCatalog) -> Self {
        self.topics.extend(other.topics);
        self
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Topic names with their authored item counts, sorted by name.
    pub fn topics(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.topics.iter().map(|(k, v)| (k.as_str(), v.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Returns `count` items for `topic`, cycling the authored sequence from the
    /// start when `count` exceeds it. Deterministic for a given topic and count.
    pub fn generate(&self, topic: &str, count: usize) -> Result<Vec<QuizItem>, FallbackUnavailable> {
        let items = self.topics.get(topic).ok_or_else(|| FallbackUnavailable {
            topic: topic.to_string(),
        })?;
        tracing::debug!(topic, count, authored = items.len(), "generating fallback items");
        Ok(items.iter().cycle().take(count).cloned().collect())
    }
}
