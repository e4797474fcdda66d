//! Extra catalog topics loaded from a TOML file.
//!
//! ```toml
//! [[topic]]
//! name = "radicals"
//!
//! [[topic.items]]
//! question = "Simplify: √50"
//! correct = "B"
//! explanation = "√50 = √(25·2) = 5√2."
//! options = { A = "25√2", B = "5√2", C = "10√5", D = "2√5" }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::catalog::FallbackCatalog;
use crate::quiz::QuizItem;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "topic")]
    topics: Vec<TopicEntry>,
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    name: String,
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    question: String,
    options: BTreeMap<String, String>,
    correct: String,
    explanation: String,
}

impl FallbackCatalog {
    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(data).context("parse catalog TOML")?;
        let entries = file.topics.into_iter().map(|t| {
            let items = t
                .items
                .into_iter()
                .map(|i| QuizItem {
                    question: i.question,
                    options: i.options,
                    correct: i.correct,
                    explanation: i.explanation,
                    topic: String::new(),
                })
                .collect();
            (t.name, items)
        });
        Ok(FallbackCatalog::new(entries)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("load catalog {}", path.display()))
    }
}

/// Built-in catalog, with topics from `extra_path` (if any) layered on top.
pub fn load_catalog(extra_path: Option<&Path>) -> Result<FallbackCatalog> {
    let builtin = FallbackCatalog::builtin().context("built-in fallback catalog")?;
    match extra_path {
        Some(path) => {
            let extra = FallbackCatalog::load_from_path(path)?;
            tracing::info!(
                path = %path.display(),
                topics = extra.topics().count(),
                "loaded extra fallback topics"
            );
            Ok(builtin.merged(extra))
        }
        None => Ok(builtin),
    }
}
