//! `tutor topics` – list curated fallback topics.

use anyhow::Result;
use tutor_core::config::TutorConfig;
use tutor_core::fallback;
use tutor_core::quiz::topic_display;

pub fn run_topics(cfg: &TutorConfig) -> Result<()> {
    let catalog = fallback::load_catalog(cfg.catalog_path.as_deref())?;
    if catalog.is_empty() {
        println!("No fallback topics.");
        return Ok(());
    }
    println!("{:<24} {:<24} {}", "TOPIC", "NAME", "ITEMS");
    for (topic, items) in catalog.topics() {
        println!("{:<24} {:<24} {}", topic, topic_display(topic), items);
    }
    Ok(())
}
