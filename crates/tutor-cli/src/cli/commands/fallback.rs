//! `tutor fallback <topic>` – print curated questions without contacting the service.

use anyhow::Result;
use tutor_core::config::TutorConfig;
use tutor_core::fallback;

use super::render;

pub fn run_fallback(cfg: &TutorConfig, topic: &str, count: usize, json: bool) -> Result<()> {
    let catalog = fallback::load_catalog(cfg.catalog_path.as_deref())?;
    let items = catalog.generate(topic, count)?;
    if json {
        render::print_json(&items)?;
    } else {
        render::print_items(topic, &items);
    }
    Ok(())
}
