pub mod env_utils;
pub mod logging;
pub mod replay;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use drea::config::available_attributes;
use drea::decode_event;
use drea::InMemoryTargets;

use logging::Logger;

pub fn run_decode(logger: &mut Logger, payload: &str) -> Result<()> {
    let event = decode_event(payload).with_context(|| format!("cannot decode '{payload}'"))?;
    logger.info(serde_json::to_string(&event)?);
    Ok(())
}

pub fn run_attributes(logger: &mut Logger, targets_path: &Path, target_id: &str) -> Result<()> {
    let targets = InMemoryTargets::from_path(targets_path)?;
    let target = targets
        .get(target_id)
        .ok_or_else(|| anyhow!("{target_id} is not in {}", targets_path.display()))?;

    let attributes = available_attributes(target);
    if attributes.is_empty() {
        logger.warn(format!("{target_id} exposes no adjustable attributes"));
    }
    for attribute in attributes {
        logger.info(attribute.as_str());
    }
    Ok(())
}
