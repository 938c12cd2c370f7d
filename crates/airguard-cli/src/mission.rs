//! Mission files: a saved flight path plus drone configuration.
//!
//! Missions are plain JSON of the engine's stable records, so they remain
//! readable by external export tooling.

use airguard_core::models::{Coordinate, DroneConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    #[serde(default)]
    pub name: String,
    pub path: Vec<Coordinate>,
    #[serde(default)]
    pub drone: DroneConfig,
}

impl Mission {
    pub fn load(file: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read(file)
            .with_context(|| format!("reading mission file {}", file.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing mission file {}", file.display()))
    }

    pub fn save(&self, file: &Path) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(file, json)
            .with_context(|| format!("writing mission file {}", file.display()))
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing mission")
    }
}
