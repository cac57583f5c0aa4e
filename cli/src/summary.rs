use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gemrush::Session;
use gemrush::grid::Gem;
use gemrush::playtest::PlaytestReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: Gem,
    pub level: u32,
    pub experience: u64,
}

/// Outcome of one headless `simulate` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub moves: u32,
    pub idle_ticks: u32,
    pub rejected_moves: u32,
    pub longest_chain: usize,
    pub score: u64,
    pub total_level_ups: u64,
    pub global_multiplier: u64,
    pub kinds: Vec<KindSummary>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(session: &Session, report: &PlaytestReport, finished_at: DateTime<Utc>) -> Self {
        let progression = session.progression();
        Self {
            seed: session.seed(),
            moves: report.moves,
            idle_ticks: report.idle_ticks,
            rejected_moves: report.rejected_moves,
            longest_chain: report.longest_chain,
            score: session.score(),
            total_level_ups: progression.total_level_ups(),
            global_multiplier: progression.global_multiplier(),
            kinds: Gem::ALL
                .iter()
                .map(|&kind| KindSummary {
                    kind,
                    level: progression.level(kind),
                    experience: progression.experience(kind),
                })
                .collect(),
            finished_at,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
