use serde::{Deserialize, Serialize};

use crate::grid::Gem;
use crate::session::{SessionPhase, SessionState};

/// Renderer-facing progress bar for one gem kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindView {
    pub kind: Gem,
    pub level: u32,
    pub experience: u64,
    pub experience_to_next: u64,
    pub fill_ratio: f32,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub board: Vec<Vec<Option<Gem>>>,
    pub score: u64,
    pub time_remaining_secs: u64,
    pub phase: SessionPhase,
    pub kinds: Vec<KindView>,
    pub total_level_ups: u64,
    pub global_multiplier: u64,
}

impl SessionView {
    pub fn from_state(state: &SessionState) -> Self {
        let progression = &state.progression;
        let kinds = Gem::ALL
            .iter()
            .map(|&kind| {
                let progress = progression.kind(kind);
                KindView {
                    kind,
                    level: progress.level,
                    experience: progress.experience,
                    experience_to_next: progress.experience_to_next,
                    fill_ratio: progress.fill_ratio(),
                }
            })
            .collect();

        Self {
            board: state.grid.rows().to_vec(),
            score: state.score,
            time_remaining_secs: state.time_remaining_secs(),
            phase: state.phase,
            kinds,
            total_level_ups: progression.total_level_ups(),
            global_multiplier: progression.global_multiplier(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }
}
