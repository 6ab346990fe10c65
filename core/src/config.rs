use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Delays of the feedback sequence, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTiming {
    /// From the losing click to the card-specific defeat cue.
    pub defeat_cue_delay_ms: u32,
    /// From the defeat cue to the lose cue and the committed loss.
    pub loss_commit_delay_ms: u32,
    pub success_flash_ms: u32,
    pub error_flash_ms: u32,
}

impl FeedbackTiming {
    pub const fn defeat_cue_delay(&self) -> Duration {
        Duration::from_millis(self.defeat_cue_delay_ms as u64)
    }

    pub const fn loss_commit_delay(&self) -> Duration {
        Duration::from_millis(self.defeat_cue_delay_ms as u64 + self.loss_commit_delay_ms as u64)
    }

    pub const fn success_flash(&self) -> Duration {
        Duration::from_millis(self.success_flash_ms as u64)
    }

    pub const fn error_flash(&self) -> Duration {
        Duration::from_millis(self.error_flash_ms as u64)
    }
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            defeat_cue_delay_ms: 500,
            loss_commit_delay_ms: 1000,
            success_flash_ms: 700,
            error_flash_ms: 400,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timing: FeedbackTiming,
}
