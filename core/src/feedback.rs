use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Click,
    Success,
    Error,
    Win,
    Lose,
}

impl Cue {
    pub const ALL: [Self; 5] = [Self::Click, Self::Success, Self::Error, Self::Win, Self::Lose];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Success => "success",
            Self::Error => "error",
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }

    /// Cue to try once when this one cannot be played.
    pub const fn fallback(self) -> Option<Self> {
        match self {
            Self::Win | Self::Lose | Self::Error => Some(Self::Click),
            Self::Click | Self::Success => None,
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// External sound-effect playback. Fire-and-forget: the game never waits on
/// a cue and never lets a failed one change its state.
pub trait FeedbackSink {
    fn play_cue(&mut self, cue: Cue) -> core::result::Result<(), FeedbackError>;

    /// Card-specific cue. Sinks that fetch these lazily usually play the
    /// generic [`Cue::Success`] or [`Cue::Error`] sound first.
    fn play_card_cue(
        &mut self,
        card_name: &str,
        is_defeat: bool,
    ) -> core::result::Result<(), FeedbackError>;

    /// Called for every card of a freshly installed board, muted or not.
    fn preload_card_cue(&mut self, _card_name: &str) {}
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play_cue(&mut self, _: Cue) -> core::result::Result<(), FeedbackError> {
        Ok(())
    }

    fn play_card_cue(&mut self, _: &str, _: bool) -> core::result::Result<(), FeedbackError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackEvent {
    Cue(Cue),
    CardCue { name: String, defeat: bool },
}

/// Keeps every dispatched cue in order; cues listed in `failing` report an
/// error after being recorded.
#[derive(Clone, Debug, Default)]
pub struct RecordingFeedback {
    pub events: Vec<FeedbackEvent>,
    pub failing: Vec<Cue>,
    pub preloaded: Vec<String>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> impl Iterator<Item = Cue> + '_ {
        self.events.iter().filter_map(|event| match event {
            FeedbackEvent::Cue(cue) => Some(*cue),
            FeedbackEvent::CardCue { .. } => None,
        })
    }
}

impl FeedbackSink for RecordingFeedback {
    fn play_cue(&mut self, cue: Cue) -> core::result::Result<(), FeedbackError> {
        self.events.push(FeedbackEvent::Cue(cue));
        if self.failing.contains(&cue) {
            Err(FeedbackError::Playback(cue.name().to_string()))
        } else {
            Ok(())
        }
    }

    fn play_card_cue(
        &mut self,
        card_name: &str,
        is_defeat: bool,
    ) -> core::result::Result<(), FeedbackError> {
        self.events.push(FeedbackEvent::CardCue {
            name: card_name.to_string(),
            defeat: is_defeat,
        });
        Ok(())
    }

    fn preload_card_cue(&mut self, card_name: &str) {
        self.preloaded.push(card_name.to_string());
    }
}

/// Sink wrapper owning the mute switch and the failure policy.
#[derive(Debug)]
pub(crate) struct Feedback<F> {
    sink: F,
    muted: bool,
}

impl<F: FeedbackSink> Feedback<F> {
    pub(crate) fn new(sink: F, muted: bool) -> Self {
        Self { sink, muted }
    }

    pub(crate) fn sink(&self) -> &F {
        &self.sink
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub(crate) fn cue(&mut self, cue: Cue) {
        if self.muted {
            return;
        }
        if let Err(err) = self.sink.play_cue(cue) {
            log::warn!("cue {} failed: {}", cue, err);
            if let Some(fallback) = cue.fallback() {
                if let Err(err) = self.sink.play_cue(fallback) {
                    log::warn!("fallback cue {} failed: {}", fallback, err);
                }
            }
        }
    }

    pub(crate) fn preload_card_cue(&mut self, card_name: &str) {
        self.sink.preload_card_cue(card_name);
    }

    pub(crate) fn card_cue(&mut self, card_name: &str, is_defeat: bool) {
        if self.muted {
            return;
        }
        if let Err(err) = self.sink.play_card_cue(card_name, is_defeat) {
            log::warn!("card cue for {} failed: {}", card_name, err);
        }
    }
}
