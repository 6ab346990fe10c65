use memoro_core::GameConfig;
use serde::Deserialize;

const EMBEDDED: &str = include_str!("../memoro.toml");

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AudioConfig {
    /// Directory holding `click.mp3`, `error.mp3`, `win.mp3` and `lose.mp3`.
    pub sounds_base: String,
    pub volume: f64,
    /// Per-card cry; `{name}` is replaced by the lowercase card name.
    pub card_cue_url: String,
    /// Playback rate of a card cry played on defeat.
    pub defeat_rate: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sounds_base: "/sounds".to_string(),
            volume: 0.4,
            card_cue_url: "https://play.pokemonshowdown.com/audio/cries/{name}.mp3".to_string(),
            defeat_rate: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct WebConfig {
    pub tick_ms: u32,
    pub game: GameConfig,
    pub audio: AudioConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            game: GameConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl WebConfig {
    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Settings bundled with the page; a broken file falls back to defaults.
    pub(crate) fn load() -> Self {
        Self::parse(EMBEDDED).unwrap_or_else(|err| {
            log::error!("bundled config is invalid, using defaults: {}", err);
            Self::default()
        })
    }
}
