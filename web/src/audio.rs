use std::collections::HashMap;

use memoro_core::{Cue, FeedbackError, FeedbackSink};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::config::AudioConfig;

const fn cue_file(cue: Cue) -> &'static str {
    match cue {
        Cue::Click | Cue::Success => "click",
        Cue::Error => "error",
        Cue::Win => "win",
        Cue::Lose => "lose",
    }
}

/// Generic sound played right away for a card cue.
const fn card_cue_lead(is_defeat: bool) -> Cue {
    if is_defeat { Cue::Error } else { Cue::Success }
}

type CryKey = (String, bool);

fn cry_key(card_name: &str, is_defeat: bool) -> CryKey {
    (card_name.to_lowercase(), is_defeat)
}

/// Plays cues through `<audio>` elements.
///
/// Card cries are fetched in the background: the first time a card is heard
/// only its lead cue plays, later clicks also get the cry.
pub(crate) struct AudioFeedback {
    config: AudioConfig,
    cues: HashMap<Cue, HtmlAudioElement>,
    cries: HashMap<CryKey, HtmlAudioElement>,
}

impl AudioFeedback {
    pub(crate) fn new(config: AudioConfig) -> Self {
        let mut cues = HashMap::new();
        for cue in Cue::ALL {
            let src = format!("{}/{}.mp3", config.sounds_base, cue_file(cue));
            match HtmlAudioElement::new_with_src(&src) {
                Ok(audio) => {
                    audio.set_volume(config.volume);
                    audio.load();
                    cues.insert(cue, audio);
                }
                Err(err) => log::warn!("could not load cue {}: {:?}", cue, err),
            }
        }

        Self {
            config,
            cues,
            cries: HashMap::new(),
        }
    }

    /// Element to play when `cue`'s own playback gets rejected.
    fn fallback_for(&self, cue: Cue) -> Option<HtmlAudioElement> {
        cue.fallback().and_then(|fallback| self.cues.get(&fallback)).cloned()
    }

    fn load_cry(&mut self, card_name: &str, is_defeat: bool) -> Result<(), FeedbackError> {
        let key = cry_key(card_name, is_defeat);
        if self.cries.contains_key(&key) {
            return Ok(());
        }

        let src = self.config.card_cue_url.replace("{name}", &key.0);
        let audio = HtmlAudioElement::new_with_src(&src)
            .map_err(|err| FeedbackError::Missing(format!("{src}: {err:?}")))?;
        if is_defeat {
            audio.set_playback_rate(self.config.defeat_rate);
            audio.set_volume(self.config.volume * self.config.defeat_rate);
        } else {
            audio.set_volume(self.config.volume);
        }
        audio.load();
        log::trace!("loading cry {}", src);
        self.cries.insert(key, audio);
        Ok(())
    }
}

/// Restarts `audio`. Browsers report most failures through the rejected
/// play promise, so the fallback is played from there.
fn start(audio: &HtmlAudioElement, label: String, fallback: Option<HtmlAudioElement>) -> Result<(), FeedbackError> {
    audio.set_current_time(0.0);
    let promise = audio
        .play()
        .map_err(|err| FeedbackError::Playback(format!("{label}: {err:?}")))?;
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            log::warn!("{} did not play: {:?}", label, err);
            let Some(fallback) = fallback else {
                return;
            };
            fallback.set_current_time(0.0);
            let played = match fallback.play() {
                Ok(promise) => JsFuture::from(promise).await.map(drop),
                Err(err) => Err(err),
            };
            if let Err(err) = played {
                log::warn!("fallback for {} did not play: {:?}", label, err);
            }
        }
    });
    Ok(())
}

impl FeedbackSink for AudioFeedback {
    fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError> {
        let audio = self
            .cues
            .get(&cue)
            .ok_or_else(|| FeedbackError::Missing(cue.name().to_string()))?;
        start(audio, cue.name().to_string(), self.fallback_for(cue))
    }

    fn play_card_cue(&mut self, card_name: &str, is_defeat: bool) -> Result<(), FeedbackError> {
        let lead = card_cue_lead(is_defeat);
        if let Some(audio) = self.cues.get(&lead) {
            if let Err(err) = start(audio, lead.name().to_string(), None) {
                log::warn!("{}", err);
            }
        }

        match self.cries.get(&cry_key(card_name, is_defeat)) {
            Some(cry) => start(cry, format!("cry of {card_name}"), None),
            None => self.load_cry(card_name, is_defeat),
        }
    }

    fn preload_card_cue(&mut self, card_name: &str) {
        if let Err(err) = self.load_cry(card_name, false) {
            log::warn!("could not preload cry of {}: {}", card_name, err);
        }
    }
}
