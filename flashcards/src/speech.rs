use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accent {
    #[default]
    Us,
    Uk,
}

impl Accent {
    pub const ALL: [Accent; 2] = [Accent::Us, Accent::Uk];

    pub fn locale(self) -> &'static str {
        match self {
            Accent::Us => "en-US",
            Accent::Uk => "en-GB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Accent::Us => "US",
            Accent::Uk => "UK",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label().eq_ignore_ascii_case(label))
    }
}

/// Picks a voice for `locale` from the engine's voice languages: an exact
/// match first, then one sharing the language prefix. `None` means the
/// engine default.
pub fn select_voice<'a>(langs: impl IntoIterator<Item = &'a str>, locale: &str) -> Option<usize> {
    let normalize = |lang: &str| lang.replace('_', "-").to_ascii_lowercase();
    let wanted = normalize(locale);
    let prefix = wanted.split('-').next().unwrap_or_default().to_owned();

    let mut partial = None;
    for (i, lang) in langs.into_iter().enumerate() {
        let lang = normalize(lang);
        if lang == wanted {
            return Some(i);
        }
        if partial.is_none() && lang.split('-').next() == Some(prefix.as_str()) {
            partial = Some(i);
        }
    }
    partial
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechAction {
    /// Stop whatever is playing and reset the button.
    Stop,
    /// Cancel the engine queue, wait `delay_ms`, then speak. The caller arms
    /// a backup timer of `backup_ms` that reports `generation` as finished.
    Speak {
        utterance: Utterance,
        generation: u64,
        delay_ms: u64,
        backup_ms: u64,
    },
}

/// Which word, if any, is currently being pronounced.
#[derive(Debug, Clone)]
pub struct SpeechController {
    config: SpeechConfig,
    speaking: Option<(String, u64)>,
    generation: u64,
}

impl SpeechController {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            speaking: None,
            generation: 0,
        }
    }

    pub fn speaking(&self) -> Option<&str> {
        self.speaking.as_ref().map(|(key, _)| key.as_str())
    }

    /// Speak button pressed for `key` (the card) with `text` to pronounce.
    pub fn toggle(&mut self, key: &str, text: &str, accent: Accent) -> SpeechAction {
        if self.speaking.take().is_some() {
            return SpeechAction::Stop;
        }
        self.generation += 1;
        self.speaking = Some((key.to_owned(), self.generation));
        SpeechAction::Speak {
            utterance: Utterance {
                text: text.to_owned(),
                lang: accent.locale(),
                rate: self.config.rate,
                pitch: self.config.pitch,
                volume: self.config.volume,
            },
            generation: self.generation,
            delay_ms: self.config.cancel_delay_ms,
            backup_ms: self.config.backup_timeout_ms,
        }
    }

    /// Whether `generation` is still the utterance the button shows. A
    /// delayed start checks this so a stop pressed during the delay wins.
    pub fn is_current(&self, generation: u64) -> bool {
        matches!(self.speaking, Some((_, current)) if current == generation)
    }

    /// End, error or backup timer for `generation`. Returns `true` if the
    /// button should reset; callbacks of older utterances are ignored.
    pub fn finished(&mut self, generation: u64) -> bool {
        match self.speaking {
            Some((_, current)) if current == generation => {
                self.speaking = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_selection_order() {
        let langs = ["fr-FR", "en-GB", "en_US", "en-AU"];
        assert_eq!(select_voice(langs, "en-US"), Some(2));
        assert_eq!(select_voice(langs, "en-GB"), Some(1));
        assert_eq!(select_voice(["fr-FR", "en-AU"], "en-GB"), Some(1));
        assert_eq!(select_voice(["fr-FR", "de-DE"], "en-US"), None);
        assert_eq!(select_voice([], "en-US"), None);
    }

    #[test]
    fn toggle_starts_and_stops() {
        let mut speech = SpeechController::new(SpeechConfig::default());
        let SpeechAction::Speak {
            utterance,
            generation,
            delay_ms,
            backup_ms,
        } = speech.toggle("42", "abandon", Accent::Uk)
        else {
            panic!("expected speak");
        };
        assert_eq!(utterance.lang, "en-GB");
        assert_eq!(utterance.text, "abandon");
        assert_eq!((delay_ms, backup_ms), (100, 5000));
        assert_eq!(speech.speaking(), Some("42"));

        assert_eq!(speech.toggle("42", "abandon", Accent::Uk), SpeechAction::Stop);
        assert_eq!(speech.speaking(), None);
        assert!(!speech.finished(generation));
    }

    #[test]
    fn stop_during_start_delay_retires_the_utterance() {
        let mut speech = SpeechController::new(SpeechConfig::default());
        let SpeechAction::Speak { generation, .. } = speech.toggle("42", "abandon", Accent::Us)
        else {
            panic!("expected speak");
        };
        assert!(speech.is_current(generation));

        assert_eq!(speech.toggle("42", "abandon", Accent::Us), SpeechAction::Stop);
        assert!(!speech.is_current(generation));

        let SpeechAction::Speak { generation: next, .. } = speech.toggle("42", "abandon", Accent::Us)
        else {
            panic!("expected speak");
        };
        assert!(!speech.is_current(generation));
        assert!(speech.is_current(next));
    }

    #[test]
    fn stale_callbacks_do_not_reset_newer_utterance() {
        let mut speech = SpeechController::new(SpeechConfig::default());
        let SpeechAction::Speak { generation: first, .. } = speech.toggle("1", "a", Accent::Us)
        else {
            panic!("expected speak");
        };
        speech.toggle("1", "a", Accent::Us);
        let SpeechAction::Speak { generation: second, .. } = speech.toggle("2", "b", Accent::Us)
        else {
            panic!("expected speak");
        };
        assert!(!speech.finished(first));
        assert_eq!(speech.speaking(), Some("2"));
        assert!(speech.finished(second));
        assert_eq!(speech.speaking(), None);
    }

    #[test]
    fn accent_labels() {
        assert_eq!(Accent::from_label("uk"), Some(Accent::Uk));
        assert_eq!(Accent::from_label("AU"), None);
    }
}
