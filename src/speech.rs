use std::time::Duration;

use flashcards::speech::{SpeechAction, Utterance, select_voice};
use leptos::prelude::*;
use web_sys::{
    SpeechSynthesis, SpeechSynthesisUtterance, SpeechSynthesisVoice,
    wasm_bindgen::{JsCast, closure::Closure},
};

use crate::state::AppState;

/// Speak button of the card `key`: starts pronouncing `text`, or stops the
/// current utterance.
pub fn toggle(state: AppState, key: &str, text: &str) {
    // Engines without the API hand back `undefined` rather than an error.
    let synth = match window().speech_synthesis() {
        Ok(synth) if !synth.is_undefined() && !synth.is_null() => synth,
        _ => {
            state
                .toasts
                .error("Speech is not supported in this browser");
            return;
        }
    };
    let accent = state.prefs.with_untracked(|p| p.accent);
    let Some(action) = state.speech.try_update(|s| s.toggle(key, text, accent)) else {
        return;
    };

    match action {
        SpeechAction::Stop => synth.cancel(),
        SpeechAction::Speak {
            utterance,
            generation,
            delay_ms,
            backup_ms,
        } => {
            synth.cancel();
            set_timeout(
                move || speak(state, &synth, utterance, generation),
                Duration::from_millis(delay_ms),
            );
            set_timeout(
                move || finished(state, generation),
                Duration::from_millis(backup_ms),
            );
        }
    }
}

fn speak(state: AppState, synth: &SpeechSynthesis, utterance: Utterance, generation: u64) {
    if !state.speech.with_untracked(|s| s.is_current(generation)) {
        tracing::debug!(generation, "speech stopped before it started");
        return;
    }
    let Ok(spoken) = SpeechSynthesisUtterance::new_with_text(&utterance.text) else {
        tracing::warn!(text = %utterance.text, "could not create utterance");
        finished(state, generation);
        return;
    };
    spoken.set_lang(utterance.lang);
    spoken.set_rate(utterance.rate);
    spoken.set_pitch(utterance.pitch);
    spoken.set_volume(utterance.volume);

    let voices: Vec<SpeechSynthesisVoice> = synth
        .get_voices()
        .iter()
        .filter_map(|voice| voice.dyn_into().ok())
        .collect();
    let langs: Vec<String> = voices.iter().map(SpeechSynthesisVoice::lang).collect();
    if let Some(voice) = select_voice(langs.iter().map(String::as_str), utterance.lang)
        .and_then(|i| voices.get(i))
    {
        tracing::debug!(voice = %voice.name(), "using voice");
        spoken.set_voice(Some(voice));
    }

    let on_end = Closure::once_into_js(move || finished(state, generation));
    spoken.set_onend(Some(on_end.unchecked_ref()));
    let on_error = Closure::once_into_js(move || {
        tracing::warn!("speech synthesis error");
        finished(state, generation)
    });
    spoken.set_onerror(Some(on_error.unchecked_ref()));

    synth.speak(&spoken);
}

fn finished(state: AppState, generation: u64) {
    if state
        .speech
        .try_update(|s| s.finished(generation))
        .unwrap_or(false)
    {
        tracing::debug!(generation, "speech finished");
    }
}
