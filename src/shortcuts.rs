use flashcards::{
    Nav,
    shortcuts::{KeyPress, Shortcut},
};
use leptos::{html::Input, prelude::*};
use web_sys::wasm_bindgen::JsCast;

use crate::{cards, known, pager, state::AppState};

fn is_typing(e: &web_sys::KeyboardEvent) -> bool {
    e.target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

/// Global keyboard shortcuts, active for as long as the calling component.
pub fn install(state: AppState, search_input: NodeRef<Input>) {
    let handle = window_event_listener(leptos::ev::keydown, move |e| {
        let key = e.key();
        let press = KeyPress {
            key: &key,
            ctrl: e.ctrl_key(),
            meta: e.meta_key(),
            shift: e.shift_key(),
            typing: is_typing(&e),
        };
        let Some(shortcut) = Shortcut::from_key(press) else {
            return;
        };
        e.prevent_default();
        tracing::debug!(?shortcut, "shortcut");

        match shortcut {
            Shortcut::PrevPage => pager::go(state, Nav::Prev),
            Shortcut::NextPage => pager::go(state, Nav::Next),
            Shortcut::FocusSearch => {
                if let Some(input) = search_input.get_untracked() {
                    if let Err(e) = input.focus() {
                        tracing::debug!(error = ?e, "could not focus the search box");
                    }
                }
            }
            Shortcut::ToggleWords => state
                .set_prefs
                .update(|prefs| prefs.visibility.toggle_words()),
            Shortcut::ToggleTranslations => state
                .set_prefs
                .update(|prefs| prefs.visibility.toggle_translations()),
            Shortcut::Shuffle => cards::shuffle(state),
            Shortcut::ResetKnown => known::reset_page(state),
            Shortcut::CloseOverlays => state.close_overlays(),
        }
    });
    on_cleanup(move || handle.remove());
}
