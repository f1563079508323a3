use flashcards::{Accent, Deck};
use leptos::prelude::*;

use crate::{
    cards, known,
    state::{Dialog, use_app},
};

#[component]
pub fn Toolbar() -> impl IntoView {
    let state = use_app();
    let words_shown = move || state.prefs.with(|p| p.visibility.words);
    let translations_shown = move || state.prefs.with(|p| p.visibility.translations);
    let shuffled = move || state.deck.with(Deck::is_shuffled);
    let accent = move || state.prefs.with(|p| p.accent);

    view! {
        <div class="flex flex-wrap items-center gap-2" role="toolbar" aria-label="card controls">
            <div class="join">
                <button
                    type="button"
                    class="btn btn-sm join-item"
                    class=("btn-active", words_shown)
                    aria-pressed=move || words_shown().to_string()
                    on:click=move |_| state.set_prefs.update(|p| p.visibility.toggle_words())
                >
                    words
                </button>
                <button
                    type="button"
                    class="btn btn-sm join-item"
                    class=("btn-active", translations_shown)
                    aria-pressed=move || translations_shown().to_string()
                    on:click=move |_| state.set_prefs.update(|p| p.visibility.toggle_translations())
                >
                    translations
                </button>
            </div>

            <div class="join">
                <button type="button" class="btn btn-sm join-item" on:click=move |_| cards::shuffle(state)>
                    shuffle
                </button>
                <button
                    type="button"
                    class="btn btn-sm join-item"
                    disabled=move || !shuffled()
                    on:click=move |_| cards::restore(state)
                >
                    restore order
                </button>
            </div>

            <div class="join">
                <button type="button" class="btn btn-sm btn-warning btn-outline join-item" on:click=move |_| known::reset_page(state)>
                    reset page
                </button>
                <button type="button" class="btn btn-sm btn-error btn-outline join-item" on:click=move |_| known::reset_all(state)>
                    reset all
                </button>
            </div>

            <select
                class="select select-sm w-20"
                aria-label="accent"
                on:change:target=move |e| {
                    if let Some(accent) = Accent::from_label(&e.target().value()) {
                        state.set_prefs.update(|p| p.accent = accent);
                    }
                }
            >
                {Accent::ALL
                    .into_iter()
                    .map(|option| view! {
                        <option value=option.label() selected=move || accent() == option>
                            {option.label()}
                        </option>
                    })
                    .collect_view()}
            </select>

            <div class="join ml-auto">
                <button type="button" class="btn btn-sm join-item" on:click=move |_| state.open(Dialog::Stats)>
                    stats
                </button>
                <button type="button" class="btn btn-sm join-item" on:click=move |_| state.open(Dialog::Help)>
                    help
                </button>
            </div>
        </div>
    }
}
