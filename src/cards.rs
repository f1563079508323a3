use std::time::Duration;

use flashcards::{Card, Deck, KnownWords, Mark, WordApi};
use leptos::prelude::*;
use word_api::tags::MarkStatus;

use crate::{
    known, speech,
    state::{AppState, Dialog, UiStoreFields, format_timestamp, use_app},
};

/// Shuffles the cards on screen with a short "shuffled" flash.
pub fn shuffle(state: AppState) {
    let shuffled = state
        .rng
        .try_update_value(|rng| state.deck.try_update(|deck| deck.shuffle(rng)))
        .flatten()
        .unwrap_or(false);
    if !shuffled {
        state.toasts.info("Not enough cards to shuffle");
        return;
    }
    state.ui.shuffled_flash().set(true);
    let flash = state.ui.shuffled_flash();
    set_timeout(move || flash.set(false), Duration::from_millis(600));
}

pub fn restore(state: AppState) {
    if state.deck.try_update(Deck::restore).unwrap_or(false) {
        state.toasts.info("Original order restored");
    }
}

#[component]
pub fn CardGrid() -> impl IntoView {
    let state = use_app();
    let layout = move || state.prefs.with(|p| p.visibility.layout_class());
    let cards = move || state.deck.with(|deck| deck.cards().to_vec());
    let empty = move || state.deck.with(Deck::is_empty) && !state.pager.with(|p| p.is_loading());

    view! {
        <section
            class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-3"
            class=("translations-only", move || layout() == Some("translations-only"))
            class=("words-only", move || layout() == Some("words-only"))
            class=("animate-pulse", move || state.ui.shuffled_flash().get())
            aria-label="word cards"
        >
            <For
                each=cards
                key=|card| (card.index, card.word.key().to_owned())
                children=move |card| view! { <WordCard card /> }
            />
        </section>
        <Show when=empty>
            <p class="text-center opacity-70">No words on this page</p>
        </Show>
    }
}

#[component]
fn WordCard(card: Card) -> impl IntoView {
    if let Err(problem) = card.check() {
        tracing::warn!(index = card.index, %problem, "malformed word record");
        return leptos::either::Either::Left(view! {
            <article class="card card-border border-error" role="alert">
                <div class="card-body">
                    <span class="badge badge-error">{format!("#{}", card.index)}</span>
                    <p>{format!("Could not show this word: {problem}")}</p>
                </div>
            </article>
        });
    }

    let state = use_app();
    let index = card.index;
    let key = StoredValue::new(card.word.key().to_owned());
    let card = StoredValue::new(card);

    let is_known = move || card.with_value(|c| state.known.with(|k| k.is_known(&c.word)));
    let is_selected = move || state.deck.with(|deck| deck.selected() == Some(index));
    let menu_open = move || state.ui.menu().get() == Some(index);
    let speaking = move || {
        key.with_value(|key| state.speech.with(|s| s.speaking() == Some(key.as_str())))
    };
    let show_words = move || state.prefs.with(|p| p.visibility.words);
    let show_translations = move || state.prefs.with(|p| p.visibility.translations);

    let speak = move |e: web_sys::MouseEvent| {
        e.stop_propagation();
        let key = key.get_value();
        card.with_value(|c| speech::toggle(state, &key, &c.word.english));
    };
    let mark = move |mark: Mark| {
        state.ui.menu().set(None);
        known::set_mark(state, card.get_value().word, mark);
    };

    leptos::either::Either::Right(view! {
        <article
            class="card card-border bg-base-100 cursor-pointer"
            class=("border-success", is_known)
            class=("ring-2", is_selected)
            class=("ring-primary", is_selected)
            title=move || card.with_value(|c| c.tooltip().to_owned())
            on:click=move |_| {
                state.deck.update(|deck| {
                    deck.select(index);
                });
            }
        >
            <div class="card-body p-4 gap-1">
                <div class="flex items-center justify-between">
                    <span class="badge badge-ghost">{index}</span>
                    <Show when=is_known>
                        <span class="badge badge-success">known</span>
                    </Show>
                </div>
                <h2 class="card-title word" class=("invisible", move || !show_words())>
                    {card.with_value(|c| c.word.english.clone())}
                </h2>
                <p class="translation" class=("invisible", move || !show_translations())>
                    {card.with_value(|c| c.word.chinese.clone())}
                </p>
                <div class="card-actions justify-end">
                    <button
                        type="button"
                        class="btn btn-sm btn-circle"
                        aria-label=move || if speaking() { "stop" } else { "pronounce" }
                        on:click=speak
                    >
                        {move || if speaking() { "■" } else { "🔊" }}
                    </button>
                    <div class="dropdown dropdown-end" class=("dropdown-open", menu_open)>
                        <button
                            type="button"
                            class="btn btn-sm btn-ghost"
                            aria-label="word actions"
                            on:click=move |e| {
                                e.stop_propagation();
                                state
                                    .ui
                                    .menu()
                                    .update(|open| {
                                        *open = if *open == Some(index) { None } else { Some(index) };
                                    });
                            }
                        >
                            "⋯"
                        </button>
                        <Show when=menu_open>
                            <ul
                                class="dropdown-content menu bg-base-200 rounded-box z-10 w-44 shadow"
                                on:click=|e| e.stop_propagation()
                            >
                                <li>
                                    <button
                                        type="button"
                                        disabled=is_known
                                        on:click=move |_| mark(Mark::Known)
                                    >
                                        "mark known"
                                    </button>
                                </li>
                                <li>
                                    <button
                                        type="button"
                                        disabled=move || !is_known()
                                        on:click=move |_| mark(Mark::Unknown)
                                    >
                                        "mark unknown"
                                    </button>
                                </li>
                                <li>
                                    <button
                                        type="button"
                                        on:click=move |_| {
                                            state.ui.menu().set(None);
                                            state.open(Dialog::Detail(index));
                                        }
                                    >
                                        "details"
                                    </button>
                                </li>
                            </ul>
                        </Show>
                    </div>
                </div>
            </div>
        </article>
    })
}

/// Shows every field of the word record that is present.
#[component]
pub fn WordDetail(index: u32) -> impl IntoView {
    let state = use_app();
    let Some(card) = state.deck.with_untracked(|deck| deck.get(index).cloned()) else {
        return leptos::either::Either::Left(view! { <p>"This word is no longer on the page."</p> });
    };

    let status = RwSignal::new(None);
    if let Some(id) = card.word.server_id().map(str::to_owned)
        && let Ok(token) = state.session.with_untracked(|s| s.bearer().map(str::to_owned))
    {
        let api = state.api.get_value();
        leptos::task::spawn_local(async move {
            match api.mark_status(&token, &id).await {
                Ok(mark) => status.set(Some(mark)),
                Err(e) => state.api_failed("Could not load the word's status", e),
            }
        });
    }

    let word = StoredValue::new(card.word.clone());
    let is_known = move || word.with_value(|w| state.known.with(|k| k.is_known(w)));
    let marked_at = move || {
        let remote = status.with(|s: &Option<MarkStatus>| {
            s.as_ref().and_then(|s| s.marked_at).filter(|at| *at > 0)
        });
        remote
            .or_else(|| word.with_value(|w| state.known.with(|k: &KnownWords| k.marked_at(w))))
            .map(format_timestamp)
    };
    let details = card
        .details()
        .into_iter()
        .map(|(label, value)| (label, value.to_owned()))
        .collect::<Vec<_>>();

    leptos::either::Either::Right(view! {
        <h3 class="text-2xl font-bold">{card.word.english.clone()}</h3>
        <p class="text-lg">{card.word.chinese.clone()}</p>
        <dl class="grid grid-cols-[auto_1fr] gap-x-4 gap-y-1 mt-4">
            {details
                .into_iter()
                .map(|(label, value)| view! {
                    <dt class="font-semibold">{label}</dt>
                    <dd>{value}</dd>
                })
                .collect_view()}
            <dt class="font-semibold">Status</dt>
            <dd>{move || if is_known() { "known" } else { "not known yet" }}</dd>
            {move || marked_at().map(|at| view! {
                <dt class="font-semibold">Marked</dt>
                <dd>{at}</dd>
            })}
        </dl>
        <div class="modal-action">
            <button
                type="button"
                class="btn"
                on:click=move |_| known::toggle_mark(state, word.get_value())
            >
                {move || if is_known() { "mark unknown" } else { "mark known" }}
            </button>
        </div>
    })
}
