use std::time::Duration;

use flashcards::{
    SearchGate, WordApi,
    search::{SearchStart, SearchView},
};
use leptos::{html::Input, prelude::*, task::spawn_local};

use crate::state::{AppState, SearchPanel, UiStoreFields, use_app};

fn run(state: AppState, raw: &str) {
    let Some(start) = state.search.try_update(|gate| gate.begin(raw)) else {
        return;
    };
    let panel = state.ui.search();
    match start {
        SearchStart::Close => panel.set(None),
        SearchStart::Prompt => panel.set(Some(SearchPanel::Prompt)),
        SearchStart::Request(ticket) => {
            panel.set(Some(SearchPanel::Searching));
            let api = state.api.get_value();
            spawn_local(async move {
                let result = api.search(&ticket.query).await;
                if !state.search.with_untracked(|gate| gate.accepts(&ticket)) {
                    tracing::debug!(query = %ticket.query, "dropping stale search results");
                    return;
                }
                panel.set(Some(SearchPanel::Done(result.into())));
            });
        }
    }
}

#[component]
pub fn SearchBox(input_ref: NodeRef<Input>) -> impl IntoView {
    let state = use_app();
    let (query, set_query) = signal(String::new());
    let pending = StoredValue::new(None::<TimeoutHandle>);
    let debounce = Duration::from_millis(state.config.with_value(|c| c.search_debounce_ms));

    let cancel_pending = move || {
        if let Some(handle) = pending.get_value() {
            handle.clear();
        }
        pending.set_value(None);
    };
    let search_now = move || {
        cancel_pending();
        run(state, &query.get_untracked());
    };
    let close = move || {
        cancel_pending();
        set_query.set(String::new());
        state.search.update(|gate| gate.cancel());
        state.ui.search().set(None);
    };

    let on_input = move |_| {
        cancel_pending();
        let handle = set_timeout_with_handle(
            move || {
                pending.set_value(None);
                run(state, &query.get_untracked());
            },
            debounce,
        );
        match handle {
            Ok(handle) => pending.set_value(Some(handle)),
            Err(e) => tracing::warn!(error = ?e, "could not schedule search"),
        }
    };

    // Clicks outside the search area close the results.
    let area = NodeRef::<leptos::html::Div>::new();
    let outside = window_event_listener(leptos::ev::click, move |e| {
        if state.ui.search().get_untracked().is_none() {
            return;
        }
        let inside = match (area.get_untracked(), e.target()) {
            (Some(area), Some(target)) => {
                use web_sys::wasm_bindgen::JsCast;
                target
                    .dyn_ref::<web_sys::Node>()
                    .is_some_and(|node| area.contains(Some(node)))
            }
            _ => false,
        };
        if !inside {
            close();
        }
    });
    on_cleanup(move || outside.remove());

    view! {
        <div class="relative w-full max-w-md" node_ref=area>
            <div class="join w-full">
                <input
                    type="search"
                    class="input join-item w-full"
                    placeholder="Search words..."
                    aria-label="Search words"
                    node_ref=input_ref
                    bind:value=(query, set_query)
                    on:input=on_input
                    on:keydown=move |e| match e.key().as_str() {
                        "Enter" => {
                            e.prevent_default();
                            search_now();
                        }
                        "Escape" => close(),
                        _ => {}
                    }
                />
                <button type="button" class="btn join-item" on:click=move |_| search_now()>
                    search
                </button>
            </div>
            <Show when=move || state.ui.search().with(Option::is_some)>
                <div class="absolute z-20 mt-1 w-full rounded-box bg-base-200 shadow max-h-96 overflow-y-auto">
                    {move || match state.ui.search().get() {
                        Some(SearchPanel::Prompt) => view! {
                            <p class="p-3 opacity-70">{state.search.with_untracked(SearchGate::prompt)}</p>
                        }
                        .into_any(),
                        Some(SearchPanel::Searching) => view! {
                            <p class="p-3"><span class="loading loading-dots"></span></p>
                        }
                        .into_any(),
                        Some(SearchPanel::Done(SearchView::Empty)) => view! {
                            <p class="p-3 opacity-70">"No matching words"</p>
                        }
                        .into_any(),
                        Some(SearchPanel::Done(SearchView::Error(message))) => view! {
                            <p class="p-3 text-error" role="alert">{message}</p>
                        }
                        .into_any(),
                        Some(SearchPanel::Done(SearchView::Results(results))) => view! {
                            <ul class="menu w-full">
                                {results
                                    .into_iter()
                                    .map(|word| view! {
                                        <li>
                                            <button type="button" on:click=move |_| close()>
                                                <span class="font-semibold">{word.english}</span>
                                                <span class="opacity-70">{word.chinese}</span>
                                            </button>
                                        </li>
                                    })
                                    .collect_view()}
                            </ul>
                        }
                        .into_any(),
                        None => ().into_any(),
                    }}
                </div>
            </Show>
        </div>
    }
}
