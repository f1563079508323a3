use flashcards::{
    Nav, Pager, WordApi,
    pager::{LoadTicket, page_query, parse_page_param},
};
use leptos::{prelude::*, task::spawn_local};
use leptos_router::{
    NavigateOptions,
    hooks::{use_navigate, use_query_map},
};

use crate::{
    known,
    state::{AppState, UiStoreFields, use_app},
};

/// Router navigation that event handlers and async tasks can hold on to.
#[derive(Clone, Copy)]
pub struct Navigator(StoredValue<Box<dyn Fn(&str, NavigateOptions)>, LocalStorage>);

impl Navigator {
    /// Must be called below the `<Router>`.
    pub fn new() -> Self {
        let navigate = use_navigate();
        Self(StoredValue::new_local(Box::new(navigate)))
    }

    fn push(&self, href: &str) {
        self.0
            .with_value(|navigate| navigate(href, NavigateOptions::default()));
    }

    fn replace(&self, href: &str) {
        self.0.with_value(|navigate| {
            navigate(
                href,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            )
        });
    }
}

fn href(page: u32, page_size: u32) -> String {
    format!("/{}", page_query(page, page_size))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum History {
    /// User navigation: record the page in the history once it loaded.
    Push,
    /// The URL already names the page (first visit, back/forward).
    Follow,
}

/// Loads whatever page the URL query names. Runs on startup and on every
/// history change; loads started by the pager's own buttons are skipped.
pub fn use_page_loader(state: AppState) {
    let query = use_query_map();
    Effect::new(move |_| {
        let (page, raw_size) = query.with(|q| (parse_page_param(q.get_str("page")), q.get("pageSize")));
        let raw_size = raw_size.or_else(|| {
            state
                .prefs
                .with_untracked(|p| p.page_size.map(|size| size.to_string()))
        });
        let size = state.pager.with_untracked(|p| p.normalize(raw_size.as_deref()));
        if state.shown.get_value() == Some((page, size)) {
            return;
        }
        if let Some(ticket) = state.pager.try_update(|p| p.supersede(page, raw_size.as_deref())) {
            fetch(state, ticket, History::Follow);
        }
    });
}

fn fetch(state: AppState, ticket: LoadTicket, history: History) {
    let api = state.api.get_value();
    spawn_local(async move {
        let result = match api.list_words(ticket.page, ticket.page_size).await {
            Ok(result) => result,
            Err(e) => {
                if state.pager.try_update(|p| p.fail(&ticket)).unwrap_or(false) {
                    state.api_failed("Failed to load words", e);
                }
                return;
            }
        };
        let Some(loaded) = state
            .pager
            .try_update(|p| p.complete(&ticket, result))
            .flatten()
        else {
            return;
        };

        if loaded.clamped {
            tracing::info!(requested = ticket.page, page = loaded.page, "page out of range");
            state.nav.replace(&href(loaded.page, loaded.page_size));
            return;
        }

        tracing::debug!(page = loaded.page, words = loaded.items.len(), "page loaded");
        state.shown.set_value(Some((loaded.page, loaded.page_size)));
        state
            .deck
            .update(|deck| deck.replace(loaded.items, loaded.start_index));
        state.ui.menu().set(None);
        if history == History::Push {
            state.nav.push(&href(loaded.page, loaded.page_size));
        }
        scroll_to_top();
        known::sync(state).await;
    });
}

/// Starts a user-initiated load. Dropped while another load is in flight.
fn load(state: AppState, page: u32, page_size: u32) -> bool {
    let raw = page_size.to_string();
    match state
        .pager
        .try_update(|p| p.begin_load(page, Some(&raw)))
        .flatten()
    {
        Some(ticket) => {
            fetch(state, ticket, History::Push);
            true
        }
        None => false,
    }
}

pub fn go(state: AppState, nav: Nav) {
    let Some(page) = state.pager.with_untracked(|p| p.target(nav)) else {
        return;
    };
    let page_size = state.pager.with_untracked(Pager::page_size);
    load(state, page, page_size);
}

fn change_page_size(state: AppState, raw: &str) {
    let page_size = state.pager.with_untracked(|p| p.normalize(Some(raw)));
    if load(state, 1, page_size) {
        state.set_prefs.update(|prefs| prefs.page_size = Some(page_size));
    }
}

fn scroll_to_top() {
    let options = web_sys::ScrollToOptions::new();
    options.set_top(0.0);
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&options);
}

#[component]
pub fn Pagination() -> impl IntoView {
    let state = use_app();
    let current = move || state.pager.with(Pager::current);
    let total_pages = move || state.pager.with(Pager::total_pages);
    let loading = move || state.pager.with(Pager::is_loading);
    let no_prev = move || !state.pager.with(Pager::has_prev) || loading();
    let no_next = move || !state.pager.with(Pager::has_next) || loading();

    let (goto_input, set_goto_input) = signal(String::new());
    Effect::watch(
        current,
        move |page, _, _| set_goto_input.set(page.to_string()),
        true,
    );
    let submit_goto = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        match state.pager.with_untracked(|p| p.goto_target(&goto_input.get_untracked())) {
            Some(page) => go(state, Nav::Goto(page)),
            None => set_goto_input.set(current().to_string()),
        }
    };

    view! {
        <nav class="flex flex-wrap items-center justify-center gap-2" aria-label="pagination">
            <div class="join">
                <button
                    type="button"
                    class="btn join-item"
                    on:click=move |_| go(state, Nav::First)
                    disabled=no_prev
                >
                    first
                </button>
                <button
                    type="button"
                    class="btn join-item"
                    on:click=move |_| go(state, Nav::Prev)
                    disabled=no_prev
                >
                    prev
                </button>
                <span class="btn btn-ghost join-item no-animation" aria-live="polite">
                    {current} " / " {total_pages}
                </span>
                <button
                    type="button"
                    class="btn join-item"
                    on:click=move |_| go(state, Nav::Next)
                    disabled=no_next
                >
                    next
                </button>
                <button
                    type="button"
                    class="btn join-item"
                    on:click=move |_| go(state, Nav::Last)
                    disabled=no_next
                >
                    last
                </button>
            </div>

            <form class="join" on:submit=submit_goto>
                <input
                    type="number"
                    min=1
                    max=total_pages
                    class="input join-item w-20"
                    aria-label="go to page"
                    bind:value=(goto_input, set_goto_input)
                />
                <button type="submit" class="btn join-item" disabled=loading>
                    go
                </button>
            </form>

            <PageSizeSelect />

            <Show when=loading>
                <span class="loading loading-spinner" aria-label="loading"></span>
            </Show>
        </nav>
    }
}

#[component]
fn PageSizeSelect() -> impl IntoView {
    let state = use_app();
    let options = state.config.with_value(|config| config.page_size_options.clone());
    let page_size = move || state.pager.with(Pager::page_size);

    view! {
        <label class="flex items-center gap-2">
            <span>per page</span>
            <select
                class="select w-24"
                prop:value=move || page_size().to_string()
                on:change:target=move |e| change_page_size(state, &e.target().value())
            >
                {options
                    .into_iter()
                    .map(|size| {
                        view! {
                            <option value=size.to_string() selected=move || page_size() == size>
                                {size}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </label>
    }
}
