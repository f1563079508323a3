use flashcards::ClientConfig;
use leptos::prelude::*;
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

mod auth;
mod cards;
mod dialogs;
mod http;
mod known;
mod pager;
mod search;
mod shortcuts;
mod speech;
mod state;
mod storage;
mod telemetry;
mod toast;
mod toolbar;

use auth::{AccountMenu, AccountPage};
use cards::CardGrid;
use dialogs::DialogHost;
use known::Progress;
use pager::Pagination;
use search::SearchBox;
use state::{AppState, use_app};
use toast::ToastHost;
use toolbar::Toolbar;

fn main() {
    console_error_panic_hook::set_once();
    telemetry::init();
    leptos::mount::mount_to_body(App);
}

#[component]
fn App() -> impl IntoView {
    view! {
        <Router>
            <Shell />
        </Router>
    }
}

#[component]
fn Shell() -> impl IntoView {
    let config = ClientConfig::load(
        option_env!("WORD_HERO_CONFIG"),
        option_env!("WORD_HERO_API_BASE"),
    );
    tracing::info!(api_base = %config.api_base, "starting word hero");
    let state = AppState::new(config);
    provide_context(state);
    auth::validate_stored_session(state);

    view! {
        <div class="min-h-screen bg-base-200">
            <header class="navbar bg-base-100 shadow-sm gap-4">
                <a href="/" class="text-xl font-bold flex-1">Word Hero</a>
                <AccountMenu />
            </header>
            <Routes fallback=|| view! { <p class="p-4">"Page not found."</p> }>
                <Route path=path!("/") view=StudyPage />
                <Route path=path!("/account") view=AccountPage />
            </Routes>
            <DialogHost />
            <ToastHost toasts=state.toasts />
        </div>
    }
}

#[component]
fn StudyPage() -> impl IntoView {
    let state = use_app();
    let search_input = NodeRef::new();
    pager::use_page_loader(state);
    shortcuts::install(state, search_input);

    view! {
        <main class="container mx-auto p-4 flex flex-col gap-4">
            <div class="flex flex-wrap items-center gap-4">
                <SearchBox input_ref=search_input />
                <Progress />
            </div>
            <Toolbar />
            <CardGrid />
            <Pagination />
        </main>
    }
}
